use std::time::{Duration, Instant};
use time::Date;

/// What a click on a day cell should do.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ClickAction {
    /// First click, or a click on a different day: move the selection.
    Select(Date),
    /// Second click on the same day within the window: open the editor.
    Open(Date),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ClickState {
    Idle,
    Armed { date: Date, at: Instant },
}

/// Turns a stream of day clicks into selects and opens.
///
/// A click arms the router for its day; a second click on the same day
/// inside the window fires [`ClickAction::Open`] and disarms, so a third
/// click starts over rather than opening again.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ClickRouter {
    window: Duration,
    state: ClickState,
}

impl ClickRouter {
    pub(crate) fn new(window: Duration) -> ClickRouter {
        ClickRouter {
            window,
            state: ClickState::Idle,
        }
    }

    pub(crate) fn observe(&mut self, date: Date, now: Instant) -> ClickAction {
        if let ClickState::Armed { date: armed, at } = self.state {
            if armed == date && now.saturating_duration_since(at) <= self.window {
                self.state = ClickState::Idle;
                return ClickAction::Open(date);
            }
        }
        self.state = ClickState::Armed { date, at: now };
        ClickAction::Select(date)
    }
}
