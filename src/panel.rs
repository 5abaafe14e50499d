use crate::tasks::Task;
use crate::theme::{
    panel::{CURSOR_STYLE, DONE_STYLE, EMPTY_STYLE, TAB_ACTIVE_STYLE, TAB_IDLE_STYLE},
    BASE_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    widgets::{Block, StatefulWidget, Widget},
};
use time::Date;

static WEEKDAY_LABELS: [&str; 7] = ["一", "二", "三", "四", "五", "六", "日"];

/// Which half of the to-do list the panel is showing.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum TaskTab {
    #[default]
    Pending,
    Done,
}

impl TaskTab {
    pub(crate) fn toggle(self) -> TaskTab {
        match self {
            TaskTab::Pending => TaskTab::Done,
            TaskTab::Done => TaskTab::Pending,
        }
    }

    fn matches(self, task: &Task) -> bool {
        match self {
            TaskTab::Pending => !task.completed,
            TaskTab::Done => task.completed,
        }
    }
}

/// Cursor and tab of the to-do panel.  The cursor indexes into the tasks
/// visible under the current tab, not into the day's whole list.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct PanelState {
    tab: TaskTab,
    cursor: usize,
}

impl PanelState {
    pub(crate) fn new() -> PanelState {
        PanelState::default()
    }

    pub(crate) fn tab(self) -> TaskTab {
        self.tab
    }

    pub(crate) fn switch_tab(&mut self) {
        self.tab = self.tab.toggle();
        self.cursor = 0;
    }

    /// Moves the cursor by `delta` rows, clamped to the visible tasks.
    /// Returns `false` if there was nowhere to move.
    pub(crate) fn move_cursor(&mut self, delta: i32, tasks: &[Task]) -> bool {
        let count = self.visible(tasks).count();
        if count == 0 {
            return false;
        }
        let step = usize::try_from(delta.unsigned_abs()).unwrap_or(usize::MAX);
        let target = if delta < 0 {
            self.cursor.saturating_sub(step)
        } else {
            self.cursor.saturating_add(step)
        }
        .min(count - 1);
        let moved = target != self.cursor;
        self.cursor = target;
        moved
    }

    pub(crate) fn selected<'a>(&self, tasks: &'a [Task]) -> Option<&'a Task> {
        self.visible(tasks).nth(self.cursor)
    }

    /// Tab upkeep after a toggle moves a task to the other half: hop to the
    /// other tab when the current one has run empty, otherwise stay and keep
    /// the cursor on a row that still exists.
    pub(crate) fn auto_switch(&mut self, tasks: &[Task]) {
        if !tasks.is_empty() && self.visible(tasks).next().is_none() {
            self.switch_tab();
        } else {
            self.clamp(tasks);
        }
    }

    pub(crate) fn clamp(&mut self, tasks: &[Task]) {
        let count = self.visible(tasks).count();
        self.cursor = self.cursor.min(count.saturating_sub(1));
    }

    fn visible<'a>(&self, tasks: &'a [Task]) -> impl Iterator<Item = &'a Task> {
        let tab = self.tab;
        tasks.iter().filter(move |task| tab.matches(task))
    }
}

/// The right-hand panel: the selected day's to-dos under 待办/已完成 tabs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct TaskPanel<'a> {
    date: Date,
    tasks: &'a [Task],
}

impl<'a> TaskPanel<'a> {
    pub(crate) fn new(date: Date, tasks: &'a [Task]) -> TaskPanel<'a> {
        TaskPanel { date, tasks }
    }
}

impl StatefulWidget for TaskPanel<'_> {
    type State = PanelState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        state.clamp(self.tasks);
        let weekday = usize::from(self.date.weekday().number_days_from_monday());
        let block = Block::bordered()
            .title(format!(
                " {}月{}日 周{} ",
                u8::from(self.date.month()),
                self.date.day(),
                WEEKDAY_LABELS[weekday],
            ))
            .title_alignment(Alignment::Center)
            .style(BASE_STYLE);
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.is_empty() {
            return;
        }
        let pending = self.tasks.iter().filter(|task| !task.completed).count();
        let done = self.tasks.len() - pending;
        let (pending_style, done_style) = match state.tab {
            TaskTab::Pending => (TAB_ACTIVE_STYLE, TAB_IDLE_STYLE),
            TaskTab::Done => (TAB_IDLE_STYLE, TAB_ACTIVE_STYLE),
        };
        let max = usize::from(inner.width.saturating_sub(1));
        let (x, y) = buf.set_stringn(
            inner.x + 1,
            inner.y,
            format!("待办({pending})"),
            max,
            pending_style,
        );
        buf.set_stringn(x + 2, y, format!("已完成({done})"), max, done_style);
        let Some(rows) = inner.height.checked_sub(2) else {
            return;
        };
        let top = inner.y + 2;
        let shown: Vec<&Task> = state.visible(self.tasks).collect();
        if shown.is_empty() {
            let label = match state.tab {
                TaskTab::Pending => "暂无待办",
                TaskTab::Done => "暂无已完成",
            };
            buf.set_stringn(inner.x + 1, top, label, max, EMPTY_STYLE);
            return;
        }
        let offset = state
            .cursor
            .saturating_sub(usize::from(rows.saturating_sub(1)));
        for (row, (i, task)) in
            std::iter::zip(0u16.., shown.iter().enumerate().skip(offset).take(rows.into()))
        {
            let style = if task.completed { DONE_STYLE } else { BASE_STYLE };
            let mark = if task.completed { "[x] " } else { "[ ] " };
            buf.set_stringn(
                inner.x + 1,
                top + row,
                format!("{mark}{}", task.text),
                max,
                style,
            );
            if i == state.cursor {
                buf.set_style(
                    Rect {
                        x: inner.x,
                        y: top + row,
                        width: inner.width,
                        height: 1,
                    },
                    CURSOR_STYLE,
                );
            }
        }
    }
}
