mod grid;
mod state;
mod widget;
pub(crate) use self::grid::GridBuilder;
pub(crate) use self::state::CalendarState;
pub(crate) use self::widget::MonthGridWidget;
use time::{Date, Month};

/// The year and month the calendar is looking at, independent of the
/// selected day.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct MonthCursor {
    pub(crate) year: i32,
    pub(crate) month: Month,
}

impl MonthCursor {
    pub(crate) fn of(date: Date) -> MonthCursor {
        MonthCursor {
            year: date.year(),
            month: date.month(),
        }
    }

    pub(crate) fn first_day(self) -> Option<Date> {
        Date::from_calendar_date(self.year, self.month, 1).ok()
    }

    pub(crate) fn contains(self, date: Date) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Next month, or `None` past the supported range of dates.
    pub(crate) fn forwards(self) -> Option<MonthCursor> {
        let next = match self.month {
            Month::December => MonthCursor {
                year: self.year.checked_add(1)?,
                month: Month::January,
            },
            m => MonthCursor {
                year: self.year,
                month: m.next(),
            },
        };
        next.first_day().map(|_| next)
    }

    /// Previous month, or `None` past the supported range of dates.
    pub(crate) fn backwards(self) -> Option<MonthCursor> {
        let prev = match self.month {
            Month::January => MonthCursor {
                year: self.year.checked_sub(1)?,
                month: Month::December,
            },
            m => MonthCursor {
                year: self.year,
                month: m.previous(),
            },
        };
        prev.first_day().map(|_| prev)
    }
}
