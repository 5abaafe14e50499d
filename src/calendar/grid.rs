use super::MonthCursor;
use crate::holidays::{DayAdjust, HolidayTable};
use crate::lunar::Almanac;
use std::iter::successors;
use thiserror::Error;
use time::{Date, Weekday};

/// Cells in the fixed month view: six Monday-first weeks.
pub(crate) const GRID_CELLS: usize = 42;

pub(super) const DAYS_IN_WEEK: usize = 7;

/// Everything the widget needs to draw one day cell.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct GridCell {
    pub(crate) date: Date,
    /// Whether the date belongs to the month under the cursor, as opposed
    /// to the leading/trailing days filling out the six weeks.
    pub(crate) in_month: bool,
    pub(crate) weekend: bool,
    pub(crate) today: bool,
    pub(crate) selected: bool,
    pub(crate) adjust: Option<DayAdjust>,
    /// Lunar day name, empty when the almanac has nothing for the date.
    pub(crate) lunar_label: String,
    pub(crate) has_task: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct MonthGrid {
    cursor: MonthCursor,
    cells: Vec<GridCell>,
}

impl MonthGrid {
    pub(crate) fn cursor(&self) -> MonthCursor {
        self.cursor
    }

    pub(crate) fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub(crate) fn cell(&self, index: usize) -> Option<&GridCell> {
        self.cells.get(index)
    }

    pub(crate) fn weeks(&self) -> impl Iterator<Item = &[GridCell]> {
        self.cells.chunks(DAYS_IN_WEEK)
    }

    /// Second pass filling in the task dots; separate from building so the
    /// task store does not have to live inside the builder.
    pub(crate) fn mark_tasks<F: FnMut(Date) -> bool>(&mut self, mut has_task: F) {
        for cell in &mut self.cells {
            cell.has_task = has_task(cell.date);
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("reached the end of time")]
pub(crate) struct GridRangeError;

/// Builds [`MonthGrid`]s from the almanac and the holiday table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct GridBuilder<A> {
    almanac: A,
    holidays: HolidayTable,
}

impl<A: Almanac> GridBuilder<A> {
    pub(crate) fn new(almanac: A, holidays: HolidayTable) -> GridBuilder<A> {
        GridBuilder { almanac, holidays }
    }

    pub(crate) fn almanac(&self) -> &A {
        &self.almanac
    }

    pub(crate) fn holidays(&self) -> &HolidayTable {
        &self.holidays
    }

    /// Lay out the month under `cursor`.  The first cell is the Monday on
    /// or before the first of the month; the grid always runs exactly six
    /// weeks from there.
    pub(crate) fn build(
        &self,
        cursor: MonthCursor,
        selected: Date,
        today: Date,
    ) -> Result<MonthGrid, GridRangeError> {
        let start = window_start(cursor).ok_or(GridRangeError)?;
        let cells = successors(Some(start), |&d| d.next_day())
            .take(GRID_CELLS)
            .map(|date| self.make_cell(date, cursor, selected, today))
            .collect::<Vec<_>>();
        if cells.len() != GRID_CELLS {
            return Err(GridRangeError);
        }
        Ok(MonthGrid { cursor, cells })
    }

    fn make_cell(&self, date: Date, cursor: MonthCursor, selected: Date, today: Date) -> GridCell {
        GridCell {
            date,
            in_month: cursor.contains(date),
            weekend: matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday),
            today: date == today,
            selected: date == selected,
            adjust: self.holidays.adjust_for(date),
            lunar_label: self
                .almanac
                .lunar_info(date)
                .map(|info| info.day_name.to_owned())
                .unwrap_or_default(),
            has_task: false,
        }
    }
}

/// The Monday opening `cursor`'s six-week window, when the calendar can
/// represent it.
fn window_start(cursor: MonthCursor) -> Option<Date> {
    let first = cursor.first_day()?;
    let lead = usize::from(first.weekday().number_days_from_monday());
    if lead == 0 {
        Some(first)
    } else {
        days_before(first).nth(lead - 1)
    }
}

/// Whether all six weeks of `cursor`'s window sit inside the calendar
/// range.  Navigation refuses months where they do not.
pub(super) fn window_fits(cursor: MonthCursor) -> bool {
    window_start(cursor)
        .and_then(|start| successors(Some(start), |&d| d.next_day()).nth(GRID_CELLS - 1))
        .is_some()
}

fn days_before(date: Date) -> impl Iterator<Item = Date> {
    successors(Some(date), |&d| d.previous_day()).skip(1)
}
