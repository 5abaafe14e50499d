use super::grid::{GridBuilder, MonthGrid, window_fits};
use super::widget::GridLayout;
use super::MonthCursor;
use crate::lunar::Almanac;
use time::Date;

/// What the calendar pane is showing: the selected day, the month in view,
/// and the grid built for it.
///
/// The grid is rebuilt lazily.  Navigation drops it; anything else that can
/// change a cell (task edits) must call [`CalendarState::invalidate`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CalendarState<A> {
    builder: GridBuilder<A>,
    pub(crate) today: Date,
    selected: Date,
    cursor: MonthCursor,
    grid: Option<MonthGrid>,
    pub(super) layout: Option<GridLayout>,
}

impl<A: Almanac> CalendarState<A> {
    pub(crate) fn new(builder: GridBuilder<A>, today: Date) -> CalendarState<A> {
        CalendarState {
            builder,
            today,
            selected: today,
            cursor: MonthCursor::of(today),
            grid: None,
            layout: None,
        }
    }

    pub(crate) fn start_date(mut self, date: Date) -> CalendarState<A> {
        self.selected = date;
        let target = MonthCursor::of(date);
        if window_fits(target) {
            self.cursor = target;
        }
        self
    }

    pub(crate) fn selected(&self) -> Date {
        self.selected
    }

    /// Move the selection; the view follows it into another month, except
    /// where that month's six weeks would not fit the supported range.
    pub(crate) fn select(&mut self, date: Date) {
        self.selected = date;
        let target = MonthCursor::of(date);
        if !self.cursor.contains(date) && window_fits(target) {
            self.cursor = target;
        }
        self.invalidate();
    }

    /// Move the selection by whole days.  `false` when the supported date
    /// range ends before the move completes.
    pub(crate) fn step_days(&mut self, days: i32) -> bool {
        let mut date = self.selected;
        for _ in 0..days.unsigned_abs() {
            let step = if days < 0 {
                date.previous_day()
            } else {
                date.next_day()
            };
            let Some(next) = step else {
                return false;
            };
            date = next;
        }
        self.select(date);
        true
    }

    /// Show the next month without touching the selection.  `false` at the
    /// edge of the supported range.
    pub(crate) fn month_forwards(&mut self) -> bool {
        match self.cursor.forwards().filter(|&cursor| window_fits(cursor)) {
            Some(cursor) => {
                self.cursor = cursor;
                self.invalidate();
                true
            }
            None => false,
        }
    }

    /// Show the previous month without touching the selection.  `false` at
    /// the edge of the supported range.
    pub(crate) fn month_backwards(&mut self) -> bool {
        match self.cursor.backwards().filter(|&cursor| window_fits(cursor)) {
            Some(cursor) => {
                self.cursor = cursor;
                self.invalidate();
                true
            }
            None => false,
        }
    }

    pub(crate) fn jump_to_today(&mut self) {
        self.select(self.today);
    }

    pub(crate) fn invalidate(&mut self) {
        self.grid = None;
    }

    /// Build the grid for the current view if it is not cached, filling in
    /// the task dots through `has_task`.  `None` only at the edge of the
    /// supported date range.
    pub(crate) fn ensure_grid<F: FnMut(Date) -> bool>(
        &mut self,
        has_task: F,
    ) -> Option<&MonthGrid> {
        if self.grid.is_none() {
            if let Ok(mut grid) = self.builder.build(self.cursor, self.selected, self.today) {
                grid.mark_tasks(has_task);
                self.grid = Some(grid);
            }
        }
        self.grid.as_ref()
    }

    pub(crate) fn grid(&self) -> Option<&MonthGrid> {
        self.grid.as_ref()
    }

    pub(super) fn builder(&self) -> &GridBuilder<A> {
        &self.builder
    }

    /// Day under an absolute screen position, per the layout of the last
    /// render.
    pub(crate) fn hit(&self, column: u16, row: u16) -> Option<Date> {
        let index = self.layout?.hit(column, row)?;
        Some(self.grid.as_ref()?.cell(index)?.date)
    }
}
