use super::grid::{DAYS_IN_WEEK, GridCell};
use super::state::CalendarState;
use crate::holidays::DayAdjust;
use crate::lunar::Almanac;
use crate::theme::{
    BASE_STYLE, DOT_STYLE, FOOTER_STYLE, LUNAR_STYLE, OTHER_MONTH_STYLE, REST_STYLE,
    SELECTED_STYLE, TITLE_STYLE, TODAY_STYLE, WEEKDAY_STYLE, WEEKEND_STYLE, WORK_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::{Margin, Rect},
    style::Style,
    text::Line,
    widgets::StatefulWidget,
};
use std::marker::PhantomData;
use time::{Date, Month};

/// Columns per day cell, including the gap column on its right edge.
const CELL_WIDTH: u16 = 8;

/// Lines per week row: the date line and the lunar line under it.
const WEEK_LINES: u16 = 2;

/// Lines above the first week row: title, weekday header, rule.
const GRID_TOP: u16 = 3;

const GRID_WIDTH: u16 = CELL_WIDTH * 7;

const GRID_WEEKS: u16 = 6;

static WEEKDAY_NAMES: [&str; 7] = ["一", "二", "三", "四", "五", "六", "日"];

static MONTH_NAMES: [&str; 12] = [
    "一月", "二月", "三月", "四月", "五月", "六月", "七月", "八月", "九月", "十月", "十一月",
    "十二月",
];

/// Renders a [`CalendarState`] as a month page:
///
/// ```text
///                     2026年 二月
///  一      二      三      四      五      六      日
/// ────────────────────────────────────────────────────────
///  26      27      28      29      30      31       1
///  初八    初九    初十    十一    十二    十三    十四
///   :        (five more week rows)        :
///
///              丙午马年正月初一 · 春节
///                   今天 · 春节
/// ```
///
/// Each day cell is two lines: the day-of-month (bracketed when it is
/// today) with 休/班 badges and a to-do dot beside it, and the lunar day
/// name below.  The selected cell is drawn reversed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct MonthGridWidget<A> {
    _data: PhantomData<A>,
}

impl<A> MonthGridWidget<A> {
    pub(crate) fn new() -> MonthGridWidget<A> {
        MonthGridWidget { _data: PhantomData }
    }
}

impl<A: Almanac> StatefulWidget for MonthGridWidget<A> {
    type State = CalendarState<A>;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let area = area.inner(Margin::new(1, 0));
        let Some(grid) = state.grid() else {
            state.layout = None;
            return;
        };
        let mut canvas = Canvas::new(area, buf);
        let cursor = grid.cursor();
        let title = format!("{}年 {}", cursor.year, month_name(cursor.month));
        canvas.print_centered(0, &title, TITLE_STYLE);
        for (i, name) in std::iter::zip(0u16.., WEEKDAY_NAMES) {
            let style = if i >= 5 { WEEKEND_STYLE } else { WEEKDAY_STYLE };
            canvas.mvprint(1, i * CELL_WIDTH + 1, name, style);
        }
        canvas.hline(2, 0, GRID_WIDTH);
        for (w, week) in std::iter::zip(0u16.., grid.weeks()) {
            let y = GRID_TOP + w * WEEK_LINES;
            for (c, cell) in std::iter::zip(0u16.., week) {
                canvas.draw_cell(y, c * CELL_WIDTH, cell);
            }
        }
        let footer_top = GRID_TOP + GRID_WEEKS * WEEK_LINES + 1;
        let selected = state.selected();
        if let Some(info) = state.builder().almanac().lunar_info(selected) {
            let mut line = info.summary();
            if let Some(festival) = info.festival {
                line.push_str(" · ");
                line.push_str(festival);
            }
            canvas.print_centered(footer_top, &line, FOOTER_STYLE);
        }
        let mut line = distance_label(selected, state.today);
        if let Some(label) = state.builder().holidays().label_for(selected) {
            line.push_str(" · ");
            line.push_str(label);
        }
        canvas.print_centered(footer_top + 1, &line, FOOTER_STYLE);
        state.layout = Some(GridLayout {
            x: area.x,
            y: area.y + GRID_TOP,
        });
    }
}

/// Where the week rows landed on screen, recorded at render time so that
/// mouse clicks can be translated back into day cells.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) struct GridLayout {
    x: u16,
    y: u16,
}

impl GridLayout {
    pub(super) fn hit(self, column: u16, row: u16) -> Option<usize> {
        let col = usize::from(column.checked_sub(self.x)? / CELL_WIDTH);
        let week = usize::from(row.checked_sub(self.y)? / WEEK_LINES);
        (col < DAYS_IN_WEEK && week < usize::from(GRID_WEEKS))
            .then_some(week * DAYS_IN_WEEK + col)
    }
}

struct Canvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> Canvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer) -> Canvas<'a> {
        Canvas { area, buf }
    }

    fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Style) {
        if y < self.area.height && x < self.area.width {
            let max_width = usize::from(self.area.width - x);
            self.buf
                .set_stringn(self.area.x + x, self.area.y + y, s, max_width, style);
        }
    }

    fn print_centered(&mut self, y: u16, s: &str, style: Style) {
        let width = u16::try_from(Line::raw(s).width()).unwrap_or(u16::MAX);
        let x = GRID_WIDTH.saturating_sub(width) / 2;
        self.mvprint(y, x, s, style);
    }

    fn hline(&mut self, y: u16, x: u16, length: u16) {
        self.mvprint(y, x, "─".repeat(usize::from(length)), BASE_STYLE);
    }

    fn draw_cell(&mut self, y: u16, x: u16, cell: &GridCell) {
        let base = if !cell.in_month {
            OTHER_MONTH_STYLE
        } else if cell.weekend {
            WEEKEND_STYLE
        } else {
            BASE_STYLE
        };
        let day = cell.date.day();
        let (day_text, day_style) = if cell.today {
            (format!("[{day:>2}]"), TODAY_STYLE)
        } else {
            (format!(" {day:>2} "), base)
        };
        self.mvprint(y, x, day_text, day_style);
        match cell.adjust {
            Some(DayAdjust::Rest) => self.mvprint(y, x + 4, "休", REST_STYLE),
            Some(DayAdjust::Work) => self.mvprint(y, x + 4, "班", WORK_STYLE),
            None => (),
        }
        if cell.has_task {
            self.mvprint(y, x + 6, "•", DOT_STYLE);
        }
        if !cell.lunar_label.is_empty() {
            let style = if cell.in_month {
                LUNAR_STYLE
            } else {
                OTHER_MONTH_STYLE
            };
            self.mvprint(y + 1, x + 1, &cell.lunar_label, style);
        }
        if cell.selected {
            self.patch(y, x, CELL_WIDTH - 1, WEEK_LINES, SELECTED_STYLE);
        }
    }

    fn patch(&mut self, y: u16, x: u16, width: u16, height: u16, style: Style) {
        let target = Rect {
            x: self.area.x.saturating_add(x),
            y: self.area.y.saturating_add(y),
            width,
            height,
        }
        .intersection(self.area);
        self.buf.set_style(target, style);
    }
}

fn month_name(month: Month) -> &'static str {
    MONTH_NAMES[usize::from(u8::from(month)) - 1]
}

fn distance_label(selected: Date, today: Date) -> String {
    match selected.to_julian_day() - today.to_julian_day() {
        0 => String::from("今天"),
        d if d > 0 => format!("{d}天后"),
        d => format!("{}天前", -d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::GridBuilder;
    use crate::holidays::HolidayTable;
    use crate::lunar::ChineseAlmanac;
    use ratatui::buffer::Cell;
    use ratatui::style::Modifier;
    use time::macros::date;

    fn fixture() -> CalendarState<ChineseAlmanac> {
        CalendarState::new(
            GridBuilder::new(ChineseAlmanac, HolidayTable::builtin()),
            date!(2026 - 02 - 15),
        )
    }

    fn render(state: &mut CalendarState<ChineseAlmanac>) -> Buffer {
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        MonthGridWidget::new().render(area, &mut buf, state);
        buf
    }

    /// The row's symbols with blanks stripped, so that assertions survive
    /// the filler cells ratatui leaves after each double-width character.
    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area().width)
            .map(|x| buf.cell((x, y)).map_or(" ", Cell::symbol))
            .filter(|symbol| *symbol != " ")
            .collect()
    }

    #[test]
    fn no_grid_no_output() {
        let mut state = fixture();
        let buf = render(&mut state);
        for y in 0..buf.area().height {
            assert_eq!(row_text(&buf, y), "", "row {y} should be blank");
        }
        assert_eq!(state.hit(10, 3), None);
    }

    #[test]
    fn title_names_the_cursor_month() {
        let mut state = fixture();
        state.ensure_grid(|_| false);
        let buf = render(&mut state);
        assert!(row_text(&buf, 0).contains("2026年二月"));
    }

    #[test]
    fn header_and_rule() {
        let mut state = fixture();
        state.ensure_grid(|_| false);
        let buf = render(&mut state);
        assert_eq!(row_text(&buf, 1), "一二三四五六日");
        assert!(row_text(&buf, 2).starts_with("───"));
    }

    #[test]
    fn day_numbers_land_in_their_cells() {
        let mut state = fixture();
        state.ensure_grid(|_| false);
        let buf = render(&mut state);
        // Week 0 opens with Jan 26 in column 0 and ends with Feb 1 in
        // column 6.  Day text starts one column in from the margin.
        assert_eq!(buf.cell((2, 3)).unwrap().symbol(), "2");
        assert_eq!(buf.cell((3, 3)).unwrap().symbol(), "6");
        assert_eq!(buf.cell((51, 3)).unwrap().symbol(), "1");
    }

    #[test]
    fn leading_days_use_the_dimmed_style() {
        let mut state = fixture();
        state.ensure_grid(|_| false);
        let buf = render(&mut state);
        assert_eq!(buf.cell((2, 3)).unwrap().style().fg, OTHER_MONTH_STYLE.fg);
        assert_eq!(buf.cell((10, 3)).unwrap().style().fg, OTHER_MONTH_STYLE.fg);
    }

    #[test]
    fn today_is_bracketed() {
        // Feb 15 sits at cell 20: week 2, column 6.
        let mut state = fixture();
        state.ensure_grid(|_| false);
        let buf = render(&mut state);
        assert_eq!(buf.cell((49, 7)).unwrap().symbol(), "[");
        assert_eq!(buf.cell((50, 7)).unwrap().symbol(), "1");
        assert_eq!(buf.cell((51, 7)).unwrap().symbol(), "5");
        assert_eq!(buf.cell((52, 7)).unwrap().symbol(), "]");
    }

    #[test]
    fn selection_is_reversed() {
        let mut state = fixture();
        state.ensure_grid(|_| false);
        let buf = render(&mut state);
        let style = buf.cell((49, 7)).unwrap().style();
        assert!(style.add_modifier.contains(Modifier::REVERSED));
        // The neighbouring cell is not.
        let style = buf.cell((41, 7)).unwrap().style();
        assert!(!style.add_modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn holiday_badges_follow_the_table() {
        let mut state = fixture();
        state.ensure_grid(|_| false);
        let buf = render(&mut state);
        // Feb 15 2026 opens the Spring Festival break; Feb 14 is its
        // make-up workday.
        assert_eq!(buf.cell((53, 7)).unwrap().symbol(), "休");
        assert_eq!(buf.cell((45, 7)).unwrap().symbol(), "班");
    }

    #[test]
    fn task_dot_marks_the_day() {
        let mut state = fixture();
        state.ensure_grid(|date| date == date!(2026 - 02 - 20));
        let buf = render(&mut state);
        // Feb 20 sits at cell 25: week 3, column 4.
        assert_eq!(buf.cell((39, 9)).unwrap().symbol(), "•");
    }

    #[test]
    fn lunar_labels_sit_under_the_dates() {
        let mut state = fixture();
        state.ensure_grid(|_| false);
        let buf = render(&mut state);
        // Feb 17 2026 is 正月初一; it sits at cell 22: week 3, column 1.
        assert_eq!(buf.cell((10, 10)).unwrap().symbol(), "初");
    }

    #[test]
    fn footer_shows_summary_and_distance() {
        let mut state = fixture();
        state.ensure_grid(|_| false);
        let buf = render(&mut state);
        assert!(row_text(&buf, 16).contains("乙巳蛇年"));
        let line = row_text(&buf, 17);
        assert!(line.contains("今天"));
        assert!(line.contains("春节"));
    }

    #[test]
    fn distance_labels() {
        let today = date!(2026 - 02 - 15);
        assert_eq!(distance_label(today, today), "今天");
        assert_eq!(distance_label(date!(2026 - 02 - 17), today), "2天后");
        assert_eq!(distance_label(date!(2026 - 02 - 01), today), "14天前");
    }

    #[test]
    fn centering_counts_narrow_non_ascii_as_one_column() {
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        let mut canvas = Canvas::new(area, &mut buf);
        canvas.print_centered(0, "календарь", FOOTER_STYLE);
        // Nine single-width columns centered in the 56-column grid.
        assert_eq!(buf.cell((23, 0)).unwrap().symbol(), "к");
    }

    #[test]
    fn clicks_map_back_to_dates() {
        let mut state = fixture();
        state.ensure_grid(|_| false);
        render(&mut state);
        assert_eq!(state.hit(1, 3), Some(date!(2026 - 01 - 26)));
        assert_eq!(state.hit(50, 3), Some(date!(2026 - 02 - 01)));
        assert_eq!(state.hit(50, 4), Some(date!(2026 - 02 - 01)));
        assert_eq!(state.hit(1, 14), Some(date!(2026 - 03 - 02)));
    }

    #[test]
    fn clicks_outside_the_grid_miss() {
        let mut state = fixture();
        state.ensure_grid(|_| false);
        render(&mut state);
        // Leftwards of the margin, above the weeks, past the last column,
        // and below the last week.
        assert_eq!(state.hit(0, 3), None);
        assert_eq!(state.hit(1, 2), None);
        assert_eq!(state.hit(57, 3), None);
        assert_eq!(state.hit(1, 15), None);
    }
}
