use ratatui::style::{Color, Modifier, Style};

pub(crate) const BASE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Black);

pub(crate) const TITLE_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const WEEKDAY_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const WEEKEND_STYLE: Style = Style::new().fg(Color::LightRed).bg(Color::Black);

pub(crate) const OTHER_MONTH_STYLE: Style = Style::new().fg(Color::DarkGray).bg(Color::Black);

pub(crate) const LUNAR_STYLE: Style = Style::new().fg(Color::Gray).bg(Color::Black);

pub(crate) const TODAY_STYLE: Style = Style::new()
    .fg(Color::LightCyan)
    .bg(Color::Black)
    .add_modifier(Modifier::BOLD);

/// Patch-only style: no colors, so the cell keeps its own.
pub(crate) const SELECTED_STYLE: Style = Style::new().add_modifier(Modifier::REVERSED);

pub(crate) const REST_STYLE: Style = Style::new().fg(Color::LightGreen).bg(Color::Black);

pub(crate) const WORK_STYLE: Style = Style::new()
    .fg(Color::LightRed)
    .bg(Color::Black)
    .add_modifier(Modifier::BOLD);

pub(crate) const DOT_STYLE: Style = Style::new().fg(Color::LightYellow).bg(Color::Black);

pub(crate) const FOOTER_STYLE: Style = Style::new().fg(Color::Gray).bg(Color::Black);

pub(crate) const STATUS_STYLE: Style = Style::new().fg(Color::LightYellow).bg(Color::Black);

pub(crate) mod panel {
    use super::*;

    pub(crate) const TAB_ACTIVE_STYLE: Style = BASE_STYLE
        .add_modifier(Modifier::BOLD)
        .add_modifier(Modifier::UNDERLINED);

    pub(crate) const TAB_IDLE_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

    pub(crate) const DONE_STYLE: Style = BASE_STYLE
        .fg(Color::DarkGray)
        .add_modifier(Modifier::CROSSED_OUT);

    pub(crate) const CURSOR_STYLE: Style = Style::new().add_modifier(Modifier::REVERSED);

    pub(crate) const EMPTY_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);
}

pub(crate) mod modal {
    use super::*;

    pub(crate) const CURSOR_STYLE: Style = BASE_STYLE.add_modifier(Modifier::REVERSED);

    pub(crate) const ERROR_STYLE: Style = BASE_STYLE.fg(Color::LightRed);

    pub(crate) const HINT_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);
}
