use crate::theme::{
    modal::{ERROR_STYLE, HINT_STYLE},
    BASE_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Margin, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Clear, Widget},
};
use unicode_width::UnicodeWidthChar;

const OUTER_WIDTH: u16 = 40;
const OUTER_HEIGHT: u16 = 7;

/// Asks before a to-do is removed for good.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ConfirmDelete<'a> {
    text: &'a str,
}

impl<'a> ConfirmDelete<'a> {
    pub(crate) fn new(text: &'a str) -> ConfirmDelete<'a> {
        ConfirmDelete { text }
    }
}

impl Widget for ConfirmDelete<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [outer_area] = Layout::horizontal([OUTER_WIDTH])
            .flex(Flex::Center)
            .areas(area);
        let [outer_area] = Layout::vertical([OUTER_HEIGHT])
            .flex(Flex::Center)
            .areas(outer_area);
        Clear.render(outer_area, buf);
        Block::new().style(BASE_STYLE).render(outer_area, buf);
        let block_area = outer_area.inner(Margin::new(1, 1));
        Block::bordered()
            .title(" 删除待办 ")
            .title_alignment(Alignment::Center)
            .render(block_area, buf);
        let text_area = block_area.inner(Margin::new(1, 1));
        // Room for the surrounding punctuation and a trailing ellipsis.
        let shown = head_fitting(self.text, text_area.width.saturating_sub(12));
        let question = if shown == self.text {
            format!("删除“{shown}”？")
        } else {
            format!("删除“{shown}…”？")
        };
        Text::from_iter([
            Line::styled(question, ERROR_STYLE),
            Line::raw(""),
            Line::from(Span::styled("y 删除 · n 取消", HINT_STYLE)),
        ])
        .centered()
        .render(text_area, buf);
    }
}

/// The longest head of `s` that fits in `max_cols` terminal columns.
fn head_fitting(s: &str, max_cols: u16) -> &str {
    let max_cols = usize::from(max_cols);
    let mut cols = 0;
    let mut end = 0;
    for (idx, ch) in s.char_indices() {
        cols += UnicodeWidthChar::width(ch).unwrap_or(0);
        if cols > max_cols {
            break;
        }
        end = idx + ch.len_utf8();
    }
    &s[..end]
}
