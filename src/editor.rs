use crate::theme::{
    modal::{CURSOR_STYLE, ERROR_STYLE, HINT_STYLE},
    BASE_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Margin, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Clear, StatefulWidget, Widget},
};
use time::Date;
use unicode_width::UnicodeWidthChar;

const OUTER_WIDTH: u16 = 46;
const OUTER_HEIGHT: u16 = 9;

/// Longest to-do text accepted, in characters.
const MAX_TEXT: usize = 50;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct TaskEditor;

impl StatefulWidget for TaskEditor {
    type State = TaskEditorState;

    /*
     * ..............................................
     * .┌──────────── 添加待办 2月15日 ────────────┐.
     * .│                                          │.
     * .│ 买年货█                                  │.
     * .│ 请输入待办事项内容                       │.
     * .│                                          │.
     * .│            Enter 保存 · Esc 取消         │.
     * .└──────────────────────────────────────────┘.
     * ..............................................
     */

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let [outer_area] = Layout::horizontal([OUTER_WIDTH])
            .flex(Flex::Center)
            .areas(area);
        let [outer_area] = Layout::vertical([OUTER_HEIGHT])
            .flex(Flex::Center)
            .areas(outer_area);
        Clear.render(outer_area, buf);
        Block::new().style(BASE_STYLE).render(outer_area, buf);
        let block_area = outer_area.inner(Margin::new(1, 1));
        let title = format!(
            " 添加待办 {}月{}日 ",
            u8::from(state.date.month()),
            state.date.day(),
        );
        Block::bordered()
            .title(title)
            .title_alignment(Alignment::Center)
            .render(block_area, buf);
        let text_area = block_area.inner(Margin::new(1, 1));
        state.to_text(text_area.width).render(text_area, buf);
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct TaskEditorState {
    date: Date,
    buffer: String,
    error: Option<String>,
}

impl TaskEditorState {
    pub(crate) fn new(date: Date) -> TaskEditorState {
        TaskEditorState {
            date,
            buffer: String::new(),
            error: None,
        }
    }

    pub(crate) fn date(&self) -> Date {
        self.date
    }

    pub(crate) fn text(&self) -> &str {
        &self.buffer
    }

    pub(crate) fn set_error<S: Into<String>>(&mut self, message: S) {
        self.error = Some(message.into());
    }

    fn to_text(&self, width: u16) -> Text<'_> {
        let input = if self.buffer.is_empty() {
            Line::from_iter([
                Span::styled(" ", CURSOR_STYLE),
                Span::styled("输入待办事项…", HINT_STYLE),
            ])
        } else {
            let visible = tail_fitting(&self.buffer, width.saturating_sub(1));
            Line::from_iter([
                Span::styled(visible, BASE_STYLE),
                Span::styled(" ", CURSOR_STYLE),
            ])
        };
        let error = match &self.error {
            Some(message) => Line::styled(message.as_str(), ERROR_STYLE),
            None => Line::raw(""),
        };
        Text::from_iter([
            Line::raw(""),
            input,
            error,
            Line::raw(""),
            Line::from(Span::styled("Enter 保存 · Esc 取消", HINT_STYLE)).centered(),
        ])
    }

    pub(crate) fn handle_input(&mut self, input: EditorInput) -> EditorOutput {
        match input {
            EditorInput::Char(ch) => {
                if ch.is_control() || self.buffer.chars().count() >= MAX_TEXT {
                    EditorOutput::Invalid
                } else {
                    self.buffer.push(ch);
                    self.error = None;
                    EditorOutput::Ok
                }
            }
            EditorInput::Backspace => {
                if self.buffer.pop().is_some() {
                    self.error = None;
                    EditorOutput::Ok
                } else {
                    EditorOutput::Invalid
                }
            }
            EditorInput::Enter => EditorOutput::Submit,
            EditorInput::Esc => EditorOutput::Cancel,
        }
    }
}

/// The longest tail of `s` that fits in `max_cols` terminal columns.
fn tail_fitting(s: &str, max_cols: u16) -> &str {
    let max_cols = usize::from(max_cols);
    let mut cols = 0;
    let mut start = s.len();
    for (idx, ch) in s.char_indices().rev() {
        cols += UnicodeWidthChar::width(ch).unwrap_or(0);
        if cols > max_cols {
            break;
        }
        start = idx;
    }
    &s[start..]
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum EditorInput {
    Char(char),
    Backspace,
    Enter,
    Esc,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum EditorOutput {
    Ok,
    Invalid,
    Submit,
    Cancel,
}
