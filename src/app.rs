use crate::calendar::{CalendarState, MonthGridWidget};
use crate::clicks::{ClickAction, ClickRouter};
use crate::confirm::ConfirmDelete;
use crate::editor::{EditorInput, EditorOutput, TaskEditor, TaskEditorState};
use crate::help::Help;
use crate::lunar::Almanac;
use crate::panel::{PanelState, TaskPanel};
use crate::storage::TaskStorage;
use crate::tasks::{SaveOutcome, TaskError, TaskStore};
use crate::theme::{BASE_STYLE, STATUS_STYLE};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEventKind, read};
use ratatui::{
    Terminal,
    backend::Backend,
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    widgets::{StatefulWidget, Widget},
};
use std::io::{self, Write};
use std::time::{Duration, Instant};
use time::Date;

/// Columns reserved for the month grid, margins included.
const CALENDAR_WIDTH: u16 = 58;

#[derive(Debug)]
pub(crate) struct App<A, S> {
    calendar: CalendarState<A>,
    store: TaskStore<S>,
    panel: PanelState,
    clicks: ClickRouter,
    state: AppState,
    status: Option<String>,
}

impl<A: Almanac, S: TaskStorage> App<A, S> {
    pub(crate) fn new(
        calendar: CalendarState<A>,
        store: TaskStore<S>,
        double_click: Duration,
    ) -> App<A, S> {
        App {
            calendar,
            store,
            panel: PanelState::new(),
            clicks: ClickRouter::new(double_click),
            state: AppState::Calendar,
            status: None,
        }
    }

    pub(crate) fn run<B: Backend>(mut self, mut terminal: Terminal<B>) -> io::Result<()> {
        while !self.quitting() {
            self.draw(&mut terminal)?;
            self.handle_input()?;
        }
        Ok(())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(self, frame.area()))?;
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        let event = read()?;
        if let Some(KeyEvent {
            code, modifiers, ..
        }) = event.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        } else if let Event::Mouse(mouse) = event {
            if mouse.kind == MouseEventKind::Down(MouseButton::Left)
                && !self.handle_click(mouse.column, mouse.row)
            {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        self.status = None;
        match &mut self.state {
            AppState::Calendar => match key {
                KeyCode::Char('h') | KeyCode::Left => self.calendar.step_days(-1),
                KeyCode::Char('l') | KeyCode::Right => self.calendar.step_days(1),
                KeyCode::Char('k') | KeyCode::Up => self.calendar.step_days(-7),
                KeyCode::Char('j') | KeyCode::Down => self.calendar.step_days(7),
                KeyCode::Char('p') | KeyCode::PageUp => self.calendar.month_backwards(),
                KeyCode::Char('n') | KeyCode::PageDown => self.calendar.month_forwards(),
                KeyCode::Char('t') | KeyCode::Home => {
                    self.calendar.jump_to_today();
                    true
                }
                KeyCode::Char('a') | KeyCode::Enter => {
                    self.open_editor(self.calendar.selected());
                    true
                }
                KeyCode::Tab => {
                    self.panel.switch_tab();
                    true
                }
                KeyCode::Char('J') => self.panel_cursor(1),
                KeyCode::Char('K') => self.panel_cursor(-1),
                KeyCode::Char(' ') => self.toggle_selected_task(),
                KeyCode::Char('d') | KeyCode::Delete => self.confirm_delete(),
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    true
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.state = AppState::Quitting;
                    true
                }
                _ => false,
            },
            AppState::Helping => {
                self.state = AppState::Calendar;
                true
            }
            AppState::Editing(editor) => {
                let output = match key {
                    KeyCode::Char(ch) => editor.handle_input(EditorInput::Char(ch)),
                    KeyCode::Backspace => editor.handle_input(EditorInput::Backspace),
                    KeyCode::Enter => editor.handle_input(EditorInput::Enter),
                    KeyCode::Esc => editor.handle_input(EditorInput::Esc),
                    _ => EditorOutput::Invalid,
                };
                match output {
                    EditorOutput::Ok => true,
                    EditorOutput::Invalid => false,
                    EditorOutput::Submit => self.submit_editor(),
                    EditorOutput::Cancel => {
                        self.state = AppState::Calendar;
                        true
                    }
                }
            }
            AppState::ConfirmingDelete { date, id } => match key {
                KeyCode::Char('y') | KeyCode::Enter => {
                    let (date, id) = (*date, *id);
                    self.delete_task(date, id);
                    true
                }
                KeyCode::Char('n' | 'q') | KeyCode::Esc => {
                    self.state = AppState::Calendar;
                    true
                }
                _ => false,
            },
            AppState::Quitting => false,
        }
    }

    // Returns `false` if the click changed nothing
    fn handle_click(&mut self, column: u16, row: u16) -> bool {
        match &self.state {
            AppState::Calendar => {
                let Some(date) = self.calendar.hit(column, row) else {
                    return false;
                };
                match self.clicks.observe(date, Instant::now()) {
                    ClickAction::Select(date) => self.calendar.select(date),
                    ClickAction::Open(date) => self.open_editor(date),
                }
                true
            }
            // A click anywhere dismisses an open overlay.
            AppState::Editing(_) | AppState::Helping => {
                self.state = AppState::Calendar;
                true
            }
            AppState::ConfirmingDelete { .. } | AppState::Quitting => false,
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }

    fn panel_cursor(&mut self, delta: i32) -> bool {
        let tasks = self.store.tasks_for(self.calendar.selected());
        self.panel.move_cursor(delta, tasks)
    }

    fn open_editor(&mut self, date: Date) {
        self.calendar.select(date);
        self.state = AppState::Editing(TaskEditorState::new(date));
    }

    fn submit_editor(&mut self) -> bool {
        let AppState::Editing(editor) = &mut self.state else {
            return false;
        };
        let date = editor.date();
        let text = editor.text().to_owned();
        match self.store.add(date, &text) {
            Ok(outcome) => {
                self.state = AppState::Calendar;
                self.note_outcome(outcome);
                self.calendar.invalidate();
                true
            }
            Err(TaskError::EmptyText) => {
                editor.set_error("请输入待办事项内容");
                true
            }
        }
    }

    fn toggle_selected_task(&mut self) -> bool {
        let date = self.calendar.selected();
        let Some(id) = self
            .panel
            .selected(self.store.tasks_for(date))
            .map(|task| task.id)
        else {
            return false;
        };
        let outcome = self.store.toggle_completed(date, id);
        self.panel.auto_switch(self.store.tasks_for(date));
        self.note_outcome(outcome);
        self.calendar.invalidate();
        true
    }

    fn confirm_delete(&mut self) -> bool {
        let date = self.calendar.selected();
        let Some(id) = self
            .panel
            .selected(self.store.tasks_for(date))
            .map(|task| task.id)
        else {
            return false;
        };
        self.state = AppState::ConfirmingDelete { date, id };
        true
    }

    fn delete_task(&mut self, date: Date, id: u64) {
        let outcome = self.store.remove(date, id);
        self.state = AppState::Calendar;
        self.panel.clamp(self.store.tasks_for(date));
        self.note_outcome(outcome);
        self.calendar.invalidate();
    }

    fn note_outcome(&mut self, outcome: SaveOutcome) {
        if outcome == SaveOutcome::Failed {
            self.status = Some(String::from("保存失败，请检查存储权限"));
        }
    }
}

impl<A: Almanac, S: TaskStorage> Widget for &mut App<A, S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        let [main_area, status_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
        let [calendar_area, panel_area] =
            Layout::horizontal([Constraint::Length(CALENDAR_WIDTH), Constraint::Min(0)])
                .areas(main_area);
        let store = &self.store;
        self.calendar.ensure_grid(|date| store.has_incomplete(date));
        MonthGridWidget::new().render(calendar_area, buf, &mut self.calendar);
        let selected = self.calendar.selected();
        TaskPanel::new(selected, self.store.tasks_for(selected)).render(
            panel_area,
            buf,
            &mut self.panel,
        );
        if status_area.height > 0 {
            if let Some(status) = &self.status {
                buf.set_stringn(
                    status_area.x + 1,
                    status_area.y,
                    status,
                    usize::from(status_area.width.saturating_sub(1)),
                    STATUS_STYLE,
                );
            }
        }
        match &mut self.state {
            AppState::Editing(editor) => TaskEditor.render(area, buf, editor),
            AppState::ConfirmingDelete { date, id } => {
                let text = self
                    .store
                    .tasks_for(*date)
                    .iter()
                    .find(|task| task.id == *id)
                    .map_or("", |task| task.text.as_str());
                ConfirmDelete::new(text).render(area, buf);
            }
            AppState::Helping => Help(BASE_STYLE).render(area, buf),
            AppState::Calendar | AppState::Quitting => (),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum AppState {
    Calendar,
    Helping,
    Editing(TaskEditorState),
    ConfirmingDelete { date: Date, id: u64 },
    Quitting,
}
