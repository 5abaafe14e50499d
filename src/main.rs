mod app;
mod calendar;
mod clicks;
mod config;
mod confirm;
mod editor;
mod help;
mod holidays;
mod logging;
mod lunar;
mod panel;
mod storage;
mod tasks;
mod theme;
use crate::app::App;
use crate::calendar::{CalendarState, GridBuilder};
use crate::config::Config;
use crate::holidays::HolidayTable;
use crate::lunar::ChineseAlmanac;
use crate::tasks::TaskStore;
use anyhow::Context;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use lexopt::{Arg, Parser, ValueExt};
use log::info;
use ratatui::DefaultTerminal;
use std::io;
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run { date: Option<Date> },
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut date = None;
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Value(value) if date.is_none() => {
                    let value = value.string()?;
                    match Date::parse(&value, &YMD_FMT) {
                        Ok(d) => date = Some(d),
                        Err(e) => {
                            return Err(lexopt::Error::ParsingFailed {
                                value,
                                error: Box::new(e),
                            })
                        }
                    }
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run { date })
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run { date } => {
                // Logging comes up before anything that might warn.
                let _logger = logging::default_dir().and_then(|dir| logging::init(&dir));
                info!("{} {} starting", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                let config = Config::load();
                let storage = storage::open_default(config.data_dir.as_deref());
                info!("task document: {}", storage.location());
                let holidays =
                    HolidayTable::load_with_override(config::holiday_override_path().as_deref());
                if let Some((first, last)) = holidays.year_range() {
                    info!("holiday data covers {first}..={last}");
                }
                let store = TaskStore::open(storage);
                info!(
                    "loaded {} task(s) across {} day(s)",
                    store.document().task_count(),
                    store.document().day_count()
                );
                let today = OffsetDateTime::now_local()
                    .context("failed to determine local date")?
                    .date();
                let mut calendar =
                    CalendarState::new(GridBuilder::new(ChineseAlmanac, holidays), today);
                if let Some(date) = date {
                    calendar = calendar.start_date(date);
                }
                let app = App::new(calendar, store, config.double_click_window());
                with_terminal(|mut terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    app.run(terminal)?;
                    Ok(())
                })
            }
            Command::Help => {
                println!("Usage: huangli [YYYY-MM-DD]");
                println!();
                println!("Terminal calendar with lunar dates, holiday markers, and per-day to-dos");
                println!();
                println!("Options:");
                println!("  -h, --help        Display this help message and exit");
                println!("  -V, --version     Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let mouse = execute!(io::stdout(), EnableMouseCapture).is_ok();
    let r = func(terminal);
    if mouse {
        let _ = execute!(io::stdout(), DisableMouseCapture);
    }
    ratatui::restore();
    r
}
