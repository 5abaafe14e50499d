use log::warn;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings read from `config.toml` in the platform config directory.
/// Every field has a default; a missing file just means defaults.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub(crate) struct Config {
    /// Two clicks on the same day within this window count as a double
    /// click and open the task editor.
    pub(crate) double_click_ms: u64,
    /// Directory for the task document, overriding the platform default.
    pub(crate) data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            double_click_ms: 400,
            data_dir: None,
        }
    }
}

impl Config {
    pub(crate) fn load() -> Config {
        match config_dir() {
            Some(dir) => Config::load_from(&dir.join("config.toml")),
            None => Config::default(),
        }
    }

    fn load_from(path: &Path) -> Config {
        let Ok(text) = std::fs::read_to_string(path) else {
            return Config::default();
        };
        match toml::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring malformed config {}: {e}", path.display());
                Config::default()
            }
        }
    }

    pub(crate) fn double_click_window(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }
}

fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("huangli"))
}

/// Location of the user holiday-table override, if a config directory
/// exists at all.
pub(crate) fn holiday_override_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("holidays.toml"))
}
