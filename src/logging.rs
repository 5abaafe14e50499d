use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming};
use std::path::{Path, PathBuf};

const BASENAME: &str = "huangli";
const MAX_LOG_BYTES: u64 = 1024 * 1024;
const KEPT_LOGS: usize = 3;

/// Default log directory, beside the task document's default location.
pub(crate) fn default_dir() -> Option<PathBuf> {
    dirs::data_local_dir()
        .map(|dir| dir.join("huangli"))
        .or_else(|| dirs::home_dir().map(|home| home.join(".huangli")))
        .map(|dir| dir.join("logs"))
}

/// Starts logging to a rotated file under `dir`.  The terminal belongs to
/// the UI, so nothing may be written to stdout or stderr.
///
/// The returned handle must be kept alive for the life of the process.
/// `None` means logging could not be set up; the program runs without it.
/// `RUST_LOG` overrides the default `info` level.
pub(crate) fn init(dir: &Path) -> Option<LoggerHandle> {
    std::fs::create_dir_all(dir).ok()?;
    Logger::try_with_env_or_str("info")
        .ok()?
        .log_to_file(FileSpec::default().directory(dir).basename(BASENAME))
        .rotate(
            Criterion::Size(MAX_LOG_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEPT_LOGS),
        )
        .append()
        .start()
        .ok()
}
