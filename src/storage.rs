use log::warn;
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

const TASKS_FILE: &str = "tasks.json";

#[derive(Debug, Error)]
pub(crate) enum StorageError {
    #[error("no saved task document")]
    NotFound,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Where the serialized task document lives.
///
/// Implementations hold a whole JSON document as an opaque string; all
/// structure above that is [`crate::tasks::TaskStore`]'s business.
pub(crate) trait TaskStorage {
    fn read_document(&self) -> Result<String, StorageError>;
    fn write_document(&self, raw: &str) -> Result<(), StorageError>;
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub(crate) fn new(path: PathBuf) -> FileStorage {
        FileStorage { path }
    }
}

impl TaskStorage for FileStorage {
    fn read_document(&self) -> Result<String, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StorageError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    fn write_document(&self, raw: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// In-memory stand-in used when no writable directory exists, and as the
/// storage double in tests.  Clones share the same document.
#[derive(Clone, Debug, Default)]
pub(crate) struct MemoryStorage {
    doc: Rc<RefCell<Option<String>>>,
}

impl TaskStorage for MemoryStorage {
    fn read_document(&self) -> Result<String, StorageError> {
        self.doc.borrow().clone().ok_or(StorageError::NotFound)
    }

    fn write_document(&self, raw: &str) -> Result<(), StorageError> {
        *self.doc.borrow_mut() = Some(raw.to_owned());
        Ok(())
    }
}

/// Concrete storage picked at startup.
#[derive(Clone, Debug)]
pub(crate) enum AnyStorage {
    File(FileStorage),
    Memory(MemoryStorage),
}

impl AnyStorage {
    /// Human-readable location for startup reporting.
    pub(crate) fn location(&self) -> String {
        match self {
            AnyStorage::File(f) => f.path.display().to_string(),
            AnyStorage::Memory(_) => String::from("memory (not persisted)"),
        }
    }
}

impl TaskStorage for AnyStorage {
    fn read_document(&self) -> Result<String, StorageError> {
        match self {
            AnyStorage::File(f) => f.read_document(),
            AnyStorage::Memory(m) => m.read_document(),
        }
    }

    fn write_document(&self, raw: &str) -> Result<(), StorageError> {
        match self {
            AnyStorage::File(f) => f.write_document(raw),
            AnyStorage::Memory(m) => m.write_document(raw),
        }
    }
}

/// Pick the task document location: an explicit directory from the config
/// file, else the platform data directory, else a dot-directory in `$HOME`,
/// else memory.
pub(crate) fn open_default(data_dir: Option<&Path>) -> AnyStorage {
    if let Some(dir) = data_dir {
        return AnyStorage::File(FileStorage::new(dir.join(TASKS_FILE)));
    }
    if let Some(dir) = dirs::data_local_dir() {
        return AnyStorage::File(FileStorage::new(dir.join("huangli").join(TASKS_FILE)));
    }
    if let Some(home) = dirs::home_dir() {
        return AnyStorage::File(FileStorage::new(home.join(".huangli").join(TASKS_FILE)));
    }
    warn!("no writable data directory found; tasks will not outlive this session");
    AnyStorage::Memory(MemoryStorage::default())
}
