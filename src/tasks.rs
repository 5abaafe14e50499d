use crate::storage::{StorageError, TaskStorage};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use time::{Date, OffsetDateTime};

/// One to-do item, as stored in the JSON document.
///
/// Fields this program does not know about are kept in `extra` and written
/// back untouched, so a document shared with other tools survives editing.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) struct Task {
    pub(crate) id: u64,
    pub(crate) text: String,
    pub(crate) completed: bool,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub(crate) created_at: OffsetDateTime,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Task {
    pub(crate) fn new(id: u64, text: &str) -> Task {
        Task {
            id,
            text: text.to_owned(),
            completed: false,
            created_at: OffsetDateTime::now_utc(),
            extra: Map::new(),
        }
    }
}

/// The whole persisted document: date keys mapping to task lists.
///
/// `BTreeMap` keeps the serialized output in date order, so successive
/// saves diff cleanly.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) struct TaskDocument {
    #[serde(flatten)]
    buckets: BTreeMap<String, Vec<Task>>,
}

impl TaskDocument {
    pub(crate) fn contains_date(&self, date: Date) -> bool {
        self.buckets.contains_key(&date_key(date))
    }

    pub(crate) fn task_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub(crate) fn day_count(&self) -> usize {
        self.buckets.len()
    }
}

/// Document key for a date, e.g. `2026-02-15`.
pub(crate) fn date_key(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SaveOutcome {
    Saved,
    /// The in-memory document changed but could not be written out.
    Failed,
    Unchanged,
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub(crate) enum TaskError {
    #[error("task text cannot be empty")]
    EmptyText,
}

/// In-memory task document plus the storage it is saved to.
///
/// The document is read once at startup and rewritten whole after every
/// mutation.  A failed write keeps the in-memory change so the session
/// stays usable; the failure is surfaced through [`SaveOutcome::Failed`].
#[derive(Debug)]
pub(crate) struct TaskStore<S> {
    storage: S,
    doc: TaskDocument,
    last_id: u64,
}

impl<S: TaskStorage> TaskStore<S> {
    pub(crate) fn open(storage: S) -> TaskStore<S> {
        let doc = match storage.read_document() {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!("task document is unreadable, starting empty: {e}");
                    TaskDocument::default()
                }
            },
            Err(StorageError::NotFound) => TaskDocument::default(),
            Err(e) => {
                warn!("could not read task document, starting empty: {e}");
                TaskDocument::default()
            }
        };
        let last_id = doc
            .buckets
            .values()
            .flatten()
            .map(|t| t.id)
            .max()
            .unwrap_or(0);
        TaskStore {
            storage,
            doc,
            last_id,
        }
    }

    /// Add a task for `date`.  Leading and trailing whitespace is dropped;
    /// text that is empty afterwards is rejected before anything changes.
    pub(crate) fn add(&mut self, date: Date, text: &str) -> Result<SaveOutcome, TaskError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TaskError::EmptyText);
        }
        let task = Task::new(self.next_id(), text);
        self.doc
            .buckets
            .entry(date_key(date))
            .or_default()
            .push(task);
        Ok(self.persist())
    }

    /// Remove the task with `id` under `date`.  A bucket emptied by the
    /// removal disappears from the document entirely.
    pub(crate) fn remove(&mut self, date: Date, id: u64) -> SaveOutcome {
        let key = date_key(date);
        let Some(bucket) = self.doc.buckets.get_mut(&key) else {
            return SaveOutcome::Unchanged;
        };
        let before = bucket.len();
        bucket.retain(|t| t.id != id);
        if bucket.len() == before {
            return SaveOutcome::Unchanged;
        }
        if bucket.is_empty() {
            self.doc.buckets.remove(&key);
        }
        self.persist()
    }

    pub(crate) fn toggle_completed(&mut self, date: Date, id: u64) -> SaveOutcome {
        let Some(task) = self
            .doc
            .buckets
            .get_mut(&date_key(date))
            .and_then(|bucket| bucket.iter_mut().find(|t| t.id == id))
        else {
            return SaveOutcome::Unchanged;
        };
        task.completed = !task.completed;
        self.persist()
    }

    pub(crate) fn tasks_for(&self, date: Date) -> &[Task] {
        self.doc
            .buckets
            .get(&date_key(date))
            .map_or(&[], Vec::as_slice)
    }

    /// Whether `date` has at least one open task (drives the calendar dot).
    pub(crate) fn has_incomplete(&self, date: Date) -> bool {
        self.tasks_for(date).iter().any(|t| !t.completed)
    }

    pub(crate) fn document(&self) -> &TaskDocument {
        &self.doc
    }

    fn persist(&self) -> SaveOutcome {
        let raw = match serde_json::to_string_pretty(&self.doc) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("could not serialize task document: {e}");
                return SaveOutcome::Failed;
            }
        };
        match self.storage.write_document(&raw) {
            Ok(()) => SaveOutcome::Saved,
            Err(e) => {
                warn!("could not save task document: {e}");
                SaveOutcome::Failed
            }
        }
    }

    // Wall-clock milliseconds like the ids in documents written by earlier
    // versions, bumped past the latest loaded id so a run never repeats one.
    fn next_id(&mut self) -> u64 {
        let id = clock_millis().max(self.last_id.saturating_add(1));
        self.last_id = id;
        id
    }
}

fn clock_millis() -> u64 {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    u64::try_from(millis).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::io;
    use time::macros::date;

    struct FailingStorage;

    impl TaskStorage for FailingStorage {
        fn read_document(&self) -> Result<String, StorageError> {
            Err(StorageError::NotFound)
        }

        fn write_document(&self, _raw: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "denied",
            )))
        }
    }

    #[test]
    fn add_and_read_back() {
        let mut store = TaskStore::open(MemoryStorage::default());
        let day = date!(2026 - 02 - 15);
        assert_eq!(store.add(day, "买菜"), Ok(SaveOutcome::Saved));
        let tasks = store.tasks_for(day);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "买菜");
        assert!(!tasks[0].completed);
        assert!(store.tasks_for(date!(2026 - 02 - 16)).is_empty());
    }

    #[test]
    fn text_is_trimmed_and_empty_text_is_rejected() {
        let mut store = TaskStore::open(MemoryStorage::default());
        let day = date!(2026 - 02 - 15);
        assert_eq!(store.add(day, "  \t "), Err(TaskError::EmptyText));
        assert!(store.tasks_for(day).is_empty(), "rejected add should change nothing");
        store.add(day, "  买菜  ").unwrap();
        assert_eq!(store.tasks_for(day)[0].text, "买菜");
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut store = TaskStore::open(MemoryStorage::default());
        let day = date!(2026 - 02 - 15);
        store.add(day, "a").unwrap();
        store.add(day, "b").unwrap();
        let tasks = store.tasks_for(day);
        assert!(tasks[1].id > tasks[0].id, "second id should be larger");
    }

    #[test]
    fn document_survives_reopen() {
        let storage = MemoryStorage::default();
        let day = date!(2026 - 02 - 15);
        let mut store = TaskStore::open(storage.clone());
        store.add(day, "买菜").unwrap();
        let reopened = TaskStore::open(storage);
        assert_eq!(reopened.tasks_for(day).len(), 1);
        assert_eq!(reopened.tasks_for(day)[0].text, "买菜");
    }

    #[test]
    fn toggle_flips_and_unknown_id_is_unchanged() {
        let mut store = TaskStore::open(MemoryStorage::default());
        let day = date!(2026 - 02 - 15);
        store.add(day, "买菜").unwrap();
        let id = store.tasks_for(day)[0].id;
        assert_eq!(store.toggle_completed(day, id), SaveOutcome::Saved);
        assert!(store.tasks_for(day)[0].completed);
        assert_eq!(store.toggle_completed(day, id), SaveOutcome::Saved);
        assert!(!store.tasks_for(day)[0].completed);
        assert_eq!(store.toggle_completed(day, id + 1), SaveOutcome::Unchanged);
        assert_eq!(store.toggle_completed(date!(2026 - 02 - 16), id), SaveOutcome::Unchanged);
    }

    #[test]
    fn removing_last_task_drops_the_bucket() {
        let storage = MemoryStorage::default();
        let day = date!(2026 - 02 - 15);
        let mut store = TaskStore::open(storage.clone());
        store.add(day, "买菜").unwrap();
        let id = store.tasks_for(day)[0].id;
        assert_eq!(store.remove(day, id), SaveOutcome::Saved);
        assert!(!store.document().contains_date(day), "empty bucket should be dropped");
        let raw = storage.read_document().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value.get(date_key(day)), None, "saved JSON should not keep the key");
    }

    #[test]
    fn remove_of_unknown_id_is_unchanged() {
        let mut store = TaskStore::open(MemoryStorage::default());
        let day = date!(2026 - 02 - 15);
        store.add(day, "买菜").unwrap();
        assert_eq!(store.remove(day, 1), SaveOutcome::Unchanged);
        assert_eq!(store.tasks_for(day).len(), 1);
    }

    #[test]
    fn has_incomplete_tracks_open_tasks_only() {
        let mut store = TaskStore::open(MemoryStorage::default());
        let day = date!(2026 - 02 - 15);
        assert!(!store.has_incomplete(day));
        store.add(day, "买菜").unwrap();
        assert!(store.has_incomplete(day));
        let id = store.tasks_for(day)[0].id;
        store.toggle_completed(day, id);
        assert!(!store.has_incomplete(day), "all-done day should lose its dot");
    }

    #[test]
    fn unknown_fields_survive_a_rewrite() {
        let storage = MemoryStorage::default();
        storage
            .write_document(concat!(
                "{\n",
                "  \"2026-02-15\": [\n",
                "    {\n",
                "      \"id\": 7,\n",
                "      \"text\": \"老数据\",\n",
                "      \"completed\": false,\n",
                "      \"createdAt\": \"2026-02-15T08:00:00Z\",\n",
                "      \"priority\": \"high\"\n",
                "    }\n",
                "  ]\n",
                "}\n",
            ))
            .unwrap();
        let mut store = TaskStore::open(storage.clone());
        let day = date!(2026 - 02 - 15);
        store.toggle_completed(day, 7);
        let value: Value = serde_json::from_str(&storage.read_document().unwrap()).unwrap();
        let task = &value[&date_key(day)][0];
        assert_eq!(task["priority"], "high", "unknown field should be written back");
        assert_eq!(task["completed"], true);
    }

    #[test]
    fn new_ids_clear_the_highest_loaded_id() {
        let storage = MemoryStorage::default();
        storage
            .write_document(concat!(
                "{\n",
                "  \"2026-02-15\": [\n",
                "    {\"id\": 99999999999999, \"text\": \"旧\", \"completed\": true,\n",
                "     \"createdAt\": \"2026-02-15T08:00:00Z\"}\n",
                "  ]\n",
                "}\n",
            ))
            .unwrap();
        let mut store = TaskStore::open(storage);
        let day = date!(2026 - 02 - 16);
        store.add(day, "新").unwrap();
        assert!(store.tasks_for(day)[0].id > 99_999_999_999_999);
    }

    #[test]
    fn maximal_loaded_id_still_accepts_new_tasks() {
        let storage = MemoryStorage::default();
        storage
            .write_document(concat!(
                "{\n",
                "  \"2026-02-15\": [\n",
                "    {\"id\": 18446744073709551615, \"text\": \"旧\", \"completed\": false,\n",
                "     \"createdAt\": \"2026-02-15T08:00:00Z\"}\n",
                "  ]\n",
                "}\n",
            ))
            .unwrap();
        let mut store = TaskStore::open(storage);
        let day = date!(2026 - 02 - 15);
        assert_eq!(store.add(day, "新"), Ok(SaveOutcome::Saved));
        assert_eq!(store.tasks_for(day).len(), 2);
    }

    #[test]
    fn corrupt_document_starts_empty() {
        let storage = MemoryStorage::default();
        storage.write_document("not json").unwrap();
        let store = TaskStore::open(storage);
        assert_eq!(store.document().task_count(), 0);
        assert_eq!(store.document().day_count(), 0);
    }

    #[test]
    fn failed_write_keeps_the_change_in_memory() {
        let mut store = TaskStore::open(FailingStorage);
        let day = date!(2026 - 02 - 15);
        assert_eq!(store.add(day, "买菜"), Ok(SaveOutcome::Failed));
        assert_eq!(store.tasks_for(day).len(), 1, "change should stay visible this session");
    }

    #[test]
    fn date_key_format() {
        assert_eq!(date_key(date!(2026 - 02 - 05)), "2026-02-05");
        assert_eq!(date_key(date!(2026 - 12 - 31)), "2026-12-31");
    }
}
