//! Persistence bridge: a named slot in a small key-value store.
//!
//! The whole task list is one JSON document in one slot. It is rewritten in
//! full after every change and read back once at startup.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::task_store::TaskList;

/// Slot name used when the config does not set one.
pub const DEFAULT_SLOT: &str = "todos";

/// Temporary file suffix for atomic writes.
const TMP_SUFFIX: &str = ".tmp";

/// Key-value backend holding persisted slots.
pub trait SlotStore {
    /// Reads a slot. `Ok(None)` when the slot was never written.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Overwrites a slot.
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Slots stored as `<dir>/<key>.json` files.
#[derive(Debug, Clone)]
pub struct FileSlots {
    dir: PathBuf,
}

impl FileSlots {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn tmp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json{TMP_SUFFIX}"))
    }
}

impl SlotStore for FileSlots {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let tmp_path = self.tmp_path(key);
        let written = File::create(&tmp_path)
            .and_then(|mut tmp_file| {
                tmp_file.write_all(value.as_bytes())?;
                tmp_file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp_path, self.slot_path(key)));

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }
}

/// In-process slots, lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemorySlots {
    slots: HashMap<String, String>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemorySlots {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Saves and restores a [`TaskList`] in one named slot.
#[derive(Debug, Clone)]
pub struct Persistence<S> {
    slots: S,
    slot: String,
}

impl<S: SlotStore> Persistence<S> {
    pub fn new(slots: S, slot: impl Into<String>) -> Self {
        Self {
            slots,
            slot: slot.into(),
        }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn slots(&self) -> &S {
        &self.slots
    }

    /// Serializes the whole list and overwrites the slot.
    pub fn save(&mut self, tasks: &TaskList) -> Result<()> {
        let json = serde_json::to_string(tasks)?;
        self.slots.write(&self.slot, &json)
    }

    /// Reads the slot back. Absent, unreadable, or malformed state yields an
    /// empty list; the cause is only logged.
    pub fn restore(&self) -> TaskList {
        let raw = match self.slots.read(&self.slot) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(slot = %self.slot, "no saved tasks, starting empty");
                return TaskList::new();
            }
            Err(e) => {
                warn!(slot = %self.slot, "failed to read saved tasks: {e}. Starting empty.");
                return TaskList::new();
            }
        };

        match Self::parse(&raw) {
            Ok(tasks) => {
                debug!(slot = %self.slot, count = tasks.len(), "restored tasks");
                tasks
            }
            Err(e) => {
                warn!(slot = %self.slot, "corrupted saved tasks: {e}. Starting empty.");
                TaskList::new()
            }
        }
    }

    fn parse(raw: &str) -> Result<TaskList> {
        let tasks: TaskList = serde_json::from_str(raw)?;
        tasks.validate()?;
        Ok(tasks)
    }
}
