use crate::error::{Result, TaskifyError};
use crate::progress::compute_progress;
use crate::storage::{Persistence, SlotStore};
use crate::task::{Category, Task, TaskId};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Ordered task collection. Insertion order is kept; deletes remove in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Appends a task with trimmed `text`. Returns `None` without touching the
    /// list when the trimmed text is empty.
    pub fn add(&mut self, text: &str, category: Category) -> Option<TaskId> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let id = self.fresh_id(now);
        self.tasks.push(Task::new(id.clone(), text, category));
        Some(id)
    }

    /// Flips `completed` on the matching task. Returns whether one matched.
    pub fn toggle_complete(&mut self, id: &TaskId) -> bool {
        match self.tasks.iter_mut().find(|t| &t.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        }
    }

    /// Removes the matching task. Returns whether one matched.
    pub fn delete(&mut self, id: &TaskId) -> bool {
        match self.tasks.iter().position(|t| &t.id == id) {
            Some(index) => {
                self.tasks.remove(index);
                true
            }
            None => false,
        }
    }

    /// Checks the invariants a deserialized list cannot guarantee by type:
    /// unique ids and non-blank text.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.tasks.len());
        for task in &self.tasks {
            if task.text.trim().is_empty() {
                return Err(TaskifyError::MalformedState {
                    reason: format!("task {} has empty text", task.id),
                });
            }
            if !seen.insert(&task.id) {
                return Err(TaskifyError::MalformedState {
                    reason: format!("duplicate task id {}", task.id),
                });
            }
        }
        Ok(())
    }

    // Timestamp id, bumped past every unsigned id already present. When that
    // would overflow, the next free number after `now_ms` is taken instead.
    fn fresh_id(&self, now_ms: u64) -> TaskId {
        let taken: HashSet<u64> = self.tasks.iter().filter_map(|t| t.id.as_u64()).collect();
        let mut candidate = match taken.iter().max() {
            Some(&max) => max.checked_add(1).map_or(now_ms, |next| next.max(now_ms)),
            None => now_ms,
        };
        while taken.contains(&candidate) {
            candidate = candidate.wrapping_add(1);
        }
        TaskId::from(candidate)
    }
}

impl FromIterator<Task> for TaskList {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        Self {
            tasks: iter.into_iter().collect(),
        }
    }
}

/// Owns the canonical task list and writes it through to a slot after every
/// change.
#[derive(Debug)]
pub struct TaskStore<S> {
    tasks: TaskList,
    persistence: Persistence<S>,
}

impl<S: SlotStore> TaskStore<S> {
    /// Empty store; nothing is read until [`TaskStore::load`].
    pub fn new(persistence: Persistence<S>) -> Self {
        Self {
            tasks: TaskList::new(),
            persistence,
        }
    }

    /// New store rehydrated from its slot.
    pub fn open(persistence: Persistence<S>) -> Self {
        let mut store = Self::new(persistence);
        store.load();
        store
    }

    /// Replaces the in-memory list with whatever the slot holds.
    pub fn load(&mut self) {
        self.tasks = self.persistence.restore();
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn progress(&self) -> u8 {
        compute_progress(&self.tasks)
    }

    pub fn add(&mut self, text: &str, category: Category) -> Option<TaskId> {
        let id = self.tasks.add(text, category)?;
        debug!(%id, %category, "added task");
        self.sync();
        Some(id)
    }

    pub fn toggle_complete(&mut self, id: &TaskId) -> bool {
        let changed = self.tasks.toggle_complete(id);
        if changed {
            debug!(%id, "toggled task");
            self.sync();
        }
        changed
    }

    pub fn delete(&mut self, id: &TaskId) -> bool {
        let changed = self.tasks.delete(id);
        if changed {
            debug!(%id, "deleted task");
            self.sync();
        }
        changed
    }

    fn sync(&mut self) {
        if let Err(err) = self.persistence.save(&self.tasks) {
            warn!(slot = %self.persistence.slot(), "Failed to save tasks: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemorySlots, DEFAULT_SLOT};

    fn memory_store() -> TaskStore<MemorySlots> {
        TaskStore::new(Persistence::new(MemorySlots::new(), DEFAULT_SLOT))
    }

    fn saved(store: &TaskStore<MemorySlots>) -> Option<String> {
        store.persistence().slots().read(DEFAULT_SLOT).unwrap()
    }

    #[test]
    fn test_add_appends_incomplete_trimmed_task() {
        let mut tasks = TaskList::new();
        let id = tasks.add("  Buy milk \n", Category::Personal).unwrap();

        assert_eq!(tasks.len(), 1);
        let task = tasks.get(&id).unwrap();
        assert_eq!(task.text, "Buy milk");
        assert!(!task.completed);
        assert_eq!(task.category, Category::Personal);
    }

    #[test]
    fn test_add_rejects_blank_text() {
        let mut tasks = TaskList::new();
        tasks.add("keep", Category::Work);
        let before = tasks.clone();

        assert_eq!(tasks.add("", Category::Work), None);
        assert_eq!(tasks.add("   ", Category::Study), None);
        assert_eq!(tasks.add("\t\n", Category::Personal), None);
        assert_eq!(tasks, before);
    }

    #[test]
    fn test_rapid_adds_get_unique_ids() {
        let mut tasks = TaskList::new();
        for i in 0..100 {
            tasks.add(&format!("task {i}"), Category::Work);
        }
        assert_eq!(tasks.len(), 100);
        assert!(tasks.validate().is_ok());
    }

    #[test]
    fn test_fresh_id_skips_past_existing_numbers() {
        let tasks: TaskList = [
            Task::new(TaskId::from(50_u64), "a", Category::Work),
            Task::new(TaskId::Text("x".into()), "b", Category::Work),
        ]
        .into_iter()
        .collect();
        assert_eq!(tasks.fresh_id(10), TaskId::from(51_u64));
        assert_eq!(tasks.fresh_id(900), TaskId::from(900_u64));
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut tasks = TaskList::new();
        for text in ["one", "two", "three"] {
            tasks.add(text, Category::Work);
        }
        let texts: Vec<&str> = tasks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["one", "two", "three"]);
    }

    #[test]
    fn test_toggle_flips_only_the_matching_task() {
        let mut tasks = TaskList::new();
        let a = tasks.add("a", Category::Work).unwrap();
        let b = tasks.add("b", Category::Study).unwrap();
        let before = tasks.clone();

        assert!(tasks.toggle_complete(&b));
        assert_eq!(tasks.get(&a), before.get(&a));
        let toggled = tasks.get(&b).unwrap();
        assert!(toggled.completed);
        assert_eq!(toggled.text, "b");
        assert_eq!(toggled.category, Category::Study);

        assert!(tasks.toggle_complete(&b));
        assert_eq!(tasks, before);
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut tasks = TaskList::new();
        tasks.add("a", Category::Work);
        let before = serde_json::to_string(&tasks).unwrap();
        let missing = TaskId::Text("missing".to_string());

        assert!(!tasks.toggle_complete(&missing));
        assert!(!tasks.delete(&missing));
        assert_eq!(serde_json::to_string(&tasks).unwrap(), before);
    }

    #[test]
    fn test_delete_keeps_relative_order() {
        let mut tasks = TaskList::new();
        let ids: Vec<TaskId> = ["a", "b", "c", "d"]
            .into_iter()
            .filter_map(|t| tasks.add(t, Category::Work))
            .collect();

        assert!(tasks.delete(&ids[1]));
        let texts: Vec<&str> = tasks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["a", "c", "d"]);
        assert!(tasks.get(&ids[1]).is_none());
    }

    #[test]
    fn test_store_syncs_after_each_mutation() {
        let mut store = memory_store();
        assert_eq!(saved(&store), None);

        let id = store.add("Buy milk", Category::Personal).unwrap();
        let after_add: TaskList = serde_json::from_str(&saved(&store).unwrap()).unwrap();
        assert_eq!(&after_add, store.tasks());

        store.toggle_complete(&id);
        let after_toggle: TaskList = serde_json::from_str(&saved(&store).unwrap()).unwrap();
        assert!(after_toggle.get(&id).unwrap().completed);

        store.delete(&id);
        assert_eq!(saved(&store).as_deref(), Some("[]"));
    }

    #[test]
    fn test_store_rejected_add_does_not_write() {
        let mut store = memory_store();
        assert_eq!(store.add("   ", Category::Work), None);
        assert_eq!(saved(&store), None);
    }

    #[test]
    fn test_store_progress_tracks_mutations() {
        let mut store = memory_store();
        assert_eq!(store.progress(), 0);
        let id = store.add("a", Category::Work).unwrap();
        store.add("b", Category::Work);
        store.toggle_complete(&id);
        assert_eq!(store.progress(), 50);
    }

    #[test]
    fn test_load_replaces_current_list() {
        let mut slots = MemorySlots::new();
        slots
            .write(
                DEFAULT_SLOT,
                r#"[{"id":7,"text":"saved","completed":true,"category":"study"}]"#,
            )
            .unwrap();
        let mut store = TaskStore::new(Persistence::new(slots, DEFAULT_SLOT));
        assert!(store.tasks().is_empty());

        store.load();
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks().get(&TaskId::from(7_u64)).unwrap().text, "saved");
        assert_eq!(store.progress(), 100);
    }

    #[test]
    fn test_fresh_id_never_reuses_max_id() {
        let tasks: TaskList = [
            Task::new(TaskId::from(u64::MAX), "a", Category::Work),
            Task::new(TaskId::from(10_u64), "b", Category::Work),
        ]
        .into_iter()
        .collect();
        assert_eq!(tasks.fresh_id(10), TaskId::from(11_u64));
        assert_eq!(tasks.fresh_id(500), TaskId::from(500_u64));
    }

    #[test]
    fn test_add_after_max_id_survives_restart() {
        let mut slots = MemorySlots::new();
        slots
            .write(
                DEFAULT_SLOT,
                r#"[{"id":18446744073709551615,"text":"old","completed":false,"category":"work"}]"#,
            )
            .unwrap();
        let mut store = TaskStore::open(Persistence::new(slots, DEFAULT_SLOT));

        let id = store.add("new", Category::Work).unwrap();
        assert_ne!(id, TaskId::from(u64::MAX));
        assert!(store.tasks().validate().is_ok());

        let raw = saved(&store).unwrap();
        let mut slots = MemorySlots::new();
        slots.write(DEFAULT_SLOT, &raw).unwrap();
        let reopened = TaskStore::open(Persistence::new(slots, DEFAULT_SLOT));
        assert_eq!(reopened.tasks().len(), 2);
    }

    #[derive(Debug)]
    struct ReadOnlySlots;

    impl SlotStore for ReadOnlySlots {
        fn read(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn write(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }
    }

    #[test]
    fn test_failed_save_keeps_session_going() {
        let mut store = TaskStore::open(Persistence::new(ReadOnlySlots, DEFAULT_SLOT));

        let a = store.add("a", Category::Work).unwrap();
        let b = store.add("b", Category::Study).unwrap();
        assert_eq!(store.tasks().len(), 2);

        assert!(store.toggle_complete(&a));
        assert!(store.tasks().get(&a).unwrap().completed);
        assert_eq!(store.progress(), 50);

        assert!(store.delete(&b));
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.progress(), 100);
    }
}
