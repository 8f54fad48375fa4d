//! The task store: one user's task list, mirrored to durable storage.
//!
//! `TaskStore` owns the canonical in-memory list for the active session. It is
//! read once from the `tasks-<username>` entry when constructed and written back
//! in full after every mutation. Storage failures never abort an operation;
//! they are turned into [`Notice`]s and the in-memory list stays authoritative.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::error::StorageError;
use crate::fields::Priority;
use crate::session::tasks_key;
use crate::storage::KeyValueStore;
use crate::task::{Task, TaskDraft};

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient, non-blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    fn success(message: &str) -> Self {
        Notice { level: NoticeLevel::Success, title: "Success".into(), message: message.into() }
    }

    fn error(message: &str) -> Self {
        Notice { level: NoticeLevel::Error, title: "Error".into(), message: message.into() }
    }
}

pub const LOAD_FAILED: &str = "Could not load your tasks. Please try refreshing.";
pub const SAVE_FAILED: &str = "Could not save your tasks. Changes might be lost.";

/// Events delivered to subscribers.
#[derive(Debug)]
pub enum StoreEvent<'a> {
    /// The list changed; carries the full updated list.
    Changed(&'a [Task]),
    Notice(&'a Notice),
}

pub type Listener = Box<dyn FnMut(&StoreEvent<'_>)>;

/// Handle returned by [`TaskStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Task totals per completion state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub all: usize,
    pub pending: usize,
    pub completed: usize,
}

#[derive(Debug, Error)]
enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("invalid task json: {0}")]
    Json(#[from] serde_json::Error),
}

/// One user's task list bound to a storage back end.
pub struct TaskStore<S: KeyValueStore> {
    storage: S,
    key: String,
    tasks: Vec<Task>,
    revision: u64,
    notices: Vec<Notice>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Load `username`'s tasks from `storage`.
    ///
    /// An absent or empty list yields the sample tasks. A list that cannot be
    /// read or parsed also yields the sample tasks and queues an error notice.
    /// Successfully loaded lists are migrated. Loading never writes.
    pub fn load(storage: S, username: &str) -> Self {
        let key = tasks_key(username);
        let mut notices = Vec::new();
        let tasks = match read_tasks(&storage, &key) {
            Ok(Some(tasks)) if !tasks.is_empty() => {
                tracing::info!(username, count = tasks.len(), "tasks loaded");
                migrate(tasks)
            }
            Ok(_) => {
                tracing::info!(username, "no stored tasks, using samples");
                sample_tasks(Utc::now())
            }
            Err(e) => {
                tracing::warn!(username, error = %e, "failed to load tasks, using samples");
                notices.push(Notice::error(LOAD_FAILED));
                sample_tasks(Utc::now())
            }
        };

        TaskStore {
            storage,
            key,
            tasks,
            revision: 0,
            notices,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current list, most recently added first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Increments on every mutation of the in-memory list.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn counts(&self) -> TaskCounts {
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        TaskCounts {
            all: self.tasks.len(),
            pending: self.tasks.len() - completed,
            completed,
        }
    }

    /// Drain queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(sid, _)| *sid != id);
    }

    /// Create a task from `draft`, prepend it and persist.
    pub fn add(&mut self, draft: TaskDraft) -> Task {
        let mut id = Uuid::new_v4().to_string();
        while self.get(&id).is_some() {
            id = Uuid::new_v4().to_string();
        }
        let task = Task::from_draft(draft, id, iso(Utc::now()));
        self.tasks.insert(0, task.clone());
        tracing::info!(id = %task.id, title = %task.title, "task added");
        self.changed();
        if self.persist() {
            self.notify(Notice::success("Task added successfully."));
        }
        task
    }

    /// Replace the entry with `task.id` in place. The stored `createdAt` is kept.
    /// Returns `false` (and does nothing) if no such entry exists.
    pub fn update(&mut self, mut task: Task) -> bool {
        let Some(existing) = self.tasks.iter_mut().find(|t| t.id == task.id) else {
            tracing::debug!(id = %task.id, "update of missing task ignored");
            return false;
        };
        task.created_at = existing.created_at.clone();
        *existing = task;
        tracing::info!(id = %existing.id, "task updated");
        self.changed();
        if self.persist() {
            self.notify(Notice::success("Task updated successfully."));
        }
        true
    }

    /// Remove the entry with `id`. Deleting a missing id is not an error.
    /// Returns whether an entry was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            tracing::info!(id, "task deleted");
            self.changed();
        }
        if self.persist() {
            self.notify(Notice::success("Task deleted successfully."));
        }
        removed
    }

    /// Flip completion of the entry with `id`, returning the new state.
    /// Missing ids are ignored silently.
    pub fn toggle_completion(&mut self, id: &str) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.completed = !task.completed;
        let completed = task.completed;
        tracing::debug!(id, completed, "task toggled");
        self.changed();
        self.persist();
        Some(completed)
    }

    /// Give back the storage back end.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Write the full list. On failure the in-memory list is kept and an
    /// error notice is raised; nothing is retried.
    fn persist(&mut self) -> bool {
        let result = serde_json::to_string(&self.tasks)
            .map_err(StoreError::from)
            .and_then(|json| Ok(self.storage.save(&self.key, &json)?));
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to persist tasks");
                self.notify(Notice::error(SAVE_FAILED));
                false
            }
        }
    }

    fn changed(&mut self) {
        self.revision += 1;
        emit(&mut self.listeners, &StoreEvent::Changed(&self.tasks));
    }

    fn notify(&mut self, notice: Notice) {
        emit(&mut self.listeners, &StoreEvent::Notice(&notice));
        self.notices.push(notice);
    }
}

fn emit(listeners: &mut [(SubscriptionId, Listener)], event: &StoreEvent<'_>) {
    for (_, listener) in listeners.iter_mut() {
        listener(event);
    }
}

fn read_tasks<S: KeyValueStore>(storage: &S, key: &str) -> Result<Option<Vec<Task>>, StoreError> {
    let Some(raw) = storage.load(key)? else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&raw)?))
}

/// Fill in `createdAt` for legacy records, using the record's `id`.
///
/// Legacy ids were creation timestamps. Records that already have a creation
/// time are returned untouched, so running this twice changes nothing.
pub fn migrate(tasks: Vec<Task>) -> Vec<Task> {
    tasks
        .into_iter()
        .map(|mut task| {
            if task.is_legacy() {
                task.created_at = task.id.clone();
            }
            task
        })
        .collect()
}

/// Format a timestamp the way stored records carry it.
pub fn iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Sample tasks shown to users without stored data. Dates are relative to `now`.
pub fn sample_tasks(now: DateTime<Utc>) -> Vec<Task> {
    let day = Duration::days(1);
    let sample = |id: &str,
                  title: &str,
                  description: &str,
                  completed: bool,
                  priority: Priority,
                  category: &str,
                  due: Option<DateTime<Utc>>,
                  created: DateTime<Utc>| Task {
        id: id.to_string(),
        title: title.to_string(),
        description: Some(description.to_string()),
        completed,
        priority,
        due_date: due,
        category: Some(category.to_string()),
        created_at: iso(created),
    };

    vec![
        sample(
            "1",
            "Complete React assignment",
            "Build a task tracker application using hooks and functional components.",
            false,
            Priority::High,
            "Study",
            Some(now + day * 3),
            now - day * 5,
        ),
        sample(
            "2",
            "Review JavaScript concepts",
            "Go through ES6+ features like Promises, async/await, and destructuring.",
            true,
            Priority::Medium,
            "Study",
            Some(now - day),
            now - day * 10,
        ),
        sample(
            "3",
            "Plan weekend trip",
            "Research destinations and book accommodation for the upcoming long weekend.",
            false,
            Priority::Low,
            "Personal",
            None,
            now - day * 2,
        ),
        sample(
            "4",
            "Submit project proposal",
            "Finalize the proposal document and send it to the client for review.",
            false,
            Priority::Urgent,
            "Work",
            Some(now + day),
            now,
        ),
        sample(
            "5",
            "Go grocery shopping",
            "Buy milk, eggs, bread, and vegetables.",
            true,
            Priority::Medium,
            "Personal",
            None,
            now - day,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use proptest::prelude::*;

    use super::*;
    use crate::storage::MemoryStore;

    fn draft(title: &str, priority: Priority) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: Some("details".to_string()),
            priority,
            due_date: Some("2031-02-03T00:00:00Z".parse().unwrap()),
            category: Some("Work".to_string()),
        }
    }

    fn stored(id: &str, created_at: &str) -> Task {
        Task {
            id: id.to_string(),
            title: format!("task {id}"),
            description: None,
            completed: false,
            priority: Priority::Medium,
            due_date: None,
            category: None,
            created_at: created_at.to_string(),
        }
    }

    fn memory_with(username: &str, tasks: &[Task]) -> MemoryStore {
        let mut mem = MemoryStore::new();
        mem.insert(&tasks_key(username), &serde_json::to_string(tasks).unwrap());
        mem
    }

    #[test]
    fn test_new_user_sees_samples_without_notice() {
        let mut store = TaskStore::load(MemoryStore::new(), "alice");
        assert_eq!(store.tasks().len(), 5);
        assert!(store.take_notices().is_empty());
        // Loading never writes.
        assert_eq!(store.into_storage().get("tasks-alice"), None);
    }

    #[test]
    fn test_empty_array_falls_back_to_samples() {
        let store = TaskStore::load(memory_with("alice", &[]), "alice");
        let ids: Vec<_> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_malformed_storage_falls_back_with_notice() {
        let mut mem = MemoryStore::new();
        mem.insert("tasks-alice", "{not json");
        let mut store = TaskStore::load(mem, "alice");
        assert_eq!(store.tasks().len(), 5);
        let notices = store.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].message, LOAD_FAILED);
        // The malformed payload is left for the user to recover.
        assert_eq!(store.into_storage().get("tasks-alice"), Some("{not json"));
    }

    #[test]
    fn test_add_then_reload_observes_new_task() {
        let mut mem = memory_with("bob", &[stored("a", "2024-01-01T00:00:00.000Z")]);
        let before;
        let added;
        {
            let mut store = TaskStore::load(&mut mem, "bob");
            before = store.tasks().len();
            added = store.add(draft("Write tests", Priority::High));
            assert_eq!(store.tasks()[0].id, added.id);
        }
        let reloaded = TaskStore::load(&mut mem, "bob");
        assert_eq!(reloaded.tasks().len(), before + 1);
        let matches: Vec<_> = reloaded.tasks().iter().filter(|t| t.id == added.id).collect();
        assert_eq!(matches.len(), 1);
        let t = matches[0];
        assert_eq!(t.title, "Write tests");
        assert_eq!(t.description.as_deref(), Some("details"));
        assert_eq!(t.priority, Priority::High);
        assert_eq!(t.category.as_deref(), Some("Work"));
        assert_eq!(t.due_date, Some("2031-02-03T00:00:00Z".parse().unwrap()));
        assert!(!t.completed);
        assert!(!t.created_at.is_empty());
        assert!(DateTime::parse_from_rfc3339(&t.created_at).is_ok());
    }

    #[test]
    fn test_add_raises_success_notice() {
        let mut store = TaskStore::load(MemoryStore::new(), "carol");
        store.add(draft("One", Priority::Low));
        let notices = store.take_notices();
        assert_eq!(notices, vec![Notice::success("Task added successfully.")]);
    }

    #[test]
    fn test_update_preserves_identity_and_created_at() {
        let mem = memory_with("dan", &[stored("a", "T0"), stored("b", "T1"), stored("c", "T2")]);
        let mut store = TaskStore::load(mem, "dan");
        let mut edited = store.get("b").unwrap().clone();
        edited.title = "renamed".into();
        edited.priority = Priority::Urgent;
        edited.created_at = "tampered".into();
        assert!(store.update(edited));

        let ids: Vec<_> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        let b = store.get("b").unwrap();
        assert_eq!(b.title, "renamed");
        assert_eq!(b.priority, Priority::Urgent);
        assert_eq!(b.created_at, "T1");

        let reloaded = TaskStore::load(store.into_storage(), "dan");
        assert_eq!(reloaded.get("b").unwrap().title, "renamed");
    }

    #[test]
    fn test_update_missing_id_is_noop() {
        let mut store = TaskStore::load(memory_with("erin", &[stored("a", "T0")]), "erin");
        let rev = store.revision();
        assert!(!store.update(stored("zzz", "T9")));
        assert_eq!(store.revision(), rev);
        assert!(store.take_notices().is_empty());
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mem = memory_with("fay", &[stored("a", "T0"), stored("b", "T1")]);
        let mut store = TaskStore::load(mem, "fay");
        assert!(store.delete("a"));
        let once = store.tasks().to_vec();
        assert!(!store.delete("a"));
        assert_eq!(store.tasks(), once.as_slice());
        // Both calls report success.
        let notices = store.take_notices();
        assert_eq!(notices.len(), 2);
        assert!(notices.iter().all(|n| n.level == NoticeLevel::Success));
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut store = TaskStore::load(memory_with("gus", &[stored("a", "T0")]), "gus");
        assert_eq!(store.toggle_completion("a"), Some(true));
        assert_eq!(store.toggle_completion("a"), Some(false));
        assert_eq!(store.toggle_completion("missing"), None);
        assert!(store.take_notices().is_empty());
        assert_eq!(store.counts(), TaskCounts { all: 1, pending: 1, completed: 0 });
    }

    #[test]
    fn test_toggle_persists() {
        let mut mem = memory_with("hal", &[stored("a", "T0")]);
        {
            let mut store = TaskStore::load(&mut mem, "hal");
            store.toggle_completion("a");
        }
        let store = TaskStore::load(&mut mem, "hal");
        assert!(store.get("a").unwrap().completed);
    }

    #[test]
    fn test_persist_failure_keeps_memory_and_notifies() {
        let mut mem = memory_with("ivy", &[stored("a", "T0")]);
        mem.set_fail_writes(true);
        let mut store = TaskStore::load(mem, "ivy");
        let added = store.add(draft("Unsaved", Priority::Medium));
        assert_eq!(store.tasks().len(), 2);
        assert!(store.get(&added.id).is_some());
        let notices = store.take_notices();
        assert_eq!(notices, vec![Notice::error(SAVE_FAILED)]);

        let mut mem = store.into_storage();
        mem.set_fail_writes(false);
        let reloaded = TaskStore::load(mem, "ivy");
        assert_eq!(reloaded.tasks().len(), 1);
    }

    #[test]
    fn test_failed_update_keeps_edit_in_memory() {
        let mut mem = memory_with("ivy", &[stored("a", "T0"), stored("b", "T1")]);
        mem.set_fail_writes(true);
        let mut store = TaskStore::load(mem, "ivy");
        let mut edited = store.get("a").unwrap().clone();
        edited.title = "renamed".into();
        assert!(store.update(edited));
        assert_eq!(store.get("a").unwrap().title, "renamed");
        assert_eq!(store.tasks().len(), 2);
        assert_eq!(store.take_notices(), vec![Notice::error(SAVE_FAILED)]);

        let mut mem = store.into_storage();
        mem.set_fail_writes(false);
        let reloaded = TaskStore::load(mem, "ivy");
        assert_eq!(reloaded.get("a").unwrap().title, "task a");
    }

    #[test]
    fn test_failed_delete_keeps_removal_in_memory() {
        let mut mem = memory_with("ivy", &[stored("a", "T0"), stored("b", "T1")]);
        mem.set_fail_writes(true);
        let mut store = TaskStore::load(mem, "ivy");
        assert!(store.delete("a"));
        let ids: Vec<_> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["b"]);
        assert_eq!(store.take_notices(), vec![Notice::error(SAVE_FAILED)]);

        let mut mem = store.into_storage();
        mem.set_fail_writes(false);
        let reloaded = TaskStore::load(mem, "ivy");
        assert_eq!(reloaded.tasks().len(), 2);
    }

    #[test]
    fn test_migration_fills_created_at_from_id() {
        let legacy = r#"[{"id":"2023-05-01T10:00:00.000Z","title":"Old","completed":false,"priority":"low"}]"#;
        let mut mem = MemoryStore::new();
        mem.insert("tasks-jo", legacy);
        let store = TaskStore::load(mem, "jo");
        assert_eq!(store.tasks()[0].created_at, "2023-05-01T10:00:00.000Z");
        assert_eq!(store.tasks()[0].title, "Old");
    }

    #[test]
    fn test_users_are_isolated() {
        let mut mem = MemoryStore::new();
        {
            let mut store = TaskStore::load(&mut mem, "kim");
            store.delete("1");
        }
        {
            let other = TaskStore::load(&mut mem, "lee");
            assert!(other.get("1").is_some());
        }
        let kim = TaskStore::load(&mut mem, "kim");
        assert!(kim.get("1").is_none());
    }

    #[test]
    fn test_subscribers_see_changes_and_notices() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut store = TaskStore::load(memory_with("max", &[stored("a", "T0")]), "max");
        let sink = Rc::clone(&events);
        let sub = store.subscribe(Box::new(move |event| {
            let label = match event {
                StoreEvent::Changed(tasks) => format!("changed:{}", tasks.len()),
                StoreEvent::Notice(n) => format!("notice:{}", n.message),
            };
            sink.borrow_mut().push(label);
        }));

        store.add(draft("New", Priority::Low));
        store.toggle_completion("a");
        store.unsubscribe(sub);
        store.delete("a");

        assert_eq!(
            *events.borrow(),
            vec![
                "changed:2".to_string(),
                "notice:Task added successfully.".to_string(),
                "changed:2".to_string(),
            ]
        );
    }

    #[test]
    fn test_sample_tasks_are_deterministic_for_fixed_now() {
        let now: DateTime<Utc> = "2030-01-10T12:00:00Z".parse().unwrap();
        assert_eq!(sample_tasks(now), sample_tasks(now));
        let urgent = &sample_tasks(now)[3];
        assert_eq!(urgent.priority, Priority::Urgent);
        assert_eq!(urgent.created_at, "2030-01-10T12:00:00.000Z");
        assert_eq!(urgent.due_date, Some("2030-01-11T12:00:00Z".parse().unwrap()));
    }

    fn arb_task() -> impl Strategy<Value = Task> {
        (
            "[a-z0-9]{1,12}",
            "[a-zA-Z ]{1,20}",
            any::<bool>(),
            prop::sample::select(Priority::ALL.to_vec()),
            prop::option::of("[0-9T:.Z-]{1,24}"),
        )
            .prop_map(|(id, title, completed, priority, created)| Task {
                id,
                title,
                description: None,
                completed,
                priority,
                due_date: None,
                category: None,
                created_at: created.unwrap_or_default(),
            })
    }

    proptest! {
        #[test]
        fn prop_migrate_is_idempotent(tasks in prop::collection::vec(arb_task(), 0..16)) {
            let once = migrate(tasks);
            let twice = migrate(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_migrate_only_touches_created_at(tasks in prop::collection::vec(arb_task(), 0..16)) {
            let migrated = migrate(tasks.clone());
            prop_assert_eq!(migrated.len(), tasks.len());
            for (before, after) in tasks.iter().zip(&migrated) {
                let mut expected = before.clone();
                if expected.created_at.is_empty() {
                    expected.created_at = expected.id.clone();
                }
                prop_assert_eq!(&expected, after);
            }
        }

        #[test]
        fn prop_toggle_is_involution(tasks in prop::collection::vec(arb_task(), 1..8), pick in any::<prop::sample::Index>()) {
            let tasks = migrate(tasks);
            let target = tasks[pick.index(tasks.len())].id.clone();
            let original = tasks.iter().find(|t| t.id == target).map(|t| t.completed);
            let mut store = TaskStore::load(memory_with("prop", &tasks), "prop");
            store.toggle_completion(&target);
            store.toggle_completion(&target);
            prop_assert_eq!(store.get(&target).map(|t| t.completed), original);
        }
    }
}
