#![forbid(unsafe_code)]

//! Owned task collection with persistence after every committed mutation.
//!
//! Every mutation builds a fresh `Vec<Task>`, swaps it in as the new snapshot, writes
//! the whole collection to the store, then notifies subscribers. Readers holding an
//! older [`Snapshot`] never observe a half-applied change.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::TaskListError;
use crate::task::model::{FilterMode, Priority, Task, TaskStats};
use crate::task::storage::{self, KeyValueStore};

pub type Snapshot = Arc<[Task]>;

type Listener = Box<dyn FnMut(&Snapshot)>;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmptyEditPolicy {
    /// Leave the task untouched.
    #[default]
    Ignore,
    /// Delete the task.
    Remove,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub allow_duplicate_titles: bool,
    pub duplicate_ignore_case: bool,
    pub supports_description: bool,
    pub supports_priority: bool,
    pub empty_edit: EmptyEditPolicy,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            allow_duplicate_titles: true,
            duplicate_ignore_case: false,
            supports_description: true,
            supports_priority: false,
            empty_edit: EmptyEditPolicy::Ignore,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added { id: String },
    /// Blank title.
    Ignored,
    /// A task with this title already exists.
    Duplicate { title: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Updated,
    /// Blank title under [`EmptyEditPolicy::Remove`].
    Removed,
    /// Blank title under [`EmptyEditPolicy::Ignore`].
    Ignored,
    Duplicate { title: String },
    NotFound,
}

pub struct TaskListManager<S> {
    store: S,
    key: String,
    options: ListOptions,
    tasks: Snapshot,
    listeners: Vec<Listener>,
    last_persist_error: Option<String>,
}

impl<S> fmt::Debug for TaskListManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskListManager")
            .field("key", &self.key)
            .field("options", &self.options)
            .field("tasks", &self.tasks.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> TaskListManager<S> {
    /// Rehydrates the collection stored under `key`. Missing, unreadable or malformed
    /// data yields an empty list.
    pub fn load(store: S, key: impl Into<String>, options: ListOptions) -> Self {
        let key = key.into();
        let tasks = match store.get(&key) {
            Ok(Some(raw)) => match storage::decode_tasks(&raw) {
                Some(tasks) => dedupe_ids(tasks),
                None => {
                    tracing::warn!(key = %key, "stored task list is malformed; starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to read stored task list; starting empty");
                Vec::new()
            }
        };
        tracing::debug!(key = %key, count = tasks.len(), "loaded task list");

        Self {
            store,
            key,
            options,
            tasks: tasks.into(),
            listeners: Vec::new(),
            last_persist_error: None,
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn options(&self) -> &ListOptions {
        &self.options
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.tasks)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    /// Called with the new snapshot after each committed mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&Snapshot) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn add(&mut self, title: &str, description: &str) -> AddOutcome {
        self.add_with_priority(title, description, Priority::default())
    }

    pub fn add_with_priority(
        &mut self,
        title: &str,
        description: &str,
        priority: Priority,
    ) -> AddOutcome {
        let title = title.trim();
        if title.is_empty() {
            return AddOutcome::Ignored;
        }
        if !self.options.allow_duplicate_titles && self.title_taken(title, None) {
            return AddOutcome::Duplicate {
                title: title.to_owned(),
            };
        }

        let id = self.fresh_id();
        let task = Task::new(
            id.clone(),
            title.to_owned(),
            self.accepted_description(description),
            self.options.supports_priority.then_some(priority),
        );

        let mut next = Vec::with_capacity(self.tasks.len() + 1);
        next.push(task);
        next.extend(self.tasks.iter().cloned());
        self.commit(next);
        AddOutcome::Added { id }
    }

    pub fn edit(&mut self, id: &str, title: &str, description: &str) -> EditOutcome {
        if self.get(id).is_none() {
            return EditOutcome::NotFound;
        }

        let title = title.trim();
        if title.is_empty() {
            return match self.options.empty_edit {
                EmptyEditPolicy::Ignore => EditOutcome::Ignored,
                EmptyEditPolicy::Remove => {
                    self.remove(id);
                    EditOutcome::Removed
                }
            };
        }
        if !self.options.allow_duplicate_titles && self.title_taken(title, Some(id)) {
            return EditOutcome::Duplicate {
                title: title.to_owned(),
            };
        }

        let description = self.accepted_description(description);
        let next = self
            .tasks
            .iter()
            .map(|t| {
                if t.id == id {
                    Task {
                        title: title.to_owned(),
                        description: description.clone(),
                        ..t.clone()
                    }
                } else {
                    t.clone()
                }
            })
            .collect();
        self.commit(next);
        EditOutcome::Updated
    }

    /// Returns false when priorities are disabled or the id is unknown.
    pub fn set_priority(&mut self, id: &str, priority: Priority) -> bool {
        if !self.options.supports_priority {
            return false;
        }
        self.update_one(id, |t| t.priority = Some(priority))
    }

    /// Returns false when the id is unknown.
    pub fn toggle_done(&mut self, id: &str) -> bool {
        self.update_one(id, |t| t.done = !t.done)
    }

    /// Returns false when the id is unknown.
    pub fn remove(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let next = self.tasks.iter().filter(|t| t.id != id).cloned().collect();
        self.commit(next);
        true
    }

    /// Returns the number of tasks removed.
    pub fn clear_completed(&mut self) -> usize {
        let next: Vec<Task> = self.tasks.iter().filter(|t| !t.done).cloned().collect();
        let removed = self.tasks.len() - next.len();
        if removed > 0 {
            self.commit(next);
        }
        removed
    }

    /// Returns the number of tasks removed.
    pub fn clear_all(&mut self) -> usize {
        let removed = self.tasks.len();
        self.commit(Vec::new());
        removed
    }

    /// Order-preserving view restricted by `filter` and a case-insensitive search over
    /// title and description.
    #[must_use]
    pub fn query(&self, filter: FilterMode, search: &str) -> Vec<&Task> {
        let needle = search.trim().to_lowercase();
        self.tasks
            .iter()
            .filter(|t| filter.accepts(t) && t.matches_lowercase(&needle))
            .collect()
    }

    #[must_use]
    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.tasks)
    }

    /// Resolves, in order: an exact id, a unique case-insensitive exact title, a unique
    /// id prefix, then a unique title substring.
    pub fn find(&self, pattern: &str) -> Result<&Task, TaskListError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(TaskListError::TaskNotFound(pattern.to_owned()));
        }
        if let Some(task) = self.get(pattern) {
            return Ok(task);
        }

        let p = pattern.to_lowercase();
        let exact: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.title.to_lowercase() == p)
            .collect();
        if !exact.is_empty() {
            return single(exact, pattern);
        }

        let by_prefix: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.id.starts_with(pattern))
            .collect();
        if !by_prefix.is_empty() {
            return single(by_prefix, pattern);
        }

        let by_title: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.title.to_lowercase().contains(&p))
            .collect();
        single(by_title, pattern)
    }

    fn update_one(&mut self, id: &str, f: impl FnOnce(&mut Task)) -> bool {
        let Some(idx) = self.tasks.iter().position(|t| t.id == id) else {
            return false;
        };
        let mut next = self.tasks.to_vec();
        f(&mut next[idx]);
        self.commit(next);
        true
    }

    fn commit(&mut self, next: Vec<Task>) {
        self.tasks = next.into();
        self.persist();
        let snapshot = Arc::clone(&self.tasks);
        for listener in &mut self.listeners {
            listener(&snapshot);
        }
    }

    fn persist(&mut self) {
        let result =
            storage::encode_tasks(&self.tasks).and_then(|raw| self.store.set(&self.key, &raw));
        match result {
            Ok(()) => {
                tracing::debug!(key = %self.key, count = self.tasks.len(), "persisted task list");
                self.last_persist_error = None;
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to persist task list");
                self.last_persist_error = Some(format!("{e:#}"));
            }
        }
    }

    fn title_taken(&self, title: &str, except_id: Option<&str>) -> bool {
        let ignore_case = self.options.duplicate_ignore_case;
        let lowered = title.to_lowercase();
        self.tasks.iter().any(|t| {
            if except_id == Some(t.id.as_str()) {
                return false;
            }
            if ignore_case {
                t.title.to_lowercase() == lowered
            } else {
                t.title == title
            }
        })
    }

    fn accepted_description(&self, description: &str) -> String {
        if self.options.supports_description {
            description.trim().to_owned()
        } else {
            String::new()
        }
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Task::new_id();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

fn single<'a>(mut matches: Vec<&'a Task>, pattern: &str) -> Result<&'a Task, TaskListError> {
    match matches.len() {
        0 => Err(TaskListError::TaskNotFound(pattern.to_owned())),
        1 => Ok(matches.remove(0)),
        n => Err(TaskListError::AmbiguousTask {
            pattern: pattern.to_owned(),
            matches: n,
        }),
    }
}

fn dedupe_ids(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::with_capacity(tasks.len());
    let before = tasks.len();
    let out: Vec<Task> = tasks
        .into_iter()
        .filter(|t| seen.insert(t.id.clone()))
        .collect();
    if out.len() != before {
        tracing::warn!(
            dropped = before - out.len(),
            "dropped stored tasks with duplicate ids"
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::task::storage::MemoryStore;

    const KEY: &str = "todo_tasks_v1";

    fn manager() -> TaskListManager<MemoryStore> {
        TaskListManager::load(MemoryStore::new(), KEY, ListOptions::default())
    }

    fn with_options(options: ListOptions) -> TaskListManager<MemoryStore> {
        TaskListManager::load(MemoryStore::new(), KEY, options)
    }

    fn added(outcome: AddOutcome) -> String {
        match outcome {
            AddOutcome::Added { id } => id,
            other => panic!("expected Added, got {other:?}"),
        }
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    fn stored(m: &TaskListManager<MemoryStore>) -> Vec<Task> {
        let raw = m.store().get(KEY).unwrap().expect("persisted");
        storage::decode_tasks(&raw).expect("valid")
    }

    #[test]
    fn add_prepends_trimmed_task() {
        let mut m = manager();
        added(m.add("first", ""));
        let id = added(m.add("  second  ", "  note "));

        assert_eq!(m.len(), 2);
        let head = &m.tasks()[0];
        assert_eq!(head.id, id);
        assert_eq!(head.title, "second");
        assert_eq!(head.description, "note");
        assert!(!head.done);
        assert!(!head.created_at.is_empty());
        assert_eq!(head.priority, None);
    }

    #[test]
    fn blank_titles_are_ignored() {
        let mut m = manager();
        assert_eq!(m.add("", "x"), AddOutcome::Ignored);
        assert_eq!(m.add("   ", "x"), AddOutcome::Ignored);
        assert!(m.is_empty());
        assert_eq!(m.store().get(KEY).unwrap(), None);
    }

    #[test]
    fn every_mutation_persists_the_whole_list() {
        let mut m = manager();
        let a = added(m.add("a", ""));
        assert_eq!(stored(&m), m.tasks().to_vec());
        added(m.add("b", ""));
        assert_eq!(titles(&stored(&m)), vec!["b", "a"]);
        m.toggle_done(&a);
        assert!(stored(&m).iter().find(|t| t.id == a).unwrap().done);
        m.edit(&a, "a2", "d");
        assert_eq!(stored(&m)[1].title, "a2");
        m.remove(&a);
        assert_eq!(titles(&stored(&m)), vec!["b"]);
        m.clear_all();
        assert!(stored(&m).is_empty());
    }

    #[test]
    fn toggle_twice_restores_done() {
        let mut m = manager();
        let id = added(m.add("a", ""));
        assert!(m.toggle_done(&id));
        assert!(m.get(&id).unwrap().done);
        assert!(m.toggle_done(&id));
        assert!(!m.get(&id).unwrap().done);
        assert!(!m.toggle_done("missing"));
    }

    #[test]
    fn remove_by_id() {
        let mut m = manager();
        let a = added(m.add("a", ""));
        added(m.add("b", ""));

        assert!(!m.remove("missing"));
        assert_eq!(m.len(), 2);

        assert!(m.remove(&a));
        assert_eq!(m.len(), 1);
        assert!(m.get(&a).is_none());
    }

    #[test]
    fn clear_completed_keeps_active_in_order() {
        let mut m = manager();
        let ids: Vec<String> = ["a", "b", "c", "d"]
            .iter()
            .map(|t| added(m.add(t, "")))
            .collect();
        m.toggle_done(&ids[1]);
        m.toggle_done(&ids[3]);

        assert_eq!(m.clear_completed(), 2);
        assert!(m.tasks().iter().all(|t| !t.done));
        assert_eq!(titles(m.tasks()), vec!["c", "a"]);
        assert_eq!(m.clear_completed(), 0);
    }

    #[test]
    fn edit_preserves_identity_fields() {
        let mut m = with_options(ListOptions {
            supports_priority: true,
            ..ListOptions::default()
        });
        let id = added(m.add_with_priority("draft", "", Priority::High));
        m.toggle_done(&id);
        let before = m.get(&id).unwrap().clone();

        assert_eq!(m.edit(&id, " final ", "with notes"), EditOutcome::Updated);
        let after = m.get(&id).unwrap();
        assert_eq!(after.title, "final");
        assert_eq!(after.description, "with notes");
        assert_eq!(after.id, before.id);
        assert_eq!(after.done, before.done);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.priority, Some(Priority::High));

        assert_eq!(m.edit("missing", "x", ""), EditOutcome::NotFound);
    }

    #[test]
    fn empty_edit_policies() {
        let mut m = manager();
        let id = added(m.add("keep", ""));
        assert_eq!(m.edit(&id, "  ", ""), EditOutcome::Ignored);
        assert_eq!(m.get(&id).unwrap().title, "keep");

        let mut m = with_options(ListOptions {
            empty_edit: EmptyEditPolicy::Remove,
            ..ListOptions::default()
        });
        let id = added(m.add("drop", ""));
        assert_eq!(m.edit(&id, "", ""), EditOutcome::Removed);
        assert!(m.is_empty());
    }

    #[test]
    fn duplicate_titles_rejected_when_configured() {
        let mut m = manager();
        added(m.add("same", ""));
        added(m.add("same", ""));
        assert_eq!(m.len(), 2);

        let mut m = with_options(ListOptions {
            allow_duplicate_titles: false,
            ..ListOptions::default()
        });
        added(m.add("Same", ""));
        assert_eq!(
            m.add(" Same ", ""),
            AddOutcome::Duplicate {
                title: "Same".to_owned()
            }
        );
        added(m.add("same", ""));
        assert_eq!(m.len(), 2);

        let other = m.tasks()[0].id.clone();
        assert_eq!(
            m.edit(&other, "Same", ""),
            EditOutcome::Duplicate {
                title: "Same".to_owned()
            }
        );
        assert_eq!(m.edit(&other, "same", "renamed to itself"), EditOutcome::Updated);
    }

    #[test]
    fn duplicate_check_can_ignore_case() {
        let mut m = with_options(ListOptions {
            allow_duplicate_titles: false,
            duplicate_ignore_case: true,
            ..ListOptions::default()
        });
        added(m.add("Buy milk", ""));
        assert!(matches!(m.add("BUY MILK", ""), AddOutcome::Duplicate { .. }));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn description_and_priority_follow_options() {
        let mut m = with_options(ListOptions {
            supports_description: false,
            ..ListOptions::default()
        });
        let id = added(m.add_with_priority("a", "ignored", Priority::High));
        let t = m.get(&id).unwrap();
        assert_eq!(t.description, "");
        assert_eq!(t.priority, None);
        assert!(!m.set_priority(&id, Priority::Low));

        let mut m = with_options(ListOptions {
            supports_priority: true,
            ..ListOptions::default()
        });
        let id = added(m.add("a", ""));
        assert_eq!(m.get(&id).unwrap().priority, Some(Priority::Normal));
        assert!(m.set_priority(&id, Priority::Low));
        assert_eq!(m.get(&id).unwrap().priority, Some(Priority::Low));
        assert!(!m.set_priority("missing", Priority::Low));
    }

    #[test]
    fn query_filters_and_searches_without_mutating() {
        let mut m = manager();
        let milk = added(m.add("Buy milk", "semi-skimmed"));
        added(m.add("Call Bob", "about the Milkman"));
        added(m.add("Write report", ""));
        m.toggle_done(&milk);

        let active: Vec<&str> = m
            .query(FilterMode::Active, "")
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(active, vec!["Write report", "Call Bob"]);

        let completed: Vec<&str> = m
            .query(FilterMode::Completed, "")
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(completed, vec!["Buy milk"]);

        let found: Vec<&str> = m
            .query(FilterMode::All, "  MILK ")
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(found, vec!["Call Bob", "Buy milk"]);

        assert!(m.query(FilterMode::Active, "skimmed").is_empty());
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn listeners_fire_once_per_committed_mutation() {
        let mut m = manager();
        let seen: Rc<RefCell<Vec<usize>>> = Rc::default();
        let sink = Rc::clone(&seen);
        m.subscribe(move |snap| sink.borrow_mut().push(snap.len()));

        let id = added(m.add("a", ""));
        m.add("", "");
        m.toggle_done("missing");
        m.remove("missing");
        m.clear_completed();
        m.toggle_done(&id);
        m.clear_completed();

        assert_eq!(*seen.borrow(), vec![1, 1, 0]);
    }

    #[test]
    fn snapshots_are_immutable() {
        let mut m = manager();
        added(m.add("a", ""));
        let before = m.snapshot();
        added(m.add("b", ""));
        assert_eq!(titles(&before), vec!["a"]);
        assert_eq!(titles(&m.snapshot()), vec!["b", "a"]);
    }

    #[test]
    fn load_falls_back_to_empty_on_bad_data() {
        let store = MemoryStore::new();
        store.set(KEY, "{\"not\":\"a list\"}").unwrap();
        let m = TaskListManager::load(&store, KEY, ListOptions::default());
        assert!(m.is_empty());

        store.set(KEY, "[{\"id\":").unwrap();
        let m = TaskListManager::load(&store, KEY, ListOptions::default());
        assert!(m.is_empty());
    }

    #[test]
    fn load_drops_duplicate_ids() {
        let store = MemoryStore::new();
        store
            .set(
                KEY,
                r#"[{"id":"1","title":"a","createdAt":"t"},{"id":"1","title":"b","createdAt":"t"}]"#,
            )
            .unwrap();
        let m = TaskListManager::load(&store, KEY, ListOptions::default());
        assert_eq!(titles(m.tasks()), vec!["a"]);
    }

    #[test]
    fn find_resolves_ids_prefixes_and_titles() {
        let mut m = manager();
        let milk = added(m.add("Buy milk", ""));
        let bob = added(m.add("Call Bob", ""));
        added(m.add("Call Alice", ""));

        assert_eq!(m.find(&milk).unwrap().id, milk);
        assert_eq!(m.find(&bob[..bob.len() - 1]).unwrap().id, bob);
        assert_eq!(m.find("buy MILK").unwrap().id, milk);
        assert_eq!(m.find("bob").unwrap().id, bob);
        assert!(matches!(
            m.find("call"),
            Err(TaskListError::AmbiguousTask { matches: 2, .. })
        ));
        assert!(matches!(m.find("bread"), Err(TaskListError::TaskNotFound(_))));
        assert!(m.find("  ").is_err());
    }

    #[test]
    fn find_prefers_exact_title_over_id_prefix() {
        let store = MemoryStore::new();
        store
            .set(
                KEY,
                r#"[{"id":"e1234567","title":"Pay rent","createdAt":"t"},{"id":"00000001","title":"e","createdAt":"t"}]"#,
            )
            .unwrap();
        let m = TaskListManager::load(&store, KEY, ListOptions::default());

        assert_eq!(m.find("e").unwrap().id, "00000001");
        assert_eq!(m.find("E").unwrap().id, "00000001");
        assert_eq!(m.find("e12").unwrap().id, "e1234567");
        assert_eq!(m.find("0000").unwrap().id, "00000001");
    }

    /// Accepts reads but fails writes until `healthy` is set.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        healthy: std::cell::Cell<bool>,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
            if !self.healthy.get() {
                anyhow::bail!("disk full");
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> anyhow::Result<()> {
            self.inner.remove(key)
        }

        fn keys(&self) -> anyhow::Result<Vec<String>> {
            self.inner.keys()
        }
    }

    #[test]
    fn failed_writes_keep_the_change_and_report_it() {
        let store = FlakyStore::default();
        let mut m = TaskListManager::load(&store, KEY, ListOptions::default());
        let fired = Rc::new(std::cell::Cell::new(0));
        let counter = Rc::clone(&fired);
        m.subscribe(move |_| counter.set(counter.get() + 1));

        added(m.add("Buy milk", ""));
        assert_eq!(titles(m.tasks()), vec!["Buy milk"]);
        assert_eq!(fired.get(), 1);
        let err = m.last_persist_error().expect("write failure recorded");
        assert!(err.contains("disk full"));
        assert_eq!(store.inner.get(KEY).unwrap(), None);

        store.healthy.set(true);
        added(m.add("Call Bob", ""));
        assert!(m.last_persist_error().is_none());
        assert_eq!(fired.get(), 2);
        let raw = store.inner.get(KEY).unwrap().expect("persisted");
        let saved = storage::decode_tasks(&raw).expect("valid");
        assert_eq!(titles(&saved), vec!["Call Bob", "Buy milk"]);
    }

    #[test]
    fn documented_scenario() {
        let mut m = manager();
        let milk = added(m.add("Buy milk", ""));
        added(m.add("Call Bob", ""));
        assert_eq!(titles(m.tasks()), vec!["Call Bob", "Buy milk"]);

        m.toggle_done(&milk);
        let completed = m.query(FilterMode::Completed, "");
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].title, "Buy milk");
        assert!(completed[0].done);

        m.clear_completed();
        assert_eq!(titles(m.tasks()), vec!["Call Bob"]);
    }
}
