//! Derived board view: priority ordering, status filter and text search.
//!
//! Nothing here mutates the task list. `filter_tasks` is the pure derivation;
//! `BoardView` remembers its last result keyed on the store revision, the
//! status filter and the search term.

use crate::fields::StatusFilter;
use crate::task::Task;

/// Order `tasks` by priority (urgent first, stable), keep those passing
/// `filter`, then keep those whose title, description or category contains
/// `search` case-insensitively. An empty search matches everything.
pub fn filter_tasks<'a>(tasks: &'a [Task], filter: StatusFilter, search: &str) -> Vec<&'a Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by_key(|t| t.priority.rank());

    let needle = search.to_lowercase();
    sorted
        .into_iter()
        .filter(|t| filter.matches(t.completed))
        .filter(|t| matches_search(t, &needle))
        .collect()
}

/// `needle` must already be lowercase.
fn matches_search(task: &Task, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let contains = |field: Option<&str>| field.unwrap_or("").to_lowercase().contains(needle);
    contains(Some(task.title.as_str())) || contains(task.description.as_deref()) || contains(task.category.as_deref())
}

/// Memoized board state for a front end.
#[derive(Debug, Default)]
pub struct BoardView {
    pub filter: StatusFilter,
    pub search: String,
    cache_key: Option<(u64, StatusFilter, String)>,
    visible: Vec<String>,
}

impl BoardView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of the visible tasks in display order, recomputed only when the
    /// revision, the filter or the search term changed since the last call.
    pub fn visible_ids(&mut self, tasks: &[Task], revision: u64) -> &[String] {
        let key = (revision, self.filter, self.search.clone());
        if self.cache_key.as_ref() != Some(&key) {
            self.visible = filter_tasks(tasks, self.filter, &self.search)
                .into_iter()
                .map(|t| t.id.clone())
                .collect();
            self.cache_key = Some(key);
        }
        &self.visible
    }

    /// Whether the last computed view was empty.
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }
}
