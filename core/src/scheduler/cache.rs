use std::collections::{HashMap, HashSet};

use crate::model::Task;

/// Per-scan memo of dependency records fetched from the task store.
///
/// Ids the store had no record for are remembered as well, so an unknown
/// dependency shared by several candidates is only queried once.
#[derive(Debug, Default)]
pub struct DependencyCache {
    tasks: HashMap<String, Task>,
    missing: HashSet<String>,
}

impl DependencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn put(&mut self, id: impl Into<String>, task: Task) {
        let id = id.into();
        self.missing.remove(&id);
        self.tasks.insert(id, task);
    }

    pub fn mark_missing(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !self.tasks.contains_key(&id) {
            self.missing.insert(id);
        }
    }

    pub fn is_missing(&self, id: &str) -> bool {
        self.missing.contains(id)
    }

    /// True once the store has been asked about `id`, whatever the answer was.
    pub fn is_resolved(&self, id: &str) -> bool {
        self.tasks.contains_key(id) || self.missing.contains(id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus;

    #[test]
    fn put_then_get_returns_same_record() {
        let mut cache = DependencyCache::new();
        assert!(cache.get("compile").is_none());

        cache.put("compile", Task::new("compile").with_status(TaskStatus::Success));
        let hit = cache.get("compile").unwrap();
        assert_eq!(hit.status, TaskStatus::Success);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn missing_ids_count_as_resolved_but_not_cached() {
        let mut cache = DependencyCache::new();
        cache.mark_missing("ghost");

        assert!(cache.is_resolved("ghost"));
        assert!(cache.is_missing("ghost"));
        assert!(cache.get("ghost").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn put_clears_missing_marker() {
        let mut cache = DependencyCache::new();
        cache.mark_missing("late");
        cache.put("late", Task::new("late"));

        assert!(!cache.is_missing("late"));
        cache.mark_missing("late");
        assert!(!cache.is_missing("late"));
    }
}
