#![allow(dead_code)]

use std::collections::HashSet;

use async_trait::async_trait;
use mci_core::api::{InMemoryTaskStore, StoreError, Task, TaskStatus, TaskStore};

/// In-memory store that fails lookups touching any poisoned id.
pub struct FlakyStore {
    pub inner: InMemoryTaskStore,
    poisoned: HashSet<String>,
    fail_listing: bool,
}

impl FlakyStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            inner: InMemoryTaskStore::new(tasks),
            poisoned: HashSet::new(),
            fail_listing: false,
        }
    }

    pub fn poison(mut self, id: &str) -> Self {
        self.poisoned.insert(id.to_string());
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }
}

#[async_trait]
impl TaskStore for FlakyStore {
    async fn find_undispatched_tasks(&self) -> Result<Vec<Task>, StoreError> {
        if self.fail_listing {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        self.inner.find_undispatched_tasks().await
    }

    async fn find_tasks_by_ids(&self, ids: &[String]) -> Result<Vec<Task>, StoreError> {
        if let Some(bad) = ids.iter().find(|id| self.poisoned.contains(*id)) {
            return Err(StoreError::Query(format!("lookup of {bad} timed out")));
        }
        self.inner.find_tasks_by_ids(ids).await
    }
}

pub fn done(id: &str) -> Task {
    Task::new(id).with_status(TaskStatus::Success)
}

pub fn pending(id: &str, deps: &[&str]) -> Task {
    Task::new(id).depends_on(deps.iter().copied())
}

pub fn ids(tasks: &[Task]) -> Vec<String> {
    tasks.iter().map(|t| t.id.clone()).collect()
}
