use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{Task, TaskStatus};

use super::TaskStore;

/// Task store kept in process memory; records every id looked up through
/// [`TaskStore::find_tasks_by_ids`] so callers can inspect query behaviour.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<Vec<Task>>,
    lookups: Mutex<Vec<String>>,
    queries: AtomicUsize,
}

impl InMemoryTaskStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks: RwLock::new(tasks),
            lookups: Mutex::new(Vec::new()),
            queries: AtomicUsize::new(0),
        }
    }

    /// Load a JSON array of task records.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)?;
        let tasks: Vec<Task> = serde_json::from_str(&raw)?;
        Ok(Self::new(tasks))
    }

    pub fn set_status(&self, id: &str, status: TaskStatus) -> bool {
        let mut tasks = self.tasks.write().unwrap_or_else(|e| e.into_inner());
        match tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.status = status;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        let tasks = self.tasks.read().unwrap_or_else(|e| e.into_inner());
        tasks.iter().find(|t| t.id == id).cloned()
    }

    /// Every id requested through `find_tasks_by_ids`, in request order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of `find_tasks_by_ids` calls served.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn find_undispatched_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.read().unwrap_or_else(|e| e.into_inner());
        Ok(tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Undispatched)
            .cloned()
            .collect())
    }

    async fn find_tasks_by_ids(&self, ids: &[String]) -> Result<Vec<Task>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.lookups
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(ids.iter().cloned());

        let tasks = self.tasks.read().unwrap_or_else(|e| e.into_inner());
        Ok(tasks
            .iter()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect())
    }
}
