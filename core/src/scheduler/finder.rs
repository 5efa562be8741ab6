use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SchedulerConfig;
use crate::error::StoreError;
use crate::model::Task;
use crate::store::TaskStore;

use super::cache::DependencyCache;
use super::graph::{find_dependency_cycles, format_cycle_path};

/// Finds the tasks that are ready to be dispatched.
#[async_trait]
pub trait TaskFinder: Send + Sync {
    async fn find_runnable_tasks(&self) -> Result<Vec<Task>, StoreError>;
}

/// Task finder backed by a [`TaskStore`].
///
/// One call is one scan: the undispatched set is fetched, and each task is
/// kept only if its dependencies are met. A dependency lookup that fails
/// excludes that single task and the scan carries on.
pub struct StoreTaskFinder {
    store: Arc<dyn TaskStore>,
    detect_cycles: bool,
}

impl StoreTaskFinder {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            store,
            detect_cycles: true,
        }
    }

    pub fn from_config(store: Arc<dyn TaskStore>, cfg: &SchedulerConfig) -> Self {
        Self::new(store).with_cycle_detection(cfg.detect_cycles)
    }

    pub fn with_cycle_detection(mut self, enabled: bool) -> Self {
        self.detect_cycles = enabled;
        self
    }

    fn report_cycles(&self, undispatched: &[Task]) {
        for cycle in find_dependency_cycles(undispatched) {
            tracing::warn!(
                cycle = %format_cycle_path(&cycle),
                "dependency cycle among undispatched tasks; involved tasks will never become runnable"
            );
        }
    }
}

#[async_trait]
impl TaskFinder for StoreTaskFinder {
    async fn find_runnable_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let undispatched = self.store.find_undispatched_tasks().await?;

        let mut runnable = Vec::with_capacity(undispatched.len());
        let mut cache = DependencyCache::new();
        let mut failed = 0usize;

        for task in &undispatched {
            match task.dependencies_met(self.store.as_ref(), &mut cache).await {
                Ok(true) => runnable.push(task.clone()),
                Ok(false) => {}
                Err(e) => {
                    failed += 1;
                    tracing::error!(
                        task_id = %task.id,
                        error = %e,
                        "error checking dependencies for task"
                    );
                }
            }
        }

        if self.detect_cycles {
            self.report_cycles(&undispatched);
        }

        tracing::debug!(
            undispatched = undispatched.len(),
            runnable = runnable.len(),
            failed,
            cached_dependencies = cache.len(),
            "runnable task scan complete"
        );

        Ok(runnable)
    }
}
