use crate::error::StoreError;
use crate::model::Task;
use crate::store::TaskStore;

use super::cache::DependencyCache;

impl Task {
    /// Whether every declared dependency exists and finished successfully.
    ///
    /// Dependencies already in `cache` are not queried again; the rest are
    /// fetched in a single batch and added to the cache. An id the store has
    /// no record for counts as not met.
    pub async fn dependencies_met(
        &self,
        store: &dyn TaskStore,
        cache: &mut DependencyCache,
    ) -> Result<bool, StoreError> {
        if self.depends_on.is_empty() {
            return Ok(true);
        }

        let mut to_query: Vec<String> = Vec::new();
        for dep in &self.depends_on {
            if !cache.is_resolved(dep) && !to_query.contains(dep) {
                to_query.push(dep.clone());
            }
        }

        if !to_query.is_empty() {
            let fetched = store.find_tasks_by_ids(&to_query).await?;
            for dep_task in fetched {
                cache.put(dep_task.id.clone(), dep_task);
            }
            for id in to_query {
                cache.mark_missing(id);
            }
        }

        for dep in &self.depends_on {
            match cache.get(dep) {
                Some(dep_task) if dep_task.status.satisfies_dependents() => {}
                Some(dep_task) => {
                    tracing::trace!(
                        task_id = %self.id,
                        dependency = %dep,
                        status = dep_task.status.as_str(),
                        "dependency not finished"
                    );
                    return Ok(false);
                }
                None => {
                    tracing::debug!(
                        task_id = %self.id,
                        dependency = %dep,
                        "dependency has no record in the task store"
                    );
                    return Ok(false);
                }
            }
        }

        Ok(true)
    }
}
