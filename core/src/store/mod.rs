//! Data-access seam over the durable task store.

mod memory;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::Task;

pub use memory::InMemoryTaskStore;

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks currently waiting for a host, in store order.
    async fn find_undispatched_tasks(&self) -> Result<Vec<Task>, StoreError>;

    /// Records for the given ids. Ids with no record are simply absent from the result.
    async fn find_tasks_by_ids(&self, ids: &[String]) -> Result<Vec<Task>, StoreError>;
}
