use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Finance, NewFinance, NewTask, RecordId, Task, TaskPatch};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The remote call was rejected or never reached the store.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("record {0} not found")]
    NotFound(RecordId),
    #[error("malformed store response: {0}")]
    Malformed(String),
}

/// The remote document store, one collection per entity kind.
///
/// Any `Err` means the operation did not happen; there is no partial state
/// to reconcile. Implementations log the failure where it occurs.
#[async_trait(?Send)]
pub trait RecordStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError>;

    async fn create_task(&self, task: &NewTask) -> Result<RecordId, StoreError>;

    async fn update_task(&self, id: &RecordId, patch: &TaskPatch) -> Result<(), StoreError>;

    async fn delete_task(&self, id: &RecordId) -> Result<(), StoreError>;

    async fn list_finances(&self) -> Result<Vec<Finance>, StoreError>;

    async fn create_finance(&self, finance: &NewFinance) -> Result<RecordId, StoreError>;

    async fn delete_finance(&self, id: &RecordId) -> Result<(), StoreError>;
}
