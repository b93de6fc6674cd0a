//! In-process [`RecordStore`] used by tests and local demos.

use std::cell::{Cell, RefCell};

use async_trait::async_trait;

use crate::model::{Finance, NewFinance, NewTask, RecordId, Task, TaskPatch};
use crate::store::{RecordStore, StoreError};

/// Keeps both collections in insertion order. Can be switched offline to
/// exercise the failure paths.
#[derive(Debug)]
pub struct MemoryStore {
    tasks: RefCell<Vec<Task>>,
    finances: RefCell<Vec<Finance>>,
    available: Cell<bool>,
    calls: Cell<usize>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            tasks: RefCell::new(Vec::new()),
            finances: RefCell::new(Vec::new()),
            available: Cell::new(true),
            calls: Cell::new(0),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(tasks: Vec<Task>, finances: Vec<Finance>) -> Self {
        Self {
            tasks: RefCell::new(tasks),
            finances: RefCell::new(finances),
            ..Self::default()
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    /// Number of operations attempted against the store, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.borrow().clone()
    }

    pub fn finances(&self) -> Vec<Finance> {
        self.finances.borrow().clone()
    }

    fn enter(&self, operation: &str) -> Result<(), StoreError> {
        self.calls.set(self.calls.get() + 1);
        if self.available.get() {
            Ok(())
        } else {
            tracing::error!(operation, "memory store is offline");
            Err(StoreError::Unavailable(format!("{operation}: store offline")))
        }
    }
}

#[async_trait(?Send)]
impl RecordStore for MemoryStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        self.enter("list_tasks")?;
        Ok(self.tasks.borrow().clone())
    }

    async fn create_task(&self, task: &NewTask) -> Result<RecordId, StoreError> {
        self.enter("create_task")?;
        let id = RecordId::generate();
        self.tasks
            .borrow_mut()
            .push(Task::from_new(id.clone(), task.clone()));
        Ok(id)
    }

    async fn update_task(&self, id: &RecordId, patch: &TaskPatch) -> Result<(), StoreError> {
        self.enter("update_task")?;
        let mut tasks = self.tasks.borrow_mut();
        let task = tasks
            .iter_mut()
            .find(|task| &task.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        task.apply(patch);
        Ok(())
    }

    async fn delete_task(&self, id: &RecordId) -> Result<(), StoreError> {
        self.enter("delete_task")?;
        let mut tasks = self.tasks.borrow_mut();
        let before = tasks.len();
        tasks.retain(|task| &task.id != id);
        if tasks.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn list_finances(&self) -> Result<Vec<Finance>, StoreError> {
        self.enter("list_finances")?;
        Ok(self.finances.borrow().clone())
    }

    async fn create_finance(&self, finance: &NewFinance) -> Result<RecordId, StoreError> {
        self.enter("create_finance")?;
        let id = RecordId::generate();
        self.finances
            .borrow_mut()
            .push(Finance::from_new(id.clone(), finance.clone()));
        Ok(id)
    }

    async fn delete_finance(&self, id: &RecordId) -> Result<(), StoreError> {
        self.enter("delete_finance")?;
        let mut finances = self.finances.borrow_mut();
        let before = finances.len();
        finances.retain(|finance| &finance.id != id);
        if finances.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }
}
