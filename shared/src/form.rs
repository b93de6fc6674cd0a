//! Form and confirmation controllers.
//!
//! A controller validates the draft and hands back the record to submit; the
//! caller performs the store call and reports the outcome through `settle`,
//! which is where cache invalidation and modal dismissal happen.

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{
    Amount, Finance, FinanceMethod, FinanceType, NewFinance, NewTask, Priority, RecordId, Task,
    TaskPatch,
};
use crate::query::{QueryClient, QueryKey};
use crate::store::{RecordStore, StoreError};

pub use crate::model::ValidationError;

const STORE_ALERT: &str = "Error in storing.";

/// Visibility of a dialog, owned by whoever renders it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modal {
    open: bool,
}

impl Modal {
    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormState {
    #[default]
    Closed,
    Editing,
    /// Validated and handed to the store; the form stays interactive.
    Submitting,
}

/// Identifies one accepted submission. Only the latest submission of the
/// draft that is still on screen may close the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitTicket {
    generation: u64,
}

/// Bookkeeping common to both entry forms.
#[derive(Debug, Clone, Default)]
struct FormCore {
    modal: Modal,
    state: FormState,
    error: Option<ValidationError>,
    alert: Option<String>,
    generation: u64,
    current: Option<u64>,
}

impl FormCore {
    fn open(&mut self) {
        self.modal.open();
        self.state = FormState::Editing;
        self.error = None;
        self.alert = None;
        self.current = None;
    }

    fn cancel(&mut self) {
        self.modal.close();
        self.state = FormState::Closed;
        self.current = None;
    }

    fn reject(&mut self, error: ValidationError) -> ValidationError {
        self.state = FormState::Editing;
        self.alert = None;
        self.current = None;
        self.error = Some(error.clone());
        error
    }

    fn accept(&mut self) -> SubmitTicket {
        self.state = FormState::Submitting;
        self.error = None;
        self.alert = None;
        self.generation += 1;
        self.current = Some(self.generation);
        SubmitTicket {
            generation: self.generation,
        }
    }

    fn is_current(&self, ticket: SubmitTicket) -> bool {
        self.modal.is_open() && self.current == Some(ticket.generation)
    }

    /// Every success invalidates `key`; only the current submission moves the
    /// form. Returns `true` when the form closed.
    fn settle(
        &mut self,
        key: QueryKey,
        ticket: SubmitTicket,
        outcome: Result<RecordId, StoreError>,
        queries: &mut QueryClient,
    ) -> bool {
        let current = self.is_current(ticket);
        match outcome {
            Ok(id) => {
                tracing::info!(%key, %id, "record created");
                queries.invalidate(key);
                if !current {
                    tracing::debug!(%key, ?ticket, "form moved on, leaving it as is");
                    return false;
                }
                self.modal.close();
                self.state = FormState::Closed;
                self.current = None;
                true
            }
            Err(err) => {
                tracing::error!(%key, %err, "create failed");
                if current {
                    self.state = FormState::Editing;
                    self.alert = Some(STORE_ALERT.to_string());
                    self.current = None;
                }
                false
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    core: FormCore,
}

impl TaskForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.core.open();
    }

    pub fn cancel(&mut self) {
        self.core.cancel();
    }

    pub fn modal(&self) -> Modal {
        self.core.modal
    }

    pub fn state(&self) -> FormState {
        self.core.state
    }

    pub fn error(&self) -> Option<&ValidationError> {
        self.core.error.as_ref()
    }

    pub fn alert(&self) -> Option<&str> {
        self.core.alert.as_deref()
    }

    /// Title first, then due date. A blank description falls back to the
    /// title.
    pub fn submit(&mut self) -> Result<(SubmitTicket, NewTask), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(self.core.reject(ValidationError::MissingTitle));
        }
        let Some(due_date) = self.due_date else {
            return Err(self.core.reject(ValidationError::MissingDueDate));
        };
        let description = if self.description.trim().is_empty() {
            self.title.clone()
        } else {
            self.description.clone()
        };

        let task = NewTask {
            title: self.title.clone(),
            description: Some(description),
            due_date,
            priority: self.priority,
            completed: false,
            reminder: None,
            tags: None,
        };
        Ok((self.core.accept(), task))
    }

    pub fn settle(
        &mut self,
        ticket: SubmitTicket,
        outcome: Result<RecordId, StoreError>,
        queries: &mut QueryClient,
    ) {
        if self.core.settle(QueryKey::Tasks, ticket, outcome, queries) {
            self.title.clear();
            self.description.clear();
            self.priority = Priority::default();
            self.due_date = None;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FinanceForm {
    pub amount: String,
    pub description: String,
    pub method: FinanceMethod,
    pub finance_type: FinanceType,
    core: FormCore,
}

impl FinanceForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.core.open();
    }

    pub fn cancel(&mut self) {
        self.core.cancel();
    }

    pub fn modal(&self) -> Modal {
        self.core.modal
    }

    pub fn state(&self) -> FormState {
        self.core.state
    }

    pub fn error(&self) -> Option<&ValidationError> {
        self.core.error.as_ref()
    }

    pub fn alert(&self) -> Option<&str> {
        self.core.alert.as_deref()
    }

    /// Amount first, then description. `now` becomes the record's date.
    pub fn submit(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<(SubmitTicket, NewFinance), ValidationError> {
        let amount = match Amount::parse(&self.amount) {
            Ok(amount) => amount,
            Err(err) => return Err(self.core.reject(err.into())),
        };
        if self.description.trim().is_empty() {
            return Err(self.core.reject(ValidationError::MissingDescription));
        }

        let finance = NewFinance {
            amount,
            method: self.method,
            date: now,
            description: Some(self.description.clone()),
            finance_type: self.finance_type,
        };
        Ok((self.core.accept(), finance))
    }

    pub fn settle(
        &mut self,
        ticket: SubmitTicket,
        outcome: Result<RecordId, StoreError>,
        queries: &mut QueryClient,
    ) {
        if self.core.settle(QueryKey::Finances, ticket, outcome, queries) {
            self.amount.clear();
            self.description.clear();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    CompleteTask,
    DeleteTask,
    DeleteFinance,
}

impl ListAction {
    pub fn key(&self) -> QueryKey {
        match self {
            ListAction::CompleteTask | ListAction::DeleteTask => QueryKey::Tasks,
            ListAction::DeleteFinance => QueryKey::Finances,
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            ListAction::CompleteTask => "Mark task as completed?",
            ListAction::DeleteTask => "Delete this task?",
            ListAction::DeleteFinance => "Delete this data?",
        }
    }
}

/// A row action waiting for the user to confirm it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAction {
    pub action: ListAction,
    pub target: RecordId,
    pub summary: String,
}

impl PendingAction {
    pub fn complete_task(task: &Task) -> Self {
        Self {
            action: ListAction::CompleteTask,
            target: task.id.clone(),
            summary: task.title.clone(),
        }
    }

    pub fn delete_task(task: &Task) -> Self {
        Self {
            action: ListAction::DeleteTask,
            target: task.id.clone(),
            summary: task.title.clone(),
        }
    }

    pub fn delete_finance(finance: &Finance) -> Self {
        let summary = match &finance.description {
            Some(description) => format!("{} {}", finance.amount, description),
            None => finance.amount.to_string(),
        };
        Self {
            action: ListAction::DeleteFinance,
            target: finance.id.clone(),
            summary,
        }
    }

    pub async fn run<S: RecordStore + ?Sized>(&self, store: &S) -> Result<(), StoreError> {
        match self.action {
            ListAction::CompleteTask => {
                store
                    .update_task(&self.target, &TaskPatch::completed(true))
                    .await
            }
            ListAction::DeleteTask => store.delete_task(&self.target).await,
            ListAction::DeleteFinance => store.delete_finance(&self.target).await,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfirmDialog {
    pending: Option<PendingAction>,
    alert: Option<String>,
}

impl ConfirmDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, pending: PendingAction) {
        self.pending = Some(pending);
        self.alert = None;
    }

    pub fn cancel(&mut self) {
        self.pending = None;
        self.alert = None;
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// The action to run. The dialog stays up until the outcome is settled.
    pub fn confirm(&self) -> Option<PendingAction> {
        self.pending.clone()
    }

    pub fn settle(
        &mut self,
        done: &PendingAction,
        result: Result<(), StoreError>,
        queries: &mut QueryClient,
    ) {
        match result {
            Ok(()) => {
                tracing::info!(action = ?done.action, target = %done.target, "list action applied");
                queries.invalidate(done.action.key());
                if self.pending.as_ref() == Some(done) {
                    self.pending = None;
                }
                self.alert = None;
            }
            Err(err) => {
                tracing::error!(action = ?done.action, target = %done.target, %err, "list action failed");
                self.alert = Some(STORE_ALERT.to_string());
            }
        }
    }
}
