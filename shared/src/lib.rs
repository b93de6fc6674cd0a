//! Data model and client-side data layer for taskfin.
//!
//! Everything here is shared between the wasm UI and the document store
//! service: the record types, the [`RecordStore`] seam, the keyed query
//! cache, the derived views and the form controllers.

pub mod form;
pub mod memory;
pub mod model;
pub mod query;
pub mod store;
pub mod view;

pub use form::{
    ConfirmDialog, FinanceForm, FormState, ListAction, Modal, PendingAction, SubmitTicket,
    TaskForm, ValidationError,
};
pub use memory::MemoryStore;
pub use model::{
    decode_documents, decode_records, Amount, AmountError, CreatedRecord, Decoded, Finance, FinanceMethod, FinanceType,
    NewFinance, NewTask, Priority, RecordId, Task, TaskPatch,
};
pub use query::{FetchTicket, Query, QueryClient, QueryKey, QueryStatus};
pub use store::{RecordStore, StoreError};
pub use view::{FinanceFilter, FinanceTotals, Progress, TaskFilter};
