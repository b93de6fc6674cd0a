mod api;
mod logging;
mod views;

use chrono::{Local, NaiveDate, Utc};
use sauron::{
    html::{attributes::*, *},
    prelude::*,
};
use taskfin_shared::{
    ConfirmDialog, FetchTicket, Finance, FinanceFilter, FinanceForm, FinanceMethod, FinanceType,
    PendingAction, Priority, QueryClient, QueryKey, RecordId, RecordStore, StoreError,
    SubmitTicket, Task, TaskFilter, TaskForm,
};
use web_sys::window;

pub use api::HttpStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Tasks,
    Finances,
    Calendar,
}

impl Page {
    fn to_path(self) -> &'static str {
        match self {
            Page::Tasks => "/",
            Page::Finances => "/finances",
            Page::Calendar => "/calendar",
        }
    }

    fn from_path(path: &str) -> Self {
        match path {
            "/finances" => Page::Finances,
            "/calendar" => Page::Calendar,
            _ => Page::Tasks,
        }
    }

    /// The collection the page renders from.
    fn query(self) -> QueryKey {
        match self {
            Page::Tasks | Page::Calendar => QueryKey::Tasks,
            Page::Finances => QueryKey::Finances,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Msg {
    // Navigation
    NavigateTo(Page),

    // Queries
    TasksLoaded(FetchTicket, Result<Vec<Task>, StoreError>),
    FinancesLoaded(FetchTicket, Result<Vec<Finance>, StoreError>),
    SetTaskFilter(TaskFilter),
    SetFinanceFilter(FinanceFilter),
    SelectDate(NaiveDate),

    // Task form
    OpenTaskForm,
    CancelTaskForm,
    SetTaskTitle(String),
    SetTaskDescription(String),
    SetTaskPriority(Priority),
    SetTaskDueDate(String),
    SubmitTask,
    TaskCreated(SubmitTicket, Result<RecordId, StoreError>),

    // Finance form
    OpenFinanceForm,
    CancelFinanceForm,
    SetFinanceAmount(String),
    SetFinanceDescription(String),
    SetFinanceMethod(FinanceMethod),
    SetFinanceType(FinanceType),
    SubmitFinance,
    FinanceCreated(SubmitTicket, Result<RecordId, StoreError>),

    // Row actions
    RequestAction(PendingAction),
    CancelAction,
    ConfirmAction,
    ActionSettled(PendingAction, Result<(), StoreError>),
}

pub struct Model {
    current_page: Page,
    store: HttpStore,
    queries: QueryClient,
    task_filter: TaskFilter,
    finance_filter: FinanceFilter,
    task_form: TaskForm,
    finance_form: FinanceForm,
    confirm: ConfirmDialog,
    today: NaiveDate,
    selected_date: NaiveDate,
}

impl Model {
    pub fn new(store: HttpStore, queries: QueryClient, today: NaiveDate) -> Self {
        Self {
            current_page: Page::Tasks,
            store,
            queries,
            task_filter: TaskFilter::default(),
            finance_filter: FinanceFilter::default(),
            task_form: TaskForm::new(),
            finance_form: FinanceForm::new(),
            confirm: ConfirmDialog::new(),
            today,
            selected_date: today,
        }
    }

    /// Starts a fetch for `key` unless the cached snapshot is fresh or one is
    /// already in flight.
    fn fetch(&mut self, key: QueryKey) -> Cmd<Msg> {
        let store = self.store.clone();
        match key {
            QueryKey::Tasks => match self.queries.tasks_mut().begin_fetch() {
                Some(ticket) => Cmd::new(async move {
                    Msg::TasksLoaded(ticket, store.list_tasks().await)
                }),
                None => Cmd::none(),
            },
            QueryKey::Finances => match self.queries.finances_mut().begin_fetch() {
                Some(ticket) => Cmd::new(async move {
                    Msg::FinancesLoaded(ticket, store.list_finances().await)
                }),
                None => Cmd::none(),
            },
        }
    }

    fn show(&mut self, page: Page) -> Cmd<Msg> {
        self.current_page = page;
        self.queries.mount(page.query());
        self.fetch(page.query())
    }
}

impl Application for Model {
    type MSG = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        let page = window()
            .and_then(|w| w.location().pathname().ok())
            .map(|path| Page::from_path(&path))
            .unwrap_or(Page::Tasks);
        self.show(page)
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::NavigateTo(page) => {
                if let Some(history) = window().and_then(|w| w.history().ok()) {
                    let _ = history.push_state_with_url(
                        &wasm_bindgen::JsValue::NULL,
                        "",
                        Some(page.to_path()),
                    );
                }
                self.show(page)
            }
            Msg::TasksLoaded(ticket, result) => {
                if !self.queries.tasks_mut().resolve(ticket, result) {
                    tracing::debug!(?ticket, "dropped superseded task fetch");
                }
                self.fetch(QueryKey::Tasks)
            }
            Msg::FinancesLoaded(ticket, result) => {
                if !self.queries.finances_mut().resolve(ticket, result) {
                    tracing::debug!(?ticket, "dropped superseded finance fetch");
                }
                self.fetch(QueryKey::Finances)
            }
            Msg::SetTaskFilter(filter) => {
                self.task_filter = filter;
                Cmd::none()
            }
            Msg::SetFinanceFilter(filter) => {
                self.finance_filter = filter;
                Cmd::none()
            }
            Msg::SelectDate(date) => {
                self.selected_date = date;
                Cmd::none()
            }

            Msg::OpenTaskForm => {
                self.task_form.open();
                Cmd::none()
            }
            Msg::CancelTaskForm => {
                self.task_form.cancel();
                Cmd::none()
            }
            Msg::SetTaskTitle(title) => {
                self.task_form.title = title;
                Cmd::none()
            }
            Msg::SetTaskDescription(description) => {
                self.task_form.description = description;
                Cmd::none()
            }
            Msg::SetTaskPriority(priority) => {
                self.task_form.priority = priority;
                Cmd::none()
            }
            Msg::SetTaskDueDate(raw) => {
                self.task_form.due_date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok();
                Cmd::none()
            }
            Msg::SubmitTask => match self.task_form.submit() {
                Ok((ticket, task)) => {
                    let store = self.store.clone();
                    Cmd::new(async move {
                        Msg::TaskCreated(ticket, store.create_task(&task).await)
                    })
                }
                Err(err) => {
                    tracing::debug!(field = err.field(), "task form rejected");
                    Cmd::none()
                }
            },
            Msg::TaskCreated(ticket, outcome) => {
                self.task_form.settle(ticket, outcome, &mut self.queries);
                self.fetch(QueryKey::Tasks)
            }

            Msg::OpenFinanceForm => {
                self.finance_form.open();
                Cmd::none()
            }
            Msg::CancelFinanceForm => {
                self.finance_form.cancel();
                Cmd::none()
            }
            Msg::SetFinanceAmount(amount) => {
                self.finance_form.amount = amount;
                Cmd::none()
            }
            Msg::SetFinanceDescription(description) => {
                self.finance_form.description = description;
                Cmd::none()
            }
            Msg::SetFinanceMethod(method) => {
                self.finance_form.method = method;
                Cmd::none()
            }
            Msg::SetFinanceType(finance_type) => {
                self.finance_form.finance_type = finance_type;
                Cmd::none()
            }
            Msg::SubmitFinance => match self.finance_form.submit(Utc::now()) {
                Ok((ticket, finance)) => {
                    let store = self.store.clone();
                    Cmd::new(async move {
                        Msg::FinanceCreated(ticket, store.create_finance(&finance).await)
                    })
                }
                Err(err) => {
                    tracing::debug!(field = err.field(), "finance form rejected");
                    Cmd::none()
                }
            },
            Msg::FinanceCreated(ticket, outcome) => {
                self.finance_form.settle(ticket, outcome, &mut self.queries);
                self.fetch(QueryKey::Finances)
            }

            Msg::RequestAction(pending) => {
                self.confirm.request(pending);
                Cmd::none()
            }
            Msg::CancelAction => {
                self.confirm.cancel();
                Cmd::none()
            }
            Msg::ConfirmAction => match self.confirm.confirm() {
                Some(pending) => {
                    let store = self.store.clone();
                    Cmd::new(async move {
                        let result = pending.run(&store).await;
                        Msg::ActionSettled(pending, result)
                    })
                }
                None => Cmd::none(),
            },
            Msg::ActionSettled(pending, result) => {
                self.confirm.settle(&pending, result, &mut self.queries);
                self.fetch(pending.action.key())
            }
        }
    }

    fn view(&self) -> Node<Msg> {
        div(
            [class("min-h-screen bg-ctp-base text-ctp-text")],
            [
                self.view_header(),
                div(
                    [class("max-w-3xl mx-auto px-6 py-8")],
                    [match self.current_page {
                        Page::Tasks => self.view_tasks_page(),
                        Page::Finances => self.view_finances_page(),
                        Page::Calendar => self.view_calendar_page(),
                    }],
                ),
                self.view_confirm_dialog(),
            ],
        )
    }
}

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    logging::init();

    let today = Local::now().date_naive();
    let origin = window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default();
    Program::mount_to_body(Model::new(HttpStore::new(origin), QueryClient::new(), today));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_round_trip_and_unknown_falls_back_to_tasks() {
        for page in [Page::Tasks, Page::Finances, Page::Calendar] {
            assert_eq!(Page::from_path(page.to_path()), page);
        }
        assert_eq!(Page::from_path("/tasks"), Page::Tasks);
        assert_eq!(Page::from_path("/nowhere"), Page::Tasks);
    }

    #[test]
    fn calendar_reads_the_task_collection() {
        assert_eq!(Page::Calendar.query(), QueryKey::Tasks);
        assert_eq!(Page::Finances.query(), QueryKey::Finances);
    }
}
