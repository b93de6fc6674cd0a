use chrono::NaiveDate;
use sauron::{
    html::{attributes, attributes::*, *},
    prelude::*,
};
use taskfin_shared::view::{
    filter_finances, filter_tasks, past_week, sort_by_completion, tasks_due_on,
};
use taskfin_shared::{
    Finance, FinanceFilter, FinanceMethod, FinanceTotals, FinanceType, FormState, PendingAction,
    Priority, Progress, QueryStatus, Task, TaskFilter, ValidationError,
};

use crate::{Model, Msg, Page};

const CARD: &str = "bg-ctp-surface0 rounded-lg shadow-lg p-6 border border-ctp-surface1";
const FIELD: &str = "w-full px-3 py-2 bg-ctp-surface0 border border-ctp-surface2 rounded-md text-ctp-text placeholder-ctp-subtext0 focus:outline-none focus:ring-2 focus:ring-ctp-blue focus:border-transparent";
const MUTED: &str = "text-center py-10 text-ctp-subtext0 italic";

impl Model {
    pub(crate) fn view_header(&self) -> Node<Msg> {
        header([class("bg-ctp-mantle shadow-lg border-b border-ctp-surface0")], [
            div([class("max-w-3xl mx-auto px-6 py-4")], [
                div([class("flex items-center justify-between")], [
                    h1([class("text-2xl font-bold text-ctp-text")], [text("Taskfin")]),
                    nav([class("flex space-x-4")], [
                        self.nav_link("Tasks", Page::Tasks),
                        self.nav_link("Finances", Page::Finances),
                        self.nav_link("Calendar", Page::Calendar),
                    ]),
                ]),
            ]),
        ])
    }

    fn nav_link(&self, label: &str, page: Page) -> Node<Msg> {
        let is_active = self.current_page == page;
        a([
            href(page.to_path()),
            on_click(move |event| {
                event.prevent_default();
                Msg::NavigateTo(page)
            }),
            class(&format!(
                "px-3 py-2 rounded-md text-sm font-medium transition-colors duration-200 {}",
                if is_active {
                    "bg-ctp-blue text-ctp-base"
                } else {
                    "text-ctp-subtext0 hover:text-ctp-text hover:bg-ctp-surface0"
                }
            )),
        ], [text(label)])
    }

    // Tasks

    pub(crate) fn view_tasks_page(&self) -> Node<Msg> {
        let status = self.queries.tasks().status();
        div([class("space-y-6")], [
            self.view_progress(&status),
            self.view_task_filters(),
            div([class(CARD)], [
                div([class("flex items-center justify-between mb-4")], [
                    h2([class("text-xl font-semibold text-ctp-text")], [text("Tasks")]),
                    fetching_badge(status.is_fetching),
                ]),
                self.view_task_list(&status),
            ]),
            add_button(Msg::OpenTaskForm),
            self.view_task_form(),
        ])
    }

    fn view_progress(&self, status: &QueryStatus<'_, Task>) -> Node<Msg> {
        let progress = Progress::of(status.data.unwrap_or_default());
        div([class(CARD)], [
            div([class("flex items-center justify-between mb-3")], [
                p([class("text-ctp-subtext1")], [text(&format!(
                    "{} out of {} tasks left",
                    progress.remaining(),
                    progress.total()
                ))]),
                span([class("text-2xl font-bold text-ctp-text")], [
                    text(&format!("{}%", progress.percent())),
                ]),
            ]),
            div([class("w-full bg-ctp-surface2 rounded-full h-2")], [
                div([
                    class("bg-ctp-green h-2 rounded-full transition-all duration-500"),
                    attributes::styles([("width", format!("{}%", progress.percent()))]),
                ], []),
            ]),
        ])
    }

    fn view_task_filters(&self) -> Node<Msg> {
        div(
            [class("flex flex-wrap gap-2")],
            TaskFilter::ALL_OPTIONS
                .iter()
                .map(|&filter| {
                    chip(filter.label(), self.task_filter == filter, Msg::SetTaskFilter(filter))
                })
                .collect::<Vec<_>>(),
        )
    }

    fn view_task_list(&self, status: &QueryStatus<'_, Task>) -> Node<Msg> {
        if status.is_loading {
            return div([class(MUTED)], [text("Loading...")]);
        }
        if status.is_error {
            return div([class("text-center py-10 text-ctp-red")], [text("Sorry, No Task Found")]);
        }
        let tasks = status.data.unwrap_or_default();

        let mut visible = filter_tasks(tasks, self.task_filter);
        sort_by_completion(&mut visible);
        if visible.is_empty() {
            return div([class(MUTED)], [text("No tasks yet.")]);
        }
        div(
            [class("space-y-3")],
            visible.into_iter().map(|task| self.view_task(task)).collect::<Vec<_>>(),
        )
    }

    fn view_task(&self, task: &Task) -> Node<Msg> {
        let complete = PendingAction::complete_task(task);
        let remove = PendingAction::delete_task(task);
        div(
            [
                key(task.id.to_string()),
                class(&format!(
                    "border rounded-xl p-4 bg-ctp-surface0 shadow-sm transition-all duration-300 {}",
                    if task.completed {
                        "border-ctp-green bg-ctp-green/10"
                    } else {
                        "border-ctp-surface1 hover:border-ctp-blue"
                    }
                )),
            ],
            [div([class("flex items-start gap-4")], [
                div([class("flex-1 min-w-0")], [
                    h3([class(&format!(
                        "text-lg font-semibold {}",
                        if task.completed {
                            "line-through text-ctp-overlay1"
                        } else {
                            "text-ctp-text"
                        }
                    ))], [text(&task.title)]),
                    p([class("text-sm text-ctp-subtext1 break-words")], [
                        text(task.description.as_deref().unwrap_or_default()),
                    ]),
                    div([class("mt-2 flex gap-2 text-xs")], [
                        span([class(priority_badge(task.priority))], [text(task.priority.label())]),
                        span([class("text-ctp-subtext0")], [
                            text(&format!("Due {}", task.due_date.format("%b %e, %Y"))),
                        ]),
                    ]),
                ]),
                div([class("flex flex-col gap-2 flex-shrink-0")], [
                    if task.completed {
                        span([class("text-ctp-green text-sm font-bold")], [text("✓")])
                    } else {
                        button([
                            r#type("button"),
                            on_click(move |_| Msg::RequestAction(complete.clone())),
                            class("w-8 h-8 rounded-lg bg-ctp-green/20 text-ctp-green hover:bg-ctp-green/30"),
                        ], [text("✓")])
                    },
                    button([
                        r#type("button"),
                        on_click(move |_| Msg::RequestAction(remove.clone())),
                        class("w-8 h-8 rounded-lg bg-ctp-red/20 text-ctp-red hover:bg-ctp-red/30"),
                    ], [text("🗑️")]),
                ]),
            ])],
        )
    }

    fn view_task_form(&self) -> Node<Msg> {
        let form = &self.task_form;
        if !form.modal().is_open() {
            return span([], []);
        }
        let due = form
            .due_date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        modal(
            "New Task",
            vec![
                input([
                    r#type("text"),
                    placeholder("Title"),
                    value(&form.title),
                    on_input(|event| Msg::SetTaskTitle(event.value())),
                    class(FIELD),
                ], []),
                textarea([
                    placeholder("Description"),
                    value(&form.description),
                    on_input(|event| Msg::SetTaskDescription(event.value())),
                    class(&format!("{FIELD} h-20 resize-y")),
                ], []),
                div(
                    [class("flex gap-2")],
                    Priority::ALL
                        .iter()
                        .map(|&priority| {
                            chip(priority.label(), form.priority == priority, Msg::SetTaskPriority(priority))
                        })
                        .collect::<Vec<_>>(),
                ),
                input([
                    r#type("date"),
                    value(&due),
                    on_input(|event| Msg::SetTaskDueDate(event.value())),
                    class(FIELD),
                ], []),
                form_feedback(form.error(), form.alert()),
            ],
            form.state(),
            Msg::SubmitTask,
            Msg::CancelTaskForm,
        )
    }

    // Finances

    pub(crate) fn view_finances_page(&self) -> Node<Msg> {
        let status = self.queries.finances().status();
        let totals = FinanceTotals::from_records(status.data.unwrap_or_default());
        div([class("space-y-6")], [
            div([class("grid grid-cols-3 gap-4")], [
                stat_card("Income", totals.income, "text-ctp-green"),
                stat_card("Expense", totals.expense, "text-ctp-red"),
                stat_card("Balance", totals.balance(), "text-ctp-text"),
            ]),
            div(
                [class("flex flex-wrap gap-2")],
                FinanceFilter::ALL_OPTIONS
                    .iter()
                    .map(|&filter| {
                        chip(
                            filter.label(),
                            self.finance_filter == filter,
                            Msg::SetFinanceFilter(filter),
                        )
                    })
                    .collect::<Vec<_>>(),
            ),
            div([class(CARD)], [
                div([class("flex items-center justify-between mb-4")], [
                    h2([class("text-xl font-semibold text-ctp-text")], [text("Transactions")]),
                    fetching_badge(status.is_fetching),
                ]),
                self.view_finance_list(&status),
            ]),
            add_button(Msg::OpenFinanceForm),
            self.view_finance_form(),
        ])
    }

    fn view_finance_list(&self, status: &QueryStatus<'_, Finance>) -> Node<Msg> {
        if status.is_loading {
            return div([class(MUTED)], [text("Loading...")]);
        }
        if status.is_error {
            return div([class("text-center py-10 text-ctp-red")], [text("Error loading finances")]);
        }
        let finances = status.data.unwrap_or_default();

        let visible = filter_finances(finances, self.finance_filter);
        if visible.is_empty() {
            return div([class(MUTED)], [text("No records yet.")]);
        }
        div(
            [class("space-y-3")],
            visible.into_iter().map(view_finance).collect::<Vec<_>>(),
        )
    }

    fn view_finance_form(&self) -> Node<Msg> {
        let form = &self.finance_form;
        if !form.modal().is_open() {
            return span([], []);
        }

        modal(
            "New Record",
            vec![
                input([
                    r#type("text"),
                    placeholder("Amount"),
                    value(&form.amount),
                    on_input(|event| Msg::SetFinanceAmount(event.value())),
                    class(FIELD),
                ], []),
                input([
                    r#type("text"),
                    placeholder("Description"),
                    value(&form.description),
                    on_input(|event| Msg::SetFinanceDescription(event.value())),
                    class(FIELD),
                ], []),
                div(
                    [class("flex gap-2")],
                    FinanceType::ALL
                        .iter()
                        .map(|&kind| chip(kind.label(), form.finance_type == kind, Msg::SetFinanceType(kind)))
                        .collect::<Vec<_>>(),
                ),
                div(
                    [class("flex flex-wrap gap-2")],
                    FinanceMethod::ALL
                        .iter()
                        .map(|&method| chip(method.label(), form.method == method, Msg::SetFinanceMethod(method)))
                        .collect::<Vec<_>>(),
                ),
                form_feedback(form.error(), form.alert()),
            ],
            form.state(),
            Msg::SubmitFinance,
            Msg::CancelFinanceForm,
        )
    }

    // Calendar

    pub(crate) fn view_calendar_page(&self) -> Node<Msg> {
        let status = self.queries.tasks().status();
        let selected = self.selected_date;
        div([class("space-y-6")], [
            div(
                [class("grid grid-cols-7 gap-2")],
                past_week(self.today)
                    .into_iter()
                    .map(|date| {
                        let is_selected = date == selected;
                        button([
                            r#type("button"),
                            on_click(move |_| Msg::SelectDate(date)),
                            class(&format!(
                                "rounded-lg p-2 text-center transition-colors duration-200 {}",
                                if is_selected {
                                    "bg-ctp-blue text-ctp-base"
                                } else {
                                    "bg-ctp-surface0 text-ctp-subtext1 hover:bg-ctp-surface1"
                                }
                            )),
                        ], [
                            div([class("text-xs")], [text(&date.format("%a").to_string())]),
                            div([class("text-lg font-bold")], [text(&date.format("%d").to_string())]),
                        ])
                    })
                    .collect::<Vec<_>>(),
            ),
            div([class(CARD)], [
                h2([class("text-xl font-semibold text-ctp-text mb-4")], [
                    text(&selected.format("%A, %B %e").to_string()),
                ]),
                self.view_due_on(&status, selected),
            ]),
        ])
    }

    fn view_due_on(&self, status: &QueryStatus<'_, Task>, date: NaiveDate) -> Node<Msg> {
        if status.is_loading {
            return div([class(MUTED)], [text("Loading...")]);
        }
        if status.is_error {
            return div([class("text-center py-10 text-ctp-red")], [text("Sorry, No Task Found")]);
        }
        let due = tasks_due_on(status.data.unwrap_or_default(), date);
        if due.is_empty() {
            return div([class(MUTED)], [text("Nothing due.")]);
        }
        div(
            [class("space-y-3")],
            due.into_iter().map(|task| self.view_task(task)).collect::<Vec<_>>(),
        )
    }

    pub(crate) fn view_confirm_dialog(&self) -> Node<Msg> {
        let Some(pending) = self.confirm.pending() else {
            return span([], []);
        };
        overlay(div([class(CARD)], [
            h3([class("text-lg font-semibold text-ctp-text mb-2")], [text(pending.action.prompt())]),
            p([class("text-ctp-subtext1 mb-4")], [text(&pending.summary)]),
            match self.confirm.alert() {
                Some(alert) => p([class("text-ctp-red text-sm mb-4")], [text(alert)]),
                None => span([], []),
            },
            div([class("flex justify-end gap-2")], [
                button([
                    on_click(|_| Msg::CancelAction),
                    class("bg-ctp-overlay0 hover:bg-ctp-overlay1 text-ctp-text font-medium px-4 py-2 rounded-md"),
                ], [text("No")]),
                button([
                    on_click(|_| Msg::ConfirmAction),
                    class("bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base font-medium px-4 py-2 rounded-md"),
                ], [text("Yes")]),
            ]),
        ]))
    }
}

fn view_finance(finance: &Finance) -> Node<Msg> {
    let remove = PendingAction::delete_finance(finance);
    let (sign, tone) = match finance.finance_type {
        FinanceType::Income => ("+", "text-ctp-green"),
        FinanceType::Expense => ("-", "text-ctp-red"),
    };
    div(
        [
            key(finance.id.to_string()),
            class("flex items-center justify-between border border-ctp-surface1 rounded-xl p-4 bg-ctp-surface0"),
        ],
        [
            div([], [
                p([class("text-ctp-text font-medium")], [
                    text(finance.description.as_deref().unwrap_or_default()),
                ]),
                p([class("text-xs text-ctp-subtext0")], [text(&format!(
                    "{} · {}",
                    finance.method.label(),
                    finance.date.format("%b %e, %Y")
                ))]),
            ]),
            div([class("flex items-center gap-3")], [
                span([class(&format!("text-lg font-bold {tone}"))], [
                    text(&format!("{sign}{}", finance.amount)),
                ]),
                button([
                    r#type("button"),
                    on_click(move |_| Msg::RequestAction(remove.clone())),
                    class("w-8 h-8 rounded-lg bg-ctp-red/20 text-ctp-red hover:bg-ctp-red/30"),
                ], [text("🗑️")]),
            ]),
        ],
    )
}

fn stat_card(label: &str, amount: f64, tone: &str) -> Node<Msg> {
    div([class("bg-ctp-surface1 rounded-lg p-4 border border-ctp-surface2")], [
        p([class("text-sm font-medium text-ctp-subtext0")], [text(label)]),
        p([class(&format!("text-2xl font-bold mt-1 {tone}"))], [text(&format!("{amount:.2}"))]),
    ])
}

fn chip(label: &str, selected: bool, msg: Msg) -> Node<Msg> {
    button([
        r#type("button"),
        on_click(move |_| msg.clone()),
        class(&format!(
            "px-3 py-1 rounded-full text-sm font-medium transition-colors duration-200 {}",
            if selected {
                "bg-ctp-blue text-ctp-base"
            } else {
                "bg-ctp-surface1 text-ctp-subtext1 hover:bg-ctp-surface2"
            }
        )),
    ], [text(label)])
}

fn priority_badge(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "px-2 py-0.5 rounded-full bg-ctp-teal/20 text-ctp-teal",
        Priority::Medium => "px-2 py-0.5 rounded-full bg-ctp-yellow/20 text-ctp-yellow",
        Priority::High => "px-2 py-0.5 rounded-full bg-ctp-red/20 text-ctp-red",
    }
}

fn fetching_badge(is_fetching: bool) -> Node<Msg> {
    if is_fetching {
        span([class("animate-spin text-ctp-blue")], [text("◐")])
    } else {
        span([], [])
    }
}

fn add_button(msg: Msg) -> Node<Msg> {
    div([class("flex justify-end")], [
        button([
            on_click(move |_| msg.clone()),
            class("bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base text-2xl font-bold w-12 h-12 rounded-full shadow-lg"),
        ], [text("+")]),
    ])
}

fn form_feedback(error: Option<&ValidationError>, alert: Option<&str>) -> Node<Msg> {
    match (error, alert) {
        (Some(error), _) => p([class("text-ctp-red text-sm")], [text(&error.to_string())]),
        (None, Some(alert)) => p([class("text-ctp-red text-sm")], [text(alert)]),
        (None, None) => span([], []),
    }
}

fn overlay(content: Node<Msg>) -> Node<Msg> {
    div([class("fixed inset-0 bg-ctp-crust/70 flex items-center justify-center p-6 z-50")], [
        div([class("w-full max-w-md")], [content]),
    ])
}

fn modal(title: &str, fields: Vec<Node<Msg>>, state: FormState, submit: Msg, cancel: Msg) -> Node<Msg> {
    let submitting = state == FormState::Submitting;
    overlay(div([class(CARD)], [
        h2([class("text-xl font-semibold text-ctp-text mb-4 pb-2 border-b border-ctp-surface2")], [text(title)]),
        div([class("space-y-4")], fields),
        div([class("flex justify-end gap-2 mt-6")], [
            button([
                on_click(move |_| cancel.clone()),
                class("bg-ctp-overlay0 hover:bg-ctp-overlay1 text-ctp-text font-medium px-4 py-2 rounded-md"),
            ], [text("Cancel")]),
            button([
                on_click(move |_| submit.clone()),
                class("bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base font-medium px-6 py-2 rounded-md"),
            ], [text(if submitting { "Saving..." } else { "Save" })]),
        ]),
    ]))
}
