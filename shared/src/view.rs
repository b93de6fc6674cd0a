//! Projections computed from a fetched snapshot on every render.
//! Nothing here is cached or persisted.

use std::borrow::Borrow;

use chrono::{Days, NaiveDate};

use crate::model::{Finance, FinanceType, Priority, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFilter {
    #[default]
    All,
    Priority(Priority),
}

impl TaskFilter {
    pub const ALL_OPTIONS: [TaskFilter; 4] = [
        TaskFilter::All,
        TaskFilter::Priority(Priority::Low),
        TaskFilter::Priority(Priority::Medium),
        TaskFilter::Priority(Priority::High),
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TaskFilter::All => "All",
            TaskFilter::Priority(priority) => priority.label(),
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Priority(priority) => task.priority == *priority,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinanceFilter {
    #[default]
    All,
    Type(FinanceType),
}

impl FinanceFilter {
    pub const ALL_OPTIONS: [FinanceFilter; 3] = [
        FinanceFilter::All,
        FinanceFilter::Type(FinanceType::Income),
        FinanceFilter::Type(FinanceType::Expense),
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FinanceFilter::All => "All",
            FinanceFilter::Type(finance_type) => finance_type.label(),
        }
    }

    pub fn matches(&self, finance: &Finance) -> bool {
        match self {
            FinanceFilter::All => true,
            FinanceFilter::Type(finance_type) => finance.finance_type == *finance_type,
        }
    }
}

pub fn filter_tasks(tasks: &[Task], filter: TaskFilter) -> Vec<&Task> {
    tasks.iter().filter(|task| filter.matches(task)).collect()
}

pub fn filter_finances(finances: &[Finance], filter: FinanceFilter) -> Vec<&Finance> {
    finances
        .iter()
        .filter(|finance| filter.matches(finance))
        .collect()
}

/// Incomplete tasks first. Stable, so each group keeps its input order.
pub fn sort_by_completion<T: Borrow<Task>>(tasks: &mut [T]) {
    tasks.sort_by_key(|task| task.borrow().completed);
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FinanceTotals {
    pub income: f64,
    pub expense: f64,
}

impl FinanceTotals {
    pub fn from_records(finances: &[Finance]) -> Self {
        finances
            .iter()
            .fold(Self::default(), |mut totals, finance| {
                match finance.finance_type {
                    FinanceType::Income => totals.income += finance.amount.value(),
                    FinanceType::Expense => totals.expense += finance.amount.value(),
                }
                totals
            })
    }

    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    completed: usize,
    total: usize,
}

impl Progress {
    pub fn of(tasks: &[Task]) -> Self {
        Self {
            completed: tasks.iter().filter(|task| task.completed).count(),
            total: tasks.len(),
        }
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    pub fn percent(&self) -> u32 {
        (self.ratio() * 100.0).round() as u32
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }
}

/// The seven days ending with `today`, oldest first.
pub fn past_week(today: NaiveDate) -> Vec<NaiveDate> {
    (0..7u64)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .collect()
}

pub fn tasks_due_on(tasks: &[Task], date: NaiveDate) -> Vec<&Task> {
    tasks.iter().filter(|task| task.due_date == date).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, FinanceMethod, RecordId};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn task(id: &str, priority: Priority, completed: bool) -> Task {
        Task {
            id: RecordId::new(id),
            title: format!("task {id}"),
            description: None,
            due_date: NaiveDate::from_ymd_opt(2025, 2, 24).unwrap(),
            priority,
            completed,
            reminder: None,
            tags: None,
        }
    }

    fn finance(id: &str, amount: &str, finance_type: FinanceType) -> Finance {
        Finance {
            id: RecordId::new(id),
            amount: Amount::parse(amount).unwrap(),
            method: FinanceMethod::Cash,
            date: Utc.with_ymd_and_hms(2025, 2, 24, 9, 0, 0).unwrap(),
            description: Some("groceries".into()),
            finance_type,
        }
    }

    #[test]
    fn incomplete_tasks_sort_first_in_input_order() {
        let mut tasks = vec![
            task("a", Priority::Low, true),
            task("b", Priority::Low, false),
            task("c", Priority::Low, false),
        ];
        sort_by_completion(&mut tasks);
        let ids: Vec<_> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[test]
    fn progress_is_zero_without_tasks() {
        let progress = Progress::of(&[]);
        assert_eq!(progress.ratio(), 0.0);
        assert_eq!(progress.percent(), 0);
        assert_eq!(progress.remaining(), 0);
    }

    #[test]
    fn progress_counts_completed() {
        let tasks = vec![
            task("a", Priority::Low, true),
            task("b", Priority::High, false),
            task("c", Priority::High, false),
        ];
        let progress = Progress::of(&tasks);
        assert_eq!(progress.ratio(), 1.0 / 3.0);
        assert_eq!(progress.percent(), 33);
        assert_eq!(progress.remaining(), 2);
        assert_eq!((progress.completed(), progress.total()), (1, 3));
    }

    #[test]
    fn remaining_never_goes_below_zero() {
        let progress = Progress {
            completed: 2,
            total: 1,
        };
        assert_eq!(progress.remaining(), 0);
    }

    #[test]
    fn totals_split_income_and_expense() {
        let finances = vec![
            finance("a", "100", FinanceType::Income),
            finance("b", "40", FinanceType::Expense),
        ];
        let totals = FinanceTotals::from_records(&finances);
        assert_eq!(totals.income, 100.0);
        assert_eq!(totals.expense, 40.0);
        assert_eq!(totals.balance(), 60.0);
        assert_eq!(FinanceTotals::from_records(&[]), FinanceTotals::default());
    }

    #[test]
    fn totals_are_zero_for_the_missing_side() {
        let spending = vec![
            finance("a", "12.5", FinanceType::Expense),
            finance("b", "7.5", FinanceType::Expense),
        ];
        let totals = FinanceTotals::from_records(&spending);
        assert_eq!(totals.income, 0.0);
        assert_eq!(totals.expense, 20.0);
        assert_eq!(totals.balance(), -20.0);

        let earnings = vec![finance("c", "300", FinanceType::Income)];
        let totals = FinanceTotals::from_records(&earnings);
        assert_eq!(totals.income, 300.0);
        assert_eq!(totals.expense, 0.0);
    }

    #[test]
    fn filters_match_exactly() {
        let tasks = vec![
            task("a", Priority::Low, false),
            task("b", Priority::High, false),
        ];
        let high = filter_tasks(&tasks, TaskFilter::Priority(Priority::High));
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].id.as_str(), "b");
        assert!(filter_tasks(&tasks, TaskFilter::Priority(Priority::Medium)).is_empty());

        let finances = vec![
            finance("x", "5", FinanceType::Expense),
            finance("y", "7", FinanceType::Income),
        ];
        let income = filter_finances(&finances, FinanceFilter::Type(FinanceType::Income));
        assert_eq!(income.len(), 1);
        assert_eq!(income[0].id.as_str(), "y");
    }

    #[test]
    fn past_week_ends_today() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let week = past_week(today);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0], NaiveDate::from_ymd_opt(2025, 2, 24).unwrap());
        assert_eq!(week[6], today);
    }

    #[test]
    fn due_date_lookup() {
        let mut later = task("b", Priority::Low, false);
        later.due_date = NaiveDate::from_ymd_opt(2025, 2, 25).unwrap();
        let tasks = vec![task("a", Priority::High, false), later];
        let due = tasks_due_on(&tasks, NaiveDate::from_ymd_opt(2025, 2, 25).unwrap());
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id.as_str(), "b");
    }

    fn arb_priority() -> impl Strategy<Value = Priority> {
        prop_oneof![
            Just(Priority::Low),
            Just(Priority::Medium),
            Just(Priority::High)
        ]
    }

    fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
        prop::collection::vec((arb_priority(), any::<bool>()), 0..40).prop_map(|rows| {
            rows
                .into_iter()
                .enumerate()
                .map(|(i, (priority, completed))| task(&i.to_string(), priority, completed))
                .collect()
        })
    }

    fn arb_finances() -> impl Strategy<Value = Vec<Finance>> {
        let kind = prop_oneof![Just(FinanceType::Income), Just(FinanceType::Expense)];
        prop::collection::vec((kind, 1u32..10_000), 0..40).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (kind, amount))| finance(&i.to_string(), &amount.to_string(), kind))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn sort_is_a_stable_partition(tasks in arb_tasks()) {
            let mut sorted: Vec<&Task> = tasks.iter().collect();
            sort_by_completion(&mut sorted);

            prop_assert_eq!(sorted.len(), tasks.len());
            let split = sorted.iter().position(|t| t.completed).unwrap_or(sorted.len());
            prop_assert!(sorted[split..].iter().all(|t| t.completed));

            let open: Vec<&Task> = tasks.iter().filter(|t| !t.completed).collect();
            let done: Vec<&Task> = tasks.iter().filter(|t| t.completed).collect();
            prop_assert_eq!(&sorted[..split], &open[..]);
            prop_assert_eq!(&sorted[split..], &done[..]);
        }

        #[test]
        fn all_filter_is_identity(tasks in arb_tasks()) {
            let filtered = filter_tasks(&tasks, TaskFilter::All);
            let original: Vec<&Task> = tasks.iter().collect();
            prop_assert_eq!(filtered, original);
        }

        #[test]
        fn all_finance_filter_is_identity(finances in arb_finances()) {
            let filtered = filter_finances(&finances, FinanceFilter::All);
            let original: Vec<&Finance> = finances.iter().collect();
            prop_assert_eq!(filtered, original);
        }

        #[test]
        fn progress_ratio_is_exact(tasks in arb_tasks()) {
            let progress = Progress::of(&tasks);
            let done = tasks.iter().filter(|t| t.completed).count();
            if tasks.is_empty() {
                prop_assert_eq!(progress.ratio(), 0.0);
            } else {
                prop_assert_eq!(progress.ratio(), done as f64 / tasks.len() as f64);
            }
        }
    }
}
