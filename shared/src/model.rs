use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

/// Server-assigned document identifier. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinanceMethod {
    #[default]
    Cash,
    Upi,
    Credit,
    Other,
}

impl FinanceMethod {
    pub const ALL: [FinanceMethod; 4] = [
        FinanceMethod::Cash,
        FinanceMethod::Upi,
        FinanceMethod::Credit,
        FinanceMethod::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FinanceMethod::Cash => "Cash",
            FinanceMethod::Upi => "UPI",
            FinanceMethod::Credit => "Credit",
            FinanceMethod::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinanceType {
    #[default]
    Expense,
    Income,
}

impl FinanceType {
    pub const ALL: [FinanceType; 2] = [FinanceType::Expense, FinanceType::Income];

    pub fn label(&self) -> &'static str {
        match self {
            FinanceType::Expense => "Expense",
            FinanceType::Income => "Income",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Enter an amount greater than zero.")]
    Empty,
    #[error("Amount must be a number.")]
    Malformed,
    #[error("Enter an amount greater than zero.")]
    NotPositive,
}

/// A strictly positive money amount.
///
/// Travels as a string on the wire (`"100"`, `"12.5"`). Reading also accepts
/// a bare JSON number since the store does not enforce a schema.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount(f64);

impl Amount {
    pub fn parse(text: &str) -> Result<Self, AmountError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AmountError::Empty);
        }
        let value: f64 = text.parse().map_err(|_| AmountError::Malformed)?;
        Self::from_f64(value)
    }

    pub fn from_f64(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::Malformed);
        }
        if value <= 0.0 {
            return Err(AmountError::NotPositive);
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(f64),
        }

        let parsed = match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Amount::parse(&text),
            Raw::Number(value) => Amount::from_f64(value),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}

/// Field-specific input problems, caught before anything is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("*Missing Information: title")]
    MissingTitle,
    #[error("*Missing Information: due date")]
    MissingDueDate,
    #[error("{0}")]
    Amount(#[from] AmountError),
    #[error("Provide a description.")]
    MissingDescription,
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingTitle => "title",
            ValidationError::MissingDueDate => "due date",
            ValidationError::Amount(_) => "amount",
            ValidationError::MissingDescription => "description",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: RecordId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Task {
    pub fn from_new(id: RecordId, task: NewTask) -> Self {
        Self {
            id,
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            priority: task.priority,
            completed: task.completed,
            reminder: task.reminder,
            tags: task.tags,
        }
    }

    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }
}

/// A task as submitted for creation; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl NewTask {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        Ok(())
    }
}

/// Field-level update for a stored task. Only completion is ever patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finance {
    pub id: RecordId,
    pub amount: Amount,
    #[serde(default)]
    pub method: FinanceMethod,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub finance_type: FinanceType,
}

impl Finance {
    pub fn from_new(id: RecordId, finance: NewFinance) -> Self {
        Self {
            id,
            amount: finance.amount,
            method: finance.method,
            date: finance.date,
            description: finance.description,
            finance_type: finance.finance_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFinance {
    pub amount: Amount,
    #[serde(default)]
    pub method: FinanceMethod,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub finance_type: FinanceType,
}

/// Body returned by a create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRecord {
    pub id: RecordId,
}

/// Result of decoding a raw list: the records that fit, and the ids of the
/// documents that did not (an empty string when a document has no id).
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub records: Vec<T>,
    pub skipped: Vec<String>,
}

pub fn decode_documents<T: DeserializeOwned>(documents: Vec<serde_json::Value>) -> Decoded<T> {
    let mut decoded = Decoded {
        records: Vec::with_capacity(documents.len()),
        skipped: Vec::new(),
    };
    for document in documents {
        let id = document
            .get("id")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();
        match serde_json::from_value(document) {
            Ok(record) => decoded.records.push(record),
            Err(err) => {
                tracing::warn!(%id, %err, "skipping undecodable record");
                decoded.skipped.push(id);
            }
        }
    }
    if !decoded.skipped.is_empty() {
        tracing::warn!(
            skipped = decoded.skipped.len(),
            ids = ?decoded.skipped,
            "records hidden from the list; they can still be deleted by id"
        );
    }
    decoded
}

/// Decodes raw documents one by one, dropping any that do not fit `T`.
pub fn decode_records<T: DeserializeOwned>(documents: Vec<serde_json::Value>) -> Vec<T> {
    decode_documents(documents).records
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn amount_rejects_empty_zero_and_garbage() {
        assert_eq!(Amount::parse(""), Err(AmountError::Empty));
        assert_eq!(Amount::parse("   "), Err(AmountError::Empty));
        assert_eq!(Amount::parse("0"), Err(AmountError::NotPositive));
        assert_eq!(Amount::parse("0.00"), Err(AmountError::NotPositive));
        assert_eq!(Amount::parse("-5"), Err(AmountError::NotPositive));
        assert_eq!(Amount::parse("12abc"), Err(AmountError::Malformed));
        assert_eq!(Amount::parse("inf"), Err(AmountError::Malformed));
        assert_eq!(Amount::parse(" 42.5 ").map(Amount::value), Ok(42.5));
    }

    #[test]
    fn amount_travels_as_string() {
        let amount = Amount::parse("100").unwrap();
        assert_eq!(serde_json::to_value(amount).unwrap(), json!("100"));

        let from_number: Amount = serde_json::from_value(json!(12.5)).unwrap();
        assert_eq!(from_number.value(), 12.5);
        assert!(serde_json::from_value::<Amount>(json!("abc")).is_err());
    }

    #[test]
    fn task_uses_camel_case_fields() {
        let task: Task = serde_json::from_value(json!({
            "id": "t1",
            "title": "Write report",
            "dueDate": "2025-02-24",
            "priority": "high",
            "completed": false
        }))
        .unwrap();
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2025, 2, 24).unwrap());
        assert!(task.description.is_none());

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["dueDate"], "2025-02-24");
        assert!(value.get("tags").is_none());
    }

    #[test]
    fn finance_reads_string_enums() {
        let finance: Finance = serde_json::from_value(json!({
            "id": "f1",
            "amount": "40",
            "method": "upi",
            "date": "2025-02-24T10:00:00Z",
            "financeType": "expense"
        }))
        .unwrap();
        assert_eq!(finance.method, FinanceMethod::Upi);
        assert_eq!(finance.finance_type, FinanceType::Expense);
        assert_eq!(finance.amount.to_string(), "40");
    }

    #[test]
    fn new_task_validation_trims_title() {
        let task = NewTask {
            title: "   ".into(),
            description: None,
            due_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            priority: Priority::Low,
            completed: false,
            reminder: None,
            tags: None,
        };
        assert_eq!(task.validate(), Err(ValidationError::MissingTitle));
    }

    #[test]
    fn decode_records_skips_bad_documents() {
        let docs = vec![
            json!({"id": "a", "amount": "10", "date": "2025-01-01T00:00:00Z", "financeType": "income"}),
            json!({"id": "b", "amount": "ten", "date": "2025-01-01T00:00:00Z", "financeType": "income"}),
            json!({"id": "c"}),
        ];
        let finances: Vec<Finance> = decode_records(docs);
        assert_eq!(finances.len(), 1);
        assert_eq!(finances[0].id.as_str(), "a");
    }

    #[test]
    fn skipped_documents_are_reported_by_id() {
        let docs = vec![
            json!({"id": "ok", "amount": "10", "date": "2025-01-01T00:00:00Z", "financeType": "income"}),
            json!({"id": "zero", "amount": "0", "date": "2025-01-01T00:00:00Z", "financeType": "expense"}),
            json!({"amount": "5"}),
        ];
        let decoded: Decoded<Finance> = decode_documents(docs);
        assert_eq!(decoded.records.len(), 1);
        assert_eq!(decoded.skipped, ["zero", ""]);
    }
}
