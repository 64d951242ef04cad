//! Data model shared by the sources and the coordinator

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Label shown for the "no filter" dropdown entry
pub const ALL_EMPLOYEES_LABEL: &str = "All Employees";

/// Employee as returned by the directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl Employee {
    pub fn new(id: &str, first_name: &str, last_name: &str) -> Self {
        Self {
            id: id.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        }
    }

    /// The sentinel entry meaning "show all transactions"
    pub fn all() -> Self {
        Self::default()
    }

    /// Check if this is the "no filter" sentinel
    pub fn is_all(&self) -> bool {
        self.id.is_empty()
    }

    /// Dropdown label
    pub fn label(&self) -> String {
        if self.is_all() {
            ALL_EMPLOYEES_LABEL.to_string()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }
}

/// Transaction record, passed through untouched by the coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: String,
    /// Signed amount
    pub amount: Decimal,
    /// Employee who made the purchase
    pub employee: Employee,
    /// Merchant name
    pub merchant: String,
    /// Transaction date
    pub date: NaiveDate,
    /// Approval status
    #[serde(default)]
    pub approved: bool,
}

/// Opaque pagination cursor handed back by the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Cursor(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One batch of the paginated feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub data: Vec<Transaction>,
    /// `None` marks the last page
    pub next_page: Option<Cursor>,
}

impl Page {
    pub fn is_last(&self) -> bool {
        self.next_page.is_none()
    }
}

/// Where the paginated source will read from next
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "cursor", rename_all = "lowercase")]
pub enum CursorState {
    /// Nothing fetched since the last invalidation
    Start,
    /// More pages are available
    Next(Cursor),
    /// The last page has been received
    Exhausted,
}

impl Default for CursorState {
    fn default() -> Self {
        CursorState::Start
    }
}

/// What happened to a fetch once it resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchOutcome {
    /// The result was stored
    Applied,
    /// The source was invalidated while the fetch was in flight
    Discarded,
    /// Nothing was requested
    Skipped,
}

impl std::fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchOutcome::Applied => write!(f, "applied"),
            FetchOutcome::Discarded => write!(f, "discarded"),
            FetchOutcome::Skipped => write!(f, "skipped"),
        }
    }
}

/// Which view is authoritative
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Mode {
    /// Nothing selected yet
    Empty,
    /// All transactions, page by page
    Paginated,
    /// One employee's transactions
    Filtered {
        #[serde(rename = "employeeId")]
        employee_id: String,
    },
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Empty
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Empty => write!(f, "empty"),
            Mode::Paginated => write!(f, "paginated"),
            Mode::Filtered { employee_id } => write!(f, "filtered({})", employee_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_labels() {
        assert_eq!(Employee::new("1", "James", "Smith").label(), "James Smith");
        assert_eq!(Employee::all().label(), ALL_EMPLOYEES_LABEL);
        assert!(Employee::all().is_all());
        assert!(!Employee::new("1", "A", "X").is_all());
    }

    #[test]
    fn test_transaction_deserialize() {
        let tx: Transaction = serde_json::from_str(
            r#"{
                "id": "t1",
                "amount": "-42.10",
                "employee": { "id": "1", "firstName": "A", "lastName": "X" },
                "merchant": "Coffee Shop",
                "date": "2024-03-14"
            }"#,
        )
        .unwrap();

        assert_eq!(tx.employee.id, "1");
        assert_eq!(tx.amount.to_string(), "-42.10");
        assert!(!tx.approved);
    }

    #[test]
    fn test_page_serialization() {
        let page = Page { data: vec![], next_page: Some(Cursor::new("c2")) };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["nextPage"], "c2");
        assert!(!page.is_last());

        let last = Page { data: vec![], next_page: None };
        assert!(serde_json::to_value(&last).unwrap()["nextPage"].is_null());
        assert!(last.is_last());
    }

    #[test]
    fn test_mode_serialization() {
        let json = serde_json::to_value(Mode::Filtered { employee_id: "7".to_string() }).unwrap();
        assert_eq!(json["kind"], "filtered");
        assert_eq!(json["employeeId"], "7");
        assert_eq!(serde_json::to_value(Mode::Paginated).unwrap()["kind"], "paginated");
    }
}
