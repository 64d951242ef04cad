//! Fetch capabilities and the fixture-backed ledger
//!
//! The sources never talk to a transport directly. They hold an
//! [`EmployeeFetcher`] or a [`TransactionFetcher`] and treat every call as
//! an opaque async request that either resolves or fails.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};
use crate::types::{Cursor, Employee, Page, Transaction};

/// Employee directory collaborator
#[async_trait]
pub trait EmployeeFetcher: Send + Sync {
    /// Fetch every employee
    async fn fetch_employees(&self) -> CoreResult<Vec<Employee>>;
}

/// Transaction collaborator
#[async_trait]
pub trait TransactionFetcher: Send + Sync {
    /// Fetch one page; `None` requests the first page
    async fn fetch_page(&self, cursor: Option<&Cursor>) -> CoreResult<Page>;

    /// Fetch every transaction belonging to one employee
    async fn fetch_by_employee(&self, employee_id: &str) -> CoreResult<Vec<Transaction>>;
}

pub type EmployeeFetcherRef = Arc<dyn EmployeeFetcher>;
pub type TransactionFetcherRef = Arc<dyn TransactionFetcher>;

/// On-disk layout of a ledger fixture
#[derive(Debug, Default, Deserialize)]
pub struct LedgerData {
    pub employees: Vec<Employee>,
    pub transactions: Vec<Transaction>,
}

/// In-memory ledger serving pages of a fixed size
#[derive(Debug)]
pub struct FixtureLedger {
    data: LedgerData,
    page_size: usize,
    latency: Duration,
}

impl FixtureLedger {
    /// Create a ledger over the given data
    pub fn new(data: LedgerData, page_size: usize) -> Self {
        Self {
            data,
            page_size: page_size.max(1),
            latency: Duration::ZERO,
        }
    }

    /// Delay every fetch by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Load a JSON fixture from disk
    pub async fn load(path: PathBuf, page_size: usize) -> CoreResult<Self> {
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            },
            _ => CoreError::IoError,
        })?;

        let data: LedgerData = serde_json::from_str(&content)?;
        log::info!(
            "Loaded ledger fixture {}: {} employees, {} transactions",
            path.display(),
            data.employees.len(),
            data.transactions.len()
        );

        Ok(Self::new(data, page_size))
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn page_number(cursor: Option<&Cursor>) -> CoreResult<usize> {
        match cursor {
            None => Ok(0),
            Some(cursor) => cursor.as_str().parse().map_err(|_| {
                CoreError::fetch_failure("transactions", format!("unknown cursor '{}'", cursor))
            }),
        }
    }
}

#[async_trait]
impl EmployeeFetcher for FixtureLedger {
    async fn fetch_employees(&self) -> CoreResult<Vec<Employee>> {
        self.simulate_latency().await;
        Ok(self.data.employees.clone())
    }
}

#[async_trait]
impl TransactionFetcher for FixtureLedger {
    async fn fetch_page(&self, cursor: Option<&Cursor>) -> CoreResult<Page> {
        self.simulate_latency().await;

        let page = Self::page_number(cursor)?;
        let start = page.saturating_mul(self.page_size);
        let end = start.saturating_add(self.page_size);
        let total = self.data.transactions.len();

        if start > total {
            return Err(CoreError::fetch_failure(
                "transactions",
                format!("page {} is out of range", page),
            ));
        }

        let data = self.data.transactions[start..end.min(total)].to_vec();
        let next_page = if end < total {
            Some(Cursor::new((page + 1).to_string()))
        } else {
            None
        };

        log::debug!("Serving page {} ({} transactions, next={:?})", page, data.len(), next_page);
        Ok(Page { data, next_page })
    }

    async fn fetch_by_employee(&self, employee_id: &str) -> CoreResult<Vec<Transaction>> {
        self.simulate_latency().await;

        if employee_id.is_empty() {
            return Err(CoreError::invalid_selection("Employee id cannot be empty"));
        }

        Ok(self
            .data
            .transactions
            .iter()
            .filter(|t| t.employee.id == employee_id)
            .cloned()
            .collect())
    }
}
