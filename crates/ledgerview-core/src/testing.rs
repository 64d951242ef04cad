//! Scripted backend for exercising the sources without a real data set

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use crate::backend::{EmployeeFetcher, TransactionFetcher};
use crate::error::{CoreError, CoreResult};
use crate::types::{Cursor, Employee, Page, Transaction};

pub(crate) fn transaction(id: &str, employee_id: &str) -> Transaction {
    Transaction {
        id: id.to_string(),
        amount: Decimal::new(1250, 2),
        employee: Employee::new(employee_id, "First", "Last"),
        merchant: "Merchant".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        approved: false,
    }
}

pub(crate) fn ids(transactions: &[Transaction]) -> Vec<String> {
    transactions.iter().map(|t| t.id.clone()).collect()
}

/// Holds a fetch until the test lets it resolve
pub(crate) struct Gate {
    entered: Semaphore,
    release: Semaphore,
}

impl Default for Gate {
    fn default() -> Self {
        Self {
            entered: Semaphore::new(0),
            release: Semaphore::new(0),
        }
    }
}

impl Gate {
    /// Wait until a fetch is parked on this gate
    pub(crate) async fn wait_entered(&self) {
        self.entered.acquire().await.unwrap().forget();
    }

    /// Let one parked fetch resolve
    pub(crate) fn release(&self) {
        self.release.add_permits(1);
    }
}

/// Keys: `employees`, `page:start`, `page:<cursor>`, `employee:<id>`
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    employees: Vec<Employee>,
    pages: HashMap<String, Page>,
    by_employee: HashMap<String, Vec<Transaction>>,
    gates: Mutex<HashMap<String, Arc<Gate>>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_employees(mut self, employees: Vec<Employee>) -> Self {
        self.employees = employees;
        self
    }

    pub(crate) fn with_page(mut self, cursor: Option<&str>, data: Vec<Transaction>, next: Option<&str>) -> Self {
        self.pages.insert(
            page_key(cursor),
            Page { data, next_page: next.map(Cursor::new) },
        );
        self
    }

    pub(crate) fn with_employee_transactions(mut self, employee_id: &str, data: Vec<Transaction>) -> Self {
        self.by_employee.insert(employee_id.to_string(), data);
        self
    }

    pub(crate) fn gate(&self, key: &str) -> Arc<Gate> {
        self.gates
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    pub(crate) fn fail(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    pub(crate) fn recover(&self, key: &str) {
        self.failing.lock().unwrap().remove(key);
    }

    pub(crate) fn calls(&self, key: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|k| k.as_str() == key).count()
    }

    async fn enter(&self, key: &str) -> CoreResult<()> {
        self.calls.lock().unwrap().push(key.to_string());

        let gate = self.gates.lock().unwrap().get(key).cloned();
        if let Some(gate) = gate {
            gate.entered.add_permits(1);
            gate.release.acquire().await.unwrap().forget();
        }

        if self.failing.lock().unwrap().contains(key) {
            return Err(CoreError::fetch_failure(key, "scripted failure"));
        }
        Ok(())
    }
}

fn page_key(cursor: Option<&str>) -> String {
    format!("page:{}", cursor.unwrap_or("start"))
}

#[async_trait]
impl EmployeeFetcher for ScriptedBackend {
    async fn fetch_employees(&self) -> CoreResult<Vec<Employee>> {
        self.enter("employees").await?;
        Ok(self.employees.clone())
    }
}

#[async_trait]
impl TransactionFetcher for ScriptedBackend {
    async fn fetch_page(&self, cursor: Option<&Cursor>) -> CoreResult<Page> {
        let key = page_key(cursor.map(|c| c.as_str()));
        self.enter(&key).await?;
        self.pages
            .get(&key)
            .cloned()
            .ok_or_else(|| CoreError::fetch_failure(key, "no such page"))
    }

    async fn fetch_by_employee(&self, employee_id: &str) -> CoreResult<Vec<Transaction>> {
        self.enter(&format!("employee:{}", employee_id)).await?;
        Ok(self.by_employee.get(employee_id).cloned().unwrap_or_default())
    }
}

/// Employees `[1 A X]`, pages `[t1,t2] -> c2 -> [t3]`, employee 1 owns `[t5]`
pub(crate) fn scenario_backend() -> ScriptedBackend {
    ScriptedBackend::new()
        .with_employees(vec![Employee::new("1", "A", "X")])
        .with_page(None, vec![transaction("t1", "1"), transaction("t2", "1")], Some("c2"))
        .with_page(Some("c2"), vec![transaction("t3", "1")], None)
        .with_employee_transactions("1", vec![transaction("t5", "1")])
}
