//! Employee directory cache

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::backend::EmployeeFetcherRef;
use crate::error::CoreResult;
use crate::types::Employee;

#[derive(Debug, Default)]
struct DirectoryState {
    employees: Option<Vec<Employee>>,
    in_flight: usize,
}

/// Releases one outstanding fetch when dropped
struct InFlight<'a> {
    state: &'a Mutex<DirectoryState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

/// Holds the employee list once it has been fetched
pub struct EmployeeDirectory {
    fetcher: EmployeeFetcherRef,
    state: Mutex<DirectoryState>,
}

impl EmployeeDirectory {
    pub fn new(fetcher: EmployeeFetcherRef) -> Self {
        Self {
            fetcher,
            state: Mutex::new(DirectoryState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DirectoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the full list and cache it. A failure keeps the previous cache.
    pub async fn fetch_all(&self) -> CoreResult<Vec<Employee>> {
        self.lock().in_flight += 1;
        let slot = InFlight { state: &self.state };
        let result = self.fetcher.fetch_employees().await;

        if let Ok(employees) = &result {
            log::debug!("Employee directory loaded: {} employees", employees.len());
            self.lock().employees = Some(employees.clone());
        }
        drop(slot);
        result
    }

    /// Last successful result
    pub fn employees(&self) -> Option<Vec<Employee>> {
        self.lock().employees.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().employees.is_some()
    }

    pub fn loading(&self) -> bool {
        self.lock().in_flight > 0
    }

    /// Dropdown items: empty until loaded, then the "all" sentinel followed by every employee
    pub fn options(&self) -> Vec<Employee> {
        match self.lock().employees.as_ref() {
            None => Vec::new(),
            Some(employees) => std::iter::once(Employee::all())
                .chain(employees.iter().cloned())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fetch_all_caches() {
        let backend = Arc::new(
            ScriptedBackend::new().with_employees(vec![Employee::new("1", "A", "X")]),
        );
        let directory = EmployeeDirectory::new(backend.clone());

        assert!(!directory.is_loaded());
        assert!(directory.options().is_empty());

        let employees = directory.fetch_all().await.unwrap();
        assert_eq!(employees.len(), 1);
        assert!(directory.is_loaded());
        assert!(!directory.loading());

        let options = directory.options();
        assert_eq!(options.len(), 2);
        assert!(options[0].is_all());
        assert_eq!(options[1].label(), "A X");
    }

    #[tokio::test]
    async fn test_failure_keeps_cache() {
        let backend = Arc::new(
            ScriptedBackend::new().with_employees(vec![Employee::new("1", "A", "X")]),
        );
        let directory = EmployeeDirectory::new(backend.clone());
        directory.fetch_all().await.unwrap();

        backend.fail("employees");
        assert!(directory.fetch_all().await.is_err());
        assert_eq!(directory.employees().unwrap().len(), 1);
        assert!(!directory.loading());
    }

    #[tokio::test]
    async fn test_loading_while_in_flight() {
        let backend = Arc::new(ScriptedBackend::new());
        let gate = backend.gate("employees");
        let directory = Arc::new(EmployeeDirectory::new(backend.clone()));

        let task = tokio::spawn({
            let directory = directory.clone();
            async move { directory.fetch_all().await }
        });

        gate.wait_entered().await;
        assert!(directory.loading());
        assert!(!directory.is_loaded());

        gate.release();
        task.await.unwrap().unwrap();
        assert!(!directory.loading());
        assert!(directory.is_loaded());
    }

    #[tokio::test]
    async fn test_cancelled_fetch_releases_loading() {
        let backend = Arc::new(
            ScriptedBackend::new().with_employees(vec![Employee::new("1", "A", "X")]),
        );
        let gate = backend.gate("employees");
        let directory = Arc::new(EmployeeDirectory::new(backend.clone()));

        let task = tokio::spawn({
            let directory = directory.clone();
            async move { directory.fetch_all().await }
        });
        gate.wait_entered().await;
        assert!(directory.loading());

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());
        assert!(!directory.loading());
        assert!(!directory.is_loaded());

        gate.release();
        directory.fetch_all().await.unwrap();
        assert!(!directory.loading());
        assert_eq!(directory.options().len(), 2);
    }
}
