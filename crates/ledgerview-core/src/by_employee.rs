//! Employee-filtered transaction source
//!
//! Holds the complete transaction set of a single employee. Every request
//! replaces what was there before; requests share one epoch counter with
//! [`TransactionsByEmployee::invalidate`], so only the most recent request
//! can ever land.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::backend::TransactionFetcherRef;
use crate::error::{CoreError, CoreResult};
use crate::types::{FetchOutcome, Transaction};

#[derive(Debug, Default)]
struct FilteredState {
    result: Option<(String, Vec<Transaction>)>,
    epoch: u64,
    in_flight: usize,
}

/// Releases one outstanding fetch when dropped
struct InFlight<'a> {
    state: &'a Mutex<FilteredState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

pub struct TransactionsByEmployee {
    fetcher: TransactionFetcherRef,
    state: Mutex<FilteredState>,
}

impl TransactionsByEmployee {
    pub fn new(fetcher: TransactionFetcherRef) -> Self {
        Self {
            fetcher,
            state: Mutex::new(FilteredState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FilteredState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reject the "all employees" sentinel and blank ids
    pub fn validate_id(employee_id: &str) -> CoreResult<()> {
        if employee_id.trim().is_empty() {
            return Err(CoreError::invalid_selection("Employee id cannot be empty"));
        }
        Ok(())
    }

    /// Fetch one employee's transactions, superseding any request still in flight
    pub async fn fetch_by_id(&self, employee_id: &str) -> CoreResult<FetchOutcome> {
        Self::validate_id(employee_id)?;
        let epoch = self.begin();
        self.fetch_by_id_in_epoch(employee_id, epoch).await
    }

    /// Open a new epoch for an upcoming request without clearing the held result
    pub fn begin(&self) -> u64 {
        let mut state = self.lock();
        state.epoch += 1;
        state.epoch
    }

    /// Fetch on behalf of a caller that opened or observed `epoch`
    pub async fn fetch_by_id_in_epoch(&self, employee_id: &str, epoch: u64) -> CoreResult<FetchOutcome> {
        Self::validate_id(employee_id)?;

        {
            let mut state = self.lock();
            if state.epoch != epoch {
                return Ok(FetchOutcome::Discarded);
            }
            state.in_flight += 1;
        }
        let _slot = InFlight { state: &self.state };

        log::debug!("Fetching transactions for employee {} (epoch {})", employee_id, epoch);
        let result = self.fetcher.fetch_by_employee(employee_id).await;

        let mut state = self.lock();
        if state.epoch != epoch {
            log::debug!("Discarding transactions for employee {}: superseded", employee_id);
            return Ok(FetchOutcome::Discarded);
        }

        let transactions = result?;
        log::debug!("Employee {} has {} transactions", employee_id, transactions.len());
        state.result = Some((employee_id.to_string(), transactions));
        Ok(FetchOutcome::Applied)
    }

    /// Clear to "no data"
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.result = None;
        state.epoch += 1;
        log::debug!("Employee source invalidated (epoch {})", state.epoch);
    }

    /// Current result, whichever employee it belongs to
    pub fn transactions(&self) -> Option<Vec<Transaction>> {
        self.lock().result.as_ref().map(|(_, transactions)| transactions.clone())
    }

    /// Current result only if it belongs to `employee_id`
    pub fn transactions_for(&self, employee_id: &str) -> Option<Vec<Transaction>> {
        match self.lock().result.as_ref() {
            Some((id, transactions)) if id == employee_id => Some(transactions.clone()),
            _ => None,
        }
    }

    pub fn employee_id(&self) -> Option<String> {
        self.lock().result.as_ref().map(|(id, _)| id.clone())
    }

    pub fn loading(&self) -> bool {
        self.lock().in_flight > 0
    }

    pub fn epoch(&self) -> u64 {
        self.lock().epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{ids, transaction, ScriptedBackend};
    use std::sync::Arc;

    fn backend() -> ScriptedBackend {
        ScriptedBackend::new()
            .with_employee_transactions("1", vec![transaction("t1", "1"), transaction("t3", "1")])
            .with_employee_transactions("2", vec![transaction("t2", "2")])
    }

    #[tokio::test]
    async fn test_fetch_replaces_result() {
        let source = TransactionsByEmployee::new(Arc::new(backend()));

        assert_eq!(source.fetch_by_id("1").await.unwrap(), FetchOutcome::Applied);
        assert_eq!(ids(&source.transactions().unwrap()), vec!["t1", "t3"]);
        assert_eq!(source.employee_id(), Some("1".to_string()));

        source.fetch_by_id("2").await.unwrap();
        assert_eq!(ids(&source.transactions().unwrap()), vec!["t2"]);
        assert_eq!(source.transactions_for("1"), None);
        assert!(source.transactions_for("2").is_some());
    }

    #[tokio::test]
    async fn test_empty_id_rejected_before_fetch() {
        let backend = Arc::new(backend());
        let source = TransactionsByEmployee::new(backend.clone());

        let err = source.fetch_by_id("").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidSelection);
        let err = source.fetch_by_id("   ").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidSelection);
        assert_eq!(backend.calls("employee:"), 0);
    }

    #[tokio::test]
    async fn test_invalidate_clears() {
        let source = TransactionsByEmployee::new(Arc::new(backend()));
        source.fetch_by_id("1").await.unwrap();
        source.invalidate();
        assert_eq!(source.transactions(), None);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_result() {
        let backend = Arc::new(backend());
        let source = TransactionsByEmployee::new(backend.clone());
        source.fetch_by_id("1").await.unwrap();

        backend.fail("employee:2");
        assert!(source.fetch_by_id("2").await.is_err());
        assert_eq!(source.employee_id(), Some("1".to_string()));
        assert!(!source.loading());
    }

    #[tokio::test]
    async fn test_late_result_of_older_request_is_discarded() {
        let backend = Arc::new(backend());
        let gate = backend.gate("employee:1");
        let source = Arc::new(TransactionsByEmployee::new(backend.clone()));

        let slow = tokio::spawn({
            let source = source.clone();
            async move { source.fetch_by_id("1").await }
        });
        gate.wait_entered().await;
        assert!(source.loading());

        source.fetch_by_id("2").await.unwrap();
        gate.release();

        assert_eq!(slow.await.unwrap().unwrap(), FetchOutcome::Discarded);
        assert_eq!(source.employee_id(), Some("2".to_string()));
        assert!(!source.loading());
    }

    #[tokio::test]
    async fn test_invalidate_during_flight_discards() {
        let backend = Arc::new(backend());
        let gate = backend.gate("employee:1");
        let source = Arc::new(TransactionsByEmployee::new(backend.clone()));

        let task = tokio::spawn({
            let source = source.clone();
            async move { source.fetch_by_id("1").await }
        });
        gate.wait_entered().await;
        source.invalidate();
        gate.release();

        assert_eq!(task.await.unwrap().unwrap(), FetchOutcome::Discarded);
        assert_eq!(source.transactions(), None);
    }

    #[tokio::test]
    async fn test_cancelled_fetch_releases_loading() {
        let backend = Arc::new(backend());
        let gate = backend.gate("employee:1");
        let source = Arc::new(TransactionsByEmployee::new(backend.clone()));

        let task = tokio::spawn({
            let source = source.clone();
            async move { source.fetch_by_id("1").await }
        });
        gate.wait_entered().await;
        assert!(source.loading());

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());
        assert!(!source.loading());
        assert_eq!(source.transactions(), None);

        gate.release();
        assert_eq!(source.fetch_by_id("1").await.unwrap(), FetchOutcome::Applied);
        assert!(!source.loading());
    }
}
