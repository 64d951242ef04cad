//! Paginated transaction source
//!
//! Pages are appended to a running accumulation in the order they are
//! fetched. Fetches are serialized: the cursor is only read once the previous
//! fetch has resolved, so a page can never be requested twice or skipped.
//!
//! Every [`PaginatedTransactions::invalidate`] bumps the source epoch. A fetch
//! remembers the epoch it started in and drops its result if the epoch moved
//! while it was in flight.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::backend::TransactionFetcherRef;
use crate::error::CoreResult;
use crate::types::{Cursor, CursorState, FetchOutcome, Transaction};

#[derive(Debug, Default)]
struct PaginatedState {
    /// `None` until the first page since the last invalidation arrives
    accumulated: Option<Vec<Transaction>>,
    cursor: CursorState,
    epoch: u64,
    /// Reserved or running fetches, released by [`InFlight`] on drop
    in_flight: usize,
}

/// A reserved fetch slot. Dropping it, including when the owning future is
/// cancelled mid-fetch, releases the slot.
#[must_use]
pub struct InFlight<'a> {
    state: &'a Mutex<PaginatedState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

pub struct PaginatedTransactions {
    fetcher: TransactionFetcherRef,
    state: Mutex<PaginatedState>,
    turn: tokio::sync::Mutex<()>,
}

impl PaginatedTransactions {
    pub fn new(fetcher: TransactionFetcherRef) -> Self {
        Self {
            fetcher,
            state: Mutex::new(PaginatedState::default()),
            turn: tokio::sync::Mutex::new(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PaginatedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the next page in the current epoch
    pub async fn fetch_all(&self) -> CoreResult<FetchOutcome> {
        let epoch = self.epoch();
        self.fetch_all_in_epoch(epoch).await
    }

    /// Fetch the next page on behalf of a caller that observed `epoch`.
    ///
    /// Returns [`FetchOutcome::Discarded`] without fetching when the source
    /// has already moved past `epoch` by the time this caller gets its turn.
    pub async fn fetch_all_in_epoch(&self, epoch: u64) -> CoreResult<FetchOutcome> {
        let slot = self.reserve();
        self.fetch_reserved(epoch, slot).await
    }

    /// Mark a fetch as outstanding before it is issued
    pub fn reserve(&self) -> InFlight<'_> {
        self.lock().in_flight += 1;
        InFlight { state: &self.state }
    }

    /// [`PaginatedTransactions::fetch_all_in_epoch`] with a slot taken earlier
    /// through [`PaginatedTransactions::reserve`]
    pub async fn fetch_reserved(&self, epoch: u64, slot: InFlight<'_>) -> CoreResult<FetchOutcome> {
        let _slot = slot;
        let _turn = self.turn.lock().await;

        let cursor = {
            let mut state = self.lock();
            if state.epoch != epoch {
                log::debug!("Paginated fetch for epoch {} superseded by {}", epoch, state.epoch);
                return Ok(FetchOutcome::Discarded);
            }
            match &state.cursor {
                CursorState::Start => None,
                CursorState::Next(cursor) => Some(cursor.clone()),
                CursorState::Exhausted => return Ok(FetchOutcome::Skipped),
            }
        };

        log::debug!("Fetching page {:?} (epoch {})", cursor, epoch);
        let result = self.fetcher.fetch_page(cursor.as_ref()).await;

        let mut state = self.lock();
        if state.epoch != epoch {
            log::debug!("Discarding page {:?}: source invalidated during fetch", cursor);
            return Ok(FetchOutcome::Discarded);
        }

        let page = result?;
        log::debug!("Appending {} transactions, next page {:?}", page.data.len(), page.next_page);
        state
            .accumulated
            .get_or_insert_with(Vec::new)
            .extend(page.data);
        state.cursor = match page.next_page {
            Some(next) => CursorState::Next(next),
            None => CursorState::Exhausted,
        };

        Ok(FetchOutcome::Applied)
    }

    /// Drop the accumulation and rewind to the first page
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.accumulated = None;
        state.cursor = CursorState::Start;
        state.epoch += 1;
        log::debug!("Paginated source invalidated (epoch {})", state.epoch);
    }

    /// Every page received since the last invalidation, or `None` before the first
    pub fn transactions(&self) -> Option<Vec<Transaction>> {
        self.lock().accumulated.clone()
    }

    pub fn cursor_state(&self) -> CursorState {
        self.lock().cursor.clone()
    }

    /// Cursor of the next page; `None` before the first fetch and once exhausted
    pub fn next_page(&self) -> Option<Cursor> {
        match &self.lock().cursor {
            CursorState::Next(cursor) => Some(cursor.clone()),
            _ => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.lock().cursor == CursorState::Exhausted
    }

    pub fn loading(&self) -> bool {
        self.lock().in_flight > 0
    }

    pub fn epoch(&self) -> u64 {
        self.lock().epoch
    }
}
