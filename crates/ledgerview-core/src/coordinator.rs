//! View coordinator
//!
//! Owns the employee directory and both transaction sources, and keeps a
//! tagged [`Mode`] naming which source the view is read from. Switching mode,
//! invalidating the source that is being left, and capturing the epoch the
//! follow-up fetch runs in all happen under the mode lock. Lock order is
//! always mode first, then a source.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::backend::{EmployeeFetcher, EmployeeFetcherRef, TransactionFetcher, TransactionFetcherRef};
use crate::by_employee::TransactionsByEmployee;
use crate::directory::EmployeeDirectory;
use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::paginated::{InFlight, PaginatedTransactions};
use crate::types::{Employee, FetchOutcome, Mode, Transaction};

/// Everything the presentation layer needs to render one frame
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub mode: Mode,
    /// `None` means nothing has loaded for the current mode yet
    pub view: Option<Vec<Transaction>>,
    pub loading: bool,
    pub can_load_more: bool,
    /// Whether the "View More" control is shown at all
    pub show_load_more: bool,
    pub employees_loading: bool,
    /// Dropdown items, starting with the "all" sentinel once loaded
    pub employees: Vec<Employee>,
}

pub struct ViewCoordinator {
    employees: EmployeeDirectory,
    paginated: PaginatedTransactions,
    by_employee: TransactionsByEmployee,
    mode: Mutex<Mode>,
    bootstrapped: AtomicBool,
    logger: Arc<dyn ErrorLogger>,
}

impl ViewCoordinator {
    pub fn new(employees: EmployeeFetcherRef, transactions: TransactionFetcherRef) -> Self {
        Self {
            employees: EmployeeDirectory::new(employees),
            paginated: PaginatedTransactions::new(transactions.clone()),
            by_employee: TransactionsByEmployee::new(transactions),
            mode: Mutex::new(Mode::Empty),
            bootstrapped: AtomicBool::new(false),
            logger: Arc::new(DefaultErrorLogger),
        }
    }

    /// Build over a single backend serving both employees and transactions
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: EmployeeFetcher + TransactionFetcher + 'static,
    {
        Self::new(backend.clone(), backend)
    }

    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = logger;
        self
    }

    fn lock_mode(&self) -> MutexGuard<'_, Mode> {
        self.mode.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report(&self, error: CoreError, context: ErrorContext) -> CoreError {
        self.logger.log_error(&error, &context);
        error
    }

    // ==================== Actions ====================

    /// Enter paginated mode and fetch the next page
    pub async fn select_all(&self) -> CoreResult<FetchOutcome> {
        let (epoch, slot) = {
            let mut mode = self.lock_mode();
            self.by_employee.invalidate();
            *mode = Mode::Paginated;
            (self.paginated.epoch(), self.paginated.reserve())
        };
        log::info!("Showing all transactions");

        self.load_page(epoch, slot)
            .await
            .map_err(|e| self.report(e, ErrorContext::new("select_all")))
    }

    /// Enter filtered mode for one employee
    pub async fn select_employee(&self, employee_id: &str) -> CoreResult<FetchOutcome> {
        let context = || {
            ErrorContext::new("select_employee")
                .with_data("employee_id", serde_json::json!(employee_id))
        };

        TransactionsByEmployee::validate_id(employee_id).map_err(|e| self.report(e, context()))?;

        let epoch = {
            let mut mode = self.lock_mode();
            self.paginated.invalidate();
            *mode = Mode::Filtered { employee_id: employee_id.to_string() };
            self.by_employee.begin()
        };
        log::info!("Showing transactions of employee {}", employee_id);

        self.by_employee
            .fetch_by_id_in_epoch(employee_id, epoch)
            .await
            .map_err(|e| self.report(e, context()))
    }

    /// Route a dropdown change. `None` is ignored.
    pub async fn select(&self, item: Option<&Employee>) -> CoreResult<FetchOutcome> {
        match item {
            None => Ok(FetchOutcome::Skipped),
            Some(employee) if employee.is_all() => self.select_all().await,
            Some(employee) => self.select_employee(&employee.id).await,
        }
    }

    /// Append the next page without invalidating anything.
    /// Skipped unless [`ViewCoordinator::can_load_more`] holds.
    pub async fn load_more(&self) -> CoreResult<FetchOutcome> {
        let (epoch, slot) = {
            let mode = self.lock_mode();
            if !self.can_load_more_in(&mode) {
                log::debug!("Load more ignored in mode {}", *mode);
                return Ok(FetchOutcome::Skipped);
            }
            (self.paginated.epoch(), self.paginated.reserve())
        };

        self.load_page(epoch, slot)
            .await
            .map_err(|e| self.report(e, ErrorContext::new("load_more")))
    }

    /// First-render hook: shows all transactions once, if employees were never requested
    pub async fn bootstrap(&self) -> CoreResult<FetchOutcome> {
        if self.employees.is_loaded() || self.employees.loading() {
            return Ok(FetchOutcome::Skipped);
        }
        if self.bootstrapped.swap(true, Ordering::SeqCst) {
            return Ok(FetchOutcome::Skipped);
        }
        log::info!("Bootstrapping the default view");
        self.select_all().await
    }

    async fn load_page(&self, epoch: u64, slot: InFlight<'_>) -> CoreResult<FetchOutcome> {
        if !self.employees.is_loaded() {
            self.employees.fetch_all().await?;
        }
        self.paginated.fetch_reserved(epoch, slot).await
    }

    // ==================== Derived state ====================

    pub fn mode(&self) -> Mode {
        self.lock_mode().clone()
    }

    /// Transactions to render, read from the source the mode names
    pub fn current_view(&self) -> Option<Vec<Transaction>> {
        let mode = self.lock_mode();
        self.view_in(&mode)
    }

    fn view_in(&self, mode: &Mode) -> Option<Vec<Transaction>> {
        match mode {
            Mode::Empty => None,
            Mode::Paginated => self.paginated.transactions(),
            Mode::Filtered { employee_id } => self.by_employee.transactions_for(employee_id),
        }
    }

    /// True while the directory or the active source has a fetch outstanding
    pub fn loading(&self) -> bool {
        let mode = self.lock_mode();
        self.loading_in(&mode)
    }

    fn loading_in(&self, mode: &Mode) -> bool {
        self.employees.loading()
            || match mode {
                Mode::Empty => false,
                Mode::Paginated => self.paginated.loading(),
                Mode::Filtered { .. } => self.by_employee.loading(),
            }
    }

    pub fn can_load_more(&self) -> bool {
        let mode = self.lock_mode();
        self.can_load_more_in(&mode)
    }

    fn can_load_more_in(&self, mode: &Mode) -> bool {
        *mode == Mode::Paginated && self.paginated.next_page().is_some() && !self.paginated.loading()
    }

    /// Consistent snapshot for the presentation layer
    pub fn snapshot(&self) -> ViewState {
        let mode = self.lock_mode();
        let view = self.view_in(&mode);
        let show_load_more =
            view.is_some() && *mode == Mode::Paginated && !self.paginated.is_exhausted();

        ViewState {
            view,
            loading: self.loading_in(&mode),
            can_load_more: self.can_load_more_in(&mode),
            show_load_more,
            employees_loading: self.employees.loading(),
            employees: self.employees.options(),
            mode: mode.clone(),
        }
    }

    pub fn employees(&self) -> &EmployeeDirectory {
        &self.employees
    }

    pub fn paginated(&self) -> &PaginatedTransactions {
        &self.paginated
    }

    pub fn by_employee(&self) -> &TransactionsByEmployee {
        &self.by_employee
    }
}

// ==================== Tests ====================
