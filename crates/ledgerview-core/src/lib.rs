//! Transaction sources and the view coordinator
//!
//! The coordinator decides which of two mutually exclusive sources feeds the
//! view: the paginated feed of all transactions, or the complete transaction
//! set of one employee. Modules, leaves first:
//! - types: employees, transactions, pages, cursors and the view mode
//! - backend: fetch capability traits and the JSON fixture ledger
//! - directory: employee directory cache
//! - paginated: page-by-page source with accumulation
//! - by_employee: single-employee source
//! - coordinator: mode switching and view derivation

pub mod backend;
pub mod by_employee;
pub mod coordinator;
pub mod directory;
pub mod error;
pub mod paginated;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{
    EmployeeFetcher, EmployeeFetcherRef, FixtureLedger, LedgerData, TransactionFetcher,
    TransactionFetcherRef,
};
pub use by_employee::TransactionsByEmployee;
pub use coordinator::{ViewCoordinator, ViewState};
pub use directory::EmployeeDirectory;
pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use paginated::PaginatedTransactions;
pub use types::{
    Cursor, CursorState, Employee, FetchOutcome, Mode, Page, Transaction, ALL_EMPLOYEES_LABEL,
};
