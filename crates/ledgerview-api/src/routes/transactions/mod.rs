//! Transaction routes - presentation boundary of the view coordinator
//!
//! Structure:
//! - api.rs: JSON API endpoints
//! - page.rs: HTMX page and fragments

pub mod api;
pub mod page;

pub use api::{
    api_view,
    api_employees,
    api_select_all,
    api_select_employee,
    api_load_more,
};

pub use page::{
    page_transactions,
    htmx_select,
    htmx_load_more,
};
