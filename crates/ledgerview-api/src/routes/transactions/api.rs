//! Transactions API endpoints - JSON presentation state
//!
//! Every action responds with the coordinator snapshot taken after the
//! action resolved, so a client never has to issue a second request to
//! learn what to render.

use axum::extract::{Path, State};
use axum::Json;
use ledgerview_core::{Employee, ViewState};

use crate::{ApiError, AppState};

/// Current presentation state; triggers the default view on first use
pub async fn api_view(state: State<AppState>) -> Result<Json<ViewState>, ApiError> {
    state.coordinator.bootstrap().await?;
    Ok(Json(state.coordinator.snapshot()))
}

/// Dropdown items
pub async fn api_employees(state: State<AppState>) -> Json<Vec<Employee>> {
    Json(state.coordinator.employees().options())
}

/// Show all transactions, page by page
pub async fn api_select_all(state: State<AppState>) -> Result<Json<ViewState>, ApiError> {
    state.coordinator.select_all().await?;
    Ok(Json(state.coordinator.snapshot()))
}

/// Show one employee's transactions
pub async fn api_select_employee(
    state: State<AppState>,
    Path(employee_id): Path<String>,
) -> Result<Json<ViewState>, ApiError> {
    state.coordinator.select_employee(&employee_id).await?;
    Ok(Json(state.coordinator.snapshot()))
}

/// Append the next page of the paginated feed
pub async fn api_load_more(state: State<AppState>) -> Result<Json<ViewState>, ApiError> {
    let outcome = state.coordinator.load_more().await?;
    log::debug!("Load more: {}", outcome);
    Ok(Json(state.coordinator.snapshot()))
}
