//! HTTP API server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::transactions: view state, employee selection, "View More"

pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use ledgerview_config::Config;
use ledgerview_core::ViewCoordinator;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<ViewCoordinator>,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::transactions::{
        api_employees, api_load_more, api_select_all, api_select_employee, api_view,
        htmx_load_more, htmx_select, page_transactions,
    };

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/view", get(api_view))
        .route("/api/employees", get(api_employees))
        .route("/api/select/all", post(api_select_all))
        .route("/api/select/:employee_id", post(api_select_employee))
        .route("/api/load-more", post(api_load_more))
        // HTMX page routes
        .route("/", get(page_transactions))
        .route("/select", post(htmx_select))
        .route("/load-more", post(htmx_load_more))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Ledgerview</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        title, content
    )
}

/// Bind and serve until the listener fails
pub async fn start_server(config: Config, coordinator: Arc<ViewCoordinator>) -> std::io::Result<()> {
    let addr = config.bind_address();
    let router = create_router(AppState { coordinator });

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting ledgerview server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Transactions)");
    log::info!("  - /api/* (JSON API endpoints)");

    axum::serve(listener, router).await?;
    log::info!("Server stopped gracefully");
    Ok(())
}
