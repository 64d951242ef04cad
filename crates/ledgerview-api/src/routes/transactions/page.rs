//! Transactions page rendering - full page and HTMX fragments
//!
//! Endpoints:
//! - page_transactions: employee filter plus the transaction panel
//! - htmx_select: apply a dropdown change, return the panel
//! - htmx_load_more: append the next page, return the panel

use axum::extract::{Form, State};
use axum::response::Html;
use ledgerview_core::{CoreError, Employee, Transaction, ViewState};
use ledgerview_utils::{escape_html, format_amount};
use serde::Deserialize;

use crate::{base_html, AppState};

/// Dropdown form payload; an empty id selects all employees
#[derive(Debug, Deserialize)]
pub struct SelectForm {
    #[serde(default)]
    pub employee_id: String,
}

/// Transactions page - first render bootstraps the "all transactions" view
pub async fn page_transactions(state: State<AppState>) -> Html<String> {
    let error = state.coordinator.bootstrap().await.err();
    let snapshot = state.coordinator.snapshot();

    let content = format!(
        r#"<main class='max-w-4xl mx-auto p-6'>
    <h1 class='text-2xl font-bold mb-4'>Transactions</h1>
    <hr class='mb-6'>
    {}
    <div class='mb-6'></div>
    <div id='transactions'>{}</div>
</main>"#,
        render_select(&snapshot),
        render_panel(&snapshot, error.as_ref())
    );

    Html(base_html("Transactions", &content))
}

/// HTMX: dropdown changed
pub async fn htmx_select(state: State<AppState>, Form(form): Form<SelectForm>) -> Html<String> {
    let employee = state
        .coordinator
        .employees()
        .options()
        .into_iter()
        .find(|e| e.id == form.employee_id)
        .unwrap_or_else(|| Employee::new(&form.employee_id, "", ""));

    let error = state.coordinator.select(Some(&employee)).await.err();
    Html(render_panel(&state.coordinator.snapshot(), error.as_ref()))
}

/// HTMX: "View More" clicked
pub async fn htmx_load_more(state: State<AppState>) -> Html<String> {
    let error = state.coordinator.load_more().await.err();
    Html(render_panel(&state.coordinator.snapshot(), error.as_ref()))
}

/// Employee filter dropdown
pub fn render_select(state: &ViewState) -> String {
    if state.employees_loading || state.employees.is_empty() {
        return r#"<label class='block text-sm text-gray-600 mb-1'>Filter by employee</label>
<select disabled class='px-4 py-2 border rounded-lg w-64'><option>Loading employees...</option></select>"#
            .to_string();
    }

    let selected = match &state.mode {
        ledgerview_core::Mode::Filtered { employee_id } => employee_id.as_str(),
        _ => "",
    };

    let options: String = state
        .employees
        .iter()
        .map(|e| {
            format!(
                "<option value='{}'{}>{}</option>",
                escape_html(&e.id),
                if e.id == selected { " selected" } else { "" },
                escape_html(&e.label())
            )
        })
        .collect();

    format!(
        r#"<label class='block text-sm text-gray-600 mb-1' for='employee_id'>Filter by employee</label>
<select id='employee_id' name='employee_id' hx-post='/select' hx-target='#transactions' hx-trigger='change'
    class='px-4 py-2 border rounded-lg w-64'>{}</select>"#,
        options
    )
}

/// Transaction rows plus the "View More" control
pub fn render_panel(state: &ViewState, error: Option<&CoreError>) -> String {
    let mut html = String::new();

    if let Some(error) = error {
        html.push_str(&format!(
            "<div class='bg-red-50 border border-red-200 text-red-700 p-3 rounded-lg mb-4'>{}</div>",
            escape_html(&error.to_details().to_string())
        ));
    }

    match &state.view {
        None if state.loading => {
            html.push_str("<div class='text-gray-500'>Loading...</div>");
        }
        None => {}
        Some(transactions) => {
            html.push_str("<div class='space-y-2'>");
            for transaction in transactions {
                html.push_str(&render_row(transaction));
            }
            html.push_str("</div>");

            html.push_str(&format!(
                "<button class='mt-4 px-4 py-2 bg-indigo-600 text-white rounded-lg' hx-post='/load-more' hx-target='#transactions'{}{}>View More</button>",
                if state.can_load_more { "" } else { " disabled" },
                if state.show_load_more { "" } else { " hidden" },
            ));
        }
    }

    html
}

fn render_row(transaction: &Transaction) -> String {
    format!(
        r#"<div class='flex justify-between items-center bg-white p-3 rounded-lg border' id='txn-{}'>
    <div>
        <p class='font-medium'>{}</p>
        <p class='text-sm text-gray-500'>{} - {}</p>
    </div>
    <div class='flex items-center gap-4'>
        <span class='font-mono'>{}</span>
        <input type='checkbox' disabled{}>
    </div>
</div>"#,
        escape_html(&transaction.id),
        escape_html(&transaction.merchant),
        escape_html(&transaction.employee.label()),
        transaction.date.format("%Y-%m-%d"),
        format_amount(transaction.amount),
        if transaction.approved { " checked" } else { "" },
    )
}
