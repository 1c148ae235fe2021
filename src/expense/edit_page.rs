//! Defines the page for editing an existing expense.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    expense::{
        ExpenseId,
        core::get_expense,
        form::{ExpenseFormValues, FormAction, expense_form_view},
    },
    group::get_members,
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
};

/// The state needed for the edit expense page.
#[derive(Debug, Clone)]
pub struct EditExpensePageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditExpensePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler for the edit expense page.
pub async fn get_edit_expense_page(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<EditExpensePageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLock)?;

    let expense = get_expense(expense_id, &connection)?;
    let members = get_members(&connection)?;

    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_EXPENSE, expense_id);
    let form = expense_form_view(
        &FormAction::Put(update_endpoint),
        &members,
        &ExpenseFormValues::from_expense(&expense),
        "",
        "Update Expense",
    );

    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();
    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    Ok(base("Edit Expense", &content).into_response())
}
