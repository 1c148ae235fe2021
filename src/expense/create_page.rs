//! Defines the page for recording a new expense.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    expense::form::{ExpenseFormValues, FormAction, expense_form_view},
    group::get_members,
    html::{FORM_CONTAINER_STYLE, base, link},
    navigation::NavBar,
    timezone,
};

/// The state needed for the new expense page.
#[derive(Debug, Clone)]
pub struct NewExpensePageState {
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NewExpensePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler for the page to record a new expense.
pub async fn get_new_expense_page(
    State(state): State<NewExpensePageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLock)?;

    let members = get_members(&connection)?;
    let nav_bar = NavBar::new(endpoints::NEW_EXPENSE_VIEW).into_html();

    if members.is_empty() {
        let content = html! {
            (nav_bar)

            div class="flex flex-col items-center gap-2 py-16 text-center"
            {
                p { "Add household members in the " (link(endpoints::SETTINGS_VIEW, "settings")) " before recording expenses." }
            }
        };

        return Ok(base("New Expense", &content).into_response());
    }

    let today = timezone::local_date(&state.local_timezone)?;
    let form = expense_form_view(
        &FormAction::Post(endpoints::POST_EXPENSE.to_string()),
        &members,
        &ExpenseFormValues::empty(today),
        "",
        "Record Expense",
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    Ok(base("New Expense", &content).into_response())
}
