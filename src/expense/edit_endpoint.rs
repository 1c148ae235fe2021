//! Defines the endpoint for updating an existing expense.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    expense::{ExpenseId, core::update_expense, form::ExpenseFormData},
};

/// The state needed to update an expense.
#[derive(Debug, Clone)]
pub struct EditExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for updating an expense, redirects to the expenses view on
/// success.
pub async fn edit_expense_endpoint(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<EditExpenseState>,
    Form(form): Form<ExpenseFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLock.into_alert_response();
        }
    };

    match update_expense(expense_id, form.into_details(), &connection) {
        Ok(()) => (
            HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(
            error @ (Error::UpdateMissingExpense
            | Error::InvalidAmount(_)
            | Error::InvalidPayer(_)),
        ) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating expense {expense_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod edit_expense_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        expense::{Category, ExpenseDetails, create_expense, form::ExpenseFormData, get_expense},
        group::add_member,
    };

    use super::{EditExpenseState, edit_expense_endpoint};

    fn get_test_state() -> EditExpenseState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");

        EditExpenseState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn updates_expense_and_redirects() {
        let state = get_test_state();
        let (member, expense) = {
            let connection = state.db_connection.lock().unwrap();
            let member = add_member(Some("Aki"), &connection).unwrap();
            let expense = create_expense(
                ExpenseDetails {
                    amount: 1200,
                    date: date!(2025 - 08 - 05),
                    category: Category::Food,
                    description: None,
                    shop: None,
                    payer_id: member.id,
                },
                &connection,
            )
            .unwrap();

            (member, expense)
        };

        let form = ExpenseFormData {
            amount: 900,
            date: date!(2025 - 08 - 06),
            category: Category::Daily,
            description: "Detergent".to_string(),
            shop: String::new(),
            payer_id: member.id,
        };

        let response = edit_expense_endpoint(Path(expense.id), State(state.clone()), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let updated = get_expense(expense.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(updated.amount, 900);
        assert_eq!(updated.category, Category::Daily);
        assert_eq!(updated.date, date!(2025 - 08 - 06));
    }

    #[tokio::test]
    async fn updating_missing_expense_returns_not_found() {
        let state = get_test_state();
        let member = add_member(Some("Aki"), &state.db_connection.lock().unwrap()).unwrap();

        let form = ExpenseFormData {
            amount: 900,
            date: date!(2025 - 08 - 06),
            category: Category::Daily,
            description: String::new(),
            shop: String::new(),
            payer_id: member.id,
        };

        let response = edit_expense_endpoint(Path(999), State(state), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
