//! Monthly category budgets and the page comparing them to actual spending.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::{Connection, Row, params};
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    expense::{Category, get_spending_by_category},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_signed_yen,
        format_yen, month_nav,
    },
    month::MonthKey,
    navigation::NavBar,
};

pub type BudgetId = i64;

/// A spending ceiling for one category in one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Budget {
    /// The ID of the budget row.
    pub id: BudgetId,
    /// The year the budget applies to.
    pub year: i32,
    /// The month the budget applies to (1-12).
    pub month: u8,
    /// The category being budgeted.
    pub category: Category,
    /// The ceiling in whole yen.
    pub amount: i64,
    /// A free-form note, e.g. who suggested the number.
    pub note: Option<String>,
}

pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            year INTEGER NOT NULL,
            month INTEGER NOT NULL,
            category TEXT NOT NULL,
            amount INTEGER NOT NULL,
            note TEXT,
            UNIQUE(year, month, category)
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_budget(row: &Row) -> Result<Budget, rusqlite::Error> {
    let raw_category: String = row.get(3)?;
    let category = raw_category.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown budget category {raw_category:?}").into(),
        )
    })?;

    Ok(Budget {
        id: row.get(0)?,
        year: row.get(1)?,
        month: row.get(2)?,
        category,
        amount: row.get(4)?,
        note: row.get(5)?,
    })
}

/// Set the budget for `category` in `month`, replacing any previous value.
///
/// # Errors
/// This function will return an error if the amount is negative or there is
/// an SQL error.
pub fn set_budget(
    month: MonthKey,
    category: Category,
    amount: i64,
    note: Option<&str>,
    connection: &Connection,
) -> Result<(), Error> {
    if amount < 0 {
        return Err(Error::InvalidAmount(amount));
    }

    let note = note.map(str::trim).filter(|note| !note.is_empty());

    connection.execute(
        "INSERT INTO budget (year, month, category, amount, note)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(year, month, category)
            DO UPDATE SET amount = excluded.amount, note = excluded.note",
        params![
            month.year(),
            month.month() as u8,
            category.as_str(),
            amount,
            note,
        ],
    )?;

    Ok(())
}

/// Get the budgets set for `month`.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_budgets_for_month(
    month: MonthKey,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, year, month, category, amount, note FROM budget
                WHERE year = :year AND month = :month",
        )?
        .query_map(
            &[
                (":year", &month.year() as &dyn rusqlite::ToSql),
                (":month", &(month.month() as u8)),
            ],
            map_row_to_budget,
        )?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// One row of the budgets table: a category, its ceiling, and its spending.
struct BudgetLine {
    category: Category,
    budget: Option<Budget>,
    spent: i64,
}

fn budgets_view(month: MonthKey, lines: &[BudgetLine]) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class="flex flex-col items-center px-6 py-4 mx-auto max-w-3xl text-gray-900 dark:text-white"
        {
            (month_nav(endpoints::BUDGETS_VIEW, month, None))

            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th class=(TABLE_CELL_STYLE) { "Category" }
                        th class=(TABLE_CELL_STYLE) { "Budget" }
                        th class=(TABLE_CELL_STYLE) { "Spent" }
                        th class=(TABLE_CELL_STYLE) { "Remaining" }
                    }
                }

                tbody
                {
                    @for line in lines {
                        (budget_line_view(line))
                    }
                }
            }

            (set_budget_form_view(month))
        }
    };

    base("Budgets", &content)
}

fn budget_line_view(line: &BudgetLine) -> Markup {
    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                (line.category.label())

                @if let Some(note) = line.budget.as_ref().and_then(|budget| budget.note.as_deref()) {
                    span class="block text-xs text-gray-400" { (note) }
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                @match &line.budget {
                    Some(budget) => { (format_yen(budget.amount)) }
                    None => { "—" }
                }
            }

            td class=(TABLE_CELL_STYLE) { (format_yen(line.spent)) }

            td class=(TABLE_CELL_STYLE)
            {
                @match &line.budget {
                    Some(budget) => {
                        @let remaining = budget.amount - line.spent;
                        @let style = if remaining < 0 {
                            "text-red-600 dark:text-red-400"
                        } else {
                            "text-green-600 dark:text-green-400"
                        };

                        span class=(style) { (format_signed_yen(remaining)) }
                    }
                    None => { "—" }
                }
            }
        }
    }
}

fn set_budget_form_view(month: MonthKey) -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_BUDGET)
            hx-target-error="#alert-container"
            class="w-full space-y-4 mt-8"
        {
            input type="hidden" name="month" value=(month);

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select id="category" name="category" class=(FORM_SELECT_STYLE)
                {
                    @for category in Category::ALL {
                        option value=(category) { (category.label()) }
                    }
                }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Budget (yen)" }

                input
                    id="amount"
                    type="number"
                    name="amount"
                    min="0"
                    step="1"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="note" class=(FORM_LABEL_STYLE) { "Note (optional)" }

                input
                    id="note"
                    type="text"
                    name="note"
                    placeholder="e.g. includes the annual premium"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Set Budget" }
        }
    }
}

/// The state needed for the budgets page and endpoint.
#[derive(Debug, Clone)]
pub struct BudgetPageState {
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BudgetsQuery {
    pub month: Option<String>,
}

/// Route handler for the budgets page.
pub async fn get_budgets_page(
    State(state): State<BudgetPageState>,
    Query(query): Query<BudgetsQuery>,
) -> Result<Response, Error> {
    let month = match query.month {
        Some(raw) => MonthKey::parse(&raw)?,
        None => MonthKey::current(&state.local_timezone)?,
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLock)?;

    let budgets = get_budgets_for_month(month, &connection)?;
    let spending = get_spending_by_category(month, &connection)?;

    let lines: Vec<BudgetLine> = Category::ALL
        .into_iter()
        .map(|category| BudgetLine {
            category,
            budget: budgets
                .iter()
                .find(|budget| budget.category == category)
                .cloned(),
            spent: spending
                .iter()
                .find(|(spent_category, _)| *spent_category == category)
                .map(|(_, total)| *total)
                .unwrap_or(0),
        })
        .collect();

    Ok(budgets_view(month, &lines).into_response())
}

/// The form data for setting a budget.
#[derive(Debug, Deserialize)]
pub struct BudgetFormData {
    pub month: String,
    pub category: Category,
    pub amount: i64,
    #[serde(default)]
    pub note: String,
}

/// A route handler for setting a category budget for a month.
pub async fn set_budget_endpoint(
    State(state): State<BudgetPageState>,
    Form(form): Form<BudgetFormData>,
) -> Response {
    let month = match MonthKey::parse(&form.month) {
        Ok(month) => month,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLock.into_alert_response();
        }
    };

    match set_budget(month, form.category, form.amount, Some(&form.note), &connection) {
        Ok(()) => (
            HxRedirect(format!("{}?month={month}", endpoints::BUDGETS_VIEW)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::InvalidAmount(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while setting a budget: {error}");
            error.into_alert_response()
        }
    }
}
