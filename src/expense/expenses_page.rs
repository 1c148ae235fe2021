//! Defines the page listing the month's expenses.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    expense::{Category, Expense, core::get_expenses_for_month},
    group::{Member, MemberId, get_members},
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, category_filter, format_yen, link, month_nav,
    },
    month::MonthKey,
    navigation::NavBar,
};

/// The state needed for the expenses page.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExpenseListQuery {
    pub month: Option<String>,
    pub category: Option<Category>,
}

/// Route handler for the expenses page.
pub async fn get_expenses_page(
    State(state): State<ExpensesPageState>,
    Query(query): Query<ExpenseListQuery>,
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

    let expenses = get_expenses_for_month(month, query.category, &connection)?;
    let members = get_members(&connection)?;

    Ok(expenses_view(month, query.category, &expenses, &members).into_response())
}

fn expenses_view(
    month: MonthKey,
    category: Option<Category>,
    expenses: &[Expense],
    members: &[Member],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();
    let total: i64 = expenses.iter().map(|expense| expense.amount).sum();

    let payer_names: HashMap<MemberId, &str> = members
        .iter()
        .map(|member| (member.id, member.display_name()))
        .collect();

    let content = html! {
        (nav_bar)

        div class="flex flex-col items-center px-6 py-4 mx-auto max-w-4xl text-gray-900 dark:text-white"
        {
            (month_nav(endpoints::EXPENSES_VIEW, month, category))
            (category_filter(endpoints::EXPENSES_VIEW, month, category))

            p class="self-end mb-2"
            {
                (link(endpoints::NEW_EXPENSE_VIEW, "+ Record expense"))
            }

            @if expenses.is_empty() {
                p class="py-12 text-gray-500 dark:text-gray-400" { "No expenses this month." }
            } @else {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th class=(TABLE_CELL_STYLE) { "Date" }
                            th class=(TABLE_CELL_STYLE) { "Category" }
                            th class=(TABLE_CELL_STYLE) { "Paid by" }
                            th class=(TABLE_CELL_STYLE) { "Details" }
                            th class=(TABLE_CELL_STYLE) { "Amount" }
                            th class=(TABLE_CELL_STYLE) { "" }
                        }
                    }

                    tbody
                    {
                        @for expense in expenses {
                            (expense_row_view(expense, &payer_names))
                        }
                    }

                    tfoot
                    {
                        tr class="font-semibold text-gray-900 dark:text-white"
                        {
                            td class=(TABLE_CELL_STYLE) colspan="4" { "Total" }
                            td class=(TABLE_CELL_STYLE) { (format_yen(total)) }
                            td class=(TABLE_CELL_STYLE) { "" }
                        }
                    }
                }
            }
        }
    };

    base("Expenses", &content)
}

fn expense_row_view(expense: &Expense, payer_names: &HashMap<MemberId, &str>) -> Markup {
    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id);
    let delete_endpoint = endpoints::format_endpoint(endpoints::DELETE_EXPENSE, expense.id);

    // Expenses outlive their payers, so the roster may not have a name.
    let payer = payer_names
        .get(&expense.payer_id)
        .copied()
        .unwrap_or("Former member");

    let details = match (&expense.description, &expense.shop) {
        (Some(description), Some(shop)) => format!("{description} ({shop})"),
        (Some(description), None) => description.clone(),
        (None, Some(shop)) => shop.clone(),
        (None, None) => String::new(),
    };

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (expense.date) }
            td class=(TABLE_CELL_STYLE) { (expense.category.label()) }
            td class=(TABLE_CELL_STYLE) { (payer) }
            td class=(TABLE_CELL_STYLE) { (details) }
            td class=(TABLE_CELL_STYLE) { (format_yen(expense.amount)) }

            td class=(TABLE_CELL_STYLE)
            {
                a href=(edit_endpoint) class=(LINK_STYLE) { "Edit" }

                button
                    class=(BUTTON_DELETE_STYLE)
                    hx-delete=(delete_endpoint)
                    hx-target="closest tr"
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    hx-confirm="Delete this expense?"
                {
                    "Delete"
                }
            }
        }
    }
}
