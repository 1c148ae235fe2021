//! The dashboard: one settlement computation per render, plus the cards that
//! present it.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    dashboard::cards::{balance_details_card, ratio_card, settlement_plan_card, total_card},
    endpoints,
    expense::{Category, get_expenses_for_month},
    group::{Household, Member, get_household, get_members},
    html::{base, category_filter, household_setup_prompt, month_nav},
    month::MonthKey,
    navigation::NavBar,
    settlement::{SettlementPlan, SplitPolicy, settle},
};

/// The state needed for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardPageState {
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub month: Option<String>,
    pub category: Option<Category>,
}

/// Route handler for the dashboard page.
pub async fn get_dashboard_page(
    State(state): State<DashboardPageState>,
    Query(query): Query<DashboardQuery>,
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

    let Some(household) = get_household(&connection)? else {
        let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
        let content = html! {
            (nav_bar)
            (household_setup_prompt())
        };

        return Ok(base("Dashboard", &content).into_response());
    };

    let members = get_members(&connection)?;
    let expenses = get_expenses_for_month(month, query.category, &connection)?;

    let total: i64 = expenses.iter().map(|expense| expense.amount).sum();
    let plan = settle(
        &expenses,
        &members,
        SplitPolicy::from_household(Some(&household)),
    );

    Ok(
        dashboard_view(month, query.category, &household, &members, total, &plan)
            .into_response(),
    )
}

fn dashboard_view(
    month: MonthKey,
    category: Option<Category>,
    household: &Household,
    members: &[Member],
    total: i64,
    plan: &SettlementPlan,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let active_ratio_holder = household
        .ratio_holder_id
        .filter(|_| household.split_ratio != 50)
        .and_then(|holder_id| members.iter().find(|member| member.id == holder_id));

    let content = html! {
        (nav_bar)

        div class="flex flex-col items-center gap-4 px-6 py-4 mx-auto max-w-2xl text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-semibold" { (household.name) }

            (month_nav(endpoints::DASHBOARD_VIEW, month, category))
            (category_filter(endpoints::DASHBOARD_VIEW, month, category))

            @if let Some(holder) = active_ratio_holder {
                (ratio_card(holder.display_name(), household.split_ratio))
            }

            (settlement_plan_card(month, &plan.transfers, &plan.balances))
            (total_card(month, total))
            (balance_details_card(&plan.balances))
        }
    };

    base("Dashboard", &content)
}
