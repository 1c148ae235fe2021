//! Warikan is a web app for a household to track shared expenses and settle
//! up each month.
//!
//! This library provides a server that directly serves HTML pages: record who
//! paid for what, set per-category budgets, and get a settlement plan telling
//! each member who to pay to even things out.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod budget;
mod dashboard;
mod db;
mod endpoints;
mod expense;
mod group;
mod html;
mod internal_server_error;
mod logging;
mod month;
mod navigation;
mod not_found;
mod routing;
mod settlement;
mod timezone;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use routing::build_router;
pub use settlement::{
    MemberBalance, PairSplit, SettlementPlan, SplitPolicy, Transfer, settle, split_with_ratio,
};

use crate::{
    alert::{Alert, render_alert},
    group::MemberId,
    html::error_view,
    internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLock,

    /// An empty string was used to name the household.
    #[error("Household name cannot be empty")]
    EmptyHouseholdName,

    /// Tried to create a second household.
    ///
    /// The application manages a single household; there is nothing sensible
    /// for a second one to mean.
    #[error("the household has already been set up")]
    HouseholdAlreadyExists,

    /// A split ratio outside [0, 100] was supplied.
    #[error("{0} is not a valid split ratio, expected a percentage from 0 to 100")]
    InvalidRatio(i64),

    /// A negative amount was supplied for an expense or budget.
    #[error("{0} is not a valid amount, expected zero or more whole yen")]
    InvalidAmount(i64),

    /// An expense named a payer that is not on the member roster.
    #[error("member {0} does not exist")]
    InvalidPayer(MemberId),

    /// A month query parameter did not match the YYYY-MM format.
    #[error("\"{0}\" is not a valid month, expected the format YYYY-MM")]
    InvalidMonth(String),

    /// An unknown expense category was supplied.
    #[error("\"{0}\" is not a valid category")]
    InvalidCategory(String),

    /// The configured timezone is not a canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// Tried to update an expense that does not exist.
    #[error("tried to update an expense that is not in the database")]
    UpdateMissingExpense,

    /// Tried to delete an expense that does not exist.
    #[error("tried to delete an expense that is not in the database")]
    DeleteMissingExpense,

    /// Tried to remove a member that does not exist.
    #[error("tried to remove a member that is not in the database")]
    DeleteMissingMember,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidMonth(raw) => (
                StatusCode::BAD_REQUEST,
                error_view(
                    "Invalid Month",
                    "400",
                    &format!("\"{raw}\" is not a month this app understands."),
                    "Use the format YYYY-MM, e.g. 2025-08.",
                ),
            )
                .into_response(),
            Error::InvalidTimezone(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to a valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLock => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::EmptyHouseholdName => render_alert(
                StatusCode::BAD_REQUEST,
                Alert::error("Invalid household name", "The household name cannot be empty."),
            ),
            Error::HouseholdAlreadyExists => render_alert(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Household already set up",
                    "This app manages a single household. Rename it instead.",
                ),
            ),
            Error::InvalidRatio(ratio) => render_alert(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid split ratio",
                    &format!("{ratio}% is not a percentage from 0 to 100."),
                ),
            ),
            Error::InvalidAmount(amount) => render_alert(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid amount",
                    &format!("{amount} is not a valid amount. Enter zero or more whole yen."),
                ),
            ),
            Error::InvalidPayer(member_id) => render_alert(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid payer",
                    &format!("Member {member_id} is not on the roster."),
                ),
            ),
            Error::InvalidMonth(raw) => render_alert(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid month",
                    &format!("\"{raw}\" does not match the format YYYY-MM."),
                ),
            ),
            Error::UpdateMissingExpense => render_alert(
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not update expense",
                    "The expense could not be found. \
                    Try refreshing the page to see if it has already been deleted.",
                ),
            ),
            Error::DeleteMissingExpense => render_alert(
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not delete expense",
                    "The expense could not be found. \
                    Try refreshing the page to see if it has already been deleted.",
                ),
            ),
            Error::DeleteMissingMember => render_alert(
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not remove member",
                    "The member could not be found. \
                    Try refreshing the page to see if they have already been removed.",
                ),
            ),
            Error::NotFound => render_alert(
                StatusCode::NOT_FOUND,
                Alert::error("Not found", "The requested resource could not be found."),
            ),
            _ => render_alert(
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                ),
            ),
        }
    }
}
