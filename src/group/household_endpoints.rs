//! Defines the endpoints for creating and configuring the household.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    group::core::{create_household, get_household, rename_household, update_split_policy},
    group::MemberId,
};

/// The state needed for the household endpoints.
#[derive(Debug, Clone)]
pub struct HouseholdEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for HouseholdEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating or renaming the household.
#[derive(Debug, Deserialize)]
pub struct HouseholdFormData {
    pub name: String,
}

fn redirect_to_settings() -> Response {
    (
        HxRedirect(endpoints::SETTINGS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// A route handler for creating the household.
pub async fn create_household_endpoint(
    State(state): State<HouseholdEndpointState>,
    Form(form): Form<HouseholdFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLock.into_alert_response();
        }
    };

    match create_household(&form.name, &connection) {
        Ok(_) => redirect_to_settings(),
        Err(error @ (Error::EmptyHouseholdName | Error::HouseholdAlreadyExists)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating the household: {error}");
            error.into_alert_response()
        }
    }
}

/// A route handler for renaming the household.
pub async fn rename_household_endpoint(
    State(state): State<HouseholdEndpointState>,
    Form(form): Form<HouseholdFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLock.into_alert_response();
        }
    };

    let result = get_household(&connection).and_then(|household| match household {
        Some(household) => rename_household(household.id, &form.name, &connection),
        None => Err(Error::NotFound),
    });

    match result {
        Ok(()) => redirect_to_settings(),
        Err(error @ (Error::EmptyHouseholdName | Error::NotFound)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while renaming the household: {error}");
            error.into_alert_response()
        }
    }
}

/// The form data for changing the split policy. The ratio holder select
/// submits either a member id or the literal "none".
#[derive(Debug, Deserialize)]
pub struct SplitPolicyFormData {
    pub ratio_holder: String,
    pub split_ratio: i64,
}

impl SplitPolicyFormData {
    fn ratio_holder_id(&self) -> Result<Option<MemberId>, Error> {
        if self.ratio_holder == "none" {
            return Ok(None);
        }

        self.ratio_holder
            .parse()
            .map(Some)
            .map_err(|_| Error::NotFound)
    }
}

/// A route handler for changing the split policy.
pub async fn update_split_policy_endpoint(
    State(state): State<HouseholdEndpointState>,
    Form(form): Form<SplitPolicyFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLock.into_alert_response();
        }
    };

    let result = form.ratio_holder_id().and_then(|ratio_holder_id| {
        let household = get_household(&connection)?.ok_or(Error::NotFound)?;

        update_split_policy(household.id, ratio_holder_id, form.split_ratio, &connection)
    });

    match result {
        Ok(()) => redirect_to_settings(),
        Err(error @ (Error::InvalidRatio(_) | Error::NotFound)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while updating the split policy: {error}");
            error.into_alert_response()
        }
    }
}
