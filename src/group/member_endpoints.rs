//! Defines the endpoints for managing the member roster.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    endpoints,
    group::MemberId,
    group::core::{add_member, remove_member},
};

/// The state needed for the member endpoints.
#[derive(Debug, Clone)]
pub struct MemberEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for MemberEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for adding a member.
#[derive(Debug, Deserialize)]
pub struct MemberFormData {
    #[serde(default)]
    pub name: String,
}

/// A route handler for adding a member to the roster.
pub async fn add_member_endpoint(
    State(state): State<MemberEndpointState>,
    Form(form): Form<MemberFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLock.into_alert_response();
        }
    };

    match add_member(Some(&form.name), &connection) {
        Ok(_) => (
            HxRedirect(endpoints::SETTINGS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while adding a member: {error}");
            error.into_alert_response()
        }
    }
}

/// A route handler for removing a member from the roster.
///
/// The remove button targets its own list item, so a successful response
/// carries only the out-of-band alert and the entry disappears.
pub async fn remove_member_endpoint(
    Path(member_id): Path<MemberId>,
    State(state): State<MemberEndpointState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLock.into_alert_response();
        }
    };

    match remove_member(member_id, &connection) {
        Ok(()) => Alert::Success {
            message: "Member removed".to_owned(),
        }
        .into_response(),
        Err(Error::DeleteMissingMember) => Error::DeleteMissingMember.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while removing member {member_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
