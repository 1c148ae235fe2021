use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    let page = error_view(
        "Page Not Found",
        "404",
        "Whoops! That page does not exist.",
        "Check the URL or head back to the dashboard.",
    );

    (StatusCode::NOT_FOUND, page).into_response()
}
