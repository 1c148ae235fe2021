//! Alert fragments swapped into the fixed `#alert-container` via htmx
//! out-of-band swaps, so form endpoints can report success or failure without
//! re-rendering the page.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

const SUCCESS_STYLE: &str = "flex items-start gap-2 p-4 mb-4 rounded-lg \
    text-green-800 bg-green-50 dark:bg-gray-800 dark:text-green-400 shadow";
const ERROR_STYLE: &str = "flex items-start gap-2 p-4 mb-4 rounded-lg \
    text-red-800 bg-red-50 dark:bg-gray-800 dark:text-red-400 shadow";

/// A message shown to the user in the corner of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// Something worked.
    Success { message: String },
    /// Something did not work.
    Error { message: String, details: String },
}

impl Alert {
    pub fn error(message: &str, details: &str) -> Self {
        Self::Error {
            message: message.to_string(),
            details: details.to_string(),
        }
    }

    pub fn into_markup(self) -> Markup {
        let (style, message, details) = match self {
            Alert::Success { message } => (SUCCESS_STYLE, message, String::new()),
            Alert::Error { message, details } => (ERROR_STYLE, message, details),
        };

        html! {
            div id="alert-container" hx-swap-oob="true"
            {
                div class=(style) role="alert"
                {
                    div
                    {
                        p class="font-medium" { (message) }

                        @if !details.is_empty() {
                            p class="text-sm" { (details) }
                        }
                    }

                    button
                        type="button"
                        class="ms-auto bg-transparent border-none cursor-pointer"
                        aria-label="Dismiss"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "✕"
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_markup().into_response()
    }
}

/// Render `alert` as the response body with the given status code.
pub fn render_alert(status_code: StatusCode, alert: Alert) -> Response {
    (status_code, alert.into_markup()).into_response()
}
