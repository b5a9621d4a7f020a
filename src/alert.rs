//! Alerts for displaying error messages to users.
//!
//! Alerts are rendered as HTML fragments which htmx swaps into the
//! `#alert-container` element of the base layout.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};

/// An error message, with or without details.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Error { message: String, details: String },
    ErrorSimple { message: String },
}

impl Alert {
    pub fn into_html(self) -> Html<String> {
        Html(self.into_markup().into_string())
    }

    pub fn into_markup(self) -> Markup {
        let (message, details) = match self {
            Alert::Error { message, details } => (message, details),
            Alert::ErrorSimple { message } => (message, String::new()),
        };

        html!(
            div
                class="flex items-start gap-3 p-4 rounded-lg border text-sm \
                    text-red-800 border-red-300 bg-red-50 \
                    dark:bg-gray-800 dark:text-red-300 dark:border-red-800"
                role="alert"
                data-alert="error"
            {
                div class="flex-1"
                {
                    p class="font-semibold" { (message) }

                    @if !details.is_empty() {
                        p class="mt-1 whitespace-pre-wrap" { (details) }
                    }
                }

                button
                    type="button"
                    class="font-bold"
                    aria-label="Dismiss"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "×"
                }
            }
        )
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.into_html()).into_response()
    }
}
