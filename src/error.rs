//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The backend rejected a read, a write or a procedure call.
    ///
    /// The string is the message returned by the backend. It is shown to the
    /// client verbatim, since the backend procedures phrase their own
    /// validation errors (e.g., "insufficient balance").
    #[error("{0}")]
    Backend(String),

    /// A submitted form failed validation before reaching the backend.
    #[error("{0}")]
    InvalidForm(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::RowNotFound => Error::NotFound,
            sqlx::Error::Database(error) => Error::Backend(error.message().to_owned()),
            error => {
                tracing::error!("an unhandled backend error occurred: {error}");
                Error::Backend(error.to_string())
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::Backend(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "The backend rejected the request".to_owned(),
                    details: message,
                },
            ),
            Error::InvalidForm(message) => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple { message },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Not found".to_owned(),
                    details: "The record could not be found. \
                    Try refreshing the page to see if it has already been deleted."
                        .to_owned(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::{
        Error,
        test_utils::{assert_valid_html, parse_html_fragment},
    };

    #[tokio::test]
    async fn backend_message_is_shown_verbatim() {
        let message = "saldo insufficiente sul conto di partenza";

        let response = Error::Backend(message.to_owned()).into_alert_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let text = html.root_element().text().collect::<String>();
        assert!(
            text.contains(message),
            "want alert to contain {message:?}, got {text:?}"
        );
    }

    #[tokio::test]
    async fn invalid_form_is_a_bad_request() {
        let response = Error::InvalidForm("Amount is not valid".to_owned()).into_alert_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_rows_map_to_not_found() {
        assert_eq!(Error::from(sqlx::Error::RowNotFound), Error::NotFound);
    }
}
