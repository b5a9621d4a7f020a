//! Endpoints for adding bookmakers and people.
//!
//! The backend creates the accounts that go with a new bookmaker or person.

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use serde::Deserialize;

use crate::{
    AppState, Error,
    backend::{Backend, Procedure},
    endpoints,
    form::non_blank,
};

#[derive(Debug, Clone)]
pub struct RegistryState<B: Backend> {
    pub backend: B,
}

impl<B: Backend> FromRef<AppState<B>> for RegistryState<B> {
    fn from_ref(state: &AppState<B>) -> Self {
        Self {
            backend: state.backend.clone(),
        }
    }
}

/// The form data for adding a bookmaker or a person.
#[derive(Debug, Deserialize)]
pub struct NameForm {
    pub name: String,
}

async fn call_and_redirect<B: Backend>(backend: &B, procedure: Procedure) -> Response {
    match backend.call(&procedure).await {
        Ok(()) => (
            HxRedirect(endpoints::BALANCES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not call {}: {error}", procedure.name());
            error.into_alert_response()
        }
    }
}

/// A route handler for adding a bookmaker with an account for every person.
pub async fn create_bookmaker_endpoint<B: Backend>(
    State(state): State<RegistryState<B>>,
    Form(form): Form<NameForm>,
) -> Response {
    let Some(bookmaker_name) = non_blank(&form.name) else {
        return Error::InvalidForm("Enter the bookmaker's name".to_owned()).into_alert_response();
    };

    call_and_redirect(
        &state.backend,
        Procedure::AddBookmakerAndAccounts { bookmaker_name },
    )
    .await
}

/// A route handler for adding a person with an account at every bookmaker
/// and a default PayPal method.
pub async fn create_person_endpoint<B: Backend>(
    State(state): State<RegistryState<B>>,
    Form(form): Form<NameForm>,
) -> Response {
    let Some(person_name) = non_blank(&form.name) else {
        return Error::InvalidForm("Enter the person's name".to_owned()).into_alert_response();
    };

    call_and_redirect(
        &state.backend,
        Procedure::AddPersonAccountsWithDefaultPaypal { person_name },
    )
    .await
}
