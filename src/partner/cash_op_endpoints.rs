//! Endpoints for applying and deleting partner cash operations.

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState, Error,
    backend::{Backend, Procedure},
    endpoints,
    form::{empty_string_as_none, non_blank, parse_amount},
    partner::CashOpKind,
};

/// The state needed to apply or delete a partner cash operation.
#[derive(Debug, Clone)]
pub struct CashOpState<B: Backend> {
    pub backend: B,
}

impl<B: Backend> FromRef<AppState<B>> for CashOpState<B> {
    fn from_ref(state: &AppState<B>) -> Self {
        Self {
            backend: state.backend.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CashOpForm {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub partner_id: Option<Uuid>,
    pub kind: CashOpKind,
    pub amount: String,
    /// The method the money moved through, if any.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub payment_method_id: Option<Uuid>,
    #[serde(default)]
    pub note: String,
}

fn cash_op_procedure(form: &CashOpForm) -> Result<Procedure, Error> {
    let partner_id = form
        .partner_id
        .ok_or_else(|| Error::InvalidForm("Choose the partner".to_owned()))?;
    let amount = parse_amount(&form.amount)
        .filter(|amount| *amount > 0.0)
        .ok_or_else(|| Error::InvalidForm("Enter an amount greater than zero".to_owned()))?;

    Ok(Procedure::ApplyPartnerCashOp {
        partner_id,
        kind: form.kind,
        amount,
        payment_method_id: form.payment_method_id,
        note: non_blank(&form.note),
    })
}

async fn call_and_redirect<B: Backend>(backend: &B, procedure: Procedure) -> Response {
    match backend.call(&procedure).await {
        Ok(()) => (
            HxRedirect(endpoints::PARTNERS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not call {}: {error}", procedure.name());
            error.into_alert_response()
        }
    }
}

/// A route handler for a partner deposit or withdrawal.
///
/// The backend mints or burns the partner's equity units.
pub async fn apply_cash_op_endpoint<B: Backend>(
    State(state): State<CashOpState<B>>,
    Form(form): Form<CashOpForm>,
) -> Response {
    match cash_op_procedure(&form) {
        Ok(procedure) => call_and_redirect(&state.backend, procedure).await,
        Err(error) => error.into_alert_response(),
    }
}

pub async fn delete_cash_op_endpoint<B: Backend>(
    State(state): State<CashOpState<B>>,
    Path(op_id): Path<Uuid>,
) -> Response {
    call_and_redirect(&state.backend, Procedure::DeletePartnerCashOp { op_id }).await
}
