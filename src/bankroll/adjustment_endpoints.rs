//! Endpoints for creating and deleting balance adjustments.

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
    backend::Backend,
    bankroll::{AdjustmentTarget, NewAdjustment},
    endpoints,
    form::{empty_string_as_none, non_blank, parse_amount},
};

#[derive(Debug, Clone)]
pub struct AdjustmentState<B: Backend> {
    pub backend: B,
}

impl<B: Backend> FromRef<AppState<B>> for AdjustmentState<B> {
    fn from_ref(state: &AppState<B>) -> Self {
        Self {
            backend: state.backend.clone(),
        }
    }
}

/// The form data for creating an adjustment.
#[derive(Debug, Deserialize)]
pub struct AdjustmentForm {
    pub target_type: AdjustmentTarget,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub target_id: Option<Uuid>,
    /// The signed amount as typed, a decimal comma is accepted.
    pub amount: String,
    #[serde(default)]
    pub note: String,
}

fn new_adjustment(form: &AdjustmentForm) -> Result<NewAdjustment, Error> {
    let target_id = form.target_id.ok_or_else(|| {
        Error::InvalidForm("Choose the account or payment method to adjust".to_owned())
    })?;

    let amount = parse_amount(&form.amount)
        .filter(|amount| *amount != 0.0)
        .ok_or_else(|| {
            Error::InvalidForm(
                "Enter a non-zero amount, negative to lower the balance".to_owned(),
            )
        })?;

    Ok(NewAdjustment {
        target_type: form.target_type,
        target_id,
        amount,
        note: non_blank(&form.note),
    })
}

/// A route handler for creating an adjustment, redirects to the balances page on success.
pub async fn create_adjustment_endpoint<B: Backend>(
    State(state): State<AdjustmentState<B>>,
    Form(form): Form<AdjustmentForm>,
) -> Response {
    let adjustment = match new_adjustment(&form) {
        Ok(adjustment) => adjustment,
        Err(error) => return error.into_alert_response(),
    };

    match state.backend.insert_adjustment(&adjustment).await {
        Ok(()) => (
            HxRedirect(endpoints::BALANCES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not create adjustment {adjustment:?}: {error}");
            error.into_alert_response()
        }
    }
}

/// A route handler for deleting an adjustment.
///
/// The backend restores the balance the adjustment changed.
pub async fn delete_adjustment_endpoint<B: Backend>(
    State(state): State<AdjustmentState<B>>,
    Path(adjustment_id): Path<Uuid>,
) -> Response {
    state
        .backend
        .delete_adjustment(adjustment_id)
        .await
        .map(|_| {
            (
                HxRedirect(endpoints::BALANCES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        })
        .inspect_err(|error| tracing::error!("Could not delete adjustment {adjustment_id}: {error}"))
        .unwrap_or_else(|error| error.into_alert_response())
}
