//! Endpoints for settling a bet leg and replacing its account, stake or odds.

use axum::{
    Form,
    extract::{Path, State},
    response::Response,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    Error,
    backend::{Backend, Procedure},
    betting::{LegStatus, parse_leg_fields},
};

use super::bet_endpoints::{BetState, call_and_redirect, redirect_to_bets};

#[derive(Debug, Deserialize)]
pub struct LegStatusForm {
    pub status: LegStatus,
}

/// A route handler for setting a leg to open, won or lost.
pub async fn set_leg_status_endpoint<B: Backend>(
    State(state): State<BetState<B>>,
    Path(leg_id): Path<Uuid>,
    Form(form): Form<LegStatusForm>,
) -> Response {
    state
        .backend
        .update_leg_status(leg_id, form.status)
        .await
        .map(|_| redirect_to_bets())
        .inspect_err(|error| {
            tracing::error!("Could not set leg {leg_id} to {}: {error}", form.status)
        })
        .unwrap_or_else(|error| error.into_alert_response())
}

/// The form data for replacing a leg.
#[derive(Debug, Deserialize)]
pub struct ReplaceLegForm {
    pub account_id: String,
    pub stake: String,
    pub odds: String,
}

/// A route handler for moving a leg to another account, stake or odds.
///
/// The backend rebalances the old and the new account.
pub async fn replace_leg_endpoint<B: Backend>(
    State(state): State<BetState<B>>,
    Path(leg_id): Path<Uuid>,
    Form(form): Form<ReplaceLegForm>,
) -> Response {
    let (new_account_id, new_stake, new_odds) =
        match parse_leg_fields(&form.account_id, &form.stake, &form.odds) {
            Ok(fields) => fields,
            Err(problem) => {
                return Error::InvalidForm(format!("Replacement leg: {problem}"))
                    .into_alert_response();
            }
        };

    call_and_redirect(
        &state.backend,
        Procedure::ReplaceBetLeg {
            leg_id,
            new_account_id,
            new_stake,
            new_odds,
        },
    )
    .await
}
