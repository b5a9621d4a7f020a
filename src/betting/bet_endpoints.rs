//! Endpoints that act on a whole bet: rescheduling, deleting, choosing its
//! players and asking the backend to compute its allocations and fees.

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState, Error,
    backend::{Backend, Procedure},
    endpoints,
    form::{parse_date, parse_time},
};

/// The state needed by the bet and leg endpoints.
#[derive(Debug, Clone)]
pub struct BetState<B: Backend> {
    pub backend: B,
}

impl<B: Backend> FromRef<AppState<B>> for BetState<B> {
    fn from_ref(state: &AppState<B>) -> Self {
        Self {
            backend: state.backend.clone(),
        }
    }
}

pub(super) fn redirect_to_bets() -> Response {
    (
        HxRedirect(endpoints::BETS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

pub(super) async fn call_and_redirect<B: Backend>(backend: &B, procedure: Procedure) -> Response {
    backend
        .call(&procedure)
        .await
        .map(|_| redirect_to_bets())
        .inspect_err(|error| tracing::error!("Could not call {procedure:?}: {error}"))
        .unwrap_or_else(|error| error.into_alert_response())
}

/// The form data for moving a bet to another date and time.
#[derive(Debug, Deserialize)]
pub struct ScheduleForm {
    pub match_date: String,
    pub match_time: String,
}

/// A route handler for changing the match date and time of a bet.
pub async fn edit_bet_endpoint<B: Backend>(
    State(state): State<BetState<B>>,
    Path(bet_id): Path<Uuid>,
    Form(form): Form<ScheduleForm>,
) -> Response {
    let (Some(match_date), Some(match_time)) =
        (parse_date(&form.match_date), parse_time(&form.match_time))
    else {
        return Error::InvalidForm("Enter the match date and time".to_owned()).into_alert_response();
    };

    state
        .backend
        .update_bet_schedule(bet_id, match_date, match_time)
        .await
        .map(|_| redirect_to_bets())
        .inspect_err(|error| tracing::error!("Could not reschedule bet {bet_id}: {error}"))
        .unwrap_or_else(|error| error.into_alert_response())
}

/// A route handler for deleting a bet and reverting the balances its legs touched.
pub async fn delete_bet_endpoint<B: Backend>(
    State(state): State<BetState<B>>,
    Path(bet_id): Path<Uuid>,
) -> Response {
    call_and_redirect(&state.backend, Procedure::DeleteBetAndRevertSafe { bet_id }).await
}

/// The form data for choosing the partners who played a bet.
///
/// No checked box submits no field, which clears the players.
#[derive(Debug, Default, Deserialize)]
pub struct PlayersForm {
    #[serde(default)]
    pub player: Vec<Uuid>,
}

/// A route handler for replacing the players of a bet.
pub async fn set_bet_players_endpoint<B: Backend>(
    State(state): State<BetState<B>>,
    Path(bet_id): Path<Uuid>,
    Form(form): Form<PlayersForm>,
) -> Response {
    state
        .backend
        .set_bet_players(bet_id, &form.player)
        .await
        .map(|_| redirect_to_bets())
        .inspect_err(|error| tracing::error!("Could not set the players of bet {bet_id}: {error}"))
        .unwrap_or_else(|error| error.into_alert_response())
}

/// A route handler for storing the partner allocations of a closed bet.
pub async fn compute_allocations_endpoint<B: Backend>(
    State(state): State<BetState<B>>,
    Path(bet_id): Path<Uuid>,
) -> Response {
    call_and_redirect(&state.backend, Procedure::ComputeBetAllocations { bet_id }).await
}

/// A route handler for accruing the lender fees of a bet.
pub async fn compute_fees_endpoint<B: Backend>(
    State(state): State<BetState<B>>,
    Path(bet_id): Path<Uuid>,
) -> Response {
    call_and_redirect(&state.backend, Procedure::ComputeBetPersonFees { bet_id }).await
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use time::macros::{date, time};
    use uuid::Uuid;

    use crate::{
        backend::Procedure,
        betting::test_data::bet,
        endpoints,
        test_utils::{MemoryBackend, assert_alert_response, assert_hx_redirect},
    };

    use super::{
        BetState, PlayersForm, ScheduleForm, compute_allocations_endpoint, compute_fees_endpoint,
        delete_bet_endpoint, edit_bet_endpoint, set_bet_players_endpoint,
    };

    fn state(backend: &MemoryBackend) -> BetState<MemoryBackend> {
        BetState {
            backend: backend.clone(),
        }
    }

    #[tokio::test]
    async fn reschedules_bet() {
        let backend = MemoryBackend::new();
        let existing = bet(date!(2025 - 03 - 01), time!(18:00));
        backend.tables().bets.push(existing.clone());

        let response = edit_bet_endpoint(
            State(state(&backend)),
            Path(existing.id),
            Form(ScheduleForm {
                match_date: "2025-03-02".to_owned(),
                match_time: "20:45".to_owned(),
            }),
        )
        .await;

        assert_hx_redirect(&response, endpoints::BETS_VIEW);
        let tables = backend.tables();
        assert_eq!(tables.bets[0].match_date, date!(2025 - 03 - 02));
        assert_eq!(tables.bets[0].match_time, time!(20:45));
    }

    #[tokio::test]
    async fn reschedule_needs_date_and_time() {
        let backend = MemoryBackend::new();

        let response = edit_bet_endpoint(
            State(state(&backend)),
            Path(Uuid::new_v4()),
            Form(ScheduleForm {
                match_date: "2025-03-02".to_owned(),
                match_time: String::new(),
            }),
        )
        .await;

        assert_alert_response(
            response,
            StatusCode::BAD_REQUEST,
            "Enter the match date and time",
        )
        .await;
    }

    #[tokio::test]
    async fn replaces_players() {
        let backend = MemoryBackend::new();
        let bet_id = Uuid::new_v4();
        let partner_id = Uuid::new_v4();

        let response = set_bet_players_endpoint(
            State(state(&backend)),
            Path(bet_id),
            Form(PlayersForm {
                player: vec![partner_id],
            }),
        )
        .await;
        assert_hx_redirect(&response, endpoints::BETS_VIEW);

        set_bet_players_endpoint(
            State(state(&backend)),
            Path(bet_id),
            Form(PlayersForm::default()),
        )
        .await;

        assert!(backend.tables().bet_players.is_empty());
    }

    #[tokio::test]
    async fn bet_procedures_are_called_with_the_bet_id() {
        let backend = MemoryBackend::new();
        let bet_id = Uuid::new_v4();

        let responses = [
            delete_bet_endpoint(State(state(&backend)), Path(bet_id)).await,
            compute_allocations_endpoint(State(state(&backend)), Path(bet_id)).await,
            compute_fees_endpoint(State(state(&backend)), Path(bet_id)).await,
        ];

        for response in &responses {
            assert_hx_redirect(response, endpoints::BETS_VIEW);
        }
        assert_eq!(
            backend.calls(),
            vec![
                Procedure::DeleteBetAndRevertSafe { bet_id },
                Procedure::ComputeBetAllocations { bet_id },
                Procedure::ComputeBetPersonFees { bet_id },
            ]
        );
    }

    #[tokio::test]
    async fn refused_delete_shows_backend_message() {
        let backend = MemoryBackend::failing("bet has allocations, delete them first");

        let response = delete_bet_endpoint(State(state(&backend)), Path(Uuid::new_v4())).await;

        assert_alert_response(
            response,
            StatusCode::UNPROCESSABLE_ENTITY,
            "bet has allocations, delete them first",
        )
        .await;
    }
}
