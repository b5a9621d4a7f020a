//! Defines the endpoint for creating a bet with its legs and players.

use axum::{extract::State, response::Response};
use axum_extra::extract::Form;
use serde::Deserialize;
use time::{Date, Time};
use uuid::Uuid;

use crate::{
    Error,
    backend::Backend,
    betting::{BetMode, LegStatus, NewBetLeg, parse_leg_fields},
    form::{parse_date, parse_time},
};

use super::bet_endpoints::{BetState, redirect_to_bets};

/// The form data for creating a bet.
///
/// Each leg submits an `account_id`, `stake`, `odds` and `status` field, so
/// the legs arrive as parallel lists.
#[derive(Debug, Default, Deserialize)]
pub struct NewBetForm {
    pub match_date: String,
    pub match_time: String,
    #[serde(default)]
    pub mode: BetMode,
    #[serde(default)]
    pub account_id: Vec<String>,
    #[serde(default)]
    pub stake: Vec<String>,
    #[serde(default)]
    pub odds: Vec<String>,
    #[serde(default)]
    pub status: Vec<LegStatus>,
    /// The partners who played the bet.
    #[serde(default)]
    pub player: Vec<Uuid>,
}

/// A bet that passed validation.
#[derive(Debug, PartialEq)]
struct ValidBet {
    match_date: Date,
    match_time: Time,
    legs: Vec<NewBetLeg>,
    players: Vec<Uuid>,
}

fn validate_new_bet(form: &NewBetForm) -> Result<ValidBet, Error> {
    let (Some(match_date), Some(match_time)) =
        (parse_date(&form.match_date), parse_time(&form.match_time))
    else {
        return Err(Error::InvalidForm(
            "Enter the match date and time".to_owned(),
        ));
    };

    let leg_count = form.account_id.len();

    if leg_count == 0 {
        return Err(Error::InvalidForm(
            "A bet needs at least one leg".to_owned(),
        ));
    }

    if leg_count < form.mode.min_legs() {
        return Err(Error::InvalidForm(
            "A surebet needs at least two legs".to_owned(),
        ));
    }

    let legs = form
        .account_id
        .iter()
        .enumerate()
        .map(|(i, account_id)| {
            let field = |values: &[String]| values.get(i).cloned().unwrap_or_default();
            let (account_id, stake, odds) =
                parse_leg_fields(account_id, &field(&form.stake), &field(&form.odds))
                    .map_err(|problem| Error::InvalidForm(format!("Leg {}: {problem}", i + 1)))?;

            Ok(NewBetLeg {
                account_id,
                stake,
                odds,
                status: form.status.get(i).copied().unwrap_or(LegStatus::Open),
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(ValidBet {
        match_date,
        match_time,
        legs,
        players: form.player.clone(),
    })
}

/// Insert the bet, then its legs, then its players.
async fn save_bet<B: Backend>(backend: &B, bet: &ValidBet) -> Result<Uuid, Error> {
    let bet_id = backend.insert_bet(bet.match_date, bet.match_time).await?;
    backend.insert_bet_legs(bet_id, &bet.legs).await?;

    if !bet.players.is_empty() {
        backend.set_bet_players(bet_id, &bet.players).await?;
    }

    Ok(bet_id)
}

/// A route handler for creating a bet, redirects to the bets page on success.
pub async fn create_bet_endpoint<B: Backend>(
    State(state): State<BetState<B>>,
    Form(form): Form<NewBetForm>,
) -> Response {
    let bet = match validate_new_bet(&form) {
        Ok(bet) => bet,
        Err(error) => return error.into_alert_response(),
    };

    match save_bet(&state.backend, &bet).await {
        Ok(bet_id) => {
            tracing::debug!("Created bet {bet_id} with {} legs", bet.legs.len());
            redirect_to_bets()
        }
        Err(error) => {
            tracing::error!("Could not create bet {bet:?}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use time::macros::{date, time};
    use uuid::Uuid;

    use crate::{
        betting::{BetMode, LegStatus},
        endpoints,
        test_utils::{MemoryBackend, assert_alert_response, assert_hx_redirect},
    };

    use super::{NewBetForm, create_bet_endpoint, validate_new_bet};
    use crate::betting::bet_endpoints::BetState;

    fn surebet_form(first: Uuid, second: Uuid) -> NewBetForm {
        serde_html_form::from_str(&format!(
            "match_date=2025-03-02&match_time=20:45&mode=surebet\
            &account_id={first}&stake=10&odds=2,10&status=open\
            &account_id={second}&stake=9,5&odds=2.2&status=win"
        ))
        .expect("could not parse form")
    }

    #[tokio::test]
    async fn saves_bet_then_legs_then_players() {
        let backend = MemoryBackend::new();
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());
        let partner_id = Uuid::new_v4();
        let mut form = surebet_form(first, second);
        form.player = vec![partner_id];

        let response = create_bet_endpoint(
            State(BetState {
                backend: backend.clone(),
            }),
            Form(form),
        )
        .await;

        assert_hx_redirect(&response, endpoints::BETS_VIEW);
        let tables = backend.tables();
        let bet = &tables.bets[0];
        assert_eq!(bet.match_date, date!(2025 - 03 - 02));
        assert_eq!(bet.match_time, time!(20:45));

        assert_eq!(tables.bet_legs.len(), 2);
        assert!(tables.bet_legs.iter().all(|leg| leg.bet_id == bet.id));
        assert_eq!(tables.bet_legs[0].account_id, first);
        assert_eq!(tables.bet_legs[0].odds, 2.1);
        assert_eq!(tables.bet_legs[1].stake, 9.5);
        assert_eq!(tables.bet_legs[1].status, LegStatus::Win);

        assert_eq!(tables.bet_players.len(), 1);
        assert_eq!(tables.bet_players[0].partner_id, partner_id);
    }

    #[test]
    fn surebet_needs_two_legs() {
        let form: NewBetForm = serde_html_form::from_str(&format!(
            "match_date=2025-03-02&match_time=20:45&mode=surebet\
            &account_id={}&stake=10&odds=2&status=open",
            Uuid::new_v4()
        ))
        .unwrap();

        assert_eq!(form.mode, BetMode::Surebet);
        assert_eq!(
            validate_new_bet(&form).map(|_| ()),
            Err(crate::Error::InvalidForm(
                "A surebet needs at least two legs".to_owned()
            ))
        );
    }

    #[test]
    fn reports_the_failing_leg() {
        let mut form = surebet_form(Uuid::new_v4(), Uuid::new_v4());
        form.odds[1] = "1".to_owned();

        assert_eq!(
            validate_new_bet(&form).map(|_| ()),
            Err(crate::Error::InvalidForm(
                "Leg 2: enter odds greater than 1".to_owned()
            ))
        );
    }

    #[test]
    fn missing_status_defaults_to_open() {
        let mut form = surebet_form(Uuid::new_v4(), Uuid::new_v4());
        form.status.clear();

        let bet = validate_new_bet(&form).unwrap();

        assert!(bet.legs.iter().all(|leg| leg.status == LegStatus::Open));
    }

    #[tokio::test]
    async fn rejects_bet_without_date() {
        let backend = MemoryBackend::new();
        let mut form = surebet_form(Uuid::new_v4(), Uuid::new_v4());
        form.match_date.clear();

        let response = create_bet_endpoint(
            State(BetState {
                backend: backend.clone(),
            }),
            Form(form),
        )
        .await;

        assert_alert_response(
            response,
            StatusCode::BAD_REQUEST,
            "Enter the match date and time",
        )
        .await;
        assert!(backend.tables().bets.is_empty());
    }
}
