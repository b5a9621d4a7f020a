//! Endpoints for lender people: creating them, withdrawing their fees,
//! cancelling the last withdrawal and deleting them.

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
    fees::check_withdrawal,
    form::{empty_string_as_none, non_blank, parse_amount},
};

/// The state needed by the fee endpoints.
#[derive(Debug, Clone)]
pub struct FeeState<B: Backend> {
    pub backend: B,
}

impl<B: Backend> FromRef<AppState<B>> for FeeState<B> {
    fn from_ref(state: &AppState<B>) -> Self {
        Self {
            backend: state.backend.clone(),
        }
    }
}

async fn call_and_redirect<B: Backend>(backend: &B, procedure: Procedure) -> Response {
    backend
        .call(&procedure)
        .await
        .map(|_| (HxRedirect(endpoints::FEES_VIEW.to_owned()), StatusCode::SEE_OTHER).into_response())
        .inspect_err(|error| tracing::error!("Could not call {}: {error}", procedure.name()))
        .unwrap_or_else(|error| error.into_alert_response())
}

#[derive(Debug, Deserialize)]
pub struct FeePersonForm {
    pub name: String,
    pub fee_per_bet: String,
}

fn fee_person_procedure(form: &FeePersonForm) -> Result<Procedure, Error> {
    let person_name = non_blank(&form.name)
        .ok_or_else(|| Error::InvalidForm("Enter the person's name".to_owned()))?;
    let fee_per_bet = parse_amount(&form.fee_per_bet)
        .filter(|fee| *fee >= 0.0)
        .ok_or_else(|| Error::InvalidForm("Enter a fee of zero or more".to_owned()))?;

    Ok(Procedure::CreateFeePerson {
        person_name,
        fee_per_bet,
    })
}

/// A route handler for adding a lender person with their fee per bet.
pub async fn create_fee_person_endpoint<B: Backend>(
    State(state): State<FeeState<B>>,
    Form(form): Form<FeePersonForm>,
) -> Response {
    match fee_person_procedure(&form) {
        Ok(procedure) => call_and_redirect(&state.backend, procedure).await,
        Err(error) => error.into_alert_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct FeeWithdrawalForm {
    pub person_name: String,
    pub amount: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub payment_method_id: Option<Uuid>,
}

/// A route handler for paying out part of a lender's available fees.
///
/// The amount is checked against the person's row of the fee panel before
/// the backend is asked to record the withdrawal.
pub async fn withdraw_fee_endpoint<B: Backend>(
    State(state): State<FeeState<B>>,
    Form(form): Form<FeeWithdrawalForm>,
) -> Response {
    let Some(amount) = parse_amount(&form.amount).filter(|amount| *amount > 0.0) else {
        return Error::InvalidForm("Enter an amount greater than zero".to_owned())
            .into_alert_response();
    };
    let Some(payment_method_id) = form.payment_method_id else {
        return Error::InvalidForm("Choose the payment method".to_owned()).into_alert_response();
    };

    let panel = match state.backend.people_fee_panel().await {
        Ok(panel) => panel,
        Err(error) => {
            tracing::error!("Could not load the fee panel: {error}");
            return error.into_alert_response();
        }
    };
    let Some(row) = panel.iter().find(|row| row.person_name == form.person_name) else {
        return Error::NotFound.into_alert_response();
    };

    if let Err(error) = check_withdrawal(row, amount) {
        return error.into_alert_response();
    }

    call_and_redirect(
        &state.backend,
        Procedure::WithdrawPersonFee {
            person_name: form.person_name,
            amount,
            payment_method_id,
        },
    )
    .await
}

/// A route handler for cancelling a lender's most recent withdrawal.
pub async fn cancel_fee_withdrawal_endpoint<B: Backend>(
    State(state): State<FeeState<B>>,
    Path(withdrawal_id): Path<Uuid>,
) -> Response {
    call_and_redirect(
        &state.backend,
        Procedure::CancelPersonFeeWithdrawal { withdrawal_id },
    )
    .await
}

/// A route handler for deleting a lender person.
///
/// The backend refuses while the person still has fees or accounts with money.
pub async fn delete_fee_person_endpoint<B: Backend>(
    State(state): State<FeeState<B>>,
    Path(person_name): Path<String>,
) -> Response {
    call_and_redirect(
        &state.backend,
        Procedure::DeleteLenderPersonSafe { person_name },
    )
    .await
}

#[cfg(test)]
mod tests {
    use axum::{
        Form,
        extract::{Path, State},
        http::StatusCode,
    };
    use uuid::Uuid;

    use crate::{
        backend::Procedure,
        endpoints,
        fees::PersonFeeRow,
        test_utils::{MemoryBackend, assert_alert_response, assert_hx_redirect},
    };

    use super::{
        FeePersonForm, FeeState, FeeWithdrawalForm, cancel_fee_withdrawal_endpoint,
        create_fee_person_endpoint, delete_fee_person_endpoint, withdraw_fee_endpoint,
    };

    fn state(backend: &MemoryBackend) -> FeeState<MemoryBackend> {
        FeeState {
            backend: backend.clone(),
        }
    }

    fn backend_with_lender(available: f64) -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend.tables().people_fee_panel = vec![PersonFeeRow {
            person_name: "Luca".to_owned(),
            fee_per_bet: 5.0,
            accrued: 50.0,
            withdrawn: 50.0 - available,
            available,
            last_withdrawal_id: None,
        }];
        backend
    }

    fn withdrawal(amount: &str) -> FeeWithdrawalForm {
        FeeWithdrawalForm {
            person_name: "Luca".to_owned(),
            amount: amount.to_owned(),
            payment_method_id: Some(Uuid::nil()),
        }
    }

    #[tokio::test]
    async fn creates_lender_with_zero_fee() {
        let backend = MemoryBackend::new();

        let response = create_fee_person_endpoint(
            State(state(&backend)),
            Form(FeePersonForm {
                name: " Luca ".to_owned(),
                fee_per_bet: "0".to_owned(),
            }),
        )
        .await;

        assert_hx_redirect(&response, endpoints::FEES_VIEW);
        assert_eq!(
            backend.calls(),
            vec![Procedure::CreateFeePerson {
                person_name: "Luca".to_owned(),
                fee_per_bet: 0.0,
            }]
        );
    }

    #[tokio::test]
    async fn rejects_negative_fee_and_blank_name() {
        let backend = MemoryBackend::new();

        let response = create_fee_person_endpoint(
            State(state(&backend)),
            Form(FeePersonForm {
                name: "Luca".to_owned(),
                fee_per_bet: "-1".to_owned(),
            }),
        )
        .await;
        assert_alert_response(response, StatusCode::BAD_REQUEST, "Enter a fee of zero or more")
            .await;

        let response = create_fee_person_endpoint(
            State(state(&backend)),
            Form(FeePersonForm {
                name: "  ".to_owned(),
                fee_per_bet: "5".to_owned(),
            }),
        )
        .await;
        assert_alert_response(response, StatusCode::BAD_REQUEST, "Enter the person's name").await;

        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn withdraws_up_to_available() {
        let backend = backend_with_lender(30.0);

        let response = withdraw_fee_endpoint(State(state(&backend)), Form(withdrawal("30,00"))).await;

        assert_hx_redirect(&response, endpoints::FEES_VIEW);
        assert_eq!(
            backend.calls(),
            vec![Procedure::WithdrawPersonFee {
                person_name: "Luca".to_owned(),
                amount: 30.0,
                payment_method_id: Uuid::nil(),
            }]
        );
    }

    #[tokio::test]
    async fn refuses_withdrawal_above_available_before_calling_backend() {
        let backend = backend_with_lender(30.0);

        let response = withdraw_fee_endpoint(State(state(&backend)), Form(withdrawal("30.01"))).await;

        assert_alert_response(
            response,
            StatusCode::BAD_REQUEST,
            "Luca only has 30.00 available",
        )
        .await;
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn withdrawal_for_unknown_person_is_not_found() {
        let backend = MemoryBackend::new();

        let response = withdraw_fee_endpoint(State(state(&backend)), Form(withdrawal("10"))).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn withdrawal_needs_payment_method() {
        let backend = backend_with_lender(30.0);
        let mut form = withdrawal("10");
        form.payment_method_id = None;

        let response = withdraw_fee_endpoint(State(state(&backend)), Form(form)).await;

        assert_alert_response(response, StatusCode::BAD_REQUEST, "Choose the payment method")
            .await;
    }

    #[tokio::test]
    async fn cancels_withdrawal_and_deletes_lender() {
        let backend = MemoryBackend::new();
        let withdrawal_id = Uuid::new_v4();

        let responses = [
            cancel_fee_withdrawal_endpoint(State(state(&backend)), Path(withdrawal_id)).await,
            delete_fee_person_endpoint(State(state(&backend)), Path("Luca Bianchi".to_owned()))
                .await,
        ];

        for response in &responses {
            assert_hx_redirect(response, endpoints::FEES_VIEW);
        }
        assert_eq!(
            backend.calls(),
            vec![
                Procedure::CancelPersonFeeWithdrawal { withdrawal_id },
                Procedure::DeleteLenderPersonSafe {
                    person_name: "Luca Bianchi".to_owned()
                },
            ]
        );
    }
}
