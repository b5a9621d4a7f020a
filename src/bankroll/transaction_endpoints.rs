//! Endpoints for creating transactions, marking withdrawals as arrived and
//! deleting transactions.

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
    bankroll::{NewTransaction, TransactionKind, TransactionStatus},
    endpoints,
    form::{empty_string_as_none, non_blank, parse_amount},
};

/// The state needed to create, complete or delete a transaction.
#[derive(Debug, Clone)]
pub struct TransactionState<B: Backend> {
    pub backend: B,
}

impl<B: Backend> FromRef<AppState<B>> for TransactionState<B> {
    fn from_ref(state: &AppState<B>) -> Self {
        Self {
            backend: state.backend.clone(),
        }
    }
}

/// The form data for creating a transaction.
///
/// `from_id` and `to_id` refer to a payment method or an account depending on
/// `kind`.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    pub kind: TransactionKind,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub from_id: Option<Uuid>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub to_id: Option<Uuid>,
    /// The amount as typed, a decimal comma is accepted.
    pub amount: String,
    /// Only used by withdrawals, which are pending unless stated otherwise.
    #[serde(default)]
    pub status: Option<TransactionStatus>,
    #[serde(default)]
    pub note: String,
}

/// Check `form` and turn it into a transaction for the backend.
///
/// Deposits and transfers are always completed. Withdrawals keep the chosen
/// status so that money in transit can be tracked.
fn new_transaction(form: &TransactionForm) -> Result<NewTransaction, Error> {
    let amount = parse_amount(&form.amount)
        .filter(|amount| *amount > 0.0)
        .ok_or_else(|| Error::InvalidForm("Enter an amount greater than zero".to_owned()))?;

    let (from, to) = match (form.from_id, form.to_id) {
        (Some(from), Some(to)) => (from, to),
        _ => {
            let message = match form.kind {
                TransactionKind::Deposit => "Deposit: choose the payment method and the account",
                TransactionKind::Withdraw => "Withdrawal: choose the account and the payment method",
                TransactionKind::Transfer => "Transfer: choose both payment methods",
                TransactionKind::Adjust => "Adjustments are entered with the adjustment form",
            };
            return Err(Error::InvalidForm(message.to_owned()));
        }
    };

    let mut transaction = NewTransaction {
        kind: form.kind,
        status: TransactionStatus::Completed,
        amount,
        note: non_blank(&form.note),
        from_payment_method_id: None,
        from_account_id: None,
        to_payment_method_id: None,
        to_account_id: None,
    };

    match form.kind {
        TransactionKind::Deposit => {
            transaction.from_payment_method_id = Some(from);
            transaction.to_account_id = Some(to);
        }
        TransactionKind::Withdraw => {
            transaction.status = form.status.unwrap_or(TransactionStatus::Pending);
            transaction.from_account_id = Some(from);
            transaction.to_payment_method_id = Some(to);
        }
        TransactionKind::Transfer => {
            transaction.from_payment_method_id = Some(from);
            transaction.to_payment_method_id = Some(to);
        }
        TransactionKind::Adjust => {
            return Err(Error::InvalidForm(
                "Adjustments are entered with the adjustment form".to_owned(),
            ));
        }
    }

    Ok(transaction)
}

/// A route handler for creating a transaction, redirects to the balances page on success.
pub async fn create_transaction_endpoint<B: Backend>(
    State(state): State<TransactionState<B>>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let transaction = match new_transaction(&form) {
        Ok(transaction) => transaction,
        Err(error) => return error.into_alert_response(),
    };

    match state.backend.insert_transaction(&transaction).await {
        Ok(()) => (
            HxRedirect(endpoints::BALANCES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not create transaction {transaction:?}: {error}");
            error.into_alert_response()
        }
    }
}

/// A route handler for marking a pending withdrawal as arrived.
pub async fn mark_transaction_arrived_endpoint<B: Backend>(
    State(state): State<TransactionState<B>>,
    Path(transaction_id): Path<Uuid>,
) -> Response {
    state
        .backend
        .complete_transaction(transaction_id)
        .await
        .map(|_| {
            (
                HxRedirect(endpoints::BALANCES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        })
        .inspect_err(|error| {
            tracing::error!("Could not mark transaction {transaction_id} as arrived: {error}")
        })
        .unwrap_or_else(|error| error.into_alert_response())
}

/// A route handler for deleting a transaction and reverting its effect on balances.
pub async fn delete_transaction_endpoint<B: Backend>(
    State(state): State<TransactionState<B>>,
    Path(transaction_id): Path<Uuid>,
) -> Response {
    let procedure = Procedure::DeleteTransactionAndRevert {
        tx_id: transaction_id,
    };

    state
        .backend
        .call(&procedure)
        .await
        .map(|_| {
            (
                HxRedirect(endpoints::BALANCES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        })
        .inspect_err(|error| tracing::error!("Could not delete transaction {transaction_id}: {error}"))
        .unwrap_or_else(|error| error.into_alert_response())
}
