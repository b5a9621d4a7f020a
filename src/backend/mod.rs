//! The seam between the pages and the hosted database.
//!
//! The database owns every rule that moves money. The app reads rows, inserts
//! and updates a few tables directly, and invokes the rest as named
//! [procedures](Procedure).

mod postgres;

pub use postgres::PgBackend;

use std::future::Future;

use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use crate::{
    Error,
    bankroll::{
        Account, BalanceAdjustment, Bookmaker, NewAdjustment, NewTransaction, PaymentMethod,
        Person, Transaction,
    },
    betting::{Bet, BetAllocation, BetLeg, BetPlayer, LegStatus, NewBetLeg},
    fees::PersonFeeRow,
    partner::{CashOpKind, EquityEvent, Partner, PartnerCashOp},
};

/// A text column held a value the app does not know about.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown {kind} \"{value}\"")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: String) -> Self {
        Self { kind, value }
    }
}

/// A stored procedure of the backend with its typed arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Procedure {
    /// Delete a transaction and undo its effect on balances.
    DeleteTransactionAndRevert { tx_id: Uuid },
    /// Add a bookmaker and an account with it for every person.
    AddBookmakerAndAccounts { bookmaker_name: String },
    /// Add a person with an account at every bookmaker and a PayPal method.
    AddPersonAccountsWithDefaultPaypal { person_name: String },
    /// Record a partner deposit or withdrawal and mint or burn equity units.
    ApplyPartnerCashOp {
        partner_id: Uuid,
        kind: CashOpKind,
        amount: f64,
        payment_method_id: Option<Uuid>,
        note: Option<String>,
    },
    DeletePartnerCashOp { op_id: Uuid },
    CreateFeePerson { person_name: String, fee_per_bet: f64 },
    WithdrawPersonFee {
        person_name: String,
        amount: f64,
        payment_method_id: Uuid,
    },
    CancelPersonFeeWithdrawal { withdrawal_id: Uuid },
    /// Delete a lender person, refused by the backend while they still hold money.
    DeleteLenderPersonSafe { person_name: String },
    /// Delete a bet and revert the balances its legs touched.
    DeleteBetAndRevertSafe { bet_id: Uuid },
    /// Move a leg to another account, stake or odds and rebalance both accounts.
    ReplaceBetLeg {
        leg_id: Uuid,
        new_account_id: Uuid,
        new_stake: f64,
        new_odds: f64,
    },
    /// Store the partner allocations of a closed bet.
    ComputeBetAllocations { bet_id: Uuid },
    /// Accrue the lender fees of a bet.
    ComputeBetPersonFees { bet_id: Uuid },
}

impl Procedure {
    /// The name of the SQL function.
    pub fn name(&self) -> &'static str {
        match self {
            Procedure::DeleteTransactionAndRevert { .. } => "delete_transaction_and_revert",
            Procedure::AddBookmakerAndAccounts { .. } => "add_bookmaker_and_accounts",
            Procedure::AddPersonAccountsWithDefaultPaypal { .. } => {
                "add_person_accounts_with_default_paypal"
            }
            Procedure::ApplyPartnerCashOp { .. } => "apply_partner_cash_op",
            Procedure::DeletePartnerCashOp { .. } => "delete_partner_cash_op",
            Procedure::CreateFeePerson { .. } => "create_fee_person",
            Procedure::WithdrawPersonFee { .. } => "withdraw_person_fee",
            Procedure::CancelPersonFeeWithdrawal { .. } => "cancel_person_fee_withdrawal",
            Procedure::DeleteLenderPersonSafe { .. } => "delete_lender_person_safe",
            Procedure::DeleteBetAndRevertSafe { .. } => "delete_bet_and_revert_safe",
            Procedure::ReplaceBetLeg { .. } => "replace_bet_leg",
            Procedure::ComputeBetAllocations { .. } => "compute_bet_allocations",
            Procedure::ComputeBetPersonFees { .. } => "compute_bet_person_fees",
        }
    }
}

/// Reads, writes and procedure calls against the bookkeeping database.
///
/// Every method fails with [Error::Backend] carrying the database's message,
/// or [Error::NotFound] when an update or delete matched no row.
pub trait Backend: Clone + Send + Sync + 'static {
    /// All people, ordered by name.
    fn people(&self) -> impl Future<Output = Result<Vec<Person>, Error>> + Send;

    /// All bookmakers, ordered by name.
    fn bookmakers(&self) -> impl Future<Output = Result<Vec<Bookmaker>, Error>> + Send;

    /// All bookmaker accounts.
    fn accounts(&self) -> impl Future<Output = Result<Vec<Account>, Error>> + Send;

    /// All payment methods, including the external one.
    fn payment_methods(&self) -> impl Future<Output = Result<Vec<PaymentMethod>, Error>> + Send;

    /// The rows of the `v_payment_methods_panel` view.
    fn payment_methods_panel(
        &self,
    ) -> impl Future<Output = Result<Vec<PaymentMethod>, Error>> + Send;

    /// The latest `limit` transactions, newest first.
    fn recent_transactions(
        &self,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<Transaction>, Error>> + Send;

    /// The latest `limit` adjustments created at or after `since`, newest first.
    fn balance_adjustments(
        &self,
        since: Option<OffsetDateTime>,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<BalanceAdjustment>, Error>> + Send;

    /// All partners, ordered by name.
    fn partners(&self) -> impl Future<Output = Result<Vec<Partner>, Error>> + Send;

    /// All equity events, oldest first.
    fn equity_events(&self) -> impl Future<Output = Result<Vec<EquityEvent>, Error>> + Send;

    /// The bets with a match on or after `since`, latest match first.
    fn bets(&self, since: Option<Date>) -> impl Future<Output = Result<Vec<Bet>, Error>> + Send;

    /// All bet legs, ordered by creation time then id.
    fn bet_legs(&self) -> impl Future<Output = Result<Vec<BetLeg>, Error>> + Send;

    /// The partners who played each bet.
    fn bet_players(&self) -> impl Future<Output = Result<Vec<BetPlayer>, Error>> + Send;

    /// The stored partner allocations of every bet.
    fn bet_allocations(&self) -> impl Future<Output = Result<Vec<BetAllocation>, Error>> + Send;

    /// All partner cash operations, newest first.
    fn partner_cash_ops(&self) -> impl Future<Output = Result<Vec<PartnerCashOp>, Error>> + Send;

    /// The rows of the `v_people_fee_panel` view.
    fn people_fee_panel(&self) -> impl Future<Output = Result<Vec<PersonFeeRow>, Error>> + Send;

    /// The capital held in accounts and payment methods, money in transit included.
    fn current_capital(&self) -> impl Future<Output = Result<f64, Error>> + Send;

    /// Insert a transaction. The database applies it to the balances.
    fn insert_transaction(
        &self,
        transaction: &NewTransaction,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Set the status of a transaction to completed.
    fn complete_transaction(&self, id: Uuid) -> impl Future<Output = Result<(), Error>> + Send;

    /// Insert a balance adjustment.
    fn insert_adjustment(
        &self,
        adjustment: &NewAdjustment,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Delete a balance adjustment.
    fn delete_adjustment(&self, id: Uuid) -> impl Future<Output = Result<(), Error>> + Send;

    /// Insert a bet and return its id.
    fn insert_bet(
        &self,
        match_date: Date,
        match_time: Time,
    ) -> impl Future<Output = Result<Uuid, Error>> + Send;

    /// Insert the legs of a bet in one statement.
    fn insert_bet_legs(
        &self,
        bet_id: Uuid,
        legs: &[NewBetLeg],
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Replace the partners who played a bet.
    fn set_bet_players(
        &self,
        bet_id: Uuid,
        partner_ids: &[Uuid],
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Set the status of a bet leg.
    fn update_leg_status(
        &self,
        leg_id: Uuid,
        status: LegStatus,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Change the match date and time of a bet.
    fn update_bet_schedule(
        &self,
        bet_id: Uuid,
        match_date: Date,
        match_time: Time,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Invoke a stored procedure.
    fn call(&self, procedure: &Procedure) -> impl Future<Output = Result<(), Error>> + Send;
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::Procedure;

    #[test]
    fn procedure_names_match_sql_functions() {
        let cases = [
            (
                Procedure::DeleteTransactionAndRevert { tx_id: Uuid::nil() },
                "delete_transaction_and_revert",
            ),
            (
                Procedure::AddPersonAccountsWithDefaultPaypal {
                    person_name: "Mario".to_owned(),
                },
                "add_person_accounts_with_default_paypal",
            ),
            (
                Procedure::ReplaceBetLeg {
                    leg_id: Uuid::nil(),
                    new_account_id: Uuid::nil(),
                    new_stake: 10.0,
                    new_odds: 2.0,
                },
                "replace_bet_leg",
            ),
            (
                Procedure::ComputeBetPersonFees { bet_id: Uuid::nil() },
                "compute_bet_person_fees",
            ),
        ];

        for (procedure, want) in cases {
            assert_eq!(procedure.name(), want);
        }
    }
}
