//! [Backend] on a PostgreSQL connection pool.

use sqlx::PgPool;
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use crate::{
    Error,
    backend::{Backend, Procedure},
    bankroll::{
        Account, BalanceAdjustment, Bookmaker, NewAdjustment, NewTransaction, PaymentMethod,
        Person, Transaction,
    },
    betting::{Bet, BetAllocation, BetLeg, BetPlayer, LegStatus, NewBetLeg},
    fees::PersonFeeRow,
    partner::{EquityEvent, Partner, PartnerCashOp},
};

const SELECT_TRANSACTIONS: &str = "SELECT id, created_at, tx_kind, status,
        amount::float8 AS amount, note, from_payment_method_id, from_account_id,
        to_payment_method_id, to_account_id
    FROM transactions
    ORDER BY created_at DESC
    LIMIT $1";

const INSERT_TRANSACTION: &str = "INSERT INTO transactions (tx_kind, status, amount, note,
        from_payment_method_id, from_account_id, to_payment_method_id, to_account_id)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)";

const SELECT_ADJUSTMENTS: &str = "SELECT id, created_at, target_type, target_id,
        amount::float8 AS amount, note
    FROM balance_adjustments
    WHERE $1::timestamptz IS NULL OR created_at >= $1
    ORDER BY created_at DESC
    LIMIT $2";

const INSERT_ADJUSTMENT: &str = "INSERT INTO balance_adjustments
        (target_type, target_id, amount, note)
    VALUES ($1, $2, $3, $4)";

const SELECT_BET_LEGS: &str = "SELECT id, bet_id, account_id, stake::float8 AS stake,
        odds::float8 AS odds, status, created_at
    FROM bet_legs
    ORDER BY created_at, id";

const INSERT_BET_LEG: &str = "INSERT INTO bet_legs (bet_id, account_id, stake, odds, status)
    VALUES ($1, $2, $3, $4, $5)";

const UPDATE_LEG_STATUS: &str = "UPDATE bet_legs SET status = $2 WHERE id = $1";

const SELECT_CASH_OPS: &str = "SELECT id, created_at, partner_id, kind,
        amount::float8 AS amount, payment_method_id, note
    FROM partner_cash_ops
    ORDER BY created_at DESC";

/// Reads and writes the bookkeeping tables with `sqlx`.
///
/// Numeric columns are cast to `float8` so they decode as `f64`. Columns
/// holding a fixed set of values (`tx_kind`, `status`, `target_type` and
/// `kind`) are plain `text`. They are bound and read as strings and parsed
/// by the app.
#[derive(Debug, Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    /// Create a backend that runs its queries on `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn expect_one_row(rows_affected: u64) -> Result<(), Error> {
    if rows_affected == 0 {
        Err(Error::NotFound)
    } else {
        Ok(())
    }
}

impl Backend for PgBackend {
    async fn people(&self) -> Result<Vec<Person>, Error> {
        let people = sqlx::query_as::<_, Person>("SELECT name FROM people ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(people)
    }

    async fn bookmakers(&self) -> Result<Vec<Bookmaker>, Error> {
        let bookmakers = sqlx::query_as::<_, Bookmaker>("SELECT name FROM bookmakers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(bookmakers)
    }

    async fn accounts(&self) -> Result<Vec<Account>, Error> {
        let accounts = sqlx::query_as::<_, Account>(
            "SELECT id, person_name, bookmaker_name, balance::float8 AS balance
            FROM accounts
            ORDER BY bookmaker_name, person_name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    async fn payment_methods(&self) -> Result<Vec<PaymentMethod>, Error> {
        let methods = sqlx::query_as::<_, PaymentMethod>(
            "SELECT id, owner_name, label, balance::float8 AS balance,
                pending_incoming::float8 AS pending_incoming
            FROM payment_methods
            ORDER BY owner_name, label",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(methods)
    }

    async fn payment_methods_panel(&self) -> Result<Vec<PaymentMethod>, Error> {
        let rows = sqlx::query_as::<_, PaymentMethod>(
            "SELECT id, owner_name, label, balance::float8 AS balance,
                pending_incoming::float8 AS pending_incoming
            FROM v_payment_methods_panel
            ORDER BY owner_name, label",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn recent_transactions(&self, limit: i64) -> Result<Vec<Transaction>, Error> {
        let transactions = sqlx::query_as::<_, Transaction>(SELECT_TRANSACTIONS)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(transactions)
    }

    async fn balance_adjustments(
        &self,
        since: Option<OffsetDateTime>,
        limit: i64,
    ) -> Result<Vec<BalanceAdjustment>, Error> {
        let adjustments = sqlx::query_as::<_, BalanceAdjustment>(SELECT_ADJUSTMENTS)
            .bind(since)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(adjustments)
    }

    async fn partners(&self) -> Result<Vec<Partner>, Error> {
        let partners = sqlx::query_as::<_, Partner>("SELECT id, name FROM partners ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(partners)
    }

    async fn equity_events(&self) -> Result<Vec<EquityEvent>, Error> {
        let events = sqlx::query_as::<_, EquityEvent>(
            "SELECT id, created_at, partner_id, cash_in::float8 AS cash_in,
                units_minted::float8 AS units_minted, note
            FROM equity_events
            ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn bets(&self, since: Option<Date>) -> Result<Vec<Bet>, Error> {
        let bets = sqlx::query_as::<_, Bet>(
            "SELECT id, match_date, match_time, note, created_at
            FROM bets
            WHERE $1::date IS NULL OR match_date >= $1
            ORDER BY match_date DESC, match_time DESC",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(bets)
    }

    async fn bet_legs(&self) -> Result<Vec<BetLeg>, Error> {
        let legs = sqlx::query_as::<_, BetLeg>(SELECT_BET_LEGS)
            .fetch_all(&self.pool)
            .await?;

        Ok(legs)
    }

    async fn bet_players(&self) -> Result<Vec<BetPlayer>, Error> {
        let players = sqlx::query_as::<_, BetPlayer>("SELECT bet_id, partner_id FROM bet_players")
            .fetch_all(&self.pool)
            .await?;

        Ok(players)
    }

    async fn bet_allocations(&self) -> Result<Vec<BetAllocation>, Error> {
        let allocations = sqlx::query_as::<_, BetAllocation>(
            "SELECT id, bet_id, partner_id, amount::float8 AS amount FROM bet_allocations",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(allocations)
    }

    async fn partner_cash_ops(&self) -> Result<Vec<PartnerCashOp>, Error> {
        let ops = sqlx::query_as::<_, PartnerCashOp>(SELECT_CASH_OPS)
            .fetch_all(&self.pool)
            .await?;

        Ok(ops)
    }

    async fn people_fee_panel(&self) -> Result<Vec<PersonFeeRow>, Error> {
        let rows = sqlx::query_as::<_, PersonFeeRow>(
            "SELECT person_name, fee_per_bet::float8 AS fee_per_bet, accrued::float8 AS accrued,
                withdrawn::float8 AS withdrawn, available::float8 AS available,
                last_withdrawal_id
            FROM v_people_fee_panel
            ORDER BY person_name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn current_capital(&self) -> Result<f64, Error> {
        let capital = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT current_capital_including_transit()::float8",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(capital.unwrap_or(0.0))
    }

    async fn insert_transaction(&self, transaction: &NewTransaction) -> Result<(), Error> {
        sqlx::query(INSERT_TRANSACTION)
            .bind(transaction.kind.as_str())
            .bind(transaction.status.as_str())
            .bind(transaction.amount)
            .bind(transaction.note.as_deref())
            .bind(transaction.from_payment_method_id)
            .bind(transaction.from_account_id)
            .bind(transaction.to_payment_method_id)
            .bind(transaction.to_account_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn complete_transaction(&self, id: Uuid) -> Result<(), Error> {
        let result = sqlx::query("UPDATE transactions SET status = 'completed' WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        expect_one_row(result.rows_affected())
    }

    async fn insert_adjustment(&self, adjustment: &NewAdjustment) -> Result<(), Error> {
        sqlx::query(INSERT_ADJUSTMENT)
            .bind(adjustment.target_type.as_str())
            .bind(adjustment.target_id)
            .bind(adjustment.amount)
            .bind(adjustment.note.as_deref())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_adjustment(&self, id: Uuid) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM balance_adjustments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        expect_one_row(result.rows_affected())
    }

    async fn insert_bet(&self, match_date: Date, match_time: Time) -> Result<Uuid, Error> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO bets (match_date, match_time) VALUES ($1, $2) RETURNING id",
        )
        .bind(match_date)
        .bind(match_time)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn insert_bet_legs(&self, bet_id: Uuid, legs: &[NewBetLeg]) -> Result<(), Error> {
        let mut db_transaction = self.pool.begin().await?;

        for leg in legs {
            sqlx::query(INSERT_BET_LEG)
                .bind(bet_id)
                .bind(leg.account_id)
                .bind(leg.stake)
                .bind(leg.odds)
                .bind(leg.status.as_str())
                .execute(&mut *db_transaction)
                .await?;
        }

        db_transaction.commit().await?;

        Ok(())
    }

    async fn set_bet_players(&self, bet_id: Uuid, partner_ids: &[Uuid]) -> Result<(), Error> {
        let mut db_transaction = self.pool.begin().await?;

        sqlx::query("DELETE FROM bet_players WHERE bet_id = $1")
            .bind(bet_id)
            .execute(&mut *db_transaction)
            .await?;

        for partner_id in partner_ids {
            sqlx::query("INSERT INTO bet_players (bet_id, partner_id) VALUES ($1, $2)")
                .bind(bet_id)
                .bind(*partner_id)
                .execute(&mut *db_transaction)
                .await?;
        }

        db_transaction.commit().await?;

        Ok(())
    }

    async fn update_leg_status(&self, leg_id: Uuid, status: LegStatus) -> Result<(), Error> {
        let result = sqlx::query(UPDATE_LEG_STATUS)
            .bind(leg_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        expect_one_row(result.rows_affected())
    }

    async fn update_bet_schedule(
        &self,
        bet_id: Uuid,
        match_date: Date,
        match_time: Time,
    ) -> Result<(), Error> {
        let result = sqlx::query("UPDATE bets SET match_date = $2, match_time = $3 WHERE id = $1")
            .bind(bet_id)
            .bind(match_date)
            .bind(match_time)
            .execute(&self.pool)
            .await?;

        expect_one_row(result.rows_affected())
    }

    async fn call(&self, procedure: &Procedure) -> Result<(), Error> {
        tracing::debug!("calling procedure {}", procedure.name());

        // Amounts are cast to numeric so that they resolve against the
        // function signatures whether those take numeric or float8.
        let query = match procedure {
            Procedure::DeleteTransactionAndRevert { tx_id } => {
                sqlx::query("SELECT delete_transaction_and_revert(tx_id => $1)").bind(*tx_id)
            }
            Procedure::AddBookmakerAndAccounts { bookmaker_name } => {
                sqlx::query("SELECT add_bookmaker_and_accounts(p_bookmaker_name => $1)")
                    .bind(bookmaker_name.as_str())
            }
            Procedure::AddPersonAccountsWithDefaultPaypal { person_name } => sqlx::query(
                "SELECT add_person_accounts_with_default_paypal(p_person_name => $1)",
            )
            .bind(person_name.as_str()),
            Procedure::ApplyPartnerCashOp {
                partner_id,
                kind,
                amount,
                payment_method_id,
                note,
            } => sqlx::query(
                "SELECT apply_partner_cash_op(
                    p_partner_id => $1,
                    p_kind => $2,
                    p_amount => $3::numeric,
                    p_payment_method_id => $4,
                    p_note => $5
                )",
            )
            .bind(*partner_id)
            .bind(kind.as_str())
            .bind(*amount)
            .bind(*payment_method_id)
            .bind(note.as_deref()),
            Procedure::DeletePartnerCashOp { op_id } => {
                sqlx::query("SELECT delete_partner_cash_op(p_op_id => $1)").bind(*op_id)
            }
            Procedure::CreateFeePerson {
                person_name,
                fee_per_bet,
            } => sqlx::query(
                "SELECT create_fee_person(p_person_name => $1, p_fee_per_bet => $2::numeric)",
            )
            .bind(person_name.as_str())
            .bind(*fee_per_bet),
            Procedure::WithdrawPersonFee {
                person_name,
                amount,
                payment_method_id,
            } => sqlx::query(
                "SELECT withdraw_person_fee(
                    p_person_name => $1,
                    p_amount => $2::numeric,
                    p_payment_method_id => $3
                )",
            )
            .bind(person_name.as_str())
            .bind(*amount)
            .bind(*payment_method_id),
            Procedure::CancelPersonFeeWithdrawal { withdrawal_id } => {
                sqlx::query("SELECT cancel_person_fee_withdrawal(p_withdrawal_id => $1)")
                    .bind(*withdrawal_id)
            }
            Procedure::DeleteLenderPersonSafe { person_name } => {
                sqlx::query("SELECT delete_lender_person_safe(p_person_name => $1)")
                    .bind(person_name.as_str())
            }
            Procedure::DeleteBetAndRevertSafe { bet_id } => {
                sqlx::query("SELECT delete_bet_and_revert_safe(p_bet_id => $1)").bind(*bet_id)
            }
            Procedure::ReplaceBetLeg {
                leg_id,
                new_account_id,
                new_stake,
                new_odds,
            } => sqlx::query(
                "SELECT replace_bet_leg(
                    p_leg_id => $1,
                    p_new_account_id => $2,
                    p_new_stake => $3::numeric,
                    p_new_odds => $4::numeric
                )",
            )
            .bind(*leg_id)
            .bind(*new_account_id)
            .bind(*new_stake)
            .bind(*new_odds),
            Procedure::ComputeBetAllocations { bet_id } => {
                sqlx::query("SELECT compute_bet_allocations(p_bet_id => $1)").bind(*bet_id)
            }
            Procedure::ComputeBetPersonFees { bet_id } => {
                sqlx::query("SELECT compute_bet_person_fees(p_bet_id => $1)").bind(*bet_id)
            }
        };

        query.execute(&self.pool).await?;

        Ok(())
    }
}
