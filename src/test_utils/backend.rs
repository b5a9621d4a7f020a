use std::sync::{Arc, Mutex, MutexGuard};

use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use crate::{
    Error,
    backend::{Backend, Procedure},
    bankroll::{
        Account, BalanceAdjustment, Bookmaker, NewAdjustment, NewTransaction, PaymentMethod,
        Person, Transaction, TransactionStatus,
    },
    betting::{Bet, BetAllocation, BetLeg, BetPlayer, LegStatus, NewBetLeg},
    fees::PersonFeeRow,
    partner::{EquityEvent, Partner, PartnerCashOp},
};

/// The rows held by a [MemoryBackend].
#[derive(Debug, Default)]
pub(crate) struct MemoryTables {
    pub(crate) people: Vec<Person>,
    pub(crate) bookmakers: Vec<Bookmaker>,
    pub(crate) accounts: Vec<Account>,
    pub(crate) payment_methods: Vec<PaymentMethod>,
    pub(crate) payment_methods_panel: Vec<PaymentMethod>,
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) adjustments: Vec<BalanceAdjustment>,
    pub(crate) partners: Vec<Partner>,
    pub(crate) equity_events: Vec<EquityEvent>,
    pub(crate) bets: Vec<Bet>,
    pub(crate) bet_legs: Vec<BetLeg>,
    pub(crate) bet_players: Vec<BetPlayer>,
    pub(crate) bet_allocations: Vec<BetAllocation>,
    pub(crate) partner_cash_ops: Vec<PartnerCashOp>,
    pub(crate) people_fee_panel: Vec<PersonFeeRow>,
    pub(crate) capital: f64,
    /// Every procedure called, in order.
    pub(crate) calls: Vec<Procedure>,
    /// When set, every read and write fails with this message.
    pub(crate) failure: Option<String>,
}

impl MemoryTables {
    fn check_failure(&self) -> Result<(), Error> {
        match &self.failure {
            Some(message) => Err(Error::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

/// A [Backend] that keeps its tables in memory for handler tests.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryBackend {
    tables: Arc<Mutex<MemoryTables>>,
}

impl MemoryBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A backend where every call fails with `message`.
    pub(crate) fn failing(message: &str) -> Self {
        let backend = Self::default();
        backend.tables().failure = Some(message.to_owned());
        backend
    }

    pub(crate) fn tables(&self) -> MutexGuard<'_, MemoryTables> {
        self.tables.lock().expect("memory backend lock poisoned")
    }

    pub(crate) fn calls(&self) -> Vec<Procedure> {
        self.tables().calls.clone()
    }

    fn read(&self) -> Result<MutexGuard<'_, MemoryTables>, Error> {
        let tables = self.tables();
        tables.check_failure()?;
        Ok(tables)
    }
}

impl Backend for MemoryBackend {
    async fn people(&self) -> Result<Vec<Person>, Error> {
        Ok(self.read()?.people.clone())
    }

    async fn bookmakers(&self) -> Result<Vec<Bookmaker>, Error> {
        Ok(self.read()?.bookmakers.clone())
    }

    async fn accounts(&self) -> Result<Vec<Account>, Error> {
        Ok(self.read()?.accounts.clone())
    }

    async fn payment_methods(&self) -> Result<Vec<PaymentMethod>, Error> {
        Ok(self.read()?.payment_methods.clone())
    }

    async fn payment_methods_panel(&self) -> Result<Vec<PaymentMethod>, Error> {
        Ok(self.read()?.payment_methods_panel.clone())
    }

    async fn recent_transactions(&self, limit: i64) -> Result<Vec<Transaction>, Error> {
        let mut transactions = self.read()?.transactions.clone();
        transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        transactions.truncate(limit as usize);

        Ok(transactions)
    }

    async fn balance_adjustments(
        &self,
        since: Option<OffsetDateTime>,
        limit: i64,
    ) -> Result<Vec<BalanceAdjustment>, Error> {
        let mut adjustments: Vec<_> = self
            .read()?
            .adjustments
            .iter()
            .filter(|adjustment| since.is_none_or(|since| adjustment.created_at >= since))
            .cloned()
            .collect();
        adjustments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        adjustments.truncate(limit as usize);

        Ok(adjustments)
    }

    async fn partners(&self) -> Result<Vec<Partner>, Error> {
        Ok(self.read()?.partners.clone())
    }

    async fn equity_events(&self) -> Result<Vec<EquityEvent>, Error> {
        Ok(self.read()?.equity_events.clone())
    }

    async fn bets(&self, since: Option<Date>) -> Result<Vec<Bet>, Error> {
        let mut bets: Vec<_> = self
            .read()?
            .bets
            .iter()
            .filter(|bet| since.is_none_or(|since| bet.match_date >= since))
            .cloned()
            .collect();
        bets.sort_by(|a, b| (b.match_date, b.match_time).cmp(&(a.match_date, a.match_time)));

        Ok(bets)
    }

    async fn bet_legs(&self) -> Result<Vec<BetLeg>, Error> {
        Ok(self.read()?.bet_legs.clone())
    }

    async fn bet_players(&self) -> Result<Vec<BetPlayer>, Error> {
        Ok(self.read()?.bet_players.clone())
    }

    async fn bet_allocations(&self) -> Result<Vec<BetAllocation>, Error> {
        Ok(self.read()?.bet_allocations.clone())
    }

    async fn partner_cash_ops(&self) -> Result<Vec<PartnerCashOp>, Error> {
        Ok(self.read()?.partner_cash_ops.clone())
    }

    async fn people_fee_panel(&self) -> Result<Vec<PersonFeeRow>, Error> {
        Ok(self.read()?.people_fee_panel.clone())
    }

    async fn current_capital(&self) -> Result<f64, Error> {
        Ok(self.read()?.capital)
    }

    async fn insert_transaction(&self, transaction: &NewTransaction) -> Result<(), Error> {
        self.read()?.transactions.push(Transaction {
            id: Uuid::new_v4(),
            created_at: OffsetDateTime::now_utc(),
            kind: transaction.kind,
            status: transaction.status,
            amount: transaction.amount,
            note: transaction.note.clone(),
            from_payment_method_id: transaction.from_payment_method_id,
            from_account_id: transaction.from_account_id,
            to_payment_method_id: transaction.to_payment_method_id,
            to_account_id: transaction.to_account_id,
        });

        Ok(())
    }

    async fn complete_transaction(&self, id: Uuid) -> Result<(), Error> {
        let mut tables = self.read()?;
        let transaction = tables
            .transactions
            .iter_mut()
            .find(|transaction| transaction.id == id)
            .ok_or(Error::NotFound)?;
        transaction.status = TransactionStatus::Completed;

        Ok(())
    }

    async fn insert_adjustment(&self, adjustment: &NewAdjustment) -> Result<(), Error> {
        self.read()?.adjustments.push(BalanceAdjustment {
            id: Uuid::new_v4(),
            created_at: OffsetDateTime::now_utc(),
            target_type: adjustment.target_type,
            target_id: adjustment.target_id,
            amount: adjustment.amount,
            note: adjustment.note.clone(),
        });

        Ok(())
    }

    async fn delete_adjustment(&self, id: Uuid) -> Result<(), Error> {
        let mut tables = self.read()?;
        let count = tables.adjustments.len();
        tables.adjustments.retain(|adjustment| adjustment.id != id);

        if tables.adjustments.len() == count {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }

    async fn insert_bet(&self, match_date: Date, match_time: Time) -> Result<Uuid, Error> {
        let id = Uuid::new_v4();
        self.read()?.bets.push(Bet {
            id,
            match_date,
            match_time,
            note: None,
            created_at: OffsetDateTime::now_utc(),
        });

        Ok(id)
    }

    async fn insert_bet_legs(&self, bet_id: Uuid, legs: &[NewBetLeg]) -> Result<(), Error> {
        let mut tables = self.read()?;

        for leg in legs {
            tables.bet_legs.push(BetLeg {
                id: Uuid::new_v4(),
                bet_id,
                account_id: leg.account_id,
                stake: leg.stake,
                odds: leg.odds,
                status: leg.status,
                created_at: OffsetDateTime::now_utc(),
            });
        }

        Ok(())
    }

    async fn set_bet_players(&self, bet_id: Uuid, partner_ids: &[Uuid]) -> Result<(), Error> {
        let mut tables = self.read()?;
        tables.bet_players.retain(|player| player.bet_id != bet_id);
        tables
            .bet_players
            .extend(partner_ids.iter().map(|partner_id| BetPlayer {
                bet_id,
                partner_id: *partner_id,
            }));

        Ok(())
    }

    async fn update_leg_status(&self, leg_id: Uuid, status: LegStatus) -> Result<(), Error> {
        let mut tables = self.read()?;
        let leg = tables
            .bet_legs
            .iter_mut()
            .find(|leg| leg.id == leg_id)
            .ok_or(Error::NotFound)?;
        leg.status = status;

        Ok(())
    }

    async fn update_bet_schedule(
        &self,
        bet_id: Uuid,
        match_date: Date,
        match_time: Time,
    ) -> Result<(), Error> {
        let mut tables = self.read()?;
        let bet = tables
            .bets
            .iter_mut()
            .find(|bet| bet.id == bet_id)
            .ok_or(Error::NotFound)?;
        bet.match_date = match_date;
        bet.match_time = match_time;

        Ok(())
    }

    async fn call(&self, procedure: &Procedure) -> Result<(), Error> {
        self.read()?.calls.push(procedure.clone());

        Ok(())
    }
}
