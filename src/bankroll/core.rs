//! The people, bookmaker accounts, payment methods and money movements of the bankroll.

use std::fmt;

use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::backend::UnknownVariant;

/// The note that marks an adjustment as the initial balance of an account or method.
pub const BASELINE_NOTE: &str = "set saldo a valore";

/// The label of the payment method that stands for money outside the bankroll.
pub const EXTERNAL_METHOD_LABEL: &str = "__ESTERNO__";

/// Whether an adjustment note marks a baseline (initial balance) adjustment.
///
/// Baseline adjustments are listed separately and excluded from profit/loss.
pub fn is_baseline_adjustment(note: Option<&str>) -> bool {
    note.is_some_and(|note| note.trim().to_lowercase() == BASELINE_NOTE)
}

/// A person who owns bookmaker accounts and payment methods.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Person {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Bookmaker {
    pub name: String,
}

impl Bookmaker {
    /// The path of the bookmaker's logo under the static directory.
    pub fn logo_path(&self) -> String {
        format!("/static/bookmakers/{}.png", bookmaker_slug(&self.name))
    }
}

/// The lowercase alphanumeric form of a bookmaker name, e.g. "Bet 365" is "bet365".
pub fn bookmaker_slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// The balance a person holds with a bookmaker.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub person_name: String,
    pub bookmaker_name: String,
    pub balance: f64,
}

impl Account {
    /// The option label, e.g. "Snai - Mario".
    pub fn label(&self) -> String {
        format!("{} - {}", self.bookmaker_name, self.person_name)
    }
}

/// A bank account, card or wallet that money moves through on its way to and
/// from bookmaker accounts.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PaymentMethod {
    pub id: Uuid,
    pub owner_name: String,
    pub label: String,
    pub balance: f64,
    /// Money from withdrawals that has not arrived yet.
    pub pending_incoming: f64,
}

impl PaymentMethod {
    /// The option label, e.g. "PayPal (Mario)".
    pub fn option_label(&self) -> String {
        format!("{} ({})", self.label, self.owner_name)
    }

    pub fn is_external(&self) -> bool {
        self.label == EXTERNAL_METHOD_LABEL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// From a payment method to a bookmaker account.
    Deposit,
    /// From a bookmaker account to a payment method.
    Withdraw,
    /// From a payment method to another payment method.
    Transfer,
    /// A correction recorded by the backend.
    Adjust,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdraw => "withdraw",
            TransactionKind::Transfer => "transfer",
            TransactionKind::Adjust => "adjust",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdraw => "Withdrawal",
            TransactionKind::Transfer => "Transfer",
            TransactionKind::Adjust => "Adjustment",
        };

        f.write_str(label)
    }
}

impl TryFrom<String> for TransactionKind {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "deposit" => Ok(TransactionKind::Deposit),
            "withdraw" => Ok(TransactionKind::Withdraw),
            "transfer" => Ok(TransactionKind::Transfer),
            "adjust" => Ok(TransactionKind::Adjust),
            _ => Err(UnknownVariant::new("transaction kind", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<String> for TransactionStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(TransactionStatus::Pending),
            "completed" => Ok(TransactionStatus::Completed),
            "cancelled" => Ok(TransactionStatus::Cancelled),
            _ => Err(UnknownVariant::new("transaction status", value)),
        }
    }
}

/// A movement of money between payment methods and bookmaker accounts.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub created_at: OffsetDateTime,
    #[sqlx(rename = "tx_kind", try_from = "String")]
    pub kind: TransactionKind,
    #[sqlx(try_from = "String")]
    pub status: TransactionStatus,
    pub amount: f64,
    pub note: Option<String>,
    pub from_payment_method_id: Option<Uuid>,
    pub from_account_id: Option<Uuid>,
    pub to_payment_method_id: Option<Uuid>,
    pub to_account_id: Option<Uuid>,
}

impl Transaction {
    /// Whether the transaction is a withdrawal whose money has not arrived yet.
    pub fn is_pending_withdrawal(&self) -> bool {
        self.kind == TransactionKind::Withdraw && self.status == TransactionStatus::Pending
    }
}

/// A validated transaction ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub amount: f64,
    pub note: Option<String>,
    pub from_payment_method_id: Option<Uuid>,
    pub from_account_id: Option<Uuid>,
    pub to_payment_method_id: Option<Uuid>,
    pub to_account_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentTarget {
    Account,
    PaymentMethod,
}

impl AdjustmentTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentTarget::Account => "account",
            AdjustmentTarget::PaymentMethod => "payment_method",
        }
    }
}

impl TryFrom<String> for AdjustmentTarget {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "account" => Ok(AdjustmentTarget::Account),
            "payment_method" => Ok(AdjustmentTarget::PaymentMethod),
            _ => Err(UnknownVariant::new("adjustment target", value)),
        }
    }
}

/// A manual signed correction to the balance of an account or payment method.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct BalanceAdjustment {
    pub id: Uuid,
    pub created_at: OffsetDateTime,
    #[sqlx(try_from = "String")]
    pub target_type: AdjustmentTarget,
    pub target_id: Uuid,
    pub amount: f64,
    pub note: Option<String>,
}

impl BalanceAdjustment {
    pub fn is_baseline(&self) -> bool {
        is_baseline_adjustment(self.note.as_deref())
    }
}

/// A validated adjustment ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAdjustment {
    pub target_type: AdjustmentTarget,
    pub target_id: Uuid,
    pub amount: f64,
    pub note: Option<String>,
}

#[cfg(test)]
pub(crate) mod test_data {
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::{
        Account, AdjustmentTarget, BalanceAdjustment, Bookmaker, PaymentMethod, Person,
        Transaction, TransactionKind, TransactionStatus,
    };

    pub(crate) fn person(name: &str) -> Person {
        Person {
            name: name.to_owned(),
        }
    }

    pub(crate) fn bookmaker(name: &str) -> Bookmaker {
        Bookmaker {
            name: name.to_owned(),
        }
    }

    pub(crate) fn account(person_name: &str, bookmaker_name: &str, balance: f64) -> Account {
        Account {
            id: Uuid::new_v4(),
            person_name: person_name.to_owned(),
            bookmaker_name: bookmaker_name.to_owned(),
            balance,
        }
    }

    pub(crate) fn method(owner_name: &str, label: &str, balance: f64) -> PaymentMethod {
        PaymentMethod {
            id: Uuid::new_v4(),
            owner_name: owner_name.to_owned(),
            label: label.to_owned(),
            balance,
            pending_incoming: 0.0,
        }
    }

    pub(crate) fn withdrawal(
        from: &Account,
        to: &PaymentMethod,
        amount: f64,
        created_at: OffsetDateTime,
    ) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            created_at,
            kind: TransactionKind::Withdraw,
            status: TransactionStatus::Pending,
            amount,
            note: None,
            from_payment_method_id: None,
            from_account_id: Some(from.id),
            to_payment_method_id: Some(to.id),
            to_account_id: None,
        }
    }

    pub(crate) fn adjustment(
        account: &Account,
        amount: f64,
        note: Option<&str>,
        created_at: OffsetDateTime,
    ) -> BalanceAdjustment {
        BalanceAdjustment {
            id: Uuid::new_v4(),
            created_at,
            target_type: AdjustmentTarget::Account,
            target_id: account.id,
            amount,
            note: note.map(str::to_owned),
        }
    }
}
