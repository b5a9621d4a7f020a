use std::fmt;

use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::backend::UnknownVariant;

/// An equity holder who funds the bankroll.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Partner {
    pub id: Uuid,
    pub name: String,
}

/// Cash a partner put in (or took out) and the equity units minted (or burned) for it.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct EquityEvent {
    pub id: Uuid,
    pub created_at: OffsetDateTime,
    pub partner_id: Uuid,
    pub cash_in: f64,
    pub units_minted: f64,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashOpKind {
    Deposit,
    Withdraw,
}

impl CashOpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CashOpKind::Deposit => "deposit",
            CashOpKind::Withdraw => "withdraw",
        }
    }
}

impl fmt::Display for CashOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CashOpKind::Deposit => f.write_str("Deposit"),
            CashOpKind::Withdraw => f.write_str("Withdrawal"),
        }
    }
}

impl TryFrom<String> for CashOpKind {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "deposit" => Ok(CashOpKind::Deposit),
            "withdraw" => Ok(CashOpKind::Withdraw),
            _ => Err(UnknownVariant::new("partner cash operation kind", value)),
        }
    }
}

/// A partner depositing into or withdrawing from the bankroll.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PartnerCashOp {
    pub id: Uuid,
    pub created_at: OffsetDateTime,
    pub partner_id: Uuid,
    #[sqlx(try_from = "String")]
    pub kind: CashOpKind,
    pub amount: f64,
    pub payment_method_id: Option<Uuid>,
    pub note: Option<String>,
}

impl PartnerCashOp {
    /// The amount with withdrawals counted as negative.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            CashOpKind::Deposit => self.amount,
            CashOpKind::Withdraw => -self.amount,
        }
    }
}
