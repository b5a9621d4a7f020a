use uuid::Uuid;

use crate::Error;

/// A lender person's fees as summarised by the backend.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PersonFeeRow {
    pub person_name: String,
    /// The fee the person earns for every bet placed with their accounts.
    pub fee_per_bet: f64,
    pub accrued: f64,
    pub withdrawn: f64,
    /// `accrued - withdrawn`.
    pub available: f64,
    /// The most recent withdrawal, which is the only one that can be cancelled.
    pub last_withdrawal_id: Option<Uuid>,
}

/// Check that `amount` can be withdrawn from the person's available fees.
///
/// # Errors
/// Returns [Error::InvalidForm] if the amount is not positive or exceeds
/// the available fees.
pub fn check_withdrawal(row: &PersonFeeRow, amount: f64) -> Result<(), Error> {
    if amount <= 0.0 {
        return Err(Error::InvalidForm(
            "The amount must be greater than zero".to_owned(),
        ));
    }

    // Allow for rounding in the backend's numeric to float conversion.
    if amount > row.available + 1e-9 {
        return Err(Error::InvalidForm(format!(
            "{} only has {:.2} available",
            row.person_name, row.available
        )));
    }

    Ok(())
}
