//! The bankroll: people, bookmaker accounts, payment methods, transactions and
//! balance adjustments.

mod adjustment_endpoints;
mod balances_page;
mod core;
mod registry_endpoints;
mod transaction_endpoints;

pub use adjustment_endpoints::{create_adjustment_endpoint, delete_adjustment_endpoint};
pub use balances_page::get_balances_page;
pub use core::{
    Account, AdjustmentTarget, BalanceAdjustment, Bookmaker, NewAdjustment, NewTransaction,
    PaymentMethod, Person, Transaction, TransactionKind, TransactionStatus,
};
pub use registry_endpoints::{create_bookmaker_endpoint, create_person_endpoint};
pub use transaction_endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, mark_transaction_arrived_endpoint,
};

#[cfg(test)]
pub(crate) use core::{BASELINE_NOTE, test_data};
