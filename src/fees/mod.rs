//! Lender people, who earn a fee for every bet placed with their accounts.

mod core;
mod fee_endpoints;
mod fees_page;

pub use core::{PersonFeeRow, check_withdrawal};
pub use fee_endpoints::{
    cancel_fee_withdrawal_endpoint, create_fee_person_endpoint, delete_fee_person_endpoint,
    withdraw_fee_endpoint,
};
pub use fees_page::get_fees_page;
