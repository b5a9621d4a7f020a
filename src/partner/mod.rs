//! Partners, their equity in the bankroll and their share of bet profits.

mod allocation;
mod cash_op_endpoints;
mod core;
mod partners_page;
mod quota;

pub use allocation::allocate_bet_profit;
pub use cash_op_endpoints::{apply_cash_op_endpoint, delete_cash_op_endpoint};
pub use core::{CashOpKind, EquityEvent, Partner, PartnerCashOp};
pub use partners_page::get_partners_page;
pub use quota::{PartnerShares, partner_shares};

#[cfg(test)]
pub(crate) use quota::test_data;
