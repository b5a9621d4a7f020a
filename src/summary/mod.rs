//! The summary of the bankroll: capital, partner shares and profit/loss over time.

mod chart;
mod profit_loss;
mod summary_page;

pub use profit_loss::{MonthProfit, lookback_start, monthly_profit_loss};
pub use summary_page::get_summary_page;
