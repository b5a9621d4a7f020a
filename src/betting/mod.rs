//! Bets placed as one or more legs on bookmaker accounts.

mod bet_endpoints;
mod bets_page;
mod core;
mod create_endpoint;
mod leg_endpoints;

pub use bet_endpoints::{
    compute_allocations_endpoint, compute_fees_endpoint, delete_bet_endpoint, edit_bet_endpoint,
    set_bet_players_endpoint,
};
pub use bets_page::get_bets_page;
pub use core::{
    Bet, BetAllocation, BetBoard, BetLeg, BetMode, BetPlayer, BetSummary, LegStatus, NewBetLeg,
    organise_bets, parse_leg_fields, summarize_bets,
};
pub use create_endpoint::create_bet_endpoint;
pub use leg_endpoints::{replace_leg_endpoint, set_leg_status_endpoint};

#[cfg(test)]
pub(crate) use core::test_data;
