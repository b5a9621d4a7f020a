//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/bets/{bet_id}', use [format_endpoint].

use std::fmt::Display;

/// The root route which redirects to the balances page.
pub const ROOT: &str = "/";
/// The page with the bookmaker matrix, payment methods, adjustments and transactions.
pub const BALANCES_VIEW: &str = "/balances";
/// The page for entering bets and reviewing open and closed bets.
pub const BETS_VIEW: &str = "/bets";
/// The page with capital KPIs, partner shares and monthly profit/loss.
pub const SUMMARY_VIEW: &str = "/summary";
/// The page for partner cash operations.
pub const PARTNERS_VIEW: &str = "/partners";
/// The page for lender people and their fees.
pub const FEES_VIEW: &str = "/fees";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";

/// The route to create a transaction.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to delete a transaction and revert its effect on balances.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to mark a pending withdrawal as arrived.
pub const TRANSACTION_ARRIVED: &str = "/api/transactions/{transaction_id}/arrived";

/// The route to create a balance adjustment.
pub const ADJUSTMENTS_API: &str = "/api/adjustments";
/// The route to delete a balance adjustment.
pub const ADJUSTMENT: &str = "/api/adjustments/{adjustment_id}";

/// The route to add a bookmaker along with an account for every person.
pub const BOOKMAKERS_API: &str = "/api/bookmakers";
/// The route to add a person along with their accounts and default payment method.
pub const PEOPLE_API: &str = "/api/people";

/// The route to create a bet with its legs.
pub const BETS_API: &str = "/api/bets";
/// The route to edit the schedule of a bet or delete it.
pub const BET: &str = "/api/bets/{bet_id}";
/// The route to replace the players of a bet.
pub const BET_PLAYERS: &str = "/api/bets/{bet_id}/players";
/// The route to compute the stored profit allocations of a bet.
pub const BET_ALLOCATIONS: &str = "/api/bets/{bet_id}/allocations";
/// The route to compute the lender fees of a bet.
pub const BET_FEES: &str = "/api/bets/{bet_id}/fees";

/// The route to replace the account, stake and odds of a bet leg.
pub const BET_LEG: &str = "/api/bet_legs/{leg_id}";
/// The route to set the status of a bet leg.
pub const BET_LEG_STATUS: &str = "/api/bet_legs/{leg_id}/status";

/// The route to apply a partner cash operation.
pub const PARTNER_CASH_OPS_API: &str = "/api/partner_cash_ops";
/// The route to delete a partner cash operation.
pub const PARTNER_CASH_OP: &str = "/api/partner_cash_ops/{op_id}";

/// The route to create a lender person with a fee per bet.
pub const FEE_PEOPLE_API: &str = "/api/fee_people";
/// The route to delete a lender person.
pub const FEE_PERSON: &str = "/api/fee_people/{person_name}";
/// The route to withdraw from a lender's available fees.
pub const FEE_WITHDRAWALS_API: &str = "/api/fee_people/withdrawals";
/// The route to cancel a fee withdrawal.
pub const FEE_WITHDRAWAL: &str = "/api/fee_people/withdrawals/{withdrawal_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/bets/{bet_id}', '{bet_id}' is the parameter.
///
/// Characters of `id` that are not allowed in a path segment are
/// percent-encoded, so names with spaces can be used as parameters.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl Display) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        encode_path_segment(&id.to_string()),
        &endpoint_path[param_end..]
    )
}

fn encode_path_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());

    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }

    encoded
}
