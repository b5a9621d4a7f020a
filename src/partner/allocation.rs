//! Splitting a closed bet's profit between partners with a bonus for the partners who played.

use std::collections::HashSet;

use uuid::Uuid;

/// The fraction of a bet's profit moved from the partners who did not play to
/// the partners who did.
pub const BONUS_RATE: f64 = 0.10;

/// A partner's part of a bet's profit.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfitShare {
    pub partner_id: Uuid,
    pub amount: f64,
}

/// Split `profit` between the partners in `quotas`.
///
/// Every partner gets `profit × quota`. When some but not all partners
/// played, a pool of [BONUS_RATE] × `profit` is added to the players in
/// proportion to their quotas and taken from the non-players in proportion
/// to theirs. A negative profit moves the pool the other way.
///
/// Shares come back in the order of `quotas`. When the quotas sum to a
/// positive value, the last share absorbs the floating point remainder so
/// that the shares sum to `profit × Σ quota`.
pub fn allocate_bet_profit(
    profit: f64,
    quotas: &[(Uuid, f64)],
    players: &HashSet<Uuid>,
) -> Vec<ProfitShare> {
    let quota_sum: f64 = quotas.iter().map(|(_, quota)| quota).sum();
    let player_quota: f64 = quotas
        .iter()
        .filter(|(partner_id, _)| players.contains(partner_id))
        .map(|(_, quota)| quota)
        .sum();
    let non_player_quota = quota_sum - player_quota;
    let player_count = quotas
        .iter()
        .filter(|(partner_id, _)| players.contains(partner_id))
        .count();

    let is_proper_subset = player_count > 0 && player_count < quotas.len();
    let has_bonus = is_proper_subset && player_quota > 0.0 && non_player_quota > 0.0;
    let pool = BONUS_RATE * profit;

    let mut shares: Vec<ProfitShare> = quotas
        .iter()
        .map(|(partner_id, quota)| {
            let base = profit * quota;
            let amount = if !has_bonus {
                base
            } else if players.contains(partner_id) {
                base + pool * quota / player_quota
            } else {
                base - pool * quota / non_player_quota
            };

            ProfitShare {
                partner_id: *partner_id,
                amount,
            }
        })
        .collect();

    if quota_sum > 0.0 {
        let target = profit * quota_sum;

        if let Some((last, rest)) = shares.split_last_mut() {
            let rest_total: f64 = rest.iter().map(|share| share.amount).sum();
            last.amount = target - rest_total;
        }
    }

    shares
}
