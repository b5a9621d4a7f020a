//! Bets, their legs and the summaries shown on the bets and summary pages.

use std::{collections::HashMap, fmt};

use serde::Deserialize;
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use crate::{
    backend::UnknownVariant,
    form::parse_amount,
    grouping::{MonthGroup, group_by_month_day},
};

/// A bet on a match, placed as one or more legs.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Bet {
    pub id: Uuid,
    pub match_date: Date,
    pub match_time: Time,
    pub note: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegStatus {
    Open,
    Win,
    Loss,
}

impl LegStatus {
    pub const ALL: [LegStatus; 3] = [LegStatus::Open, LegStatus::Win, LegStatus::Loss];

    pub fn as_str(&self) -> &'static str {
        match self {
            LegStatus::Open => "open",
            LegStatus::Win => "win",
            LegStatus::Loss => "loss",
        }
    }
}

impl fmt::Display for LegStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LegStatus::Open => "Open",
            LegStatus::Win => "Won",
            LegStatus::Loss => "Lost",
        };

        f.write_str(label)
    }
}

impl TryFrom<String> for LegStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "open" => Ok(LegStatus::Open),
            "win" => Ok(LegStatus::Win),
            "loss" => Ok(LegStatus::Loss),
            _ => Err(UnknownVariant::new("bet leg status", value)),
        }
    }
}

/// A stake placed from one bookmaker account as part of a bet.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct BetLeg {
    pub id: Uuid,
    pub bet_id: Uuid,
    pub account_id: Uuid,
    pub stake: f64,
    pub odds: f64,
    #[sqlx(try_from = "String")]
    pub status: LegStatus,
    pub created_at: OffsetDateTime,
}

impl BetLeg {
    /// The amount paid out by the bookmaker, zero unless the leg won.
    pub fn payout(&self) -> f64 {
        match self.status {
            LegStatus::Win => self.stake * self.odds,
            LegStatus::Open | LegStatus::Loss => 0.0,
        }
    }
}

/// A validated leg ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBetLeg {
    pub account_id: Uuid,
    pub stake: f64,
    pub odds: f64,
    pub status: LegStatus,
}

/// Parse the account, stake and odds of a leg as typed into a form.
///
/// The stake must be greater than zero and the odds greater than 1. Both
/// accept a decimal comma. On failure, returns what the user should fix.
pub fn parse_leg_fields(
    account_id: &str,
    stake: &str,
    odds: &str,
) -> Result<(Uuid, f64, f64), &'static str> {
    let account_id = account_id
        .trim()
        .parse::<Uuid>()
        .map_err(|_| "choose the account")?;
    let stake = parse_amount(stake)
        .filter(|stake| *stake > 0.0)
        .ok_or("enter a stake greater than zero")?;
    let odds = parse_amount(odds)
        .filter(|odds| *odds > 1.0)
        .ok_or("enter odds greater than 1")?;

    Ok((account_id, stake, odds))
}

/// Whether a new bet is placed on one bookmaker or covered on several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetMode {
    #[default]
    Single,
    /// Two or more legs on different bookmakers.
    Surebet,
}

impl BetMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetMode::Single => "single",
            BetMode::Surebet => "surebet",
        }
    }

    /// The fewest legs a bet in this mode can have.
    pub fn min_legs(&self) -> usize {
        match self {
            BetMode::Single => 1,
            BetMode::Surebet => 2,
        }
    }
}

/// A partner who took part in a bet.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct BetPlayer {
    pub bet_id: Uuid,
    pub partner_id: Uuid,
}

/// A partner's share of a closed bet's profit as stored by the backend.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct BetAllocation {
    pub id: Uuid,
    pub bet_id: Uuid,
    pub partner_id: Uuid,
    pub amount: f64,
}

/// A bet with its legs and totals.
#[derive(Debug, Clone, PartialEq)]
pub struct BetSummary {
    pub bet: Bet,
    /// Sorted by creation time, then id.
    pub legs: Vec<BetLeg>,
    pub stake_total: f64,
    pub payout_total: f64,
    pub profit: f64,
    /// No leg is open.
    pub is_closed: bool,
}

impl BetSummary {
    fn new(bet: Bet, mut legs: Vec<BetLeg>) -> Self {
        legs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let stake_total: f64 = legs.iter().map(|leg| leg.stake).sum();
        let payout_total: f64 = legs.iter().map(BetLeg::payout).sum();
        let is_closed = legs.iter().all(|leg| leg.status != LegStatus::Open);

        Self {
            bet,
            legs,
            stake_total,
            payout_total,
            profit: payout_total - stake_total,
            is_closed,
        }
    }
}

/// Attach legs to their bets and compute the totals of each bet.
///
/// Bets keep their input order. Bets without legs are left out.
pub fn summarize_bets(bets: Vec<Bet>, legs: Vec<BetLeg>) -> Vec<BetSummary> {
    let mut legs_by_bet: HashMap<Uuid, Vec<BetLeg>> = HashMap::new();

    for leg in legs {
        legs_by_bet.entry(leg.bet_id).or_default().push(leg);
    }

    bets.into_iter()
        .filter_map(|bet| {
            let legs = legs_by_bet.remove(&bet.id)?;
            Some(BetSummary::new(bet, legs))
        })
        .collect()
}

/// Bets split into the ones still being played and the closed ones.
#[derive(Debug, Clone, PartialEq)]
pub struct BetBoard {
    /// Soonest match first.
    pub in_progress: Vec<BetSummary>,
    /// Grouped by match date with profit as the amount, newest first.
    pub closed: Vec<MonthGroup<BetSummary>>,
}

pub fn organise_bets(summaries: Vec<BetSummary>) -> BetBoard {
    let (mut in_progress, mut closed): (Vec<_>, Vec<_>) =
        summaries.into_iter().partition(|summary| !summary.is_closed);

    in_progress.sort_by_key(|summary| (summary.bet.match_date, summary.bet.match_time));
    closed.sort_by(|a, b| {
        (b.bet.match_date, b.bet.match_time).cmp(&(a.bet.match_date, a.bet.match_time))
    });

    BetBoard {
        in_progress,
        closed: group_by_month_day(closed, |summary| (summary.bet.match_date, summary.profit)),
    }
}

#[cfg(test)]
pub(crate) mod test_data {
    use time::{Date, OffsetDateTime, Time};
    use uuid::Uuid;

    use super::{Bet, BetLeg, LegStatus};

    pub(crate) fn bet(match_date: Date, match_time: Time) -> Bet {
        Bet {
            id: Uuid::new_v4(),
            match_date,
            match_time,
            note: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    pub(crate) fn leg(bet: &Bet, stake: f64, odds: f64, status: LegStatus) -> BetLeg {
        BetLeg {
            id: Uuid::new_v4(),
            bet_id: bet.id,
            account_id: Uuid::new_v4(),
            stake,
            odds,
            status,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }
}
