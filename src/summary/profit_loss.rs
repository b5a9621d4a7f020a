//! Daily and monthly profit/loss from closed bets and balance adjustments.

use std::collections::BTreeMap;

use time::{Date, Duration};
use time_tz::Tz;

use crate::{
    bankroll::BalanceAdjustment,
    betting::BetSummary,
    grouping::{group_by_month_day, local_day},
};

/// How many days back the profit/loss reaches.
pub const LOOKBACK_DAYS: i64 = 400;

/// The first day inside the lookback window ending `today`.
pub fn lookback_start(today: Date) -> Date {
    today - Duration::days(LOOKBACK_DAYS)
}

/// The profit or loss of one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayProfit {
    pub day: Date,
    /// The profit of the bets closed with a match on this day.
    pub bet: f64,
    /// The sum of the adjustments made on this day.
    pub adjustment: f64,
}

impl DayProfit {
    pub fn total(&self) -> f64 {
        self.bet + self.adjustment
    }
}

/// The profit or loss of one month with its days, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthProfit {
    /// The first day of the month.
    pub month: Date,
    pub bet: f64,
    pub adjustment: f64,
    pub total: f64,
    pub days: Vec<DayProfit>,
}

/// Bucket closed-bet profit by match date and adjustments by local day.
///
/// Bets still in progress, baseline adjustments and anything before `since`
/// are left out. Months and days come newest first.
pub fn monthly_profit_loss(
    bets: &[BetSummary],
    adjustments: &[BalanceAdjustment],
    timezone: &Tz,
    since: Date,
) -> Vec<MonthProfit> {
    let mut days: BTreeMap<Date, DayProfit> = BTreeMap::new();
    let empty_day = |day| DayProfit {
        day,
        bet: 0.0,
        adjustment: 0.0,
    };

    for summary in bets {
        let day = summary.bet.match_date;

        if summary.is_closed && day >= since {
            days.entry(day).or_insert_with(|| empty_day(day)).bet += summary.profit;
        }
    }

    for adjustment in adjustments {
        let day = local_day(adjustment.created_at, timezone);

        if !adjustment.is_baseline() && day >= since {
            days.entry(day).or_insert_with(|| empty_day(day)).adjustment += adjustment.amount;
        }
    }

    let newest_first: Vec<DayProfit> = days.into_values().rev().collect();

    group_by_month_day(newest_first, |day| (day.day, day.total()))
        .into_iter()
        .map(|month| {
            let days: Vec<DayProfit> = month
                .days
                .into_iter()
                .flat_map(|day| day.items)
                .collect();

            MonthProfit {
                month: month.month,
                bet: days.iter().map(|day| day.bet).sum(),
                adjustment: days.iter().map(|day| day.adjustment).sum(),
                total: month.total,
                days,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime, time};

    use crate::{
        bankroll::{
            BASELINE_NOTE,
            test_data::{account, adjustment},
        },
        betting::{
            LegStatus, summarize_bets,
            test_data::{bet, leg},
        },
        timezone::local_timezone,
    };

    use super::{DayProfit, lookback_start, monthly_profit_loss};

    #[test]
    fn combines_bets_and_adjustments_per_day() {
        let won = bet(date!(2025 - 03 - 02), time!(20:45));
        let lost = bet(date!(2025 - 02 - 10), time!(18:00));
        let open = bet(date!(2025 - 03 - 02), time!(15:00));
        let bets = summarize_bets(
            vec![won.clone(), lost.clone(), open.clone()],
            vec![
                leg(&won, 10.0, 2.5, LegStatus::Win),
                leg(&lost, 20.0, 1.9, LegStatus::Loss),
                leg(&open, 99.0, 2.0, LegStatus::Open),
            ],
        );
        let snai = account("Mario", "Snai", 0.0);
        let adjustments = vec![
            adjustment(&snai, -3.0, Some("fee"), datetime!(2025-03-02 10:00 UTC)),
            adjustment(&snai, 7.0, None, datetime!(2025-03-05 10:00 UTC)),
            adjustment(&snai, 500.0, Some(BASELINE_NOTE), datetime!(2025-03-05 9:00 UTC)),
        ];

        let utc = local_timezone("UTC").unwrap();

        let months = monthly_profit_loss(&bets, &adjustments, utc, date!(2024 - 01 - 01));

        assert_eq!(months.len(), 2);
        let march = &months[0];
        assert_eq!(march.month, date!(2025 - 03 - 01));
        assert_eq!(
            march.days,
            vec![
                DayProfit {
                    day: date!(2025 - 03 - 05),
                    bet: 0.0,
                    adjustment: 7.0,
                },
                DayProfit {
                    day: date!(2025 - 03 - 02),
                    bet: 15.0,
                    adjustment: -3.0,
                },
            ]
        );
        assert_eq!(march.bet, 15.0);
        assert_eq!(march.adjustment, 4.0);
        assert_eq!(march.total, 19.0);
        assert_eq!(months[1].total, -20.0);
    }

    #[test]
    fn leaves_out_days_before_the_window() {
        let old = bet(date!(2023 - 12 - 31), time!(20:00));
        let bets = summarize_bets(vec![old.clone()], vec![leg(&old, 10.0, 2.0, LegStatus::Win)]);
        let snai = account("Mario", "Snai", 0.0);
        let adjustments = vec![adjustment(
            &snai,
            5.0,
            None,
            datetime!(2023-12-31 23:30 UTC),
        )];

        let utc = local_timezone("UTC").unwrap();

        let months = monthly_profit_loss(&bets, &adjustments, utc, date!(2024 - 01 - 01));

        assert!(months.is_empty());
    }

    #[test]
    fn adjustments_use_the_local_day() {
        let snai = account("Mario", "Snai", 0.0);
        let adjustments = vec![adjustment(&snai, 5.0, None, datetime!(2025-03-31 23:30 UTC))];

        let rome = local_timezone("Europe/Rome").unwrap();

        let months = monthly_profit_loss(&[], &adjustments, rome, date!(2025 - 01 - 01));

        assert_eq!(months[0].month, date!(2025 - 04 - 01));
        assert_eq!(months[0].days[0].day, date!(2025 - 04 - 01));
    }

    #[test]
    fn winter_adjustments_stay_in_their_month() {
        let snai = account("Mario", "Snai", 0.0);
        let adjustments = vec![adjustment(&snai, 5.0, None, datetime!(2026-01-31 22:30 UTC))];
        let rome = local_timezone("Europe/Rome").unwrap();

        let months = monthly_profit_loss(&[], &adjustments, rome, date!(2025 - 01 - 01));

        assert_eq!(months.len(), 1);
        assert_eq!(months[0].month, date!(2026 - 01 - 01));
        assert_eq!(months[0].days[0].day, date!(2026 - 01 - 31));
        assert_eq!(months[0].total, 5.0);
    }

    #[test]
    fn month_totals_match_day_totals() {
        let snai = account("Mario", "Snai", 0.0);
        let adjustments: Vec<_> = (1..=20)
            .map(|i| {
                adjustment(
                    &snai,
                    i as f64 * 1.25 - 10.0,
                    None,
                    datetime!(2025-01-01 12:00 UTC) + time::Duration::days(i * 4),
                )
            })
            .collect();
        let input_total: f64 = adjustments.iter().map(|adjustment| adjustment.amount).sum();

        let utc = local_timezone("UTC").unwrap();

        let months = monthly_profit_loss(&[], &adjustments, utc, date!(2025 - 01 - 01));

        for month in &months {
            let day_total: f64 = month.days.iter().map(DayProfit::total).sum();
            assert!((month.total - day_total).abs() < 1e-9);
        }
        let month_total: f64 = months.iter().map(|month| month.total).sum();
        assert!((month_total - input_total).abs() < 1e-9);
    }

    #[test]
    fn lookback_is_four_hundred_days() {
        assert_eq!(lookback_start(date!(2025 - 02 - 04)), date!(2024 - 01 - 01));
    }
}
