//! Month and day buckets for dated amounts (transactions, bets, cash operations).

use maud::{Markup, html};
use time::{Date, OffsetDateTime};
use time_tz::Tz;

use crate::{
    html::{GROUP_STYLE, GROUP_SUMMARY_STYLE},
    timezone::to_local,
};

/// The items that fall on one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup<T> {
    pub day: Date,
    /// The sum of the amounts of `items`.
    pub total: f64,
    pub items: Vec<T>,
}

/// The days that fall in one calendar month, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthGroup<T> {
    /// The first day of the month.
    pub month: Date,
    /// The sum of the day totals.
    pub total: f64,
    pub days: Vec<DayGroup<T>>,
}

/// Partition `items` into month then day buckets, newest first.
///
/// `key` gives the calendar day and the signed amount of an item. Items that
/// share a day keep their input order, so callers should pass items newest
/// first.
pub fn group_by_month_day<T, F>(items: Vec<T>, key: F) -> Vec<MonthGroup<T>>
where
    F: Fn(&T) -> (Date, f64),
{
    let mut keyed: Vec<(Date, f64, T)> = items
        .into_iter()
        .map(|item| {
            let (day, amount) = key(&item);
            (day, amount, item)
        })
        .collect();

    // Stable sort so that items on the same day keep their input order.
    keyed.sort_by(|a, b| b.0.cmp(&a.0));

    let mut months: Vec<MonthGroup<T>> = Vec::new();

    for (day, amount, item) in keyed {
        let month_start = first_day_of_month(day);
        let month = match months.last_mut() {
            Some(current) if current.month == month_start => current,
            _ => {
                months.push(MonthGroup {
                    month: month_start,
                    total: 0.0,
                    days: Vec::new(),
                });
                months.last_mut().expect("month group just added")
            }
        };

        month.total += amount;

        let day_group = match month.days.last_mut() {
            Some(current) if current.day == day => current,
            _ => {
                month.days.push(DayGroup {
                    day,
                    total: 0.0,
                    items: Vec::new(),
                });
                month.days.last_mut().expect("day group just added")
            }
        };

        day_group.total += amount;
        day_group.items.push(item);
    }

    months
}

/// The first day of the month that `date` falls in.
pub fn first_day_of_month(date: Date) -> Date {
    date.replace_day(1).expect("every month has a first day")
}

/// The calendar day of `timestamp` in `timezone`.
pub fn local_day(timestamp: OffsetDateTime, timezone: &Tz) -> Date {
    to_local(timestamp, timezone).date()
}

/// The English month name and year, e.g. "March 2025".
pub fn format_month(month: Date) -> String {
    format!("{} {}", month.month(), month.year())
}

/// The weekday, day and month, e.g. "Monday 3 March".
pub fn format_day(day: Date) -> String {
    format!("{} {} {}", day.weekday(), day.day(), day.month())
}

/// Collapsible month groups holding collapsible day groups.
///
/// `total_view` renders the month and day totals and `item_view` renders one
/// item. Every group starts collapsed.
pub fn grouped_list_view<T>(
    months: &[MonthGroup<T>],
    total_view: impl Fn(f64) -> Markup,
    item_view: impl Fn(&T) -> Markup,
) -> Markup {
    html!(
        div class="space-y-2"
        {
            @for month in months {
                details class=(GROUP_STYLE) data-month=(month.month.to_string())
                {
                    summary class=(GROUP_SUMMARY_STYLE)
                    {
                        span class="font-semibold" { (format_month(month.month)) }
                        (total_view(month.total))
                    }

                    div class="space-y-2 px-4 pb-4"
                    {
                        @for day in &month.days {
                            details class=(GROUP_STYLE) data-day=(day.day.to_string())
                            {
                                summary class=(GROUP_SUMMARY_STYLE)
                                {
                                    span { (format_day(day.day)) }
                                    (total_view(day.total))
                                }

                                ul class="space-y-2 px-4 pb-4"
                                {
                                    @for item in &day.items {
                                        li { (item_view(item)) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod tests {
    use time::{
        Date, Month, OffsetDateTime,
        macros::{date, datetime},
    };

    use maud::html;
    use scraper::Html;

    use super::{
        first_day_of_month, format_day, format_month, group_by_month_day, grouped_list_view,
        local_day,
    };
    use crate::{test_utils::select_text, timezone::local_timezone};

    fn entries() -> Vec<(Date, f64)> {
        vec![
            (date!(2025 - 03 - 02), 10.0),
            (date!(2025 - 01 - 31), -4.5),
            (date!(2025 - 03 - 02), 2.5),
            (date!(2025 - 03 - 15), -7.0),
            (date!(2024 - 12 - 31), 100.0),
            (date!(2025 - 01 - 01), 0.25),
        ]
    }

    #[test]
    fn months_and_days_are_newest_first() {
        let groups = group_by_month_day(entries(), |entry| *entry);

        let months: Vec<Date> = groups.iter().map(|group| group.month).collect();
        assert_eq!(
            months,
            vec![
                date!(2025 - 03 - 01),
                date!(2025 - 01 - 01),
                date!(2024 - 12 - 01)
            ]
        );

        let march_days: Vec<Date> = groups[0].days.iter().map(|day| day.day).collect();
        assert_eq!(march_days, vec![date!(2025 - 03 - 15), date!(2025 - 03 - 02)]);
    }

    #[test]
    fn items_keep_input_order_within_a_day() {
        let groups = group_by_month_day(entries(), |entry| *entry);

        let second_of_march = &groups[0].days[1];
        assert_eq!(
            second_of_march.items,
            vec![(date!(2025 - 03 - 02), 10.0), (date!(2025 - 03 - 02), 2.5)]
        );
        assert_eq!(second_of_march.total, 12.5);
    }

    #[test]
    fn totals_add_up() {
        let input = entries();
        let input_total: f64 = input.iter().map(|(_, amount)| amount).sum();

        let groups = group_by_month_day(input, |entry| *entry);

        for month in &groups {
            let day_total: f64 = month.days.iter().map(|day| day.total).sum();
            assert!(
                (day_total - month.total).abs() < 1e-9,
                "day totals {day_total} do not sum to month total {}",
                month.total
            );
        }

        let month_total: f64 = groups.iter().map(|month| month.total).sum();
        assert!((month_total - input_total).abs() < 1e-9);
    }

    #[test]
    fn empty_input_gives_no_groups() {
        let groups = group_by_month_day(Vec::<(Date, f64)>::new(), |entry| *entry);

        assert!(groups.is_empty());
    }

    #[test]
    fn local_day_uses_timezone() {
        let timestamp = datetime!(2025-03-01 23:30 UTC);
        let rome = local_timezone("Europe/Rome").unwrap();
        let utc = local_timezone("UTC").unwrap();

        assert_eq!(local_day(timestamp, rome), date!(2025 - 03 - 02));
        assert_eq!(local_day(timestamp, utc), date!(2025 - 03 - 01));
    }

    #[test]
    fn local_day_uses_the_offset_at_the_timestamp() {
        let rome = local_timezone("Europe/Rome").unwrap();

        // Rome is at +01:00 in winter and +02:00 in summer.
        assert_eq!(
            local_day(datetime!(2026-01-31 22:30 UTC), rome),
            date!(2026 - 01 - 31)
        );
        assert_eq!(
            local_day(datetime!(2026-07-31 22:30 UTC), rome),
            date!(2026 - 08 - 01)
        );
    }

    #[test]
    fn first_day_of_month_keeps_month() {
        let day = Date::from_calendar_date(2024, Month::February, 29).unwrap();

        assert_eq!(first_day_of_month(day), date!(2024 - 02 - 01));
    }

    #[test]
    fn formats_month_and_day() {
        assert_eq!(format_month(date!(2025 - 03 - 01)), "March 2025");
        assert_eq!(format_day(date!(2025 - 03 - 03)), "Monday 3 March");
    }

    #[test]
    fn grouping_by_local_timestamp() {
        let timestamps = vec![
            datetime!(2025-03-01 23:30 UTC),
            datetime!(2025-03-01 12:00 UTC),
        ];

        let rome = local_timezone("Europe/Rome").unwrap();

        let groups = group_by_month_day(timestamps, |timestamp: &OffsetDateTime| {
            (local_day(*timestamp, rome), 1.0)
        });

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].days.len(), 2);
    }

    #[test]
    fn list_view_renders_one_group_per_month_and_day() {
        let groups = group_by_month_day(entries(), |entry| *entry);

        let markup = grouped_list_view(
            &groups,
            |total| html!(span { (total) }),
            |(_, amount)| html!(span class="item" { (amount) }),
        );

        let fragment = Html::parse_fragment(&markup.into_string());
        assert_eq!(select_text(&fragment, "details[data-month]").len(), 3);
        assert_eq!(select_text(&fragment, "details[data-day]").len(), 5);
        assert_eq!(select_text(&fragment, "span.item").len(), 6);
    }
}
