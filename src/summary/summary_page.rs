//! The summary page: capital KPIs, the partners' pro-quota table and the
//! monthly profit/loss with its chart.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::Date;
use time_tz::{PrimitiveDateTimeExt, Tz};

use crate::{
    AppState, Error,
    backend::Backend,
    betting::summarize_bets,
    endpoints,
    grouping::{format_day, format_month},
    html::{
        CARD_STYLE, GROUP_STYLE, GROUP_SUMMARY_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, balance_class, base, format_currency, format_percent,
        format_signed_currency, load_error_page, page_header, signed_total_view,
    },
    navigation::NavBar,
    partner::{PartnerShares, partner_shares},
    summary::{
        MonthProfit,
        chart::{chart_head_elements, chart_view, monthly_profit_chart},
        lookback_start, monthly_profit_loss,
    },
    timezone::{local_timezone, local_today},
};

/// The most adjustments read for the profit/loss window.
const ADJUSTMENT_LIMIT: i64 = 10_000;

/// The state needed for the summary page.
#[derive(Debug, Clone)]
pub struct SummaryPageState<B: Backend> {
    pub backend: B,
    pub local_timezone: String,
}

impl<B: Backend> FromRef<AppState<B>> for SummaryPageState<B> {
    fn from_ref(state: &AppState<B>) -> Self {
        Self {
            backend: state.backend.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

struct SummaryData {
    capital: f64,
    shares: PartnerShares,
    months: Vec<MonthProfit>,
}

async fn load_summary<B: Backend>(
    backend: &B,
    timezone: &Tz,
    since: Date,
) -> Result<SummaryData, Error> {
    let since_local_midnight = since
        .midnight()
        .assume_timezone(timezone)
        .take_first()
        .unwrap_or_else(|| since.midnight().assume_timezone_utc(timezone));
    let (capital, partners, events, bets, legs, adjustments) = tokio::try_join!(
        backend.current_capital(),
        backend.partners(),
        backend.equity_events(),
        backend.bets(Some(since)),
        backend.bet_legs(),
        backend.balance_adjustments(Some(since_local_midnight), ADJUSTMENT_LIMIT),
    )?;

    let summaries = summarize_bets(bets, legs);

    Ok(SummaryData {
        capital,
        shares: partner_shares(&partners, &events, capital),
        months: monthly_profit_loss(&summaries, &adjustments, timezone, since),
    })
}

/// Display the summary page.
pub async fn get_summary_page<B: Backend>(State(state): State<SummaryPageState<B>>) -> Response {
    let timezone = match local_timezone(&state.local_timezone) {
        Ok(timezone) => timezone,
        Err(error) => return error.into_response(),
    };
    let nav_bar = NavBar::new(endpoints::SUMMARY_VIEW).into_html();
    let since = lookback_start(local_today(timezone));

    match load_summary(&state.backend, timezone, since).await {
        Ok(data) => summary_view(nav_bar, &data).into_response(),
        Err(error) => {
            tracing::error!("Could not load the summary page: {error}");
            load_error_page(
                "Summary",
                nav_bar,
                endpoints::SUMMARY_VIEW,
                &error.to_string(),
            )
            .into_response()
        }
    }
}

fn summary_view(nav_bar: Markup, data: &SummaryData) -> Markup {
    let chart = monthly_profit_chart(&data.months);

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-6"
            {
                (page_header("Summary", endpoints::SUMMARY_VIEW))

                section class="grid grid-cols-1 gap-4 md:grid-cols-3"
                {
                    (kpi_view("Capital", "capital", format_currency(data.capital), ""))
                    (kpi_view(
                        "Net cash in",
                        "cash-in",
                        format_currency(data.shares.total_cash_in),
                        "",
                    ))
                    (kpi_view(
                        "Overall profit",
                        "profit",
                        format_signed_currency(data.shares.overall_profit),
                        balance_class(data.shares.overall_profit),
                    ))
                }

                section class=(CARD_STYLE)
                {
                    h2 class="mb-3 text-lg font-semibold" { "Partners" }
                    (partner_table_view(&data.shares))
                }

                section class=(CARD_STYLE)
                {
                    h2 class="mb-3 text-lg font-semibold" { "Monthly P/L" }

                    @if data.months.is_empty() {
                        p class="text-sm text-gray-500" { "No profit or loss in the last months." }
                    } @else {
                        (chart_view())
                        div class="mt-4 space-y-2" data-months="true"
                        {
                            @for month in &data.months {
                                (month_view(month))
                            }
                        }
                    }
                }
            }
        }
    );

    let head_elements = if data.months.is_empty() {
        Vec::new()
    } else {
        chart_head_elements(&chart)
    };

    base("Summary", &head_elements, &content)
}

fn kpi_view(title: &str, key: &str, value: String, value_class: &str) -> Markup {
    html!(
        div class=(CARD_STYLE) data-kpi=(key)
        {
            p class="text-sm text-gray-500 dark:text-gray-400" { (title) }
            p class={ "text-2xl font-semibold " (value_class) } data-kpi-value="true" { (value) }
        }
    )
}

fn partner_table_view(shares: &PartnerShares) -> Markup {
    if shares.rows.is_empty() {
        return html!(p class="text-sm text-gray-500" { "No partners yet." });
    }

    let capital: f64 = shares.rows.iter().map(|row| row.capital_pro_quota).sum();
    let gain: f64 = shares.rows.iter().map(|row| row.gain_pro_quota).sum();

    html!(
        div class="overflow-x-auto"
        {
            table class="w-full text-sm text-left" data-partner-shares="true"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Partner" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Cash in" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Units" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Quota" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Capital pro quota" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Gain" }
                    }
                }

                tbody
                {
                    @for row in &shares.rows {
                        tr class=(TABLE_ROW_STYLE) data-partner=(row.partner.name)
                        {
                            th scope="row" class=(TABLE_CELL_STYLE) { (row.partner.name) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(row.cash_in)) }
                            td class=(TABLE_CELL_STYLE) { (format!("{:.2}", row.units)) }
                            td class=(TABLE_CELL_STYLE) data-quota="true" { (format_percent(row.quota)) }
                            td class=(TABLE_CELL_STYLE) data-capital="true"
                            {
                                (format_currency(row.capital_pro_quota))
                            }
                            td class={ (TABLE_CELL_STYLE) " " (balance_class(row.gain_pro_quota)) }
                            {
                                (format_signed_currency(row.gain_pro_quota))
                            }
                        }
                    }
                }

                tfoot
                {
                    tr class="font-semibold" data-totals="true"
                    {
                        th scope="row" class=(TABLE_CELL_STYLE) { "Total" }
                        td class=(TABLE_CELL_STYLE) { (format_currency(shares.total_cash_in)) }
                        td class=(TABLE_CELL_STYLE) { (format!("{:.2}", shares.total_units)) }
                        td class=(TABLE_CELL_STYLE) {}
                        td class=(TABLE_CELL_STYLE) data-capital="true" { (format_currency(capital)) }
                        td class={ (TABLE_CELL_STYLE) " " (balance_class(gain)) }
                        {
                            (format_signed_currency(gain))
                        }
                    }
                }
            }
        }
    )
}

fn month_view(month: &MonthProfit) -> Markup {
    html!(
        details class=(GROUP_STYLE) data-month=(format_month(month.month))
        {
            summary class=(GROUP_SUMMARY_STYLE)
            {
                span class="font-semibold" { (format_month(month.month)) }
                span class="flex gap-4 text-sm"
                {
                    span { "Bets " (format_signed_currency(month.bet)) }
                    span { "Adjustments " (format_signed_currency(month.adjustment)) }
                    span data-month-total="true" { (signed_total_view(month.total)) }
                }
            }

            table class="w-full text-sm text-left"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Day" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Bets" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Adjustments" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Total" }
                    }
                }

                tbody
                {
                    @for day in &month.days {
                        tr class=(TABLE_ROW_STYLE) data-day=(day.day)
                        {
                            th scope="row" class=(TABLE_CELL_STYLE) { (format_day(day.day)) }
                            td class=(TABLE_CELL_STYLE) { (format_signed_currency(day.bet)) }
                            td class=(TABLE_CELL_STYLE) { (format_signed_currency(day.adjustment)) }
                            td class=(TABLE_CELL_STYLE) data-day-total="true"
                            {
                                (signed_total_view(day.total()))
                            }
                        }
                    }
                }
            }
        }
    )
}
