//! The ECharts bar chart of monthly profit/loss on the summary page.

use charming::{
    Chart,
    component::{Axis, Grid, Title, VisualMap, VisualMapPiece},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::Bar,
};
use maud::{Markup, PreEscaped, html};

use crate::{grouping::format_month, html::HeadElement, summary::MonthProfit};

/// The ID of the element the chart is drawn in.
pub(super) const CHART_ID: &str = "monthly-profit-chart";

/// The echarts build served from the static directory.
const ECHARTS_PATH: &str = "/static/echarts.6.0.0.min.js";

pub(super) fn chart_view() -> Markup {
    html!(
        div
            id=(CHART_ID)
            class="min-h-[380px] w-full rounded dark:bg-gray-100"
            data-chart="true"
        {}
    )
}

/// The head elements that load echarts and draw `chart` once the page loads.
pub(super) fn chart_head_elements(chart: &Chart) -> Vec<HeadElement> {
    let script = format!(
        r#"document.addEventListener('DOMContentLoaded', function() {{
            const chart = echarts.init(document.getElementById("{CHART_ID}"));
            chart.setOption({options});
            window.addEventListener('resize', chart.resize);

            const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
            const updateTheme = () => {{
                chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
            }};
            darkModeMediaQuery.addEventListener('change', updateTheme);
            updateTheme();
        }});"#,
        options = chart
    );

    vec![
        HeadElement::ScriptLink(ECHARTS_PATH.to_owned()),
        HeadElement::ScriptSource(PreEscaped(script)),
    ]
}

/// The month labels and totals of `months`, oldest first.
fn labels_and_totals(months: &[MonthProfit]) -> (Vec<String>, Vec<f64>) {
    months
        .iter()
        .rev()
        .map(|month| (format_month(month.month), round_cents(month.total)))
        .unzip()
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// A bar per month, green for profit and red for loss.
pub(super) fn monthly_profit_chart(months: &[MonthProfit]) -> Chart {
    let (labels, totals) = labels_and_totals(months);

    Chart::new()
        .title(Title::new().text("Monthly P/L").subtext("Bets and adjustments"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .value_formatter(currency_formatter())
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .visual_map(VisualMap::new().show(false).pieces(vec![
            VisualMapPiece::new().gte(0).color("green"),
            VisualMapPiece::new().lte(0).color("red"),
        ]))
        .series(Bar::new().name("P/L").data(totals))
}

fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('it-IT', {
              style: 'currency',
              currency: 'EUR'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}
