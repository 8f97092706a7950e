//! Pie chart generation for the report page.
//!
//! The chart is generated as JSON configuration for the ECharts library and
//! rendered with a corresponding HTML container and JavaScript initialization
//! code. Both are regenerated wholesale on every page render.

use charming::{
    Chart,
    component::Legend,
    element::{Color, JsFunction, Tooltip, Trigger},
    series::Pie,
};
use maud::{Markup, PreEscaped, html};

use crate::{
    Error,
    html::HeadElement,
    report::{aggregation::CategoryTotal, palette::color_for_rank},
};

/// The report pie chart with its HTML container ID and ECharts configuration.
pub(super) struct ReportChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Build the category pie chart for `totals`.
///
/// Slice colors follow the rank order of `totals` so the chart agrees with
/// the ranked category list next to it.
///
/// # Errors
/// Returns [Error::JSONSerializationError] if the chart configuration cannot
/// be serialized.
pub(super) fn category_pie_chart(totals: &[CategoryTotal]) -> Result<ReportChart, Error> {
    let colors: Vec<Color> = totals
        .iter()
        .enumerate()
        .map(|(rank, _)| Color::from(color_for_rank(rank)))
        .collect();

    let data: Vec<(f64, String)> = totals
        .iter()
        .map(|category| (category.total, category.name.clone()))
        .collect();

    let chart = Chart::new()
        .color(colors)
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("bottom"))
        .series(
            Pie::new()
                .name("Categories")
                .radius("60%")
                .center(vec!["50%", "45%"])
                .data(data),
        );

    let options = serde_json::to_string(&chart)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(ReportChart {
        id: "category-pie-chart",
        options,
    })
}

/// Renders the HTML container for the report chart.
pub(super) fn chart_view(chart: &ReportChart) -> Markup {
    html!(
        section
            id="chart"
            class="w-full mx-auto mb-4"
        {
            div
                id=(chart.id)
                class="min-h-[380px] rounded dark:bg-gray-100"
            {}
        }
    )
}

/// Generates JavaScript initialization code for the report chart.
///
/// Creates a script that initializes an ECharts instance with dark mode
/// support and responsive resizing.
pub(super) fn chart_script(chart: &ReportChart) -> HeadElement {
    let script_content = format!(
        r#"(function() {{
            const chartDom = document.getElementById("{}");
            const chart = echarts.init(chartDom);
            const option = {};
            chart.setOption(option);

            window.addEventListener('resize', chart.resize);

            const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
            const updateTheme = () => {{
                const isDarkMode = darkModeMediaQuery.matches;
                chart.setTheme(isDarkMode ? 'dark' : 'default');
            }}
            darkModeMediaQuery.addEventListener('change', updateTheme);
            updateTheme();
        }})();"#,
        chart.id, chart.options
    );

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{script_content}\n}});"
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Item)
        .value_formatter(currency_formatter())
}
