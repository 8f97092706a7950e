//! Defines the route handler for the report page, which ranks one month's
//! categories by total and draws them as a pie chart.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error, endpoints,
    html::{HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, base, format_currency},
    navigation::NavBar,
    report::{
        MonthKey,
        aggregation::{CategoryTotal, category_totals, filter_month_and_type, grand_total},
        chart::{chart_script, chart_view, category_pie_chart},
        palette::color_for_rank,
    },
    store::Ledger,
    timezone::get_local_offset,
    transaction::TransactionType,
};

/// The query parameters accepted by the report page.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// The month to report on as a `YYYY-MM` string.
    month: Option<String>,
    /// Which transactions to report on, either "expense" or "income".
    #[serde(rename = "type")]
    transaction_type: Option<String>,
}

enum QueryDecision {
    Redirect(String),
    Normalized(MonthKey, TransactionType),
}

/// The state needed for the report page.
#[derive(Debug, Clone)]
pub struct ReportViewState {
    /// The ledger holding all transactions.
    ledger: Arc<Mutex<Ledger>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    local_timezone: String,
}

impl FromRef<AppState> for ReportViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            ledger: state.ledger.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the category breakdown for one month.
pub async fn get_report_page(
    State(state): State<ReportViewState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, Error> {
    let current_month = current_local_month(&state.local_timezone)?;
    let (month, transaction_type) = match normalize_query(query, current_month) {
        QueryDecision::Normalized(month, transaction_type) => (month, transaction_type),
        QueryDecision::Redirect(redirect_url) => {
            return Ok(Redirect::to(&redirect_url).into_response());
        }
    };

    let ledger = state
        .ledger
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire ledger lock: {error}"))
        .map_err(|_| Error::LedgerLockError)?;

    let matched = filter_month_and_type(ledger.transactions(), month, transaction_type);
    let totals = category_totals(&matched);

    report_view(month, transaction_type, &totals)
}

/// The canonical URL for the report page showing `month` and `transaction_type`.
fn report_url(month: MonthKey, transaction_type: TransactionType) -> String {
    format!(
        "{}?month={month}&type={}",
        endpoints::REPORT_VIEW,
        transaction_type.as_str()
    )
}

fn current_local_month(local_timezone: &str) -> Result<MonthKey, Error> {
    let Some(local_offset) = get_local_offset(local_timezone) else {
        tracing::error!("Invalid timezone {}", local_timezone);
        return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
    };

    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();
    Ok(MonthKey::from_date(today))
}

/// Missing or unparseable query params redirect to the canonical URL, so the
/// address bar always shows which month and transaction type are displayed.
/// The transaction type defaults to expenses.
fn normalize_query(query: ReportQuery, current_month: MonthKey) -> QueryDecision {
    let month = query.month.as_deref().and_then(MonthKey::parse);
    let transaction_type = query
        .transaction_type
        .as_deref()
        .and_then(parse_transaction_type);

    match (month, transaction_type) {
        (Some(month), Some(transaction_type)) => {
            QueryDecision::Normalized(month, transaction_type)
        }
        _ => QueryDecision::Redirect(report_url(
            month.unwrap_or(current_month),
            transaction_type.unwrap_or(TransactionType::Expense),
        )),
    }
}

fn parse_transaction_type(text: &str) -> Option<TransactionType> {
    match text {
        "expense" => Some(TransactionType::Expense),
        "income" => Some(TransactionType::Income),
        _ => None,
    }
}

fn report_view(
    month: MonthKey,
    transaction_type: TransactionType,
    totals: &[CategoryTotal],
) -> Result<Response, Error> {
    let nav_bar = NavBar::new(endpoints::REPORT_VIEW).into_html();

    if totals.is_empty() {
        let content = html!(
            (nav_bar)

            div class=(PAGE_CONTAINER_STYLE)
            {
                (month_navigation(month, transaction_type))
                (type_tabs(month, transaction_type))

                p class="text-gray-500 dark:text-gray-400 mt-8" data-empty-state="true"
                {
                    "No " (transaction_type.as_str()) " records for this month."
                }
            }
        );

        return Ok(base("Report", &[], &content).into_response());
    }

    let chart = category_pie_chart(totals)?;

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            (month_navigation(month, transaction_type))
            (type_tabs(month, transaction_type))
            (summary_view(transaction_type, totals))
            (chart_view(&chart))
            (ranked_categories(totals))
        }
    );

    Ok(base(
        "Report",
        &[
            HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
            chart_script(&chart),
        ],
        &content,
    )
    .into_response())
}

fn month_navigation(month: MonthKey, transaction_type: TransactionType) -> Markup {
    html!(
        nav class="flex items-center gap-4 mb-4" aria-label="Month"
        {
            a
                href=(report_url(month.prev(), transaction_type))
                class=(LINK_STYLE)
                rel="prev"
            {
                "\u{2190} Previous"
            }

            h1 class="text-xl font-bold" { (month.label()) }

            a
                href=(report_url(month.next(), transaction_type))
                class=(LINK_STYLE)
                rel="next"
            {
                "Next \u{2192}"
            }
        }
    )
}

const ACTIVE_TAB_STYLE: &str = "px-4 py-2 rounded font-semibold bg-blue-500 text-white";
const INACTIVE_TAB_STYLE: &str =
    "px-4 py-2 rounded text-gray-500 hover:bg-gray-100 dark:hover:bg-gray-700";

fn type_tabs(month: MonthKey, active_type: TransactionType) -> Markup {
    let tabs = [
        (TransactionType::Expense, "Expenses"),
        (TransactionType::Income, "Income"),
    ];

    html!(
        nav class="flex gap-2 mb-4" aria-label="Transaction type"
        {
            @for (transaction_type, title) in tabs
            {
                @let is_active = transaction_type == active_type;

                a
                    href=(report_url(month, transaction_type))
                    class=(if is_active { ACTIVE_TAB_STYLE } else { INACTIVE_TAB_STYLE })
                    aria-current=[is_active.then_some("page")]
                {
                    (title)
                }
            }
        }
    )
}

/// Renders the month's grand total and its biggest category.
fn summary_view(transaction_type: TransactionType, totals: &[CategoryTotal]) -> Markup {
    let (headline, amount_color) = match transaction_type {
        TransactionType::Expense => ("Most Spent:", "text-red-600"),
        TransactionType::Income => ("Most Received:", "text-green-600"),
    };

    // Never empty here, the empty month renders its own view.
    let top = &totals[0];

    html!(
        section class="mb-4" aria-label="Summary"
        {
            p data-summary="top-category"
            {
                span class="font-semibold" { (headline) " " }
                (top.name)
                " "
                span class={"font-semibold " (amount_color)} { (format_currency(top.total)) }
            }

            p class="text-sm text-gray-500 dark:text-gray-400" data-summary="grand-total"
            {
                "Total " (format_currency(grand_total(totals)))
            }
        }
    )
}

/// Renders the ranked category list with bars scaled to the biggest total.
fn ranked_categories(totals: &[CategoryTotal]) -> Markup {
    let max_total = totals.first().map_or(0.0, |category| category.total);

    html!(
        section class="w-full max-w-3xl flex flex-col gap-2" aria-label="Categories"
        {
            @for (rank, category) in totals.iter().enumerate()
            {
                @let percent = if max_total > 0.0 { category.total / max_total * 100.0 } else { 0.0 };

                div data-category-rank=(rank)
                {
                    div class="flex justify-between text-sm"
                    {
                        span { (category.name) }
                        span { (format_currency(category.total)) }
                    }

                    div class="w-full bg-gray-100 dark:bg-gray-700 rounded h-2"
                    {
                        div
                            class="h-2 rounded"
                            style=(format!(
                                "width: {percent:.1}%; background-color: {};",
                                color_for_rank(rank)
                            ))
                        {}
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::StatusCode,
        response::Response,
    };
    use scraper::{Html, Selector};
    use time::{Month, macros::date};

    use crate::{
        report::MonthKey,
        store::Ledger,
        transaction::{Transaction, TransactionType},
    };

    use super::{
        QueryDecision, ReportQuery, ReportViewState, get_report_page, normalize_query, report_url,
    };

    fn test_state(ledger: Ledger) -> ReportViewState {
        ReportViewState {
            ledger: Arc::new(Mutex::new(ledger)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn may_expenses_query() -> Query<ReportQuery> {
        Query(ReportQuery {
            month: Some("2024-05".to_owned()),
            transaction_type: Some("expense".to_owned()),
        })
    }

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::in_memory();
        for (transaction_type, amount, category) in [
            (TransactionType::Expense, 20.0, "Food"),
            (TransactionType::Expense, 30.0, "Food"),
            (TransactionType::Expense, 10.0, "Transport"),
            (TransactionType::Income, 100.0, "Salary"),
        ] {
            ledger
                .append(
                    Transaction::build(transaction_type, amount, category)
                        .date(Some(date!(2024 - 05 - 02))),
                )
                .unwrap();
        }

        ledger
    }

    #[tokio::test]
    async fn report_page_shows_top_category_and_ranked_bars() {
        let response = get_report_page(State(test_state(sample_ledger())), may_expenses_query())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html(response).await;
        assert_valid_html(&html);

        let summary_selector = Selector::parse("[data-summary='top-category']").unwrap();
        let summary = html
            .select(&summary_selector)
            .next()
            .expect("want a top category summary");
        let summary_text = summary.text().collect::<String>();
        assert!(summary_text.contains("Most Spent:"), "got {summary_text}");
        assert!(summary_text.contains("Food"), "got {summary_text}");
        assert!(summary_text.contains("$50.00"), "got {summary_text}");

        let bar_selector = Selector::parse("[data-category-rank]").unwrap();
        let bars = html.select(&bar_selector).collect::<Vec<_>>();
        assert_eq!(bars.len(), 2, "want 2 ranked categories");
        let first_bar_text = bars[0].text().collect::<String>();
        assert!(first_bar_text.contains("Food"), "got {first_bar_text}");
    }

    #[tokio::test]
    async fn report_page_includes_chart_container_and_script() {
        let response = get_report_page(State(test_state(sample_ledger())), may_expenses_query())
            .await
            .unwrap();

        let html = parse_html(response).await;

        let chart_selector = Selector::parse("#category-pie-chart").unwrap();
        assert!(
            html.select(&chart_selector).next().is_some(),
            "want a chart container"
        );

        let script_selector = Selector::parse("script").unwrap();
        assert!(
            html.select(&script_selector)
                .any(|script| script.inner_html().contains("category-pie-chart")),
            "want a chart initialization script"
        );
    }

    #[tokio::test]
    async fn report_page_for_income_shows_most_received() {
        let response = get_report_page(
            State(test_state(sample_ledger())),
            Query(ReportQuery {
                month: Some("2024-05".to_owned()),
                transaction_type: Some("income".to_owned()),
            }),
        )
        .await
        .unwrap();

        let html = parse_html(response).await;

        let summary_selector = Selector::parse("[data-summary='top-category']").unwrap();
        let summary_text = html
            .select(&summary_selector)
            .next()
            .expect("want a top category summary")
            .text()
            .collect::<String>();
        assert!(
            summary_text.contains("Most Received:"),
            "got {summary_text}"
        );
        assert!(summary_text.contains("Salary"), "got {summary_text}");
    }

    #[tokio::test]
    async fn report_page_for_empty_month_has_no_chart() {
        let response = get_report_page(
            State(test_state(sample_ledger())),
            Query(ReportQuery {
                month: Some("2024-07".to_owned()),
                transaction_type: Some("expense".to_owned()),
            }),
        )
        .await
        .unwrap();

        let html = parse_html(response).await;
        assert_valid_html(&html);

        let empty_selector = Selector::parse("[data-empty-state='true']").unwrap();
        let empty_text = html
            .select(&empty_selector)
            .next()
            .expect("want an empty-state message")
            .text()
            .collect::<String>();
        assert_eq!(empty_text.trim(), "No expense records for this month.");

        let chart_selector = Selector::parse("#category-pie-chart").unwrap();
        assert!(
            html.select(&chart_selector).next().is_none(),
            "want no chart container for an empty month"
        );
    }

    #[tokio::test]
    async fn report_page_redirects_when_params_missing() {
        let response = get_report_page(
            State(test_state(Ledger::in_memory())),
            Query(ReportQuery {
                month: None,
                transaction_type: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[test]
    fn normalize_query_defaults_type_and_keeps_valid_month() {
        let current_month = MonthKey::new(2024, Month::May);

        let decision = normalize_query(
            ReportQuery {
                month: Some("2024-03".to_owned()),
                transaction_type: None,
            },
            current_month,
        );

        let QueryDecision::Redirect(redirect_url) = decision else {
            panic!("Expected redirect for missing type param");
        };
        assert_eq!(redirect_url, "/report?month=2024-03&type=expense");
    }

    #[test]
    fn report_url_is_canonical() {
        let month = MonthKey::new(2024, Month::May);

        assert_eq!(
            report_url(month, TransactionType::Income),
            "/report?month=2024-05&type=income"
        );
    }

    #[track_caller]
    fn assert_valid_html(html: &Html) {
        assert!(
            html.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            html.errors
        );
    }

    async fn parse_html(response: Response) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .expect("Could not get response body");
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }
}
