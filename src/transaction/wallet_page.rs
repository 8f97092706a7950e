//! Defines the route handler for the wallet page, which lists a month's
//! transactions along with its expense, income, and balance totals.

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
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    report::{MonthKey, WalletTotals, filter_month, wallet_totals},
    store::Ledger,
    timezone::get_local_offset,
    transaction::{Transaction, TransactionType},
};

/// The query parameters accepted by the wallet page.
#[derive(Debug, Deserialize)]
pub struct WalletQuery {
    /// The month to display as a `YYYY-MM` string.
    month: Option<String>,
}

enum QueryDecision {
    Redirect(String),
    Normalized(MonthKey),
}

/// The state needed for the wallet page.
#[derive(Debug, Clone)]
pub struct WalletViewState {
    /// The ledger holding all transactions.
    ledger: Arc<Mutex<Ledger>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    local_timezone: String,
}

impl FromRef<AppState> for WalletViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            ledger: state.ledger.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render an overview of the user's transactions for one month.
pub async fn get_wallet_page(
    State(state): State<WalletViewState>,
    Query(query): Query<WalletQuery>,
) -> Result<Response, Error> {
    let current_month = current_local_month(&state.local_timezone)?;
    let month = match normalize_query(query, current_month) {
        QueryDecision::Normalized(month) => month,
        QueryDecision::Redirect(redirect_url) => {
            return Ok(Redirect::to(&redirect_url).into_response());
        }
    };

    let ledger = state
        .ledger
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire ledger lock: {error}"))
        .map_err(|_| Error::LedgerLockError)?;

    let matched = filter_month(ledger.transactions(), month);
    let totals = wallet_totals(&matched);

    Ok(wallet_view(month, &matched, totals).into_response())
}

/// The canonical URL for the wallet page showing `month`.
pub(crate) fn wallet_url(month: MonthKey) -> String {
    format!("{}?month={month}", endpoints::WALLET_VIEW)
}

fn current_local_month(local_timezone: &str) -> Result<MonthKey, Error> {
    let Some(local_offset) = get_local_offset(local_timezone) else {
        tracing::error!("Invalid timezone {}", local_timezone);
        return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
    };

    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();
    Ok(MonthKey::from_date(today))
}

/// Missing or unparseable month params redirect to the canonical URL for the
/// current month, so the address bar always shows which month is displayed.
fn normalize_query(query: WalletQuery, current_month: MonthKey) -> QueryDecision {
    match query.month.as_deref().map(MonthKey::parse) {
        Some(Some(month)) => QueryDecision::Normalized(month),
        _ => QueryDecision::Redirect(wallet_url(current_month)),
    }
}

fn wallet_view(month: MonthKey, transactions: &[&Transaction], totals: WalletTotals) -> Markup {
    let nav_bar = NavBar::new(endpoints::WALLET_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            (month_navigation(month))
            (totals_view(totals))

            div class="w-full max-w-3xl relative overflow-x-auto shadow-md rounded"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Note" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @if transactions.is_empty()
                        {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td
                                    colspan="5"
                                    data-empty-state="true"
                                    class="px-6 py-8 text-center"
                                {
                                    "No transactions for this month."
                                }
                            }
                        }

                        @for transaction in transactions
                        {
                            (transaction_row(transaction))
                        }
                    }
                }
            }
        }
    );

    base("Wallet", &[], &content)
}

fn month_navigation(month: MonthKey) -> Markup {
    html!(
        nav class="flex items-center gap-4 mb-4" aria-label="Month"
        {
            a href=(wallet_url(month.prev())) class=(LINK_STYLE) rel="prev" { "\u{2190} Previous" }

            h1 class="text-xl font-bold" { (month.label()) }

            a href=(wallet_url(month.next())) class=(LINK_STYLE) rel="next" { "Next \u{2192}" }
        }
    )
}

fn totals_view(totals: WalletTotals) -> Markup {
    html!(
        section class="flex gap-8 mb-4" aria-label="Totals"
        {
            div
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Expenses" }
                p class="font-semibold text-red-600" data-total="expense"
                {
                    (format_currency(-totals.expense))
                }
            }

            div
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Income" }
                p class="font-semibold text-green-600" data-total="income"
                {
                    (signed_currency(TransactionType::Income, totals.income))
                }
            }

            div
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Balance" }
                p class="font-semibold" data-total="balance" { (format_currency(totals.balance())) }
            }
        }
    )
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let amount_color = match transaction.transaction_type {
        TransactionType::Expense => "text-red-600",
        TransactionType::Income => "text-green-600",
    };

    html!(
        tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
        {
            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(date) = transaction.date { (date) }
            }

            td class=(TABLE_CELL_STYLE) { (transaction.category) }

            td class={(TABLE_CELL_STYLE) " " (amount_color)}
            {
                (signed_currency(transaction.transaction_type, transaction.amount))
            }

            td class=(TABLE_CELL_STYLE) { (transaction.note) }

            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    a
                        href=(endpoints::format_endpoint(
                            endpoints::EDIT_TRANSACTION_VIEW,
                            transaction.id,
                        ))
                        class=(LINK_STYLE)
                    {
                        "Edit"
                    }

                    button
                        type="button"
                        class=(BUTTON_DELETE_STYLE)
                        hx-delete=(endpoints::format_endpoint(
                            endpoints::TRANSACTION,
                            transaction.id,
                        ))
                        hx-target="closest tr"
                        hx-swap="outerHTML"
                        hx-target-error="#alert-container"
                    {
                        "Delete"
                    }
                }
            }
        }
    )
}

fn signed_currency(transaction_type: TransactionType, amount: f64) -> String {
    match transaction_type {
        TransactionType::Expense => format_currency(-amount),
        TransactionType::Income => format!("+{}", format_currency(amount)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::StatusCode,
        response::Response,
    };
    use scraper::{ElementRef, Html, Selector};
    use time::{Month, macros::date};

    use crate::{
        endpoints,
        report::MonthKey,
        store::Ledger,
        transaction::{Transaction, TransactionType},
    };

    use super::{QueryDecision, WalletQuery, WalletViewState, get_wallet_page, normalize_query};

    fn test_state(ledger: Ledger) -> WalletViewState {
        WalletViewState {
            ledger: Arc::new(Mutex::new(ledger)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn may_query() -> Query<WalletQuery> {
        Query(WalletQuery {
            month: Some("2024-05".to_owned()),
        })
    }

    #[tokio::test]
    async fn wallet_page_displays_month_transactions_and_totals() {
        let mut ledger = Ledger::in_memory();
        ledger
            .append(
                Transaction::build(TransactionType::Expense, 20.0, "Food")
                    .date(Some(date!(2024 - 05 - 02))),
            )
            .unwrap();
        ledger
            .append(
                Transaction::build(TransactionType::Income, 100.0, "Salary")
                    .date(Some(date!(2024 - 05 - 15))),
            )
            .unwrap();
        // In a different month, must not be shown.
        ledger
            .append(
                Transaction::build(TransactionType::Expense, 999.0, "Rent")
                    .date(Some(date!(2024 - 04 - 01))),
            )
            .unwrap();

        let response = get_wallet_page(State(test_state(ledger)), may_query())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html(response).await;
        assert_valid_html(&html);

        let rows = transaction_rows(&html);
        assert_eq!(rows.len(), 2, "want 2 transaction rows");

        assert_total(&html, "expense", "-$20.00");
        assert_total(&html, "income", "+$100.00");
        assert_total(&html, "balance", "$80.00");
    }

    #[tokio::test]
    async fn wallet_page_rows_have_edit_link_and_delete_button() {
        let mut ledger = Ledger::in_memory();
        let transaction = ledger
            .append(
                Transaction::build(TransactionType::Expense, 20.0, "Food")
                    .date(Some(date!(2024 - 05 - 02))),
            )
            .unwrap();

        let response = get_wallet_page(State(test_state(ledger)), may_query())
            .await
            .unwrap();

        let html = parse_html(response).await;
        let rows = transaction_rows(&html);
        let row = rows.first().expect("want a transaction row");

        let edit_selector = Selector::parse("a").unwrap();
        let edit_link = row
            .select(&edit_selector)
            .find(|link| link.text().collect::<String>().trim() == "Edit")
            .expect("want an edit link");
        assert_eq!(
            edit_link.value().attr("href"),
            Some(
                endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id)
                    .as_str()
            )
        );

        let delete_selector = Selector::parse("button[hx-delete]").unwrap();
        let delete_button = row
            .select(&delete_selector)
            .next()
            .expect("want a delete button");
        assert_eq!(
            delete_button.value().attr("hx-delete"),
            Some(endpoints::format_endpoint(endpoints::TRANSACTION, transaction.id).as_str())
        );
    }

    #[tokio::test]
    async fn wallet_page_shows_empty_state_for_empty_month() {
        let response = get_wallet_page(State(test_state(Ledger::in_memory())), may_query())
            .await
            .unwrap();

        let html = parse_html(response).await;
        assert_valid_html(&html);

        let empty_selector = Selector::parse("td[data-empty-state='true']").unwrap();
        let empty_cell = html
            .select(&empty_selector)
            .next()
            .expect("want an empty-state cell");
        assert_eq!(empty_cell.value().attr("colspan"), Some("5"));
    }

    #[tokio::test]
    async fn wallet_page_has_prev_and_next_month_links() {
        let response = get_wallet_page(State(test_state(Ledger::in_memory())), may_query())
            .await
            .unwrap();

        let html = parse_html(response).await;

        assert_nav_link(&html, "prev", "/wallet?month=2024-04");
        assert_nav_link(&html, "next", "/wallet?month=2024-06");
    }

    #[tokio::test]
    async fn wallet_page_redirects_when_month_missing() {
        let response = get_wallet_page(
            State(test_state(Ledger::in_memory())),
            Query(WalletQuery { month: None }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[test]
    fn normalize_query_redirects_to_current_month_for_invalid_month() {
        let current_month = MonthKey::new(2024, Month::May);

        for month in [None, Some("May".to_owned()), Some("2024-13".to_owned())] {
            let decision = normalize_query(WalletQuery { month }, current_month);

            let QueryDecision::Redirect(redirect_url) = decision else {
                panic!("Expected redirect for missing or invalid month param");
            };
            assert_eq!(redirect_url, "/wallet?month=2024-05");
        }
    }

    #[track_caller]
    fn assert_valid_html(html: &Html) {
        assert!(
            html.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            html.errors
        );
    }

    fn transaction_rows(html: &Html) -> Vec<ElementRef<'_>> {
        let row_selector = Selector::parse("tbody tr[data-transaction-row='true']").unwrap();
        html.select(&row_selector).collect()
    }

    #[track_caller]
    fn assert_total(html: &Html, name: &str, want: &str) {
        let selector = Selector::parse(&format!("[data-total='{name}']")).unwrap();
        let total = html
            .select(&selector)
            .next()
            .unwrap_or_else(|| panic!("no {name} total found"));
        let text = total.text().collect::<String>();
        assert_eq!(text.trim(), want, "want {name} total {want}, got {text}");
    }

    #[track_caller]
    fn assert_nav_link(html: &Html, rel: &str, want_href: &str) {
        let selector = Selector::parse(&format!("a[rel='{rel}']")).unwrap();
        let link = html
            .select(&selector)
            .next()
            .unwrap_or_else(|| panic!("no {rel} month link found"));
        assert_eq!(link.value().attr("href"), Some(want_href));
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
