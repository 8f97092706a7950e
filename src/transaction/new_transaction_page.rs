//! Defines the route handler for the page for creating a new transaction.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use time::OffsetDateTime;

use crate::{
    AppState, Error, endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::{
        TransactionType,
        form::{TransactionFormDefaults, transaction_form_fields},
    },
};

/// The state needed for the new transaction page.
#[derive(Debug, Clone)]
pub struct NewTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for NewTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders the page for creating a transaction.
///
/// The date field is prefilled with today's date in the configured local
/// timezone, matching the month the wallet page treats as current.
pub async fn get_new_transaction_page(State(state): State<NewTransactionPageState>) -> Response {
    let local_offset = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_response(),
    };

    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();

    let form_fields = transaction_form_fields(&TransactionFormDefaults {
        transaction_type: TransactionType::Expense,
        amount: None,
        category: None,
        date: Some(OffsetDateTime::now_utc().to_offset(local_offset).date()),
        note: None,
        autofocus_amount: true,
    });

    let content = html!(
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "New Transaction" }

            form
                class="w-full flex flex-col gap-4"
                hx-post=(endpoints::TRANSACTIONS_API)
                hx-target-error="#alert-container"
            {
                (form_fields)

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create" }
            }
        }
    );

    base("New Transaction", &[dollar_input_styles()], &content).into_response()
}
