//! Defines the route handler for the page for editing an existing transaction.
//!
//! The page takes only the transaction ID and re-fetches the record from the
//! ledger, so stale or tampered link parameters cannot change what is edited.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_CONTAINER_STYLE, base,
        dollar_input_styles,
    },
    navigation::NavBar,
    store::Ledger,
    transaction::{
        TransactionId,
        form::{TransactionFormDefaults, transaction_form_fields},
    },
};

/// The state needed for the edit transaction page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    /// The ledger holding all transactions.
    ledger: Arc<Mutex<Ledger>>,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            ledger: state.ledger.clone(),
        }
    }
}

/// Renders the page for editing the transaction with `transaction_id`.
///
/// # Errors
/// Returns [Error::NotFound] if no transaction has `transaction_id`.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionPageState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let ledger = state
        .ledger
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire ledger lock: {error}"))
        .map_err(|_| Error::LedgerLockError)?;

    let transaction = ledger.get(transaction_id).ok_or(Error::NotFound)?;

    let nav_bar = NavBar::new(endpoints::WALLET_VIEW).into_html();

    let form_fields = transaction_form_fields(&TransactionFormDefaults {
        transaction_type: transaction.transaction_type,
        amount: Some(transaction.amount),
        category: Some(&transaction.category),
        date: transaction.date,
        note: Some(&transaction.note),
        autofocus_amount: false,
    });

    let content = html!(
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Edit Transaction" }

            form
                class="w-full flex flex-col gap-4"
                hx-put=(endpoints::format_endpoint(endpoints::TRANSACTION, transaction_id))
                hx-target-error="#alert-container"
            {
                (form_fields)

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save" }

                a
                    href=(endpoints::WALLET_VIEW)
                    class={(BUTTON_SECONDARY_STYLE) " text-center"}
                {
                    "Cancel"
                }
            }
        }
    );

    Ok(base("Edit Transaction", &[dollar_input_styles()], &content).into_response())
}
