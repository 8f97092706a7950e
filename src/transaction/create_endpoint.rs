//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error, endpoints,
    store::Ledger,
    transaction::{Transaction, TransactionType},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The ledger holding all transactions.
    pub ledger: Arc<Mutex<Ledger>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            ledger: state.ledger.clone(),
        }
    }
}

/// The form data for creating or editing a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// Whether the transaction is an expense or income.
    #[serde(rename = "type_")]
    pub transaction_type: TransactionType,
    /// The value of the transaction in dollars.
    pub amount: f64,
    /// The category of the transaction, e.g. "Food".
    pub category: String,
    /// The date when the transaction occurred, if given.
    #[serde(default)]
    pub date: Option<Date>,
    /// A free text note about the transaction.
    #[serde(default)]
    pub note: String,
}

impl TransactionForm {
    pub(super) fn into_draft(self) -> crate::transaction::TransactionDraft {
        Transaction::build(self.transaction_type, self.amount, &self.category)
            .date(self.date)
            .note(&self.note)
    }
}

/// A route handler for creating a new transaction, redirects to the wallet
/// view on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let mut ledger = match state.ledger.lock() {
        Ok(ledger) => ledger,
        Err(error) => {
            tracing::error!("could not acquire ledger lock: {error}");
            return Error::LedgerLockError.into_alert_response();
        }
    };

    if let Err(error) = ledger.append(form.into_draft()) {
        tracing::error!("could not create transaction: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::WALLET_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
