//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use crate::store::Ledger;

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// Used to decide which month is "the current month" when a page is
    /// requested without an explicit month.
    pub local_timezone: String,

    /// The ledger holding all transactions.
    pub ledger: Arc<Mutex<Ledger>>,
}

impl AppState {
    /// Create a new [AppState] from an opened ledger.
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    pub fn new(ledger: Ledger, local_timezone: &str) -> Self {
        Self {
            local_timezone: local_timezone.to_owned(),
            ledger: Arc::new(Mutex::new(ledger)),
        }
    }
}
