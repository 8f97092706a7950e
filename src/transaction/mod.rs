//! Transaction management for the wallet application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionDraft` for creating transactions
//! - View handlers for the wallet and transaction form pages
//! - API endpoints for creating, editing, and deleting transactions

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form;
mod new_transaction_page;
mod wallet_page;

pub use core::{Transaction, TransactionDraft, TransactionId, TransactionType};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use edit_page::get_edit_transaction_page;
pub use new_transaction_page::get_new_transaction_page;
pub use wallet_page::get_wallet_page;
