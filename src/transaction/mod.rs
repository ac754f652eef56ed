//! Credit transactions: the append-only history of customer credit changes.
//!
//! This module contains:
//! - The `Transaction` model and `TransactionBuilder` for recording changes
//! - The rules that couple a customer's credit to their transaction history
//! - The route handler for reading a customer's history

mod core;
mod history_endpoint;
mod mutation;

#[cfg(test)]
pub use core::count_transactions;
pub use core::{Transaction, create_transaction, create_transaction_table, get_transaction_history};
pub use history_endpoint::get_transaction_history_endpoint;
pub use mutation::{CustomerChanges, DEFAULT_DESCRIPTION, open_customer_account, update_customer};
