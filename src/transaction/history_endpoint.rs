//! Defines the endpoint for a customer's credit transaction history.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    extract::CustomerIdPath,
    transaction::{Transaction, get_transaction_history},
};

/// The state needed to read transaction history.
#[derive(Debug, Clone)]
pub struct TransactionHistoryState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionHistoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A transaction as shown in the history.
///
/// Credit values are JSON numbers here, unlike the customer endpoints which
/// send them as decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionView {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The customer's credit before the change.
    #[serde(with = "rust_decimal::serde::float")]
    pub previous_credit: Decimal,
    /// The customer's credit after the change.
    #[serde(with = "rust_decimal::serde::float")]
    pub new_credit: Decimal,
    /// `new_credit - previous_credit`.
    #[serde(with = "rust_decimal::serde::float")]
    pub credit_change: Decimal,
    /// Why the credit changed.
    pub description: String,
    /// When the transaction was recorded, in RFC 3339 format.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Transaction> for TransactionView {
    fn from(transaction: Transaction) -> Self {
        Self {
            id: transaction.id,
            previous_credit: transaction.previous_credit.as_decimal(),
            new_credit: transaction.new_credit.as_decimal(),
            credit_change: transaction.credit_change(),
            description: transaction.description,
            created_at: transaction.created_at,
        }
    }
}

/// A route handler for listing a customer's transactions, most recent first.
pub async fn get_transaction_history_endpoint(
    State(state): State<TransactionHistoryState>,
    CustomerIdPath(customer_id): CustomerIdPath,
) -> Result<Json<Vec<TransactionView>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let history = get_transaction_history(customer_id, &connection)?
        .into_iter()
        .map(TransactionView::from)
        .collect();

    Ok(Json(history))
}
