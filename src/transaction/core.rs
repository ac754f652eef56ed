//! Defines the core data model and database queries for credit transactions.

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use time::{OffsetDateTime, UtcOffset};

use crate::{
    Credit, Error,
    database_id::{CustomerId, TransactionId},
};

// ============================================================================
// MODELS
// ============================================================================

/// An immutable record of a single change to a customer's credit balance.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The customer whose credit changed.
    pub customer_id: CustomerId,
    /// The customer's credit before the change.
    pub previous_credit: Credit,
    /// The customer's credit after the change.
    pub new_credit: Credit,
    /// Why the credit changed.
    pub description: String,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        customer_id: CustomerId,
        previous_credit: Credit,
        new_credit: Credit,
        description: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            customer_id,
            previous_credit,
            new_credit,
            description: description.to_owned(),
            created_at: None,
        }
    }

    /// The signed difference between the new and previous credit.
    pub fn credit_change(&self) -> Decimal {
        self.new_credit.as_decimal() - self.previous_credit.as_decimal()
    }
}

/// A builder for creating [Transaction] instances.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The customer whose credit changed.
    pub customer_id: CustomerId,
    /// The customer's credit before the change.
    pub previous_credit: Credit,
    /// The customer's credit after the change.
    pub new_credit: Credit,
    /// Why the credit changed.
    pub description: String,
    /// When the transaction was recorded.
    ///
    /// Defaults to the time of insertion. Only seed data sets this explicitly.
    pub created_at: Option<OffsetDateTime>,
}

impl TransactionBuilder {
    /// Set the creation time for the transaction.
    pub fn created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Append a new transaction to a customer's history.
///
/// The creation time is assigned here unless the builder carries one.
///
/// # Errors
/// This function will return a:
/// - [Error::CustomerNotFound] if the customer ID does not refer to a stored customer,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    // Timestamps are compared as text, which only orders correctly with a single offset.
    let created_at = builder
        .created_at
        .unwrap_or_else(OffsetDateTime::now_utc)
        .to_offset(UtcOffset::UTC);

    connection
        .prepare(
            "INSERT INTO credit_transaction (customer_id, previous_credit, new_credit, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, customer_id, previous_credit, new_credit, description, created_at",
        )?
        .query_row(
            (
                builder.customer_id,
                builder.previous_credit,
                builder.new_credit,
                builder.description,
                created_at,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::CustomerNotFound,
            error => error.into(),
        })
}

/// Get a customer's transactions, most recent first.
///
/// Transactions recorded at the same instant are ordered by descending ID.
///
/// # Errors
/// This function will return a:
/// - [Error::CustomerNotFound] if `customer_id` does not refer to a stored customer,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction_history(
    customer_id: CustomerId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let customer_exists: bool = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM customer WHERE id = ?1)",
        (customer_id,),
        |row| row.get(0),
    )?;

    if !customer_exists {
        return Err(Error::CustomerNotFound);
    }

    connection
        .prepare(
            "SELECT id, customer_id, previous_credit, new_credit, description, created_at
             FROM credit_transaction
             WHERE customer_id = :customer_id
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":customer_id", &customer_id)], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Get the number of transactions recorded for a customer.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(customer_id: CustomerId, connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM credit_transaction WHERE customer_id = ?1;",
            (customer_id,),
            |row| row.get::<_, i64>(0),
        )
        .map(|count| count as u64)
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS credit_transaction (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                customer_id INTEGER NOT NULL,
                previous_credit TEXT NOT NULL,
                new_credit TEXT NOT NULL,
                description TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(customer_id) REFERENCES customer(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Used by the transaction history query.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_credit_transaction_customer_created
         ON credit_transaction(customer_id, created_at);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let customer_id = row.get(1)?;
    let previous_credit = row.get(2)?;
    let new_credit = row.get(3)?;
    let description = row.get(4)?;
    let created_at = row.get(5)?;

    Ok(Transaction {
        id,
        customer_id,
        previous_credit,
        new_credit,
        description,
        created_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================
