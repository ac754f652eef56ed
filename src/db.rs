//! Sets up the application database.

use rusqlite::{
    Connection, Transaction as SqlTransaction, TransactionBehavior, functions::FunctionFlags,
};

use crate::{
    Error, business_owner::create_business_owner_table, customer::create_customer_table,
    transaction::create_transaction_table,
};

/// Create the tables for the domain models if they do not exist.
///
/// Foreign keys are enabled on `connection` so that deleting a business owner
/// cascades to its customers and their transaction history. The
/// [UNICODE_LOWER] SQL function is registered on `connection` for searching.
///
/// # Errors
/// Returns an error if the tables cannot be created or there is some other SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Has no effect inside a transaction, so it must be set first.
    connection.pragma_update(None, "foreign_keys", true)?;
    register_unicode_lower(connection)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_business_owner_table(&transaction)?;
    create_customer_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// The name of an SQL function that lowercases text with Unicode case mapping.
///
/// SQLite's built-in `lower` and `LIKE` only fold ASCII letters.
pub const UNICODE_LOWER: &str = "unicode_lower";

fn register_unicode_lower(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.create_scalar_function(
        UNICODE_LOWER,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |context| {
            let text = context.get::<Option<String>>(0)?;
            Ok(text.map(|text| text.to_lowercase()))
        },
    )
}
