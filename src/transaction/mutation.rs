//! Keeps a customer's credit and their transaction history consistent.
//!
//! Every change to `Customer::credit` goes through this module so that the
//! newest transaction's `new_credit` always equals the stored credit.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Credit, Error,
    customer::{Customer, NewCustomer, get_customer, insert_customer, save_customer},
    database_id::CustomerId,
    transaction::{Transaction, create_transaction},
};

/// The description recorded when a request does not provide one.
pub const DEFAULT_DESCRIPTION: &str = "Credit adjustment";

/// Requested changes to an existing customer. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerChanges {
    /// A new name.
    pub name: Option<String>,
    /// A new email address.
    pub email: Option<String>,
    /// A new note. `Some(None)` clears the note.
    pub note: Option<Option<String>>,
    /// A new credit balance.
    pub credit: Option<Credit>,
    /// The description for the transaction recorded if the credit changes.
    pub transaction_description: Option<String>,
}

/// The result of updating a customer.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditUpdate {
    /// The customer as stored after the update.
    pub customer: Customer,
    /// The transaction recorded, if the credit changed.
    pub transaction: Option<Transaction>,
}

/// Set `customer`'s credit to `requested_credit` and persist the customer.
///
/// A transaction from the previous to the new credit is appended only if the
/// credit actually changed. `None` keeps the current credit, as does a value
/// equal to it. Any other field changes already made to `customer` are
/// persisted too.
///
/// Taking an SQL transaction means the appended transaction and the customer
/// update commit together or not at all.
///
/// # Errors
/// This function will return a:
/// - [Error::CustomerNotFound] if `customer` is not in the database,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn apply_credit_update(
    customer: &mut Customer,
    requested_credit: Option<Credit>,
    description: Option<&str>,
    sql_transaction: &SqlTransaction,
) -> Result<Option<Transaction>, Error> {
    let previous_credit = customer.credit;
    let effective_credit = requested_credit.unwrap_or(previous_credit);
    customer.credit = effective_credit;

    let transaction = if effective_credit != previous_credit {
        let transaction = create_transaction(
            Transaction::build(
                customer.id,
                previous_credit,
                effective_credit,
                description.unwrap_or(DEFAULT_DESCRIPTION),
            ),
            sql_transaction,
        )?;
        tracing::debug!(
            "Recorded credit change for customer {} from {previous_credit} to {effective_credit}",
            customer.id
        );
        Some(transaction)
    } else {
        None
    };

    save_customer(customer, sql_transaction)?;

    Ok(transaction)
}

/// Apply `changes` to the customer with `customer_id` in a single SQL transaction.
///
/// The connection lock held by the caller and the immediate SQL transaction
/// together make the read-modify-write of the credit safe against
/// simultaneous updates to the same customer.
///
/// # Errors
/// This function will return a:
/// - [Error::CustomerNotFound] if `customer_id` does not refer to a stored customer,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_customer(
    customer_id: CustomerId,
    changes: CustomerChanges,
    connection: &Connection,
) -> Result<CreditUpdate, Error> {
    let sql_transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let mut customer = get_customer(customer_id, &sql_transaction)?;

    if let Some(name) = changes.name {
        customer.name = name;
    }
    if let Some(email) = changes.email {
        customer.email = email;
    }
    if let Some(note) = changes.note {
        customer.note = note;
    }

    let transaction = apply_credit_update(
        &mut customer,
        changes.credit,
        changes.transaction_description.as_deref(),
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    Ok(CreditUpdate {
        customer,
        transaction,
    })
}

/// Insert a new customer and record their opening balance.
///
/// Opening an account is a change from an implicit balance of zero, and always
/// records exactly one transaction, even when the opening credit is zero.
///
/// # Errors
/// This function will return an [Error::SqlError] if the owner does not exist
/// or there is some other SQL error.
pub fn open_customer_account(
    new_customer: NewCustomer,
    description: Option<&str>,
    connection: &Connection,
) -> Result<(Customer, Transaction), Error> {
    let sql_transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let customer = insert_customer(&new_customer, &sql_transaction)?;
    let transaction = create_transaction(
        Transaction::build(
            customer.id,
            Credit::zero(),
            customer.credit,
            description.unwrap_or(DEFAULT_DESCRIPTION),
        ),
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    tracing::info!(
        "Opened account for customer {} with credit {}",
        customer.id,
        customer.credit
    );

    Ok((customer, transaction))
}
