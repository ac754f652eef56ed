//! Defines the customer model and its database queries.

use rusqlite::{Connection, Row, params};
use serde::Serialize;

use crate::{
    Credit, Error,
    database_id::{BusinessOwnerId, CustomerId},
};

/// A customer with a running credit balance, owned by a business owner.
///
/// This is the stored field mapping of a customer and is what the customer
/// listing serializes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    /// The ID of the customer.
    pub id: CustomerId,
    /// The ID of the business owner the customer belongs to.
    pub owner_id: BusinessOwnerId,
    /// The customer's name.
    pub name: String,
    /// The customer's email address. The format is not validated.
    pub email: String,
    /// The current credit balance.
    ///
    /// Equal to the `new_credit` of the customer's most recent transaction,
    /// if the customer has any transactions.
    pub credit: Credit,
    /// An optional free-text note about the customer.
    pub note: Option<String>,
}

/// The data needed to insert a new customer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    /// The ID of the business owner the customer belongs to.
    pub owner_id: BusinessOwnerId,
    /// The customer's name.
    pub name: String,
    /// The customer's email address.
    pub email: String,
    /// The opening credit balance.
    pub credit: Credit,
    /// An optional free-text note about the customer.
    pub note: Option<String>,
}

/// The public view of a single customer, without the owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerView {
    /// The ID of the customer.
    pub id: CustomerId,
    /// The customer's name.
    pub name: String,
    /// The customer's email address.
    pub email: String,
    /// The current credit balance as a decimal string.
    pub credit: Credit,
    /// An optional free-text note about the customer.
    pub note: Option<String>,
}

impl From<Customer> for CustomerView {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            email: customer.email,
            credit: customer.credit,
            note: customer.note,
        }
    }
}

/// Create the customer table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_customer_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS customer (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                credit TEXT NOT NULL,
                note TEXT,
                FOREIGN KEY(owner_id) REFERENCES business_owner(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_customer_owner ON customer(owner_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Customer].
pub fn map_customer_row(row: &Row) -> Result<Customer, rusqlite::Error> {
    let id = row.get(0)?;
    let owner_id = row.get(1)?;
    let name = row.get(2)?;
    let email = row.get(3)?;
    let credit = row.get(4)?;
    let note = row.get(5)?;

    Ok(Customer {
        id,
        owner_id,
        name,
        email,
        credit,
        note,
    })
}

/// Insert a new customer without recording any transaction.
///
/// Callers that open an account should use
/// [open_customer_account](crate::transaction::open_customer_account) so the
/// opening balance is recorded in the transaction history.
///
/// # Errors
/// This function will return an [Error::SqlError] if the owner does not exist
/// or there is some other SQL error.
pub(crate) fn insert_customer(
    customer: &NewCustomer,
    connection: &Connection,
) -> Result<Customer, Error> {
    connection
        .prepare(
            "INSERT INTO customer (owner_id, name, email, credit, note)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, owner_id, name, email, credit, note",
        )?
        .query_row(
            params![
                customer.owner_id,
                customer.name,
                customer.email,
                customer.credit,
                customer.note
            ],
            map_customer_row,
        )
        .map_err(Error::from)
}

/// Retrieve a customer from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::CustomerNotFound] if `id` does not refer to a stored customer,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_customer(id: CustomerId, connection: &Connection) -> Result<Customer, Error> {
    connection
        .prepare("SELECT id, owner_id, name, email, credit, note FROM customer WHERE id = :id")?
        .query_row(&[(":id", &id)], map_customer_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::CustomerNotFound,
            error => error.into(),
        })
}

/// Write every field of `customer` except its owner back to the database.
///
/// # Errors
/// This function will return a:
/// - [Error::CustomerNotFound] if `customer.id` does not refer to a stored customer,
/// - or [Error::SqlError] there is some other SQL error.
pub fn save_customer(customer: &Customer, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE customer
        SET \
            name = ?1, \
            email = ?2, \
            credit = ?3, \
            note = ?4 \
        WHERE id = ?5;",
        params![
            customer.name,
            customer.email,
            customer.credit,
            customer.note,
            customer.id
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::CustomerNotFound);
    }

    Ok(())
}

/// Get the total number of customers in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_customers(connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM customer;", [], |row| row.get::<_, i64>(0))
        .map(|count| count as u64)
        .map_err(|error| error.into())
}
