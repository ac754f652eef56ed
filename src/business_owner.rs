//! Code for creating the business owner table and fetching owners from the database.

use rusqlite::{Connection, Row};
use serde::Serialize;

use crate::{CredentialHash, Error, database_id::BusinessOwnerId};

/// The owner of a set of customers.
///
/// Owners are created out-of-band (fixtures or the `create_business_owner`
/// utility) and are never changed by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessOwner {
    /// The owner's ID in the application database.
    pub id: BusinessOwnerId,
    /// The owner's user name. Not required to be unique.
    pub username: String,
    /// The owner's hashed credential.
    #[serde(skip)]
    pub credential: CredentialHash,
}

/// Create the business owner table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_business_owner_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS business_owner (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new business owner into the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn create_business_owner(
    username: &str,
    credential: CredentialHash,
    connection: &Connection,
) -> Result<BusinessOwner, Error> {
    connection
        .prepare(
            "INSERT INTO business_owner (username, password) VALUES (?1, ?2)
             RETURNING id, username, password",
        )?
        .query_row((username, credential.as_ref()), map_business_owner_row)
        .map_err(Error::from)
}

/// Get the business owner with the lowest ID.
///
/// New customers are attached to this owner.
///
/// # Errors
///
/// Returns [Error::NoBusinessOwner] if there are no owners in the database,
/// or [Error::SqlError] if there is some other SQL error.
pub fn get_first_business_owner(connection: &Connection) -> Result<BusinessOwner, Error> {
    connection
        .prepare("SELECT id, username, password FROM business_owner ORDER BY id ASC LIMIT 1")?
        .query_row([], map_business_owner_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::NoBusinessOwner,
            error => error.into(),
        })
}

/// Get the number of business owners in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_business_owners(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM business_owner;", [], |row| {
            row.get::<_, i64>(0)
        })
        .map(|count| count as usize)
        .map_err(|error| error.into())
}

fn map_business_owner_row(row: &Row) -> Result<BusinessOwner, rusqlite::Error> {
    let id = row.get(0)?;
    let username = row.get(1)?;
    let raw_credential: String = row.get(2)?;

    Ok(BusinessOwner {
        id,
        username,
        credential: CredentialHash::new_unchecked(&raw_credential),
    })
}
