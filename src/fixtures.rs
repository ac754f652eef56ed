//! Loads seed data from JSON fixture files.
//!
//! A fixture file holds an array of records such as:
//!
//! ```json
//! [
//!     {"model": "customers.businessowner", "pk": 1, "fields": {"username": "sam", "password": "hunter2"}},
//!     {"model": "customers.customer", "pk": 1, "fields": {"owner": 1, "name": "Alice", "email": "alice@example.com", "credit": "12.50"}}
//! ]
//! ```
//!
//! Records are upserted by their primary key, so loading the same file twice
//! leaves the database unchanged.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::{OffsetDateTime, UtcOffset};

use crate::{
    Credit, CredentialHash, Error,
    database_id::{BusinessOwnerId, CustomerId, TransactionId},
    transaction::DEFAULT_DESCRIPTION,
};

#[derive(Debug, Deserialize)]
#[serde(tag = "model")]
enum FixtureRecord {
    #[serde(rename = "customers.businessowner")]
    BusinessOwner {
        pk: BusinessOwnerId,
        fields: BusinessOwnerFields,
    },
    #[serde(rename = "customers.customer")]
    Customer {
        pk: CustomerId,
        fields: CustomerFields,
    },
    #[serde(rename = "customers.transaction")]
    Transaction {
        pk: TransactionId,
        fields: TransactionFields,
    },
}

#[derive(Debug, Deserialize)]
struct BusinessOwnerFields {
    username: String,
    /// Either plaintext or an existing bcrypt hash.
    password: String,
}

#[derive(Debug, Deserialize)]
struct CustomerFields {
    owner: BusinessOwnerId,
    name: String,
    email: String,
    credit: Decimal,
    #[serde(default)]
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionFields {
    customer: CustomerId,
    previous_credit: Decimal,
    new_credit: Decimal,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    created_at: Option<OffsetDateTime>,
}

/// Load every `*.json` file in `directory`, in file name order.
///
/// `hash_cost` is the bcrypt cost used for plaintext owner credentials.
/// Returns the total number of records loaded.
///
/// # Errors
/// Returns [Error::FixtureIo] if the directory cannot be listed, or the first
/// error from [load_fixture_file]. Files loaded before the failing file stay loaded.
pub fn load_fixture_directory(
    directory: &Path,
    hash_cost: u32,
    connection: &Connection,
) -> Result<usize, Error> {
    let io_error =
        |error: io::Error| Error::FixtureIo(directory.display().to_string(), error.to_string());

    let mut paths = fs::read_dir(directory)
        .map_err(io_error)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<PathBuf>, _>>()
        .map_err(io_error)?;
    paths.retain(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"));
    paths.sort();

    let mut record_count = 0;

    for path in paths {
        record_count += load_fixture_file(&path, hash_cost, connection)?;
    }

    Ok(record_count)
}

/// Load the records in a single fixture file inside one SQL transaction.
///
/// If any record cannot be loaded, none of the records in the file are kept.
///
/// # Errors
/// This function will return a:
/// - [Error::FixtureIo] if the file cannot be read,
/// - [Error::InvalidFixture] if the file is not a list of known records or a record
///   cannot be stored, e.g. it refers to a missing owner or customer,
/// - or [Error::SqlError] if the SQL transaction cannot be started or committed.
pub fn load_fixture_file(
    path: &Path,
    hash_cost: u32,
    connection: &Connection,
) -> Result<usize, Error> {
    let path_text = path.display().to_string();
    tracing::info!("Loading fixture: {path_text}");

    let contents = fs::read_to_string(path)
        .map_err(|error| Error::FixtureIo(path_text.clone(), error.to_string()))?;
    let records: Vec<FixtureRecord> = serde_json::from_str(&contents)
        .map_err(|error| Error::InvalidFixture(path_text.clone(), error.to_string()))?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    for (index, record) in records.iter().enumerate() {
        upsert_record(record, hash_cost, &transaction).map_err(|error| {
            tracing::error!("Could not load record {index} of {path_text}: {error}");
            Error::InvalidFixture(path_text.clone(), format!("record {index}: {error}"))
        })?;
    }

    transaction.commit()?;
    tracing::debug!("Loaded {} records from {path_text}", records.len());

    Ok(records.len())
}

fn upsert_record(
    record: &FixtureRecord,
    hash_cost: u32,
    connection: &Connection,
) -> Result<(), Error> {
    match record {
        FixtureRecord::BusinessOwner { pk, fields } => {
            let credential = if CredentialHash::is_hash(&fields.password) {
                CredentialHash::new_unchecked(&fields.password)
            } else {
                CredentialHash::from_plaintext(&fields.password, hash_cost)?
            };

            connection.execute(
                "INSERT INTO business_owner (id, username, password) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET username = excluded.username, password = excluded.password",
                (pk, &fields.username, credential.as_ref()),
            )?;
        }
        FixtureRecord::Customer { pk, fields } => {
            connection.execute(
                "INSERT INTO customer (id, owner_id, name, email, credit, note)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET owner_id = excluded.owner_id, name = excluded.name,
                    email = excluded.email, credit = excluded.credit, note = excluded.note",
                (
                    pk,
                    fields.owner,
                    &fields.name,
                    &fields.email,
                    Credit::new(fields.credit)?,
                    &fields.note,
                ),
            )?;
        }
        FixtureRecord::Transaction { pk, fields } => {
            connection.execute(
                "INSERT INTO credit_transaction (id, customer_id, previous_credit, new_credit, description, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET customer_id = excluded.customer_id,
                    previous_credit = excluded.previous_credit, new_credit = excluded.new_credit,
                    description = excluded.description, created_at = excluded.created_at",
                (
                    pk,
                    fields.customer,
                    Credit::new(fields.previous_credit)?,
                    Credit::new(fields.new_credit)?,
                    fields.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION),
                    fields
                        .created_at
                        .unwrap_or_else(OffsetDateTime::now_utc)
                        .to_offset(UtcOffset::UTC),
                ),
            )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path, str::FromStr};

    use rusqlite::Connection;
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use time::macros::datetime;

    use crate::{
        Credit, CredentialHash, Error,
        business_owner::{count_business_owners, get_first_business_owner},
        customer::{count_customers, get_customer},
        db::initialize,
        transaction::{DEFAULT_DESCRIPTION, get_transaction_history},
    };

    use super::{load_fixture_directory, load_fixture_file};

    const TEST_HASH_COST: u32 = 4;

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[track_caller]
    fn must_write(dir: &Path, file_name: &str, records: Value) {
        fs::write(dir.join(file_name), records.to_string()).expect("could not write fixture file");
    }

    fn owner_record() -> Value {
        json!({
            "model": "customers.businessowner",
            "pk": 1,
            "fields": { "username": "sam", "password": "hunter2" }
        })
    }

    fn customer_record(pk: i64, credit: &str) -> Value {
        json!({
            "model": "customers.customer",
            "pk": pk,
            "fields": {
                "owner": 1,
                "name": format!("Customer {pk}"),
                "email": format!("customer{pk}@example.com"),
                "credit": credit,
            }
        })
    }

    #[test]
    fn loads_directory_in_file_name_order() {
        let dir = TempDir::new().unwrap();
        // Customers refer to the owner, so the owner file has to load first.
        must_write(dir.path(), "2_customers.json", json!([customer_record(1, "12.50")]));
        must_write(dir.path(), "1_owners.json", json!([owner_record()]));
        fs::write(dir.path().join("README.txt"), "not a fixture").unwrap();
        let conn = get_test_connection();

        let loaded = load_fixture_directory(dir.path(), TEST_HASH_COST, &conn).unwrap();

        assert_eq!(loaded, 2);
        assert_eq!(count_business_owners(&conn), Ok(1));
        let customer = get_customer(1, &conn).unwrap();
        assert_eq!(customer.credit, Credit::from_str("12.50").unwrap());
        assert_eq!(customer.note, None);
    }

    #[test]
    fn hashes_plaintext_credentials() {
        let dir = TempDir::new().unwrap();
        must_write(dir.path(), "owners.json", json!([owner_record()]));
        let conn = get_test_connection();

        load_fixture_file(&dir.path().join("owners.json"), TEST_HASH_COST, &conn).unwrap();

        let owner = get_first_business_owner(&conn).unwrap();
        assert_eq!(owner.username, "sam");
        assert_ne!(owner.credential.as_ref(), "hunter2");
        assert!(owner.credential.verify("hunter2").unwrap());
    }

    #[test]
    fn keeps_existing_hashes() {
        let hash = CredentialHash::from_plaintext("hunter2", TEST_HASH_COST).unwrap();
        let dir = TempDir::new().unwrap();
        must_write(
            dir.path(),
            "owners.json",
            json!([{
                "model": "customers.businessowner",
                "pk": 1,
                "fields": { "username": "sam", "password": hash.as_ref() }
            }]),
        );
        let conn = get_test_connection();

        load_fixture_directory(dir.path(), TEST_HASH_COST, &conn).unwrap();

        assert_eq!(get_first_business_owner(&conn).unwrap().credential, hash);
    }

    #[test]
    fn loading_twice_upserts_by_primary_key() {
        let dir = TempDir::new().unwrap();
        must_write(
            dir.path(),
            "seed.json",
            json!([owner_record(), customer_record(1, "5"), customer_record(2, "7")]),
        );
        let conn = get_test_connection();

        load_fixture_directory(dir.path(), TEST_HASH_COST, &conn).unwrap();
        must_write(
            dir.path(),
            "seed.json",
            json!([owner_record(), customer_record(1, "9.99")]),
        );
        load_fixture_directory(dir.path(), TEST_HASH_COST, &conn).unwrap();

        assert_eq!(count_business_owners(&conn), Ok(1));
        assert_eq!(count_customers(&conn), Ok(2));
        assert_eq!(
            get_customer(1, &conn).unwrap().credit,
            Credit::from_str("9.99").unwrap()
        );
    }

    #[test]
    fn loads_transactions_with_defaults() {
        let dir = TempDir::new().unwrap();
        must_write(
            dir.path(),
            "seed.json",
            json!([
                owner_record(),
                customer_record(1, "15"),
                {
                    "model": "customers.transaction",
                    "pk": 1,
                    "fields": {
                        "customer": 1,
                        "previous_credit": "0",
                        "new_credit": "10",
                        "description": "Opening balance",
                        "created_at": "2024-01-01T09:30:00Z"
                    }
                },
                {
                    "model": "customers.transaction",
                    "pk": 2,
                    "fields": { "customer": 1, "previous_credit": 10, "new_credit": 15 }
                }
            ]),
        );
        let conn = get_test_connection();

        load_fixture_directory(dir.path(), TEST_HASH_COST, &conn).unwrap();

        let history = get_transaction_history(1, &conn).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, 2);
        assert_eq!(history[0].description, DEFAULT_DESCRIPTION);
        assert!(history[0].created_at > datetime!(2024-01-01 09:30 UTC));
        assert_eq!(history[1].description, "Opening balance");
        assert_eq!(history[1].created_at, datetime!(2024-01-01 09:30 UTC));
        assert_eq!(history[1].new_credit, Credit::from_str("10").unwrap());
    }

    #[test]
    fn orders_transactions_with_different_offsets_by_instant() {
        let dir = TempDir::new().unwrap();
        must_write(
            dir.path(),
            "seed.json",
            json!([
                owner_record(),
                customer_record(1, "20"),
                {
                    "model": "customers.transaction",
                    "pk": 1,
                    "fields": {
                        "customer": 1,
                        "previous_credit": "0",
                        "new_credit": "10",
                        "created_at": "2024-03-04T01:00:00+05:00"
                    }
                },
                {
                    "model": "customers.transaction",
                    "pk": 2,
                    "fields": {
                        "customer": 1,
                        "previous_credit": "10",
                        "new_credit": "20",
                        "created_at": "2024-03-03T21:00:00Z"
                    }
                }
            ]),
        );
        let conn = get_test_connection();

        load_fixture_directory(dir.path(), TEST_HASH_COST, &conn).unwrap();

        let history = get_transaction_history(1, &conn).unwrap();
        assert_eq!(
            history.iter().map(|transaction| transaction.id).collect::<Vec<_>>(),
            vec![2, 1]
        );
        assert_eq!(history[0].new_credit, get_customer(1, &conn).unwrap().credit);
        assert_eq!(history[1].created_at, datetime!(2024-03-03 20:00 UTC));
    }

    #[test]
    fn bad_record_rolls_back_its_file() {
        let dir = TempDir::new().unwrap();
        must_write(
            dir.path(),
            "seed.json",
            // Customer 2 refers to an owner that does not exist.
            json!([owner_record(), customer_record(1, "1"), {
                "model": "customers.customer",
                "pk": 2,
                "fields": { "owner": 99, "name": "Nobody", "email": "x@example.com", "credit": "1" }
            }]),
        );
        let conn = get_test_connection();

        let result = load_fixture_directory(dir.path(), TEST_HASH_COST, &conn);

        assert!(matches!(result, Err(Error::InvalidFixture(_, _))));
        assert_eq!(count_business_owners(&conn), Ok(0));
        assert_eq!(count_customers(&conn), Ok(0));
    }

    #[test]
    fn unknown_model_is_invalid() {
        let dir = TempDir::new().unwrap();
        must_write(
            dir.path(),
            "seed.json",
            json!([{ "model": "auth.user", "pk": 1, "fields": {} }]),
        );
        let conn = get_test_connection();

        let result = load_fixture_directory(dir.path(), TEST_HASH_COST, &conn);

        assert!(matches!(result, Err(Error::InvalidFixture(_, _))));
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let conn = get_test_connection();

        let result = load_fixture_directory(&dir.path().join("missing"), TEST_HASH_COST, &conn);

        assert!(matches!(result, Err(Error::FixtureIo(_, _))));
    }

    #[test]
    fn bundled_fixtures_have_consistent_credit_history() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
        let conn = get_test_connection();

        load_fixture_directory(&dir, TEST_HASH_COST, &conn).unwrap();

        for customer_id in 1..=count_customers(&conn).unwrap() as i64 {
            let customer = get_customer(customer_id, &conn).unwrap();
            let history = get_transaction_history(customer_id, &conn).unwrap();
            assert_eq!(
                history.first().map(|transaction| transaction.new_credit),
                Some(customer.credit),
                "latest transaction of customer {customer_id} should match their credit"
            );
        }
    }
}
