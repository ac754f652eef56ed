//! Defines the endpoint for updating a customer.
use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use crate::{
    Credit, Error,
    customer::{CustomerDetailState, CustomerView},
    extract::{CustomerIdPath, JsonBody},
    transaction::{CustomerChanges, update_customer},
};

/// The JSON body for updating a customer. Every field is optional.
///
/// Unknown fields, such as the `id` echoed back by the web frontend, are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCustomerRequest {
    /// A new name.
    pub name: Option<String>,
    /// A new email address.
    pub email: Option<String>,
    /// A new credit balance, as a JSON number or decimal string.
    pub credit: Option<Decimal>,
    /// A new note. An explicit `null` clears the note, omitting it keeps the note.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub note: Option<Option<String>>,
    /// The description for the transaction recorded if the credit changes.
    pub transaction_description: Option<String>,
}

/// Marks a field that is present in the JSON as `Some`, even if it is `null`.
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl TryFrom<UpdateCustomerRequest> for CustomerChanges {
    type Error = Error;

    fn try_from(request: UpdateCustomerRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: request.name,
            email: request.email,
            note: request.note,
            credit: request.credit.map(Credit::new).transpose()?,
            transaction_description: request.transaction_description,
        })
    }
}

/// A route handler for updating a customer.
///
/// A transaction is recorded only if the credit changes.
pub async fn update_customer_endpoint(
    State(state): State<CustomerDetailState>,
    CustomerIdPath(customer_id): CustomerIdPath,
    JsonBody(request): JsonBody<UpdateCustomerRequest>,
) -> Result<Json<CustomerView>, Error> {
    let changes = CustomerChanges::try_from(request)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let update = update_customer(customer_id, changes, &connection)
        .inspect_err(|error| tracing::debug!("Could not update customer {customer_id}: {error}"))?;

    Ok(Json(update.customer.into()))
}

#[cfg(test)]
mod tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use axum::extract::State;
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{
        Credit, CredentialHash, Error, create_business_owner,
        customer::{Customer, CustomerDetailState, NewCustomer},
        db::initialize,
        extract::{CustomerIdPath, JsonBody},
        transaction::{count_transactions, open_customer_account},
    };

    use super::{UpdateCustomerRequest, update_customer_endpoint};

    fn get_test_state() -> (CustomerDetailState, Customer) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        create_business_owner("owner", CredentialHash::new_unchecked("hash"), &conn).unwrap();
        let (customer, _) = open_customer_account(
            NewCustomer {
                owner_id: 1,
                name: "Alice".to_owned(),
                email: "alice@example.com".to_owned(),
                credit: Credit::from_str("100.00").unwrap(),
                note: Some("VIP".to_owned()),
            },
            None,
            &conn,
        )
        .unwrap();

        (
            CustomerDetailState {
                db_connection: Arc::new(Mutex::new(conn)),
            },
            customer,
        )
    }

    fn request(body: serde_json::Value) -> UpdateCustomerRequest {
        serde_json::from_value(body).expect("could not parse test request")
    }

    #[test]
    fn distinguishes_null_note_from_missing_note() {
        assert_eq!(request(json!({})).note, None);
        assert_eq!(request(json!({ "note": null })).note, Some(None));
        assert_eq!(
            request(json!({ "note": "hi" })).note,
            Some(Some("hi".to_owned()))
        );
    }

    #[test]
    fn accepts_credit_as_string_and_ignores_unknown_fields() {
        let parsed = request(json!({ "id": 1, "credit": "75.50" }));

        assert_eq!(parsed.credit.map(|c| c.to_string()), Some("75.50".to_owned()));
    }

    #[tokio::test]
    async fn updates_fields_and_records_credit_change() {
        let (state, customer) = get_test_state();

        let view = update_customer_endpoint(
            State(state.clone()),
            CustomerIdPath(customer.id),
            JsonBody(request(json!({ "name": "Alice Smith", "credit": 75.5 }))),
        )
        .await
        .unwrap()
        .0;

        assert_eq!(view.name, "Alice Smith");
        assert_eq!(view.email, "alice@example.com");
        assert_eq!(view.credit, Credit::from_str("75.50").unwrap());
        assert_eq!(view.note.as_deref(), Some("VIP"));
        assert_eq!(
            count_transactions(customer.id, &state.db_connection.lock().unwrap()),
            Ok(2)
        );
    }

    #[tokio::test]
    async fn unchanged_credit_records_nothing() {
        let (state, customer) = get_test_state();

        update_customer_endpoint(
            State(state.clone()),
            CustomerIdPath(customer.id),
            JsonBody(request(json!({ "credit": "100.00" }))),
        )
        .await
        .unwrap();

        assert_eq!(
            count_transactions(customer.id, &state.db_connection.lock().unwrap()),
            Ok(1)
        );
    }

    #[tokio::test]
    async fn unknown_customer_is_not_found() {
        let (state, _) = get_test_state();

        let result = update_customer_endpoint(
            State(state),
            CustomerIdPath(1337),
            JsonBody(request(json!({ "credit": 1 }))),
        )
        .await;

        assert_eq!(result.unwrap_err(), Error::CustomerNotFound);
    }
}
