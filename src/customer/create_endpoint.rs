//! Defines the endpoint for creating a new customer.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState, Credit, Error,
    business_owner::get_first_business_owner,
    customer::{CustomerView, NewCustomer},
    extract::JsonBody,
    transaction::open_customer_account,
};

/// The state needed to create a customer.
#[derive(Debug, Clone)]
pub struct CreateCustomerState {
    /// The database connection for managing customers.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCustomerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for creating a customer.
///
/// `name`, `email` and `credit` are required, but are optional here so that
/// a missing field can be reported by name.
#[derive(Debug, Default, Deserialize)]
pub struct CreateCustomerRequest {
    /// The customer's name.
    pub name: Option<String>,
    /// The customer's email address.
    pub email: Option<String>,
    /// The opening credit, as a JSON number or decimal string.
    pub credit: Option<Decimal>,
    /// An optional note about the customer.
    pub note: Option<String>,
    /// The description for the opening transaction.
    pub transaction_description: Option<String>,
}

/// A route handler for creating a new customer.
///
/// The customer is attached to the first business owner and their opening
/// credit is recorded as a transaction from zero.
pub async fn create_customer_endpoint(
    State(state): State<CreateCustomerState>,
    JsonBody(request): JsonBody<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerView>), Error> {
    let name = request.name.ok_or(Error::MissingField("name"))?;
    let email = request.email.ok_or(Error::MissingField("email"))?;
    let credit = Credit::new(request.credit.ok_or(Error::MissingField("credit"))?)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let owner = get_first_business_owner(&connection)?;

    let (customer, _) = open_customer_account(
        NewCustomer {
            owner_id: owner.id,
            name,
            email,
            credit,
            note: request.note,
        },
        request.transaction_description.as_deref(),
        &connection,
    )
    .inspect_err(|error| tracing::error!("Could not create customer: {error}"))?;

    Ok((StatusCode::CREATED, Json(customer.into())))
}
