//! Defines the endpoint for reading a single customer.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    customer::{CustomerView, get_customer},
    extract::CustomerIdPath,
};

/// The state needed to read or update a single customer.
#[derive(Debug, Clone)]
pub struct CustomerDetailState {
    /// The database connection for managing customers.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CustomerDetailState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for reading a single customer.
pub async fn get_customer_endpoint(
    State(state): State<CustomerDetailState>,
    CustomerIdPath(customer_id): CustomerIdPath,
) -> Result<Json<CustomerView>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_customer(customer_id, &connection).map(|customer| Json(customer.into()))
}
