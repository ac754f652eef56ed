//! Defines the endpoint for listing customers a page at a time.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    customer::{CustomerPage, list_customers},
    pagination::PaginationConfig,
};

/// The state needed to list customers.
#[derive(Debug, Clone)]
pub struct ListCustomersState {
    /// The database connection for reading customers.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls page sizes.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ListCustomersState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query parameters for the customer listing.
///
/// Numbers are kept as text so that malformed values fall back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListCustomersQuery {
    /// The number of customers per page.
    pub page_size: Option<String>,
    /// The 1-indexed page number.
    pub page: Option<String>,
    /// Text to look for in customer names and emails.
    pub search: Option<String>,
}

/// A route handler for a page of customers, optionally filtered by a search term.
pub async fn list_customers_endpoint(
    State(state): State<ListCustomersState>,
    Query(query): Query<ListCustomersQuery>,
) -> Result<Json<CustomerPage>, Error> {
    let page_size = state.pagination_config.page_size(query.page_size.as_deref());
    let page = state.pagination_config.page(query.page.as_deref());
    let search = query.search.unwrap_or_default();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    list_customers(page_size, page, &search, &connection).map(Json)
}
