//! Credit Tracker is a small web backend for tracking the credit balances of
//! customers on behalf of business owners.
//!
//! This library provides a JSON REST API for listing, creating and updating
//! customers. Every change to a customer's credit is mirrored into an
//! append-only history of credit transactions.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod business_owner;
mod credential;
mod credit;
mod customer;
mod database_id;
mod db;
mod endpoints;
mod extract;
mod fixtures;
mod logging;
mod pagination;
mod routing;
mod transaction;

pub use app_state::AppState;
pub use business_owner::{
    BusinessOwner, count_business_owners, create_business_owner, get_first_business_owner,
};
pub use credential::CredentialHash;
pub use credit::Credit;
pub use db::initialize as initialize_db;
pub use fixtures::{load_fixture_directory, load_fixture_file};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The customer ID in the request does not refer to a stored customer.
    #[error("Customer not found")]
    CustomerNotFound,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("Not found")]
    NotFound,

    /// A field required to create a customer was absent or null.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The credit value cannot be stored with 10 digits and 2 decimal places.
    #[error("Invalid credit value: {0}")]
    InvalidCredit(String),

    /// The request body could not be parsed as the expected JSON object.
    #[error("Invalid request body: {0}")]
    InvalidRequestBody(String),

    /// A customer was created before any business owner exists to own it.
    #[error("no business owner exists to own the customer")]
    NoBusinessOwner,

    /// An unexpected error occurred with the underlying hashing library.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A fixture file contained a record that could not be loaded.
    #[error("invalid fixture {0}: {1}")]
    InvalidFixture(String, String),

    /// A fixture file or directory could not be read.
    #[error("could not read fixtures from {0}: {1}")]
    FixtureIo(String, String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::CustomerNotFound | Error::NotFound => StatusCode::NOT_FOUND,
            Error::MissingField(_) | Error::InvalidCredit(_) | Error::InvalidRequestBody(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
