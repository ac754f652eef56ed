//! Request extractors that reject with the application's JSON errors.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request, rejection::JsonRejection},
    http::request::Parts,
};

use crate::{Error, database_id::CustomerId};

/// The customer ID from a route such as `/customers/{customer_id}/`.
///
/// An ID that is not an integer cannot refer to a customer, so it is rejected
/// with [Error::CustomerNotFound].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerIdPath(pub CustomerId);

impl<S> FromRequestParts<S> for CustomerIdPath
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<CustomerId>::from_request_parts(parts, state)
            .await
            .map(|Path(customer_id)| Self(customer_id))
            .map_err(|rejection| {
                tracing::debug!("Could not parse customer ID: {rejection}");
                Error::CustomerNotFound
            })
    }
}

/// A JSON request body that rejects with [Error::InvalidRequestBody].
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(request, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection| Error::InvalidRequestBody(rejection.body_text()))
    }
}
