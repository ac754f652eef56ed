//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/customers/{customer_id}/', use [format_endpoint].

/// The prefix under which the API routes are also served for the web frontend.
pub const API_PREFIX: &str = "/api";
/// The route for listing and creating customers.
pub const CUSTOMERS: &str = "/customers/";
/// The route for reading and updating a single customer.
pub const CUSTOMER: &str = "/customers/{customer_id}/";
/// The route for the credit transaction history of a single customer.
pub const CUSTOMER_TRANSACTIONS: &str = "/customers/{customer_id}/transactions/";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace and ends with a right brace.
/// For example, in the endpoint path '/customers/{customer_id}/', '{customer_id}' is the parameter.
///
/// If no parameter is found in `endpoint_path`, it is returned unchanged.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
