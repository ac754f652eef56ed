//! Application router configuration.

use axum::{Router, middleware, routing::get};

use crate::{
    AppState, Error,
    customer::{
        create_customer_endpoint, get_customer_endpoint, list_customers_endpoint,
        update_customer_endpoint,
    },
    endpoints,
    logging::logging_middleware,
    transaction::get_transaction_history_endpoint,
};

/// Return a router with all the app's routes.
///
/// The customer routes are served from the root and again under
/// [endpoints::API_PREFIX] for the web frontend.
pub fn build_router(state: AppState) -> Router {
    let customer_routes = Router::new()
        .route(
            endpoints::CUSTOMERS,
            get(list_customers_endpoint).post(create_customer_endpoint),
        )
        .route(
            endpoints::CUSTOMER,
            get(get_customer_endpoint).put(update_customer_endpoint),
        )
        .route(
            endpoints::CUSTOMER_TRANSACTIONS,
            get(get_transaction_history_endpoint),
        );

    Router::new()
        .merge(customer_routes.clone())
        .nest(endpoints::API_PREFIX, customer_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{
        AppState, CredentialHash, create_business_owner,
        endpoints::{self, format_endpoint},
        pagination::PaginationConfig,
    };

    use super::build_router;

    fn get_test_server() -> TestServer {
        let conn = Connection::open_in_memory().unwrap();
        let state = AppState::new(conn, PaginationConfig::default()).unwrap();
        create_business_owner(
            "owner",
            CredentialHash::new_unchecked("hash"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[track_caller]
    fn must_get_id(customer: &Value) -> i64 {
        customer["id"].as_i64().expect("customer should have an integer ID")
    }

    #[tokio::test]
    async fn created_customer_can_be_read_back() {
        let server = get_test_server();

        let response = server
            .post(endpoints::CUSTOMERS)
            .json(&json!({
                "name": "Alice",
                "email": "alice@example.com",
                "credit": 100.5,
                "note": "pays on Fridays",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created = response.json::<Value>();
        assert_eq!(created["credit"], json!("100.50"));
        assert!(created.get("owner_id").is_none());

        let id = must_get_id(&created);
        let fetched = server
            .get(&format_endpoint(endpoints::CUSTOMER, id))
            .await
            .json::<Value>();

        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn updating_credit_appends_to_history() {
        let server = get_test_server();
        let created = server
            .post(endpoints::CUSTOMERS)
            .json(&json!({ "name": "Bob", "email": "bob@example.com", "credit": "20" }))
            .await
            .json::<Value>();
        let id = must_get_id(&created);

        let updated = server
            .put(&format_endpoint(endpoints::CUSTOMER, id))
            .json(&json!({ "credit": 12.25, "transaction_description": "Paid for lunch" }))
            .await
            .json::<Value>();
        assert_eq!(updated["credit"], json!("12.25"));

        let history = server
            .get(&format_endpoint(endpoints::CUSTOMER_TRANSACTIONS, id))
            .await
            .json::<Value>();

        assert_eq!(
            history[0]["description"],
            json!("Paid for lunch"),
            "newest transaction should come first"
        );
        assert_eq!(history[0]["previous_credit"], json!(20.0));
        assert_eq!(history[0]["new_credit"], json!(12.25));
        assert_eq!(history[0]["credit_change"], json!(-7.75));
        assert_eq!(history[1]["previous_credit"], json!(0.0));
        assert_eq!(history.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn missing_field_is_bad_request() {
        let server = get_test_server();

        let response = server
            .post(endpoints::CUSTOMERS)
            .json(&json!({ "name": "Alice", "credit": 1 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Missing required field: email" }));
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let server = get_test_server();

        let response = server.post(endpoints::CUSTOMERS).text("{").await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_customer_is_not_found() {
        let server = get_test_server();
        let want = json!({ "error": "Customer not found" });

        let response = server.get(&format_endpoint(endpoints::CUSTOMER, 42)).await;
        response.assert_status_not_found();
        response.assert_json(&want);

        let response = server
            .put(&format_endpoint(endpoints::CUSTOMER, 42))
            .json(&json!({ "name": "Nobody" }))
            .await;
        response.assert_status_not_found();
        response.assert_json(&want);

        let response = server
            .get(&format_endpoint(endpoints::CUSTOMER_TRANSACTIONS, 42))
            .await;
        response.assert_status_not_found();
        response.assert_json(&want);
    }

    #[tokio::test]
    async fn non_integer_id_is_not_found() {
        let server = get_test_server();

        let response = server.get("/customers/abc/").await;

        response.assert_status_not_found();
        response.assert_json(&json!({ "error": "Customer not found" }));
    }

    #[tokio::test]
    async fn routes_are_also_served_under_api_prefix() {
        let server = get_test_server();

        let response = server
            .get(&format!("{}{}", endpoints::API_PREFIX, endpoints::CUSTOMERS))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "customers": [],
            "total_pages": 1,
            "current_page": 1,
            "total_customers": 0,
        }));
    }

    #[tokio::test]
    async fn listing_pages_and_searches() {
        let server = get_test_server();
        for (name, email) in [
            ("Alice", "alice@example.com"),
            ("Bob", "bob@example.com"),
            ("Carol", "carol@alice.org"),
        ] {
            server
                .post(endpoints::CUSTOMERS)
                .json(&json!({ "name": name, "email": email, "credit": 0 }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let page = server
            .get(endpoints::CUSTOMERS)
            .add_query_param("search", "ALICE")
            .add_query_param("page_size", 1)
            .add_query_param("page", 2)
            .await
            .json::<Value>();

        assert_eq!(page["total_customers"], json!(2));
        assert_eq!(page["total_pages"], json!(2));
        assert_eq!(page["current_page"], json!(2));
        assert_eq!(page["customers"][0]["name"], json!("Carol"));
        assert_eq!(page["customers"][0]["owner_id"], json!(1));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        let response = server.get("/coffee").await;

        response.assert_status_not_found();
        response.assert_json(&json!({ "error": "Not found" }));
    }
}
