//! Customers of a business owner and the route handlers for managing them.
//!
//! This module contains:
//! - The `Customer` model and its database functions
//! - Paged, searchable customer listings
//! - The route handlers for listing, creating, reading and updating customers

mod core;
mod create_endpoint;
mod detail_endpoint;
mod edit_endpoint;
mod list_endpoint;
mod query;

#[cfg(test)]
pub use core::count_customers;
pub(crate) use core::insert_customer;
pub use core::{
    Customer, CustomerView, NewCustomer, create_customer_table, get_customer, map_customer_row,
    save_customer,
};
pub use create_endpoint::create_customer_endpoint;
pub use detail_endpoint::{CustomerDetailState, get_customer_endpoint};
pub use edit_endpoint::update_customer_endpoint;
pub use list_endpoint::list_customers_endpoint;
pub use query::{CustomerPage, list_customers};
