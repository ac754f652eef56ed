//! Paged, searchable listing of customers.

use rusqlite::{Connection, params};
use serde::Serialize;

use crate::{
    Error,
    customer::{Customer, map_customer_row},
    pagination::PageWindow,
};

/// One page of customers matching a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerPage {
    /// The customers on the page, in ascending ID order.
    pub customers: Vec<Customer>,
    /// The number of pages of matching customers, at least 1.
    pub total_pages: u64,
    /// The page that was returned, after clamping to the last page.
    pub current_page: u64,
    /// The number of customers matching the search across all pages.
    pub total_customers: u64,
}

/// Get a page of customers ordered by ascending ID.
///
/// If `search` is non-empty, only customers whose name or email contains
/// `search` (ignoring case) are included. The connection must have been set up
/// with [initialize](crate::db::initialize). `page` is 1-indexed and is
/// clamped to the last page when it is past the end.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn list_customers(
    page_size: u64,
    page: u64,
    search: &str,
    connection: &Connection,
) -> Result<CustomerPage, Error> {
    let search_term = (!search.is_empty()).then(|| search.to_lowercase());

    let total_customers: i64 = connection
        .prepare(
            "SELECT COUNT(id) FROM customer
             WHERE ?1 IS NULL
                OR instr(unicode_lower(name), ?1) > 0
                OR instr(unicode_lower(email), ?1) > 0",
        )?
        .query_row(params![search_term], |row| row.get(0))?;

    let total_customers = total_customers as u64;
    let window = PageWindow::new(total_customers, page_size, page);

    let customers = connection
        .prepare(
            "SELECT id, owner_id, name, email, credit, note FROM customer
             WHERE ?1 IS NULL
                OR instr(unicode_lower(name), ?1) > 0
                OR instr(unicode_lower(email), ?1) > 0
             ORDER BY id ASC
             LIMIT ?2 OFFSET ?3",
        )?
        .query_map(
            params![search_term, window.limit as i64, window.offset as i64],
            map_customer_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CustomerPage {
        customers,
        total_pages: window.total_pages,
        current_page: window.current_page,
        total_customers,
    })
}
