//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The ID of a business owner.
pub type BusinessOwnerId = DatabaseId;
/// The ID of a customer.
pub type CustomerId = DatabaseId;
/// The ID of a credit transaction.
pub type TransactionId = DatabaseId;
