//! Salted and hashed credentials for business owners.
//!
//! Credentials are only ever stored, never verified by an endpoint.

use std::fmt::Display;

use bcrypt::{BcryptError, hash, verify};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A salted and hashed business owner credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialHash(String);

impl CredentialHash {
    /// An alias for the default encryption cost for hashing credentials.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash a plaintext credential with the specified `cost`.
    ///
    /// `cost` increases the rounds of hashing and therefore the time needed to verify a credential.
    /// Pass in [CredentialHash::DEFAULT_COST] to use the recommended cost.
    ///
    /// # Errors
    ///
    /// This function will return an error if the credential could not be hashed.
    pub fn from_plaintext(credential: &str, cost: u32) -> Result<Self, Error> {
        hash(credential, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Create a new `CredentialHash` without any validation.
    ///
    /// The caller should ensure that `raw_hash` is a valid bcrypt hash.
    pub fn new_unchecked(raw_hash: &str) -> Self {
        Self(raw_hash.to_string())
    }

    /// Whether `value` is already in the bcrypt modular crypt format, e.g. `$2b$12$...`.
    pub fn is_hash(value: &str) -> bool {
        let mut parts = value.split('$');

        matches!(
            (parts.next(), parts.next(), parts.next(), parts.next()),
            (Some(""), Some("2a" | "2b" | "2x" | "2y"), Some(cost), Some(rest))
                if cost.len() == 2 && cost.bytes().all(|b| b.is_ascii_digit()) && rest.len() == 53
        )
    }

    /// Check that `credential` matches the stored hash.
    pub fn verify(&self, credential: &str) -> Result<bool, BcryptError> {
        verify(credential, &self.0)
    }
}

impl AsRef<str> for CredentialHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CredentialHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
