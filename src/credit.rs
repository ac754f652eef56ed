//! The fixed-point credit balance type shared by customers and transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Error;

/// A credit balance with exactly two decimal places and at most ten digits.
///
/// Credit values are compared as exact decimals, so `75.50` and `75.5` are equal.
/// The value is serialized as a decimal string, e.g. `"75.50"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Credit(Decimal);

impl Credit {
    /// The number of digits kept after the decimal point.
    pub const DECIMAL_PLACES: u32 = 2;
    /// The total number of digits a credit value may have.
    pub const MAX_DIGITS: u32 = 10;

    /// Create a credit value from a decimal.
    ///
    /// Extra fractional digits are rounded half-to-even to [Credit::DECIMAL_PLACES] places.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidCredit] if the rounded value needs more than
    /// [Credit::MAX_DIGITS] digits, i.e. its magnitude exceeds 99,999,999.99.
    pub fn new(value: Decimal) -> Result<Self, Error> {
        let mut rounded = value.round_dp(Self::DECIMAL_PLACES);

        if rounded.abs() > Self::max_magnitude() {
            return Err(Error::InvalidCredit(format!(
                "{value} does not fit in {} digits with {} decimal places",
                Self::MAX_DIGITS,
                Self::DECIMAL_PLACES
            )));
        }

        rounded.rescale(Self::DECIMAL_PLACES);

        Ok(Self(rounded))
    }

    /// A balance of zero, the implicit starting balance of every customer.
    pub fn zero() -> Self {
        Self(Decimal::new(0, Self::DECIMAL_PLACES))
    }

    /// The credit as a decimal with two decimal places.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    fn max_magnitude() -> Decimal {
        Decimal::new(9_999_999_999, Self::DECIMAL_PLACES)
    }
}

impl TryFrom<Decimal> for Credit {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Credit> for Decimal {
    fn from(credit: Credit) -> Self {
        credit.0
    }
}

impl FromStr for Credit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|error| Error::InvalidCredit(format!("\"{s}\": {error}")))?;

        Self::new(value)
    }
}

impl Display for Credit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// Credit is stored as TEXT so SQLite's numeric affinity never turns it into a float.
impl ToSql for Credit {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Credit {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let decimal = match value {
            ValueRef::Text(text) => {
                let text = std::str::from_utf8(text)
                    .map_err(|error| FromSqlError::Other(Box::new(error)))?;
                Decimal::from_str(text).map_err(|error| FromSqlError::Other(Box::new(error)))?
            }
            ValueRef::Integer(integer) => Decimal::from(integer),
            ValueRef::Real(real) => {
                Decimal::try_from(real).map_err(|error| FromSqlError::Other(Box::new(error)))?
            }
            _ => return Err(FromSqlError::InvalidType),
        };

        Credit::new(decimal).map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}
