//! Type-safe recipe price using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when validating a [`Price`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PriceError {
    /// The amount is negative.
    #[error("price cannot be negative")]
    Negative,
    /// The amount has more than two decimal places.
    #[error("price must have at most 2 decimal places")]
    TooPrecise,
    /// The amount does not fit the backing `numeric(5,2)` column.
    #[error("price must be less than {max}")]
    TooLarge {
        /// Exclusive upper bound.
        max: Decimal,
    },
}

/// A recipe price.
///
/// Wraps a [`Decimal`] constrained to fit the `numeric(5,2)` column: a
/// non-negative amount with at most two decimal places, below 1000.
/// Serialized as a decimal string (e.g. `"2.50"`), never floating point.
///
/// ## Examples
///
/// ```
/// use ladle_core::Price;
/// use rust_decimal::Decimal;
///
/// assert!(Price::new(Decimal::new(250, 2)).is_ok());   // 2.50
/// assert!(Price::new(Decimal::new(-1, 0)).is_err());   // negative
/// assert!(Price::new(Decimal::new(1234, 3)).is_err()); // 1.234
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Exclusive upper bound imposed by the `numeric(5,2)` column.
    pub const MAX_EXCLUSIVE: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

    /// Validate a decimal amount as a `Price`.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative, has more than two decimal
    /// places, or does not fit `numeric(5,2)`.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() {
            return Err(PriceError::Negative);
        }

        if amount.scale() > 2 && amount.normalize().scale() > 2 {
            return Err(PriceError::TooPrecise);
        }

        if amount >= Self::MAX_EXCLUSIVE {
            return Err(PriceError::TooLarge {
                max: Self::MAX_EXCLUSIVE,
            });
        }

        Ok(Self(amount))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values satisfy the column's check constraints
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid() {
        let price = Price::new(Decimal::new(250, 2)).unwrap();
        assert_eq!(price.amount(), Decimal::new(250, 2));
        assert!(Price::new(Decimal::ZERO).is_ok());
        assert!(Price::new(Decimal::new(99999, 2)).is_ok()); // 999.99
    }

    #[test]
    fn test_new_negative() {
        assert!(matches!(
            Price::new(Decimal::new(-250, 2)),
            Err(PriceError::Negative)
        ));
    }

    #[test]
    fn test_new_too_precise() {
        assert!(matches!(
            Price::new(Decimal::new(2505, 3)), // 2.505
            Err(PriceError::TooPrecise)
        ));
        // Trailing zeros beyond two places are fine: 2.500 == 2.50
        assert!(Price::new(Decimal::new(2500, 3)).is_ok());
    }

    #[test]
    fn test_new_too_large() {
        assert!(matches!(
            Price::new(Decimal::new(100_000, 2)), // 1000.00
            Err(PriceError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_serde() {
        // rust_decimal's serde-with-str feature serializes as a string
        let price: Price = serde_json::from_str("\"2.50\"").unwrap();
        assert_eq!(price.amount(), Decimal::new(250, 2));

        assert!(serde_json::from_str::<Price>("\"-1.00\"").is_err());
        assert!(serde_json::from_str::<Price>("\"not-a-price\"").is_err());
    }

    #[test]
    fn test_display() {
        let price = Price::new(Decimal::new(55, 1)).unwrap(); // 5.5
        assert_eq!(price.to_string(), "5.50");
    }
}
