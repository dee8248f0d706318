//! Amount type for handling the monetary value of a single transaction.
//!
//! An `Amount` is always strictly positive. Whether it adds to or subtracts from a balance is
//! decided by the transaction's type, never by the sign of the amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Currency prefixes that are tolerated (and discarded) when parsing user input.
const CURRENCY_PREFIXES: &[&str] = &["Rp", "$"];

/// The largest amount a single transaction may carry, one quadrillion.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Represents the amount of a transaction.
///
/// Parsing accepts surrounding whitespace, an optional currency prefix and `,` thousands
/// separators. The result must be greater than zero and no larger than [`MAX_AMOUNT`].
///
/// ```
/// # use cashbook::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("Rp 1,500,000").unwrap();
/// assert_eq!(amount.to_string(), "1500000");
///
/// assert!(Amount::from_str("0").is_err());
/// assert!(Amount::from_str("abc").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    /// Creates a new `Amount`, rejecting zero, negative and oversized values.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }
        if value > MAX_AMOUNT {
            return Err(AmountError::TooLarge(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

/// An error that can occur when parsing or constructing an `Amount`.
pub enum AmountError {
    /// The input was empty.
    Empty,
    /// The input was not a number.
    NotANumber(String, rust_decimal::Error),
    /// The input was a number but not greater than zero.
    NotPositive(Decimal),
    /// The input was larger than `MAX_AMOUNT`.
    TooLarge(Decimal),
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => write!(f, "Amount is required"),
            AmountError::NotANumber(s, _) => write!(f, "Amount '{s}' is not a number"),
            AmountError::NotPositive(v) => {
                write!(f, "Amount must be greater than 0, got {v}")
            }
            AmountError::TooLarge(v) => {
                write!(f, "Amount must be at most {MAX_AMOUNT}, got {v}")
            }
        }
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AmountError::NotANumber(_, e) => Some(e),
            _ => None,
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        let without_currency = CURRENCY_PREFIXES
            .iter()
            .find_map(|prefix| trimmed.strip_prefix(prefix))
            .unwrap_or(trimmed)
            .trim_start();

        let without_commas = without_currency.replace(',', "");
        let value = Decimal::from_str(&without_commas)
            .map_err(|e| AmountError::NotANumber(trimmed.to_string(), e))?;
        Amount::new(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
