//! Credit card number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CreditCard`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CreditCardError {
    /// The input string is empty.
    #[error("credit card cannot be empty")]
    Empty,
    /// The input contains something other than ASCII digits.
    #[error("credit card must contain digits only")]
    NonDigit,
    /// The number of digits is outside the accepted range.
    #[error("credit card must have between {min} and {max} digits (got {len})")]
    Length {
        /// Minimum accepted digits.
        min: usize,
        /// Maximum accepted digits.
        max: usize,
        /// Digits supplied.
        len: usize,
    },
}

/// A card number of 14 to 16 ASCII digits.
///
/// Mirrors the order schema's `^[0-9]{14,16}$` rule so that a value of this
/// type always passes it.
///
/// ## Examples
///
/// ```
/// use shopfront_core::CreditCard;
///
/// assert!(CreditCard::parse("12345678901234").is_ok());
/// assert!(CreditCard::parse("1234567890123456").is_ok());
/// assert!(CreditCard::parse("123").is_err());
/// assert!(CreditCard::parse("12345678901234567").is_err());
/// ```
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct CreditCard(String);

impl CreditCard {
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 14;
    /// Maximum number of digits.
    pub const MAX_DIGITS: usize = 16;

    /// Parse a `CreditCard`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains non-digits, or has
    /// fewer than 14 or more than 16 digits.
    pub fn parse(s: &str) -> Result<Self, CreditCardError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CreditCardError::Empty);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CreditCardError::NonDigit);
        }
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&s.len()) {
            return Err(CreditCardError::Length {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
                len: s.len(),
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the full number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last four digits, for display.
    #[must_use]
    pub fn last_four(&self) -> &str {
        self.0.get(self.0.len().saturating_sub(4)..).unwrap_or("")
    }
}

// Never print the full number in logs.
impl fmt::Debug for CreditCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CreditCard(****{})", self.last_four())
    }
}

impl TryFrom<String> for CreditCard {
    type Error = CreditCardError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<CreditCard> for String {
    fn from(card: CreditCard) -> Self {
        card.0
    }
}

impl std::str::FromStr for CreditCard {
    type Err = CreditCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
