//! Symbol value object for asset names.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::DomainError;

/// Longest accepted asset name.
const MAX_SYMBOL_LEN: usize = 16;

/// An asset name such as "TRY", "AAPL" or "GOOGL".
///
/// Normalized to uppercase so that `aapl` and `AAPL` refer to one balance line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new Symbol.
    ///
    /// The symbol is trimmed and normalized to uppercase.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_uppercase())
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate the symbol format.
    ///
    /// # Errors
    ///
    /// Returns error if the symbol is empty, too long, or contains
    /// characters other than ASCII letters, digits, `.` and `-`.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            return Err(DomainError::InvalidValue {
                field: "asset_name".to_string(),
                message: "Asset name cannot be empty".to_string(),
            });
        }
        if self.0.len() > MAX_SYMBOL_LEN {
            return Err(DomainError::InvalidValue {
                field: "asset_name".to_string(),
                message: format!("Asset name exceeds {MAX_SYMBOL_LEN} characters"),
            });
        }
        if !self
            .0
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(DomainError::InvalidValue {
                field: "asset_name".to_string(),
                message: format!("Asset name contains invalid characters: {}", self.0),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn symbol_is_uppercased_and_trimmed() {
        assert_eq!(Symbol::new(" aapl ").as_str(), "AAPL");
        assert_eq!(Symbol::from("try"), Symbol::new("TRY"));
    }

    #[test_case("AAPL" ; "equity")]
    #[test_case("BRK.B" ; "class share")]
    #[test_case("TRY" ; "currency")]
    fn valid_symbols(raw: &str) {
        assert!(Symbol::new(raw).validate().is_ok());
    }

    #[test_case("" ; "empty")]
    #[test_case("AAPL MSFT" ; "embedded space")]
    #[test_case("ABCDEFGHIJKLMNOPQ" ; "too long")]
    #[test_case("$$$" ; "punctuation")]
    fn invalid_symbols(raw: &str) {
        assert!(Symbol::new(raw).validate().is_err());
    }
}
