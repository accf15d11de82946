//! Symbol value object for exchange-qualified instrument identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::DomainError;

/// An exchange-qualified trading symbol.
///
/// Examples: "NASDAQ:AAPL", "BINANCE:BTCUSDT", or a bare ticker "AAPL"
/// when the venue routing configuration supplies the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new Symbol, normalized to uppercase.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().to_uppercase())
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The exchange qualifier, if present.
    #[must_use]
    pub fn exchange(&self) -> Option<&str> {
        self.0.split_once(':').map(|(exchange, _)| exchange)
    }

    /// The ticker portion, with any exchange qualifier stripped.
    #[must_use]
    pub fn ticker(&self) -> &str {
        self.0
            .split_once(':')
            .map_or(self.0.as_str(), |(_, ticker)| ticker)
    }

    /// Validate the symbol for order creation.
    ///
    /// # Errors
    ///
    /// Returns error if the symbol is empty, too long, or contains
    /// characters outside `[A-Z0-9:._-]`.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            return Err(DomainError::InvalidValue {
                field: "symbol".to_string(),
                message: "Symbol cannot be empty".to_string(),
            });
        }

        if self.0.len() > 32 {
            return Err(DomainError::InvalidValue {
                field: "symbol".to_string(),
                message: "Symbol exceeds maximum length".to_string(),
            });
        }

        let valid = self
            .0
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '.' | '_' | '-'));
        if !valid {
            return Err(DomainError::InvalidValue {
                field: "symbol".to_string(),
                message: "Symbol contains invalid characters".to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_normalizes_to_uppercase() {
        let s = Symbol::new("nasdaq:aapl");
        assert_eq!(s.as_str(), "NASDAQ:AAPL");
    }

    #[test]
    fn symbol_exchange_and_ticker() {
        let qualified = Symbol::new("NASDAQ:AAPL");
        assert_eq!(qualified.exchange(), Some("NASDAQ"));
        assert_eq!(qualified.ticker(), "AAPL");

        let bare = Symbol::new("AAPL");
        assert_eq!(bare.exchange(), None);
        assert_eq!(bare.ticker(), "AAPL");
    }

    #[test]
    fn symbol_validate() {
        assert!(Symbol::new("NASDAQ:AAPL").validate().is_ok());
        assert!(Symbol::new("BRK.B").validate().is_ok());
        assert!(Symbol::new("").validate().is_err());
        assert!(Symbol::new("BAD SYMBOL").validate().is_err());
    }

    #[test]
    fn symbol_validate_length() {
        let long = "X".repeat(33);
        assert!(Symbol::new(long).validate().is_err());
    }
}
