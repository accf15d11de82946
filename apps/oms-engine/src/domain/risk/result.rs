//! Risk check result types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk check codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskCode {
    /// Estimated order value exceeds available buying power.
    InsufficientFunds,
    /// Resulting position would exceed the configured limit.
    PositionLimitExceeded,
    /// Estimated order value exceeds the account-level per-order cap.
    OrderValueLimitExceeded,
    /// Limit price is outside the configured band around the reference price.
    PriceOutlier,
    /// An equivalent open order was submitted within the duplicate window.
    PossibleDuplicate,
    /// Iceberg display quantity is not below the order quantity.
    InvalidIcebergQuantity,
}

impl fmt::Display for RiskCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientFunds => write!(f, "INSUFFICIENT_FUNDS"),
            Self::PositionLimitExceeded => write!(f, "POSITION_LIMIT_EXCEEDED"),
            Self::OrderValueLimitExceeded => write!(f, "ORDER_VALUE_LIMIT_EXCEEDED"),
            Self::PriceOutlier => write!(f, "PRICE_OUTLIER"),
            Self::PossibleDuplicate => write!(f, "POSSIBLE_DUPLICATE"),
            Self::InvalidIcebergQuantity => write!(f, "INVALID_ICEBERG_QUANTITY"),
        }
    }
}

/// A single finding from the risk validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskViolation {
    /// Check code.
    pub code: RiskCode,
    /// Human-readable message.
    pub message: String,
}

impl RiskViolation {
    /// Create a new violation.
    #[must_use]
    pub fn new(code: RiskCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for RiskViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Result of a pre-trade risk check.
///
/// Ephemeral: produced per validation call and never persisted on its own.
/// `passed` is true exactly when `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCheckResult {
    /// Whether every hard check passed.
    pub passed: bool,
    /// Hard failures that block submission, in check order.
    pub errors: Vec<RiskViolation>,
    /// Advisory findings that do not block submission, in check order.
    pub warnings: Vec<RiskViolation>,
    /// Advisory text attached when a check fails.
    pub suggestions: Vec<String>,
}

impl RiskCheckResult {
    /// A passing result with no findings.
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Append a hard error; the result no longer passes.
    pub fn add_error(&mut self, code: RiskCode, message: impl Into<String>) {
        self.passed = false;
        self.errors.push(RiskViolation::new(code, message));
    }

    /// Append a warning.
    pub fn add_warning(&mut self, code: RiskCode, message: impl Into<String>) {
        self.warnings.push(RiskViolation::new(code, message));
    }

    /// Append an advisory suggestion.
    pub fn add_suggestion(&mut self, suggestion: impl Into<String>) {
        self.suggestions.push(suggestion.into());
    }

    /// Returns true if an error with the given code is present.
    #[must_use]
    pub fn has_error(&self, code: RiskCode) -> bool {
        self.errors.iter().any(|v| v.code == code)
    }

    /// Returns true if a warning with the given code is present.
    #[must_use]
    pub fn has_warning(&self, code: RiskCode) -> bool {
        self.warnings.iter().any(|v| v.code == code)
    }

    /// One-line summary for logs and rejection messages.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.passed {
            "risk check passed".to_string()
        } else {
            self.errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        }
    }
}

impl Default for RiskCheckResult {
    fn default() -> Self {
        Self::pass()
    }
}
