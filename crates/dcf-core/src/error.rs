//! Error types for fetching statements and computing valuations.
//!
//! This module defines [`DcfError`] which covers every failure that can occur
//! while fetching, normalizing, or valuing a company's financial data.

use thiserror::Error;

/// Errors that can occur during data fetching and valuation.
#[derive(Error, Debug)]
pub enum DcfError {
    /// A provider failed or returned nothing usable.
    ///
    /// Triggers fallback to the next provider; only surfaced when every
    /// configured source has failed.
    #[error("Provider {provider} unavailable: {reason}")]
    ProviderUnavailable {
        /// The provider that failed.
        provider: String,
        /// Why the provider could not supply data.
        reason: String,
    },

    /// A statement required for valuation is missing or lacks required line items.
    #[error("Could not fetch financial statements: {0}")]
    StatementIncomplete(String),

    /// The valuation assumptions are arithmetically invalid.
    #[error("Invalid assumptions: {0}")]
    InvalidAssumptions(String),

    /// Not enough FCF history for the requested computation.
    #[error("Insufficient history: {required} periods required, {available} available")]
    InsufficientHistory {
        /// Number of periods the computation needs.
        required: usize,
        /// Number of periods actually available.
        available: usize,
    },

    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The requested symbol was not found.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// Error parsing data from a provider.
    #[error("Parse error: {0}")]
    Parse(String),

    /// No provider is configured for the requested data.
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl From<polars::prelude::PolarsError> for DcfError {
    fn from(e: polars::prelude::PolarsError) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Result type alias using [`DcfError`].
pub type Result<T> = std::result::Result<T, DcfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_incomplete_message() {
        let err = DcfError::StatementIncomplete("cash flow".to_string());
        assert_eq!(
            err.to_string(),
            "Could not fetch financial statements: cash flow"
        );
    }
}
