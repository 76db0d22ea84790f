//! Provider traits for fetching valuation inputs.
//!
//! This module defines the core provider traits:
//!
//! - [`DataProvider`] - Base trait for all data providers
//! - [`StatementProvider`] - Raw financial statement tables
//! - [`MarketDataProvider`] - Market snapshot (beta, market cap, shares, price)

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{MarketSnapshot, StatementSet, Symbol},
};

/// Base trait for all data providers.
///
/// All data providers must implement this trait to provide basic metadata
/// about the provider.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "SEC EDGAR").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;
}

/// Provider for raw financial statements.
///
/// Implement this trait to supply cash flow, income and balance sheet tables.
#[async_trait]
pub trait StatementProvider: DataProvider {
    /// Fetches the raw statements for a symbol.
    ///
    /// A provider that has nothing for one statement leaves that slot empty.
    /// An `Err` means the provider could not be reached or did not recognize
    /// the symbol; callers treat every statement from it as unavailable.
    async fn fetch_statements(&self, symbol: &Symbol) -> Result<StatementSet>;
}

/// Provider for market data.
///
/// Implement this trait to supply beta, market capitalization, shares
/// outstanding and price for a symbol.
#[async_trait]
pub trait MarketDataProvider: DataProvider {
    /// Fetches the current market snapshot for a symbol.
    async fn fetch_market_snapshot(&self, symbol: &Symbol) -> Result<MarketSnapshot>;
}
