//! Core data types exchanged between providers and the valuation pipeline.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`StatementKind`] - Cash flow, income statement, or balance sheet
//! - [`RawStatement`] - Unnormalized statement table as returned by a provider
//! - [`StatementSet`] - The three statements a provider returns for one fetch
//! - [`MarketSnapshot`] - Market data needed for cost of capital and per-share value

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A trading symbol/ticker.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Kind of financial statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    /// Cash flow statement.
    CashFlow,
    /// Income statement.
    Income,
    /// Balance sheet.
    BalanceSheet,
}

impl StatementKind {
    /// All statement kinds, in fetch order.
    pub const ALL: [Self; 3] = [Self::CashFlow, Self::Income, Self::BalanceSheet];

    /// Human-readable name of the statement.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CashFlow => "cash flow",
            Self::Income => "income statement",
            Self::BalanceSheet => "balance sheet",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unnormalized statement table as returned by a provider.
///
/// The first column of `table` holds the row labels; the remaining column
/// names are the column labels. Whether periods run along the rows or the
/// columns depends on the provider and is not verified here.
#[derive(Clone, Debug)]
pub struct RawStatement {
    /// Name of the provider that produced the table.
    pub provider: String,
    /// Which statement this is.
    pub kind: StatementKind,
    /// The raw table.
    pub table: DataFrame,
}

impl RawStatement {
    /// Creates a new raw statement.
    #[must_use]
    pub fn new(provider: impl Into<String>, kind: StatementKind, table: DataFrame) -> Self {
        Self {
            provider: provider.into(),
            kind,
            table,
        }
    }
}

/// Raw statements returned by a single provider fetch.
///
/// A provider leaves a slot empty when it has nothing for that statement;
/// that is a normal outcome, not an error.
#[derive(Clone, Debug, Default)]
pub struct StatementSet {
    /// Cash flow statement.
    pub cash_flow: Option<RawStatement>,
    /// Income statement.
    pub income: Option<RawStatement>,
    /// Balance sheet.
    pub balance_sheet: Option<RawStatement>,
}

impl StatementSet {
    /// Returns the statement of the given kind, if present.
    #[must_use]
    pub const fn get(&self, kind: StatementKind) -> Option<&RawStatement> {
        match kind {
            StatementKind::CashFlow => self.cash_flow.as_ref(),
            StatementKind::Income => self.income.as_ref(),
            StatementKind::BalanceSheet => self.balance_sheet.as_ref(),
        }
    }

    /// Removes and returns the statement of the given kind.
    pub fn take(&mut self, kind: StatementKind) -> Option<RawStatement> {
        match kind {
            StatementKind::CashFlow => self.cash_flow.take(),
            StatementKind::Income => self.income.take(),
            StatementKind::BalanceSheet => self.balance_sheet.take(),
        }
    }

    /// Stores a statement in the slot matching its kind.
    pub fn insert(&mut self, statement: RawStatement) {
        match statement.kind {
            StatementKind::CashFlow => self.cash_flow = Some(statement),
            StatementKind::Income => self.income = Some(statement),
            StatementKind::BalanceSheet => self.balance_sheet = Some(statement),
        }
    }

    /// Returns true if no statement is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cash_flow.is_none() && self.income.is_none() && self.balance_sheet.is_none()
    }
}

/// Market data snapshot for a symbol.
///
/// Every field is optional: a missing value means "unknown", never zero, and
/// downstream estimators substitute their documented defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Beta coefficient.
    pub beta: Option<f64>,
    /// Market capitalization.
    pub market_cap: Option<f64>,
    /// Shares outstanding.
    pub shares_outstanding: Option<f64>,
    /// Current share price.
    pub current_price: Option<f64>,
    /// Effective tax rate.
    pub tax_rate: Option<f64>,
}

impl MarketSnapshot {
    /// Creates an empty snapshot for a symbol.
    #[must_use]
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            ..Default::default()
        }
    }

    /// Sets the beta coefficient.
    #[must_use]
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = Some(beta);
        self
    }

    /// Sets the market capitalization.
    #[must_use]
    pub fn with_market_cap(mut self, market_cap: f64) -> Self {
        self.market_cap = Some(market_cap);
        self
    }

    /// Sets the number of shares outstanding.
    #[must_use]
    pub fn with_shares_outstanding(mut self, shares: f64) -> Self {
        self.shares_outstanding = Some(shares);
        self
    }

    /// Sets the current share price.
    #[must_use]
    pub fn with_current_price(mut self, price: f64) -> Self {
        self.current_price = Some(price);
        self
    }

    /// Sets the effective tax rate.
    #[must_use]
    pub fn with_tax_rate(mut self, tax_rate: f64) -> Self {
        self.tax_rate = Some(tax_rate);
        self
    }

    /// Returns true if the snapshot carries no market data at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.beta.is_none()
            && self.market_cap.is_none()
            && self.shares_outstanding.is_none()
            && self.current_price.is_none()
            && self.tax_rate.is_none()
    }
}
