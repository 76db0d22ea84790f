#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dcf/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for DCF valuation.
//!
//! This crate provides the foundational abstractions shared by providers and
//! the valuation model:
//!
//! - [`DataProvider`](provider::DataProvider) - Base trait for all providers
//! - [`StatementProvider`](provider::StatementProvider) - Raw financial statements
//! - [`MarketDataProvider`](provider::MarketDataProvider) - Market snapshot
//! - [`normalize`](normalize::normalize) - Raw table to [`CanonicalStatement`]
//! - [`resolve`](concept::resolve) - Concept lookup across provider vocabularies

/// Financial concepts and line-item resolution.
pub mod concept;
/// Error types for valuation operations.
pub mod error;
/// Statement orientation detection and normalization.
pub mod normalize;
/// Reporting periods and period-label parsing.
pub mod period;
/// Provider traits for fetching statements and market data.
pub mod provider;
/// Canonical statement representation.
pub mod statement;
/// Core data types (Symbol, RawStatement, MarketSnapshot, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use concept::{Concept, resolve, resolve_latest};
pub use error::{DcfError, Result};
pub use normalize::{Orientation, detect_orientation, normalize};
pub use period::Period;
pub use provider::{DataProvider, MarketDataProvider, StatementProvider};
pub use statement::{CanonicalStatement, LineItem};
pub use types::{MarketSnapshot, RawStatement, StatementKind, StatementSet, Symbol};
