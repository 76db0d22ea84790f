#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dcf/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Multi-provider statement reconciliation and DCF valuation.
//!
//! This crate re-exports the core types, the valuation model and the provider
//! implementations, and adds a [`StatementSources`] registry that reconciles
//! statements across providers with per-statement fallback, plus the
//! [`Valuator`] workflow built on top of it.
//!
//! # Features
//!
//! - `edgar` - SEC EDGAR provider for annual statements
//! - `yahoo` - Yahoo Finance provider for statements and market data

// Core types and traits
pub use dcf_core::*;

// Valuation model
pub use dcf_model::*;

// Providers
#[cfg(feature = "edgar")]
pub use dcf_edgar::EdgarProvider;
#[cfg(feature = "yahoo")]
pub use dcf_yahoo::YahooProvider;

mod registry;
pub use registry::{ReconciledStatements, StatementSources};

mod valuator;
pub use valuator::{FetchReport, Valuator};
