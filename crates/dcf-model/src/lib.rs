#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dcf/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Valuation assumptions and their defaults.
pub mod assumptions;
/// Free cash flow extraction.
pub mod fcf;
/// FCF growth estimation.
pub mod growth;
/// Debt and cash from the balance sheet.
pub mod leverage;
/// Cash flow projection and the equity bridge.
pub mod projection;
/// Valuation result types.
pub mod result;
/// The end-to-end valuation pipeline.
pub mod valuation;
/// Weighted average cost of capital.
pub mod wacc;

pub use assumptions::{DiscountRate, GrowthAssumption, ValuationAssumptions};
pub use fcf::{FcfPoint, FcfSeries, extract_fcf};
pub use growth::{GrowthMethod, estimate_growth, year_over_year_rates};
pub use leverage::net_debt;
pub use projection::{EquityBridge, ProjectedYear, Projection, clamp_growth, equity_bridge, project};
pub use result::{ResolvedAssumptions, ValuationResult};
pub use valuation::{ValuationInputs, compute_valuation};
pub use wacc::{WaccBreakdown, WaccFallback, estimate_wacc, wacc_breakdown};
