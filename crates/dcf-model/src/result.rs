//! Valuation output.

use serde::{Deserialize, Serialize};

use crate::{
    assumptions::{DiscountRate, GrowthAssumption},
    fcf::FcfSeries,
    projection::ProjectedYear,
    wacc::WaccBreakdown,
};

/// The assumptions a valuation actually ran with, estimates included.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAssumptions {
    /// Growth rate source requested by the caller.
    pub growth_source: GrowthAssumption,
    /// Growth rate before clamping.
    pub raw_growth_rate: f64,
    /// Growth rate applied to the projection.
    pub growth_rate: f64,
    /// Discount rate source requested by the caller.
    pub discount_source: DiscountRate,
    /// Discount rate applied.
    pub discount_rate: f64,
    /// WACC components, when the discount rate was estimated.
    pub wacc: Option<WaccBreakdown>,
    /// Terminal growth rate.
    pub terminal_growth_rate: f64,
    /// Number of projected years.
    pub projection_years: u32,
    /// Most recent historical FCF, the projection base.
    pub current_fcf: f64,
    /// Historical FCF used, most recent first.
    pub fcf_history: FcfSeries,
    /// Year-over-year FCF growth rates, most recent pair first. Pairs with a
    /// zero base are left out.
    pub growth_rates: Vec<f64>,
}

/// Result of a DCF valuation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    /// Projected years.
    pub projections: Vec<ProjectedYear>,
    /// Terminal value at the end of the horizon.
    pub terminal_value: f64,
    /// Terminal value discounted to today.
    pub discounted_terminal_value: f64,
    /// Enterprise value.
    pub enterprise_value: f64,
    /// Total debt minus cash.
    pub net_debt: f64,
    /// Enterprise value minus net debt.
    pub equity_value: f64,
    /// Share count used for the per-share value.
    pub shares_outstanding: f64,
    /// False when the share count was unknown and defaulted to 1.
    pub shares_reliable: bool,
    /// Equity value per share.
    pub per_share_value: f64,
    /// Current share price, if known.
    pub current_price: Option<f64>,
    /// `per_share_value / current_price - 1`, when both are meaningful.
    pub implied_upside: Option<f64>,
    /// Assumptions the valuation ran with.
    pub assumptions: ResolvedAssumptions,
}

impl ValuationResult {
    /// Sum of the discounted projected FCF.
    #[must_use]
    pub fn sum_discounted_fcf(&self) -> f64 {
        self.projections.iter().map(|y| y.discounted_fcf).sum()
    }
}
