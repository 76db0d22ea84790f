//! Weighted average cost of capital.
//!
//! Cost of equity from CAPM, cost of debt from interest expense over total
//! debt, weighted by market capitalization and debt. Missing inputs fall back
//! to conservative defaults, and every fallback taken is recorded in the
//! returned [`WaccBreakdown`].

use dcf_core::{CanonicalStatement, Concept, MarketSnapshot, resolve_latest};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::leverage;

/// Default risk-free rate.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.04;
/// Default equity market risk premium.
pub const DEFAULT_MARKET_RISK_PREMIUM: f64 = 0.06;
/// Beta assumed when none is available.
pub const DEFAULT_BETA: f64 = 1.0;
/// Pre-tax cost of debt assumed when the company reports no debt.
pub const DEFAULT_COST_OF_DEBT: f64 = 0.05;
/// Tax rate assumed when none is available.
pub const DEFAULT_TAX_RATE: f64 = 0.25;
/// Equity weight used when enterprise value is zero.
pub const DEFAULT_EQUITY_WEIGHT: f64 = 0.7;
/// Lower bound on the estimated WACC.
pub const WACC_FLOOR: f64 = 0.01;
/// WACC used when the estimate is not a finite number.
pub const FALLBACK_WACC: f64 = 0.10;

/// A default substituted for a missing or unusable WACC input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaccFallback {
    /// Beta was missing; 1.0 used.
    Beta,
    /// No debt reported; default cost of debt used.
    CostOfDebt,
    /// Market capitalization was missing; treated as zero.
    MarketCap,
    /// Enterprise value was zero; 70/30 equity/debt split used.
    CapitalStructure,
    /// Tax rate was missing; 25% used.
    TaxRate,
    /// Estimate fell below the floor and was raised to it.
    Floor,
    /// Estimate was not finite; the fallback WACC was used.
    NonFinite,
}

impl fmt::Display for WaccFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Beta => "beta unavailable, using 1.0",
            Self::CostOfDebt => "no debt reported, using 5% cost of debt",
            Self::MarketCap => "market cap unavailable, using 0",
            Self::CapitalStructure => "enterprise value is zero, using 70/30 equity/debt weights",
            Self::TaxRate => "tax rate unavailable, using 25%",
            Self::Floor => "estimate below 1%, floored",
            Self::NonFinite => "estimate not finite, using 10%",
        };
        f.write_str(s)
    }
}

/// Every component of a WACC estimate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaccBreakdown {
    /// The final weighted average cost of capital.
    pub wacc: f64,
    /// Risk-free rate used.
    pub risk_free_rate: f64,
    /// Market risk premium used.
    pub market_risk_premium: f64,
    /// Beta used.
    pub beta: f64,
    /// CAPM cost of equity.
    pub cost_of_equity: f64,
    /// Latest interest expense, as a positive amount.
    pub interest_expense: f64,
    /// Latest total debt.
    pub total_debt: f64,
    /// Pre-tax cost of debt.
    pub cost_of_debt: f64,
    /// After-tax cost of debt.
    pub after_tax_cost_of_debt: f64,
    /// Market capitalization.
    pub market_cap: f64,
    /// Weight of equity in the capital structure.
    pub equity_weight: f64,
    /// Weight of debt in the capital structure.
    pub debt_weight: f64,
    /// Tax rate used.
    pub tax_rate: f64,
    /// Defaults that were applied, in the order encountered.
    pub fallbacks: Vec<WaccFallback>,
}

/// Estimates WACC and returns the full breakdown.
///
/// Interest expense comes from the income statement and debt from the balance
/// sheet; either may be absent.
#[must_use]
pub fn wacc_breakdown(
    snapshot: &MarketSnapshot,
    income: Option<&CanonicalStatement>,
    balance_sheet: Option<&CanonicalStatement>,
    risk_free_rate: f64,
    market_risk_premium: f64,
) -> WaccBreakdown {
    let mut fallbacks = Vec::new();

    let beta = match snapshot.beta.filter(|b| b.is_finite()) {
        Some(beta) => beta,
        None => {
            fallbacks.push(WaccFallback::Beta);
            DEFAULT_BETA
        }
    };
    let cost_of_equity = risk_free_rate + beta * market_risk_premium;

    let interest_expense = income
        .and_then(|s| resolve_latest(s, Concept::InterestExpense))
        .map_or(0.0, f64::abs);
    let total_debt = balance_sheet.and_then(leverage::total_debt).unwrap_or(0.0);

    let cost_of_debt = if total_debt > 0.0 {
        interest_expense / total_debt
    } else {
        fallbacks.push(WaccFallback::CostOfDebt);
        DEFAULT_COST_OF_DEBT
    };

    let market_cap = match snapshot.market_cap {
        Some(cap) => cap,
        None => {
            fallbacks.push(WaccFallback::MarketCap);
            0.0
        }
    };

    let enterprise_value = market_cap + total_debt;
    let (equity_weight, debt_weight) = if enterprise_value == 0.0 {
        fallbacks.push(WaccFallback::CapitalStructure);
        (DEFAULT_EQUITY_WEIGHT, 1.0 - DEFAULT_EQUITY_WEIGHT)
    } else {
        (market_cap / enterprise_value, total_debt / enterprise_value)
    };

    let tax_rate = match snapshot.tax_rate.filter(|t| t.is_finite()) {
        Some(rate) => rate,
        None => {
            fallbacks.push(WaccFallback::TaxRate);
            DEFAULT_TAX_RATE
        }
    };

    let after_tax_cost_of_debt = cost_of_debt * (1.0 - tax_rate);
    let estimate = equity_weight * cost_of_equity + debt_weight * after_tax_cost_of_debt;

    let wacc = if !estimate.is_finite() {
        fallbacks.push(WaccFallback::NonFinite);
        FALLBACK_WACC
    } else if estimate < WACC_FLOOR {
        fallbacks.push(WaccFallback::Floor);
        WACC_FLOOR
    } else {
        estimate
    };

    if fallbacks.is_empty() {
        debug!(symbol = %snapshot.symbol, wacc, "Estimated WACC");
    } else {
        warn!(
            symbol = %snapshot.symbol,
            wacc,
            fallbacks = ?fallbacks,
            "Estimated WACC with defaults"
        );
    }

    WaccBreakdown {
        wacc,
        risk_free_rate,
        market_risk_premium,
        beta,
        cost_of_equity,
        interest_expense,
        total_debt,
        cost_of_debt,
        after_tax_cost_of_debt,
        market_cap,
        equity_weight,
        debt_weight,
        tax_rate,
        fallbacks,
    }
}

/// Estimates WACC.
///
/// Shorthand for [`wacc_breakdown`] when only the rate matters.
#[must_use]
pub fn estimate_wacc(
    snapshot: &MarketSnapshot,
    income: Option<&CanonicalStatement>,
    balance_sheet: Option<&CanonicalStatement>,
    risk_free_rate: f64,
    market_risk_premium: f64,
) -> f64 {
    wacc_breakdown(
        snapshot,
        income,
        balance_sheet,
        risk_free_rate,
        market_risk_premium,
    )
    .wacc
}
