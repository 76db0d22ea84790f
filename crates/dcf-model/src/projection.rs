//! Discounted cash flow projection and the equity bridge.
//!
//! For each year `y` in `1..=horizon`:
//!
//! ```text
//! FCF_y  = FCF_0 * (1 + g)^y
//! DFCF_y = FCF_y / (1 + r)^y
//! TV     = FCF_h * (1 + tg) / (r - tg)
//! EV     = sum(DFCF_y) + TV / (1 + r)^h
//! ```

use dcf_core::{DcfError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Lowest growth rate applied to projections.
pub const MIN_GROWTH_RATE: f64 = -0.20;
/// Highest growth rate applied to projections.
pub const MAX_GROWTH_RATE: f64 = 0.50;

/// One projected year.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectedYear {
    /// Year index, starting at 1.
    pub year: u32,
    /// Projected free cash flow.
    pub fcf: f64,
    /// Projected free cash flow discounted to today.
    pub discounted_fcf: f64,
}

/// Output of [`project`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Projected years, in order.
    pub years: Vec<ProjectedYear>,
    /// Growth rate applied, after clamping.
    pub growth_rate: f64,
    /// Terminal value at the end of the horizon.
    pub terminal_value: f64,
    /// Terminal value discounted to today.
    pub discounted_terminal_value: f64,
    /// Sum of discounted FCF plus discounted terminal value.
    pub enterprise_value: f64,
}

impl Projection {
    /// Sum of the discounted projected FCF.
    #[must_use]
    pub fn sum_discounted_fcf(&self) -> f64 {
        self.years.iter().map(|y| y.discounted_fcf).sum()
    }
}

/// Clamps a growth rate into `[MIN_GROWTH_RATE, MAX_GROWTH_RATE]`.
#[must_use]
pub fn clamp_growth(growth_rate: f64) -> f64 {
    growth_rate.clamp(MIN_GROWTH_RATE, MAX_GROWTH_RATE)
}

/// Projects FCF over `horizon` years and computes enterprise value.
///
/// # Errors
///
/// Returns [`DcfError::InvalidAssumptions`] if `discount_rate` is not greater
/// than `terminal_growth_rate`, if `horizon` is zero, or if any input is not
/// finite.
pub fn project(
    current_fcf: f64,
    growth_rate: f64,
    discount_rate: f64,
    terminal_growth_rate: f64,
    horizon: u32,
) -> Result<Projection> {
    for (name, value) in [
        ("current FCF", current_fcf),
        ("growth rate", growth_rate),
        ("discount rate", discount_rate),
        ("terminal growth rate", terminal_growth_rate),
    ] {
        if !value.is_finite() {
            return Err(DcfError::InvalidAssumptions(format!(
                "{name} must be finite, got {value}"
            )));
        }
    }
    if discount_rate <= terminal_growth_rate {
        return Err(DcfError::InvalidAssumptions(format!(
            "discount rate ({discount_rate}) must exceed terminal growth rate ({terminal_growth_rate})"
        )));
    }
    if horizon == 0 {
        return Err(DcfError::InvalidAssumptions(
            "projection horizon must be at least one year".to_string(),
        ));
    }

    let g = clamp_growth(growth_rate);
    if g != growth_rate {
        warn!(growth_rate, clamped = g, "Growth rate clamped");
    }

    let mut years = Vec::with_capacity(horizon as usize);
    let mut fcf = current_fcf;
    let mut discount = 1.0;
    for year in 1..=horizon {
        fcf *= 1.0 + g;
        discount *= 1.0 + discount_rate;
        years.push(ProjectedYear {
            year,
            fcf,
            discounted_fcf: fcf / discount,
        });
    }

    let terminal_value = fcf * (1.0 + terminal_growth_rate) / (discount_rate - terminal_growth_rate);
    let discounted_terminal_value = terminal_value / discount;
    let sum_discounted: f64 = years.iter().map(|y| y.discounted_fcf).sum();
    let enterprise_value = sum_discounted + discounted_terminal_value;

    debug!(
        current_fcf,
        growth_rate = g,
        discount_rate,
        terminal_growth_rate,
        horizon,
        enterprise_value,
        "Projected cash flows"
    );

    Ok(Projection {
        years,
        growth_rate: g,
        terminal_value,
        discounted_terminal_value,
        enterprise_value,
    })
}

/// Enterprise value bridged to per-share equity value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquityBridge {
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
}

/// Bridges enterprise value to equity and per-share value.
///
/// A missing, zero or non-finite share count is replaced by 1 and flagged
/// unreliable.
#[must_use]
pub fn equity_bridge(enterprise_value: f64, net_debt: f64, shares: Option<f64>) -> EquityBridge {
    let equity_value = enterprise_value - net_debt;
    let (shares_outstanding, shares_reliable) = match shares {
        Some(s) if s.is_finite() && s > 0.0 => (s, true),
        _ => {
            warn!("Shares outstanding unavailable, per-share value uses 1 share");
            (1.0, false)
        }
    };

    EquityBridge {
        net_debt,
        equity_value,
        shares_outstanding,
        shares_reliable,
        per_share_value: equity_value / shares_outstanding,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.10, 0.025, true)]
    #[case(0.08, 0.03, true)]
    #[case(0.025, 0.025, false)]
    #[case(0.02, 0.025, false)]
    fn test_discount_must_exceed_terminal_growth(
        #[case] discount_rate: f64,
        #[case] terminal_growth_rate: f64,
        #[case] ok: bool,
    ) {
        let result = project(100.0, 0.10, discount_rate, terminal_growth_rate, 10);
        assert_eq!(result.is_ok(), ok);
        if !ok {
            assert!(matches!(result, Err(DcfError::InvalidAssumptions(_))));
        }
    }

    #[test]
    fn test_positive_terminal_value() {
        let p = project(100.0, 0.10, 0.10, 0.025, 10).unwrap();
        assert!(p.terminal_value > 0.0);
        assert!(p.discounted_terminal_value > 0.0);
        assert_eq!(p.years.len(), 10);
        assert_eq!(p.years[0].year, 1);
        assert_eq!(p.years[9].year, 10);
    }

    #[rstest]
    #[case(-0.9, -0.20)]
    #[case(2.0, 0.50)]
    #[case(0.1, 0.1)]
    fn test_growth_is_clamped(#[case] input: f64, #[case] expected: f64) {
        assert_eq!(clamp_growth(input), expected);
        let p = project(100.0, input, 0.10, 0.025, 1).unwrap();
        assert_eq!(p.growth_rate, expected);
        assert_relative_eq!(p.years[0].fcf, 100.0 * (1.0 + expected), epsilon = 1e-9);
    }

    #[test]
    fn test_projection_arithmetic() {
        let p = project(100.0, 0.05, 0.10, 0.02, 2).unwrap();

        assert_relative_eq!(p.years[0].fcf, 105.0, epsilon = 1e-9);
        assert_relative_eq!(p.years[1].fcf, 110.25, epsilon = 1e-9);
        assert_relative_eq!(p.years[0].discounted_fcf, 105.0 / 1.1, epsilon = 1e-9);
        assert_relative_eq!(p.years[1].discounted_fcf, 110.25 / 1.21, epsilon = 1e-9);

        let tv = 110.25 * 1.02 / 0.08;
        assert_relative_eq!(p.terminal_value, tv, epsilon = 1e-9);
        assert_relative_eq!(p.discounted_terminal_value, tv / 1.21, epsilon = 1e-9);
        assert_relative_eq!(
            p.enterprise_value,
            p.sum_discounted_fcf() + tv / 1.21,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_zero_horizon_and_non_finite_inputs() {
        assert!(project(100.0, 0.05, 0.10, 0.02, 0).is_err());
        assert!(project(f64::NAN, 0.05, 0.10, 0.02, 5).is_err());
        assert!(project(100.0, f64::INFINITY, 0.10, 0.02, 5).is_err());
    }

    #[test]
    fn test_equity_bridge() {
        let bridge = equity_bridge(1_000.0, 200.0, Some(100.0));
        assert_eq!(bridge.equity_value, 800.0);
        assert_eq!(bridge.per_share_value, 8.0);
        assert!(bridge.shares_reliable);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(0.0))]
    #[case(Some(f64::NAN))]
    fn test_equity_bridge_without_shares(#[case] shares: Option<f64>) {
        let bridge = equity_bridge(1_000.0, -50.0, shares);
        assert_eq!(bridge.shares_outstanding, 1.0);
        assert!(!bridge.shares_reliable);
        assert_eq!(bridge.per_share_value, 1_050.0);
    }
}
