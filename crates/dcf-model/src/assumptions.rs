//! Valuation assumptions.

use dcf_core::{DcfError, Result};
use serde::{Deserialize, Serialize};

use crate::{
    fcf::DEFAULT_FCF_HISTORY,
    growth::GrowthMethod,
    wacc::{DEFAULT_MARKET_RISK_PREMIUM, DEFAULT_RISK_FREE_RATE},
};

/// Default terminal growth rate.
pub const DEFAULT_TERMINAL_GROWTH_RATE: f64 = 0.025;
/// Default number of projected years.
pub const DEFAULT_PROJECTION_YEARS: u32 = 10;

/// Where the projected growth rate comes from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthAssumption {
    /// A fixed rate supplied by the caller.
    Manual(f64),
    /// Estimated from FCF history.
    Estimated(GrowthMethod),
}

impl Default for GrowthAssumption {
    fn default() -> Self {
        Self::Estimated(GrowthMethod::default())
    }
}

/// Where the discount rate comes from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountRate {
    /// A fixed rate supplied by the caller.
    Manual(f64),
    /// Estimated WACC.
    Wacc {
        /// Risk-free rate.
        risk_free_rate: f64,
        /// Equity market risk premium.
        market_risk_premium: f64,
    },
}

impl Default for DiscountRate {
    fn default() -> Self {
        Self::Wacc {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            market_risk_premium: DEFAULT_MARKET_RISK_PREMIUM,
        }
    }
}

/// Inputs the caller controls for one valuation run.
///
/// # Example
///
/// ```
/// use dcf_model::{GrowthMethod, ValuationAssumptions};
///
/// let assumptions = ValuationAssumptions::default()
///     .with_growth_method(GrowthMethod::Cagr)
///     .with_terminal_growth_rate(0.02);
/// assert_eq!(assumptions.projection_years, 10);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationAssumptions {
    /// Growth rate source.
    pub growth: GrowthAssumption,
    /// Discount rate source.
    pub discount_rate: DiscountRate,
    /// Perpetual growth rate after the projection horizon.
    pub terminal_growth_rate: f64,
    /// Number of years to project.
    pub projection_years: u32,
    /// Number of historical FCF periods to use.
    pub fcf_history_years: usize,
}

impl Default for ValuationAssumptions {
    fn default() -> Self {
        Self {
            growth: GrowthAssumption::default(),
            discount_rate: DiscountRate::default(),
            terminal_growth_rate: DEFAULT_TERMINAL_GROWTH_RATE,
            projection_years: DEFAULT_PROJECTION_YEARS,
            fcf_history_years: DEFAULT_FCF_HISTORY,
        }
    }
}

impl ValuationAssumptions {
    /// Uses a fixed growth rate.
    #[must_use]
    pub const fn with_growth_rate(mut self, rate: f64) -> Self {
        self.growth = GrowthAssumption::Manual(rate);
        self
    }

    /// Estimates growth with the given method.
    #[must_use]
    pub const fn with_growth_method(mut self, method: GrowthMethod) -> Self {
        self.growth = GrowthAssumption::Estimated(method);
        self
    }

    /// Uses a fixed discount rate.
    #[must_use]
    pub const fn with_discount_rate(mut self, rate: f64) -> Self {
        self.discount_rate = DiscountRate::Manual(rate);
        self
    }

    /// Estimates the discount rate as WACC with the given CAPM inputs.
    #[must_use]
    pub const fn with_wacc(mut self, risk_free_rate: f64, market_risk_premium: f64) -> Self {
        self.discount_rate = DiscountRate::Wacc {
            risk_free_rate,
            market_risk_premium,
        };
        self
    }

    /// Sets the terminal growth rate.
    #[must_use]
    pub const fn with_terminal_growth_rate(mut self, rate: f64) -> Self {
        self.terminal_growth_rate = rate;
        self
    }

    /// Sets the number of projected years.
    #[must_use]
    pub const fn with_projection_years(mut self, years: u32) -> Self {
        self.projection_years = years;
        self
    }

    /// Sets the number of historical FCF periods to use.
    #[must_use]
    pub const fn with_fcf_history_years(mut self, years: usize) -> Self {
        self.fcf_history_years = years;
        self
    }

    /// Checks the assumptions that can be checked before any data is seen.
    ///
    /// The discount rate versus terminal growth check happens at projection
    /// time, once an estimated WACC is known.
    ///
    /// # Errors
    ///
    /// Returns [`DcfError::InvalidAssumptions`] on a zero horizon, zero FCF
    /// history, or a non-finite rate.
    pub fn validate(&self) -> Result<()> {
        if self.projection_years == 0 {
            return Err(DcfError::InvalidAssumptions(
                "projection horizon must be at least one year".to_string(),
            ));
        }
        if self.fcf_history_years == 0 {
            return Err(DcfError::InvalidAssumptions(
                "FCF history must cover at least one period".to_string(),
            ));
        }

        let mut rates = vec![("terminal growth rate", self.terminal_growth_rate)];
        if let GrowthAssumption::Manual(rate) = self.growth {
            rates.push(("growth rate", rate));
        }
        match self.discount_rate {
            DiscountRate::Manual(rate) => rates.push(("discount rate", rate)),
            DiscountRate::Wacc {
                risk_free_rate,
                market_risk_premium,
            } => {
                rates.push(("risk-free rate", risk_free_rate));
                rates.push(("market risk premium", market_risk_premium));
            }
        }
        if let Some((name, value)) = rates.iter().find(|(_, v)| !v.is_finite()) {
            return Err(DcfError::InvalidAssumptions(format!(
                "{name} must be finite, got {value}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let a = ValuationAssumptions::default();
        assert_eq!(a.growth, GrowthAssumption::Estimated(GrowthMethod::Average));
        assert_eq!(
            a.discount_rate,
            DiscountRate::Wacc {
                risk_free_rate: 0.04,
                market_risk_premium: 0.06
            }
        );
        assert_eq!(a.terminal_growth_rate, 0.025);
        assert_eq!(a.projection_years, 10);
        assert_eq!(a.fcf_history_years, 5);
        assert!(a.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let a = ValuationAssumptions::default()
            .with_growth_rate(0.08)
            .with_discount_rate(0.09)
            .with_projection_years(5);
        assert_eq!(a.growth, GrowthAssumption::Manual(0.08));
        assert_eq!(a.discount_rate, DiscountRate::Manual(0.09));
        assert_eq!(a.projection_years, 5);
    }

    #[test]
    fn test_validate() {
        let zero_horizon = ValuationAssumptions::default().with_projection_years(0);
        assert!(matches!(
            zero_horizon.validate(),
            Err(DcfError::InvalidAssumptions(_))
        ));

        let no_history = ValuationAssumptions::default().with_fcf_history_years(0);
        assert!(no_history.validate().is_err());

        let nan_growth = ValuationAssumptions::default().with_growth_rate(f64::NAN);
        assert!(nan_growth.validate().is_err());

        let nan_rf = ValuationAssumptions::default().with_wacc(f64::NAN, 0.06);
        assert!(nan_rf.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let a: ValuationAssumptions = serde_json::from_str(
            r#"{"growth": {"estimated": "cagr"}, "discount_rate": {"manual": 0.09}}"#,
        )
        .unwrap();
        assert_eq!(a.growth, GrowthAssumption::Estimated(GrowthMethod::Cagr));
        assert_eq!(a.discount_rate, DiscountRate::Manual(0.09));
        assert_eq!(a.projection_years, DEFAULT_PROJECTION_YEARS);
    }
}
