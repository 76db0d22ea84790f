//! FCF growth estimation.

use dcf_core::{DcfError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// How to estimate future FCF growth from history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthMethod {
    /// Mean of the year-over-year growth rates.
    #[default]
    Average,
    /// Compound annual growth between the oldest and most recent period.
    Cagr,
    /// Growth between the two most recent periods.
    Recent,
}

impl GrowthMethod {
    /// Returns the method name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Average => "average",
            Self::Cagr => "cagr",
            Self::Recent => "recent",
        }
    }
}

impl fmt::Display for GrowthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrowthMethod {
    type Err = DcfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "average" => Ok(Self::Average),
            "cagr" => Ok(Self::Cagr),
            "recent" => Ok(Self::Recent),
            other => Err(DcfError::InvalidParameter(format!(
                "unknown growth method '{other}' (expected average, cagr or recent)"
            ))),
        }
    }
}

/// Estimates FCF growth from a most-recent-first series.
///
/// Degrades to `0.0` when the series has fewer than two points or no usable
/// denominator. The result is not clamped.
#[must_use]
pub fn estimate_growth(fcf: &[f64], method: GrowthMethod) -> f64 {
    match try_estimate_growth(fcf, method) {
        Ok(rate) => rate,
        Err(e) => {
            debug!(%method, error = %e, "Growth estimate unavailable, using 0.0");
            0.0
        }
    }
}

/// Like [`estimate_growth`] but reports short history as an error.
///
/// # Errors
///
/// Returns [`DcfError::InsufficientHistory`] when fewer than two points are
/// available.
pub fn try_estimate_growth(fcf: &[f64], method: GrowthMethod) -> Result<f64> {
    if fcf.len() < 2 {
        return Err(DcfError::InsufficientHistory {
            required: 2,
            available: fcf.len(),
        });
    }

    let rate = match method {
        GrowthMethod::Average => {
            let rates = year_over_year_rates(fcf);
            if rates.is_empty() {
                0.0
            } else {
                rates.iter().sum::<f64>() / rates.len() as f64
            }
        }
        GrowthMethod::Cagr => {
            let first = fcf[0];
            let last = fcf[fcf.len() - 1];
            if last == 0.0 {
                0.0
            } else {
                let years = (fcf.len() - 1) as f64;
                let cagr = (first / last.abs()).powf(1.0 / years) - 1.0;
                if cagr.is_finite() { cagr } else { 0.0 }
            }
        }
        GrowthMethod::Recent => yoy_growth(fcf[0], fcf[1]).unwrap_or(0.0),
    };

    Ok(rate)
}

/// Year-over-year growth rates of a most-recent-first series, most recent
/// pair first.
///
/// Pairs whose earlier value is zero or non-finite are skipped. These are the
/// rates the `average` method takes the mean of.
#[must_use]
pub fn year_over_year_rates(fcf: &[f64]) -> Vec<f64> {
    fcf.windows(2)
        .filter_map(|w| yoy_growth(w[0], w[1]))
        .collect()
}

/// Growth from `previous` to `current`, relative to `|previous|`.
fn yoy_growth(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 || !previous.is_finite() {
        return None;
    }
    let rate = (current - previous) / previous.abs();
    rate.is_finite().then_some(rate)
}
