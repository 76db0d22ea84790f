//! Free cash flow extraction.
//!
//! FCF = operating cash flow + capital expenditure, with capex normalized to a
//! cash outflow. Filings report capex as a positive payment, market-data feeds
//! usually report it as a negative cash flow; both give the same FCF.

use dcf_core::{CanonicalStatement, Concept, Period, resolve};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default number of historical FCF periods used for valuation.
pub const DEFAULT_FCF_HISTORY: usize = 5;

/// Free cash flow for one reporting period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FcfPoint {
    /// Reporting period.
    pub period: Period,
    /// Free cash flow for the period.
    pub value: f64,
}

/// Historical free cash flow, most recent period first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FcfSeries(Vec<FcfPoint>);

impl FcfSeries {
    /// Creates a series from points ordered most recent first.
    #[must_use]
    pub const fn new(points: Vec<FcfPoint>) -> Self {
        Self(points)
    }

    /// The points of the series.
    #[must_use]
    pub fn points(&self) -> &[FcfPoint] {
        &self.0
    }

    /// FCF values, most recent first.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.0.iter().map(|p| p.value).collect()
    }

    /// Most recent FCF.
    #[must_use]
    pub fn latest(&self) -> Option<f64> {
        self.0.first().map(|p| p.value)
    }

    /// Number of periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the series has no periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Derives the FCF series from a canonical cash flow statement.
///
/// Returns at most `horizon` periods, most recent first. Periods where either
/// operating cash flow or capex is missing are skipped. The series is empty
/// if either concept cannot be resolved.
#[must_use]
pub fn extract_fcf(cash_flow: &CanonicalStatement, horizon: usize) -> FcfSeries {
    let Some(ocf) = resolve(cash_flow, Concept::OperatingCashFlow) else {
        debug!(provider = cash_flow.provider(), "No operating cash flow row");
        return FcfSeries::default();
    };
    let Some(capex) = resolve(cash_flow, Concept::CapitalExpenditure) else {
        debug!(provider = cash_flow.provider(), "No capital expenditure row");
        return FcfSeries::default();
    };

    // Reported as a positive payment: flip to an outflow.
    let sign = if capex.values.iter().flatten().all(|v| *v >= 0.0) {
        -1.0
    } else {
        1.0
    };

    let points = cash_flow
        .periods()
        .iter()
        .zip(ocf.values.iter().zip(&capex.values))
        .filter_map(|(period, (ocf, capex))| {
            let value = (*ocf)? + sign * (*capex)?;
            Some(FcfPoint {
                period: period.clone(),
                value,
            })
        })
        .take(horizon)
        .collect();

    FcfSeries::new(points)
}
