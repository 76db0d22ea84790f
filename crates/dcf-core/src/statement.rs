//! Canonical financial statements.
//!
//! A [`CanonicalStatement`] has line items as rows and reporting periods as
//! columns, most recent period first. Every row is aligned to the same period
//! axis; the constructor rejects anything else.

use serde::{Deserialize, Serialize};

use crate::{
    error::{DcfError, Result},
    period::Period,
    types::StatementKind,
};

/// A labelled row of a canonical statement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Line-item label exactly as the provider reported it.
    pub label: String,
    /// Values aligned to the statement's periods, most recent first.
    pub values: Vec<Option<f64>>,
}

impl LineItem {
    /// Creates a new line item.
    #[must_use]
    pub fn new(label: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }

    /// Value for the most recent period, if reported.
    #[must_use]
    pub fn latest(&self) -> Option<f64> {
        self.values.first().copied().flatten()
    }
}

/// A financial statement in canonical orientation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanonicalStatement {
    kind: StatementKind,
    provider: String,
    periods: Vec<Period>,
    rows: Vec<LineItem>,
}

impl CanonicalStatement {
    /// Builds a canonical statement.
    ///
    /// Periods must be strictly descending by end date and every row must
    /// have exactly one value per period.
    pub fn new(
        kind: StatementKind,
        provider: impl Into<String>,
        periods: Vec<Period>,
        rows: Vec<LineItem>,
    ) -> Result<Self> {
        if periods.windows(2).any(|w| w[0].end <= w[1].end) {
            return Err(DcfError::InvalidParameter(
                "periods must be ordered most recent first".to_string(),
            ));
        }
        if let Some(row) = rows.iter().find(|r| r.values.len() != periods.len()) {
            return Err(DcfError::InvalidParameter(format!(
                "row '{}' has {} values for {} periods",
                row.label,
                row.values.len(),
                periods.len()
            )));
        }

        Ok(Self {
            kind,
            provider: provider.into(),
            periods,
            rows,
        })
    }

    /// Which statement this is.
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Name of the provider the statement came from.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Reporting periods, most recent first.
    #[must_use]
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Line items in the provider's native order.
    #[must_use]
    pub fn rows(&self) -> &[LineItem] {
        &self.rows
    }

    /// Iterates over the line-item labels in native order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.label.as_str())
    }

    /// Looks up a row by exact label.
    #[must_use]
    pub fn row(&self, label: &str) -> Option<&LineItem> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// Returns true if the statement has no rows or no periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.periods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn period(year: i32) -> Period {
        Period::new(NaiveDate::from_ymd_opt(year, 12, 31).unwrap())
    }

    #[test]
    fn test_new_statement() {
        let stmt = CanonicalStatement::new(
            StatementKind::CashFlow,
            "test",
            vec![period(2023), period(2022)],
            vec![LineItem::new("Operating Cash Flow", vec![Some(10.0), None])],
        )
        .unwrap();

        assert_eq!(stmt.kind(), StatementKind::CashFlow);
        assert_eq!(stmt.provider(), "test");
        assert_eq!(stmt.periods().len(), 2);
        assert_eq!(stmt.row("Operating Cash Flow").unwrap().latest(), Some(10.0));
        assert!(stmt.row("operating cash flow").is_none());
        assert_eq!(stmt.labels().collect::<Vec<_>>(), ["Operating Cash Flow"]);
    }

    #[test]
    fn test_rejects_misaligned_rows() {
        let result = CanonicalStatement::new(
            StatementKind::Income,
            "test",
            vec![period(2023), period(2022)],
            vec![LineItem::new("Interest Expense", vec![Some(1.0)])],
        );
        assert!(matches!(result, Err(DcfError::InvalidParameter(_))));
    }

    #[test]
    fn test_rejects_unordered_periods() {
        let result = CanonicalStatement::new(
            StatementKind::Income,
            "test",
            vec![period(2021), period(2022)],
            vec![],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_latest_is_most_recent_period_only() {
        let item = LineItem::new("Total Debt", vec![None, Some(5.0)]);
        assert_eq!(item.latest(), None);
    }
}
