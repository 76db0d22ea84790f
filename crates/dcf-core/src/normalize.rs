//! Statement normalization.
//!
//! Providers disagree on table orientation: some report periods as columns
//! (line items down the side), others periods as rows. [`normalize`] detects the
//! orientation from the first column label and the first row label and returns
//! a [`CanonicalStatement`], or `None` when the table has nothing usable.

use std::collections::HashSet;

use polars::prelude::*;
use tracing::{debug, warn};

use crate::{
    error::Result,
    period::{Period, looks_like_period},
    statement::{CanonicalStatement, LineItem},
    types::RawStatement,
};

/// Detected orientation of a raw table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// Line items as rows, periods as columns (canonical).
    PeriodsAsColumns,
    /// Periods as rows, line items as columns.
    PeriodsAsRows,
}

/// A raw table read out of a `DataFrame`, column-major.
#[derive(Debug, Default)]
struct Grid {
    row_labels: Vec<Option<String>>,
    col_labels: Vec<String>,
    columns: Vec<Vec<Option<f64>>>,
}

impl Grid {
    fn read(table: &DataFrame) -> Result<Self> {
        let Some((index, values)) = table.get_columns().split_first() else {
            return Ok(Self::default());
        };

        let index = index.cast(&DataType::String)?;
        let row_labels = index
            .str()?
            .into_iter()
            .map(|label| label.map(|l| l.trim().to_string()))
            .collect();

        let mut col_labels = Vec::with_capacity(values.len());
        let mut columns = Vec::with_capacity(values.len());
        for column in values {
            col_labels.push(column.name().as_str().trim().to_string());
            let numeric = column.cast(&DataType::Float64)?;
            columns.push(
                numeric
                    .f64()?
                    .into_iter()
                    .map(|v| v.filter(|x| x.is_finite()))
                    .collect(),
            );
        }

        Ok(Self {
            row_labels,
            col_labels,
            columns,
        })
    }

    fn orientation(&self) -> Option<Orientation> {
        if self.col_labels.first().is_some_and(|l| looks_like_period(l)) {
            return Some(Orientation::PeriodsAsColumns);
        }
        if self
            .row_labels
            .first()
            .and_then(Option::as_deref)
            .is_some_and(looks_like_period)
        {
            return Some(Orientation::PeriodsAsRows);
        }
        None
    }

    fn cell(&self, row: usize, col: usize) -> Option<f64> {
        self.columns.get(col).and_then(|c| c.get(row)).copied().flatten()
    }
}

/// Detects the orientation of a raw statement table.
///
/// Returns `None` if neither the first column label nor the first row label
/// looks like a reporting period.
pub fn detect_orientation(raw: &RawStatement) -> Result<Option<Orientation>> {
    Ok(Grid::read(&raw.table)?.orientation())
}

/// Normalizes a raw statement into canonical orientation.
///
/// Returns `None` ("statement unavailable") if the table is empty, has no
/// discoverable period axis, or cannot be read.
#[must_use]
pub fn normalize(raw: &RawStatement) -> Option<CanonicalStatement> {
    let grid = match Grid::read(&raw.table) {
        Ok(grid) => grid,
        Err(e) => {
            warn!(
                provider = %raw.provider,
                statement = %raw.kind,
                error = %e,
                "Unreadable statement table"
            );
            return None;
        }
    };

    if grid.row_labels.is_empty() || grid.col_labels.is_empty() {
        debug!(provider = %raw.provider, statement = %raw.kind, "Empty statement table");
        return None;
    }

    let Some(orientation) = grid.orientation() else {
        debug!(
            provider = %raw.provider,
            statement = %raw.kind,
            "No period axis found in statement table"
        );
        return None;
    };

    let statement = match orientation {
        Orientation::PeriodsAsColumns => {
            let periods = grid.col_labels.iter().map(|l| Some(l.as_str()));
            let items = grid.row_labels.iter().map(Option::as_deref);
            assemble(raw, periods, items, |item, period| grid.cell(item, period))
        }
        Orientation::PeriodsAsRows => {
            let periods = grid.row_labels.iter().map(Option::as_deref);
            let items = grid.col_labels.iter().map(|l| Some(l.as_str()));
            assemble(raw, periods, items, |item, period| grid.cell(period, item))
        }
    };

    match statement {
        Ok(Some(stmt)) => {
            debug!(
                provider = %raw.provider,
                statement = %raw.kind,
                ?orientation,
                rows = stmt.rows().len(),
                periods = stmt.periods().len(),
                "Normalized statement"
            );
            Some(stmt)
        }
        Ok(None) => None,
        Err(e) => {
            warn!(provider = %raw.provider, error = %e, "Failed to build canonical statement");
            None
        }
    }
}

/// Builds the canonical statement from period and item labels.
///
/// `value(item, period)` indexes the original table positions.
fn assemble<'a>(
    raw: &RawStatement,
    period_labels: impl Iterator<Item = Option<&'a str>>,
    item_labels: impl Iterator<Item = Option<&'a str>>,
    value: impl Fn(usize, usize) -> Option<f64>,
) -> Result<Option<CanonicalStatement>> {
    let mut seen = HashSet::new();
    let mut periods: Vec<(usize, Period)> = period_labels
        .enumerate()
        .filter_map(|(pos, label)| Some((pos, Period::parse(label?)?)))
        .filter(|(_, period)| seen.insert(period.end))
        .collect();
    periods.sort_by(|a, b| b.1.end.cmp(&a.1.end));

    if periods.is_empty() {
        return Ok(None);
    }

    let rows: Vec<LineItem> = item_labels
        .enumerate()
        .filter_map(|(pos, label)| {
            let label = label.filter(|l| !l.is_empty())?;
            let values = periods.iter().map(|(p, _)| value(pos, *p)).collect();
            Some(LineItem::new(label, values))
        })
        .collect();

    if rows.is_empty() {
        return Ok(None);
    }

    let periods = periods.into_iter().map(|(_, period)| period).collect();
    CanonicalStatement::new(raw.kind, raw.provider.clone(), periods, rows).map(Some)
}
