//! Company facts API types and statement table construction.
//!
//! The companyfacts endpoint returns every XBRL fact a company has ever filed,
//! grouped by taxonomy, tag and unit. Statement tables are built from annual
//! (10-K) USD facts: one row per XBRL tag, one column per fiscal period end.

use chrono::NaiveDate;
use dcf_core::{DcfError, Result, StatementKind};
use polars::prelude::*;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

/// Shortest span accepted as a fiscal year (52/53-week years included).
const MIN_ANNUAL_DAYS: i64 = 330;
/// Longest span accepted as a fiscal year.
const MAX_ANNUAL_DAYS: i64 = 400;

// =============================================================================
// Statement Tag Sets
// =============================================================================

/// XBRL tags collected for each statement, in row order.
pub(crate) const fn statement_tags(kind: StatementKind) -> &'static [&'static str] {
    match kind {
        StatementKind::CashFlow => &[
            "NetIncomeLoss",
            "DepreciationDepletionAndAmortization",
            "ShareBasedCompensation",
            "NetCashProvidedByUsedInOperatingActivities",
            "NetCashProvidedByUsedInOperatingActivitiesContinuingOperations",
            "PaymentsToAcquirePropertyPlantAndEquipment",
            "PaymentsToAcquireProductiveAssets",
            "NetCashProvidedByUsedInInvestingActivities",
            "PaymentsOfDividends",
            "PaymentsForRepurchaseOfCommonStock",
            "NetCashProvidedByUsedInFinancingActivities",
        ],
        StatementKind::Income => &[
            "Revenues",
            "RevenueFromContractWithCustomerExcludingAssessedTax",
            "CostOfRevenue",
            "GrossProfit",
            "OperatingIncomeLoss",
            "InterestExpense",
            "InterestExpenseNonOperating",
            "IncomeTaxExpenseBenefit",
            "NetIncomeLoss",
        ],
        StatementKind::BalanceSheet => &[
            "CashAndCashEquivalentsAtCarryingValue",
            "AssetsCurrent",
            "Assets",
            "ShortTermBorrowings",
            "DebtCurrent",
            "LongTermDebtCurrent",
            "LiabilitiesCurrent",
            "LongTermDebtNoncurrent",
            "LongTermDebt",
            "Liabilities",
            "StockholdersEquity",
        ],
    }
}

/// Balance sheet facts are point-in-time; the others cover a fiscal year.
const fn is_instant(kind: StatementKind) -> bool {
    matches!(kind, StatementKind::BalanceSheet)
}

// =============================================================================
// SEC API Response Types
// =============================================================================

/// Company ticker information from SEC JSON.
#[derive(Debug, Deserialize)]
pub(crate) struct CompanyTickerInfo {
    /// CIK as a number (SEC returns this as an integer)
    pub(crate) cik_str: u64,
    /// Ticker symbol
    pub(crate) ticker: String,
}

/// Response from the SEC EDGAR Company Facts API.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CompanyFactsResponse {
    /// Facts organized by taxonomy and tag
    #[serde(default)]
    pub(crate) facts: HashMap<String, HashMap<String, TagFacts>>,
}

/// Facts for a specific XBRL tag.
#[derive(Debug, Deserialize)]
pub(crate) struct TagFacts {
    /// Units (USD, shares, etc.) containing the actual fact values
    #[serde(default)]
    pub(crate) units: HashMap<String, Vec<FactValue>>,
}

/// A single fact value with metadata.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FactValue {
    /// Start date of the period; absent for instant facts
    #[serde(default)]
    pub(crate) start: Option<String>,
    /// End date of the period
    pub(crate) end: String,
    /// Value
    pub(crate) val: f64,
    /// Form type
    #[serde(default)]
    pub(crate) form: Option<String>,
    /// Filed date
    #[serde(default)]
    pub(crate) filed: Option<String>,
}

impl FactValue {
    fn is_annual_filing(&self) -> bool {
        self.form.as_deref().is_some_and(|f| f.starts_with("10-K"))
    }

    /// Period end if this fact has the shape `kind` needs.
    fn period_end(&self, kind: StatementKind) -> Option<NaiveDate> {
        let end = parse_date(&self.end)?;
        match (&self.start, is_instant(kind)) {
            (None, true) => Some(end),
            (Some(start), false) => {
                let days = end.signed_duration_since(parse_date(start)?).num_days();
                (MIN_ANNUAL_DAYS..=MAX_ANNUAL_DAYS)
                    .contains(&days)
                    .then_some(end)
            }
            _ => None,
        }
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

// =============================================================================
// Table Construction
// =============================================================================

/// Builds the raw statement table for `kind` from company facts.
///
/// Rows are XBRL tags, columns are fiscal period end dates (`YYYY-MM-DD`)
/// from the `max_periods` most recent annual periods. When several filings
/// report the same tag and period (later 10-Ks repeat prior years), the most
/// recently filed value wins. Returns `None` if no annual facts exist.
pub(crate) fn build_statement_table(
    facts: &CompanyFactsResponse,
    kind: StatementKind,
    max_periods: usize,
) -> Result<Option<DataFrame>> {
    let Some(gaap) = facts.facts.get("us-gaap") else {
        return Ok(None);
    };

    let mut rows: Vec<(&str, HashMap<NaiveDate, (&str, f64)>)> = Vec::new();
    for &tag in statement_tags(kind) {
        let Some(values) = gaap.get(tag).and_then(|t| t.units.get("USD")) else {
            continue;
        };

        let mut by_end: HashMap<NaiveDate, (&str, f64)> = HashMap::new();
        for fact in values.iter().filter(|f| f.is_annual_filing()) {
            let Some(end) = fact.period_end(kind) else {
                continue;
            };
            let filed = fact.filed.as_deref().unwrap_or("");
            if by_end.get(&end).is_none_or(|(seen, _)| filed >= *seen) {
                by_end.insert(end, (filed, fact.val));
            }
        }

        if !by_end.is_empty() {
            rows.push((tag, by_end));
        }
    }

    let ends: BTreeSet<NaiveDate> = rows.iter().flat_map(|(_, v)| v.keys().copied()).collect();
    let ends: Vec<NaiveDate> = ends.into_iter().rev().take(max_periods).collect();
    if ends.is_empty() {
        return Ok(None);
    }

    // Tags with nothing inside the kept window are dropped.
    rows.retain(|(_, values)| ends.iter().any(|end| values.contains_key(end)));

    let labels: Vec<&str> = rows.iter().map(|(tag, _)| *tag).collect();
    let mut columns = Vec::with_capacity(ends.len() + 1);
    columns.push(Column::new(PlSmallStr::from("index"), labels));
    for end in &ends {
        let values: Vec<Option<f64>> = rows
            .iter()
            .map(|(_, by_end)| by_end.get(end).map(|(_, v)| *v))
            .collect();
        columns.push(Column::new(PlSmallStr::from(end.to_string()), values));
    }

    DataFrame::new(columns)
        .map(Some)
        .map_err(|e| DcfError::Parse(format!("Failed to build {kind} table: {e}")))
}
