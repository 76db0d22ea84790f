//! Fundamentals timeseries: annual statement line items.
//!
//! The timeseries endpoint returns one series per requested type
//! (`annualOperatingCashFlow`, `annualTotalDebt`, ...), each a list of dated
//! data points. Tables are built with periods as rows and one column per line
//! item, labelled the way Yahoo Finance displays them ("Operating Cash Flow").

use dcf_core::{DcfError, Result, StatementKind};
use polars::prelude::*;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Prefix of annual series type names.
const ANNUAL_PREFIX: &str = "annual";

/// Line items requested for each statement, in column order.
pub(crate) const fn statement_types(kind: StatementKind) -> &'static [&'static str] {
    match kind {
        StatementKind::CashFlow => &[
            "OperatingCashFlow",
            "CapitalExpenditure",
            "FreeCashFlow",
            "InvestingCashFlow",
            "FinancingCashFlow",
            "NetIncomeFromContinuingOperations",
            "DepreciationAndAmortization",
            "StockBasedCompensation",
            "RepurchaseOfCapitalStock",
            "CashDividendsPaid",
        ],
        StatementKind::Income => &[
            "TotalRevenue",
            "CostOfRevenue",
            "GrossProfit",
            "OperatingIncome",
            "InterestExpense",
            "InterestIncome",
            "PretaxIncome",
            "TaxProvision",
            "NetIncome",
            "EBITDA",
        ],
        StatementKind::BalanceSheet => &[
            "TotalDebt",
            "LongTermDebt",
            "CurrentDebt",
            "CashAndCashEquivalents",
            "CashCashEquivalentsAndShortTermInvestments",
            "CurrentAssets",
            "TotalAssets",
            "CurrentLiabilities",
            "TotalLiabilitiesNetMinorityInterest",
            "StockholdersEquity",
            "NetDebt",
        ],
    }
}

/// Comma-separated `type` query parameter covering every statement.
pub(crate) fn type_query() -> String {
    StatementKind::ALL
        .iter()
        .flat_map(|kind| statement_types(*kind))
        .map(|t| format!("{ANNUAL_PREFIX}{t}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Display label for a series type: `annualCapitalExpenditure` becomes
/// `Capital Expenditure`, `annualNetPPE` becomes `Net PPE`.
pub(crate) fn display_label(series_type: &str) -> String {
    let name = series_type
        .strip_prefix(ANNUAL_PREFIX)
        .unwrap_or(series_type);
    let chars: Vec<char> = name.chars().collect();

    let mut label = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            if prev.is_ascii_lowercase() || (prev.is_ascii_uppercase() && next_is_lower) {
                label.push(' ');
            }
        }
        label.push(c);
    }
    label
}

// ============================================================================
// Timeseries API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct TimeseriesResponse {
    timeseries: TimeseriesResult,
}

#[derive(Debug, Deserialize)]
struct TimeseriesResult {
    #[serde(default)]
    result: Option<Vec<SeriesResult>>,
}

/// One requested series; the data points sit under a key equal to the type.
#[derive(Debug, Deserialize)]
struct SeriesResult {
    meta: SeriesMeta,
    #[serde(flatten)]
    series: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SeriesMeta {
    #[serde(rename = "type", default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataPoint {
    as_of_date: String,
    #[serde(default)]
    reported_value: Option<ReportedValue>,
}

#[derive(Debug, Deserialize)]
struct ReportedValue {
    #[serde(default)]
    raw: Option<f64>,
}

// ============================================================================
// Table Construction
// ============================================================================

/// Dated values of every series in a response, keyed by series type.
pub(crate) type SeriesValues<'a> = HashMap<&'a str, BTreeMap<String, f64>>;

/// Collects the dated values of every series in the response, keyed by type.
///
/// Parsed once per response; every statement table is built from the result.
pub(crate) fn series_values(response: &TimeseriesResponse) -> Result<SeriesValues<'_>> {
    let mut by_type = HashMap::new();

    for result in response.timeseries.result.iter().flatten() {
        for series_type in &result.meta.types {
            let Some(value) = result.series.get(series_type) else {
                continue;
            };
            let points = Vec::<Option<DataPoint>>::deserialize(value).map_err(|e| {
                DcfError::Parse(format!("Failed to parse {series_type} series: {e}"))
            })?;

            let values: BTreeMap<String, f64> = points
                .into_iter()
                .flatten()
                .filter_map(|p| Some((p.as_of_date, p.reported_value?.raw?)))
                .collect();
            if !values.is_empty() {
                by_type.insert(series_type.as_str(), values);
            }
        }
    }

    Ok(by_type)
}

/// Builds a periods-as-rows table for `kind` from parsed series values.
///
/// Columns follow the requested order for `kind`; series without any data
/// point are left out. Returns `None` if no series for `kind` has data.
pub(crate) fn build_statement_table(
    by_type: &SeriesValues<'_>,
    kind: StatementKind,
) -> Result<Option<DataFrame>> {
    let columns: Vec<(String, &BTreeMap<String, f64>)> = statement_types(kind)
        .iter()
        .filter_map(|t| {
            let key = format!("{ANNUAL_PREFIX}{t}");
            by_type.get(key.as_str()).map(|values| (display_label(&key), values))
        })
        .collect();

    let dates: BTreeSet<&String> = columns.iter().flat_map(|(_, v)| v.keys()).collect();
    if dates.is_empty() {
        return Ok(None);
    }
    let dates: Vec<&String> = dates.into_iter().rev().collect();

    debug!(
        statement = %kind,
        items = columns.len(),
        periods = dates.len(),
        "Built timeseries table"
    );

    let index: Vec<&str> = dates.iter().map(|d| d.as_str()).collect();
    let mut frame = Vec::with_capacity(columns.len() + 1);
    frame.push(Column::new(PlSmallStr::from("index"), index));
    for (label, values) in &columns {
        let column: Vec<Option<f64>> = dates.iter().map(|d| values.get(*d).copied()).collect();
        frame.push(Column::new(PlSmallStr::from(label.as_str()), column));
    }

    DataFrame::new(frame)
        .map(Some)
        .map_err(|e| DcfError::Parse(format!("Failed to build {kind} table: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcf_core::{Concept, Orientation, RawStatement, detect_orientation, normalize, resolve};
    use rstest::rstest;

    const CASH_FLOW: &str = r#"{
        "timeseries": {
            "result": [
                {
                    "meta": {"symbol": ["AAPL"], "type": ["annualOperatingCashFlow"]},
                    "timestamp": [1632960000, 1664496000, 1696032000],
                    "annualOperatingCashFlow": [
                        {"asOfDate": "2021-09-30", "periodType": "12M", "reportedValue": {"raw": 104038000000.0, "fmt": "104.04B"}},
                        {"asOfDate": "2022-09-30", "periodType": "12M", "reportedValue": {"raw": 122151000000.0, "fmt": "122.15B"}},
                        {"asOfDate": "2023-09-30", "periodType": "12M", "reportedValue": {"raw": 110543000000.0, "fmt": "110.54B"}}
                    ]
                },
                {
                    "meta": {"symbol": ["AAPL"], "type": ["annualCapitalExpenditure"]},
                    "timestamp": [1632960000, 1664496000, 1696032000],
                    "annualCapitalExpenditure": [
                        {"asOfDate": "2021-09-30", "periodType": "12M", "reportedValue": {"raw": -11085000000.0, "fmt": "-11.09B"}},
                        null,
                        {"asOfDate": "2023-09-30", "periodType": "12M", "reportedValue": {"raw": -10959000000.0, "fmt": "-10.96B"}}
                    ]
                },
                {
                    "meta": {"symbol": ["AAPL"], "type": ["annualFreeCashFlow"]}
                }
            ],
            "error": null
        }
    }"#;

    fn cash_flow_table() -> DataFrame {
        let response: TimeseriesResponse = serde_json::from_str(CASH_FLOW).unwrap();
        let by_type = series_values(&response).unwrap();
        build_statement_table(&by_type, StatementKind::CashFlow)
            .unwrap()
            .unwrap()
    }

    #[rstest]
    #[case("annualOperatingCashFlow", "Operating Cash Flow")]
    #[case("annualCapitalExpenditure", "Capital Expenditure")]
    #[case("annualCashAndCashEquivalents", "Cash And Cash Equivalents")]
    #[case("annualNetPPE", "Net PPE")]
    #[case("annualEBITDA", "EBITDA")]
    #[case("TotalDebt", "Total Debt")]
    fn test_display_label(#[case] series_type: &str, #[case] expected: &str) {
        assert_eq!(display_label(series_type), expected);
    }

    #[test]
    fn test_type_query() {
        let query = type_query();
        assert!(query.starts_with("annualOperatingCashFlow,annualCapitalExpenditure,"));
        assert!(query.contains(",annualTotalDebt,annualLongTermDebt,"));
        assert!(query.ends_with("annualNetDebt"));
    }

    #[test]
    fn test_table_has_periods_as_rows() {
        let table = cash_flow_table();
        let names: Vec<String> = table
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, ["index", "Operating Cash Flow", "Capital Expenditure"]);
        assert_eq!(table.height(), 3);

        let raw = RawStatement::new("Yahoo Finance", StatementKind::CashFlow, table);
        assert_eq!(
            detect_orientation(&raw).unwrap(),
            Some(Orientation::PeriodsAsRows)
        );
    }

    #[test]
    fn test_missing_points_are_null() {
        let table = cash_flow_table();
        let capex: Vec<Option<f64>> = table
            .column("Capital Expenditure")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        // Most recent first.
        assert_eq!(capex, [Some(-10_959_000_000.0), None, Some(-11_085_000_000.0)]);
    }

    #[test]
    fn test_table_normalizes_and_resolves() {
        let raw = RawStatement::new("Yahoo Finance", StatementKind::CashFlow, cash_flow_table());
        let stmt = normalize(&raw).unwrap();

        let labels: Vec<&str> = stmt.periods().iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["2023", "2022", "2021"]);

        let ocf = resolve(&stmt, Concept::OperatingCashFlow).unwrap();
        assert_eq!(ocf.latest(), Some(110_543_000_000.0));
    }

    #[test]
    fn test_other_statements_are_empty() {
        let response: TimeseriesResponse = serde_json::from_str(CASH_FLOW).unwrap();
        let by_type = series_values(&response).unwrap();
        assert!(
            build_statement_table(&by_type, StatementKind::BalanceSheet)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_empty_response() {
        let response: TimeseriesResponse =
            serde_json::from_str(r#"{"timeseries": {"result": [], "error": null}}"#).unwrap();
        let by_type = series_values(&response).unwrap();
        assert!(by_type.is_empty());
        assert!(
            build_statement_table(&by_type, StatementKind::Income)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_one_parse_builds_every_statement() {
        let response: TimeseriesResponse = serde_json::from_str(
            r#"{
                "timeseries": {
                    "result": [
                        {
                            "meta": {"symbol": ["AAPL"], "type": ["annualOperatingCashFlow"]},
                            "annualOperatingCashFlow": [
                                {"asOfDate": "2023-09-30", "reportedValue": {"raw": 110.0}}
                            ]
                        },
                        {
                            "meta": {"symbol": ["AAPL"], "type": ["annualTotalRevenue"]},
                            "annualTotalRevenue": [
                                {"asOfDate": "2022-09-30", "reportedValue": {"raw": 394.0}},
                                {"asOfDate": "2023-09-30", "reportedValue": {"raw": 383.0}}
                            ]
                        }
                    ]
                }
            }"#,
        )
        .unwrap();
        let by_type = series_values(&response).unwrap();
        assert_eq!(by_type.len(), 2);

        let cash_flow = build_statement_table(&by_type, StatementKind::CashFlow)
            .unwrap()
            .unwrap();
        assert_eq!(cash_flow.height(), 1);
        assert!(cash_flow.column("Total Revenue").is_err());

        let income = build_statement_table(&by_type, StatementKind::Income)
            .unwrap()
            .unwrap();
        assert_eq!(income.height(), 2);
        assert!(income.column("Total Revenue").is_ok());

        assert!(
            build_statement_table(&by_type, StatementKind::BalanceSheet)
                .unwrap()
                .is_none()
        );
    }
}
