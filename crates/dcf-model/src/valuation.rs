//! The valuation pipeline: statements and market data in, [`ValuationResult`] out.

use dcf_core::{CanonicalStatement, DcfError, MarketSnapshot, Result};
use tracing::{debug, info};

use crate::{
    assumptions::{DiscountRate, GrowthAssumption, ValuationAssumptions},
    fcf::extract_fcf,
    growth::{estimate_growth, year_over_year_rates},
    leverage::net_debt,
    projection::{equity_bridge, project},
    result::{ResolvedAssumptions, ValuationResult},
    wacc::wacc_breakdown,
};

/// Everything a valuation reads.
#[derive(Clone, Copy, Debug)]
pub struct ValuationInputs<'a> {
    /// Canonical cash flow statement.
    pub cash_flow: &'a CanonicalStatement,
    /// Canonical income statement, used for interest expense.
    pub income: Option<&'a CanonicalStatement>,
    /// Canonical balance sheet, used for debt and cash.
    pub balance_sheet: Option<&'a CanonicalStatement>,
    /// Market snapshot.
    pub snapshot: &'a MarketSnapshot,
}

/// Runs a full DCF valuation.
///
/// # Errors
///
/// - [`DcfError::InvalidAssumptions`] if the assumptions are invalid or the
///   discount rate does not exceed the terminal growth rate.
/// - [`DcfError::StatementIncomplete`] if no FCF can be derived from the cash
///   flow statement.
pub fn compute_valuation(
    inputs: &ValuationInputs<'_>,
    assumptions: &ValuationAssumptions,
) -> Result<ValuationResult> {
    assumptions.validate()?;

    let fcf_history = extract_fcf(inputs.cash_flow, assumptions.fcf_history_years);
    let Some(current_fcf) = fcf_history.latest() else {
        return Err(DcfError::StatementIncomplete(
            "cash flow statement lacks operating cash flow or capital expenditure".into(),
        ));
    };

    let fcf_values = fcf_history.values();
    let growth_rates = year_over_year_rates(&fcf_values);
    let raw_growth_rate = match assumptions.growth {
        GrowthAssumption::Manual(rate) => rate,
        GrowthAssumption::Estimated(method) => estimate_growth(&fcf_values, method),
    };

    let (discount_rate, wacc) = match assumptions.discount_rate {
        DiscountRate::Manual(rate) => (rate, None),
        DiscountRate::Wacc {
            risk_free_rate,
            market_risk_premium,
        } => {
            let breakdown = wacc_breakdown(
                inputs.snapshot,
                inputs.income,
                inputs.balance_sheet,
                risk_free_rate,
                market_risk_premium,
            );
            (breakdown.wacc, Some(breakdown))
        }
    };

    let projection = project(
        current_fcf,
        raw_growth_rate,
        discount_rate,
        assumptions.terminal_growth_rate,
        assumptions.projection_years,
    )?;

    let bridge = equity_bridge(
        projection.enterprise_value,
        net_debt(inputs.balance_sheet),
        inputs.snapshot.shares_outstanding,
    );

    let current_price = inputs.snapshot.current_price.filter(|p| p.is_finite());
    let implied_upside = current_price
        .filter(|p| *p > 0.0 && bridge.shares_reliable)
        .map(|p| bridge.per_share_value / p - 1.0);

    info!(
        symbol = %inputs.snapshot.symbol,
        enterprise_value = projection.enterprise_value,
        per_share_value = bridge.per_share_value,
        "Valuation complete"
    );
    debug!(
        growth_rate = projection.growth_rate,
        discount_rate,
        net_debt = bridge.net_debt,
        "Valuation inputs"
    );

    Ok(ValuationResult {
        projections: projection.years,
        terminal_value: projection.terminal_value,
        discounted_terminal_value: projection.discounted_terminal_value,
        enterprise_value: projection.enterprise_value,
        net_debt: bridge.net_debt,
        equity_value: bridge.equity_value,
        shares_outstanding: bridge.shares_outstanding,
        shares_reliable: bridge.shares_reliable,
        per_share_value: bridge.per_share_value,
        current_price,
        implied_upside,
        assumptions: ResolvedAssumptions {
            growth_source: assumptions.growth,
            raw_growth_rate,
            growth_rate: projection.growth_rate,
            discount_source: assumptions.discount_rate,
            discount_rate,
            wacc,
            terminal_growth_rate: assumptions.terminal_growth_rate,
            projection_years: assumptions.projection_years,
            current_fcf,
            fcf_history,
            growth_rates,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::GrowthMethod;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use dcf_core::{LineItem, Period, StatementKind, Symbol};
    use rstest::rstest;

    fn periods(n: usize) -> Vec<Period> {
        (0..n)
            .map(|i| Period::new(NaiveDate::from_ymd_opt(2023 - i as i32, 12, 31).unwrap()))
            .collect()
    }

    fn cash_flow() -> CanonicalStatement {
        CanonicalStatement::new(
            StatementKind::CashFlow,
            "test",
            periods(5),
            vec![
                LineItem::new(
                    "Operating Cash Flow",
                    [500.0, 450.0, 400.0, 350.0, 300.0].map(Some).to_vec(),
                ),
                LineItem::new(
                    "Capital Expenditure",
                    [-50.0, -45.0, -40.0, -35.0, -30.0].map(Some).to_vec(),
                ),
            ],
        )
        .unwrap()
    }

    fn balance_sheet(debt: f64, cash: f64) -> CanonicalStatement {
        CanonicalStatement::new(
            StatementKind::BalanceSheet,
            "test",
            periods(1),
            vec![
                LineItem::new("Total Debt", vec![Some(debt)]),
                LineItem::new("Cash And Cash Equivalents", vec![Some(cash)]),
            ],
        )
        .unwrap()
    }

    /// Straight powi recomputation of the projection formulas.
    fn expected_enterprise_value(fcf0: f64, g: f64, r: f64, tg: f64, h: i32) -> f64 {
        let pv: f64 = (1..=h)
            .map(|y| fcf0 * (1.0 + g).powi(y) / (1.0 + r).powi(y))
            .sum();
        let fcf_h = fcf0 * (1.0 + g).powi(h);
        let tv = fcf_h * (1.0 + tg) / (r - tg);
        pv + tv / (1.0 + r).powi(h)
    }

    #[test]
    fn test_end_to_end_cagr() {
        let cf = cash_flow();
        let snapshot = MarketSnapshot::new(Symbol::new("TEST"))
            .with_shares_outstanding(100.0)
            .with_current_price(50.0);
        let inputs = ValuationInputs {
            cash_flow: &cf,
            income: None,
            balance_sheet: None,
            snapshot: &snapshot,
        };
        let assumptions = ValuationAssumptions::default()
            .with_growth_method(GrowthMethod::Cagr)
            .with_discount_rate(0.10);

        let result = compute_valuation(&inputs, &assumptions).unwrap();

        let g = (450.0_f64 / 270.0).powf(0.25) - 1.0;
        assert_eq!(
            result.assumptions.fcf_history.values(),
            vec![450.0, 405.0, 360.0, 315.0, 270.0]
        );
        assert_relative_eq!(result.assumptions.growth_rate, g, epsilon = 1e-12);
        assert_relative_eq!(result.assumptions.current_fcf, 450.0);

        let ev = expected_enterprise_value(450.0, g, 0.10, 0.025, 10);
        assert_relative_eq!(result.enterprise_value, ev, max_relative = 1e-10);
        assert_eq!(result.net_debt, 0.0);
        assert_relative_eq!(result.per_share_value, ev / 100.0, max_relative = 1e-10);
        assert_relative_eq!(
            result.implied_upside.unwrap(),
            ev / 100.0 / 50.0 - 1.0,
            max_relative = 1e-10
        );
        assert_eq!(result.projections.len(), 10);
        assert!(result.assumptions.wacc.is_none());
    }

    #[test]
    fn test_wacc_and_net_debt() {
        let cf = cash_flow();
        let bs = balance_sheet(200.0, 50.0);
        let snapshot = MarketSnapshot::new(Symbol::new("TEST"))
            .with_beta(1.0)
            .with_market_cap(800.0)
            .with_tax_rate(0.25)
            .with_shares_outstanding(10.0);
        let inputs = ValuationInputs {
            cash_flow: &cf,
            income: None,
            balance_sheet: Some(&bs),
            snapshot: &snapshot,
        };

        let result = compute_valuation(&inputs, &ValuationAssumptions::default()).unwrap();

        let wacc = result.assumptions.wacc.as_ref().unwrap();
        // No interest expense reported: cost of debt is 0 over positive debt.
        assert_relative_eq!(wacc.wacc, 0.8 * 0.10, epsilon = 1e-12);
        assert_relative_eq!(result.assumptions.discount_rate, wacc.wacc);
        assert_eq!(result.net_debt, 150.0);
        assert_relative_eq!(
            result.equity_value,
            result.enterprise_value - 150.0,
            epsilon = 1e-9
        );
        assert_eq!(result.current_price, None);
        assert_eq!(result.implied_upside, None);
    }

    #[test]
    fn test_growth_is_clamped_but_raw_is_kept() {
        let cf = cash_flow();
        let snapshot = MarketSnapshot::new(Symbol::new("TEST"));
        let inputs = ValuationInputs {
            cash_flow: &cf,
            income: None,
            balance_sheet: None,
            snapshot: &snapshot,
        };
        let assumptions = ValuationAssumptions::default()
            .with_growth_rate(0.9)
            .with_discount_rate(0.10);

        let result = compute_valuation(&inputs, &assumptions).unwrap();
        assert_eq!(result.assumptions.raw_growth_rate, 0.9);
        assert_eq!(result.assumptions.growth_rate, 0.5);
        assert!(!result.shares_reliable);
        assert_eq!(result.shares_outstanding, 1.0);
    }

    #[test]
    fn test_discount_below_terminal_growth_is_rejected() {
        let cf = cash_flow();
        let snapshot = MarketSnapshot::new(Symbol::new("TEST"));
        let inputs = ValuationInputs {
            cash_flow: &cf,
            income: None,
            balance_sheet: None,
            snapshot: &snapshot,
        };
        let assumptions = ValuationAssumptions::default().with_discount_rate(0.02);
        assert!(matches!(
            compute_valuation(&inputs, &assumptions),
            Err(DcfError::InvalidAssumptions(_))
        ));
    }

    #[rstest]
    #[case::no_fcf_rows(vec![LineItem::new("Net Income", vec![Some(10.0)])])]
    #[case::no_capex(vec![LineItem::new("Operating Cash Flow", vec![Some(500.0)])])]
    fn test_no_fcf_is_an_error(#[case] rows: Vec<LineItem>) {
        let cf = CanonicalStatement::new(StatementKind::CashFlow, "test", periods(1), rows).unwrap();
        let snapshot = MarketSnapshot::new(Symbol::new("TEST"));
        let inputs = ValuationInputs {
            cash_flow: &cf,
            income: None,
            balance_sheet: None,
            snapshot: &snapshot,
        };
        let err = compute_valuation(&inputs, &ValuationAssumptions::default()).unwrap_err();
        assert!(matches!(err, DcfError::StatementIncomplete(_)));
        assert!(
            err.to_string()
                .starts_with("Could not fetch financial statements: cash flow statement lacks")
        );
    }

    #[test]
    fn test_year_over_year_rates_are_reported() {
        let cf = cash_flow();
        let snapshot = MarketSnapshot::new(Symbol::new("TEST"));
        let inputs = ValuationInputs {
            cash_flow: &cf,
            income: None,
            balance_sheet: None,
            snapshot: &snapshot,
        };
        let assumptions = ValuationAssumptions::default().with_discount_rate(0.10);

        let result = compute_valuation(&inputs, &assumptions).unwrap();

        // 450/405/360/315/270
        let rates = &result.assumptions.growth_rates;
        assert_eq!(rates.len(), 4);
        assert_relative_eq!(rates[0], 45.0 / 405.0, epsilon = 1e-12);
        assert_relative_eq!(rates[3], 45.0 / 270.0, epsilon = 1e-12);
        let mean = rates.iter().sum::<f64>() / 4.0;
        assert_relative_eq!(result.assumptions.raw_growth_rate, mean, epsilon = 1e-12);
    }
}
