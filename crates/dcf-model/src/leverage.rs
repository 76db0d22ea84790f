//! Debt and cash from the balance sheet.

use dcf_core::{CanonicalStatement, Concept, resolve_latest};
use tracing::debug;

/// Latest total debt.
///
/// Uses the reported total when available, otherwise long-term plus current
/// debt when both are reported. `None` when neither route works.
#[must_use]
pub fn total_debt(balance_sheet: &CanonicalStatement) -> Option<f64> {
    if let Some(debt) = resolve_latest(balance_sheet, Concept::TotalDebt) {
        return Some(debt);
    }

    let long_term = resolve_latest(balance_sheet, Concept::LongTermDebt)?;
    let current = resolve_latest(balance_sheet, Concept::CurrentDebt)?;
    debug!(long_term, current, "Total debt from long-term plus current debt");
    Some(long_term + current)
}

/// Latest cash and cash equivalents.
#[must_use]
pub fn cash_and_equivalents(balance_sheet: &CanonicalStatement) -> Option<f64> {
    resolve_latest(balance_sheet, Concept::CashAndEquivalents)
}

/// Net debt: total debt minus cash, each defaulting to zero.
///
/// Without a balance sheet net debt is zero.
#[must_use]
pub fn net_debt(balance_sheet: Option<&CanonicalStatement>) -> f64 {
    let Some(balance_sheet) = balance_sheet else {
        debug!("No balance sheet, net debt is 0");
        return 0.0;
    };
    let debt = total_debt(balance_sheet).unwrap_or(0.0);
    let cash = cash_and_equivalents(balance_sheet).unwrap_or(0.0);
    debt - cash
}
