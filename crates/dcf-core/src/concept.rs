//! Financial concepts and line-item resolution.
//!
//! Different providers label the same line item differently: XBRL tag names
//! from regulatory filings (`NetCashProvidedByUsedInOperatingActivities`),
//! display names from market-data feeds (`Operating Cash Flow`). Each
//! [`Concept`] carries an ordered alias list and a keyword predicate, and
//! [`resolve`] applies them in that order.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::statement::{CanonicalStatement, LineItem};

/// A financial concept the valuation pipeline needs from a statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Concept {
    /// Net cash provided by operating activities.
    OperatingCashFlow,
    /// Purchases of property, plant and equipment.
    CapitalExpenditure,
    /// Total debt reported directly.
    TotalDebt,
    /// Long-term (non-current) debt.
    LongTermDebt,
    /// Current debt, including the current portion of long-term debt.
    CurrentDebt,
    /// Cash and cash equivalents.
    CashAndEquivalents,
    /// Interest expense.
    InterestExpense,
}

impl Concept {
    /// All concepts.
    pub const ALL: [Self; 7] = [
        Self::OperatingCashFlow,
        Self::CapitalExpenditure,
        Self::TotalDebt,
        Self::LongTermDebt,
        Self::CurrentDebt,
        Self::CashAndEquivalents,
        Self::InterestExpense,
    ];

    /// Short name of the concept.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OperatingCashFlow => "OperatingCashFlow",
            Self::CapitalExpenditure => "CapitalExpenditure",
            Self::TotalDebt => "TotalDebt",
            Self::LongTermDebt => "LongTermDebt",
            Self::CurrentDebt => "CurrentDebt",
            Self::CashAndEquivalents => "CashAndEquivalents",
            Self::InterestExpense => "InterestExpense",
        }
    }

    /// Exact labels for this concept, in priority order.
    ///
    /// Both market-data display names and XBRL tag names appear here.
    #[must_use]
    pub const fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::OperatingCashFlow => &[
                "Operating Cash Flow",
                "Total Cash From Operating Activities",
                "NetCashProvidedByUsedInOperatingActivities",
                "CashProvidedByUsedInOperatingActivities",
                "CashFromOperatingActivities",
                "OperatingActivitiesCashFlow",
            ],
            Self::CapitalExpenditure => &[
                "Capital Expenditure",
                "Capital Expenditures",
                "PaymentsToAcquirePropertyPlantAndEquipment",
                "PaymentsForAcquisitionOfPropertyPlantAndEquipment",
                "PurchaseOfPropertyPlantAndEquipment",
                "CapitalExpenditures",
                "Capex",
            ],
            Self::TotalDebt => &["Total Debt", "TotalDebt", "Debt"],
            Self::LongTermDebt => &[
                "Long Term Debt",
                "LongTermDebtNoncurrent",
                "LongTermDebt",
                "LongTermDebtAndCapitalLeaseObligations",
            ],
            Self::CurrentDebt => &[
                "Current Debt",
                "DebtCurrent",
                "LongTermDebtCurrent",
                "ShortTermBorrowings",
            ],
            Self::CashAndEquivalents => &[
                "Cash And Cash Equivalents",
                "CashAndCashEquivalentsAtCarryingValue",
                "CashAndCashEquivalents",
                "Cash",
            ],
            Self::InterestExpense => &[
                "Interest Expense",
                "InterestExpense",
                "InterestExpenseNonOperating",
                "InterestExpenseDebt",
            ],
        }
    }

    /// Keyword fallback applied to a lower-cased label.
    #[must_use]
    pub fn matches_keywords(&self, lower: &str) -> bool {
        let has = |s: &str| lower.contains(s);
        match self {
            Self::OperatingCashFlow => {
                (has("operating") && has("activit")) || (has("netcash") && has("operating"))
            }
            Self::CapitalExpenditure => {
                (has("capital") && has("expenditure"))
                    || (has("propert") && has("plant") && has("equipment"))
                    || has("capex")
            }
            Self::TotalDebt => has("total") && has("debt"),
            Self::LongTermDebt => {
                has("long")
                    && has("term")
                    && has("debt")
                    && !has("current portion")
                    && !has("debtcurrent")
            }
            Self::CurrentDebt => has("current") && has("debt") && !has("noncurrent"),
            Self::CashAndEquivalents => {
                has("cash")
                    && has("equivalent")
                    && !has("restricted")
                    && !has("change")
                    && !has("increase")
                    && !has("decrease")
            }
            Self::InterestExpense => has("interest") && has("expense") && !has("income"),
        }
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Finds the row of `statement` that best represents `concept`.
///
/// Aliases are tried first in priority order; if none matches exactly, the
/// first row (in the statement's native order) whose lower-cased label
/// satisfies the concept's keyword predicate wins.
#[must_use]
pub fn resolve<'a>(statement: &'a CanonicalStatement, concept: Concept) -> Option<&'a LineItem> {
    for alias in concept.aliases() {
        if let Some(row) = statement.row(alias) {
            debug!(%concept, label = %row.label, "Resolved by alias");
            return Some(row);
        }
    }

    let row = statement
        .rows()
        .iter()
        .find(|row| concept.matches_keywords(&row.label.to_lowercase()));

    match row {
        Some(row) => debug!(%concept, label = %row.label, "Resolved by keyword"),
        None => debug!(%concept, statement = %statement.kind(), "Concept not found"),
    }
    row
}

/// Resolves `concept` and returns its value for the most recent period.
#[must_use]
pub fn resolve_latest(statement: &CanonicalStatement, concept: Concept) -> Option<f64> {
    resolve(statement, concept).and_then(LineItem::latest)
}
