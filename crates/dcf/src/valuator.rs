//! Fetch-then-value workflow for a single symbol.

use serde::Serialize;
use tracing::{info, warn};

use dcf_core::{CanonicalStatement, DcfError, MarketSnapshot, Result, StatementKind, Symbol};
use dcf_model::{ValuationAssumptions, ValuationInputs, ValuationResult, compute_valuation};

use crate::registry::{ReconciledStatements, StatementSources};

/// Statements a valuation cannot run without.
const REQUIRED_STATEMENTS: [StatementKind; 2] = [StatementKind::CashFlow, StatementKind::Income];

/// Outcome of [`Valuator::fetch`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FetchReport {
    /// Whether everything a valuation needs was fetched.
    pub ok: bool,
    /// Data sources used on success, or what went wrong.
    pub message: String,
}

impl FetchReport {
    fn success(message: String) -> Self {
        Self { ok: true, message }
    }

    fn failure(message: String) -> Self {
        Self { ok: false, message }
    }
}

/// Fetches statements and market data for one symbol and values it.
///
/// Fetching talks to the providers; valuation is a pure function of the
/// fetched state and the assumptions, so one fetch can back any number of
/// valuations under different assumptions.
#[derive(Debug)]
pub struct Valuator {
    symbol: Symbol,
    sources: StatementSources,
    statements: ReconciledStatements,
    snapshot: Option<MarketSnapshot>,
}

impl Valuator {
    /// Creates a valuator for a symbol. Nothing is fetched yet.
    #[must_use]
    pub fn new(symbol: impl Into<Symbol>, sources: StatementSources) -> Self {
        Self {
            symbol: symbol.into(),
            sources,
            statements: ReconciledStatements::default(),
            snapshot: None,
        }
    }

    /// The symbol being valued.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Statements fetched so far.
    #[must_use]
    pub const fn statements(&self) -> &ReconciledStatements {
        &self.statements
    }

    /// Fetched cash flow statement.
    #[must_use]
    pub const fn cash_flow(&self) -> Option<&CanonicalStatement> {
        self.statements.cash_flow.as_ref()
    }

    /// Fetched income statement.
    #[must_use]
    pub const fn income(&self) -> Option<&CanonicalStatement> {
        self.statements.income.as_ref()
    }

    /// Fetched balance sheet.
    #[must_use]
    pub const fn balance_sheet(&self) -> Option<&CanonicalStatement> {
        self.statements.balance_sheet.as_ref()
    }

    /// Fetched market snapshot.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&MarketSnapshot> {
        self.snapshot.as_ref()
    }

    /// Fetches the market snapshot, then the statements.
    ///
    /// Replaces any previously fetched state. The report is `ok` once market
    /// data, the cash flow statement and the income statement are all in
    /// hand; a missing balance sheet only costs the net debt adjustment.
    pub async fn fetch(&mut self) -> FetchReport {
        self.statements = ReconciledStatements::default();
        self.snapshot = None;

        match self.sources.fetch_market_snapshot(&self.symbol).await {
            Ok(snapshot) => self.snapshot = Some(snapshot),
            Err(e) => {
                warn!(symbol = %self.symbol, error = %e, "Market data unavailable");
                return FetchReport::failure(format!(
                    "Could not fetch market data for {}: {e}",
                    self.symbol
                ));
            }
        }

        match self.sources.fetch_statements(&self.symbol).await {
            Ok(statements) => self.statements = statements,
            Err(e) => {
                warn!(symbol = %self.symbol, error = %e, "Statements unavailable");
                return FetchReport::failure(DcfError::StatementIncomplete(e.to_string()).to_string());
            }
        }

        let missing: Vec<&str> = REQUIRED_STATEMENTS
            .iter()
            .filter(|kind| self.statements.get(**kind).is_none())
            .map(StatementKind::as_str)
            .collect();
        if !missing.is_empty() {
            let reason = format!("missing {}", missing.join(" and "));
            warn!(symbol = %self.symbol, %reason, "Statements incomplete");
            return FetchReport::failure(DcfError::StatementIncomplete(reason).to_string());
        }
        if self.statements.balance_sheet.is_none() {
            warn!(symbol = %self.symbol, "No balance sheet; net debt will be zero");
        }

        let message = self.source_message();
        info!(symbol = %self.symbol, %message, "Fetched valuation inputs");
        FetchReport::success(message)
    }

    /// "Success (SEC EDGAR)" when one provider supplied everything, else one
    /// entry per statement.
    fn source_message(&self) -> String {
        let sources = self.statements.sources();
        match sources.first() {
            Some((_, first)) if sources.iter().all(|(_, p)| p == first) => {
                format!("Success ({first})")
            }
            _ => {
                let parts: Vec<String> = sources
                    .iter()
                    .map(|(kind, provider)| format!("{kind}: {provider}"))
                    .collect();
                format!("Success ({})", parts.join(", "))
            }
        }
    }

    /// Runs a DCF valuation on the fetched data.
    ///
    /// # Errors
    ///
    /// - [`DcfError::StatementIncomplete`] if no cash flow statement was fetched.
    /// - [`DcfError::ProviderUnavailable`] if no market data was fetched.
    /// - Any error from [`dcf_model::compute_valuation`].
    pub fn compute_valuation(&self, assumptions: &ValuationAssumptions) -> Result<ValuationResult> {
        let cash_flow = self.cash_flow().ok_or_else(|| {
            DcfError::StatementIncomplete("no cash flow statement fetched".to_string())
        })?;
        let snapshot = self.snapshot().ok_or_else(|| DcfError::ProviderUnavailable {
            provider: "market data".to_string(),
            reason: "no market snapshot fetched".to_string(),
        })?;

        let inputs = ValuationInputs {
            cash_flow,
            income: self.income(),
            balance_sheet: self.balance_sheet(),
            snapshot,
        };
        compute_valuation(&inputs, assumptions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_before_fetch() {
        let valuator = Valuator::new("AAPL", StatementSources::new());

        assert_eq!(valuator.symbol().as_str(), "AAPL");
        assert!(valuator.statements().is_empty());
        assert!(matches!(
            valuator.compute_valuation(&ValuationAssumptions::default()),
            Err(DcfError::StatementIncomplete(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_without_providers() {
        let mut valuator = Valuator::new("AAPL", StatementSources::new());
        let report = valuator.fetch().await;

        assert!(!report.ok);
        assert!(report.message.starts_with("Could not fetch market data for AAPL"));
    }
}
