//! Provider registry with per-statement fallback.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use dcf_core::{
    CanonicalStatement, DcfError, MarketDataProvider, MarketSnapshot, Result, StatementKind,
    StatementProvider, Symbol, normalize,
};

/// Canonical statements assembled from one or more providers.
///
/// Each slot records its own source through [`CanonicalStatement::provider`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReconciledStatements {
    /// Cash flow statement.
    pub cash_flow: Option<CanonicalStatement>,
    /// Income statement.
    pub income: Option<CanonicalStatement>,
    /// Balance sheet.
    pub balance_sheet: Option<CanonicalStatement>,
}

impl ReconciledStatements {
    /// Returns the statement of the given kind, if any provider supplied it.
    #[must_use]
    pub const fn get(&self, kind: StatementKind) -> Option<&CanonicalStatement> {
        match kind {
            StatementKind::CashFlow => self.cash_flow.as_ref(),
            StatementKind::Income => self.income.as_ref(),
            StatementKind::BalanceSheet => self.balance_sheet.as_ref(),
        }
    }

    const fn slot_mut(&mut self, kind: StatementKind) -> &mut Option<CanonicalStatement> {
        match kind {
            StatementKind::CashFlow => &mut self.cash_flow,
            StatementKind::Income => &mut self.income,
            StatementKind::BalanceSheet => &mut self.balance_sheet,
        }
    }

    /// Statement kinds no provider has supplied yet.
    #[must_use]
    pub fn missing(&self) -> Vec<StatementKind> {
        StatementKind::ALL
            .into_iter()
            .filter(|kind| self.get(*kind).is_none())
            .collect()
    }

    /// Returns true if no statement was supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cash_flow.is_none() && self.income.is_none() && self.balance_sheet.is_none()
    }

    /// The provider behind each supplied statement, in statement order.
    #[must_use]
    pub fn sources(&self) -> Vec<(StatementKind, &str)> {
        StatementKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|s| (kind, s.provider())))
            .collect()
    }
}

/// Ordered statement and market data providers.
///
/// Statement providers are consulted in registration order, one statement at
/// a time: a later provider only fills the statements every earlier provider
/// failed to deliver in usable form. Each provider is tried once.
///
/// # Example
///
/// ```rust,ignore
/// use dcf::{StatementSources, Symbol};
///
/// let sources = StatementSources::new()
///     .with_edgar("MyApp/1.0 (contact@example.com)")
///     .with_yahoo();
///
/// let statements = sources.fetch_statements(&Symbol::new("AAPL")).await?;
/// for (kind, provider) in statements.sources() {
///     println!("{kind}: {provider}");
/// }
/// ```
#[derive(Default)]
pub struct StatementSources {
    statement_providers: Vec<Arc<dyn StatementProvider>>,
    market_providers: Vec<Arc<dyn MarketDataProvider>>,
}

impl std::fmt::Debug for StatementSources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementSources")
            .field(
                "statement_providers",
                &self
                    .statement_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .field(
                "market_providers",
                &self
                    .market_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl StatementSources {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a statement provider after the ones already registered.
    pub fn register_statements(&mut self, provider: Arc<dyn StatementProvider>) {
        debug!(provider = provider.name(), "Registering statement provider");
        self.statement_providers.push(provider);
    }

    /// Register a market data provider after the ones already registered.
    pub fn register_market(&mut self, provider: Arc<dyn MarketDataProvider>) {
        debug!(provider = provider.name(), "Registering market data provider");
        self.market_providers.push(provider);
    }

    /// Fetch and normalize statements, backfilling each missing statement
    /// from the next provider in order.
    ///
    /// A statement is usable if it normalizes to a non-empty canonical
    /// statement. Statements no provider could supply are left empty.
    ///
    /// # Errors
    ///
    /// - [`DcfError::ProviderNotConfigured`] if no statement provider is registered.
    /// - [`DcfError::ProviderUnavailable`] if every provider failed and nothing
    ///   was collected.
    pub async fn fetch_statements(&self, symbol: &Symbol) -> Result<ReconciledStatements> {
        if self.statement_providers.is_empty() {
            return Err(DcfError::ProviderNotConfigured(
                "No statement providers registered".to_string(),
            ));
        }

        let mut reconciled = ReconciledStatements::default();
        let mut last_error = None;

        for provider in &self.statement_providers {
            let missing = reconciled.missing();
            if missing.is_empty() {
                break;
            }

            debug!(
                provider = provider.name(),
                symbol = %symbol,
                missing = missing.len(),
                "Fetching statements"
            );

            let mut set = match provider.fetch_statements(symbol).await {
                Ok(set) => set,
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed, trying next"
                    );
                    last_error = Some(e);
                    continue;
                }
            };

            for kind in missing {
                let statement = set
                    .take(kind)
                    .and_then(|raw| normalize(&raw))
                    .filter(|s| !s.is_empty());
                match statement {
                    Some(statement) => {
                        debug!(
                            provider = provider.name(),
                            statement = %kind,
                            periods = statement.periods().len(),
                            "Using statement"
                        );
                        *reconciled.slot_mut(kind) = Some(statement);
                    }
                    None => warn!(
                        provider = provider.name(),
                        statement = %kind,
                        "Statement unavailable, trying next"
                    ),
                }
            }
        }

        if reconciled.is_empty()
            && let Some(e) = last_error
        {
            return Err(DcfError::ProviderUnavailable {
                provider: "all statement providers".to_string(),
                reason: e.to_string(),
            });
        }

        Ok(reconciled)
    }

    /// Fetch a market snapshot, trying providers in order until one returns
    /// any market data.
    ///
    /// # Errors
    ///
    /// - [`DcfError::ProviderNotConfigured`] if no market data provider is registered.
    /// - The last provider error if every provider failed.
    pub async fn fetch_market_snapshot(&self, symbol: &Symbol) -> Result<MarketSnapshot> {
        if self.market_providers.is_empty() {
            return Err(DcfError::ProviderNotConfigured(
                "No market data providers registered".to_string(),
            ));
        }

        let mut last_error = None;
        for provider in &self.market_providers {
            debug!(
                provider = provider.name(),
                symbol = %symbol,
                "Fetching market snapshot"
            );

            match provider.fetch_market_snapshot(symbol).await {
                Ok(snapshot) if !snapshot.is_empty() => return Ok(snapshot),
                Ok(_) => {
                    warn!(
                        provider = provider.name(),
                        "Provider returned no market data, trying next"
                    );
                    last_error = Some(DcfError::ProviderUnavailable {
                        provider: provider.name().to_string(),
                        reason: "no market data returned".to_string(),
                    });
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| DcfError::Other("All providers failed with no error".to_string())))
    }

    // Builder methods for easy setup with specific providers

    /// Add the SEC EDGAR provider as a statement source.
    #[cfg(feature = "edgar")]
    #[must_use]
    pub fn with_edgar(mut self, user_agent: &str) -> Self {
        let provider = Arc::new(dcf_edgar::EdgarProvider::new(user_agent));
        self.register_statements(provider);
        self
    }

    /// Add the Yahoo Finance provider as a statement and market data source.
    #[cfg(feature = "yahoo")]
    #[must_use]
    pub fn with_yahoo(mut self) -> Self {
        let provider = Arc::new(dcf_yahoo::YahooProvider::new());
        self.register_statements(provider.clone());
        self.register_market(provider);
        self
    }
}
