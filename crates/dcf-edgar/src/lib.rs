#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dcf/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR statement provider.
//!
//! This crate turns SEC EDGAR XBRL company facts into raw statement tables:
//!
//! - CIK (Central Index Key) lookup from ticker symbols
//! - Company facts from the EDGAR API
//! - Annual (10-K) cash flow, income and balance sheet tables keyed by XBRL tag
//!
//! # Example
//!
//! ```no_run
//! use dcf_edgar::EdgarProvider;
//! use dcf_core::{StatementProvider, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = EdgarProvider::new("MyApp/1.0 (contact@example.com)");
//!
//!     let statements = provider.fetch_statements(&Symbol::new("AAPL")).await?;
//!     if let Some(cash_flow) = statements.cash_flow {
//!         println!("{}", cash_flow.table);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod facts;

use async_trait::async_trait;
use dcf_core::{
    DataProvider, DcfError, RawStatement, Result, StatementKind, StatementProvider, StatementSet,
    Symbol,
};
use reqwest::{StatusCode, header::USER_AGENT};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::facts::{CompanyFactsResponse, CompanyTickerInfo, build_statement_table};

/// SEC EDGAR API base URL
const EDGAR_BASE_URL: &str = "https://data.sec.gov";

/// SEC company tickers URL
const COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// Default rate limit: 10 requests per second (SEC requirement)
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// Default number of fiscal years per statement.
pub const DEFAULT_MAX_PERIODS: usize = 10;

/// Provider name, also used in data-source reports.
const PROVIDER_NAME: &str = "SEC EDGAR";

/// Rate limiter to ensure we don't exceed SEC's rate limits
#[derive(Debug)]
struct RateLimiter {
    last_request: Option<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    const fn new(min_interval: Duration) -> Self {
        Self {
            last_request: None,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

/// SEC EDGAR statement provider.
///
/// Reads annual statements from the XBRL company facts API. Implements rate
/// limiting per SEC requirements (max 10 requests/second).
#[derive(Debug)]
pub struct EdgarProvider {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    user_agent: String,
    max_periods: usize,
}

impl EdgarProvider {
    /// Create a new EDGAR provider with the specified user agent.
    ///
    /// The SEC requires identifying user agent headers. Format should be:
    /// "AppName/Version (contact@email.com)"
    ///
    /// # Example
    /// ```
    /// use dcf_edgar::EdgarProvider;
    ///
    /// let provider = EdgarProvider::new("MyApp/1.0 (contact@example.com)");
    /// ```
    #[must_use]
    pub fn new(user_agent: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self::with_client(client, user_agent)
    }

    /// Create a new EDGAR provider with a custom HTTP client.
    ///
    /// The user agent is still sent with every request.
    ///
    /// # Example
    /// ```
    /// use dcf_edgar::EdgarProvider;
    /// use std::time::Duration;
    ///
    /// let client = reqwest::Client::builder()
    ///     .timeout(Duration::from_secs(60))
    ///     .build()
    ///     .unwrap();
    ///
    /// let provider = EdgarProvider::with_client(client, "MyApp/1.0 (contact@example.com)");
    /// ```
    #[must_use]
    pub fn with_client(client: reqwest::Client, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(DEFAULT_RATE_LIMIT))),
            user_agent: user_agent.into(),
            max_periods: DEFAULT_MAX_PERIODS,
        }
    }

    /// Sets how many fiscal years each statement covers (default 10).
    #[must_use]
    pub fn with_max_periods(mut self, max_periods: usize) -> Self {
        self.max_periods = max_periods.max(1);
        self
    }

    /// Sends a rate-limited GET request carrying the user agent.
    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        self.rate_limiter.lock().await.wait().await;

        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| DcfError::Network(e.to_string()))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(DcfError::RateLimited {
                provider: PROVIDER_NAME.to_string(),
                retry_after: None,
            });
        }
        Ok(response)
    }

    /// Look up a company's CIK number from its ticker symbol.
    ///
    /// # Returns
    /// The company's CIK number as a zero-padded 10-digit string
    pub async fn get_cik(&self, ticker: &str) -> Result<String> {
        if ticker.is_empty() {
            return Err(DcfError::InvalidParameter("Empty ticker".to_string()));
        }

        let ticker_upper = ticker.to_uppercase();

        debug!("Fetching company tickers from SEC");
        let response = self.get(COMPANY_TICKERS_URL).await?;

        if !response.status().is_success() {
            return Err(DcfError::Network(format!(
                "Failed to fetch company tickers: HTTP {}",
                response.status()
            )));
        }

        let data: HashMap<String, CompanyTickerInfo> = response
            .json()
            .await
            .map_err(|e| DcfError::Parse(format!("Failed to parse company tickers: {e}")))?;

        data.values()
            .find(|company| company.ticker.to_uppercase() == ticker_upper)
            .map(|company| {
                let cik = format!("{:0>10}", company.cik_str);
                debug!("Found CIK {} for ticker {}", cik, ticker);
                cik
            })
            .ok_or_else(|| DcfError::SymbolNotFound(ticker.to_string()))
    }

    /// Fetch company facts from SEC EDGAR.
    ///
    /// A company without XBRL filings has no facts document; that comes back
    /// as `Ok(None)`.
    async fn fetch_company_facts(&self, cik: &str) -> Result<Option<CompanyFactsResponse>> {
        let cik_padded = format!("{cik:0>10}");
        let url = format!("{EDGAR_BASE_URL}/api/xbrl/companyfacts/CIK{cik_padded}.json");

        debug!("Fetching company facts from {}", url);
        let response = self.get(&url).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(DcfError::Network(format!(
                "Failed to fetch company facts for CIK {}: HTTP {}",
                cik_padded,
                response.status()
            )));
        }

        let facts: CompanyFactsResponse = response
            .json()
            .await
            .map_err(|e| DcfError::Parse(format!("Failed to parse company facts: {e}")))?;

        Ok(Some(facts))
    }
}

impl DataProvider for EdgarProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn description(&self) -> &str {
        "SEC EDGAR XBRL company facts from annual 10-K filings"
    }
}

#[async_trait]
impl StatementProvider for EdgarProvider {
    async fn fetch_statements(&self, symbol: &Symbol) -> Result<StatementSet> {
        if self.user_agent.trim().is_empty() {
            return Err(DcfError::ProviderNotConfigured(
                "SEC EDGAR requires a User-Agent identifying the caller".to_string(),
            ));
        }

        let cik = self.get_cik(symbol.as_str()).await?;
        let Some(facts) = self.fetch_company_facts(&cik).await? else {
            info!(symbol = %symbol, cik = %cik, "No XBRL filings found");
            return Ok(StatementSet::default());
        };

        let mut statements = StatementSet::default();
        for kind in StatementKind::ALL {
            match build_statement_table(&facts, kind, self.max_periods)? {
                Some(table) => {
                    debug!(
                        symbol = %symbol,
                        statement = %kind,
                        rows = table.height(),
                        periods = table.width().saturating_sub(1),
                        "Built statement from company facts"
                    );
                    statements.insert(RawStatement::new(PROVIDER_NAME, kind, table));
                }
                None => warn!(symbol = %symbol, statement = %kind, "No annual facts for statement"),
            }
        }

        Ok(statements)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_traits() {
        let provider = EdgarProvider::new("Test/1.0 (test@example.com)");

        assert_eq!(provider.name(), "SEC EDGAR");
        assert!(!provider.description().is_empty());
        assert_eq!(provider.max_periods, DEFAULT_MAX_PERIODS);
    }

    #[test]
    fn test_max_periods_is_at_least_one() {
        let provider = EdgarProvider::new("Test/1.0 (test@example.com)").with_max_periods(0);
        assert_eq!(provider.max_periods, 1);
    }

    #[test]
    fn test_cik_padding() {
        let cik = "320193";
        let padded = format!("{cik:0>10}");
        assert_eq!(padded, "0000320193");
        assert_eq!(padded.len(), 10);
    }

    #[tokio::test]
    async fn test_missing_user_agent_is_not_configured() {
        let provider = EdgarProvider::new("  ");
        let result = provider.fetch_statements(&Symbol::new("AAPL")).await;
        assert!(matches!(result, Err(DcfError::ProviderNotConfigured(_))));
    }

    #[tokio::test]
    async fn test_empty_ticker_is_rejected() {
        let provider = EdgarProvider::new("Test/1.0 (test@example.com)");
        assert!(matches!(
            provider.get_cik("").await,
            Err(DcfError::InvalidParameter(_))
        ));
    }

    #[tokio::test]
    async fn test_rate_limiter_spacing() {
        let mut limiter = RateLimiter::new(Duration::from_millis(20));
        let start = Instant::now();
        limiter.wait().await;
        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
