#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dcf/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Yahoo Finance statement and market data provider.
//!
//! This crate provides a Yahoo Finance provider that implements the
//! [`DataProvider`], [`StatementProvider`], and [`MarketDataProvider`]
//! traits from `dcf-core`.
//!
//! # Features
//!
//! - Annual cash flow, income and balance sheet tables from the fundamentals
//!   timeseries API
//! - Beta, market cap, shares outstanding and price from the quote summary API
//! - Built-in rate limiting (1 request per second by default)
//!
//! # Example
//!
//! ```no_run
//! use dcf_yahoo::YahooProvider;
//! use dcf_core::{MarketDataProvider, Symbol};
//!
//! # async fn example() -> dcf_core::Result<()> {
//! let provider = YahooProvider::new();
//! let snapshot = provider.fetch_market_snapshot(&Symbol::new("AAPL")).await?;
//! println!("beta: {:?}", snapshot.beta);
//! # Ok(())
//! # }
//! ```

mod timeseries;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use chrono::Utc;
use dcf_core::{
    DataProvider, DcfError, MarketDataProvider, MarketSnapshot, RawStatement, Result,
    StatementKind, StatementProvider, StatementSet, Symbol,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::timeseries::{TimeseriesResponse, build_statement_table, series_values, type_query};

/// Yahoo Finance quote summary API base URL.
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";

/// Yahoo Finance fundamentals timeseries API base URL.
const TIMESERIES_URL: &str =
    "https://query2.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries";

/// Quote summary modules holding the market snapshot fields.
const SNAPSHOT_MODULES: &str = "price,summaryDetail,defaultKeyStatistics,financialData";

/// Earliest timeseries timestamp requested (1985-08-23).
const TIMESERIES_START: i64 = 493_590_046;

/// Default rate limit delay in milliseconds.
const DEFAULT_RATE_LIMIT_MS: u64 = 1000;

/// User agent for HTTP requests.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Provider name, also used in data-source reports.
const PROVIDER_NAME: &str = "Yahoo Finance";

/// Yahoo Finance data provider.
///
/// Implements [`DataProvider`], [`StatementProvider`], and [`MarketDataProvider`].
#[derive(Debug)]
pub struct YahooProvider {
    client: reqwest::Client,
    rate_limit_ms: u64,
    last_request_time: AtomicU64,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider with default settings.
    ///
    /// Uses built-in rate limiting of 1 request per second.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rate_limit(Duration::from_millis(DEFAULT_RATE_LIMIT_MS))
    }

    /// Create a new Yahoo Finance provider with a custom HTTP client.
    ///
    /// Uses the provided client for all HTTP requests. Rate limiting
    /// is still applied.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            last_request_time: AtomicU64::new(0),
        }
    }

    /// Create a new Yahoo Finance provider with custom rate limiting.
    #[must_use]
    pub fn with_rate_limit(rate_limit: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            rate_limit_ms: u64::try_from(rate_limit.as_millis()).unwrap_or(u64::MAX),
            last_request_time: AtomicU64::new(0),
        }
    }

    /// Apply rate limiting before making a request.
    async fn apply_rate_limit(&self) {
        let last = self.last_request_time.load(Ordering::Relaxed);
        let elapsed = now_millis().saturating_sub(last);

        if elapsed < self.rate_limit_ms {
            let wait_time = self.rate_limit_ms - elapsed;
            debug!("Rate limiting: waiting {}ms", wait_time);
            sleep(Duration::from_millis(wait_time)).await;
        }

        self.last_request_time.store(now_millis(), Ordering::Relaxed);
    }

    /// Sends a rate-limited GET request and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: &str, symbol: &Symbol) -> Result<T> {
        self.apply_rate_limit().await;

        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DcfError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DcfError::RateLimited {
                provider: PROVIDER_NAME.to_string(),
                retry_after: Some(Duration::from_secs(60)),
            });
        }

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(DcfError::SymbolNotFound(symbol.to_string()));
        }

        if !response.status().is_success() {
            return Err(DcfError::Network(format!(
                "HTTP {} for {}",
                response.status(),
                symbol
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| DcfError::Parse(e.to_string()))
    }

    /// Build the timeseries URL requesting every statement line item.
    fn build_timeseries_url(symbol: &Symbol, end_ts: i64) -> String {
        format!(
            "{}/{}?symbol={}&type={}&period1={}&period2={}",
            TIMESERIES_URL,
            symbol.as_str(),
            symbol.as_str(),
            type_query(),
            TIMESERIES_START,
            end_ts
        )
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn now_millis() -> u64 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    u64::try_from(millis).unwrap_or(u64::MAX)
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn description(&self) -> &str {
        "Yahoo Finance fundamentals timeseries and quote summary"
    }
}

#[async_trait]
impl StatementProvider for YahooProvider {
    async fn fetch_statements(&self, symbol: &Symbol) -> Result<StatementSet> {
        let url = Self::build_timeseries_url(symbol, Utc::now().timestamp());
        let response: TimeseriesResponse = self.get_json(&url, symbol).await?;
        let by_type = series_values(&response)?;

        let mut statements = StatementSet::default();
        for kind in StatementKind::ALL {
            match build_statement_table(&by_type, kind)? {
                Some(table) => {
                    debug!(
                        symbol = %symbol,
                        statement = %kind,
                        periods = table.height(),
                        "Built statement from timeseries"
                    );
                    statements.insert(RawStatement::new(PROVIDER_NAME, kind, table));
                }
                None => warn!(symbol = %symbol, statement = %kind, "No annual data for statement"),
            }
        }

        Ok(statements)
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    async fn fetch_market_snapshot(&self, symbol: &Symbol) -> Result<MarketSnapshot> {
        let url = format!(
            "{}/{}?modules={}",
            QUOTE_SUMMARY_URL,
            symbol.as_str(),
            SNAPSHOT_MODULES
        );
        let summary: QuoteSummaryResponse = self.get_json(&url, symbol).await?;
        snapshot_from_summary(symbol, summary)
    }
}

/// Reads the market snapshot fields out of a quote summary response.
///
/// Fields are taken from the first module that reports them. Yahoo does not
/// publish an effective tax rate, so `tax_rate` stays unset.
fn snapshot_from_summary(symbol: &Symbol, summary: QuoteSummaryResponse) -> Result<MarketSnapshot> {
    if let Some(error) = summary.quote_summary.error {
        if error.code == "Not Found" {
            return Err(DcfError::SymbolNotFound(symbol.to_string()));
        }
        return Err(DcfError::ProviderUnavailable {
            provider: PROVIDER_NAME.to_string(),
            reason: format!("{}: {}", error.code, error.description),
        });
    }

    let data = summary
        .quote_summary
        .result
        .into_iter()
        .flatten()
        .next()
        .ok_or_else(|| DcfError::SymbolNotFound(symbol.to_string()))?;

    let detail = data.summary_detail.unwrap_or_default();
    let stats = data.default_key_statistics.unwrap_or_default();
    let financial = data.financial_data.unwrap_or_default();
    let price = data.price.unwrap_or_default();

    Ok(MarketSnapshot {
        symbol: symbol.clone(),
        beta: detail.beta.value().or_else(|| stats.beta.value()),
        market_cap: detail.market_cap.value().or_else(|| price.market_cap.value()),
        shares_outstanding: stats.shares_outstanding.value(),
        current_price: financial
            .current_price
            .value()
            .or_else(|| price.regular_market_price.value()),
        tax_rate: None,
    })
}

// ============================================================================
// Yahoo Finance API Response Types
// ============================================================================

/// Quote Summary API response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummaryResult,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryData>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryData {
    summary_detail: Option<SummaryDetail>,
    default_key_statistics: Option<KeyStatistics>,
    financial_data: Option<FinancialData>,
    price: Option<PriceModule>,
}

/// A formatted Yahoo number: `{"raw": 1.29, "fmt": "1.29"}`, or `{}` when absent.
#[derive(Debug, Default, Deserialize)]
struct YahooValue {
    #[serde(default)]
    raw: Option<f64>,
}

impl YahooValue {
    fn value(&self) -> Option<f64> {
        self.raw.filter(|v| v.is_finite())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SummaryDetail {
    beta: YahooValue,
    market_cap: YahooValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct KeyStatistics {
    beta: YahooValue,
    shares_outstanding: YahooValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FinancialData {
    current_price: YahooValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PriceModule {
    regular_market_price: YahooValue,
    market_cap: YahooValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<MarketSnapshot> {
        let summary: QuoteSummaryResponse = serde_json::from_str(json).unwrap();
        snapshot_from_summary(&Symbol::new("AAPL"), summary)
    }

    #[test]
    fn test_provider_info() {
        let provider = YahooProvider::new();

        assert_eq!(provider.name(), "Yahoo Finance");
        assert!(!provider.description().is_empty());
    }

    #[test]
    fn test_default() {
        let provider = YahooProvider::default();
        assert_eq!(provider.name(), "Yahoo Finance");
        assert_eq!(provider.rate_limit_ms, DEFAULT_RATE_LIMIT_MS);
    }

    #[test]
    fn test_build_timeseries_url() {
        let url = YahooProvider::build_timeseries_url(&Symbol::new("AAPL"), 1_700_000_000);

        assert!(url.contains("/timeseries/AAPL?symbol=AAPL"));
        assert!(url.contains("type=annualOperatingCashFlow,"));
        assert!(url.ends_with("period1=493590046&period2=1700000000"));
    }

    #[test]
    fn test_snapshot_from_summary() {
        let snapshot = parse(
            r#"{"quoteSummary": {"result": [{
                "summaryDetail": {"beta": {"raw": 1.29, "fmt": "1.29"}, "marketCap": {"raw": 2.9e12, "fmt": "2.9T"}},
                "defaultKeyStatistics": {"beta": {}, "sharesOutstanding": {"raw": 15.5e9, "fmt": "15.5B"}},
                "financialData": {"currentPrice": {"raw": 189.5, "fmt": "189.50"}},
                "price": {"regularMarketPrice": {"raw": 189.4}, "marketCap": {"raw": 2.8e12}}
            }], "error": null}}"#,
        )
        .unwrap();

        assert_eq!(snapshot.symbol.as_str(), "AAPL");
        assert_eq!(snapshot.beta, Some(1.29));
        assert_eq!(snapshot.market_cap, Some(2.9e12));
        assert_eq!(snapshot.shares_outstanding, Some(15.5e9));
        assert_eq!(snapshot.current_price, Some(189.5));
        assert_eq!(snapshot.tax_rate, None);
    }

    #[test]
    fn test_snapshot_falls_back_across_modules() {
        let snapshot = parse(
            r#"{"quoteSummary": {"result": [{
                "summaryDetail": {"beta": {}},
                "defaultKeyStatistics": {"beta": {"raw": 0.9}},
                "price": {"regularMarketPrice": {"raw": 42.0}, "marketCap": {"raw": 1.0e9}}
            }], "error": null}}"#,
        )
        .unwrap();

        assert_eq!(snapshot.beta, Some(0.9));
        assert_eq!(snapshot.market_cap, Some(1.0e9));
        assert_eq!(snapshot.current_price, Some(42.0));
        assert_eq!(snapshot.shares_outstanding, None);
    }

    #[test]
    fn test_snapshot_without_modules_is_empty() {
        let snapshot = parse(r#"{"quoteSummary": {"result": [{}], "error": null}}"#).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_snapshot_not_found() {
        let result = parse(
            r#"{"quoteSummary": {"result": null, "error": {"code": "Not Found", "description": "Quote not found for ticker symbol: ZZZZ"}}}"#,
        );
        assert!(matches!(result, Err(DcfError::SymbolNotFound(_))));

        let result = parse(r#"{"quoteSummary": {"result": [], "error": null}}"#);
        assert!(matches!(result, Err(DcfError::SymbolNotFound(_))));
    }

    #[test]
    fn test_snapshot_api_error() {
        let result = parse(
            r#"{"quoteSummary": {"result": null, "error": {"code": "Unauthorized", "description": "Invalid Crumb"}}}"#,
        );
        assert!(matches!(result, Err(DcfError::ProviderUnavailable { .. })));
    }
}
