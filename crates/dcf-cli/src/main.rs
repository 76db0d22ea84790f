//! DCF CLI binary.
//!
//! Fetches statements and market data for a symbol, runs a discounted cash
//! flow valuation and prints the result as JSON.

use clap::Parser;
use dcf::{
    DiscountRate, GrowthAssumption, GrowthMethod, StatementSources, ValuationAssumptions, Valuator,
};
use serde_json::json;
use std::process;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dcf")]
#[command(about = "Discounted cash flow valuation from SEC EDGAR and Yahoo Finance data", long_about = None)]
#[command(version)]
struct Cli {
    /// Stock symbol
    symbol: String,

    /// User agent for SEC EDGAR requests ("AppName/1.0 (contact@example.com)")
    #[arg(long, env = "SEC_USER_AGENT")]
    user_agent: Option<String>,

    /// Skip SEC EDGAR and use Yahoo Finance statements only
    #[arg(long)]
    no_edgar: bool,

    /// Growth estimation method (average, cagr or recent)
    #[arg(long, default_value = "average")]
    growth_method: GrowthMethod,

    /// Manual annual FCF growth rate, overriding the estimate
    #[arg(long, allow_negative_numbers = true)]
    growth_rate: Option<f64>,

    /// Manual discount rate, overriding WACC
    #[arg(long)]
    discount_rate: Option<f64>,

    /// Risk-free rate for WACC
    #[arg(long, default_value = "0.04")]
    risk_free_rate: f64,

    /// Market risk premium for WACC
    #[arg(long, default_value = "0.06")]
    market_risk_premium: f64,

    /// Terminal growth rate
    #[arg(long, default_value = "0.025", allow_negative_numbers = true)]
    terminal_growth: f64,

    /// Projection horizon in years
    #[arg(long, default_value = "10")]
    years: u32,

    /// Years of FCF history used for growth estimation
    #[arg(long, default_value = "5")]
    history: usize,

    /// Include the fetched statements and market snapshot in the output
    #[arg(long)]
    show_data: bool,
}

impl Cli {
    fn assumptions(&self) -> ValuationAssumptions {
        ValuationAssumptions {
            growth: self
                .growth_rate
                .map_or(GrowthAssumption::Estimated(self.growth_method), GrowthAssumption::Manual),
            discount_rate: self.discount_rate.map_or(
                DiscountRate::Wacc {
                    risk_free_rate: self.risk_free_rate,
                    market_risk_premium: self.market_risk_premium,
                },
                DiscountRate::Manual,
            ),
            terminal_growth_rate: self.terminal_growth,
            projection_years: self.years,
            fcf_history_years: self.history,
        }
    }

    fn sources(&self) -> StatementSources {
        let mut sources = StatementSources::new();
        match (&self.user_agent, self.no_edgar) {
            (Some(user_agent), false) => sources = sources.with_edgar(user_agent),
            (None, false) => warn!("SEC_USER_AGENT not set; using Yahoo Finance statements only"),
            (_, true) => {}
        }
        sources.with_yahoo()
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let assumptions = cli.assumptions();
    assumptions.validate()?;

    let mut valuator = Valuator::new(cli.symbol.as_str(), cli.sources());
    let report = valuator.fetch().await;
    if !report.ok {
        return Err(report.message.into());
    }

    let result = valuator.compute_valuation(&assumptions)?;

    let mut output = json!({
        "symbol": valuator.symbol(),
        "sources": report.message,
        "valuation": result,
    });
    if cli.show_data {
        output["statements"] = serde_json::to_value(valuator.statements())?;
        output["market"] = serde_json::to_value(valuator.snapshot())?;
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
