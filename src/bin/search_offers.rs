//! One-shot flight search.
//!
//! Runs a single aggregation with the service configuration and prints the
//! response JSON to stdout.
//!
//! ```text
//! search_offers AMS BCN 2025-10-01 --providers mock
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use flight_aggregator::api::rest::SearchResponse;
use flight_aggregator::application::services::{AggregationConfig, OfferAggregationEngine};
use flight_aggregator::domain::value_objects::SearchQuery;
use flight_aggregator::infrastructure::config::{AppConfig, LoggingSettings};
use flight_aggregator::infrastructure::logging::init_tracing;
use flight_aggregator::infrastructure::providers::build_providers;

#[derive(Parser, Debug)]
#[command(name = "search_offers")]
#[command(about = "Aggregate flight offers for one route and date")]
struct Args {
    /// Origin airport code (e.g. AMS)
    origin: String,

    /// Destination airport code (e.g. BCN)
    destination: String,

    /// Departure date (YYYY-MM-DD)
    date: String,

    /// Providers to query, overriding providers.enabled
    #[arg(long, value_delimiter = ',')]
    providers: Vec<String>,

    /// Search timeout in milliseconds, overriding search.timeout_ms
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Compact single-line output
    #[arg(long)]
    compact: bool,

    /// Log filter written to stderr
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    log: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = AppConfig::builder()
        // The CLI issues no tokens.
        .set_default("auth.jwt_secret", "unused")?;
    if !args.providers.is_empty() {
        builder = builder.set_override("providers.enabled", args.providers.clone())?;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        builder = builder.set_override("search.timeout_ms", timeout_ms)?;
    }
    let config = AppConfig::from_builder(builder).context("failed to load configuration")?;

    init_tracing(&LoggingSettings {
        level: args.log.clone(),
        ..config.logging.clone()
    })
    .context("failed to initialize logging")?;

    let query = SearchQuery::parse(&args.origin, &args.destination, &args.date)?;
    let engine = OfferAggregationEngine::new(
        build_providers(&config.providers)?,
        AggregationConfig::with_timeout(config.search.timeout()),
    );

    let result = engine.search(&query).await?;
    let response = SearchResponse::new(&query, &result);

    let json = if args.compact {
        serde_json::to_string(&response)?
    } else {
        serde_json::to_string_pretty(&response)?
    };
    println!("{json}");
    Ok(())
}
