use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use polygon_bars::config::ClientConfig;
use polygon_bars::models::bar::Bar;
use polygon_bars::models::request_params::AggsRequest;
use polygon_bars::models::timeframe::{TimeFrame, TimespanUnit};
use polygon_bars::providers::polygon::PolygonClient;
use polygon_bars::providers::polygon::endpoint::LastQuoteRequest;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Root directory of the response cache.
    #[arg(long, default_value = "cache")]
    cache_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the latest quote midpoint for a ticker
    Last {
        /// Ticker symbol (e.g. "AAPL")
        #[arg(long)]
        ticker: String,
    },

    /// Find the bar(s) covering an instant, merging a bracketing pair
    Search {
        /// Ticker symbol (e.g. "AAPL")
        #[arg(long)]
        ticker: String,

        /// Bar size multiplier (at least 1)
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(i64).range(1..))]
        multiplier: i64,

        /// Timespan unit: minute, hour, day, week, month, quarter
        #[arg(long, default_value = "hour")]
        timespan: String,

        /// Target instant, RFC-3339 (e.g. "2019-01-02T15:30:00-05:00")
        #[arg(long)]
        at: String,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn zero_or_negative_multiplier_is_rejected() {
        for bad in ["0", "-1"] {
            let result = Cli::try_parse_from([
                "polygon_bars",
                "search",
                "--ticker",
                "AAPL",
                "--multiplier",
                bad,
                "--at",
                "2019-01-02T15:30:00Z",
            ]);
            assert!(result.is_err(), "multiplier {bad} should be rejected");
        }
    }

    #[test]
    fn default_multiplier_is_one() {
        let cli = Cli::try_parse_from([
            "polygon_bars",
            "search",
            "--ticker",
            "AAPL",
            "--at",
            "2019-01-02T15:30:00Z",
        ])
        .unwrap();
        match cli.command {
            Commands::Search { multiplier, .. } => assert_eq!(multiplier, 1),
            Commands::Last { .. } => panic!("expected the search subcommand"),
        }
    }
}

fn parse_timespan(unit: &str) -> Result<TimespanUnit, String> {
    match unit.trim().to_lowercase().as_str() {
        "minute" => Ok(TimespanUnit::Minute),
        "hour" => Ok(TimespanUnit::Hour),
        "day" => Ok(TimespanUnit::Day),
        "week" => Ok(TimespanUnit::Week),
        "month" => Ok(TimespanUnit::Month),
        "quarter" => Ok(TimespanUnit::Quarter),
        other => Err(format!("unknown timespan unit: {other}")),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = ClientConfig::from_env()?.with_cache_dir(&cli.cache_dir);
    let client = PolygonClient::new(config)?;

    match &cli.command {
        Commands::Last { ticker } => {
            let quote = client
                .last_quote(&LastQuoteRequest {
                    ticker: ticker.clone(),
                })
                .await?;
            println!(
                "{} bid:{} ask:{} market:{}",
                quote
                    .at()
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "?".to_string()),
                quote.bid_price,
                quote.ask_price,
                quote.market(),
            );
        }
        Commands::Search {
            ticker,
            multiplier,
            timespan,
            at,
        } => {
            let unit = parse_timespan(timespan)?;
            let at = DateTime::parse_from_rfc3339(at)?.with_timezone(&Utc);

            // The search replaces the window with one derived from `at`;
            // the dates here are placeholders.
            let request = AggsRequest::new(
                ticker.clone(),
                TimeFrame::new(*multiplier, unit),
                at.date_naive(),
                at.date_naive(),
                false,
            );

            let bars = client.search_bars(&request, at).await?;
            println!("{}", Bar::merge(&bars));
        }
    }

    Ok(())
}
