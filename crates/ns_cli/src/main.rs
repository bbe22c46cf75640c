mod duration;
mod logging;
mod report;

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::{info, warn};

use ns_core::config::{DEFAULT_CLASSIFY_TIMEOUT, DEFAULT_FINANCIAL_DOMAINS};
use ns_core::Config;
use ns_pipeline::{CancelToken, Pipeline};

use crate::duration::HumanDuration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Company news sentiment analysis", long_about = None)]
pub struct Cli {
    /// NewsAPI credential
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true, global = true)]
    news_api_key: Option<String>,
    /// Sentiment classifier endpoint
    #[arg(long, env = "FINBERT_API_URL", global = true)]
    classifier_url: Option<String>,
    /// Override the NewsAPI `everything` endpoint
    #[arg(long, env = "NEWS_API_URL", global = true)]
    news_api_url: Option<String>,
    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Fetch, classify and summarize news sentiment for a company
    Analyze {
        /// Company name, e.g. Apple, Meta, Amazon
        company: String,
        /// Day to analyze as YYYY-MM-DD (defaults to today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
        /// Maximum concurrent classifier calls
        #[arg(long)]
        concurrency: Option<usize>,
        /// Timeout per HTTP request (e.g. 10s, 500ms)
        #[arg(long)]
        timeout: Option<HumanDuration>,
        /// Upper bound on one classification, defaults to the larger of
        /// --timeout and 15s
        #[arg(long)]
        classify_timeout: Option<HumanDuration>,
    },
    /// List the financial news domains queried by default
    Domains,
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got {:?}: {}", s, e))
}

fn build_config(
    cli: &Cli,
    concurrency: Option<usize>,
    timeout: Option<HumanDuration>,
    classify_timeout: Option<HumanDuration>,
) -> anyhow::Result<Config> {
    let mut builder = Config::builder();
    if let Some(key) = &cli.news_api_key {
        builder = builder.news_api_key(key.as_str());
    }
    if let Some(url) = &cli.classifier_url {
        builder = builder.classifier_url(url.as_str());
    }
    if let Some(url) = &cli.news_api_url {
        builder = builder.news_api_url(url.as_str());
    }
    if let Some(limit) = concurrency {
        builder = builder.max_concurrency(limit);
    }
    if let Some(timeout) = timeout {
        builder = builder.request_timeout(timeout.0);
    }
    // a classification must not be cut shorter than its own HTTP request
    let classify_timeout = classify_timeout
        .map(|t| t.0)
        .or_else(|| timeout.map(|t| t.0.max(DEFAULT_CLASSIFY_TIMEOUT)));
    if let Some(classify_timeout) = classify_timeout {
        builder = builder.classify_timeout(classify_timeout);
    }
    builder
        .build()
        .context("set NEWS_API_KEY and FINBERT_API_URL (or pass --news-api-key / --classifier-url)")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match &cli.command {
        Commands::Domains => {
            for domain in DEFAULT_FINANCIAL_DOMAINS {
                println!("{}", domain);
            }
            Ok(())
        }
        Commands::Analyze {
            company,
            date,
            json,
            concurrency,
            timeout,
            classify_timeout,
        } => {
            let config = build_config(&cli, *concurrency, *timeout, *classify_timeout)?;
            let pipeline = Pipeline::from_config(&config)?;
            let date = date.unwrap_or_else(|| Local::now().date_naive());

            let cancel = CancelToken::new();
            let trigger = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling run");
                    trigger.cancel();
                }
            });

            info!("📈 Analyzing news sentiment for {} on {}", company, date);
            let result = match pipeline.run_with_cancel(company, date, &cancel).await {
                Ok(result) => result,
                Err(ns_core::Error::Cancelled) => bail!("analysis cancelled"),
                Err(e) => return Err(e.into()),
            };

            if let Some(err) = &result.fetch_error {
                eprintln!("Error fetching news: {}", err);
            }

            if *json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", report::render_text(&result));
            }
            Ok(())
        }
    }
}
