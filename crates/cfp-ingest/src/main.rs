//! CFP Ingest - crawl feed ingestion tool

use anyhow::Result;
use cfp_common::logging::{init_logging, LogConfig, LogLevel};
use cfp_ingest::classify::ClassifierRules;
use cfp_ingest::config::IngestConfig;
use cfp_ingest::pipeline::Pipeline;
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "cfp-ingest")]
#[command(author, version, about = "CFP crawl feed ingestion tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest one batch of feed files from the configured bucket
    Run,

    /// Classify a single record URL and print the decision
    Classify {
        /// Record URL to classify
        #[arg(short, long)]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env()?;
    log_config.log_file_prefix = "cfp-ingest".to_string();
    if cli.verbose {
        log_config = log_config.with_level(LogLevel::Debug);
    }
    init_logging(&log_config)?;

    match cli.command {
        Command::Run => {
            let config = IngestConfig::from_env()?;
            info!(bucket = %config.storage.bucket, "starting batch ingestion");

            let pipeline = Pipeline::from_config(&config).await?;
            let summary = pipeline.run().await?;

            info!(
                files_fetched = summary.files_fetched,
                products_saved = summary.products_saved,
                articles_saved = summary.articles_saved,
                line_errors = summary.line_errors,
                record_errors = summary.record_errors,
                documents_written = summary.documents_written,
                "ingestion complete"
            );
        },
        Command::Classify { url } => {
            let rules = ClassifierRules::default();
            let classification = rules.classify(&url)?;
            info!(
                company = %classification.company,
                is_product = classification.is_product,
                blocked = rules.is_blocked(&classification.company),
                "classified URL"
            );
        },
    }

    Ok(())
}
