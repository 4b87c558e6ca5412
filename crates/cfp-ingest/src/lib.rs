//! CFP Ingest Library
//!
//! Streaming ingestion pipeline for crawl-output feed files.
//!
//! Feed files are newline-delimited JSON objects stored in an S3 bucket,
//! one crawl record per line, with a non-data header line at the top.
//! The pipeline:
//!
//! 1. lists and downloads retained objects, classifying each file as a
//!    product or article feed from the first record URL ([`fetch`]),
//! 2. streams each file line by line through a concurrent JSON parser
//!    that drops malformed lines without aborting the file ([`stream`]),
//! 3. routes every record to the matching domain model and saves it,
//!    isolating per-record failures ([`dispatch`]),
//! 4. bulk-persists per-file ingestion metadata to the document store
//!    with partial-failure semantics ([`sink`]).
//!
//! # Example
//!
//! ```no_run
//! use cfp_ingest::config::IngestConfig;
//! use cfp_ingest::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = IngestConfig::from_env()?;
//!     let pipeline = Pipeline::from_config(&config).await?;
//!     let summary = pipeline.run().await?;
//!     tracing::info!(?summary, "ingestion finished");
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod config;
pub mod dispatch;
pub mod fetch;
pub mod file;
pub mod models;
pub mod pipeline;
pub mod s3;
pub mod sink;
pub mod store;
pub mod stream;

pub use cfp_common::{CfpError, Result};
