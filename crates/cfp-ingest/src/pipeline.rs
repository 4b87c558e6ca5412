//! Pipeline orchestration
//!
//! Wires fetcher, dispatcher, and sink into one batch run: download the
//! batch, stream every file through the model layer, then persist the
//! batch's file metadata once. A completed run always reports its
//! counts, even when failures shrank them along the way.

use std::sync::Arc;

use cfp_common::Result;
use tracing::info;

use crate::config::IngestConfig;
use crate::dispatch::Dispatcher;
use crate::fetch::Fetcher;
use crate::models::StoreModelFactory;
use crate::s3::S3ObjectStore;
use crate::sink::FileSink;
use crate::store::{DocumentStore, PgDocumentStore};

/// Counters for one completed batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files_fetched: usize,
    pub products_saved: u64,
    pub articles_saved: u64,
    pub line_errors: u64,
    pub record_errors: u64,
    pub documents_written: usize,
}

pub struct Pipeline {
    fetcher: Fetcher,
    dispatcher: Dispatcher,
    sink: FileSink,
}

impl Pipeline {
    pub fn new(fetcher: Fetcher, dispatcher: Dispatcher, sink: FileSink) -> Self {
        Self {
            fetcher,
            dispatcher,
            sink,
        }
    }

    /// Build the production pipeline: S3 object store, Postgres
    /// document store (connection bounded by the configured timeout),
    /// and the store-backed model factory. The store session lives for
    /// the batch and is released when the pipeline drops.
    pub async fn from_config(config: &IngestConfig) -> Result<Self> {
        let object_store = Arc::new(S3ObjectStore::new(&config.storage).await?);

        let pg = PgDocumentStore::connect(&config.store).await?;
        pg.ensure_schema().await?;
        let document_store: Arc<dyn DocumentStore> = Arc::new(pg);

        let factory = Arc::new(StoreModelFactory::new(document_store.clone()));

        Ok(Self::new(
            Fetcher::new(object_store, config.rules.clone()),
            Dispatcher::new(factory),
            FileSink::new(document_store),
        ))
    }

    /// Run one batch end to end.
    ///
    /// Fails only on transport-class errors (bucket listing, store
    /// connection); everything else is absorbed into the summary.
    pub async fn run(&self) -> Result<RunSummary> {
        let mut files = self.fetcher.download_batch().await?;

        let mut summary = RunSummary {
            files_fetched: files.len(),
            ..Default::default()
        };

        for file in &mut files {
            let outcome = self.dispatcher.parse_file(file).await;
            summary.products_saved += outcome.products;
            summary.articles_saved += outcome.articles;
            summary.line_errors += outcome.line_errors;
            summary.record_errors += outcome.record_errors;
        }

        let report = self.sink.save_batch(&files).await?;
        summary.documents_written = report.written;

        info!(
            files_fetched = summary.files_fetched,
            products_saved = summary.products_saved,
            articles_saved = summary.articles_saved,
            line_errors = summary.line_errors,
            record_errors = summary.record_errors,
            documents_written = summary.documents_written,
            "batch run complete"
        );
        Ok(summary)
    }
}
