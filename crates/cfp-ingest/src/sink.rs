//! Persistence sink
//!
//! Writes the batch's per-file ingestion metadata to the document
//! store after dispatching finishes. Two insertion strategies: one
//! bulk insert when every file in the batch streamed cleanly, or
//! per-document inserts with skip-on-error when any file saw parse
//! trouble (or the bulk write itself fails). An individual bad
//! document never blocks the rest of the batch.

use std::sync::Arc;

use cfp_common::Result;
use tracing::{info, warn};

use crate::file::FeedFile;
use crate::store::DocumentStore;

/// Collection receiving file metadata documents.
pub const FILES_COLLECTION: &str = "files";

/// Outcome of one batch write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkReport {
    /// Documents the sink tried to write
    pub attempted: usize,
    /// Documents actually written
    pub written: usize,
}

pub struct FileSink {
    store: Arc<dyn DocumentStore>,
}

impl FileSink {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Persist the batch's file metadata.
    ///
    /// Fails only on store-connection-class errors surfaced by the
    /// per-document path; write failures for individual documents are
    /// logged and reflected in the reduced `written` count.
    pub async fn save_batch(&self, files: &[FeedFile]) -> Result<SinkReport> {
        if files.is_empty() {
            return Ok(SinkReport { attempted: 0, written: 0 });
        }

        let docs: Vec<serde_json::Value> = files
            .iter()
            .map(|file| serde_json::to_value(file.to_document()))
            .collect::<std::result::Result<_, _>>()?;

        let clean = files.iter().all(|file| !file.had_errors());

        if clean {
            match self.store.insert_many(FILES_COLLECTION, &docs).await {
                Ok(ids) => {
                    info!(written = ids.len(), "bulk-persisted file metadata");
                    return Ok(SinkReport { attempted: docs.len(), written: ids.len() });
                },
                Err(err) => {
                    warn!(error = %err, "bulk insert failed, retrying per document");
                },
            }
        }

        let mut written = 0;
        for (file, doc) in files.iter().zip(&docs) {
            match self.store.insert_one(FILES_COLLECTION, doc).await {
                Ok(_) => written += 1,
                Err(err) => {
                    warn!(path = %file.path, error = %err, "failed to persist file metadata");
                },
            }
        }

        info!(attempted = docs.len(), written, "persisted file metadata");
        Ok(SinkReport { attempted: docs.len(), written })
    }
}
