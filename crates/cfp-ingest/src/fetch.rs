//! Object fetcher
//!
//! Lists the feed bucket, downloads each retained object, classifies it
//! from its first record URL, and assembles the [`FeedFile`] batch.
//! Only the listing itself can fail the batch; a bad object costs that
//! object, never the run.

use std::sync::Arc;

use async_trait::async_trait;
use cfp_common::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::classify::ClassifierRules;
use crate::file::FeedFile;

/// One entry from a bucket listing.
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Object-store capability consumed by the fetcher. Transport-level
/// retry and auth are the implementation's concern.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list_objects(&self) -> Result<Vec<ObjectInfo>>;
    async fn get_object(&self, key: &str) -> Result<Vec<u8>>;
}

/// Downloads and classifies one batch of feed files.
pub struct Fetcher {
    store: Arc<dyn ObjectStore>,
    rules: ClassifierRules,
}

impl Fetcher {
    pub fn new(store: Arc<dyn ObjectStore>, rules: ClassifierRules) -> Self {
        Self { store, rules }
    }

    /// Download every retained object in the bucket.
    ///
    /// Fails only when the listing itself fails. Per-object download or
    /// classification problems drop that object with a log line.
    pub async fn download_batch(&self) -> Result<Vec<FeedFile>> {
        let objects = self.store.list_objects().await?;
        info!(objects = objects.len(), "bucket listing complete");

        let mut files = Vec::new();
        for object in objects {
            if self.rules.skip_key(&object.key) {
                debug!(key = %object.key, "skipping non-feed asset");
                continue;
            }

            let body = match self.store.get_object(&object.key).await {
                Ok(body) => body,
                Err(err) => {
                    warn!(key = %object.key, error = %err, "failed to fetch object, skipping");
                    continue;
                },
            };
            let content = String::from_utf8_lossy(&body).into_owned();

            let Some(record_url) = first_record_url(&content) else {
                warn!(key = %object.key, "no record URL found in file, skipping");
                continue;
            };

            let classification = match self.rules.classify(&record_url) {
                Ok(classification) => classification,
                Err(err) => {
                    warn!(key = %object.key, error = %err, "classification failed, skipping");
                    continue;
                },
            };

            if self.rules.is_blocked(&classification.company) {
                info!(
                    key = %object.key,
                    company = %classification.company,
                    "source excluded from ingestion"
                );
                continue;
            }

            let mut file = FeedFile::new(
                object.key,
                classification.company,
                classification.is_product,
            );
            file.content = content;
            file.size = object.size;
            file.last_modified = object.last_modified;
            files.push(file);
        }

        info!(retained = files.len(), "files ready to process");
        Ok(files)
    }
}

#[derive(Deserialize)]
struct RecordLine {
    #[serde(default)]
    url: String,
}

/// Find the URL used for classification: the first line that parses as
/// a JSON object with a non-empty `url` field. The header line is a
/// non-data marker and simply fails this probe.
fn first_record_url(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        match serde_json::from_str::<RecordLine>(line) {
            Ok(record) if !record.url.is_empty() => Some(record.url),
            _ => None,
        }
    })
}
