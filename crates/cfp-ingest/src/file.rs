//! Feed file descriptor
//!
//! Tracks one object-store object through the pipeline: constructed by
//! the fetcher, mutated by the dispatcher while its records stream
//! through, and finally persisted (metadata only) by the sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One feed file being ingested.
///
/// `content` and `record_errors` are transient pipeline state and never
/// reach the document store; persistence goes through [`FeedFile::to_document`].
#[derive(Debug, Clone)]
pub struct FeedFile {
    /// Object key in the source bucket
    pub path: String,

    /// Canonical source name derived at classification time
    pub company: String,

    /// Raw file text. Cleared when the dispatcher takes the stream;
    /// never persisted.
    pub content: String,

    /// Object size in bytes as reported by the listing
    pub size: i64,

    /// Object last-modified timestamp from the listing
    pub last_modified: Option<DateTime<Utc>>,

    /// True when the source is a known product feed
    pub is_product: bool,

    /// True once the dispatcher has exhausted this file's line stream
    pub is_parsed: bool,

    /// Identifier of the most recently saved record from this file
    pub owner_id: Option<String>,

    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,

    /// Post-processing move target, set by the archival collaborator
    pub archived_path: Option<String>,

    /// Count of record parse/save failures seen while streaming. Used
    /// by the sink to pick its insertion strategy.
    pub record_errors: u64,

    /// Count of malformed lines dropped while streaming
    pub line_errors: u64,
}

impl FeedFile {
    pub fn new(path: impl Into<String>, company: impl Into<String>, is_product: bool) -> Self {
        let now = Utc::now();
        Self {
            path: path.into(),
            company: company.into(),
            content: String::new(),
            size: 0,
            last_modified: None,
            is_product,
            is_parsed: false,
            owner_id: None,
            date_created: now,
            date_modified: now,
            archived_path: None,
            record_errors: 0,
            line_errors: 0,
        }
    }

    /// Whether streaming this file dropped any lines or records.
    pub fn had_errors(&self) -> bool {
        self.record_errors > 0 || self.line_errors > 0
    }

    /// Build the persisted ingestion-metadata document. The raw content
    /// is omitted by construction; only metadata survives.
    pub fn to_document(&self) -> FileDocument {
        FileDocument {
            path: self.path.clone(),
            company: self.company.clone(),
            size: self.size,
            is_product: self.is_product,
            is_parsed: self.is_parsed,
            date_created: self.date_created,
            date_modified: self.date_modified,
            owner_id: self.owner_id.clone(),
            archived_path: self.archived_path.clone(),
        }
    }
}

/// Document shape written to the `files` collection.
///
/// Field names match the historical store schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDocument {
    pub path: String,
    pub company: String,
    pub size: i64,
    pub is_product: bool,
    pub is_parsed: bool,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub owner_id: Option<String>,
    pub archived_path: Option<String>,
}
