//! Configuration
//!
//! All configuration is resolved once at pipeline construction time and
//! passed into the components as plain values; nothing re-reads the
//! environment mid-run.

use cfp_common::{CfpError, Result};
use serde::{Deserialize, Serialize};
use std::env;

use crate::classify::ClassifierRules;

/// Default document-store connection timeout in seconds. A connection
/// attempt must fail definitively after this wait, not block.
pub const DEFAULT_STORE_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default maximum document-store pool connections.
pub const DEFAULT_STORE_MAX_CONNECTIONS: u32 = 5;

/// Object-store (S3/MinIO) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub endpoint: Option<String>,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub path_style: bool,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self> {
        let bucket = env::var("FEED_BUCKET")
            .or_else(|_| env::var("S3_BUCKET"))
            .map_err(|_| CfpError::config("FEED_BUCKET not set"))?;

        Ok(Self {
            endpoint: env::var("S3_ENDPOINT").ok(),
            region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .unwrap_or_else(|_| "us-east-1".to_string()),
            bucket,
            access_key: env::var("S3_ACCESS_KEY")
                .or_else(|_| env::var("AWS_ACCESS_KEY_ID"))
                .unwrap_or_default(),
            secret_key: env::var("S3_SECRET_KEY")
                .or_else(|_| env::var("AWS_SECRET_ACCESS_KEY"))
                .unwrap_or_default(),
            path_style: env::var("S3_PATH_STYLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        })
    }

    /// Local MinIO configuration for development and tests.
    pub fn for_minio(endpoint: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            region: "us-east-1".to_string(),
            bucket: bucket.into(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            path_style: true,
        }
    }
}

/// Document-store (Postgres) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| CfpError::config("DATABASE_URL not set"))?;

        Ok(Self {
            url,
            max_connections: env::var("STORE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_STORE_MAX_CONNECTIONS),
            connect_timeout_secs: env::var("STORE_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_STORE_CONNECT_TIMEOUT_SECS),
        })
    }
}

/// Top-level ingestion configuration, assembled once by the entry point.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub storage: StorageConfig,
    pub store: StoreConfig,
    pub rules: ClassifierRules,
}

impl IngestConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            storage: StorageConfig::from_env()?,
            store: StoreConfig::from_env()?,
            rules: ClassifierRules::default(),
        })
    }
}
