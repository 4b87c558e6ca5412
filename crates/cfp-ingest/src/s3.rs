//! S3 object-store client
//!
//! Implements the [`ObjectStore`](crate::fetch::ObjectStore) capability
//! over `aws-sdk-s3`. Works against AWS proper or any S3-compatible
//! endpoint (MinIO with path-style addressing).

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::{config::Region, Client};
use cfp_common::{CfpError, Result};
use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::fetch::{ObjectInfo, ObjectStore};

#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        debug!(bucket = %config.bucket, region = %config.region, "initializing S3 client");

        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "cfp-ingest",
        );

        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .force_path_style(config.path_style);

        if let Some(endpoint) = &config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(s3_config_builder.build());

        info!(bucket = %config.bucket, "S3 client initialized");

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_objects(&self) -> Result<Vec<ObjectInfo>> {
        debug!(bucket = %self.bucket, "listing objects");

        let mut objects = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                CfpError::transport(format!("failed to list bucket {}: {e}", self.bucket))
            })?;

            for item in page.contents() {
                let Some(key) = item.key() else { continue };
                objects.push(ObjectInfo {
                    key: key.to_string(),
                    size: item.size().unwrap_or(0),
                    last_modified: item
                        .last_modified()
                        .and_then(|dt| chrono::DateTime::parse_from_rfc3339(&dt.to_string()).ok())
                        .map(|dt| dt.with_timezone(&chrono::Utc)),
                });
            }
        }

        debug!(bucket = %self.bucket, count = objects.len(), "listing complete");
        Ok(objects)
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                CfpError::transport(format!("failed to get s3://{}/{key}: {e}", self.bucket))
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| {
                CfpError::transport(format!("failed to read body of s3://{}/{key}: {e}", self.bucket))
            })?
            .into_bytes()
            .to_vec();

        debug!(bucket = %self.bucket, key, bytes = data.len(), "downloaded object");
        Ok(data)
    }
}
