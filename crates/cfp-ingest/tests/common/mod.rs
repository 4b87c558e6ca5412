//! Shared in-memory fakes for integration tests

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cfp_common::{CfpError, Result};
use chrono::Utc;
use serde_json::Value;

use cfp_ingest::fetch::{ObjectInfo, ObjectStore};
use cfp_ingest::store::DocumentStore;

/// Object store backed by a map of key -> body.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: BTreeMap<String, Vec<u8>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, key: &str, body: &str) -> Self {
        self.objects.insert(key.to_string(), body.as_bytes().to_vec());
        self
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list_objects(&self) -> Result<Vec<ObjectInfo>> {
        Ok(self
            .objects
            .iter()
            .map(|(key, body)| ObjectInfo {
                key: key.clone(),
                size: body.len() as i64,
                last_modified: Some(Utc::now()),
            })
            .collect())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        self.objects
            .get(key)
            .cloned()
            .ok_or_else(|| CfpError::transport(format!("no such key {key}")))
    }
}

/// Document store collecting inserts per collection.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<String, Vec<Value>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Documents written to one collection, in insertion order.
    pub fn docs(&self, collection: &str) -> Vec<Value> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert_one(&self, collection: &str, doc: &Value) -> Result<String> {
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());
        Ok(uuid::Uuid::new_v4().to_string())
    }

    async fn insert_many(&self, collection: &str, docs: &[Value]) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for doc in docs {
            ids.push(self.insert_one(collection, doc).await?);
        }
        Ok(ids)
    }
}
