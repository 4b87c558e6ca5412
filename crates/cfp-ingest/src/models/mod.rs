//! Domain models for feed records
//!
//! The dispatcher only knows the [`FeedModel`] capability: construct,
//! feed one JSON record to `parse`, then `save`. The concrete product
//! and article models deserialize the crawl record shape and write
//! themselves to their document-store collection. Field-level business
//! validation is out of scope here.

use std::sync::Arc;

use async_trait::async_trait;
use cfp_common::Result;
use serde::{Deserialize, Serialize};

use crate::store::DocumentStore;

pub mod article;
pub mod product;

pub use article::ArticleRecord;
pub use product::ProductRecord;

/// One record flowing through the dispatcher.
#[async_trait]
pub trait FeedModel: Send {
    /// Load the model's state from one normalized JSON record.
    fn parse(&mut self, json: &str) -> Result<()>;

    /// Persist the model, returning its generated identifier.
    async fn save(&mut self) -> Result<String>;

    /// Identifier assigned by the last successful save.
    fn id(&self) -> Option<&str>;
}

/// Constructs a fresh model per record, keyed by file classification.
pub trait ModelFactory: Send + Sync {
    fn product(&self) -> Box<dyn FeedModel>;
    fn article(&self) -> Box<dyn FeedModel>;
}

/// Default factory: models persist into the shared document store.
pub struct StoreModelFactory {
    store: Arc<dyn DocumentStore>,
}

impl StoreModelFactory {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

impl ModelFactory for StoreModelFactory {
    fn product(&self) -> Box<dyn FeedModel> {
        Box::new(ProductRecord::new(self.store.clone()))
    }

    fn article(&self) -> Box<dyn FeedModel> {
        Box::new(ArticleRecord::new(self.store.clone()))
    }
}

// Shared record fragments. Crawl output is sparse and inconsistent, so
// every field defaults.

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Offer {
    pub price: String,
    pub currency: String,
    pub availability: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Breadcrumb {
    pub name: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AdditionalProperty {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AggregateRating {
    pub rating_value: f64,
    pub best_rating: f64,
    pub review_count: i64,
}
