//! Product feed record

use std::sync::Arc;

use async_trait::async_trait;
use cfp_common::{CfpError, Result};
use serde::{Deserialize, Serialize};

use super::{AdditionalProperty, AggregateRating, Breadcrumb, FeedModel, Offer};
use crate::store::DocumentStore;

pub const PRODUCTS_COLLECTION: &str = "products";

/// Crawl record shape for product feeds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductData {
    pub url: String,
    pub canonical_url: String,
    pub probability: f64,
    pub name: String,
    pub offers: Vec<Offer>,
    pub sku: String,
    pub mpn: String,
    pub brand: String,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub main_image: String,
    pub images: Vec<String>,
    pub description: String,
    pub description_html: String,
    #[serde(rename = "additionalProperty")]
    pub additional_properties: Vec<AdditionalProperty>,
    pub aggregate_rating: AggregateRating,
    pub color: String,
    pub style: String,
}

pub struct ProductRecord {
    data: ProductData,
    store: Arc<dyn DocumentStore>,
    id: Option<String>,
}

impl ProductRecord {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            data: ProductData::default(),
            store,
            id: None,
        }
    }

    pub fn data(&self) -> &ProductData {
        &self.data
    }
}

#[async_trait]
impl FeedModel for ProductRecord {
    fn parse(&mut self, json: &str) -> Result<()> {
        self.data = serde_json::from_str(json)
            .map_err(|e| CfpError::Model(format!("failed to parse product record: {e}")))?;
        Ok(())
    }

    async fn save(&mut self) -> Result<String> {
        let doc = serde_json::to_value(&self.data)?;
        let id = self.store.insert_one(PRODUCTS_COLLECTION, &doc).await?;
        self.id = Some(id.clone());
        Ok(id)
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
