//! Article feed record

use std::sync::Arc;

use async_trait::async_trait;
use cfp_common::{CfpError, Result};
use serde::{Deserialize, Serialize};

use super::{Breadcrumb, FeedModel};
use crate::store::DocumentStore;

pub const ARTICLES_COLLECTION: &str = "articles";

/// Crawl record shape for article feeds.
///
/// Published/modified dates stay as the raw crawler strings; the feed's
/// date formats are inconsistent and normalization belongs to the model
/// layer's consumers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArticleData {
    pub url: String,
    pub canonical_url: String,
    pub probability: f64,
    pub headline: String,
    pub date_published: String,
    pub date_published_raw: String,
    pub date_modified_raw: String,
    pub author: String,
    pub authors_list: Vec<String>,
    pub in_language: String,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub main_image: String,
    pub images: Vec<String>,
    pub description: String,
    pub article_body: String,
    pub article_body_html: String,
}

pub struct ArticleRecord {
    data: ArticleData,
    store: Arc<dyn DocumentStore>,
    id: Option<String>,
}

impl ArticleRecord {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            data: ArticleData::default(),
            store,
            id: None,
        }
    }

    pub fn data(&self) -> &ArticleData {
        &self.data
    }
}

#[async_trait]
impl FeedModel for ArticleRecord {
    fn parse(&mut self, json: &str) -> Result<()> {
        self.data = serde_json::from_str(json)
            .map_err(|e| CfpError::Model(format!("failed to parse article record: {e}")))?;
        Ok(())
    }

    async fn save(&mut self) -> Result<String> {
        let doc = serde_json::to_value(&self.data)?;
        let id = self.store.insert_one(ARTICLES_COLLECTION, &doc).await?;
        self.id = Some(id.clone());
        Ok(id)
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
