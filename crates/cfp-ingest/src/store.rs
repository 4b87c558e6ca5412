//! Document store
//!
//! Capability interface for the document store plus the Postgres
//! implementation. Documents are schemaless JSONB rows keyed by a
//! collection name, mirroring the collection model of the historical
//! store.

use std::time::Duration;

use async_trait::async_trait;
use cfp_common::{CfpError, Result};
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::StoreConfig;

/// Document-store capability consumed by the sink and the domain
/// models. Implementations own transport-level retry and auth.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a single document, returning its generated identifier.
    async fn insert_one(&self, collection: &str, doc: &Value) -> Result<String>;

    /// Insert a batch of documents in one statement, returning the
    /// generated identifiers in input order.
    async fn insert_many(&self, collection: &str, docs: &[Value]) -> Result<Vec<String>>;
}

/// Postgres-backed document store.
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Connect with a bounded timeout. The attempt fails definitively
    /// after `connect_timeout_secs` instead of blocking.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| {
                CfpError::transport(format!("failed to connect to document store: {e}"))
            })?;

        info!("document store connection established");
        Ok(Self { pool })
    }

    /// Wrap an existing pool (tests, shared pools).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the documents table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id UUID PRIMARY KEY,
                collection TEXT NOT NULL,
                doc JSONB NOT NULL,
                inserted_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| CfpError::store(format!("failed to create documents table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS documents_collection_idx ON documents (collection)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| CfpError::store(format!("failed to create collection index: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert_one(&self, collection: &str, doc: &Value) -> Result<String> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO documents (id, collection, doc) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(collection)
            .bind(doc)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                CfpError::store(format!("insert into {collection} failed: {e}"))
            })?;

        debug!(collection, id = %id, "inserted document");
        Ok(id.to_string())
    }

    async fn insert_many(&self, collection: &str, docs: &[Value]) -> Result<Vec<String>> {
        if docs.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = docs.iter().map(|_| Uuid::new_v4()).collect();

        let mut builder = sqlx::QueryBuilder::<sqlx::Postgres>::new(
            "INSERT INTO documents (id, collection, doc) ",
        );
        builder.push_values(ids.iter().zip(docs.iter()), |mut row, (id, doc)| {
            row.push_bind(*id).push_bind(collection).push_bind(doc);
        });

        builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| {
                CfpError::store(format!("bulk insert into {collection} failed: {e}"))
            })?;

        debug!(collection, count = ids.len(), "bulk inserted documents");
        Ok(ids.iter().map(Uuid::to_string).collect())
    }
}
