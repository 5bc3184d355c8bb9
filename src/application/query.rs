use crate::application::document_store::DocumentStore;
use crate::domain::entities::query_result::QueryResult;
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_N_RESULTS: usize = 5;

/// Nearest-neighbor search over a [`DocumentStore`]'s collection.
pub struct QueryEngine {
    store: Arc<DocumentStore>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl QueryEngine {
    pub fn new(store: Arc<DocumentStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    /// Closest documents to `text`, ascending by distance.
    ///
    /// `filter` is passed through to the engine untouched.
    pub async fn query(
        &self,
        text: &str,
        n_results: usize,
        filter: Option<serde_json::Value>,
    ) -> Result<QueryResult, DomainError> {
        if text.is_empty() {
            return Err(DomainError::InvalidInput("query text must not be empty".into()));
        }
        if n_results == 0 {
            return Err(DomainError::InvalidInput("nResults must be at least 1".into()));
        }

        let embeddings = self.embedder.embed(&[text.to_string()], InputType::Query).await?;
        let Some(embedding) = embeddings.into_iter().next() else {
            return Err(DomainError::Embedding("provider returned no embedding for query".into()));
        };

        let collection = self.store.collection().await?;
        let engine = self.store.engine();
        let count = engine.count(&collection).await?;
        if count == 0 {
            debug!(collection = %collection.name, "query on empty collection");
            return Ok(QueryResult::empty());
        }

        let n = n_results.min(count);
        let raw = engine
            .query(&collection, &[embedding], n, filter.as_ref())
            .await?;
        let result = QueryResult::from_raw(raw, n);
        debug!(collection = %collection.name, hits = result.len(), "query answered");
        Ok(result)
    }
}
