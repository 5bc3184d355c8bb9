use crate::application::engine::EngineProcessManager;
use crate::domain::entities::collection::{CollectionHandle, CollectionInfo};
use crate::domain::entities::document::{DocumentBatch, DocumentRecords};
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use crate::domain::ports::vector_engine::VectorEngine;
use crate::domain::values::metadata::{self, Metadata};
use chrono::Utc;
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Owns one named collection in the engine.
///
/// The collection handle is fetched lazily and cached. First use is not
/// locked: concurrent callers may each run get-or-create, and the engine
/// guarantees they all receive the same collection.
pub struct DocumentStore {
    name: String,
    collection_metadata: Metadata,
    engine: Arc<dyn VectorEngine>,
    manager: Arc<EngineProcessManager>,
    embedder: Arc<dyn EmbeddingProvider>,
    handle: RwLock<Option<CollectionHandle>>,
}

impl DocumentStore {
    pub fn new(
        name: impl Into<String>,
        engine: Arc<dyn VectorEngine>,
        manager: Arc<EngineProcessManager>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        let mut collection_metadata = Metadata::new();
        collection_metadata.insert("description".into(), json!("document vector store"));
        Self {
            name: name.into(),
            collection_metadata,
            engine,
            manager,
            embedder,
            handle: RwLock::new(None),
        }
    }

    pub(crate) fn engine(&self) -> &dyn VectorEngine {
        self.engine.as_ref()
    }

    fn cached(&self) -> Option<CollectionHandle> {
        self.handle
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Get-or-create the collection. Safe to call repeatedly and concurrently.
    pub async fn initialize(&self) -> Result<CollectionHandle, DomainError> {
        self.manager.ensure_running().await?;
        let handle = self
            .engine
            .get_or_create_collection(&self.name, &self.collection_metadata)
            .await?;
        *self.handle.write().unwrap_or_else(|e| e.into_inner()) = Some(handle.clone());
        info!(collection = %self.name, "collection initialized");
        Ok(handle)
    }

    /// Cached handle while the engine is known to be running; otherwise the
    /// engine is re-probed (and relaunched if needed) first.
    pub(crate) async fn collection(&self) -> Result<CollectionHandle, DomainError> {
        match self.cached() {
            Some(handle) if self.manager.state().is_running() => Ok(handle),
            _ => self.initialize().await,
        }
    }

    /// Embeds and stores `texts`, returning the ids used.
    ///
    /// Embedding runs before the engine is touched, so a configuration or
    /// embedding failure leaves the collection unchanged.
    pub async fn add(
        &self,
        texts: Vec<String>,
        ids: Option<Vec<String>>,
        metadatas: Option<Vec<Metadata>>,
    ) -> Result<Vec<String>, DomainError> {
        validate_texts(&texts)?;
        let ids = match ids {
            Some(ids) => {
                validate_ids(&ids, texts.len())?;
                ids
            }
            None => generate_ids(texts.len()),
        };
        let metadatas = match metadatas {
            Some(m) => {
                if m.len() != texts.len() {
                    return Err(DomainError::InvalidInput(format!(
                        "expected {} metadatas, got {}",
                        texts.len(),
                        m.len()
                    )));
                }
                for meta in &m {
                    metadata::validate(meta).map_err(DomainError::InvalidInput)?;
                }
                m
            }
            None => synthesize_metadatas(&texts),
        };

        debug!(count = texts.len(), provider = self.embedder.name(), "embedding documents");
        let embeddings = self.embedder.embed(&texts, InputType::Document).await?;
        check_embeddings(&embeddings, texts.len())?;
        let dim = embeddings[0].len();
        if dim != self.embedder.dimension() {
            warn!(
                provider = self.embedder.name(),
                expected = self.embedder.dimension(),
                actual = dim,
                "provider returned an unexpected embedding dimension"
            );
        }

        let collection = self.collection().await?;
        let count = texts.len();
        self.engine
            .add(
                &collection,
                DocumentRecords {
                    ids: ids.clone(),
                    embeddings,
                    documents: texts,
                    metadatas,
                },
            )
            .await?;
        info!(collection = %self.name, count, "documents added");
        Ok(ids)
    }

    /// All documents, or only `ids`. Unknown ids are omitted.
    pub async fn get(&self, ids: Option<Vec<String>>) -> Result<DocumentBatch, DomainError> {
        let collection = self.collection().await?;
        self.engine.get(&collection, ids.as_deref()).await
    }

    /// Deletes `ids` and returns how many of them existed.
    pub async fn delete(&self, ids: Vec<String>) -> Result<usize, DomainError> {
        if ids.is_empty() {
            return Err(DomainError::InvalidInput("ids must not be empty".into()));
        }
        let collection = self.collection().await?;
        let existing = self.engine.get(&collection, Some(ids.as_slice())).await?.len();
        self.engine.delete(&collection, &ids).await?;
        info!(collection = %self.name, requested = ids.len(), deleted = existing, "documents deleted");
        Ok(existing)
    }

    /// Removes every document. A no-op on an empty collection.
    pub async fn clear(&self) -> Result<usize, DomainError> {
        let ids = self.get(None).await?.ids;
        if ids.is_empty() {
            debug!(collection = %self.name, "clear on empty collection");
            return Ok(0);
        }
        self.delete(ids).await
    }

    pub async fn count(&self) -> Result<usize, DomainError> {
        let collection = self.collection().await?;
        self.engine.count(&collection).await
    }

    pub async fn info(&self) -> Result<CollectionInfo, DomainError> {
        let collection = self.collection().await?;
        let count = self.engine.count(&collection).await?;
        Ok(CollectionInfo {
            name: self.name.clone(),
            count,
            metadata: collection.metadata,
        })
    }
}

fn validate_texts(texts: &[String]) -> Result<(), DomainError> {
    if texts.is_empty() {
        return Err(DomainError::InvalidInput("texts must not be empty".into()));
    }
    if let Some(i) = texts.iter().position(|t| t.is_empty()) {
        return Err(DomainError::InvalidInput(format!("text at index {i} is empty")));
    }
    Ok(())
}

fn validate_ids(ids: &[String], expected: usize) -> Result<(), DomainError> {
    if ids.len() != expected {
        return Err(DomainError::InvalidInput(format!(
            "expected {expected} ids, got {}",
            ids.len()
        )));
    }
    if ids.iter().any(|id| id.is_empty()) {
        return Err(DomainError::InvalidInput("ids must not be empty strings".into()));
    }
    let unique: HashSet<&String> = ids.iter().collect();
    if unique.len() != ids.len() {
        return Err(DomainError::InvalidInput("ids must be unique within a batch".into()));
    }
    Ok(())
}

/// `doc_{millis}_{batch}_{index}`: the batch token keeps calls made within
/// the same millisecond apart.
fn generate_ids(count: usize) -> Vec<String> {
    let millis = Utc::now().timestamp_millis();
    let batch = uuid::Uuid::new_v4().simple().to_string();
    let batch = &batch[..8];
    (0..count).map(|i| format!("doc_{millis}_{batch}_{i}")).collect()
}

fn synthesize_metadatas(texts: &[String]) -> Vec<Metadata> {
    let created_at = Utc::now().to_rfc3339();
    texts
        .iter()
        .enumerate()
        .map(|(index, text)| {
            let mut m = Metadata::new();
            m.insert("text".into(), json!(text));
            m.insert("index".into(), json!(index));
            m.insert("createdAt".into(), json!(created_at));
            m
        })
        .collect()
}

fn check_embeddings(embeddings: &[Vec<f32>], expected: usize) -> Result<(), DomainError> {
    if embeddings.len() != expected {
        return Err(DomainError::Embedding(format!(
            "provider returned {} embeddings for {expected} texts",
            embeddings.len()
        )));
    }
    let dim = embeddings.first().map(Vec::len).unwrap_or(0);
    if dim == 0 {
        return Err(DomainError::Embedding("provider returned empty embeddings".into()));
    }
    if embeddings.iter().any(|e| e.len() != dim) {
        return Err(DomainError::Embedding("provider returned embeddings of mixed dimension".into()));
    }
    Ok(())
}
