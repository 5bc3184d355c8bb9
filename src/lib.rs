pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::document_store::DocumentStore;
use crate::application::engine::{EngineProcessManager, EngineStatus};
use crate::application::query::QueryEngine;
use crate::config::{Config, EngineSettings};
use crate::domain::entities::collection::CollectionInfo;
use crate::domain::entities::document::DocumentBatch;
use crate::domain::entities::query_result::QueryResult;
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::EmbeddingProvider;
use crate::domain::ports::process_runner::CommandRunner;
use crate::domain::ports::vector_engine::VectorEngine;
use crate::domain::values::metadata::Metadata;
use crate::infrastructure::chroma::client::ChromaClient;
use crate::infrastructure::embeddings;
use crate::infrastructure::process::system::SystemRunner;
use std::sync::Arc;

/// Long-lived context owning the engine manager, the collection handle and
/// the query path. Build one per process and share it.
pub struct DocVec {
    manager: Arc<EngineProcessManager>,
    store: Arc<DocumentStore>,
    query_engine: QueryEngine,
}

impl DocVec {
    pub fn from_env() -> Result<Self, DomainError> {
        Ok(Self::new(Config::from_env()?))
    }

    pub fn new(config: Config) -> Self {
        let engine: Arc<dyn VectorEngine> = Arc::new(ChromaClient::new(&config.engine.url));
        let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
        let embedder = embeddings::from_settings(&config.embedding);
        Self::with_providers(&config.collection, config.engine, engine, runner, embedder)
    }

    pub fn with_providers(
        collection: &str,
        settings: EngineSettings,
        engine: Arc<dyn VectorEngine>,
        runner: Arc<dyn CommandRunner>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        let manager = Arc::new(EngineProcessManager::new(engine.clone(), runner, settings));
        let store = Arc::new(DocumentStore::new(collection, engine, manager.clone(), embedder.clone()));
        Self {
            query_engine: QueryEngine::new(store.clone(), embedder),
            manager,
            store,
        }
    }

    pub async fn initialize(&self) -> Result<(), DomainError> {
        self.store.initialize().await.map(|_| ())
    }

    pub async fn add(
        &self,
        texts: Vec<String>,
        ids: Option<Vec<String>>,
        metadatas: Option<Vec<Metadata>>,
    ) -> Result<Vec<String>, DomainError> {
        self.store.add(texts, ids, metadatas).await
    }

    pub async fn get(&self, ids: Option<Vec<String>>) -> Result<DocumentBatch, DomainError> {
        self.store.get(ids).await
    }

    pub async fn delete(&self, ids: Vec<String>) -> Result<usize, DomainError> {
        self.store.delete(ids).await
    }

    pub async fn clear(&self) -> Result<usize, DomainError> {
        self.store.clear().await
    }

    pub async fn count(&self) -> Result<usize, DomainError> {
        self.store.count().await
    }

    pub async fn info(&self) -> Result<CollectionInfo, DomainError> {
        self.store.info().await
    }

    pub async fn query(
        &self,
        text: &str,
        n_results: usize,
        filter: Option<serde_json::Value>,
    ) -> Result<QueryResult, DomainError> {
        self.query_engine.query(text, n_results, filter).await
    }

    pub async fn ensure_engine(&self) -> Result<(), DomainError> {
        self.manager.ensure_running().await
    }

    pub async fn engine_status(&self) -> EngineStatus {
        self.manager.status().await
    }

    pub async fn stop_engine(&self) {
        self.manager.stop().await
    }
}
