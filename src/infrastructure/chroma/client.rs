use super::wire::{
    AddRequest, CreateCollectionRequest, DeleteRequest, GetRequest, GetResponse, QueryRequest,
};
use crate::domain::entities::collection::CollectionHandle;
use crate::domain::entities::document::{DocumentBatch, DocumentRecords};
use crate::domain::entities::query_result::RawQueryResponse;
use crate::domain::error::DomainError;
use crate::domain::ports::vector_engine::VectorEngine;
use crate::domain::values::metadata::Metadata;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// HTTP client for the engine's v1 REST API.
pub struct ChromaClient {
    client: Client,
    base_url: String,
}

impl ChromaClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .connect_timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url)
    }

    fn collection_url(&self, collection: &CollectionHandle, op: &str) -> String {
        self.url(&format!("/collections/{}/{op}", collection.id))
    }

    /// Non-2xx bodies are surfaced verbatim through `wrap`.
    async fn check(resp: Response, what: &str, wrap: fn(String) -> DomainError) -> Result<Response, DomainError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(wrap(format!("{what} failed ({status}): {body}")))
    }

    async fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T, DomainError> {
        resp.json()
            .await
            .map_err(|e| DomainError::Parse(format!("{what} response: {e}")))
    }
}

#[async_trait]
impl VectorEngine for ChromaClient {
    async fn heartbeat(&self) -> Result<(), DomainError> {
        let resp = self
            .client
            .get(self.url("/heartbeat"))
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .map_err(|e| DomainError::EngineUnavailable(format!("heartbeat: {e}")))?;
        Self::check(resp, "heartbeat", DomainError::EngineUnavailable).await?;
        Ok(())
    }

    async fn get_or_create_collection(
        &self,
        name: &str,
        metadata: &Metadata,
    ) -> Result<CollectionHandle, DomainError> {
        let resp = self
            .client
            .post(self.url("/collections"))
            .json(&CreateCollectionRequest {
                name,
                metadata: (!metadata.is_empty()).then_some(metadata),
                get_or_create: true,
            })
            .send()
            .await
            .map_err(|e| DomainError::EngineWrite(format!("get_or_create_collection: {e}")))?;
        let resp = Self::check(resp, "get_or_create_collection", DomainError::EngineWrite).await?;
        let handle: CollectionHandle = Self::decode(resp, "get_or_create_collection").await?;
        debug!(collection = %handle.name, id = %handle.id, "collection ready");
        Ok(handle)
    }

    async fn add(&self, collection: &CollectionHandle, records: DocumentRecords) -> Result<(), DomainError> {
        let resp = self
            .client
            .post(self.collection_url(collection, "add"))
            .json(&AddRequest {
                ids: &records.ids,
                embeddings: &records.embeddings,
                documents: &records.documents,
                metadatas: &records.metadatas,
            })
            .send()
            .await
            .map_err(|e| DomainError::EngineWrite(format!("add: {e}")))?;
        Self::check(resp, "add", DomainError::EngineWrite).await?;
        Ok(())
    }

    async fn get(&self, collection: &CollectionHandle, ids: Option<&[String]>) -> Result<DocumentBatch, DomainError> {
        let resp = self
            .client
            .post(self.collection_url(collection, "get"))
            .json(&GetRequest {
                ids,
                include: ["documents", "metadatas"],
            })
            .send()
            .await
            .map_err(|e| DomainError::EngineQuery(format!("get: {e}")))?;
        let resp = Self::check(resp, "get", DomainError::EngineQuery).await?;
        let body: GetResponse = Self::decode(resp, "get").await?;
        Ok(body.into())
    }

    async fn delete(&self, collection: &CollectionHandle, ids: &[String]) -> Result<(), DomainError> {
        let resp = self
            .client
            .post(self.collection_url(collection, "delete"))
            .json(&DeleteRequest { ids })
            .send()
            .await
            .map_err(|e| DomainError::EngineWrite(format!("delete: {e}")))?;
        Self::check(resp, "delete", DomainError::EngineWrite).await?;
        Ok(())
    }

    async fn query(
        &self,
        collection: &CollectionHandle,
        query_embeddings: &[Vec<f32>],
        n_results: usize,
        filter: Option<&serde_json::Value>,
    ) -> Result<RawQueryResponse, DomainError> {
        let resp = self
            .client
            .post(self.collection_url(collection, "query"))
            .json(&QueryRequest {
                query_embeddings,
                n_results,
                filter,
                include: ["documents", "metadatas", "distances"],
            })
            .send()
            .await
            .map_err(|e| DomainError::EngineQuery(format!("query: {e}")))?;
        let resp = Self::check(resp, "query", DomainError::EngineQuery).await?;
        Self::decode(resp, "query").await
    }

    async fn count(&self, collection: &CollectionHandle) -> Result<usize, DomainError> {
        let resp = self
            .client
            .get(self.collection_url(collection, "count"))
            .send()
            .await
            .map_err(|e| DomainError::EngineQuery(format!("count: {e}")))?;
        let resp = Self::check(resp, "count", DomainError::EngineQuery).await?;
        Self::decode(resp, "count").await
    }

    fn endpoint(&self) -> String {
        self.base_url.clone()
    }
}
