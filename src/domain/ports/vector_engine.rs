use crate::domain::entities::collection::CollectionHandle;
use crate::domain::entities::document::{DocumentBatch, DocumentRecords};
use crate::domain::entities::query_result::RawQueryResponse;
use crate::domain::error::DomainError;
use crate::domain::values::metadata::Metadata;
use async_trait::async_trait;

/// Remote vector-collection API. The engine is the source of truth for which
/// collections exist; `get_or_create_collection` never fails on an existing name.
#[async_trait]
pub trait VectorEngine: Send + Sync {
    /// Liveness probe. `Ok` only when the engine answers.
    async fn heartbeat(&self) -> Result<(), DomainError>;

    async fn get_or_create_collection(
        &self,
        name: &str,
        metadata: &Metadata,
    ) -> Result<CollectionHandle, DomainError>;

    async fn add(&self, collection: &CollectionHandle, records: DocumentRecords) -> Result<(), DomainError>;

    /// All documents, or only the given ids. Unknown ids are omitted.
    async fn get(&self, collection: &CollectionHandle, ids: Option<&[String]>) -> Result<DocumentBatch, DomainError>;

    /// Unknown ids are ignored.
    async fn delete(&self, collection: &CollectionHandle, ids: &[String]) -> Result<(), DomainError>;

    async fn query(
        &self,
        collection: &CollectionHandle,
        query_embeddings: &[Vec<f32>],
        n_results: usize,
        filter: Option<&serde_json::Value>,
    ) -> Result<RawQueryResponse, DomainError>;

    async fn count(&self, collection: &CollectionHandle) -> Result<usize, DomainError>;

    /// Base URL or other human-readable location of the engine.
    fn endpoint(&self) -> String;
}
