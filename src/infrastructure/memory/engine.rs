use super::filter;
use crate::domain::entities::collection::CollectionHandle;
use crate::domain::entities::document::{DocumentBatch, DocumentRecords};
use crate::domain::entities::query_result::RawQueryResponse;
use crate::domain::error::DomainError;
use crate::domain::ports::vector_engine::VectorEngine;
use crate::domain::values::metadata::Metadata;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

struct StoredDocument {
    id: String,
    embedding: Vec<f32>,
    text: String,
    metadata: Metadata,
}

struct StoredCollection {
    handle: CollectionHandle,
    dimension: Option<usize>,
    documents: Vec<StoredDocument>,
}

/// In-process vector engine with squared-L2 distance.
///
/// Follows the remote engine's contract: get-or-create by name, ids already
/// present are ignored on add, unknown ids are ignored on get/delete, and all
/// documents in a collection share one dimension.
pub struct MemoryEngine {
    collections: Mutex<HashMap<String, StoredCollection>>,
    healthy: AtomicBool,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            healthy: AtomicBool::new(true),
        }
    }

    /// Makes `heartbeat` fail (or succeed again).
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, StoredCollection>>, String> {
        self.collections.lock().map_err(|e| e.to_string())
    }

    fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
    }
}

fn find<'a>(
    collections: &'a mut HashMap<String, StoredCollection>,
    handle: &CollectionHandle,
) -> Option<&'a mut StoredCollection> {
    collections.values_mut().find(|c| c.handle.id == handle.id)
}

#[async_trait]
impl VectorEngine for MemoryEngine {
    async fn heartbeat(&self) -> Result<(), DomainError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DomainError::EngineUnavailable("memory engine marked unhealthy".into()))
        }
    }

    async fn get_or_create_collection(
        &self,
        name: &str,
        metadata: &Metadata,
    ) -> Result<CollectionHandle, DomainError> {
        let mut collections = self.lock().map_err(DomainError::EngineWrite)?;
        let stored = collections
            .entry(name.to_string())
            .or_insert_with(|| StoredCollection {
                handle: CollectionHandle {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: name.to_string(),
                    metadata: metadata.clone(),
                },
                dimension: None,
                documents: Vec::new(),
            });
        Ok(stored.handle.clone())
    }

    async fn add(&self, collection: &CollectionHandle, records: DocumentRecords) -> Result<(), DomainError> {
        if records.is_empty() {
            return Ok(());
        }
        let n = records.len();
        if records.embeddings.len() != n || records.documents.len() != n || records.metadatas.len() != n {
            return Err(DomainError::EngineWrite("add columns have different lengths".into()));
        }
        let unique: HashSet<&String> = records.ids.iter().collect();
        if unique.len() != n {
            return Err(DomainError::EngineWrite("ids in an add batch must be unique".into()));
        }

        let mut collections = self.lock().map_err(DomainError::EngineWrite)?;
        let stored = find(&mut collections, collection)
            .ok_or_else(|| DomainError::EngineWrite(format!("collection {} does not exist", collection.name)))?;

        let dimension = stored
            .dimension
            .or_else(|| records.embeddings.first().map(Vec::len));
        if let Some(dim) = dimension {
            if let Some(bad) = records.embeddings.iter().find(|e| e.len() != dim) {
                return Err(DomainError::EngineWrite(format!(
                    "embedding dimension {} does not match collection dimension {dim}",
                    bad.len()
                )));
            }
        }

        let existing: HashSet<String> = stored.documents.iter().map(|d| d.id.clone()).collect();
        let DocumentRecords {
            ids,
            embeddings,
            documents,
            metadatas,
        } = records;
        for (((id, embedding), text), metadata) in ids.into_iter().zip(embeddings).zip(documents).zip(metadatas) {
            if existing.contains(&id) {
                continue;
            }
            stored.documents.push(StoredDocument {
                id,
                embedding,
                text,
                metadata,
            });
        }
        if !stored.documents.is_empty() {
            stored.dimension = dimension;
        }
        Ok(())
    }

    async fn get(&self, collection: &CollectionHandle, ids: Option<&[String]>) -> Result<DocumentBatch, DomainError> {
        let mut collections = self.lock().map_err(DomainError::EngineQuery)?;
        let stored = find(&mut collections, collection)
            .ok_or_else(|| DomainError::EngineQuery(format!("collection {} does not exist", collection.name)))?;

        let wanted: Option<HashSet<&String>> = ids.map(|ids| ids.iter().collect());
        let mut batch = DocumentBatch::default();
        for doc in &stored.documents {
            if wanted.as_ref().is_some_and(|w| !w.contains(&doc.id)) {
                continue;
            }
            batch.ids.push(doc.id.clone());
            batch.documents.push(doc.text.clone());
            batch.metadatas.push(doc.metadata.clone());
        }
        Ok(batch)
    }

    async fn delete(&self, collection: &CollectionHandle, ids: &[String]) -> Result<(), DomainError> {
        let mut collections = self.lock().map_err(DomainError::EngineWrite)?;
        let stored = find(&mut collections, collection)
            .ok_or_else(|| DomainError::EngineWrite(format!("collection {} does not exist", collection.name)))?;
        let doomed: HashSet<&String> = ids.iter().collect();
        stored.documents.retain(|d| !doomed.contains(&d.id));
        Ok(())
    }

    async fn query(
        &self,
        collection: &CollectionHandle,
        query_embeddings: &[Vec<f32>],
        n_results: usize,
        filter: Option<&serde_json::Value>,
    ) -> Result<RawQueryResponse, DomainError> {
        let mut collections = self.lock().map_err(DomainError::EngineQuery)?;
        let stored = find(&mut collections, collection)
            .ok_or_else(|| DomainError::EngineQuery(format!("collection {} does not exist", collection.name)))?;

        let mut candidates = Vec::with_capacity(stored.documents.len());
        for doc in &stored.documents {
            let keep = match filter {
                Some(f) => filter::matches(f, &doc.metadata).map_err(DomainError::EngineQuery)?,
                None => true,
            };
            if keep {
                candidates.push(doc);
            }
        }

        let mut raw = RawQueryResponse::default();
        let (mut documents, mut metadatas, mut distances) = (Vec::new(), Vec::new(), Vec::new());
        for query in query_embeddings {
            if let Some(dim) = stored.dimension {
                if query.len() != dim {
                    return Err(DomainError::EngineQuery(format!(
                        "query dimension {} does not match collection dimension {dim}",
                        query.len()
                    )));
                }
            }
            let mut scored: Vec<(f32, &StoredDocument)> = candidates
                .iter()
                .map(|doc| (Self::squared_l2(query, &doc.embedding), *doc))
                .collect();
            scored.sort_by(|a, b| a.0.total_cmp(&b.0));
            scored.truncate(n_results);

            raw.ids.push(scored.iter().map(|(_, d)| d.id.clone()).collect());
            documents.push(scored.iter().map(|(_, d)| Some(d.text.clone())).collect());
            metadatas.push(scored.iter().map(|(_, d)| Some(d.metadata.clone())).collect());
            distances.push(scored.iter().map(|(dist, _)| Some(*dist)).collect());
        }
        raw.documents = Some(documents);
        raw.metadatas = Some(metadatas);
        raw.distances = Some(distances);
        Ok(raw)
    }

    async fn count(&self, collection: &CollectionHandle) -> Result<usize, DomainError> {
        let mut collections = self.lock().map_err(DomainError::EngineQuery)?;
        find(&mut collections, collection)
            .map(|c| c.documents.len())
            .ok_or_else(|| DomainError::EngineQuery(format!("collection {} does not exist", collection.name)))
    }

    fn endpoint(&self) -> String {
        "memory://".to_string()
    }
}
