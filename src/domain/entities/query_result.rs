use crate::domain::values::metadata::Metadata;
use serde::{Deserialize, Serialize};

/// Raw nearest-neighbor response: one inner list per query embedding.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQueryResponse {
    pub ids: Vec<Vec<String>>,
    #[serde(default)]
    pub documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    pub metadatas: Option<Vec<Vec<Option<Metadata>>>>,
    #[serde(default)]
    pub distances: Option<Vec<Vec<Option<f32>>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryHit {
    pub id: String,
    pub document: String,
    pub metadata: Metadata,
    pub distance: f32,
}

impl QueryHit {
    /// Presentation score; not stored anywhere.
    pub fn similarity(&self) -> f32 {
        1.0 - self.distance
    }
}

/// Hits ordered closest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QueryResult {
    pub hits: Vec<QueryHit>,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a result from the first row of a raw response.
    ///
    /// Missing text becomes `""`, missing metadata `{}`, and a missing or
    /// negative distance `0.0`. Hits are sorted ascending by distance (stable
    /// for ties) and truncated to `limit`.
    pub fn from_raw(raw: RawQueryResponse, limit: usize) -> Self {
        let Some(ids) = raw.ids.into_iter().next() else {
            return Self::empty();
        };
        let documents = raw.documents.and_then(|d| d.into_iter().next()).unwrap_or_default();
        let metadatas = raw.metadatas.and_then(|m| m.into_iter().next()).unwrap_or_default();
        let distances = raw.distances.and_then(|d| d.into_iter().next()).unwrap_or_default();

        let mut hits: Vec<QueryHit> = ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| QueryHit {
                id,
                document: documents.get(i).cloned().flatten().unwrap_or_default(),
                metadata: metadatas.get(i).cloned().flatten().unwrap_or_default(),
                distance: distances.get(i).copied().flatten().unwrap_or(0.0).max(0.0),
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(limit);
        Self { hits }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
