use crate::domain::values::metadata::Metadata;
use serde::{Deserialize, Serialize};

/// A stored document as returned by reads. Embeddings stay in the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub metadata: Metadata,
}

/// Column-oriented insert batch; every column has one entry per document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecords {
    pub ids: Vec<String>,
    pub embeddings: Vec<Vec<f32>>,
    pub documents: Vec<String>,
    pub metadatas: Vec<Metadata>,
}

impl DocumentRecords {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Column-oriented read result, the shape `list` prints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentBatch {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub metadatas: Vec<Metadata>,
}

impl DocumentBatch {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Row view over the columns.
    pub fn documents(&self) -> Vec<Document> {
        self.ids
            .iter()
            .enumerate()
            .map(|(i, id)| Document {
                id: id.clone(),
                text: self.documents.get(i).cloned().unwrap_or_default(),
                metadata: self.metadatas.get(i).cloned().unwrap_or_default(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_view_tolerates_short_columns() {
        let batch = DocumentBatch {
            ids: vec!["a".into(), "b".into()],
            documents: vec!["first".into()],
            metadatas: vec![json!({"k": 1}).as_object().cloned().unwrap()],
        };
        let rows = batch.documents();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text, "first");
        assert_eq!(rows[0].metadata["k"], 1);
        assert_eq!(rows[1].text, "");
        assert!(rows[1].metadata.is_empty());
    }
}
