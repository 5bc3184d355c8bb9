//! JSON bodies of the engine's v1 collection API.

use crate::domain::entities::document::DocumentBatch;
use crate::domain::values::metadata::Metadata;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct CreateCollectionRequest<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<&'a Metadata>,
    pub get_or_create: bool,
}

#[derive(Serialize)]
pub struct AddRequest<'a> {
    pub ids: &'a [String],
    pub embeddings: &'a [Vec<f32>],
    pub documents: &'a [String],
    pub metadatas: &'a [Metadata],
}

#[derive(Serialize)]
pub struct GetRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<&'a [String]>,
    pub include: [&'static str; 2],
}

#[derive(Serialize)]
pub struct DeleteRequest<'a> {
    pub ids: &'a [String],
}

#[derive(Serialize)]
pub struct QueryRequest<'a> {
    pub query_embeddings: &'a [Vec<f32>],
    pub n_results: usize,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<&'a serde_json::Value>,
    pub include: [&'static str; 3],
}

#[derive(Deserialize)]
pub struct GetResponse {
    pub ids: Vec<String>,
    #[serde(default)]
    pub documents: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub metadatas: Option<Vec<Option<Metadata>>>,
}

impl From<GetResponse> for DocumentBatch {
    fn from(resp: GetResponse) -> Self {
        let n = resp.ids.len();
        let documents = resp
            .documents
            .unwrap_or_default()
            .into_iter()
            .map(Option::unwrap_or_default)
            .chain(std::iter::repeat(String::new()))
            .take(n)
            .collect();
        let metadatas = resp
            .metadatas
            .unwrap_or_default()
            .into_iter()
            .map(Option::unwrap_or_default)
            .chain(std::iter::repeat_with(Metadata::new))
            .take(n)
            .collect();
        DocumentBatch {
            ids: resp.ids,
            documents,
            metadatas,
        }
    }
}
