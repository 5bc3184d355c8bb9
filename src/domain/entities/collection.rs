use crate::domain::values::metadata::Metadata;
use serde::{Deserialize, Serialize};

/// A live reference to a collection inside the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionHandle {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionInfo {
    pub name: String,
    pub count: usize,
    pub metadata: Metadata,
}
