//! Core data models used by the library.

use serde::{Deserialize, Serialize};

/// One corpus document as stored in Qdrant.
#[derive(Clone, Debug, PartialEq)]
pub struct RagRecord {
    /// Sequential numeric id (file order, then line order).
    pub id: u64,
    pub text: String,
    /// Corpus file the line came from.
    pub source: String,
    pub embedding: Option<Vec<f32>>,
}

/// Top-k retrieval result. `texts[i]` pairs with `distances[i]`, best first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocs {
    pub texts: Vec<String>,
    pub distances: Vec<f32>,
}

impl RetrievedDocs {
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// One stored corpus line as listed back from the collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub document: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}
