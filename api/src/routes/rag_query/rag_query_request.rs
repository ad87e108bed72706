use serde::{Deserialize, Serialize};
use tutor_core::ports::RetrievedDocs;

fn default_k() -> u64 {
    5
}

/// Request payload for /rag/k-query.
#[derive(Debug, Deserialize)]
pub struct RagQueryRequest {
    pub prompt: String,
    #[serde(default = "default_k")]
    pub k: u64,
}

/// Response payload for /rag/k-query.
#[derive(Debug, Serialize)]
pub struct RagQueryResponse {
    pub prompt: String,
    pub k: u64,
    #[serde(flatten)]
    pub results: RetrievedDocs,
}
