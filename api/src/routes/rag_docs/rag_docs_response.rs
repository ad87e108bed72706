use serde::Serialize;
use tutor_core::ports::StoredDocument;

/// Response payload for /rag/docs.
#[derive(Debug, Serialize)]
pub struct RagDocsResponse {
    pub collection_size: usize,
    pub documents: Vec<StoredDocument>,
}
