//! Relevance gate: is a question in-domain, and does an answer stay on the hints.
//!
//! No retries here; the caller decides what to do with a rejection.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{TutorError, UpstreamError};
use crate::ports::{Embedder, RetrievalIndex};

pub struct RelevanceGate {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn RetrievalIndex>,
}

impl RelevanceGate {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn RetrievalIndex>) -> Self {
        Self { embedder, index }
    }

    /// Retrieves `k` documents for `question` and returns their texts.
    ///
    /// # Errors
    /// [`TutorError::OutOfDomain`] when nothing is retrieved or the mean score of
    /// all returned documents is below `threshold`.
    pub async fn is_in_domain(
        &self,
        question: &str,
        k: u64,
        threshold: f32,
    ) -> Result<Vec<String>, TutorError> {
        let vector = self.embedder.embed(question).await?;
        let docs = self.index.query(vector, k).await?;

        if docs.texts.is_empty() {
            info!(k, "no documents retrieved");
            return Err(TutorError::OutOfDomain);
        }
        let Some(avg) = mean(&docs.distances) else {
            info!(k, "retrieval returned texts without scores");
            return Err(TutorError::OutOfDomain);
        };

        info!(k, hits = docs.texts.len(), mean_distance = avg, threshold, "domain check");
        if avg < threshold {
            return Err(TutorError::OutOfDomain);
        }
        Ok(docs.texts)
    }

    /// `true` iff the cosine similarity between the space-joined hints and
    /// `answer` is at least `threshold`.
    pub async fn is_anchored(
        &self,
        hints: &[String],
        answer: &str,
        threshold: f32,
    ) -> Result<bool, TutorError> {
        let joined = hints.join(" ");
        let a = self.embedder.embed(&joined).await?;
        let b = self.embedder.embed(answer).await?;
        if a.len() != b.len() {
            return Err(UpstreamError::Embedding(format!(
                "embedding dimensions differ: {} vs {}",
                a.len(),
                b.len()
            ))
            .into());
        }

        let similarity = cosine_similarity(&a, &b);
        let anchored = similarity >= threshold;
        debug!(hints = %joined, similarity, threshold, anchored, "anchoring check");
        Ok(anchored)
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f32>() / values.len() as f32)
}

/// Cosine similarity; `0.0` when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut na, mut nb) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na.sqrt() * nb.sqrt())
    }
}
