//! Embedding executor with concurrency and dimension checks.

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::{embed::EmbeddingsProvider, errors::RagError, record::RagRecord};

/// Embeds texts for records that have no vector yet.
///
/// # Arguments
/// - `records`: mutable slice of `RagRecord`s.
/// - `provider`: embedding backend.
/// - `expected_dim`: enforced vector size (error on mismatch).
/// - `concurrency`: maximum number of concurrent embedding calls.
///
/// # Errors
/// Returns [`RagError::VectorSizeMismatch`] if dimensions mismatch,
/// or the provider's error if an embedding call fails.
pub async fn embed_missing(
    records: &mut [RagRecord],
    provider: &dyn EmbeddingsProvider,
    expected_dim: usize,
    concurrency: usize,
) -> Result<(), RagError> {
    let idxs: Vec<usize> = records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.embedding.is_none().then_some(i))
        .collect();

    info!(total = records.len(), missing = idxs.len(), concurrency, "embed_missing");

    if idxs.is_empty() {
        debug!("embed_missing: nothing to embed");
        return Ok(());
    }

    let texts: Vec<(usize, String)> = idxs.into_iter().map(|i| (i, records[i].text.clone())).collect();

    let results: Vec<(usize, Vec<f32>)> = stream::iter(texts)
        .map(|(i, text)| async move {
            let v = provider.embed(&text).await?;
            Ok::<(usize, Vec<f32>), RagError>((i, v))
        })
        .buffer_unordered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, RagError>>()?;

    for (i, v) in results {
        if v.len() != expected_dim {
            return Err(RagError::VectorSizeMismatch {
                got: v.len(),
                want: expected_dim,
            });
        }
        records[i].embedding = Some(v);
    }

    debug!("embed_missing: embeddings filled");
    Ok(())
}
