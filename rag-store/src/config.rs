//! Runtime and collection configuration.

use std::path::PathBuf;

use crate::errors::RagError;

/// Distance function used for the vector space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceKind {
    /// Cosine distance (recommended for most embeddings).
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
    /// Euclidean distance (L2).
    Euclid,
}

/// Describes the vector space of the collection.
#[derive(Clone, Debug)]
pub struct VectorSpace {
    /// Dimensionality of vectors.
    pub size: usize,
    /// Distance function.
    pub distance: DistanceKind,
}

/// Configuration for corpus ingestion and retrieval.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Distance function (Cosine by default).
    pub distance: DistanceKind,
    /// Expected embedding dimension, enforced on every vector.
    pub embedding_dim: usize,
    /// Upsert batch size (typical range: 128..512).
    pub upsert_batch: usize,
    /// Maximum number of in-flight embedding calls during ingestion.
    pub embedding_concurrency: usize,
    /// Directory holding the `*.txt` corpus files.
    pub corpus_dir: PathBuf,
    /// Exact search flag (false = HNSW ANN).
    pub exact_search: bool,
}

impl RagConfig {
    /// Creates a sane default config for a given collection name and Qdrant endpoint.
    pub fn new_default(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            qdrant_url: url.into(),
            qdrant_api_key: None,
            collection: collection.into(),
            distance: DistanceKind::Cosine,
            embedding_dim: 1024,
            upsert_batch: 256,
            embedding_concurrency: 4,
            corpus_dir: PathBuf::from("data"),
            exact_search: false,
        }
    }

    /// Loads the config from environment variables.
    ///
    /// - `QDRANT_URL` (default `http://localhost:6334`)
    /// - `QDRANT_API_KEY` (optional)
    /// - `QDRANT_COLLECTION` (default `k-history`)
    /// - `EMBEDDING_DIM` (default `1024`)
    /// - `QDRANT_BATCH_SIZE` (default `256`)
    /// - `EMBEDDING_CONCURRENCY` (default `4`)
    /// - `CORPUS_DIR` (default `data`)
    /// - `QDRANT_EXACT_SEARCH` (default `false`)
    ///
    /// # Errors
    /// Returns `RagError::Config` when a numeric or boolean value does not parse,
    /// or when [`RagConfig::validate`] rejects the result.
    pub fn from_env() -> Result<Self, RagError> {
        let mut cfg = Self::new_default(
            env_or("QDRANT_URL", "http://localhost:6334"),
            env_or("QDRANT_COLLECTION", "k-history"),
        );
        cfg.qdrant_api_key = env_opt("QDRANT_API_KEY");
        if let Some(v) = env_parse::<usize>("EMBEDDING_DIM")? {
            cfg.embedding_dim = v;
        }
        if let Some(v) = env_parse::<usize>("QDRANT_BATCH_SIZE")? {
            cfg.upsert_batch = v;
        }
        if let Some(v) = env_parse::<usize>("EMBEDDING_CONCURRENCY")? {
            cfg.embedding_concurrency = v;
        }
        if let Some(dir) = env_opt("CORPUS_DIR") {
            cfg.corpus_dir = PathBuf::from(dir);
        }
        if let Some(v) = env_parse::<bool>("QDRANT_EXACT_SEARCH")? {
            cfg.exact_search = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(RagError::Config("qdrant_url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(RagError::Config("collection is empty".into()));
        }
        if self.embedding_dim == 0 {
            return Err(RagError::Config("embedding_dim must be > 0".into()));
        }
        if self.upsert_batch == 0 {
            return Err(RagError::Config("upsert_batch must be > 0".into()));
        }
        if self.embedding_concurrency == 0 {
            return Err(RagError::Config("embedding_concurrency must be > 0".into()));
        }
        Ok(())
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>, RagError> {
    match env_opt(name) {
        Some(v) => v
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| RagError::Config(format!("{name} has an invalid value: {v:?}"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = RagConfig::new_default("http://localhost:6334", "k-history");
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.distance, DistanceKind::Cosine);
        assert_eq!(cfg.embedding_dim, 1024);
    }

    #[test]
    fn zero_batch_is_rejected() {
        let mut cfg = RagConfig::new_default("http://localhost:6334", "k-history");
        cfg.upsert_batch = 0;
        assert!(matches!(cfg.validate(), Err(RagError::Config(_))));
    }
}
