//! Corpus ingestion: read `*.txt` lines → embed → upsert into Qdrant.
//!
//! Every non-empty trimmed line of every `*.txt` file in the corpus directory is one
//! document. Files are visited in file-name order and ids are assigned sequentially,
//! so rebuilding the same corpus yields the same ids.

use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use indicatif::{ProgressBar, ProgressStyle};
use qdrant_client::Payload;
use qdrant_client::qdrant::PointStruct;
use tracing::{error, info, warn};

use crate::config::{RagConfig, VectorSpace};
use crate::embed::EmbeddingsProvider;
use crate::embed_pool::embed_missing;
use crate::errors::RagError;
use crate::record::RagRecord;

/// Collection operations ingestion needs from the vector store.
pub trait CollectionWriter: Send + Sync {
    fn collection(&self) -> &str;
    fn collection_exists(&self) -> BoxFuture<'_, Result<bool, RagError>>;
    fn count_points(&self) -> BoxFuture<'_, Result<u64, RagError>>;
    fn create_collection<'a>(
        &'a self,
        space: &'a VectorSpace,
    ) -> BoxFuture<'a, Result<(), RagError>>;
    fn upsert_points(&self, points: Vec<PointStruct>) -> BoxFuture<'_, Result<u64, RagError>>;
    fn delete_collection(&self) -> BoxFuture<'_, Result<(), RagError>>;
}

/// Builds the collection from the corpus unless a complete one already exists.
///
/// An existing collection is kept when its point count equals the number of corpus
/// lines (or, with an unreadable corpus dir, when it holds any point at all);
/// otherwise it is dropped and rebuilt. A build that fails after the collection was
/// created deletes it again, so the next start retries from scratch.
///
/// Returns the number of documents ingested, `0` when the collection was kept.
///
/// # Errors
/// `RagError::EmptyCorpus` when there is nothing to ingest; I/O, embedding and
/// Qdrant errors otherwise.
pub async fn ensure_corpus(
    cfg: &RagConfig,
    target: &dyn CollectionWriter,
    provider: &dyn EmbeddingsProvider,
) -> Result<u64, RagError> {
    let corpus = read_corpus(&cfg.corpus_dir);

    if target.collection_exists().await? {
        let stored = target.count_points().await?;
        let complete = match &corpus {
            Ok(records) => stored == records.len() as u64,
            Err(_) => stored > 0,
        };
        if complete {
            info!(collection = %target.collection(), stored, "collection complete, corpus build skipped");
            return Ok(0);
        }
        warn!(
            collection = %target.collection(),
            stored,
            expected = corpus.as_ref().map(Vec::len).ok(),
            "collection incomplete, rebuilding"
        );
        target.delete_collection().await?;
    }

    let mut records = corpus?;
    if records.is_empty() {
        return Err(RagError::EmptyCorpus(cfg.corpus_dir.display().to_string()));
    }

    embed_missing(
        &mut records,
        provider,
        cfg.embedding_dim,
        cfg.embedding_concurrency,
    )
    .await?;

    target
        .create_collection(&VectorSpace {
            size: cfg.embedding_dim,
            distance: cfg.distance,
        })
        .await?;

    match upsert_all(target, &records, cfg.upsert_batch.max(1)).await {
        Ok(total) => {
            info!(collection = %target.collection(), documents = total, "corpus ingested");
            Ok(total)
        }
        Err(e) => {
            error!(collection = %target.collection(), error = %e, "ingestion failed, dropping partial collection");
            if let Err(cleanup) = target.delete_collection().await {
                error!(collection = %target.collection(), error = %cleanup, "failed to drop partial collection");
            }
            Err(e)
        }
    }
}

async fn upsert_all(
    target: &dyn CollectionWriter,
    records: &[RagRecord],
    batch_size: usize,
) -> Result<u64, RagError> {
    let pb = ProgressBar::new(records.len().div_ceil(batch_size) as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-"),
    );

    let mut total: u64 = 0;
    for chunk in records.chunks(batch_size) {
        let points = build_points(chunk)?;
        match target.upsert_points(points).await {
            Ok(n) => total += n,
            Err(e) => {
                pb.abandon();
                return Err(e);
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(total)
}

/// Reads the corpus directory into records with ids assigned in file/line order.
///
/// # Errors
/// Returns `RagError::Io` if the directory or a file cannot be read.
pub fn read_corpus(dir: &Path) -> Result<Vec<RagRecord>, RagError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    files.sort();

    let mut out = Vec::new();
    for path in files {
        let content = std::fs::read_to_string(&path)?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        for line in content.lines() {
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            out.push(RagRecord {
                id: out.len() as u64,
                text: text.to_string(),
                source: source.clone(),
                embedding: None,
            });
        }
    }
    Ok(out)
}

fn build_points(chunk: &[RagRecord]) -> Result<Vec<PointStruct>, RagError> {
    chunk
        .iter()
        .map(|r| {
            let vector = r.embedding.clone().ok_or_else(|| {
                RagError::Config(format!("record {} reached upsert without a vector", r.id))
            })?;
            let payload = Payload::try_from(serde_json::json!({
                "text": r.text,
                "source": r.source,
            }))
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
            Ok(PointStruct::new(r.id, vector, payload))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Create,
        Upsert(usize),
        Delete,
    }

    /// In-memory collection that can fail the n-th upsert (1-based).
    #[derive(Default)]
    struct MemCollection {
        exists: Mutex<bool>,
        points: Mutex<u64>,
        ops: Mutex<Vec<Op>>,
        fail_upsert: Option<usize>,
    }

    impl MemCollection {
        fn existing(points: u64) -> Self {
            Self {
                exists: Mutex::new(true),
                points: Mutex::new(points),
                ..Self::default()
            }
        }

        fn ops(&self) -> Vec<Op> {
            self.ops.lock().unwrap().clone()
        }

        fn exists(&self) -> bool {
            *self.exists.lock().unwrap()
        }
    }

    impl CollectionWriter for MemCollection {
        fn collection(&self) -> &str {
            "k-history"
        }

        fn collection_exists(&self) -> BoxFuture<'_, Result<bool, RagError>> {
            let v = self.exists();
            Box::pin(async move { Ok(v) })
        }

        fn count_points(&self) -> BoxFuture<'_, Result<u64, RagError>> {
            let v = *self.points.lock().unwrap();
            Box::pin(async move { Ok(v) })
        }

        fn create_collection<'a>(
            &'a self,
            _space: &'a VectorSpace,
        ) -> BoxFuture<'a, Result<(), RagError>> {
            self.ops.lock().unwrap().push(Op::Create);
            *self.exists.lock().unwrap() = true;
            Box::pin(async { Ok(()) })
        }

        fn upsert_points(&self, points: Vec<PointStruct>) -> BoxFuture<'_, Result<u64, RagError>> {
            let mut ops = self.ops.lock().unwrap();
            ops.push(Op::Upsert(points.len()));
            let nth = ops.iter().filter(|o| matches!(o, Op::Upsert(_))).count();
            let res = if self.fail_upsert == Some(nth) {
                Err(RagError::Qdrant("connection reset".into()))
            } else {
                *self.points.lock().unwrap() += points.len() as u64;
                Ok(points.len() as u64)
            };
            Box::pin(async move { res })
        }

        fn delete_collection(&self) -> BoxFuture<'_, Result<(), RagError>> {
            self.ops.lock().unwrap().push(Op::Delete);
            *self.exists.lock().unwrap() = false;
            *self.points.lock().unwrap() = 0;
            Box::pin(async { Ok(()) })
        }
    }

    struct UnitEmbedder;

    impl EmbeddingsProvider for UnitEmbedder {
        fn embed<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
            Box::pin(async { Ok(vec![1.0, 0.0]) })
        }
    }

    fn corpus(lines: &str) -> (tempfile::TempDir, RagConfig) {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("history.txt"), lines).unwrap();
        let mut cfg = RagConfig::new_default("http://localhost:6334", "k-history");
        cfg.corpus_dir = tmp.path().to_path_buf();
        cfg.embedding_dim = 2;
        cfg.upsert_batch = 1;
        (tmp, cfg)
    }

    const THREE_LINES: &str = "고구려\n백제\n신라\n";

    #[tokio::test]
    async fn failed_upsert_drops_the_partial_collection() {
        let (_tmp, cfg) = corpus(THREE_LINES);
        let target = MemCollection {
            fail_upsert: Some(2),
            ..MemCollection::default()
        };

        let err = ensure_corpus(&cfg, &target, &UnitEmbedder).await.unwrap_err();
        assert!(matches!(err, RagError::Qdrant(_)));
        assert_eq!(
            target.ops(),
            [Op::Create, Op::Upsert(1), Op::Upsert(1), Op::Delete]
        );
        assert!(!target.exists());

        // The next start builds again instead of trusting a truncated collection.
        let retry = MemCollection::default();
        assert_eq!(ensure_corpus(&cfg, &retry, &UnitEmbedder).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn empty_corpus_is_an_error_and_creates_nothing() {
        let (_tmp, cfg) = corpus("\n   \n");
        let target = MemCollection::default();

        let err = ensure_corpus(&cfg, &target, &UnitEmbedder).await.unwrap_err();
        assert!(matches!(err, RagError::EmptyCorpus(_)));
        assert!(target.ops().is_empty());
    }

    #[tokio::test]
    async fn complete_collection_is_kept() {
        let (_tmp, cfg) = corpus(THREE_LINES);
        let target = MemCollection::existing(3);

        assert_eq!(ensure_corpus(&cfg, &target, &UnitEmbedder).await.unwrap(), 0);
        assert!(target.ops().is_empty());
    }

    #[tokio::test]
    async fn short_collection_is_rebuilt() {
        let (_tmp, cfg) = corpus(THREE_LINES);
        let target = MemCollection::existing(1);

        assert_eq!(ensure_corpus(&cfg, &target, &UnitEmbedder).await.unwrap(), 3);
        assert_eq!(
            target.ops(),
            [Op::Delete, Op::Create, Op::Upsert(1), Op::Upsert(1), Op::Upsert(1)]
        );
    }

    #[tokio::test]
    async fn unreadable_corpus_keeps_a_populated_collection() {
        let mut cfg = RagConfig::new_default("http://localhost:6334", "k-history");
        cfg.corpus_dir = PathBuf::from("/definitely/not/here");
        let target = MemCollection::existing(42);

        assert_eq!(ensure_corpus(&cfg, &target, &UnitEmbedder).await.unwrap(), 0);
        assert!(target.ops().is_empty());
    }

    #[test]
    fn corpus_lines_are_trimmed_and_ordered_by_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        std::fs::write(dir.join("b.txt"), "세종대왕은 훈민정음을 창제했다.\n").unwrap();
        std::fs::write(dir.join("a.txt"), "  고구려는 광개토대왕 때 영토를 넓혔다.  \n\n\t\n신라는 삼국을 통일했다.").unwrap();
        std::fs::write(dir.join("notes.md"), "ignored").unwrap();

        let records = read_corpus(dir).unwrap();
        let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(
            texts,
            [
                "고구려는 광개토대왕 때 영토를 넓혔다.",
                "신라는 삼국을 통일했다.",
                "세종대왕은 훈민정음을 창제했다.",
            ]
        );
        let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, [0, 1, 2]);
        assert_eq!(records[2].source, "b.txt");
    }

    #[test]
    fn missing_corpus_dir_is_io_error() {
        let err = read_corpus(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, RagError::Io(_)));
    }

    #[test]
    fn points_need_vectors() {
        let r = RagRecord {
            id: 7,
            text: "x".into(),
            source: "a.txt".into(),
            embedding: None,
        };
        assert!(build_points(&[r]).is_err());
    }
}
