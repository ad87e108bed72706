//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! All Qdrant interactions sit behind this minimal API so the rest of the crate
//! never touches the builder types directly.

use std::collections::HashMap;

use qdrant_client::Qdrant;
use futures::future::BoxFuture;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, DeleteCollectionBuilder, Distance, PointId,
    PointStruct, ScrollPointsBuilder, SearchParamsBuilder, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QValue, VectorParamsBuilder, point_id::PointIdOptions,
};
use tracing::{debug, info, warn};

use crate::config::{DistanceKind, RagConfig, VectorSpace};
use crate::errors::RagError;
use crate::ingest::CollectionWriter;
use crate::record::StoredDocument;

/// Points fetched per scroll request.
const SCROLL_PAGE: u32 = 256;

/// A facade over the Qdrant client bound to one collection.
pub struct QdrantFacade {
    client: Qdrant,
    collection: String,
    distance: DistanceKind,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
            distance: cfg.distance,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Returns whether the target collection exists.
    pub async fn collection_exists(&self) -> Result<bool, RagError> {
        self.client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))
    }

    /// Creates the collection with the given vector space.
    pub async fn create_collection(&self, space: &VectorSpace) -> Result<(), RagError> {
        let distance = match space.distance {
            DistanceKind::Cosine => Distance::Cosine,
            DistanceKind::Dot => Distance::Dot,
            DistanceKind::Euclid => Distance::Euclid,
        };

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(space.size as u64, distance)),
            )
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        info!(
            collection = %self.collection,
            size = space.size,
            distance = ?self.distance,
            "collection created"
        );
        Ok(())
    }

    /// Drops the collection with all of its points.
    pub async fn delete_collection(&self) -> Result<(), RagError> {
        self.client
            .delete_collection(DeleteCollectionBuilder::new(&self.collection))
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        warn!(collection = %self.collection, "collection deleted");
        Ok(())
    }

    /// Exact number of points in the collection.
    pub async fn count_points(&self) -> Result<u64, RagError> {
        let res = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        Ok(res.result.map(|r| r.count).unwrap_or(0))
    }

    /// Every stored document in id order, paging through the collection.
    pub async fn scroll_documents(&self) -> Result<Vec<StoredDocument>, RagError> {
        let mut out = Vec::new();
        let mut offset: Option<PointId> = None;
        loop {
            let mut builder = ScrollPointsBuilder::new(&self.collection)
                .limit(SCROLL_PAGE)
                .with_payload(true)
                .with_vectors(false);
            if let Some(id) = offset.take() {
                builder = builder.offset(id);
            }

            let res = self
                .client
                .scroll(builder)
                .await
                .map_err(|e| RagError::Qdrant(e.to_string()))?;

            for point in res.result {
                let id = match point.id.and_then(|p| p.point_id_options) {
                    Some(PointIdOptions::Num(n)) => n.to_string(),
                    Some(PointIdOptions::Uuid(u)) => u,
                    None => continue,
                };
                let payload = qpayload_to_json(point.payload);
                let Some(text) = payload.get("text").and_then(|v| v.as_str()) else {
                    continue;
                };
                out.push(StoredDocument {
                    id,
                    document: text.to_string(),
                    source: payload
                        .get("source")
                        .and_then(|v| v.as_str())
                        .map(str::to_string),
                });
            }

            match res.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }
        debug!(collection = %self.collection, documents = out.len(), "scroll finished");
        Ok(out)
    }

    /// Upserts a batch of points and waits for them to be indexed.
    ///
    /// Returns the number of points sent.
    pub async fn upsert_points(&self, points: Vec<PointStruct>) -> Result<u64, RagError> {
        if points.is_empty() {
            debug!("no points provided for upsert");
            return Ok(0);
        }
        let n = points.len() as u64;

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        debug!(collection = %self.collection, points = n, "upsert acknowledged");
        Ok(n)
    }

    /// Performs a similarity search and returns `(score, payload)` tuples, best first.
    pub async fn search(
        &self,
        vector: Vec<f32>,
        top_k: u64,
        exact: bool,
    ) -> Result<Vec<(f32, serde_json::Value)>, RagError> {
        debug!(collection = %self.collection, top_k, exact, "search");

        let mut builder =
            SearchPointsBuilder::new(&self.collection, vector, top_k).with_payload(true);
        if exact {
            builder = builder.params(SearchParamsBuilder::default().exact(true));
        }

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        Ok(res
            .result
            .into_iter()
            .map(|r| (r.score, qpayload_to_json(r.payload)))
            .collect())
    }
}

impl CollectionWriter for QdrantFacade {
    fn collection(&self) -> &str {
        &self.collection
    }

    fn collection_exists(&self) -> BoxFuture<'_, Result<bool, RagError>> {
        Box::pin(QdrantFacade::collection_exists(self))
    }

    fn count_points(&self) -> BoxFuture<'_, Result<u64, RagError>> {
        Box::pin(QdrantFacade::count_points(self))
    }

    fn create_collection<'a>(
        &'a self,
        space: &'a VectorSpace,
    ) -> BoxFuture<'a, Result<(), RagError>> {
        Box::pin(QdrantFacade::create_collection(self, space))
    }

    fn upsert_points(&self, points: Vec<PointStruct>) -> BoxFuture<'_, Result<u64, RagError>> {
        Box::pin(QdrantFacade::upsert_points(self, points))
    }

    fn delete_collection(&self) -> BoxFuture<'_, Result<(), RagError>> {
        Box::pin(QdrantFacade::delete_collection(self))
    }
}

/// Converts a Qdrant payload into JSON.
///
/// Nested objects/arrays are mapped to `Null`; the corpus payload is flat.
fn qpayload_to_json(p: HashMap<String, QValue>) -> serde_json::Value {
    use qdrant_client::qdrant::value::Kind as K;
    let mut m = serde_json::Map::new();
    for (k, v) in p {
        let j = match v.kind {
            Some(K::StringValue(s)) => serde_json::Value::String(s),
            Some(K::IntegerValue(i)) => serde_json::Value::Number(i.into()),
            Some(K::DoubleValue(f)) => serde_json::json!(f),
            Some(K::BoolValue(b)) => serde_json::Value::Bool(b),
            _ => serde_json::Value::Null,
        };
        m.insert(k, j);
    }
    serde_json::Value::Object(m)
}
