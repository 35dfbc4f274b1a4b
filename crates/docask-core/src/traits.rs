use std::sync::Arc;

use crate::config::RerankerConfig;
use crate::types::{ChunkId, RerankResult, ScoredChunk};

/// Read side of the chunk persistence layer (owned elsewhere).
pub trait ChunkStore: Send + Sync {
    fn fetch_candidates(&self, query: &str, limit: usize) -> anyhow::Result<Vec<ScoredChunk>>;
    fn fetch_by_id(&self, id: &ChunkId) -> anyhow::Result<Option<ScoredChunk>>;
}

/// Best-effort reordering of candidates by query relevance.
///
/// Structurally infallible: a missing endpoint, timeout, bad status, or
/// malformed body all degrade to `applied == false` with the input order
/// preserved. Callers treat the call as one atomic step.
#[async_trait::async_trait]
pub trait Reranker: Send + Sync {
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<ScoredChunk>,
        cfg: &RerankerConfig,
    ) -> RerankResult;
}

/// Process-scoped system-template cache with manual invalidation.
pub trait TemplateSource: Send + Sync {
    /// Return the cached template, reading it on first use.
    fn load(&self) -> anyhow::Result<Arc<str>>;
    /// Drop the cached value so the next `load` re-reads.
    fn invalidate(&self);
}
