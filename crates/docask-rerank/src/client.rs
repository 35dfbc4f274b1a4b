use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

use docask_core::config::RerankerConfig;
use docask_core::traits::Reranker;
use docask_core::types::{ChunkId, RerankResult, ScoredChunk};

use crate::wire::{bounded_text, RerankRequest, RerankResponse, WireDocument};

/// Why a rerank attempt fell back. Internal taxonomy; never crosses the
/// [`Reranker`] boundary.
#[derive(Debug, Error)]
pub enum RerankFailure {
    #[error("reranker endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("reranker returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("reranker response malformed: {0}")]
    Malformed(String),
}

/// Reranker client for the remote cross-encoder endpoint.
pub struct HttpReranker {
    http: reqwest::Client,
}

impl HttpReranker {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    async fn call(
        &self,
        url: &str,
        model: &str,
        query: &str,
        candidates: &[ScoredChunk],
        cfg: &RerankerConfig,
    ) -> Result<HashMap<ChunkId, f64>, RerankFailure> {
        let documents: Vec<WireDocument> = candidates
            .iter()
            .map(|c| WireDocument {
                id: c.id.clone(),
                text: bounded_text(&c.content, cfg.max_document_chars),
            })
            .collect();
        let request_order: Vec<ChunkId> = documents.iter().map(|d| d.id.clone()).collect();

        let response = self
            .http
            .post(url)
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .json(&RerankRequest {
                model,
                query,
                documents,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RerankFailure::Status(response.status()));
        }
        let parsed: RerankResponse = response
            .json()
            .await
            .map_err(|e| RerankFailure::Malformed(e.to_string()))?;
        parsed.resolve(&request_order)
    }
}

impl Default for HttpReranker {
    fn default() -> Self {
        Self::new()
    }
}

/// Sort the candidate multiset by resolved score descending. A candidate
/// whose id got no score keeps its original `relevance` as its sort key, so
/// a single missing score cannot invalidate the batch. Nothing is added or
/// dropped.
pub fn reorder(candidates: Vec<ScoredChunk>, scores: &HashMap<ChunkId, f64>) -> Vec<ScoredChunk> {
    let mut reordered = candidates;
    reordered.sort_by(|a, b| {
        let ka = scores.get(&a.id).copied().unwrap_or(f64::from(a.relevance));
        let kb = scores.get(&b.id).copied().unwrap_or(f64::from(b.relevance));
        kb.total_cmp(&ka)
            .then_with(|| a.chunk_index.cmp(&b.chunk_index))
    });
    reordered
}

#[async_trait::async_trait]
impl Reranker for HttpReranker {
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<ScoredChunk>,
        cfg: &RerankerConfig,
    ) -> RerankResult {
        if !cfg.enabled || candidates.is_empty() {
            return RerankResult::fallback(candidates, cfg.model.clone());
        }
        let (Some(url), Some(model)) = (cfg.url.as_deref(), cfg.model.as_deref()) else {
            return RerankResult::fallback(candidates, cfg.model.clone());
        };

        match self.call(url, model, query, &candidates, cfg).await {
            Ok(scores) => {
                tracing::debug!(
                    scored = scores.len(),
                    candidates = candidates.len(),
                    model,
                    "reranker scores resolved"
                );
                RerankResult {
                    chunks: reorder(candidates, &scores),
                    applied: true,
                    model: cfg.model.clone(),
                }
            }
            Err(failure) => {
                tracing::warn!(error = %failure, model, "reranker unavailable, keeping original order");
                RerankResult::fallback(candidates, cfg.model.clone())
            }
        }
    }
}
