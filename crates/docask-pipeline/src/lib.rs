//! Composed retrieval pipeline: merge → rerank → assemble → build.
//!
//! One query triggers one sequential run; stage order is fixed and only the
//! rerank stage suspends. Each stage receives and returns new sequences, so
//! a later failure cannot corrupt state visible to an earlier one, and
//! concurrent runs share nothing mutable.

use docask_context::{assemble, build_user_message, SourceRef};
use docask_core::config::RetrievalConfig;
use docask_core::error::Result;
use docask_core::traits::{ChunkStore, Reranker};
use docask_rank::{merge, SignalHits};

/// Everything the language-model layer needs from one run.
#[derive(Debug, Clone)]
pub struct PreparedPrompt {
    pub user_message: String,
    pub sources: Vec<SourceRef>,
    pub rerank_applied: bool,
    pub rerank_model: Option<String>,
}

pub struct RetrievalPipeline<R: Reranker> {
    reranker: R,
    config: RetrievalConfig,
}

impl<R: Reranker> RetrievalPipeline<R> {
    pub fn new(reranker: R, config: RetrievalConfig) -> Self {
        Self { reranker, config }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Run the full pipeline for one query over the given signal pools.
    pub async fn run(&self, query: &str, signals: Vec<SignalHits>) -> Result<PreparedPrompt> {
        let ranked = merge(signals, &self.config.merge)?;
        let reranked = self
            .reranker
            .rerank(query, ranked, &self.config.reranker)
            .await;
        let context = assemble(&reranked.chunks, &self.config.selection);
        let user_message = build_user_message(&context, query)?;
        tracing::debug!(
            selected = context.sources.len(),
            rerank_applied = reranked.applied,
            "pipeline run complete"
        );
        Ok(PreparedPrompt {
            user_message,
            sources: context.sources,
            rerank_applied: reranked.applied,
            rerank_model: reranked.model,
        })
    }

    /// Entry point for callers sitting directly on a chunk store: fetch one
    /// pre-blended candidate pool and run it as a single dense signal.
    pub async fn run_from_store(
        &self,
        store: &dyn ChunkStore,
        query: &str,
        limit: usize,
    ) -> anyhow::Result<PreparedPrompt> {
        let candidates = store.fetch_candidates(query, limit)?;
        let prompt = self
            .run(query, vec![SignalHits::dense(candidates)])
            .await?;
        Ok(prompt)
    }
}
