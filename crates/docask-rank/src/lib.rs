//! Scorer/Merger: folds per-signal candidate pools into one deduplicated,
//! comparably-scored ranking.
//!
//! Candidates may arrive from more than one generating signal (dense
//! similarity and lexical overlap). Chunks sharing an id are combined by
//! the configured aggregation; the output keeps exactly one entry per id,
//! sorted by merged relevance descending with deterministic tie-breaking.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use docask_core::config::{MergeConfig, ScoreAggregation};
use docask_core::error::{Error, Result};
use docask_core::types::{ChunkId, ScoredChunk};

/// Which engine produced a candidate pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Dense,
    Lexical,
}

/// One generating signal's candidate pool. Each hit carries that signal's
/// own `relevance`; pools may overlap in chunk ids.
#[derive(Debug, Clone)]
pub struct SignalHits {
    pub kind: SignalKind,
    pub hits: Vec<ScoredChunk>,
}

impl SignalHits {
    pub fn dense(hits: Vec<ScoredChunk>) -> Self {
        Self {
            kind: SignalKind::Dense,
            hits,
        }
    }

    pub fn lexical(hits: Vec<ScoredChunk>) -> Self {
        Self {
            kind: SignalKind::Lexical,
            hits,
        }
    }
}

/// Merge signal pools into a single ranking.
///
/// Sorted by merged relevance descending; ties broken by lower
/// `chunk_index`, then id, so the order is reproducible for identical
/// inputs. Empty input yields an empty ranking, not an error. Two hits
/// sharing an id but carrying different content indicate an upstream
/// contract breach and fail the whole merge.
pub fn merge(signals: Vec<SignalHits>, cfg: &MergeConfig) -> Result<Vec<ScoredChunk>> {
    let mut merged: HashMap<ChunkId, ScoredChunk> = HashMap::new();

    for signal in signals {
        let weight = signal_weight(signal.kind, cfg);
        let mut hits = signal.hits;
        if cfg.normalize {
            normalize_in_place(&mut hits);
        }
        for mut hit in hits {
            let contribution = match cfg.aggregation {
                ScoreAggregation::Max => hit.relevance,
                ScoreAggregation::WeightedSum => weight * hit.relevance,
            };
            match merged.entry(hit.id.clone()) {
                Entry::Occupied(mut entry) => {
                    let existing = entry.get_mut();
                    if existing.content != hit.content {
                        tracing::error!(id = %hit.id, "distinct chunks share one id");
                        return Err(Error::ChunkIdCollision(hit.id));
                    }
                    existing.relevance = match cfg.aggregation {
                        ScoreAggregation::Max => existing.relevance.max(contribution),
                        ScoreAggregation::WeightedSum => existing.relevance + contribution,
                    };
                }
                Entry::Vacant(entry) => {
                    hit.relevance = contribution;
                    entry.insert(hit);
                }
            }
        }
    }

    let mut ranked: Vec<ScoredChunk> = merged.into_values().collect();
    ranked.sort_by(|a, b| {
        b.relevance
            .total_cmp(&a.relevance)
            .then_with(|| a.chunk_index.cmp(&b.chunk_index))
            .then_with(|| a.id.cmp(&b.id))
    });
    tracing::debug!(candidates = ranked.len(), "merged signal pools");
    Ok(ranked)
}

fn signal_weight(kind: SignalKind, cfg: &MergeConfig) -> f32 {
    match kind {
        SignalKind::Dense => cfg.dense_weight,
        SignalKind::Lexical => cfg.lexical_weight,
    }
}

/// Min-max rescale one signal's scores into [0, 1]. A constant pool maps to
/// 1.0: every hit is equally the signal's best evidence.
fn normalize_in_place(hits: &mut [ScoredChunk]) {
    let Some(first) = hits.first() else {
        return;
    };
    let mut lo = first.relevance;
    let mut hi = first.relevance;
    for hit in hits.iter() {
        lo = lo.min(hit.relevance);
        hi = hi.max(hit.relevance);
    }
    let span = hi - lo;
    for hit in hits.iter_mut() {
        hit.relevance = if span > 0.0 {
            (hit.relevance - lo) / span
        } else {
            1.0
        };
    }
}
