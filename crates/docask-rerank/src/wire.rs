//! Wire format for the reranker endpoint.
//!
//! Request: `POST <url>` with `{model, query, documents: [{id, text}]}`.
//! Two response shapes are accepted for forward/backward compatibility and
//! resolved exactly once into an id → score map:
//!
//! - `{results: [{id, score}]}`: keyed by chunk id, order-independent
//! - `{scores: [..]}`: positional, aligned with the request document order

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::client::RerankFailure;
use docask_core::types::ChunkId;

#[derive(Debug, Serialize)]
pub struct RerankRequest<'a> {
    pub model: &'a str,
    pub query: &'a str,
    pub documents: Vec<WireDocument>,
}

#[derive(Debug, Serialize)]
pub struct WireDocument {
    pub id: ChunkId,
    pub text: String,
}

/// Bound the text sent per document. A payload safety bound only; stored
/// chunk content is never truncated.
pub fn bounded_text(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => content[..cut].to_string(),
        None => content.to_string(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RerankResponse {
    Keyed { results: Vec<KeyedScore> },
    Positional { scores: Vec<f64> },
}

#[derive(Debug, Deserialize)]
pub struct KeyedScore {
    pub id: ChunkId,
    pub score: f64,
}

impl RerankResponse {
    /// Collapse either shape into one map. The only point in the client
    /// where the response shape matters.
    pub fn resolve(
        self,
        request_order: &[ChunkId],
    ) -> Result<HashMap<ChunkId, f64>, RerankFailure> {
        match self {
            Self::Keyed { results } => {
                Ok(results.into_iter().map(|r| (r.id, r.score)).collect())
            }
            Self::Positional { scores } => {
                if scores.len() != request_order.len() {
                    return Err(RerankFailure::Malformed(format!(
                        "positional response carries {} scores for {} documents",
                        scores.len(),
                        request_order.len()
                    )));
                }
                Ok(request_order.iter().cloned().zip(scores).collect())
            }
        }
    }
}
