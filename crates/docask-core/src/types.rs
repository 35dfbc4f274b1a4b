//! Domain types shared by every pipeline stage.

use serde::{Deserialize, Serialize};

pub type ChunkId = String;

/// Layout class of a chunk, assigned during ingestion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Text,
    Table,
    TableWithArticles,
    Figure,
    List,
}

impl Default for ElementType {
    fn default() -> Self {
        Self::Text
    }
}

/// Structural annotation attached to a chunk by human annotators or derived
/// from manually drawn page regions. Read-only from the pipeline's side.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Annotation {
    #[serde(default)]
    pub is_nomenclature_table: bool,
    #[serde(default)]
    pub product_group_id: Option<String>,
}

/// A retrieval candidate.
///
/// - `id`: unique chunk identifier within one retrieval batch
/// - `doc_id`: stable identity of the source document
/// - `relevance`: score from the generating signal; scale is
///   signal-dependent but comparable for sorting within one run
/// - `chunk_index`/`section_path`/`page_number`/`page_end`: provenance and
///   display metadata, never mutated by the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub id: ChunkId,
    pub doc_id: String,
    pub content: String,
    pub relevance: f32,
    pub chunk_index: usize,
    #[serde(default)]
    pub section_path: Vec<String>,
    #[serde(default)]
    pub page_number: Option<u32>,
    #[serde(default)]
    pub page_end: Option<u32>,
    #[serde(default)]
    pub element_type: ElementType,
    #[serde(default)]
    pub has_table: bool,
    #[serde(default)]
    pub annotation: Option<Annotation>,
}

impl ScoredChunk {
    pub fn product_group(&self) -> Option<&str> {
        self.annotation
            .as_ref()
            .and_then(|a| a.product_group_id.as_deref())
    }

    pub fn is_nomenclature_table(&self) -> bool {
        self.annotation
            .as_ref()
            .is_some_and(|a| a.is_nomenclature_table)
    }
}

/// Outcome of one reranking attempt.
///
/// `chunks` is always the same multiset as the input. `applied` is true only
/// when the remote call succeeded and produced a usable ordering; otherwise
/// `chunks` is exactly the input order.
#[derive(Debug, Clone)]
pub struct RerankResult {
    pub chunks: Vec<ScoredChunk>,
    pub applied: bool,
    pub model: Option<String>,
}

impl RerankResult {
    /// Identity fallback: input order untouched, nothing applied.
    pub fn fallback(chunks: Vec<ScoredChunk>, model: Option<String>) -> Self {
        Self {
            chunks,
            applied: false,
            model,
        }
    }
}
