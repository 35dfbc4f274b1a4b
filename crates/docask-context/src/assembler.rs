//! Context Assembler: selects a budget-respecting subset of the ranked
//! chunks, deduplicates by product group, and renders labeled source
//! blocks plus a matching source list for display.

use docask_core::config::SelectionConfig;
use docask_core::types::{ChunkId, ElementType, ScoredChunk};

/// Emitted instead of an empty context so the prompt can instruct the model
/// to say the information is unavailable.
pub const NO_CONTEXT_MARKER: &str = "[no grounding context available]";

/// One entry of the user-facing source list, index-aligned with the
/// rendered blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    /// 1-based index, matching the `Source N` label in the rendered block.
    pub index: usize,
    pub chunk_id: ChunkId,
    pub doc_id: String,
    pub label: String,
    pub section: String,
    pub pages: String,
}

#[derive(Debug, Clone)]
pub struct AssembledContext {
    pub rendered: String,
    pub sources: Vec<SourceRef>,
}

impl AssembledContext {
    pub fn is_grounded(&self) -> bool {
        !self.sources.is_empty()
    }
}

/// Walk the ranked list top-down, admitting chunks until `top_k` or the
/// character budget is reached. An overflowing chunk is skipped whole,
/// never truncated. Rendered order preserves rank order.
pub fn assemble(ranked: &[ScoredChunk], cfg: &SelectionConfig) -> AssembledContext {
    let mut rendered = String::new();
    let mut sources: Vec<SourceRef> = Vec::new();
    // (product group, element type, section path) of already-selected chunks.
    let mut selected_groups: Vec<(&str, ElementType, &[String])> = Vec::new();

    for chunk in ranked {
        if sources.len() == cfg.top_k {
            break;
        }
        if let Some(group) = chunk.product_group() {
            let crowded = selected_groups.iter().any(|(g, ty, section)| {
                *g == group
                    && *ty == chunk.element_type
                    && (!cfg.section_diversity || *section == chunk.section_path.as_slice())
            });
            if crowded {
                tracing::debug!(id = %chunk.id, group, "skipping same-group duplicate");
                continue;
            }
        }

        let block = render_block(sources.len() + 1, chunk);
        if rendered.len() + block.len() > cfg.max_context_chars {
            tracing::debug!(id = %chunk.id, "chunk would overflow the context budget");
            continue;
        }

        sources.push(SourceRef {
            index: sources.len() + 1,
            chunk_id: chunk.id.clone(),
            doc_id: chunk.doc_id.clone(),
            label: type_label(chunk).to_string(),
            section: render_section(&chunk.section_path),
            pages: render_pages(chunk),
        });
        if let Some(group) = chunk.product_group() {
            selected_groups.push((group, chunk.element_type, chunk.section_path.as_slice()));
        }
        rendered.push_str(&block);
    }

    if sources.is_empty() {
        rendered = NO_CONTEXT_MARKER.to_string();
    }
    AssembledContext { rendered, sources }
}

fn render_block(index: usize, chunk: &ScoredChunk) -> String {
    let mut block = format!(
        "Source {}: {}\nType: {}\nSection: {}\nPage: {}\n",
        index,
        chunk.doc_id,
        type_label(chunk),
        render_section(&chunk.section_path),
        render_pages(chunk),
    );
    // Content goes in verbatim; tables stay in their textual row form.
    block.push_str(&chunk.content);
    block.push_str("\n---\n");
    block
}

fn type_label(chunk: &ScoredChunk) -> &'static str {
    if chunk.is_nomenclature_table() {
        return "Nomenclature table";
    }
    match chunk.element_type {
        ElementType::Text => "Text",
        ElementType::Table => "Table",
        ElementType::TableWithArticles => "Article table",
        ElementType::Figure => "Figure",
        ElementType::List => "List",
    }
}

fn render_section(section_path: &[String]) -> String {
    if section_path.is_empty() {
        return "(none)".to_string();
    }
    section_path.join(" > ")
}

fn render_pages(chunk: &ScoredChunk) -> String {
    match (chunk.page_number, chunk.page_end) {
        (Some(first), Some(last)) if last > first => format!("{}-{}", first, last),
        (Some(first), _) => first.to_string(),
        (None, _) => "(unknown)".to_string(),
    }
}
