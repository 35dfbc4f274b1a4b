use std::io::Write;

use docask_context::{assemble, build_user_message, FileTemplateCache, NO_CONTEXT_MARKER};
use docask_core::config::SelectionConfig;
use docask_core::error::Error;
use docask_core::traits::TemplateSource;
use docask_core::types::{Annotation, ElementType, ScoredChunk};

fn chunk(id: &str, chunk_index: usize, relevance: f32, content: &str) -> ScoredChunk {
    ScoredChunk {
        id: id.to_string(),
        doc_id: "pump-manual.pdf".to_string(),
        content: content.to_string(),
        relevance,
        chunk_index,
        section_path: vec!["Pumps".to_string(), "Installation".to_string()],
        page_number: Some(12),
        page_end: None,
        element_type: ElementType::Text,
        has_table: false,
        annotation: None,
    }
}

fn grouped(
    id: &str,
    chunk_index: usize,
    relevance: f32,
    group: &str,
    element_type: ElementType,
) -> ScoredChunk {
    let mut c = chunk(id, chunk_index, relevance, "SKU table rows");
    c.element_type = element_type;
    c.has_table = element_type != ElementType::Text;
    c.annotation = Some(Annotation {
        is_nomenclature_table: true,
        product_group_id: Some(group.to_string()),
    });
    c
}

fn selected_ids(context: &docask_context::AssembledContext) -> Vec<String> {
    context.sources.iter().map(|s| s.chunk_id.clone()).collect()
}

// --- selection & budget ------------------------------------------------

#[test]
fn rendered_context_never_exceeds_the_budget() {
    let cfg = SelectionConfig {
        top_k: 10,
        max_context_chars: 400,
        section_diversity: false,
    };
    // Each chunk fits alone; the sum does not.
    let ranked: Vec<ScoredChunk> = (0..10)
        .map(|i| chunk(&format!("c{}", i), i, 1.0 - i as f32 * 0.05, &"x".repeat(120)))
        .collect();

    let context = assemble(&ranked, &cfg);

    assert!(
        context.rendered.len() <= cfg.max_context_chars,
        "rendered {} chars for a {} char budget",
        context.rendered.len(),
        cfg.max_context_chars
    );
    assert!(context.is_grounded(), "something must fit a 400 char budget");
}

#[test]
fn overflowing_chunk_is_skipped_not_truncated() {
    let cfg = SelectionConfig {
        top_k: 10,
        max_context_chars: 300,
        section_diversity: false,
    };
    let oversized = chunk("big", 0, 0.99, &"y".repeat(5_000));
    let small = chunk("small", 1, 0.5, "short answer text");

    let context = assemble(&[oversized, small], &cfg);

    assert_eq!(selected_ids(&context), vec!["small"], "walk continues past the overflow");
    assert!(
        !context.rendered.contains("yyy"),
        "no partial inclusion of the oversized chunk"
    );
    assert!(context.rendered.contains("short answer text"));
}

#[test]
fn top_k_caps_the_selection() {
    let cfg = SelectionConfig {
        top_k: 2,
        max_context_chars: 100_000,
        section_diversity: false,
    };
    let ranked: Vec<ScoredChunk> = (0..5)
        .map(|i| chunk(&format!("c{}", i), i, 1.0 - i as f32 * 0.1, "text"))
        .collect();

    let context = assemble(&ranked, &cfg);
    assert_eq!(selected_ids(&context), vec!["c0", "c1"]);
}

#[test]
fn selection_preserves_rank_order_and_numbers_sources_from_one() {
    let cfg = SelectionConfig::default();
    let ranked = vec![
        chunk("first", 3, 0.9, "alpha"),
        chunk("second", 1, 0.8, "bravo"),
        chunk("third", 2, 0.7, "charlie"),
    ];

    let context = assemble(&ranked, &cfg);

    assert_eq!(selected_ids(&context), vec!["first", "second", "third"]);
    let indices: Vec<usize> = context.sources.iter().map(|s| s.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
    let alpha = context.rendered.find("alpha").expect("alpha rendered");
    let bravo = context.rendered.find("bravo").expect("bravo rendered");
    let charlie = context.rendered.find("charlie").expect("charlie rendered");
    assert!(alpha < bravo && bravo < charlie, "rendered order = rank order");
}

// --- deduplication / diversity -----------------------------------------

#[test]
fn same_group_same_type_keeps_only_the_higher_ranked_chunk() {
    let cfg = SelectionConfig::default();
    let ranked = vec![
        grouped("a", 0, 0.9, "pg-7", ElementType::TableWithArticles),
        grouped("b", 1, 0.8, "pg-7", ElementType::TableWithArticles),
        grouped("c", 2, 0.7, "pg-9", ElementType::TableWithArticles),
    ];

    let context = assemble(&ranked, &cfg);
    assert_eq!(
        selected_ids(&context),
        vec!["a", "c"],
        "one nomenclature table per product group"
    );
}

#[test]
fn same_group_different_type_is_not_a_duplicate() {
    let cfg = SelectionConfig::default();
    let ranked = vec![
        grouped("table", 0, 0.9, "pg-7", ElementType::Table),
        grouped("figure", 1, 0.8, "pg-7", ElementType::Figure),
    ];

    let context = assemble(&ranked, &cfg);
    assert_eq!(selected_ids(&context), vec!["table", "figure"]);
}

#[test]
fn section_diversity_admits_duplicates_from_other_sections() {
    let cfg = SelectionConfig {
        section_diversity: true,
        ..SelectionConfig::default()
    };
    let same_section = grouped("a", 0, 0.9, "pg-7", ElementType::Table);
    let mut other_section = grouped("b", 1, 0.8, "pg-7", ElementType::Table);
    other_section.section_path = vec!["Pumps".to_string(), "Spare parts".to_string()];
    let mut shadowed = grouped("c", 2, 0.7, "pg-7", ElementType::Table);
    shadowed.section_path = same_section.section_path.clone();

    let context = assemble(&[same_section, other_section, shadowed], &cfg);
    assert_eq!(
        selected_ids(&context),
        vec!["a", "b"],
        "distinct section survives, same section is still crowded out"
    );
}

// --- rendering ---------------------------------------------------------

#[test]
fn blocks_carry_label_section_and_page_range() {
    let cfg = SelectionConfig::default();
    let mut table = grouped("t", 0, 0.9, "pg-7", ElementType::TableWithArticles);
    table.page_number = Some(12);
    table.page_end = Some(14);

    let context = assemble(&[table], &cfg);

    assert!(context.rendered.contains("Source 1: pump-manual.pdf"));
    assert!(
        context.rendered.contains("Type: Nomenclature table"),
        "annotation overrides the element type label"
    );
    assert!(context.rendered.contains("Section: Pumps > Installation"));
    assert!(context.rendered.contains("Page: 12-14"));

    let source = &context.sources[0];
    assert_eq!(source.label, "Nomenclature table");
    assert_eq!(source.pages, "12-14");
    assert_eq!(source.section, "Pumps > Installation");
}

#[test]
fn zero_selected_chunks_produce_the_marker() {
    let context = assemble(&[], &SelectionConfig::default());
    assert!(!context.is_grounded());
    assert_eq!(context.rendered, NO_CONTEXT_MARKER);
    assert!(context.sources.is_empty());
}

// --- prompt builder ----------------------------------------------------

#[test]
fn build_user_message_is_byte_stable_and_verbatim() {
    let context = assemble(
        &[chunk("a", 0, 0.9, "The torque is 4 Nm.")],
        &SelectionConfig::default(),
    );
    let query = "What torque should I use?";

    let first = build_user_message(&context, query).expect("build");
    let second = build_user_message(&context, query).expect("build");

    assert_eq!(first, second, "snapshot stability");
    assert!(first.contains(query), "literal query appears verbatim");
    assert!(
        first.contains(&context.rendered),
        "context appears verbatim and unaltered"
    );
    let context_at = first.find("The torque is 4 Nm.").expect("context present");
    let query_at = first.find(query).expect("query present");
    assert!(context_at < query_at, "context block comes first");
}

#[test]
fn no_grounding_marker_reaches_the_message() {
    let context = assemble(&[], &SelectionConfig::default());
    let message = build_user_message(&context, "Anything?").expect("build");
    assert!(
        message.contains(NO_CONTEXT_MARKER),
        "model must be told there is no grounding, not given an empty block"
    );
}

#[test]
fn whitespace_query_is_rejected() {
    let context = assemble(&[], &SelectionConfig::default());
    let err = build_user_message(&context, "   \n\t").expect_err("empty query is a contract breach");
    assert!(matches!(err, Error::EmptyQuery));
}

// --- template cache ----------------------------------------------------

#[test]
fn template_cache_serves_cached_value_until_invalidated() {
    let mut file = tempfile::NamedTempFile::new().expect("temp template");
    write!(file, "You answer from provided sources only.").expect("write template");

    let cache = FileTemplateCache::new(file.path());
    let first = cache.load().expect("initial load");
    assert_eq!(&*first, "You answer from provided sources only.");

    // Edit on disk; the cache must keep serving the old value.
    std::fs::write(file.path(), "Updated policy.").expect("rewrite template");
    let cached = cache.load().expect("cached load");
    assert_eq!(&*cached, "You answer from provided sources only.");

    cache.invalidate();
    let reloaded = cache.load().expect("reload after invalidate");
    assert_eq!(&*reloaded, "Updated policy.");
}

#[test]
fn template_cache_reports_missing_files() {
    let cache = FileTemplateCache::new("/nonexistent/docask/system.txt");
    assert!(cache.load().is_err(), "missing template is a loud error");
}
