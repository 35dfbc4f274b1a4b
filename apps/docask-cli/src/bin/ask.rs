use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use docask_core::config::{expand_path, RetrievalConfig};
use docask_core::types::ScoredChunk;
use docask_pipeline::RetrievalPipeline;
use docask_rank::SignalHits;
use docask_rerank::HttpReranker;

/// Candidate pools as exported by the retrieval backends: one array per
/// generating signal, each entry a `ScoredChunk`.
#[derive(Debug, Deserialize)]
struct CandidateFile {
    #[serde(default)]
    dense: Vec<ScoredChunk>,
    #[serde(default)]
    lexical: Vec<ScoredChunk>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <query> <candidates.json>", args[0]);
        eprintln!(
            "Example: {} 'mounting torque for pump P-200' ./dev_data/candidates.json",
            args[0]
        );
        std::process::exit(1);
    }
    let query = &args[1];
    let candidates_path: PathBuf = expand_path(&args[2]);

    let config = RetrievalConfig::load()?;
    let raw = fs::read_to_string(&candidates_path)
        .with_context(|| format!("failed to read candidates from {}", candidates_path.display()))?;
    let pools: CandidateFile =
        serde_json::from_str(&raw).context("candidates file is not valid JSON")?;
    if pools.dense.is_empty() && pools.lexical.is_empty() {
        bail!("candidates file contains no dense or lexical hits");
    }

    println!("🔎 docask-ask\n=============");
    println!("Query: {}", query);
    println!(
        "Candidates: {} dense, {} lexical",
        pools.dense.len(),
        pools.lexical.len()
    );

    let signals = vec![
        SignalHits::dense(pools.dense),
        SignalHits::lexical(pools.lexical),
    ];
    let pipeline = RetrievalPipeline::new(HttpReranker::new(), config);
    let prompt = pipeline.run(query, signals).await?;

    if prompt.rerank_applied {
        println!(
            "Reranked with: {}",
            prompt.rerank_model.as_deref().unwrap_or("(unnamed model)")
        );
    } else {
        println!("Reranking skipped or unavailable; merged order kept");
    }

    println!("\n📚 Sources:");
    for s in &prompt.sources {
        println!(
            "  {}. {}  [{}]  {}  p.{}  id={}",
            s.index, s.doc_id, s.label, s.section, s.pages, s.chunk_id
        );
    }

    println!("\n--- User message ---\n{}", prompt.user_message);
    Ok(())
}
