// Operational probe for the reranker endpoint: runs the client once over a
// candidates file and reports whether the remote ordering was applied.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use docask_core::config::{expand_path, RetrievalConfig};
use docask_core::traits::Reranker;
use docask_core::types::ScoredChunk;
use docask_rank::{merge, SignalHits};
use docask_rerank::HttpReranker;

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
        std::process::exit(1);
    }
    let query = &args[1];
    let candidates_path: PathBuf = expand_path(&args[2]);

    let config = RetrievalConfig::load()?;
    if !config.reranker.ready() {
        println!(
            "⚠️  Reranker not configured (enabled={}, url set={}, model set={}); the probe will show the fallback path.",
            config.reranker.enabled,
            config.reranker.url.is_some(),
            config.reranker.model.is_some()
        );
    }

    let raw = fs::read_to_string(&candidates_path)
        .with_context(|| format!("failed to read candidates from {}", candidates_path.display()))?;
    let pools: CandidateFile =
        serde_json::from_str(&raw).context("candidates file is not valid JSON")?;
    if pools.dense.is_empty() && pools.lexical.is_empty() {
        bail!("candidates file contains no dense or lexical hits");
    }

    let merged = merge(
        vec![
            SignalHits::dense(pools.dense),
            SignalHits::lexical(pools.lexical),
        ],
        &config.merge,
    )?;
    let before: Vec<String> = merged.iter().map(|c| c.id.clone()).collect();

    let result = HttpReranker::new()
        .rerank(query, merged, &config.reranker)
        .await;

    println!("Applied: {}", result.applied);
    println!("Model: {}", result.model.as_deref().unwrap_or("(none)"));
    println!("Before: {:?}", before);
    println!(
        "After:  {:?}",
        result.chunks.iter().map(|c| c.id.as_str()).collect::<Vec<_>>()
    );
    Ok(())
}
