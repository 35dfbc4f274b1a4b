use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Reranker invocation settings. A missing `url` or `model` disables
/// reranking regardless of `enabled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankerConfig {
    pub enabled: bool,
    pub url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: u64,
    /// Upper bound on the text sent per document. A payload bound only;
    /// stored chunk content is never truncated.
    pub max_document_chars: usize,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: None,
            model: None,
            timeout_secs: 10,
            max_document_chars: 2000,
        }
    }
}

impl RerankerConfig {
    /// True when every precondition for a remote call holds.
    pub fn ready(&self) -> bool {
        self.enabled && self.url.is_some() && self.model.is_some()
    }
}

/// How per-signal relevances for the same chunk id are combined.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreAggregation {
    /// Keep the best per-signal score.
    Max,
    /// Sum of signal weight times relevance.
    WeightedSum,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub aggregation: ScoreAggregation,
    /// Min-max normalize each signal before aggregation. Signals may arrive
    /// on unnormalized scales (raw BM25 vs cosine similarity).
    pub normalize: bool,
    pub dense_weight: f32,
    pub lexical_weight: f32,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            aggregation: ScoreAggregation::Max,
            normalize: false,
            dense_weight: 0.7,
            lexical_weight: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Maximum number of chunks admitted into the context.
    pub top_k: usize,
    /// Character budget for the rendered context block.
    pub max_context_chars: usize,
    /// Keep a same-group, same-type duplicate when it comes from a
    /// different section.
    pub section_diversity: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            top_k: 8,
            max_context_chars: 12_000,
            section_diversity: false,
        }
    }
}

/// Immutable configuration for one retrieval invocation. Read-only for
/// every stage of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub reranker: RerankerConfig,
    pub merge: MergeConfig,
    pub selection: SelectionConfig,
}

impl RetrievalConfig {
    /// Load the layered configuration: `docask.toml`, then the
    /// `RUST_ENV`-specific overlay, then `DOCASK_*` env vars (nested keys
    /// separated by `__`, e.g. `DOCASK_RERANKER__MODEL`).
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("docask.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("docask.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("docask.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("docask.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("DOCASK_").split("__"));

        Self::from_figment(&figment)
    }

    /// Extract and validate from an already-assembled Figment. Split out of
    /// [`RetrievalConfig::load`] so tests can feed in-memory providers.
    pub fn from_figment(figment: &Figment) -> anyhow::Result<Self> {
        let config: Self = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read retrieval config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.reranker.timeout_secs == 0 {
            return Err(Error::InvalidConfig(
                "reranker.timeout_secs must be at least 1".into(),
            ));
        }
        if self.reranker.max_document_chars == 0 {
            return Err(Error::InvalidConfig(
                "reranker.max_document_chars must be at least 1".into(),
            ));
        }
        for (name, w) in [
            ("merge.dense_weight", self.merge.dense_weight),
            ("merge.lexical_weight", self.merge.lexical_weight),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be a non-negative finite number, got {}",
                    name, w
                )));
            }
        }
        if self.merge.aggregation == ScoreAggregation::WeightedSum
            && self.merge.dense_weight == 0.0
            && self.merge.lexical_weight == 0.0
        {
            return Err(Error::InvalidConfig(
                "weighted_sum aggregation needs at least one non-zero signal weight".into(),
            ));
        }
        if self.selection.top_k == 0 {
            return Err(Error::InvalidConfig(
                "selection.top_k must be at least 1".into(),
            ));
        }
        if self.selection.max_context_chars == 0 {
            return Err(Error::InvalidConfig(
                "selection.max_context_chars must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}
