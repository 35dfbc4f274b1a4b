//! docask-rerank
//!
//! Best-effort remote reranking over HTTP with identity fallback: whatever
//! goes wrong on the wire, the caller gets the candidate multiset back,
//! reordered when possible and untouched otherwise.

pub mod client;
pub mod wire;

pub use client::{reorder, HttpReranker, RerankFailure};
