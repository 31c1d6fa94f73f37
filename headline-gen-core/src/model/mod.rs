//! Top-level module for the bigram headline model.
//!
//! The pipeline, leaves first:
//! - Tokenization and boundary wrapping (`tokenizer`)
//! - Closed vocabulary with rare-word collapsing (`vocabulary`)
//! - Raw unigram / bigram accumulation (`counts`)
//! - Additive smoothing (`estimator`)
//! - Sampling (`generator`) and perplexity (`evaluator`)
//! - Configuration (`config`) and the trained-model facade (`bigram_model`)

/// Punctuation stripping, whitespace splitting and START/STOP wrapping.
pub mod tokenizer;

/// Vocabulary construction and the two UNKNOWN substitution rules.
pub mod vocabulary;

/// Unigram and bigram occurrence tables.
///
/// Built once from the normalized training corpus, read-only afterwards.
pub mod counts;

/// Internal per-context transition table used by `counts`.
///
/// This module is not exposed publicly.
mod transitions;

/// Additively smoothed bigram probabilities.
pub mod estimator;

/// Categorical sampling of new headlines.
pub mod generator;

/// Per-sequence and corpus-level perplexity.
pub mod evaluator;

/// Smoothing and generation settings with validated setters.
pub mod config;

/// Trained model bundle: training, persistence, novelty-aware generation.
pub mod bigram_model;

/// Atomic text unit after punctuation stripping and whitespace splitting.
///
/// Kept as a plain `String` so other consumers of the vocabulary
/// (e.g. an embedding table keyed by word) can share it.
pub type Token = String;
