//! Bigram language model for short headline text.
//!
//! This crate provides the whole headline modelling pipeline:
//! - Punctuation stripping tokenizer with sentence boundary markers
//! - Closed vocabulary construction with rare-word collapsing
//! - Unigram / bigram counting and additive (Laplace-family) smoothing
//! - Stochastic headline generation and perplexity evaluation
//!
//! The high-level entry point is [`model::bigram_model::BigramModel`].
//! Low-level file helpers are kept internal.

/// Error type shared by every stage of the pipeline.
pub mod error;

/// Core bigram model components and the `BigramModel` facade.
///
/// Every stage is exposed so callers (and the external embedding-based
/// collaborator) can reuse the same tokenization and vocabulary conventions.
pub mod model;

/// I/O utilities (corpus loading, path helpers).
///
/// Not exposed, except the corpus reader below.
pub(crate) mod io;

pub use error::{ModelError, Result};
pub use io::read_lines;
