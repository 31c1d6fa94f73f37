use thiserror::Error;

/// Errors raised while configuring, training, persisting or evaluating a model.
///
/// Probability estimation itself is total once an estimator exists:
/// an unseen context is not an error, it falls back to the smoothing term.
#[derive(Error, Debug)]
pub enum ModelError {
	/// The training corpus (or a held-out set) has no sequence at all.
	#[error("Empty corpus: {0}")]
	EmptyCorpus(&'static str),

	/// The vocabulary backing an estimator has no token.
	#[error("Empty vocabulary: cannot estimate probabilities over zero tokens")]
	EmptyVocabulary,

	/// A configuration value was rejected before any counting started.
	#[error("Invalid configuration: {0}")]
	InvalidConfiguration(String),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Serialization error: {0}")]
	Serialization(#[from] postcard::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
