use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Smoothing and vocabulary settings of a bigram model.
///
/// # Invariants
/// - `alpha` is finite and strictly positive, so every smoothed
///   probability is strictly positive
///
/// Fields are private; values are only accepted through validating
/// constructors and setters, before any counting starts.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ModelConfig {
	/// Additive smoothing constant.
	alpha: f64,

	/// Tokens seen at most this many times in training collapse into UNKNOWN.
	min_freq: usize,
}

impl Default for ModelConfig {
	fn default() -> Self {
		Self { alpha: 1.0, min_freq: 1 }
	}
}

impl ModelConfig {
	/// Creates a validated configuration.
	///
	/// # Errors
	/// Returns `InvalidConfiguration` if `alpha` is not a finite value > 0.
	pub fn new(alpha: f64, min_freq: usize) -> Result<Self> {
		let mut config = Self { min_freq, ..Self::default() };
		config.set_alpha(alpha)?;
		Ok(config)
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn min_freq(&self) -> usize {
		self.min_freq
	}

	/// Sets the smoothing constant.
	///
	/// # Errors
	/// Returns `InvalidConfiguration` if `alpha` is not a finite value > 0.
	pub fn set_alpha(&mut self, alpha: f64) -> Result<()> {
		if !alpha.is_finite() || alpha <= 0.0 {
			return Err(ModelError::InvalidConfiguration(format!(
				"alpha must be a finite value > 0, got {alpha}"
			)));
		}
		self.alpha = alpha;
		Ok(())
	}
}

/// Settings of one generation request.
///
/// - `max_tokens`: optional cap on generated words; `None` lets the chain
///   run until STOP is drawn
/// - `nb_try`: number of extra attempts when the generated headline already
///   exists in the training corpus (0 = accept the first one)
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct GenerationConfig {
	max_tokens: Option<usize>,
	pub nb_try: usize,
}

impl GenerationConfig {
	pub fn max_tokens(&self) -> Option<usize> {
		self.max_tokens
	}

	/// Sets the word cap.
	///
	/// # Errors
	/// Returns `InvalidConfiguration` for `Some(0)`.
	pub fn set_max_tokens(&mut self, max_tokens: Option<usize>) -> Result<()> {
		if max_tokens == Some(0) {
			return Err(ModelError::InvalidConfiguration(
				"max_tokens must be at least 1".to_owned(),
			));
		}
		self.max_tokens = max_tokens;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_non_positive_alpha() {
		assert!(ModelConfig::new(0.0, 1).is_err());
		assert!(ModelConfig::new(-0.5, 1).is_err());
		assert!(ModelConfig::new(f64::NAN, 1).is_err());
		assert!(ModelConfig::new(f64::INFINITY, 1).is_err());
	}

	#[test]
	fn failed_setter_keeps_previous_value() {
		let mut config = ModelConfig::new(0.5, 2).unwrap();
		assert!(matches!(config.set_alpha(0.0), Err(ModelError::InvalidConfiguration(_))));
		assert_eq!(config.alpha(), 0.5);
		assert_eq!(config.min_freq(), 2);
	}

	#[test]
	fn zero_max_tokens_is_rejected() {
		let mut config = GenerationConfig::default();
		assert!(config.set_max_tokens(Some(0)).is_err());
		config.set_max_tokens(Some(20)).unwrap();
		assert_eq!(config.max_tokens(), Some(20));
	}
}
