use super::counts::CountModel;
use super::vocabulary::Vocabulary;
use crate::error::{ModelError, Result};

/// Additively smoothed bigram estimator.
///
/// ```text
/// P(target | context) = (C(context, target) + alpha) / (C(context) + |V| * alpha)
/// ```
///
/// Borrows the trained vocabulary and counts; it holds no state of its own
/// and can be shared freely between threads.
#[derive(Clone, Copy, Debug)]
pub struct Estimator<'a> {
	vocabulary: &'a Vocabulary,
	counts: &'a CountModel,
	alpha: f64,
	/// `|V| * alpha`, constant for the lifetime of the estimator.
	mass: f64,
}

impl<'a> Estimator<'a> {
	/// Creates an estimator over a trained vocabulary and its counts.
	///
	/// # Errors
	/// - `EmptyVocabulary` if the vocabulary has no token
	/// - `InvalidConfiguration` if `alpha` is not a finite value > 0
	pub fn new(vocabulary: &'a Vocabulary, counts: &'a CountModel, alpha: f64) -> Result<Self> {
		if vocabulary.is_empty() {
			return Err(ModelError::EmptyVocabulary);
		}
		if !alpha.is_finite() || alpha <= 0.0 {
			return Err(ModelError::InvalidConfiguration(format!(
				"alpha must be a finite value > 0, got {alpha}"
			)));
		}
		Ok(Self { vocabulary, counts, alpha, mass: vocabulary.len() as f64 * alpha })
	}

	pub fn vocabulary(&self) -> &'a Vocabulary {
		self.vocabulary
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Same counts and alpha over another (non-empty) vocabulary.
	///
	/// Used to score over the vocabulary extended with UNKNOWN.
	pub(crate) fn with_vocabulary<'b>(&self, vocabulary: &'b Vocabulary) -> Estimator<'b>
	where
		'a: 'b,
	{
		debug_assert!(!vocabulary.is_empty());
		Estimator {
			vocabulary,
			counts: self.counts,
			alpha: self.alpha,
			mass: vocabulary.len() as f64 * self.alpha,
		}
	}

	/// Smoothed probability of `target` following `context`.
	///
	/// Always strictly positive. A context never seen in training counts as 0
	/// and yields `1 / |V|`.
	pub fn probability(&self, target: &str, context: &str) -> f64 {
		let numerator = self.counts.bigram(context, target) as f64 + self.alpha;
		let denominator = self.counts.unigram(context) as f64 + self.mass;
		numerator / denominator
	}

	/// Natural logarithm of [`Self::probability`]; always finite.
	pub fn log_probability(&self, target: &str, context: &str) -> f64 {
		self.probability(target, context).ln()
	}
}
