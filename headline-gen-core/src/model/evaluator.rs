use std::thread;

use super::Token;
use super::estimator::Estimator;
use super::tokenizer::{UNKNOWN, to_sequence};
use super::vocabulary::Vocabulary;
use crate::error::{ModelError, Result};

/// Perplexity scoring of held-out text.
///
/// Held-out words missing from the vocabulary are mapped to UNKNOWN before
/// scoring (membership rule, not the frequency rule used in training).
///
/// Scoring always happens over a vocabulary containing UNKNOWN: when training
/// collapsed no rare word, the training vocabulary is extended with it, so
/// every scored token belongs to the vocabulary and `|V|` counts it.
#[derive(Clone, Debug)]
pub struct Evaluator<'a> {
	estimator: Estimator<'a>,
	/// Training vocabulary plus UNKNOWN, when the former lacks it.
	extended: Option<Vocabulary>,
}

impl<'a> Evaluator<'a> {
	pub fn new(estimator: Estimator<'a>) -> Self {
		let vocabulary = estimator.vocabulary();
		let extended = (!vocabulary.contains(UNKNOWN)).then(|| vocabulary.with_unknown());
		Self { estimator, extended }
	}

	/// Vocabulary held-out text is scored against.
	pub fn vocabulary(&self) -> &Vocabulary {
		self.extended.as_ref().unwrap_or(self.estimator.vocabulary())
	}

	/// Estimator over [`Self::vocabulary`].
	pub fn estimator(&self) -> Estimator<'_> {
		match &self.extended {
			Some(vocabulary) => self.estimator.with_vocabulary(vocabulary),
			None => self.estimator,
		}
	}

	/// Perplexity of one boundary-wrapped sequence.
	///
	/// `exp(-(1/N) * Σ ln P(w_i | w_{i-1}))` over the `N` adjacent pairs,
	/// accumulated in the log domain. A sequence with fewer than two tokens
	/// has no pair and scores 1.0.
	pub fn sequence_perplexity(&self, sequence: &[Token]) -> f64 {
		let estimator = self.estimator();
		let mapped = self.vocabulary().map_unseen(sequence);
		let pairs = mapped.len().saturating_sub(1);
		if pairs == 0 {
			return 1.0;
		}

		let negative_log_likelihood: f64 = mapped
			.windows(2)
			.map(|pair| -estimator.log_probability(&pair[1], &pair[0]))
			.sum();
		(negative_log_likelihood / pairs as f64).exp()
	}

	/// Perplexity of a raw held-out line (tokenized and wrapped first).
	pub fn line_perplexity(&self, line: &str) -> f64 {
		self.sequence_perplexity(&to_sequence(line))
	}

	/// Arithmetic mean of the per-line perplexities of a held-out set.
	///
	/// Lines are scored in parallel, one contiguous chunk per CPU, and the
	/// per-chunk results are reduced in chunk order so the mean does not
	/// depend on thread scheduling.
	///
	/// # Errors
	/// Returns `EmptyCorpus` if `lines` is empty.
	pub fn corpus_perplexity<S: AsRef<str> + Sync>(&self, lines: &[S]) -> Result<f64> {
		if lines.is_empty() {
			return Err(ModelError::EmptyCorpus("held-out set has no line"));
		}

		let chunk_size = lines.len().div_ceil(num_cpus::get().max(1));
		let scores: Vec<f64> = thread::scope(|scope| {
			let handles: Vec<_> = lines
				.chunks(chunk_size)
				.map(|chunk| {
					scope.spawn(move || {
						chunk.iter().map(|line| self.line_perplexity(line.as_ref())).collect::<Vec<_>>()
					})
				})
				.collect();

			handles
				.into_iter()
				.flat_map(|handle| match handle.join() {
					Ok(scores) => scores,
					Err(panic) => std::panic::resume_unwind(panic),
				})
				.collect()
		});

		let mean = scores.iter().sum::<f64>() / scores.len() as f64;
		log::info!("perplexity over {} held-out lines: {mean:.2}", scores.len());
		Ok(mean)
	}
}
