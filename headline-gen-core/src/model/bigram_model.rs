use std::collections::HashSet;
use std::fs;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::{GenerationConfig, ModelConfig};
use super::counts::CountModel;
use super::estimator::Estimator;
use super::evaluator::Evaluator;
use super::generator::{Generator, Headline};
use super::tokenizer::{body, to_sequence};
use super::vocabulary::{self, Vocabulary};
use crate::error::{ModelError, Result};
use crate::io::{build_output_path, read_lines};

/// A trained bigram headline model.
///
/// This struct bundles:
/// - `config`: smoothing constant and rare-word threshold
/// - `vocabulary`: the closed vocabulary fixed by training
/// - `counts`: unigram / bigram counts of the normalized training corpus
/// - `headlines`: normalized training headlines (used to avoid re-generating
///   existing ones)
///
/// Vocabulary and counts are immutable after training; estimators,
/// generators and evaluators only borrow them.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BigramModel {
	config: ModelConfig,
	vocabulary: Vocabulary,
	counts: CountModel,
	headlines: HashSet<String>,
}

impl BigramModel {
	/// Trains a model from raw training lines (one headline per line).
	///
	/// # Behavior
	/// - Tokenizes and wraps every line (empty lines become `[START, STOP]`)
	/// - Builds the vocabulary, collapsing words seen at most `min_freq` times
	/// - Counts unigrams and bigrams over the collapsed corpus
	///
	/// # Errors
	/// Returns `EmptyCorpus` if `lines` is empty.
	pub fn train<S: AsRef<str>>(lines: &[S], config: ModelConfig) -> Result<Self> {
		if lines.is_empty() {
			return Err(ModelError::EmptyCorpus("training corpus has no line"));
		}

		let sequences: Vec<_> = lines.iter().map(|line| to_sequence(line.as_ref())).collect();
		let normalized = vocabulary::build(&sequences, config.min_freq());
		let counts = CountModel::from_sequences(&normalized.sequences);
		let headlines = normalized.sequences.iter().map(|s| body(s).join(" ")).collect();

		log::info!(
			"trained on {} headlines: {} tokens in vocabulary ({} rare words collapsed), {} distinct bigrams",
			sequences.len(),
			normalized.vocabulary.len(),
			normalized.rare_words.len(),
			counts.distinct_bigrams()
		);

		Ok(Self { config, vocabulary: normalized.vocabulary, counts, headlines })
	}

	/// Loads a model for a corpus file, training it if needed.
	///
	/// - Looks for a binary cache next to the corpus (`news.txt` → `news.bin`)
	/// - Reuses it if it is newer than the corpus and was built with the same
	///   `min_freq`; the requested `alpha` is applied on top
	/// - Otherwise reads the corpus, trains, and rewrites the cache
	///
	/// Uses `postcard` for compact serialization.
	pub fn from_file<P: AsRef<Path>>(filepath: P, config: ModelConfig) -> Result<Self> {
		let corpus_path = filepath.as_ref();
		let cache_path = build_output_path(corpus_path, "bin")?;

		if is_fresh(corpus_path, &cache_path) {
			match Self::load(&cache_path) {
				Ok(mut model) if model.config.min_freq() == config.min_freq() => {
					model.config.set_alpha(config.alpha())?;
					log::info!("loaded cached model from {}", cache_path.display());
					return Ok(model);
				}
				Ok(_) => log::warn!("{} was built with another min_freq, retraining", cache_path.display()),
				Err(e) => log::warn!("ignoring unreadable cache {}: {e}", cache_path.display()),
			}
		}

		let lines = read_lines(corpus_path)?;
		let model = Self::train(&lines, config)?;
		model.save(&cache_path)?;
		Ok(model)
	}

	/// Serializes the model to `path`.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let bytes = postcard::to_stdvec(self)?;
		fs::write(path, bytes)?;
		Ok(())
	}

	/// Deserializes a model previously written by [`Self::save`].
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let bytes = fs::read(path)?;
		Ok(postcard::from_bytes(&bytes)?)
	}

	pub fn config(&self) -> &ModelConfig {
		&self.config
	}

	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	pub fn counts(&self) -> &CountModel {
		&self.counts
	}

	/// Number of distinct normalized training headlines.
	pub fn headline_count(&self) -> usize {
		self.headlines.len()
	}

	/// Changes the smoothing constant; counts and vocabulary are untouched.
	pub fn set_alpha(&mut self, alpha: f64) -> Result<()> {
		self.config.set_alpha(alpha)
	}

	pub fn estimator(&self) -> Result<Estimator<'_>> {
		Estimator::new(&self.vocabulary, &self.counts, self.config.alpha())
	}

	pub fn generator(&self, config: &GenerationConfig) -> Result<Generator<'_>> {
		Generator::new(self.estimator()?, config)
	}

	pub fn evaluator(&self) -> Result<Evaluator<'_>> {
		Ok(Evaluator::new(self.estimator()?))
	}

	/// Returns `true` if the headline already exists in the training corpus
	/// (compared on the normalized, UNKNOWN-collapsed form).
	pub fn exists(&self, headline: &Headline) -> bool {
		self.headlines.contains(&headline.to_string())
	}

	/// Generates a headline, avoiding training headlines if possible.
	///
	/// # Behavior
	/// - Draws a headline from the bigram chain
	/// - If it already exists in the training corpus, draws again, up to
	///   `config.nb_try` more times
	/// - Returns the first novel headline, or the last attempt
	pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, config: &GenerationConfig) -> Result<Headline> {
		let generator = self.generator(config)?;
		let mut headline = generator.generate(rng);
		let mut nb_try = config.nb_try;

		while nb_try > 0 && self.exists(&headline) {
			log::debug!("'{headline}' already exists, retrying ({nb_try} left)");
			headline = generator.generate(rng);
			nb_try -= 1;
		}

		Ok(headline)
	}

	/// Mean perplexity of raw held-out lines.
	///
	/// # Errors
	/// Returns `EmptyCorpus` if `lines` is empty.
	pub fn perplexity<S: AsRef<str> + Sync>(&self, lines: &[S]) -> Result<f64> {
		self.evaluator()?.corpus_perplexity(lines)
	}
}

/// `true` if `cache` exists and is at least as recent as `corpus`.
fn is_fresh(corpus: &Path, cache: &Path) -> bool {
	let modified = |path: &Path| fs::metadata(path).and_then(|m| m.modified());
	match (modified(corpus), modified(cache)) {
		(Ok(corpus), Ok(cache)) => cache >= corpus,
		_ => false,
	}
}
