use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Token;
use super::transitions::Transitions;

/// Raw unigram and bigram occurrence counts.
///
/// # Responsibilities
/// - Slide a window of size 1 and 2 over each boundary-wrapped sequence
/// - Answer `unigram(token)` and `bigram(context, target)` lookups
///
/// No smoothing happens here. The bigram table is keyed by context first,
/// then by target, so a lookup never allocates.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CountModel {
	unigrams: HashMap<Token, usize>,
	bigrams: HashMap<Token, Transitions>,
}

impl CountModel {
	/// Counts every token and every adjacent pair of the given sequences.
	///
	/// The sequences must already be normalized (boundary-wrapped, rare
	/// words collapsed). START→first word and last word→STOP are counted
	/// like any other pair.
	pub fn from_sequences(sequences: &[Vec<Token>]) -> Self {
		let mut model = Self::default();
		for sequence in sequences {
			model.add_sequence(sequence);
		}
		model
	}

	/// Adds the counts of one sequence.
	fn add_sequence(&mut self, sequence: &[Token]) {
		for token in sequence {
			*self.unigrams.entry(token.clone()).or_insert(0) += 1;
		}
		for pair in sequence.windows(2) {
			self.bigrams.entry(pair[0].clone()).or_default().add(&pair[1]);
		}
	}

	/// Occurrences of `token` (0 if never seen).
	pub fn unigram(&self, token: &str) -> usize {
		self.unigrams.get(token).copied().unwrap_or(0)
	}

	/// Occurrences of `context` immediately followed by `target` (0 if never seen).
	pub fn bigram(&self, context: &str, target: &str) -> usize {
		self.bigrams.get(context).map_or(0, |t| t.count(target))
	}

	/// Number of pairs whose context is `context`.
	pub fn outgoing(&self, context: &str) -> usize {
		self.bigrams.get(context).map_or(0, Transitions::total)
	}

	/// Number of distinct (context, target) pairs counted.
	pub fn distinct_bigrams(&self) -> usize {
		self.bigrams.values().map(Transitions::distinct).sum()
	}

	/// Number of tokens seen as a context.
	pub fn contexts(&self) -> usize {
		self.bigrams.len()
	}
}
