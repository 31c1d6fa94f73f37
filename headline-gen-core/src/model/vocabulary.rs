use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::Token;
use super::tokenizer::{START, STOP, UNKNOWN, body};

/// Closed set of tokens known to a trained model.
///
/// # Invariants
/// - Always contains START and STOP once built from a corpus
/// - `tokens` is sorted and duplicate-free; it is the fixed iteration order
///   used for sampling
/// - `index` holds the same tokens for O(1) membership tests
///
/// Only `tokens` is serialized; the index is rebuilt on load.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(from = "Vec<Token>", into = "Vec<Token>")]
pub struct Vocabulary {
	tokens: Vec<Token>,
	index: HashSet<Token>,
}

impl From<Vec<Token>> for Vocabulary {
	fn from(mut tokens: Vec<Token>) -> Self {
		tokens.sort();
		tokens.dedup();
		let index = tokens.iter().cloned().collect();
		Self { tokens, index }
	}
}

impl From<Vocabulary> for Vec<Token> {
	fn from(vocabulary: Vocabulary) -> Self {
		vocabulary.tokens
	}
}

impl Vocabulary {
	/// O(1) membership test.
	pub fn contains(&self, token: &str) -> bool {
		self.index.contains(token)
	}

	/// Number of tokens, boundary markers included (`|V|`).
	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	/// Iterates the tokens in their fixed (sorted) order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.tokens.iter().map(String::as_str)
	}

	/// Returns this vocabulary plus UNKNOWN.
	pub fn with_unknown(&self) -> Self {
		let mut tokens = self.tokens.clone();
		tokens.push(UNKNOWN.to_owned());
		Self::from(tokens)
	}

	/// Evaluation-time substitution: body tokens absent from the vocabulary
	/// become UNKNOWN. Boundary markers are left untouched.
	///
	/// This is a membership rule, not the frequency rule used in training.
	pub fn map_unseen(&self, sequence: &[Token]) -> Vec<Token> {
		substitute(sequence, |token| self.contains(token))
	}
}

/// Output of the vocabulary builder.
///
/// `sequences` is the training corpus after rare-word collapsing; it is
/// what the count model consumes.
#[derive(Clone, Debug)]
pub struct NormalizedCorpus {
	pub vocabulary: Vocabulary,
	pub sequences: Vec<Vec<Token>>,
	pub rare_words: HashSet<Token>,
}

/// Builds a closed vocabulary from boundary-wrapped training sequences.
///
/// # Behavior
/// - Counts every token, START/STOP included, over the raw corpus
/// - Tokens seen at most `min_freq` times form the rare-word set
/// - Rare body tokens are rewritten to UNKNOWN (boundaries are never rewritten)
/// - The vocabulary is the set of tokens of the rewritten corpus plus START
///   and STOP; UNKNOWN is present only if a rare word was rewritten
///
/// An empty corpus yields the boundary-only vocabulary.
pub fn build(sequences: &[Vec<Token>], min_freq: usize) -> NormalizedCorpus {
	let mut frequencies: HashMap<&str, usize> = HashMap::new();
	for token in sequences.iter().flatten() {
		*frequencies.entry(token.as_str()).or_insert(0) += 1;
	}

	let rare_words: HashSet<Token> = frequencies
		.iter()
		.filter(|(_, count)| **count <= min_freq)
		.map(|(token, _)| (*token).to_owned())
		.collect();

	let normalized: Vec<Vec<Token>> = sequences
		.iter()
		.map(|sequence| collapse_rare(sequence, &rare_words))
		.collect();

	let mut tokens: HashSet<Token> = normalized.iter().flatten().cloned().collect();
	tokens.insert(START.to_owned());
	tokens.insert(STOP.to_owned());

	NormalizedCorpus {
		vocabulary: Vocabulary::from(tokens.into_iter().collect::<Vec<_>>()),
		sequences: normalized,
		rare_words,
	}
}

/// Training-time substitution: rare body tokens become UNKNOWN.
fn collapse_rare(sequence: &[Token], rare_words: &HashSet<Token>) -> Vec<Token> {
	substitute(sequence, |token| !rare_words.contains(token))
}

/// Replaces every body token rejected by `keep` with UNKNOWN.
///
/// A leading START and a trailing STOP are copied as-is.
fn substitute<F: Fn(&str) -> bool>(sequence: &[Token], keep: F) -> Vec<Token> {
	let words = body(sequence);
	let head = usize::from(sequence.first().is_some_and(|t| t == START));
	let tail = head + words.len();

	sequence[..head]
		.iter()
		.cloned()
		.chain(words.iter().map(|token| {
			if keep(token.as_str()) { token.clone() } else { UNKNOWN.to_owned() }
		}))
		.chain(sequence[tail..].iter().cloned())
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::tokenizer::to_sequence;

	fn corpus(lines: &[&str]) -> Vec<Vec<Token>> {
		lines.iter().map(|l| to_sequence(l)).collect()
	}

	#[test]
	fn keeps_every_word_with_zero_threshold() {
		let normalized = build(&corpus(&["the cat sat", "the dog ran"]), 0);
		let tokens: Vec<&str> = normalized.vocabulary.iter().collect();
		assert_eq!(tokens, vec!["</s>", "<s>", "cat", "dog", "ran", "sat", "the"]);
		assert!(normalized.rare_words.is_empty());
		assert!(!normalized.vocabulary.contains(UNKNOWN));
	}

	#[test]
	fn collapses_rare_words() {
		let normalized = build(&corpus(&["a b", "a c"]), 1);
		let vocabulary = &normalized.vocabulary;
		assert!(vocabulary.contains("a"));
		assert!(vocabulary.contains(UNKNOWN));
		assert!(!vocabulary.contains("b"));
		assert!(!vocabulary.contains("c"));
		assert_eq!(vocabulary.len(), 4);
		assert_eq!(normalized.sequences[0], vec![START, "a", UNKNOWN, STOP]);
	}

	#[test]
	fn boundaries_survive_a_high_threshold() {
		let normalized = build(&corpus(&["x y"]), 10);
		assert_eq!(normalized.sequences[0], vec![START, UNKNOWN, UNKNOWN, STOP]);
		assert!(normalized.vocabulary.contains(START));
		assert!(normalized.vocabulary.contains(STOP));
	}

	#[test]
	fn empty_corpus_gives_boundary_only_vocabulary() {
		let normalized = build(&[], 1);
		assert_eq!(normalized.vocabulary.len(), 2);
		assert!(normalized.sequences.is_empty());
	}

	#[test]
	fn building_twice_is_idempotent() {
		let sequences = corpus(&["one two two", "three two one", "four"]);
		let first = build(&sequences, 1);
		let second = build(&sequences, 1);
		assert_eq!(first.vocabulary, second.vocabulary);
		assert_eq!(first.sequences, second.sequences);
	}

	#[test]
	fn unseen_words_map_to_unknown() {
		let vocabulary = build(&corpus(&["the cat sat"]), 0).vocabulary;
		let mapped = vocabulary.map_unseen(&to_sequence("the dog sat"));
		assert_eq!(mapped, vec![START, "the", UNKNOWN, "sat", STOP]);
	}
}
