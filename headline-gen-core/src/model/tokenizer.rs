use unicode_general_category::{GeneralCategory, get_general_category};

use super::Token;

/// Reserved token opening every sequence.
pub const START: &str = "<s>";

/// Reserved token closing every sequence.
pub const STOP: &str = "</s>";

/// Reserved token absorbing rare (training) and unseen (evaluation) words.
pub const UNKNOWN: &str = "<unk>";

/// Splits a raw line into word tokens.
///
/// - Removes every punctuation character: the ASCII punctuation class plus
///   the Unicode `P*` categories (`"don’t"` → `"dont"`, `"—"` → nothing)
/// - Splits on whitespace and drops empty pieces
/// - Keeps the original casing
///
/// An empty or punctuation-only line gives an empty list.
pub fn tokenize(line: &str) -> Vec<Token> {
	let stripped: String = line.chars().filter(|c| !is_punctuation(*c)).collect();
	stripped.split_whitespace().map(str::to_owned).collect()
}

fn is_punctuation(c: char) -> bool {
	c.is_ascii_punctuation()
		|| matches!(
			get_general_category(c),
			GeneralCategory::ConnectorPunctuation
				| GeneralCategory::DashPunctuation
				| GeneralCategory::OpenPunctuation
				| GeneralCategory::ClosePunctuation
				| GeneralCategory::InitialPunctuation
				| GeneralCategory::FinalPunctuation
				| GeneralCategory::OtherPunctuation
		)
}

/// Wraps a token list into a sequence: `[START] + words + [STOP]`.
pub fn wrap(words: Vec<Token>) -> Vec<Token> {
	let mut sequence = Vec::with_capacity(words.len() + 2);
	sequence.push(START.to_owned());
	sequence.extend(words);
	sequence.push(STOP.to_owned());
	sequence
}

/// Tokenizes a raw line and wraps it with boundary markers.
pub fn to_sequence(line: &str) -> Vec<Token> {
	wrap(tokenize(line))
}

/// Returns the body of a sequence (boundary markers excluded).
///
/// Only a leading START and a trailing STOP are removed.
pub fn body(sequence: &[Token]) -> &[Token] {
	let start = usize::from(sequence.first().is_some_and(|t| t == START));
	let rest = &sequence[start..];
	let end = rest.len() - usize::from(rest.last().is_some_and(|t| t == STOP));
	&rest[..end]
}
