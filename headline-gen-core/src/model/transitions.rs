use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Token;

/// Outgoing bigram counts of a single context token.
///
/// Conceptually, this is a node of the bigram Markov chain where outgoing
/// edges are weighted by their number of observations.
///
/// ## Invariants
/// - Every stored count is strictly positive
/// - `total` equals the sum of all stored counts
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct Transitions {
	/// Example: { "says" => 42, "to" => 3 }
	targets: HashMap<Token, usize>,
	total: usize,
}

impl Transitions {
	/// Records one occurrence of `context → target`.
	pub fn add(&mut self, target: &str) {
		match self.targets.get_mut(target) {
			Some(count) => *count += 1,
			None => {
				self.targets.insert(target.to_owned(), 1);
			}
		}
		self.total += 1;
	}

	/// Number of times `target` followed this context (0 if never).
	pub fn count(&self, target: &str) -> usize {
		self.targets.get(target).copied().unwrap_or(0)
	}

	/// Total number of outgoing observations.
	pub fn total(&self) -> usize {
		self.total
	}

	/// Number of distinct observed targets.
	pub fn distinct(&self) -> usize {
		self.targets.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn add_accumulates_counts_and_total() {
		let mut transitions = Transitions::default();
		transitions.add("cat");
		transitions.add("dog");
		transitions.add("cat");

		assert_eq!(transitions.count("cat"), 2);
		assert_eq!(transitions.count("dog"), 1);
		assert_eq!(transitions.count("bird"), 0);
		assert_eq!(transitions.total(), 3);
		assert_eq!(transitions.distinct(), 2);
	}
}
