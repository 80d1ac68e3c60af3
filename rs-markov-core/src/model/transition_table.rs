use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::state::State;

/// Persisted form of a `TransitionTable`.
///
/// Serializes as an ordered list of `[word, [successor, ...]]` pairs rather
/// than a map: keys keep their first-insertion order and successor lists keep
/// every duplicate.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot(pub Vec<(String, Vec<String>)>);

/// First-order word transition table.
///
/// Maps each word to the sequence of words observed right after it.
///
/// # Responsibilities
/// - Record `(word, successor)` pairs
/// - Look up the successors of a word
/// - Produce and restore full snapshots
/// - Merge with another table (bulk training support)
///
/// # Invariants
/// - Keys are unique; `index[key]` is the position of its state in `states`
/// - `states` is in first-insertion order
/// - Successor sequences are append-only
#[derive(Clone, Debug, Default)]
pub struct TransitionTable {
	states: Vec<State>,
	index: HashMap<String, usize>,
}

impl TransitionTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the successors recorded for `word`, if it is a key.
	pub fn lookup(&self, word: &str) -> Option<&[String]> {
		self.state(word).map(State::successors)
	}

	pub(crate) fn state(&self, word: &str) -> Option<&State> {
		self.index.get(word).map(|&i| &self.states[i])
	}

	/// Appends `successor` to the successors of `word`, creating the key if needed.
	pub fn record(&mut self, word: &str, successor: &str) {
		match self.index.get(word) {
			Some(&i) => self.states[i].push(successor),
			None => {
				self.index.insert(word.to_owned(), self.states.len());
				self.states.push(State::new(word, successor));
			}
		}
	}

	/// Number of distinct keys.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	/// True until the first pair is recorded.
	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	pub fn contains(&self, word: &str) -> bool {
		self.index.contains_key(word)
	}

	/// Keys in first-insertion order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.states.iter().map(State::key)
	}

	/// Total number of recorded pairs.
	pub fn successor_count(&self) -> usize {
		self.states.iter().map(|s| s.successors().len()).sum()
	}

	/// Appends every pair of `other` into this table.
	///
	/// Existing keys get `other`'s successors appended after their own; new
	/// keys are added in `other`'s order. Merging partial tables built from
	/// consecutive chunks of lines is therefore identical to training the
	/// lines one after another.
	pub fn merge(&mut self, other: &Self) {
		for state in &other.states {
			match self.index.get(state.key()) {
				// Keys match by construction of the index.
				Some(&i) => {
					let _ = self.states[i].merge(state);
				}
				None => {
					self.index.insert(state.key().to_owned(), self.states.len());
					self.states.push(state.clone());
				}
			}
		}
	}

	/// Full copy of the table in its persisted form.
	pub fn snapshot(&self) -> Snapshot {
		Snapshot(
			self.states
				.iter()
				.map(|s| (s.key().to_owned(), s.successors().to_vec()))
				.collect(),
		)
	}

	/// Rebuilds a table from a snapshot.
	///
	/// A key listed twice has its successor lists concatenated in document order.
	pub fn restore(snapshot: Snapshot) -> Self {
		let mut table = Self::new();
		for (key, successors) in snapshot.0 {
			match table.index.get(&key) {
				Some(&i) => {
					for successor in &successors {
						table.states[i].push(successor);
					}
				}
				None => {
					table.index.insert(key.clone(), table.states.len());
					table.states.push(State::from_parts(key, successors));
				}
			}
		}
		table
	}

	/// Consumes the table into its persisted form without cloning.
	pub fn into_snapshot(self) -> Snapshot {
		Snapshot(self.states.into_iter().map(State::into_parts).collect())
	}
}

impl From<Snapshot> for TransitionTable {
	fn from(snapshot: Snapshot) -> Self {
		Self::restore(snapshot)
	}
}
