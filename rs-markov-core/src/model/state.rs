use rand::Rng;
use rand::seq::IndexedRandom;

/// Represents a word in the transition table.
///
/// A `State` holds one word (`key`) and every word observed directly after it,
/// in the order they were observed.
///
/// Conceptually, this is a node in a first-order Markov chain. Frequencies are
/// not counted: a successor seen three times is simply stored three times, so
/// a uniform pick over `successors` is already weighted by observation.
///
/// ## Responsibilities:
/// - Accumulate successors during learning (append-only)
/// - Pick the next word uniformly among the recorded successors
/// - Merge with another state having the same key
///
/// ## Invariants
/// - `successors` is never empty once the state is part of a table
/// - Order and duplicates of `successors` are preserved
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct State {
	key: String,
	successors: Vec<String>,
}

impl State {
	/// Creates a state with a single recorded successor.
	pub fn new(key: &str, successor: &str) -> Self {
		Self {
			key: key.to_owned(),
			successors: vec![successor.to_owned()],
		}
	}

	/// Rebuilds a state from its persisted parts.
	pub fn from_parts(key: String, successors: Vec<String>) -> Self {
		Self { key, successors }
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn successors(&self) -> &[String] {
		&self.successors
	}

	/// Records one more occurrence of `successor` after this word.
	pub fn push(&mut self, successor: &str) {
		self.successors.push(successor.to_owned());
	}

	/// Picks a successor uniformly at random.
	///
	/// Returns `None` if the state has no successors (only possible for a
	/// state restored from a hand-edited snapshot).
	pub fn predict<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		self.successors.choose(rng).map(String::as_str)
	}

	/// Appends every successor of `other` after ours.
	///
	/// # Errors
	/// Returns an error if the state keys do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.key != other.key {
			return Err("Key mismatch".to_owned());
		}
		self.successors.extend(other.successors.iter().cloned());
		Ok(())
	}

	pub fn into_parts(self) -> (String, Vec<String>) {
		(self.key, self.successors)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn push_keeps_order_and_duplicates() {
		let mut state = State::new("the", "quick");
		state.push("slow");
		state.push("quick");
		assert_eq!(state.successors(), ["quick", "slow", "quick"]);
	}

	#[test]
	fn predict_only_returns_recorded_successors() {
		let mut state = State::new("the", "quick");
		state.push("slow");
		let mut rng = StdRng::seed_from_u64(7);
		for _ in 0..50 {
			let next = state.predict(&mut rng).unwrap();
			assert!(next == "quick" || next == "slow");
		}
	}

	#[test]
	fn predict_on_empty_state() {
		let state = State::from_parts("lonely".to_owned(), Vec::new());
		assert_eq!(state.predict(&mut StdRng::seed_from_u64(1)), None);
	}

	#[test]
	fn merge_appends_in_order() {
		let mut a = State::new("fox", "End1");
		let b = State::from_parts("fox".to_owned(), vec!["jumps".to_owned(), "End1".to_owned()]);
		a.merge(&b).unwrap();
		assert_eq!(a.successors(), ["End1", "jumps", "End1"]);
	}

	#[test]
	fn merge_rejects_other_key() {
		let mut a = State::new("fox", "End1");
		let b = State::new("dog", "End1");
		assert!(a.merge(&b).is_err());
	}
}
