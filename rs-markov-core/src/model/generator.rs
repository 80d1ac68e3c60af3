use log::warn;
use rand::Rng;

use crate::config::{DEFAULT_MAX_ATTEMPTS, Markers};
use super::transition_table::TransitionTable;

/// Result of a generation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Generation {
	/// A non-blank sentence. Every word is followed by one space, the last one included.
	Sentence(String),
	/// The table has never been trained.
	Untrained,
	/// Every attempt produced a blank sentence.
	Exhausted,
}

/// Random walk over a `TransitionTable`.
///
/// # Responsibilities
/// - Walk from the start marker to the end marker, picking successors uniformly
/// - Retry blank sentences up to `max_attempts` times per call
/// - Never panic and never loop forever, whatever the table contains
///
/// # Notes
/// - The attempt counter is local to each `predict` call.
/// - A word missing from the table ends the walk as if the end marker was drawn.
/// - A walk stops after `max_words` steps.
#[derive(Debug)]
pub struct Generator<'a> {
	table: &'a TransitionTable,
	markers: Markers<'a>,
	max_attempts: usize,
	max_words: usize,
}

impl<'a> Generator<'a> {
	pub fn new(table: &'a TransitionTable, markers: Markers<'a>) -> Self {
		Self { table, markers, max_attempts: DEFAULT_MAX_ATTEMPTS, max_words: 1000 }
	}

	pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
		self.max_attempts = max_attempts;
		self
	}

	pub fn with_max_words(mut self, max_words: usize) -> Self {
		self.max_words = max_words;
		self
	}

	/// Performs a single walk. The result may be blank.
	pub fn walk<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
		let mut sentence = String::new();
		let mut current = self.markers.start;

		for _ in 0..self.max_words {
			let next = match self.table.state(current).and_then(|state| state.predict(rng)) {
				Some(word) => word,
				None => break,
			};
			if next == self.markers.end {
				break;
			}
			current = next;
			if next == self.markers.start {
				continue;
			}
			sentence.push_str(next);
			sentence.push(' ');
		}

		sentence
	}

	/// Generates a sentence, retrying blank walks.
	pub fn predict<R: Rng + ?Sized>(&self, rng: &mut R) -> Generation {
		if self.table.is_empty() {
			return Generation::Untrained;
		}

		for _ in 0..self.max_attempts {
			let sentence = self.walk(rng);
			if !sentence.trim().is_empty() {
				return Generation::Sentence(sentence);
			}
		}

		warn!("generation exhausted {} attempts without a sentence", self.max_attempts);
		Generation::Exhausted
	}
}
