use std::sync::mpsc;
use std::thread;

use log::debug;

use crate::config::Markers;
use super::transition_table::TransitionTable;

/// Splits a raw submission into trainable lines of tokens.
///
/// - Lines are split with `str::lines`, blank lines are dropped
/// - Tokens are split on single spaces only; empty or whitespace-only tokens
///   are dropped (a tab inside a token does not split it)
/// - Reserved marker tokens are dropped
/// - Lines left without any token are dropped
pub fn tokenize<'a>(raw_text: &'a str, markers: &Markers<'_>) -> Vec<Vec<&'a str>> {
	raw_text
		.lines()
		.filter(|line| !line.trim().is_empty())
		.map(|line| {
			line.split(' ')
				.filter(|token| !token.trim().is_empty())
				.filter(|token| !markers.is_reserved(token))
				.collect::<Vec<_>>()
		})
		.filter(|tokens| !tokens.is_empty())
		.collect()
}

/// Records the consecutive pairs of one tokenized line.
///
/// The line is framed as `start, tokens..., end`; the end marker is never
/// used as the first element of a pair.
fn train_line(table: &mut TransitionTable, tokens: &[&str], markers: &Markers<'_>) {
	let mut previous = markers.start;
	for &token in tokens {
		table.record(previous, token);
		previous = token;
	}
	table.record(previous, markers.end);
}

/// Trains `table` on a raw submission.
///
/// Returns `true` if at least one line recorded at least one pair, `false`
/// if the input held nothing trainable (in which case the table is untouched).
pub fn train(table: &mut TransitionTable, raw_text: &str, markers: &Markers<'_>) -> bool {
	let lines = tokenize(raw_text, markers);
	for tokens in &lines {
		debug!("training: {:?}", tokens);
		train_line(table, tokens, markers);
	}
	!lines.is_empty()
}

/// Trains many lines at once using worker threads.
///
/// # Behavior
/// - Splits `lines` into chunks (based on CPU cores * factor).
/// - Builds a partial table per chunk on its own thread.
/// - Merges the partial tables back in chunk order.
///
/// # Returns
/// The number of lines that recorded pairs.
///
/// # Notes
/// - Chunk order is restored before merging, so the result is the same as
///   training every line sequentially.
pub fn train_lines(table: &mut TransitionTable, lines: Vec<String>, markers: &Markers<'_>) -> usize {
	if lines.is_empty() {
		return 0;
	}

	let cpus = num_cpus::get();
	let factor = 8;
	let chunks = cpus * factor;
	let chunk_size = lines.len().div_ceil(chunks);

	let start = markers.start.to_owned();
	let end = markers.end.to_owned();

	let (tx, rx) = mpsc::channel();
	let mut spawned = 0;
	for (position, chunk) in lines.chunks(chunk_size).enumerate() {
		let tx = tx.clone();
		let chunk: Vec<String> = chunk.to_vec();
		let start = start.clone();
		let end = end.clone();

		thread::spawn(move || {
			let markers = Markers { start: &start, end: &end };
			let mut partial = TransitionTable::new();
			let mut trained = 0;
			for line in &chunk {
				if train(&mut partial, line, &markers) {
					trained += 1;
				}
			}
			// The receiver outlives every sender.
			let _ = tx.send((position, partial, trained));
		});
		spawned += 1;
	}
	drop(tx);

	let mut partials: Vec<(usize, TransitionTable, usize)> = rx.iter().collect();
	if partials.len() != spawned {
		// A worker panicked; redo the work on this thread so nothing is lost.
		let mut trained = 0;
		for line in &lines {
			if train(table, line, markers) {
				trained += 1;
			}
		}
		return trained;
	}
	partials.sort_by_key(|(position, _, _)| *position);

	let mut trained = 0;
	for (_, partial, count) in &partials {
		table.merge(partial);
		trained += count;
	}
	trained
}

#[cfg(test)]
mod tests {
	use super::*;

	fn markers() -> Markers<'static> {
		Markers::default()
	}

	#[test]
	fn two_lines_share_keys() {
		let mut table = TransitionTable::new();
		assert!(train(&mut table, "the quick fox\nthe slow fox", &markers()));
		assert_eq!(table.lookup("the").unwrap(), ["quick", "slow"]);
		assert_eq!(table.lookup("quick").unwrap(), ["fox"]);
		assert_eq!(table.lookup("fox").unwrap(), ["End1", "End1"]);
		assert_eq!(table.lookup("Start1").unwrap(), ["the", "the"]);
	}

	#[test]
	fn empty_input_trains_nothing() {
		let mut table = TransitionTable::new();
		assert!(!train(&mut table, "", &markers()));
		assert!(!train(&mut table, "   ", &markers()));
		assert!(!train(&mut table, "\n \n\t\n", &markers()));
		assert!(table.is_empty());
	}

	#[test]
	fn single_token_line() {
		let mut table = TransitionTable::new();
		assert!(train(&mut table, "hello", &markers()));
		assert_eq!(table.lookup("Start1").unwrap(), ["hello"]);
		assert_eq!(table.lookup("hello").unwrap(), ["End1"]);
		assert_eq!(table.len(), 2);
	}

	#[test]
	fn runs_of_spaces_collapse_but_tabs_do_not_split() {
		let tokens = tokenize("a   b\tc  ", &markers());
		assert_eq!(tokens, vec![vec!["a", "b\tc"]]);
	}

	#[test]
	fn crlf_does_not_leak_into_tokens() {
		let tokens = tokenize("one two\r\nthree\r\n", &markers());
		assert_eq!(tokens, vec![vec!["one", "two"], vec!["three"]]);
	}

	#[test]
	fn reserved_tokens_are_dropped() {
		let tokens = tokenize("Start1 hi End1 there\nEnd1", &markers());
		assert_eq!(tokens, vec![vec!["hi", "there"]]);
	}

	#[test]
	fn training_twice_doubles_multiplicity() {
		let mut once = TransitionTable::new();
		train(&mut once, "a b c\nb d", &markers());
		let mut twice = TransitionTable::new();
		train(&mut twice, "a b c\nb d", &markers());
		train(&mut twice, "a b c\nb d", &markers());

		assert_eq!(once.len(), twice.len());
		for key in once.keys() {
			assert_eq!(twice.lookup(key).unwrap().len(), 2 * once.lookup(key).unwrap().len());
		}
	}

	#[test]
	fn first_and_last_tokens_link_to_markers() {
		let mut table = TransitionTable::new();
		let lines = ["I like  trains", "  hello there  ", "x"];
		for line in lines {
			train(&mut table, line, &markers());
		}
		for line in lines {
			let tokens: Vec<&str> = line.split(' ').filter(|t| !t.is_empty()).collect();
			let first = tokens[0];
			let last = tokens[tokens.len() - 1];
			assert!(table.lookup("Start1").unwrap().iter().any(|w| w == first));
			assert!(table.lookup(last).unwrap().iter().any(|w| w == "End1"));
		}
	}

	#[test]
	fn custom_markers() {
		let custom = Markers { start: "<s>", end: "</s>" };
		let mut table = TransitionTable::new();
		train(&mut table, "hi", &custom);
		assert_eq!(table.lookup("<s>").unwrap(), ["hi"]);
		assert_eq!(table.lookup("hi").unwrap(), ["</s>"]);
	}

	#[test]
	fn parallel_lines_match_sequential() {
		let lines: Vec<String> = (0..500)
			.map(|i| format!("word{} shared word{} end{}", i % 7, i % 13, i % 3))
			.chain(std::iter::once("   ".to_owned()))
			.collect();

		let mut sequential = TransitionTable::new();
		let mut expected = 0;
		for line in &lines {
			if train(&mut sequential, line, &markers()) {
				expected += 1;
			}
		}

		let mut parallel = TransitionTable::new();
		let trained = train_lines(&mut parallel, lines, &markers());

		assert_eq!(trained, expected);
		assert_eq!(trained, 500);
		assert_eq!(parallel.snapshot(), sequential.snapshot());
	}
}
