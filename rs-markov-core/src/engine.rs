use std::path::Path;

use log::info;
use rand::Rng;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::io::read_file;
use crate::model::generator::{Generation, Generator};
use crate::model::trainer;
use crate::model::transition_table::TransitionTable;
use crate::persistence::{FileStore, PersistenceGate, SnapshotStore};

/// Counters exposed to adapters.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct EngineStats {
	pub keys: usize,
	pub pairs: usize,
	pub pending_writes: usize,
	pub flush_threshold: usize,
}

/// The learning and generation engine.
///
/// Owns the transition table, the persistence gate and the snapshot store.
/// Built once at startup and handed to the adapter layer.
///
/// # Notes
/// - Methods take `&mut self` for training and flushing; callers sharing an
///   engine across threads put it behind a single `Mutex`.
/// - `generate` never fails; `train` never fails.
#[derive(Debug)]
pub struct Engine<S: SnapshotStore = FileStore> {
	config: EngineConfig,
	table: TransitionTable,
	gate: PersistenceGate,
	store: S,
}

impl Engine<FileStore> {
	/// Opens the engine on `config.snapshot_path`.
	///
	/// A missing snapshot starts an empty table.
	///
	/// # Errors
	/// Returns an error if the snapshot exists but cannot be read or decoded.
	pub fn open(config: EngineConfig) -> Result<Self, EngineError> {
		let store = FileStore::new(config.snapshot_path.clone());
		Self::with_store(config, store)
	}
}

impl<S: SnapshotStore> Engine<S> {
	/// Opens the engine on an arbitrary store.
	pub fn with_store(config: EngineConfig, store: S) -> Result<Self, EngineError> {
		let table = match store.load()? {
			Some(snapshot) => {
				let table = TransitionTable::restore(snapshot);
				info!("loaded training data ({} keys)", table.len());
				table
			}
			None => {
				info!("no training data found, starting empty");
				TransitionTable::new()
			}
		};
		let gate = PersistenceGate::new(config.flush_threshold);
		Ok(Self { config, table, gate, store })
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn table(&self) -> &TransitionTable {
		&self.table
	}

	pub fn store(&self) -> &S {
		&self.store
	}

	pub fn store_mut(&mut self) -> &mut S {
		&mut self.store
	}

	pub fn pending_writes(&self) -> usize {
		self.gate.pending()
	}

	pub fn stats(&self) -> EngineStats {
		EngineStats {
			keys: self.table.len(),
			pairs: self.table.successor_count(),
			pending_writes: self.gate.pending(),
			flush_threshold: self.gate.threshold(),
		}
	}

	/// Learns from one submission.
	///
	/// Returns `true` if anything was trained. A successful submission counts
	/// as one training event and may trigger a flush.
	pub fn train(&mut self, raw_text: &str) -> bool {
		let trained = trainer::train(&mut self.table, raw_text, &self.config.markers());
		if trained {
			self.gate.note_training_event(&self.table, &mut self.store);
		}
		trained
	}

	/// Learns every line of a text file, using worker threads.
	///
	/// The whole file counts as a single training event.
	///
	/// # Errors
	/// Returns an error if the file cannot be read.
	pub fn train_corpus<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, EngineError> {
		let path = path.as_ref();
		let lines = read_file(path).map_err(|e| EngineError::io(path, e))?;
		let trained = trainer::train_lines(&mut self.table, lines, &self.config.markers());
		info!("trained {} lines from {}", trained, path.display());
		if trained > 0 {
			self.gate.note_training_event(&self.table, &mut self.store);
		}
		Ok(trained)
	}

	/// Generates a sentence using the thread-local RNG.
	pub fn generate(&self) -> String {
		self.generate_with(&mut rand::rng())
	}

	/// Generates a sentence using `rng`.
	///
	/// Returns the untrained or fallback message instead of failing.
	pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
		let generator = Generator::new(&self.table, self.config.markers())
			.with_max_attempts(self.config.max_attempts)
			.with_max_words(self.config.max_sentence_words);

		match generator.predict(rng) {
			Generation::Sentence(sentence) => sentence,
			Generation::Untrained => self.config.untrained_message.clone(),
			Generation::Exhausted => self.config.fallback_message.clone(),
		}
	}

	/// Writes the table if the pending counter reached the threshold.
	///
	/// Useful after a failed automatic flush, without waiting for the next event.
	pub fn flush_if_due(&mut self) -> bool {
		if self.gate.pending() < self.gate.threshold() {
			return false;
		}
		self.gate.flush(&self.table, &mut self.store)
	}

	/// Writes the table now, whatever the pending counter says.
	pub fn flush_now(&mut self) -> bool {
		self.gate.flush(&self.table, &mut self.store)
	}
}
