//! Durable storage of the transition table.
//!
//! A [`SnapshotStore`] reads and writes whole [`Snapshot`]s. The
//! [`PersistenceGate`] batches training events and decides when the table is
//! written back.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::EngineError;
use crate::io;
use crate::model::transition_table::{Snapshot, TransitionTable};

/// Encoding of a snapshot file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotFormat {
	/// Top-level JSON array of `[word, [successor, ...]]` pairs.
	Json,
	/// Compact `postcard` binary.
	Postcard,
}

impl SnapshotFormat {
	/// `.bin` selects postcard, anything else JSON.
	pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
		match path.as_ref().extension().and_then(|e| e.to_str()) {
			Some("bin") => Self::Postcard,
			_ => Self::Json,
		}
	}

	pub fn encode(&self, snapshot: &Snapshot) -> Result<Vec<u8>, EngineError> {
		Ok(match self {
			Self::Json => serde_json::to_vec(snapshot)?,
			Self::Postcard => postcard::to_stdvec(snapshot)?,
		})
	}

	pub fn decode(&self, bytes: &[u8]) -> Result<Snapshot, EngineError> {
		Ok(match self {
			Self::Json => serde_json::from_slice(bytes)?,
			Self::Postcard => postcard::from_bytes(bytes)?,
		})
	}
}

/// Somewhere a snapshot can be loaded from and saved to.
pub trait SnapshotStore {
	/// Loads the last saved snapshot, `None` if nothing was ever saved.
	fn load(&self) -> Result<Option<Snapshot>, EngineError>;

	/// Replaces the stored snapshot. Either the whole snapshot is stored or
	/// the previous one is left intact.
	fn save(&mut self, snapshot: &Snapshot) -> Result<(), EngineError>;
}

/// Snapshot kept in a single file.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	format: SnapshotFormat,
}

impl FileStore {
	/// Creates a store for `path`, picking the format from its extension.
	pub fn new<P: Into<PathBuf>>(path: P) -> Self {
		let path = path.into();
		let format = SnapshotFormat::from_path(&path);
		Self { path, format }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn format(&self) -> SnapshotFormat {
		self.format
	}
}

impl SnapshotStore for FileStore {
	fn load(&self) -> Result<Option<Snapshot>, EngineError> {
		let bytes = match io::read_optional(&self.path).map_err(|e| EngineError::io(&self.path, e))? {
			Some(bytes) => bytes,
			None => return Ok(None),
		};
		self.format.decode(&bytes).map(Some)
	}

	fn save(&mut self, snapshot: &Snapshot) -> Result<(), EngineError> {
		let bytes = self.format.encode(snapshot)?;
		io::write_atomic(&self.path, &bytes).map_err(|e| EngineError::io(&self.path, e))
	}
}

/// In-memory store, for tests and for running without a disk.
///
/// Writes can be made to fail to exercise the retry behaviour of the gate.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
	saved: Option<Snapshot>,
	saves: usize,
	fail_writes: bool,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// A store that starts with `snapshot` already saved.
	pub fn with_snapshot(snapshot: Snapshot) -> Self {
		Self { saved: Some(snapshot), ..Self::default() }
	}

	pub fn set_fail_writes(&mut self, fail: bool) {
		self.fail_writes = fail;
	}

	/// Number of successful saves.
	pub fn saves(&self) -> usize {
		self.saves
	}

	pub fn saved(&self) -> Option<&Snapshot> {
		self.saved.as_ref()
	}
}

impl SnapshotStore for MemoryStore {
	fn load(&self) -> Result<Option<Snapshot>, EngineError> {
		Ok(self.saved.clone())
	}

	fn save(&mut self, snapshot: &Snapshot) -> Result<(), EngineError> {
		if self.fail_writes {
			return Err(EngineError::Unavailable("writes disabled".to_owned()));
		}
		self.saved = Some(snapshot.clone());
		self.saves += 1;
		Ok(())
	}
}

/// Batches writes of the transition table.
///
/// # Invariants
/// - `pending` counts training events since the last successful flush
/// - `pending` is only reset by a successful flush
#[derive(Clone, Debug)]
pub struct PersistenceGate {
	threshold: usize,
	pending: usize,
}

impl PersistenceGate {
	pub fn new(threshold: usize) -> Self {
		Self { threshold, pending: 0 }
	}

	pub fn pending(&self) -> usize {
		self.pending
	}

	pub fn threshold(&self) -> usize {
		self.threshold
	}

	/// Counts one training event and flushes once the threshold is reached.
	///
	/// Returns `true` if a flush happened and succeeded.
	pub fn note_training_event<S: SnapshotStore + ?Sized>(&mut self, table: &TransitionTable, store: &mut S) -> bool {
		self.pending += 1;
		if self.pending >= self.threshold {
			return self.flush(table, store);
		}
		false
	}

	/// Writes the whole table. On failure the pending counter is kept.
	pub fn flush<S: SnapshotStore + ?Sized>(&mut self, table: &TransitionTable, store: &mut S) -> bool {
		match store.save(&table.snapshot()) {
			Ok(()) => {
				info!("written training data to disk ({} keys, {} pending events)", table.len(), self.pending);
				self.pending = 0;
				true
			}
			Err(e) => {
				warn!("failed writing training data to disk: {}", e);
				false
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn table() -> TransitionTable {
		let mut table = TransitionTable::new();
		table.record("Start1", "hi");
		table.record("hi", "End1");
		table
	}

	#[test]
	fn format_from_extension() {
		assert_eq!(SnapshotFormat::from_path("Dict1.json"), SnapshotFormat::Json);
		assert_eq!(SnapshotFormat::from_path("model.bin"), SnapshotFormat::Postcard);
		assert_eq!(SnapshotFormat::from_path("noext"), SnapshotFormat::Json);
	}

	#[test]
	fn both_formats_decode_what_they_encode() {
		let snapshot = table().snapshot();
		for format in [SnapshotFormat::Json, SnapshotFormat::Postcard] {
			let bytes = format.encode(&snapshot).unwrap();
			assert_eq!(format.decode(&bytes).unwrap(), snapshot);
		}
	}

	#[test]
	fn threshold_triggers_one_flush() {
		let table = table();
		let mut store = MemoryStore::new();
		let mut gate = PersistenceGate::new(3);

		assert!(!gate.note_training_event(&table, &mut store));
		assert!(!gate.note_training_event(&table, &mut store));
		assert_eq!(store.saves(), 0);
		assert!(gate.note_training_event(&table, &mut store));
		assert_eq!(store.saves(), 1);
		assert_eq!(gate.pending(), 0);
		assert_eq!(store.saved(), Some(&table.snapshot()));
	}

	#[test]
	fn failed_flush_keeps_counter_and_retries() {
		let table = table();
		let mut store = MemoryStore::new();
		store.set_fail_writes(true);
		let mut gate = PersistenceGate::new(3);

		for _ in 0..3 {
			gate.note_training_event(&table, &mut store);
		}
		assert_eq!(gate.pending(), 3);
		assert_eq!(store.saves(), 0);

		store.set_fail_writes(false);
		assert!(gate.note_training_event(&table, &mut store));
		assert_eq!(gate.pending(), 0);
		assert_eq!(store.saves(), 1);
	}

	#[test]
	fn explicit_flush_ignores_threshold() {
		let table = table();
		let mut store = MemoryStore::new();
		let mut gate = PersistenceGate::new(20);
		gate.note_training_event(&table, &mut store);
		assert!(gate.flush(&table, &mut store));
		assert_eq!(gate.pending(), 0);
		assert_eq!(store.saves(), 1);
	}

	#[test]
	fn file_store_missing_then_saved() {
		let dir = tempfile::tempdir().unwrap();
		let mut store = FileStore::new(dir.path().join("Dict1.json"));
		assert_eq!(store.load().unwrap(), None);
		store.save(&table().snapshot()).unwrap();
		assert_eq!(store.load().unwrap(), Some(table().snapshot()));
	}

	#[test]
	fn file_store_rejects_malformed_snapshot() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("Dict1.json");
		std::fs::write(&path, b"{\"not\": \"a list\"}").unwrap();
		assert!(matches!(FileStore::new(&path).load(), Err(EngineError::Json(_))));
	}

	#[test]
	fn file_store_unwritable_directory() {
		let dir = tempfile::tempdir().unwrap();
		let mut store = FileStore::new(dir.path().join("missing").join("Dict1.json"));
		assert!(matches!(store.save(&table().snapshot()), Err(EngineError::Io { .. })));
	}
}
