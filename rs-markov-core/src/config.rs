use std::path::PathBuf;

/// Default number of training events between two flushes.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 20;

/// Default number of generation attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Sentinel prepended to every trained line.
pub const START_MARKER: &str = "Start1";

/// Sentinel appended to every trained line.
pub const END_MARKER: &str = "End1";

/// Engine settings.
///
/// All fields are public so binaries can fill them from flags or environment
/// variables. `EngineConfig::default()` reproduces the historical bot:
/// a `Dict1.json` snapshot flushed every 20 messages.
#[derive(Clone, Debug)]
pub struct EngineConfig {
	/// Where the transition table snapshot is stored.
	/// A `.bin` extension selects the postcard encoding, anything else JSON.
	pub snapshot_path: PathBuf,

	/// Training events accumulated before an automatic flush.
	pub flush_threshold: usize,

	/// Generation attempts per `generate()` call before the fallback message.
	pub max_attempts: usize,

	/// Upper bound on the number of words in one generated sentence.
	pub max_sentence_words: usize,

	pub start_marker: String,
	pub end_marker: String,

	/// Returned by `generate()` while the table is still empty.
	pub untrained_message: String,

	/// Returned by `generate()` once every attempt produced an empty sentence.
	pub fallback_message: String,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			snapshot_path: PathBuf::from("Dict1.json"),
			flush_threshold: DEFAULT_FLUSH_THRESHOLD,
			max_attempts: DEFAULT_MAX_ATTEMPTS,
			max_sentence_words: 1000,
			start_marker: START_MARKER.to_owned(),
			end_marker: END_MARKER.to_owned(),
			untrained_message: "Please teach me words first :)".to_owned(),
			fallback_message: "beep boop :)".to_owned(),
		}
	}
}

impl EngineConfig {
	/// Returns a default configuration pointing at `snapshot_path`.
	pub fn with_snapshot<P: Into<PathBuf>>(snapshot_path: P) -> Self {
		Self { snapshot_path: snapshot_path.into(), ..Self::default() }
	}

	/// Borrowed view of the two sentinels, as used by the trainer and generator.
	pub fn markers(&self) -> Markers<'_> {
		Markers { start: &self.start_marker, end: &self.end_marker }
	}
}

/// The pair of reserved sentinel tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Markers<'a> {
	pub start: &'a str,
	pub end: &'a str,
}

impl Default for Markers<'static> {
	fn default() -> Self {
		Self { start: START_MARKER, end: END_MARKER }
	}
}

impl Markers<'_> {
	/// Whether `token` is one of the two sentinels.
	pub fn is_reserved(&self, token: &str) -> bool {
		token == self.start || token == self.end
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_matches_historical_bot() {
		let config = EngineConfig::default();
		assert_eq!(config.snapshot_path, PathBuf::from("Dict1.json"));
		assert_eq!(config.flush_threshold, 20);
		assert_eq!(config.max_attempts, 10);
		assert_eq!(config.markers(), Markers::default());
	}

	#[test]
	fn reserved_tokens() {
		let markers = Markers::default();
		assert!(markers.is_reserved("Start1"));
		assert!(markers.is_reserved("End1"));
		assert!(!markers.is_reserved("start1"));
	}
}
