//! Error types returned by the engine.
//!
//! Only loading a snapshot can fail loudly. Training and generation never
//! return an error, and a failed flush is reported as `false`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing a snapshot.
#[derive(Error, Debug)]
pub enum EngineError {
	#[error("I/O error on {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("Malformed JSON snapshot: {0}")]
	Json(#[from] serde_json::Error),
	#[error("Malformed binary snapshot: {0}")]
	Postcard(#[from] postcard::Error),
	#[error("Snapshot store unavailable: {0}")]
	Unavailable(String),
}

impl EngineError {
	pub(crate) fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
		Self::Io { path: path.into(), source }
	}
}
