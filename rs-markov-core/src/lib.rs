//! Word-level Markov chain text generation library.
//!
//! This crate learns which word follows which from submitted text and
//! produces new sentences by randomly walking those observations:
//! - A first-order transition table keyed on a single word
//! - Line and space tokenization with start/end markers
//! - Uniform random walks with bounded retries
//! - Batched, atomic persistence of the table
//!
//! Adapters (chat bots, HTTP servers) only need [`engine::Engine`].

/// Transition table, trainer and generator.
pub mod model;

/// Snapshot stores and the write-batching gate.
pub mod persistence;

/// The engine tying the model and persistence together.
pub mod engine;

/// Engine settings and defaults.
pub mod config;

/// Error types.
pub mod error;

/// I/O utilities (file loading, atomic writes).
///
/// Not exposed
pub(crate) mod io;

pub use config::EngineConfig;
pub use engine::{Engine, EngineStats};
pub use error::EngineError;
