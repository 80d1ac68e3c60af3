//! Top-level module for the word chain model.
//!
//! - The transition table and its persisted form (`TransitionTable`, `Snapshot`)
//! - Internal per-word state (`State`)
//! - Training from raw text (`trainer`)
//! - Sentence generation (`Generator`)

/// Random walk over the transition table with bounded retries.
pub mod generator;

/// Word → successors mapping with snapshot/restore and merging.
pub mod transition_table;

/// Tokenization of raw submissions and table updates.
///
/// Includes parallel training of large line sets.
pub mod trainer;

/// Internal representation of a single word and its successors.
///
/// This module is not exposed publicly.
mod state;
