/*!
 * Database module for persistent storage of transcripts.
 *
 * This module provides SQLite-based persistence for:
 * - Episode cue sequences, replaced atomically on every import
 * - Sticky voice-to-contributor assignments
 * - The episode and contributor registries backing the lookup traits
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::{DatabaseConnection, DatabaseStats};
pub use repository::{ReplaceOutcome, Repository, StoredTranscript, TableDump};
