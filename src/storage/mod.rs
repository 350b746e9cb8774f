//! Storage layer for curate
//!
//! SQLite with FTS5: the content tables, their full-text indexes and the
//! visibility views the search composer reads.

pub mod migrations;
pub mod sqlite;

pub use sqlite::{AuthorRecord, CategorySummary, Database, EntryRecord, EntryStatus, now_timestamp};
