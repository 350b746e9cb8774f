//! Shared test utilities for curate.

pub mod fixtures;

pub use fixtures::{CorpusFixture, EntrySeed};
