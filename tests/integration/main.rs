//! Integration test suite entry point.

mod import_tests;
mod search_tests;
