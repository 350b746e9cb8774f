//! Property-based test suite entry point.

mod sanitize_tests;
