//! Property-based tests for the query sanitizer: whatever a visitor types,
//! FTS5 must accept the result.

use proptest::prelude::*;

use curate::search::{SanitizeRules, sanitize_with};
use curate::storage::Database;

/// Text heavy in FTS5 syntax characters.
const HOSTILE: &str = r#"[a-zA-Z0-9 "'()*:^+\-.,{}\[\]_éü…\t]{0,40}"#;

fn fts_accepts(db: &Database, table: &str, query: &str) -> Result<(), String> {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE {table} MATCH ?1");
    db.conn()
        .query_row(&sql, [query], |row| row.get::<_, i64>(0))
        .map(|_| ())
        .map_err(|err| format!("{query:?} rejected: {err}"))
}

fn unquoted_terms(query: &str) -> Vec<&str> {
    query
        .split('"')
        .step_by(2)
        .flat_map(str::split_whitespace)
        .collect()
}

proptest! {
    #[test]
    fn entry_queries_always_parse(raw in HOSTILE) {
        let db = Database::open_in_memory().unwrap();
        let query = sanitize_with(&raw, SanitizeRules::CONTENT);
        prop_assume!(!query.is_empty());
        prop_assert!(fts_accepts(&db, "entries_fts", &query).is_ok(), "{:?}", fts_accepts(&db, "entries_fts", &query));
    }

    #[test]
    fn author_queries_always_parse(raw in HOSTILE) {
        let db = Database::open_in_memory().unwrap();
        let query = sanitize_with(&raw, SanitizeRules::PROFILES);
        prop_assume!(!query.is_empty());
        prop_assert!(fts_accepts(&db, "authors_fts", &query).is_ok(), "{:?}", fts_accepts(&db, "authors_fts", &query));
    }

    #[test]
    fn arbitrary_unicode_never_breaks_parsing(raw in "\\PC{0,30}") {
        let db = Database::open_in_memory().unwrap();
        let query = sanitize_with(&raw, SanitizeRules::CONTENT);
        prop_assume!(!query.is_empty());
        prop_assert!(fts_accepts(&db, "entries_fts", &query).is_ok(), "{:?}", fts_accepts(&db, "entries_fts", &query));
    }

    #[test]
    fn quotes_are_balanced(raw in HOSTILE) {
        for rules in [SanitizeRules::CONTENT, SanitizeRules::PROFILES] {
            let query = sanitize_with(&raw, rules);
            prop_assert_eq!(query.matches('"').count() % 2, 0);
        }
    }

    #[test]
    fn no_bare_operators_or_column_filters(raw in HOSTILE) {
        let query = sanitize_with(&raw, SanitizeRules::CONTENT);
        for term in unquoted_terms(&query) {
            prop_assert!(!["AND", "OR", "NOT", "NEAR"].contains(&term.trim_end_matches('*')));
            prop_assert!(!term.contains(':'));
            prop_assert!(!term.starts_with('-'));
        }
    }

    #[test]
    fn content_rules_drop_apostrophes_outside_phrases(raw in HOSTILE) {
        let query = sanitize_with(&raw, SanitizeRules::CONTENT);
        for term in unquoted_terms(&query) {
            prop_assert!(!term.contains('\''));
        }
    }

    #[test]
    fn whitespace_only_is_blank(raw in "[ \t\r\n]{0,12}") {
        prop_assert_eq!(sanitize_with(&raw, SanitizeRules::CONTENT), "");
        prop_assert_eq!(sanitize_with(&raw, SanitizeRules::PROFILES), "");
    }
}
