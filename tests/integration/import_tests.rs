//! Import followed by search against the bundled directory fixture.

use std::path::Path;

use curate::CurateError;
use curate::import::{CorpusDocument, import_document, import_file};
use curate::search::{EntryCorpus, RawFacets, SearchComposer};
use curate::storage::Database;

const DIRECTORY: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/directory.json");

fn imported() -> Database {
    let db = Database::open_in_memory().unwrap();
    import_file(&db, Path::new(DIRECTORY)).unwrap();
    db
}

fn slugs(db: &Database, raw: &RawFacets) -> Vec<String> {
    let corpus = EntryCorpus::default();
    SearchComposer::new(db.conn(), db, &corpus, raw)
        .unwrap()
        .call()
        .fetch()
        .unwrap()
        .into_iter()
        .map(|hit| hit.slug)
        .collect()
}

#[test]
fn imported_directory_is_searchable() {
    let db = imported();
    let mut found = slugs(&db, &RawFacets::query("web"));
    found.sort();
    assert_eq!(found, vec!["rails", "sinatra"]);
}

#[test]
fn imported_timestamps_drive_recency() {
    let db = imported();
    let found = slugs(&db, &RawFacets::default());
    assert_eq!(
        found,
        vec!["testing-guide", "sinatra", "rails", "sequel", "ruby-rogues", "ruby-weekly"]
    );
}

#[test]
fn failed_import_leaves_store_untouched() {
    let db = Database::open_in_memory().unwrap();
    let document: CorpusDocument = serde_json::from_value(serde_json::json!({
        "categories": [{ "slug": "web", "name": "Web" }],
        "entries": [
            { "slug": "ok", "title": "Fine", "type": "gem" },
            { "slug": "bad", "title": "Broken", "type": "gem", "categories": ["missing"] }
        ]
    }))
    .unwrap();

    let err = import_document(&db, &document).unwrap_err();
    assert!(matches!(err, CurateError::Import { .. }));
    assert!(db.list_categories().unwrap().is_empty());
    assert!(slugs(&db, &RawFacets::default()).is_empty());
}

#[test]
fn categories_listing_counts_only_visible_entries() {
    let db = imported();
    let categories = db.list_categories().unwrap();
    let counts: Vec<(&str, u64)> = categories
        .iter()
        .map(|summary| (summary.category.slug.as_str(), summary.entries))
        .collect();
    assert_eq!(
        counts,
        vec![("databases", 1), ("testing", 1), ("web-development", 2)]
    );
}

#[test]
fn reimport_moves_entry_between_categories() {
    let db = Database::open_in_memory().unwrap();
    let filed_under = |category: &str| -> CorpusDocument {
        serde_json::from_value(serde_json::json!({
            "categories": [
                { "slug": "web", "name": "Web" },
                { "slug": "testing", "name": "Testing" }
            ],
            "entries": [
                { "slug": "roda", "title": "Roda", "type": "gem", "categories": [category] }
            ]
        }))
        .unwrap()
    };

    import_document(&db, &filed_under("web")).unwrap();
    assert_eq!(slugs(&db, &RawFacets::default().with_category("web")), vec!["roda"]);

    import_document(&db, &filed_under("testing")).unwrap();
    assert!(slugs(&db, &RawFacets::default().with_category("web")).is_empty());
    assert_eq!(
        slugs(&db, &RawFacets::default().with_category("testing")),
        vec!["roda"]
    );
}

#[test]
fn unreadable_file_names_the_path() {
    let db = Database::open_in_memory().unwrap();
    let err = import_file(&db, Path::new("/nonexistent/directory.json")).unwrap_err();
    match err {
        CurateError::Import { record, .. } => assert_eq!(record, "/nonexistent/directory.json"),
        other => panic!("expected an import error, got {other:?}"),
    }
}
