//! Loads an import document into the store.
//!
//! Unlike search input, import input is trusted to be curated: every unknown
//! type, level, status, author or category is an error, and a failing file
//! leaves the store untouched.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use super::types::{AuthorDoc, CorpusDocument, EntryDoc};
use crate::error::{CurateError, Result};
use crate::search::{EntryType, Level};
use crate::storage::{AuthorRecord, Database, EntryRecord, EntryStatus};

static SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").expect("slug pattern compiles"));

/// What an import wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub categories: usize,
    pub authors: usize,
    pub entries: usize,
    pub links: usize,
}

/// Read and import a JSON file.
pub fn import_file(db: &Database, path: &Path) -> Result<ImportReport> {
    let record = path.display().to_string();
    let raw = std::fs::read_to_string(path)
        .map_err(|err| import_error(&record, format!("cannot read file: {err}")))?;
    let document: CorpusDocument = serde_json::from_str(&raw)
        .map_err(|err| import_error(&record, format!("invalid JSON: {err}")))?;
    import_document(db, &document)
}

/// Import a parsed document in one transaction. Records are upserted by
/// slug/handle, so importing the same file twice is a no-op. An entry's
/// categories are replaced by the ones the document lists.
pub fn import_document(db: &Database, document: &CorpusDocument) -> Result<ImportReport> {
    let tx = db.conn().unchecked_transaction()?;
    let mut report = ImportReport::default();

    let mut categories = HashMap::new();
    for category in &document.categories {
        let record = format!("category {:?}", category.slug);
        check_slug(&record, &category.slug)?;
        check_present(&record, "name", &category.name)?;
        let stored = db.upsert_category(&category.slug, category.name.trim())?;
        categories.insert(stored.slug.clone(), stored.id);
        report.categories += 1;
    }

    let mut authors = HashMap::new();
    for author in &document.authors {
        let id = db.upsert_author(&author_record(author)?)?;
        authors.insert(author.handle.clone(), id);
        report.authors += 1;
    }

    for entry in &document.entries {
        let record = format!("entry {:?}", entry.slug);
        let mut stored = entry_record(entry)?;
        stored.author_id = match entry.author.as_deref() {
            Some(handle) => Some(lookup_author(db, &authors, &record, handle)?),
            None => None,
        };
        let id = db.upsert_entry(&stored)?;
        debug!(id, slug = %entry.slug, "imported entry");

        let category_ids = entry
            .categories
            .iter()
            .map(|slug| lookup_category(db, &categories, &record, slug))
            .collect::<Result<Vec<_>>>()?;
        db.replace_categories(id, &category_ids)?;
        report.links += category_ids.len();
        report.entries += 1;
    }

    tx.commit()?;
    info!(
        categories = report.categories,
        authors = report.authors,
        entries = report.entries,
        links = report.links,
        "import complete"
    );
    Ok(report)
}

fn author_record(author: &AuthorDoc) -> Result<AuthorRecord> {
    let record = format!("author {:?}", author.handle);
    check_slug(&record, &author.handle)?;
    check_present(&record, "name", &author.name)?;
    Ok(AuthorRecord {
        handle: author.handle.clone(),
        name: author.name.trim().to_string(),
        bio: author.bio.clone(),
        published: author.published,
        updated_at: normalize_timestamp(&record, author.updated_at.as_deref())?,
    })
}

fn entry_record(entry: &EntryDoc) -> Result<EntryRecord> {
    let record = format!("entry {:?}", entry.slug);
    check_slug(&record, &entry.slug)?;
    check_present(&record, "title", &entry.title)?;

    let entry_type = EntryType::from_slug(&entry.kind)
        .ok_or_else(|| import_error(&record, format!("unknown type {:?}", entry.kind)))?;
    let level = entry
        .level
        .as_deref()
        .map(|value| {
            Level::parse(value)
                .ok_or_else(|| import_error(&record, format!("unknown level {value:?}")))
        })
        .transpose()?;
    let status = EntryStatus::parse(&entry.status)
        .ok_or_else(|| import_error(&record, format!("unknown status {:?}", entry.status)))?;

    for (field, value) in [
        ("downloads_count", entry.downloads_count),
        ("members_count", entry.members_count),
        ("episodes_count", entry.episodes_count),
    ] {
        if value.is_some_and(|count| count < 0) {
            return Err(import_error(&record, format!("{field} must not be negative")));
        }
    }

    Ok(EntryRecord {
        slug: entry.slug.clone(),
        title: entry.title.trim().to_string(),
        description: entry.description.clone(),
        tags: entry
            .tags
            .iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
        entry_type,
        level,
        downloads_count: entry.downloads_count,
        members_count: entry.members_count,
        episodes_count: entry.episodes_count,
        author_id: None,
        status,
        published: entry.published,
        updated_at: normalize_timestamp(&record, entry.updated_at.as_deref())?,
    })
}

fn lookup_author(
    db: &Database,
    imported: &HashMap<String, i64>,
    record: &str,
    handle: &str,
) -> Result<i64> {
    if let Some(id) = imported.get(handle) {
        return Ok(*id);
    }
    db.find_author_id(handle)?
        .ok_or_else(|| import_error(record, format!("unknown author {handle:?}")))
}

fn lookup_category(
    db: &Database,
    imported: &HashMap<String, i64>,
    record: &str,
    slug: &str,
) -> Result<i64> {
    if let Some(id) = imported.get(slug) {
        return Ok(*id);
    }
    db.find_category_by_slug(slug)?
        .map(|category| category.id)
        .ok_or_else(|| import_error(record, format!("unknown category {slug:?}")))
}

fn check_slug(record: &str, slug: &str) -> Result<()> {
    if SLUG_REGEX.is_match(slug) {
        Ok(())
    } else {
        Err(import_error(
            record,
            "slug must be lowercase letters, digits, '-' or '_'".to_string(),
        ))
    }
}

fn check_present(record: &str, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(import_error(record, format!("{field} is empty")));
    }
    Ok(())
}

/// Parse RFC 3339 and store it as UTC seconds so timestamps sort lexically.
fn normalize_timestamp(record: &str, value: Option<&str>) -> Result<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    DateTime::parse_from_rfc3339(value.trim())
        .map(|parsed| {
            Some(
                parsed
                    .with_timezone(&Utc)
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
            )
        })
        .map_err(|err| import_error(record, format!("invalid updated_at {value:?}: {err}")))
}

fn import_error(record: &str, reason: String) -> CurateError {
    CurateError::Import {
        record: record.to_string(),
        reason,
    }
}
