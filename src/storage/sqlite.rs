//! SQLite database layer

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::search::{Category, CategoryCatalog, EntryType, Level};
use crate::storage::migrations;

/// SQLite database wrapper for the directory
pub struct Database {
    conn: Connection,
    schema_version: u32,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("schema_version", &self.schema_version)
            .finish_non_exhaustive()
    }
}

/// Review state of a submitted entry. Only `Approved` entries are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl EntryStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRecord {
    pub handle: String,
    pub name: String,
    pub bio: String,
    pub published: bool,
    /// RFC 3339; `None` stamps the current time.
    pub updated_at: Option<String>,
}

impl AuthorRecord {
    #[must_use]
    pub fn new(handle: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            name: name.into(),
            bio: String::new(),
            published: true,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub entry_type: EntryType,
    pub level: Option<Level>,
    pub downloads_count: Option<i64>,
    pub members_count: Option<i64>,
    pub episodes_count: Option<i64>,
    pub author_id: Option<i64>,
    pub status: EntryStatus,
    pub published: bool,
    /// RFC 3339; `None` stamps the current time.
    pub updated_at: Option<String>,
}

impl EntryRecord {
    /// A published, approved entry with no optional fields set.
    #[must_use]
    pub fn new(slug: impl Into<String>, title: impl Into<String>, entry_type: EntryType) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            entry_type,
            level: None,
            downloads_count: None,
            members_count: None,
            episodes_count: None,
            author_id: None,
            status: EntryStatus::Approved,
            published: true,
            updated_at: None,
        }
    }
}

/// Category with the number of visible entries filed under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    #[serde(flatten)]
    pub category: Category,
    pub entries: u64,
}

/// Current time as stored in `created_at` / `updated_at`.
#[must_use]
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl Database {
    /// Open database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::configure_pragmas(&conn, true)?;
        Self::from_connection(conn)
    }

    /// Fresh, fully migrated in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure_pragmas(&conn, false)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let schema_version = migrations::run_migrations(&conn)?;
        Ok(Self {
            conn,
            schema_version,
        })
    }

    /// Get a reference to the connection
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Current schema version after migrations.
    #[must_use]
    pub const fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Insert or rename a category, keyed by slug.
    pub fn upsert_category(&self, slug: &str, name: &str) -> Result<Category> {
        let category = self.conn.query_row(
            "INSERT INTO categories (slug, name) VALUES (?, ?)
             ON CONFLICT(slug) DO UPDATE SET name = excluded.name
             RETURNING id, slug, name",
            params![slug, name],
            category_from_row,
        )?;
        Ok(category)
    }

    /// Insert or update an author keyed by handle, returning its id.
    pub fn upsert_author(&self, author: &AuthorRecord) -> Result<i64> {
        let now = now_timestamp();
        let updated_at = author.updated_at.as_deref().unwrap_or(&now);
        let id = self.conn.query_row(
            "INSERT INTO authors (handle, name, bio, published, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(handle) DO UPDATE SET
                 name = excluded.name,
                 bio = excluded.bio,
                 published = excluded.published,
                 updated_at = excluded.updated_at
             RETURNING id",
            params![
                author.handle,
                author.name,
                author.bio,
                author.published,
                now,
                updated_at
            ],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Insert or update an entry keyed by slug, returning its id.
    pub fn upsert_entry(&self, entry: &EntryRecord) -> Result<i64> {
        let now = now_timestamp();
        let updated_at = entry.updated_at.as_deref().unwrap_or(&now);
        let id = self.conn.query_row(
            "INSERT INTO entries (slug, title, description, tags, entry_type, level,
                 downloads_count, members_count, episodes_count, author_id, status,
                 published, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
             ON CONFLICT(slug) DO UPDATE SET
                 title = excluded.title,
                 description = excluded.description,
                 tags = excluded.tags,
                 entry_type = excluded.entry_type,
                 level = excluded.level,
                 downloads_count = excluded.downloads_count,
                 members_count = excluded.members_count,
                 episodes_count = excluded.episodes_count,
                 author_id = excluded.author_id,
                 status = excluded.status,
                 published = excluded.published,
                 updated_at = excluded.updated_at
             RETURNING id",
            params![
                entry.slug,
                entry.title,
                entry.description,
                entry.tags.join(", "),
                entry.entry_type.discriminator(),
                entry.level.map(Level::as_str),
                entry.downloads_count,
                entry.members_count,
                entry.episodes_count,
                entry.author_id,
                entry.status.as_str(),
                entry.published,
                now,
                updated_at
            ],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// File an entry under a category. Linking twice is a no-op.
    pub fn link_category(&self, entry_id: i64, category_id: i64) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO entry_categories (entry_id, category_id) VALUES (?, ?)",
            params![entry_id, category_id],
        )?;
        Ok(())
    }

    /// File an entry under exactly `category_ids`, dropping any other links.
    pub fn replace_categories(&self, entry_id: i64, category_ids: &[i64]) -> Result<()> {
        self.conn.execute(
            "DELETE FROM entry_categories WHERE entry_id = ?",
            [entry_id],
        )?;
        for &category_id in category_ids {
            self.link_category(entry_id, category_id)?;
        }
        Ok(())
    }

    pub fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let category = self
            .conn
            .query_row(
                "SELECT id, slug, name FROM categories WHERE slug = ?",
                [slug],
                category_from_row,
            )
            .optional()?;
        Ok(category)
    }

    pub fn find_author_id(&self, handle: &str) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row("SELECT id FROM authors WHERE handle = ?", [handle], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(id)
    }

    /// All categories by name, with their visible entry counts.
    pub fn list_categories(&self) -> Result<Vec<CategorySummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.slug, c.name, COUNT(ve.id)
             FROM categories c
             LEFT JOIN entry_categories ec ON ec.category_id = c.id
             LEFT JOIN visible_entries ve ON ve.id = ec.entry_id
             GROUP BY c.id
             ORDER BY c.name, c.id",
        )?;
        let rows = stmt.query_map([], |row| {
            let entries: i64 = row.get(3)?;
            Ok(CategorySummary {
                category: category_from_row(row)?,
                entries: u64::try_from(entries).unwrap_or_default(),
            })
        })?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn configure_pragmas(conn: &Connection, file_backed: bool) -> Result<()> {
        if file_backed {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;",
            )?;
        }
        conn.execute_batch(
            "PRAGMA cache_size = -16000;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;",
        )?;
        Ok(())
    }
}

impl CategoryCatalog for Database {
    fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        Self::find_category_by_slug(self, slug)
    }
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        slug: row.get(1)?,
        name: row.get(2)?,
    })
}
