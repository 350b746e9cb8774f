use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::search::{Category, EntryType, Level};
use crate::storage::{AuthorRecord, Database, EntryRecord, EntryStatus};

/// In-memory directory for search tests.
///
/// Entries without an explicit `updated_at` get a timestamp one minute after
/// the previously created row, so creation order is recency order.
pub struct CorpusFixture {
    db: Database,
    ticks: i64,
    slugs: usize,
}

impl Default for CorpusFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusFixture {
    pub fn new() -> Self {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        Self {
            db,
            ticks: 0,
            slugs: 0,
        }
    }

    pub const fn db(&self) -> &Database {
        &self.db
    }

    pub fn category(&mut self, slug: &str, name: &str) -> Category {
        self.db
            .upsert_category(slug, name)
            .expect("Failed to insert category")
    }

    /// Published author; returns its id.
    pub fn author(&mut self, handle: &str, name: &str) -> i64 {
        let mut record = AuthorRecord::new(handle, name);
        record.updated_at = Some(self.next_timestamp());
        self.db
            .upsert_author(&record)
            .expect("Failed to insert author")
    }

    /// Insert an entry; returns its id.
    pub fn entry(&mut self, seed: EntrySeed) -> i64 {
        self.slugs += 1;
        let slug = format!("entry-{}", self.slugs);
        let updated_at = seed.updated_at.unwrap_or_else(|| self.next_timestamp());

        let record = EntryRecord {
            description: seed.description,
            tags: seed.tags,
            level: seed.level,
            downloads_count: seed.downloads_count,
            members_count: seed.members_count,
            episodes_count: seed.episodes_count,
            author_id: seed.author_id,
            status: seed.status,
            published: seed.published,
            updated_at: Some(updated_at),
            ..EntryRecord::new(slug, seed.title, seed.entry_type)
        };
        let id = self.db.upsert_entry(&record).expect("Failed to insert entry");
        for category_id in seed.categories {
            self.db
                .link_category(id, category_id)
                .expect("Failed to link category");
        }
        id
    }

    /// Visible entries that match no realistic query, to give bm25 a corpus.
    pub fn filler(&mut self, count: usize) -> Vec<i64> {
        (0..count)
            .map(|n| {
                self.entry(
                    EntrySeed::new(format!("Filler {n}"))
                        .description("Lorem ipsum dolor sit amet"),
                )
            })
            .collect()
    }

    fn next_timestamp(&mut self) -> String {
        self.ticks += 1;
        let base = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .expect("valid base timestamp")
            .with_timezone(&Utc);
        (base + Duration::minutes(self.ticks)).to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Builder for one fixture entry. Defaults to a visible article.
#[derive(Debug, Clone)]
pub struct EntrySeed {
    title: String,
    description: String,
    tags: Vec<String>,
    entry_type: EntryType,
    level: Option<Level>,
    downloads_count: Option<i64>,
    members_count: Option<i64>,
    episodes_count: Option<i64>,
    author_id: Option<i64>,
    categories: Vec<i64>,
    status: EntryStatus,
    published: bool,
    updated_at: Option<String>,
}

impl EntrySeed {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            entry_type: EntryType::Article,
            level: None,
            downloads_count: None,
            members_count: None,
            episodes_count: None,
            author_id: None,
            categories: Vec::new(),
            status: EntryStatus::Approved,
            published: true,
            updated_at: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| (*t).to_string()).collect();
        self
    }

    #[must_use]
    pub fn kind(mut self, entry_type: EntryType) -> Self {
        self.entry_type = entry_type;
        self
    }

    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn downloads(mut self, count: i64) -> Self {
        self.downloads_count = Some(count);
        self
    }

    #[must_use]
    pub fn members(mut self, count: i64) -> Self {
        self.members_count = Some(count);
        self
    }

    #[must_use]
    pub fn episodes(mut self, count: i64) -> Self {
        self.episodes_count = Some(count);
        self
    }

    #[must_use]
    pub fn author(mut self, author_id: i64) -> Self {
        self.author_id = Some(author_id);
        self
    }

    #[must_use]
    pub fn categories(mut self, ids: &[i64]) -> Self {
        self.categories = ids.to_vec();
        self
    }

    /// Review status by name (`pending`, `approved`, `rejected`).
    #[must_use]
    pub fn status(mut self, status: &str) -> Self {
        self.status = EntryStatus::parse(status).expect("known entry status");
        self
    }

    #[must_use]
    pub fn unpublished(mut self) -> Self {
        self.published = false;
        self
    }

    #[must_use]
    pub fn updated(mut self, timestamp: &str) -> Self {
        self.updated_at = Some(timestamp.to_string());
        self
    }
}
