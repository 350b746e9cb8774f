//! Corpus strategies.
//!
//! Content entries and author profiles run through the same pipeline. A
//! [`Corpus`] tells the pipeline where the visible rows live, which FTS5 table
//! indexes them, which facets exist, and how popularity is derived.

use super::facets::{EntryType, FacetSupport};
use super::sanitize::SanitizeRules;

/// Many-to-many link between a corpus and the category catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryLink {
    pub table: &'static str,
    pub item_column: &'static str,
    pub category_column: &'static str,
}

/// How a corpus derives its popularity number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Popularity {
    /// Pick a counter column by sub-type; every other sub-type counts as 0.
    BySubType {
        discriminator: &'static str,
        arms: Vec<(&'static str, &'static str)>,
    },
    /// A scalar SQL expression over the row (the alias is substituted for `{}`).
    Expression(&'static str),
    /// No popularity signal at all.
    Zero,
}

/// A searchable corpus.
pub trait Corpus {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// View holding only visible rows; the composer never reads anything else.
    fn base_view(&self) -> &'static str;

    /// Alias for the base view in generated SQL.
    fn alias(&self) -> &'static str;

    /// FTS5 table whose rowid equals the base view's `id`.
    fn fts_table(&self) -> &'static str;

    fn title_column(&self) -> &'static str;

    fn slug_column(&self) -> &'static str;

    /// Sub-type discriminator column, if the corpus has sub-types.
    fn type_column(&self) -> Option<&'static str> {
        None
    }

    /// Experience-level column, if the corpus has levels.
    fn level_column(&self) -> Option<&'static str> {
        None
    }

    fn category_link(&self) -> Option<CategoryLink> {
        None
    }

    fn sanitize_rules(&self) -> SanitizeRules;

    fn popularity(&self) -> Popularity;

    fn facet_support(&self) -> FacetSupport {
        FacetSupport {
            entry_type: self.type_column().is_some(),
            level: self.level_column().is_some(),
            category: self.category_link().is_some(),
        }
    }
}

/// Curated content entries (articles, gems, books, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryCorpus {
    rules: SanitizeRules,
}

impl EntryCorpus {
    #[must_use]
    pub const fn new(rules: SanitizeRules) -> Self {
        Self { rules }
    }
}

impl Default for EntryCorpus {
    fn default() -> Self {
        Self::new(SanitizeRules::CONTENT)
    }
}

impl Corpus for EntryCorpus {
    fn name(&self) -> &'static str {
        "entries"
    }

    fn base_view(&self) -> &'static str {
        "visible_entries"
    }

    fn alias(&self) -> &'static str {
        "e"
    }

    fn fts_table(&self) -> &'static str {
        "entries_fts"
    }

    fn title_column(&self) -> &'static str {
        "title"
    }

    fn slug_column(&self) -> &'static str {
        "slug"
    }

    fn type_column(&self) -> Option<&'static str> {
        Some("entry_type")
    }

    fn level_column(&self) -> Option<&'static str> {
        Some("level")
    }

    fn category_link(&self) -> Option<CategoryLink> {
        Some(CategoryLink {
            table: "entry_categories",
            item_column: "entry_id",
            category_column: "category_id",
        })
    }

    fn sanitize_rules(&self) -> SanitizeRules {
        self.rules
    }

    fn popularity(&self) -> Popularity {
        Popularity::BySubType {
            discriminator: "entry_type",
            arms: EntryType::ALL
                .into_iter()
                .filter_map(|kind| {
                    kind.popularity_column()
                        .map(|column| (kind.discriminator(), column))
                })
                .collect(),
        }
    }
}

/// Author profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorCorpus {
    rules: SanitizeRules,
}

impl AuthorCorpus {
    #[must_use]
    pub const fn new(rules: SanitizeRules) -> Self {
        Self { rules }
    }
}

impl Default for AuthorCorpus {
    fn default() -> Self {
        Self::new(SanitizeRules::PROFILES)
    }
}

impl Corpus for AuthorCorpus {
    fn name(&self) -> &'static str {
        "authors"
    }

    fn base_view(&self) -> &'static str {
        "visible_authors"
    }

    fn alias(&self) -> &'static str {
        "a"
    }

    fn fts_table(&self) -> &'static str {
        "authors_fts"
    }

    fn title_column(&self) -> &'static str {
        "name"
    }

    fn slug_column(&self) -> &'static str {
        "handle"
    }

    fn sanitize_rules(&self) -> SanitizeRules {
        self.rules
    }

    fn popularity(&self) -> Popularity {
        Popularity::Expression("(SELECT COUNT(*) FROM visible_entries ve WHERE ve.author_id = {}.id)")
    }
}
