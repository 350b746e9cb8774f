//! Facet vocabularies and the facet value resolver.
//!
//! Raw facet values arrive as untrusted strings. Every facet resolves to a
//! closed Rust type or to "absent": an unknown type, level or category slug
//! never raises, it simply drops that filter. An unknown sort falls back to
//! [`SortMode::Recent`].

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Result;

/// Content sub-type of an entry.
///
/// The slug is what appears in URLs and query strings, the discriminator is
/// what the store keeps in `entries.entry_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Article,
    Gem,
    Book,
    Podcast,
    Community,
    Video,
    Course,
    Newsletter,
}

impl EntryType {
    pub const ALL: [Self; 8] = [
        Self::Article,
        Self::Gem,
        Self::Book,
        Self::Podcast,
        Self::Community,
        Self::Video,
        Self::Course,
        Self::Newsletter,
    ];

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Gem => "gem",
            Self::Book => "book",
            Self::Podcast => "podcast",
            Self::Community => "community",
            Self::Video => "video",
            Self::Course => "course",
            Self::Newsletter => "newsletter",
        }
    }

    #[must_use]
    pub const fn discriminator(self) -> &'static str {
        match self {
            Self::Article => "Article",
            Self::Gem => "Gem",
            Self::Book => "Book",
            Self::Podcast => "Podcast",
            Self::Community => "Community",
            Self::Video => "Video",
            Self::Course => "Course",
            Self::Newsletter => "Newsletter",
        }
    }

    /// Column holding this sub-type's natural popularity signal, if any.
    #[must_use]
    pub const fn popularity_column(self) -> Option<&'static str> {
        match self {
            Self::Gem => Some("downloads_count"),
            Self::Community => Some("members_count"),
            Self::Podcast => Some("episodes_count"),
            Self::Article | Self::Book | Self::Video | Self::Course | Self::Newsletter => None,
        }
    }

    /// Parse a public slug (case-insensitive).
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        let slug = slug.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.slug() == slug)
    }

    #[must_use]
    pub fn from_discriminator(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.discriminator() == value)
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.discriminator())
    }
}

/// Experience level. `AllLevels` is the wildcard that every level filter
/// also accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
    AllLevels,
}

impl Level {
    pub const ALL: [Self; 4] = [
        Self::Beginner,
        Self::Intermediate,
        Self::Advanced,
        Self::AllLevels,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::AllLevels => "all_levels",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
            Self::AllLevels => "All levels",
        }
    }

    /// Position in the `beginner_first` ordering.
    #[must_use]
    pub const fn sort_rank(self) -> u8 {
        match self {
            Self::Beginner => 0,
            Self::Intermediate => 1,
            Self::Advanced => 2,
            Self::AllLevels => 3,
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|level| level.as_str() == value)
    }
}

/// Ordering requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Recent,
    Newest,
    Oldest,
    Popular,
    BeginnerFirst,
}

impl SortMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Popular => "popular",
            Self::BeginnerFirst => "beginner_first",
        }
    }

    /// Parse a sort value, falling back to `Recent` for anything unknown.
    #[must_use]
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("newest") => Self::Newest,
            Some("oldest") => Self::Oldest,
            Some("popular") => Self::Popular,
            Some("beginner_first") => Self::BeginnerFirst,
            _ => Self::Recent,
        }
    }

    /// Whether this mode lets relevance take over when a query is present.
    #[must_use]
    pub const fn yields_to_relevance(self) -> bool {
        matches!(self, Self::Recent | Self::Newest)
    }
}

/// A category from the reference catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

/// Read-only lookup of categories by slug.
///
/// Implemented by [`crate::storage::Database`]; lookups hit the store on every
/// call and are never cached.
pub trait CategoryCatalog {
    fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>>;
}

/// Untrusted facet input, exactly as it arrives from a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFacets {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

impl RawFacets {
    #[must_use]
    pub fn query(q: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: impl ToString) -> Self {
        self.page = Some(page.to_string());
        self
    }
}

/// Which facets a corpus understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacetSupport {
    pub entry_type: bool,
    pub level: bool,
    pub category: bool,
}

impl FacetSupport {
    pub const ALL: Self = Self {
        entry_type: true,
        level: true,
        category: true,
    };

    pub const NONE: Self = Self {
        entry_type: false,
        level: false,
        category: false,
    };
}

/// Validated facet values for one search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedFacets {
    #[serde(rename = "type")]
    pub entry_type: Option<EntryType>,
    pub level: Option<Level>,
    pub categories: Vec<Category>,
    pub sort: SortMode,
    pub page: u32,
}

impl Default for ResolvedFacets {
    fn default() -> Self {
        Self {
            entry_type: None,
            level: None,
            categories: Vec::new(),
            sort: SortMode::default(),
            page: 1,
        }
    }
}

impl ResolvedFacets {
    /// True when at least one narrowing facet (type, level, category) is set.
    #[must_use]
    pub fn is_filtered(&self) -> bool {
        self.entry_type.is_some() || self.level.is_some() || !self.categories.is_empty()
    }

    /// Human-readable summary of the active filters, e.g. `Beginner × Testing`.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(kind) = self.entry_type {
            parts.push(kind.discriminator());
        }
        if let Some(level) = self.level {
            parts.push(level.label());
        }
        parts.extend(self.categories.iter().map(|c| c.name.as_str()));
        parts.join(" × ")
    }
}

/// Resolve raw facet input against the closed vocabularies and the catalog.
///
/// Facets the corpus does not support are ignored without a lookup. Catalog
/// failures propagate; unknown values never do.
pub fn resolve(
    raw: &RawFacets,
    support: FacetSupport,
    catalog: &dyn CategoryCatalog,
) -> Result<ResolvedFacets> {
    let entry_type = if support.entry_type {
        raw.kind.as_deref().and_then(EntryType::from_slug)
    } else {
        None
    };

    let level = if support.level {
        raw.level.as_deref().and_then(Level::parse)
    } else {
        None
    };

    let categories = match raw.category.as_deref() {
        Some(value) if support.category => resolve_categories(value, catalog)?,
        _ => Vec::new(),
    };

    let sort = SortMode::parse_or_default(raw.sort.as_deref());
    let page = parse_page(raw.page.as_deref());

    trace!(
        ?entry_type,
        ?level,
        categories = categories.len(),
        sort = sort.as_str(),
        page,
        "resolved facets"
    );

    Ok(ResolvedFacets {
        entry_type,
        level,
        categories,
        sort,
        page,
    })
}

fn resolve_categories(value: &str, catalog: &dyn CategoryCatalog) -> Result<Vec<Category>> {
    let mut categories: Vec<Category> = Vec::new();
    for slug in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if categories.iter().any(|c| c.slug == slug) {
            continue;
        }
        if let Some(category) = catalog.find_category_by_slug(slug)? {
            categories.push(category);
        }
    }
    Ok(categories)
}

fn parse_page(value: Option<&str>) -> u32 {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}
