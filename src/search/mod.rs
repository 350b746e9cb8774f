//! Search composer for the curated directory
//!
//! Turns a free-text query plus facet selections into one ordered,
//! deduplicated SQL statement over an FTS5-indexed corpus.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │              RawFacets { q, type, level, category, sort }      │
//! └────────────────────────────────────────────────────────────────┘
//!                     │                          │
//!                     ▼                          ▼
//! ┌──────────────────────────────┐  ┌──────────────────────────────┐
//! │       sanitize.rs            │  │       facets.rs              │
//! │   (FTS5-safe query text)     │  │   (closed vocabularies)      │
//! └──────────────────────────────┘  └──────────────────────────────┘
//!                     │                          │
//!                     └──────────┬───────────────┘
//!                                ▼
//!                ┌───────────────────────────────┐
//!                │   filters.rs (fixed order)    │
//!                └───────────────────────────────┘
//!                                │
//!                                ▼
//!                ┌───────────────────────────────┐
//!                │   ranking.rs (ORDER BY)       │
//!                └───────────────────────────────┘
//!                                │
//!                                ▼
//!                     ResultCursor (composer.rs)
//! ```
//!
//! Both corpora (entries and authors) share the pipeline; a [`Corpus`]
//! strategy supplies the tables, facets and popularity signal.

pub mod composer;
pub mod corpus;
pub mod facets;
pub mod filters;
pub mod ranking;
pub mod sanitize;

pub use composer::{DEFAULT_PER_PAGE, Pages, ResultCursor, SearchComposer, SearchHit};
pub use corpus::{AuthorCorpus, CategoryLink, Corpus, EntryCorpus, Popularity};
pub use facets::{
    Category, CategoryCatalog, EntryType, FacetSupport, Level, RawFacets, ResolvedFacets,
    SortMode,
};
pub use filters::{FilterStep, FilteredQuery, PlanParam};
pub use ranking::{SearchPlan, SortOrder};
pub use sanitize::{SanitizeRules, sanitize, sanitize_with};
