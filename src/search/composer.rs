//! Search composer façade.
//!
//! Built once per request from untrusted input. Construction sanitizes the
//! text and resolves the facets; [`SearchComposer::call`] runs the filter
//! pipeline and the ranking engine and hands back a lazily paged
//! [`ResultCursor`]. Nothing touches the store until a page is requested.

use rusqlite::{Connection, Row, params_from_iter};
use serde::Serialize;
use tracing::{debug, trace};

use super::corpus::Corpus;
use super::facets::{self, CategoryCatalog, EntryType, Level, RawFacets, ResolvedFacets};
use super::filters::{self, PlanParam};
use super::ranking::{self, SearchPlan};
use super::sanitize::sanitize_with;
use crate::error::Result;

/// Rows per page when the caller does not configure one.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// One row of a result page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: i64,
    pub title: String,
    /// Entry slug or author handle.
    pub slug: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<EntryType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    pub updated_at: String,
    /// bm25 score; only present when a text query ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,
    pub popularity: i64,
}

fn hit_from_row(row: &Row<'_>) -> rusqlite::Result<SearchHit> {
    let entry_type: Option<String> = row.get(3)?;
    let level: Option<String> = row.get(4)?;
    Ok(SearchHit {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        entry_type: entry_type.as_deref().and_then(EntryType::from_discriminator),
        level: level.as_deref().and_then(Level::parse),
        updated_at: row.get(5)?,
        relevance: row.get(6)?,
        popularity: row.get(7)?,
    })
}

/// Per-request search over one corpus.
pub struct SearchComposer<'a> {
    conn: &'a Connection,
    corpus: &'a dyn Corpus,
    query: String,
    sanitized: String,
    facets: ResolvedFacets,
    per_page: u32,
}

impl std::fmt::Debug for SearchComposer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchComposer")
            .field("corpus", &self.corpus.name())
            .field("query", &self.query)
            .field("sanitized", &self.sanitized)
            .field("facets", &self.facets)
            .field("per_page", &self.per_page)
            .finish_non_exhaustive()
    }
}

impl<'a> SearchComposer<'a> {
    /// Sanitize the query and resolve the facets.
    ///
    /// Unknown facet values degrade to "absent"; only catalog failures error.
    pub fn new(
        conn: &'a Connection,
        catalog: &dyn CategoryCatalog,
        corpus: &'a dyn Corpus,
        raw: &RawFacets,
    ) -> Result<Self> {
        let query = raw.q.as_deref().unwrap_or_default().trim().to_string();
        let sanitized = sanitize_with(&query, corpus.sanitize_rules());
        let facets = facets::resolve(raw, corpus.facet_support(), catalog)?;

        debug!(
            corpus = corpus.name(),
            query = %query,
            sanitized = %sanitized,
            filters = %facets.describe(),
            sort = facets.sort.as_str(),
            page = facets.page,
            "composed search"
        );

        Ok(Self {
            conn,
            corpus,
            query,
            sanitized,
            facets,
            per_page: DEFAULT_PER_PAGE,
        })
    }

    /// Page size for the cursor (at least 1).
    #[must_use]
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// The trimmed raw query, for echoing back to the visitor.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The query as handed to FTS5; empty when nothing searchable remained.
    #[must_use]
    pub fn sanitized_query(&self) -> &str {
        &self.sanitized
    }

    #[must_use]
    pub const fn facets(&self) -> &ResolvedFacets {
        &self.facets
    }

    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Build the ordered statement without running it.
    #[must_use]
    pub fn plan(&self) -> SearchPlan {
        let filtered = filters::apply(self.corpus, &self.sanitized, &self.facets);
        ranking::order(filtered, self.corpus, &self.sanitized, self.facets.sort)
    }

    /// Ordered, deduplicated cursor positioned on the requested page.
    #[must_use]
    pub fn call(&self) -> ResultCursor<'a> {
        let plan = self.plan();
        debug!(
            corpus = self.corpus.name(),
            order = plan.order.as_str(),
            steps = ?plan.steps,
            params = plan.params.len(),
            "search plan ready"
        );
        ResultCursor {
            conn: self.conn,
            plan,
            per_page: self.per_page,
            current_page: self.facets.page,
        }
    }
}

/// Lazily paged result set. Each page is one `LIMIT/OFFSET` query.
#[derive(Debug)]
pub struct ResultCursor<'a> {
    conn: &'a Connection,
    plan: SearchPlan,
    per_page: u32,
    current_page: u32,
}

impl<'a> ResultCursor<'a> {
    #[must_use]
    pub const fn plan(&self) -> &SearchPlan {
        &self.plan
    }

    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Page selected by the request (1-based).
    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Rows of the page selected by the request.
    pub fn fetch(&self) -> Result<Vec<SearchHit>> {
        self.page(self.current_page)
    }

    /// Rows of page `page` (1-based; 0 is treated as 1).
    pub fn page(&self, page: u32) -> Result<Vec<SearchHit>> {
        let limit = i64::from(self.per_page);
        let offset = i64::from(page.max(1) - 1) * limit;
        let sql = format!("{} LIMIT ? OFFSET ?", self.plan.sql);
        trace!(sql = %sql, limit, offset, "executing search page");

        let params = self
            .plan
            .params
            .iter()
            .cloned()
            .chain([PlanParam::Int(limit), PlanParam::Int(offset)]);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), hit_from_row)?;
        let mut hits = Vec::new();
        for row in rows {
            hits.push(row?);
        }
        Ok(hits)
    }

    /// Identifiers of the selected page, in order.
    pub fn ids(&self) -> Result<Vec<i64>> {
        Ok(self.fetch()?.into_iter().map(|hit| hit.id).collect())
    }

    /// Total number of matching rows across all pages.
    pub fn count(&self) -> Result<u64> {
        trace!(sql = %self.plan.count_sql, "counting search results");
        let count: i64 = self.conn.query_row(
            &self.plan.count_sql,
            params_from_iter(self.plan.params.iter()),
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Number of pages needed for [`count`](Self::count) rows.
    pub fn page_count(&self) -> Result<u32> {
        let pages = self.count()?.div_ceil(u64::from(self.per_page));
        Ok(u32::try_from(pages).unwrap_or(u32::MAX))
    }

    /// Iterate pages from the first until one comes back short.
    #[must_use]
    pub const fn pages(&self) -> Pages<'_, 'a> {
        Pages {
            cursor: self,
            next: 1,
            done: false,
        }
    }
}

/// Iterator returned by [`ResultCursor::pages`].
#[derive(Debug)]
pub struct Pages<'c, 'a> {
    cursor: &'c ResultCursor<'a>,
    next: u32,
    done: bool,
}

impl Iterator for Pages<'_, '_> {
    type Item = Result<Vec<SearchHit>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.page(self.next) {
            Ok(hits) if hits.is_empty() => {
                self.done = true;
                None
            }
            Ok(hits) => {
                if hits.len() < self.cursor.per_page as usize {
                    self.done = true;
                }
                self.next += 1;
                Some(Ok(hits))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
