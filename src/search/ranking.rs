//! Ranking and sort engine.
//!
//! Picks the ORDER BY for a filtered query and projects the sort keys it
//! needs. All keys are SQL expressions evaluated by the store per row, so
//! LIMIT/OFFSET paging stays correct for every ordering.
//!
//! | query | sort                      | ordering                               |
//! |-------|---------------------------|----------------------------------------|
//! | yes   | recent / newest / default | relevance, then newest update          |
//! | no    | recent / newest / default | newest update                          |
//! | any   | oldest                    | oldest update                          |
//! | any   | popular                   | popularity, then newest update         |
//! | any   | beginner_first            | level rank, then newest update         |
//!
//! An explicit non-default sort always wins over relevance. Every ordering
//! ends with the row id so fully tied rows keep a stable order.

use serde::Serialize;

use super::corpus::{Corpus, Popularity};
use super::facets::{Level, SortMode};
use super::filters::{FilterStep, FilteredQuery, PlanParam};

/// Level rank for rows with no applicable level.
pub const UNRANKED_LEVEL: u8 = 4;

/// The ordering actually applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Relevance,
    Recent,
    Oldest,
    Popular,
    BeginnerFirst,
}

impl SortOrder {
    /// Decide the ordering from the query state and the requested sort.
    #[must_use]
    pub const fn choose(has_query: bool, sort: SortMode) -> Self {
        match sort {
            SortMode::Recent | SortMode::Newest if has_query => Self::Relevance,
            SortMode::Recent | SortMode::Newest => Self::Recent,
            SortMode::Oldest => Self::Oldest,
            SortMode::Popular => Self::Popular,
            SortMode::BeginnerFirst => Self::BeginnerFirst,
        }
    }

    /// ORDER BY over the projected column names.
    #[must_use]
    pub const fn order_by(self) -> &'static str {
        match self {
            // bm25: more negative is more relevant, so ascending keeps FTS5's order
            Self::Relevance => "relevance ASC, updated_at DESC, id DESC",
            Self::Recent => "updated_at DESC, id DESC",
            Self::Oldest => "updated_at ASC, id ASC",
            Self::Popular => "popularity DESC, updated_at DESC, id DESC",
            Self::BeginnerFirst => "level_rank ASC, updated_at DESC, id DESC",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Recent => "recent",
            Self::Oldest => "oldest",
            Self::Popular => "popular",
            Self::BeginnerFirst => "beginner_first",
        }
    }
}

/// A finished statement, ready to be paged.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    /// Ordered statement without LIMIT/OFFSET.
    pub sql: String,
    /// `COUNT(*)` over the same rows.
    pub count_sql: String,
    pub params: Vec<PlanParam>,
    pub order: SortOrder,
    pub steps: Vec<FilterStep>,
}

/// Per-row popularity expression.
#[must_use]
pub fn popularity_sql(alias: &str, popularity: &Popularity) -> String {
    match popularity {
        Popularity::BySubType { arms, .. } if arms.is_empty() => "0".to_string(),
        Popularity::BySubType {
            discriminator,
            arms,
        } => {
            let mut sql = format!("CASE {alias}.{discriminator}");
            for (value, column) in arms {
                sql.push_str(&format!(" WHEN '{value}' THEN COALESCE({alias}.{column}, 0)"));
            }
            sql.push_str(" ELSE 0 END");
            sql
        }
        Popularity::Expression(template) => template.replace("{}", alias),
        Popularity::Zero => "0".to_string(),
    }
}

/// Level rank expression for `beginner_first`.
#[must_use]
pub fn level_rank_sql(level_expr: Option<&str>) -> String {
    let Some(level_expr) = level_expr else {
        return UNRANKED_LEVEL.to_string();
    };
    let mut sql = format!("CASE {level_expr}");
    for level in Level::ALL {
        sql.push_str(&format!(" WHEN '{}' THEN {}", level.as_str(), level.sort_rank()));
    }
    sql.push_str(&format!(" ELSE {UNRANKED_LEVEL} END"));
    sql
}

/// Project the sort keys and attach the ordering to a filtered query.
#[must_use]
pub fn order(
    filtered: FilteredQuery,
    corpus: &dyn Corpus,
    sanitized_query: &str,
    sort: SortMode,
) -> SearchPlan {
    let order = SortOrder::choose(!sanitized_query.is_empty() && filtered.has_relevance(), sort);
    let alias = corpus.alias();
    let column = |name: Option<&str>| {
        name.map_or_else(|| "NULL".to_string(), |c| format!("{alias}.{c}"))
    };
    let level_expr = corpus.level_column().map(|c| format!("{alias}.{c}"));

    let projection = [
        format!("{alias}.id AS id"),
        format!("{alias}.{} AS title", corpus.title_column()),
        format!("{alias}.{} AS slug", corpus.slug_column()),
        format!("{} AS entry_type", column(corpus.type_column())),
        format!("{} AS level", column(corpus.level_column())),
        format!("{alias}.updated_at AS updated_at"),
        format!("{} AS relevance", filtered.relevance_expr()),
        format!("{} AS popularity", popularity_sql(alias, &corpus.popularity())),
        format!("{} AS level_rank", level_rank_sql(level_expr.as_deref())),
    ]
    .join(", ");

    let select = if filtered.distinct {
        "SELECT DISTINCT"
    } else {
        "SELECT"
    };
    let body = format!("{select} {projection} {}", filtered.source_sql());
    let with = filtered
        .with_clause
        .as_ref()
        .map(|w| format!("{w} "))
        .unwrap_or_default();

    SearchPlan {
        sql: format!("{with}{body} ORDER BY {}", order.order_by()),
        count_sql: format!("{with}SELECT COUNT(*) FROM ({body})"),
        params: filtered.params,
        order,
        steps: filtered.steps,
    }
}
