//! Filter pipeline.
//!
//! Narrows a corpus's visible rows in a fixed order:
//!
//! 1. Text: FTS5 `MATCH`, carrying the bm25 relevance forward
//! 2. Type: sub-type discriminator equality
//! 3. Level: selected level or the `all_levels` wildcard
//! 4. Category: many-to-many join against the selected categories
//! 5. Distinct: collapse rows the category join multiplied
//!
//! Every step is a conjunct on the same statement, so later filters always
//! intersect with the text match instead of replacing it.

use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;
use serde::Serialize;

use super::corpus::Corpus;
use super::facets::{Level, ResolvedFacets};

/// Alias of the CTE holding text matches and their relevance.
pub const MATCHES_ALIAS: &str = "m";

/// Alias of the category join table.
const CATEGORY_ALIAS: &str = "ic";

/// Bound parameter of a generated statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlanParam {
    Int(i64),
    Text(String),
}

impl ToSql for PlanParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Self::Int(value) => value.to_sql(),
            Self::Text(value) => value.to_sql(),
        }
    }
}

/// A pipeline step that contributed to the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterStep {
    Text,
    Type,
    Level,
    Category,
    Distinct,
}

/// Output of the pipeline: everything of the statement except projection and
/// ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredQuery {
    pub with_clause: Option<String>,
    pub from: String,
    pub joins: Vec<String>,
    pub conditions: Vec<String>,
    pub params: Vec<PlanParam>,
    pub distinct: bool,
    pub steps: Vec<FilterStep>,
}

impl FilteredQuery {
    /// Whether a text match ran, i.e. a relevance value exists per row.
    #[must_use]
    pub fn has_relevance(&self) -> bool {
        self.steps.contains(&FilterStep::Text)
    }

    /// Relevance expression for the projection.
    #[must_use]
    pub fn relevance_expr(&self) -> String {
        if self.has_relevance() {
            format!("{MATCHES_ALIAS}.relevance")
        } else {
            "NULL".to_string()
        }
    }

    /// `FROM … JOIN … WHERE …` part of the statement.
    #[must_use]
    pub fn source_sql(&self) -> String {
        let mut sql = format!("FROM {}", self.from);
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
        sql
    }
}

/// Run the pipeline for one corpus.
#[must_use]
pub fn apply(corpus: &dyn Corpus, sanitized_query: &str, facets: &ResolvedFacets) -> FilteredQuery {
    let alias = corpus.alias();
    let mut filtered = FilteredQuery {
        with_clause: None,
        from: format!("{} {alias}", corpus.base_view()),
        joins: Vec::new(),
        conditions: Vec::new(),
        params: Vec::new(),
        distinct: false,
        steps: Vec::new(),
    };

    if !sanitized_query.is_empty() {
        let fts = corpus.fts_table();
        filtered.with_clause = Some(format!(
            "WITH matches AS (SELECT rowid AS item_id, bm25({fts}) AS relevance \
             FROM {fts} WHERE {fts} MATCH ?)"
        ));
        filtered.joins.push(format!(
            "JOIN matches {MATCHES_ALIAS} ON {MATCHES_ALIAS}.item_id = {alias}.id"
        ));
        filtered
            .params
            .push(PlanParam::Text(sanitized_query.to_string()));
        filtered.steps.push(FilterStep::Text);
    }

    if let (Some(column), Some(kind)) = (corpus.type_column(), facets.entry_type) {
        filtered.conditions.push(format!("{alias}.{column} = ?"));
        filtered
            .params
            .push(PlanParam::Text(kind.discriminator().to_string()));
        filtered.steps.push(FilterStep::Type);
    }

    if let (Some(column), Some(level)) = (corpus.level_column(), facets.level) {
        filtered.conditions.push(format!("{alias}.{column} IN (?, ?)"));
        filtered
            .params
            .push(PlanParam::Text(level.as_str().to_string()));
        filtered
            .params
            .push(PlanParam::Text(Level::AllLevels.as_str().to_string()));
        filtered.steps.push(FilterStep::Level);
    }

    if let Some(link) = corpus
        .category_link()
        .filter(|_| !facets.categories.is_empty())
    {
        filtered.joins.push(format!(
            "JOIN {} {CATEGORY_ALIAS} ON {CATEGORY_ALIAS}.{} = {alias}.id",
            link.table, link.item_column
        ));
        let placeholders = vec!["?"; facets.categories.len()].join(", ");
        filtered.conditions.push(format!(
            "{CATEGORY_ALIAS}.{} IN ({placeholders})",
            link.category_column
        ));
        filtered
            .params
            .extend(facets.categories.iter().map(|c| PlanParam::Int(c.id)));
        filtered.steps.push(FilterStep::Category);
    }

    filtered.distinct = true;
    filtered.steps.push(FilterStep::Distinct);

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::corpus::{AuthorCorpus, EntryCorpus};
    use crate::search::facets::{Category, EntryType};

    fn category(id: i64, slug: &str) -> Category {
        Category {
            id,
            slug: slug.to_string(),
            name: slug.to_string(),
        }
    }

    #[test]
    fn no_input_only_dedups() {
        let filtered = apply(&EntryCorpus::default(), "", &ResolvedFacets::default());

        assert_eq!(filtered.steps, vec![FilterStep::Distinct]);
        assert!(filtered.with_clause.is_none());
        assert!(filtered.params.is_empty());
        assert!(!filtered.has_relevance());
        assert_eq!(filtered.relevance_expr(), "NULL");
        assert_eq!(filtered.source_sql(), "FROM visible_entries e");
    }

    #[test]
    fn steps_run_in_fixed_order() {
        let facets = ResolvedFacets {
            entry_type: Some(EntryType::Gem),
            level: Some(Level::Beginner),
            categories: vec![category(7, "web"), category(9, "testing")],
            ..ResolvedFacets::default()
        };
        let filtered = apply(&EntryCorpus::default(), "rails*", &facets);

        assert_eq!(
            filtered.steps,
            vec![
                FilterStep::Text,
                FilterStep::Type,
                FilterStep::Level,
                FilterStep::Category,
                FilterStep::Distinct,
            ]
        );
        assert_eq!(
            filtered.params,
            vec![
                PlanParam::Text("rails*".into()),
                PlanParam::Text("Gem".into()),
                PlanParam::Text("beginner".into()),
                PlanParam::Text("all_levels".into()),
                PlanParam::Int(7),
                PlanParam::Int(9),
            ]
        );
    }

    #[test]
    fn text_match_is_a_join_not_a_replacement() {
        let filtered = apply(&EntryCorpus::default(), "rails*", &ResolvedFacets::default());

        let with = filtered.with_clause.as_deref().unwrap();
        assert!(with.contains("bm25(entries_fts) AS relevance"));
        assert!(with.contains("entries_fts MATCH ?"));
        assert_eq!(
            filtered.source_sql(),
            "FROM visible_entries e JOIN matches m ON m.item_id = e.id"
        );
        assert_eq!(filtered.relevance_expr(), "m.relevance");
    }

    #[test]
    fn level_filter_widens_to_all_levels() {
        let facets = ResolvedFacets {
            level: Some(Level::Advanced),
            ..ResolvedFacets::default()
        };
        let filtered = apply(&EntryCorpus::default(), "", &facets);

        assert_eq!(filtered.conditions, vec!["e.level IN (?, ?)".to_string()]);
        assert_eq!(
            filtered.params,
            vec![
                PlanParam::Text("advanced".into()),
                PlanParam::Text("all_levels".into()),
            ]
        );
    }

    #[test]
    fn category_filter_joins_link_table() {
        let facets = ResolvedFacets {
            categories: vec![category(3, "web")],
            ..ResolvedFacets::default()
        };
        let filtered = apply(&EntryCorpus::default(), "", &facets);

        assert_eq!(
            filtered.source_sql(),
            "FROM visible_entries e JOIN entry_categories ic ON ic.entry_id = e.id \
             WHERE ic.category_id IN (?)"
        );
    }

    #[test]
    fn author_corpus_ignores_entry_facets() {
        let facets = ResolvedFacets {
            entry_type: Some(EntryType::Book),
            level: Some(Level::Beginner),
            categories: vec![category(1, "web")],
            ..ResolvedFacets::default()
        };
        let filtered = apply(&AuthorCorpus::default(), "matz*", &facets);

        assert_eq!(filtered.steps, vec![FilterStep::Text, FilterStep::Distinct]);
        assert_eq!(
            filtered.source_sql(),
            "FROM visible_authors a JOIN matches m ON m.item_id = a.id"
        );
        assert!(filtered
            .with_clause
            .unwrap()
            .contains("authors_fts MATCH ?"));
    }
}
