//! curate search - Search curated entries
//!
//! Free text plus the type, level and category facets. Facet values come
//! straight from the command line and are never rejected: anything the
//! directory does not know is ignored, the same way the web form treats a
//! hand-edited query string.

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{emit_json, robot_ok};
use crate::error::Result;
use crate::search::{
    Corpus, EntryCorpus, FilterStep, PlanParam, RawFacets, ResolvedFacets, SearchComposer,
    SearchHit, SortOrder,
};

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Free-text query (quote a phrase to match it exactly)
    pub query: Option<String>,

    /// Content type: article, gem, book, podcast, community, video, course, newsletter
    #[arg(long = "type", short = 't', value_name = "TYPE")]
    pub kind: Option<String>,

    /// Experience level: beginner, intermediate, advanced, all_levels
    #[arg(long, short)]
    pub level: Option<String>,

    /// Category slug; several slugs separated by commas match any of them
    #[arg(long, short)]
    pub category: Option<String>,

    /// Sort: recent (default), newest, oldest, popular, beginner_first
    #[arg(long, short)]
    pub sort: Option<String>,

    /// Page number, starting at 1
    #[arg(long, short)]
    pub page: Option<String>,

    /// Results per page (capped by search.max_per_page)
    #[arg(long)]
    pub per_page: Option<u32>,

    /// Include the generated SQL and its parameters
    #[arg(long)]
    pub explain: bool,
}

impl SearchArgs {
    /// The facets exactly as typed.
    #[must_use]
    pub fn raw_facets(&self) -> RawFacets {
        RawFacets {
            q: self.query.clone(),
            kind: self.kind.clone(),
            level: self.level.clone(),
            category: self.category.clone(),
            sort: self.sort.clone(),
            page: self.page.clone(),
        }
    }
}

pub fn run(ctx: &AppContext, args: &SearchArgs) -> Result<()> {
    let corpus = EntryCorpus::new(ctx.config.search.entry_rules());
    let request = SearchRequest {
        raw: args.raw_facets(),
        per_page: args.per_page,
        explain: args.explain,
    };
    run_search(ctx, &corpus, "entries", &request)
}

/// What a search subcommand hands to [`run_search`].
pub(crate) struct SearchRequest {
    pub raw: RawFacets,
    pub per_page: Option<u32>,
    pub explain: bool,
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    corpus: &'a str,
    query: &'a str,
    sanitized_query: &'a str,
    facets: &'a ResolvedFacets,
    filters: String,
    order: SortOrder,
    page: u32,
    per_page: u32,
    total: u64,
    pages: u32,
    results: Vec<SearchHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plan: Option<PlanOutput<'a>>,
}

#[derive(Serialize)]
struct PlanOutput<'a> {
    sql: &'a str,
    count_sql: &'a str,
    params: &'a [PlanParam],
    steps: &'a [FilterStep],
}

/// Compose, run and print one search over `corpus`.
pub(crate) fn run_search(
    ctx: &AppContext,
    corpus: &dyn Corpus,
    label: &str,
    request: &SearchRequest,
) -> Result<()> {
    let composer = SearchComposer::new(ctx.db.conn(), &ctx.db, corpus, &request.raw)?
        .with_per_page(ctx.config.search.page_size(request.per_page));
    let cursor = composer.call();
    let results = cursor.fetch()?;
    let total = cursor.count()?;
    let pages = cursor.page_count()?;
    let plan = cursor.plan();

    if ctx.robot_mode {
        let output = SearchOutput {
            corpus: label,
            query: composer.query(),
            sanitized_query: composer.sanitized_query(),
            facets: composer.facets(),
            filters: composer.facets().describe(),
            order: plan.order,
            page: cursor.current_page(),
            per_page: cursor.per_page(),
            total,
            pages,
            results,
            plan: request.explain.then(|| PlanOutput {
                sql: &plan.sql,
                count_sql: &plan.count_sql,
                params: &plan.params,
                steps: &plan.steps,
            }),
        };
        return emit_json(&robot_ok(output));
    }

    let summary = summary_line(
        label,
        composer.query(),
        &composer.facets().describe(),
        total,
        plan.order,
    );
    println!("{}", summary.bold());

    if results.is_empty() {
        println!();
        if total > 0 {
            println!(
                "{} Page {} is past the end ({pages} page{}).",
                "!".yellow(),
                cursor.current_page(),
                if pages == 1 { "" } else { "s" }
            );
        } else {
            println!("{} Nothing matched.", "!".yellow());
            println!("  Try fewer words, or drop a filter.");
        }
    } else {
        println!(
            "{}",
            format!("page {}/{pages}", cursor.current_page()).dimmed()
        );
        println!();
        let offset = u64::from(cursor.current_page().max(1) - 1) * u64::from(cursor.per_page());
        for (position, hit) in (offset + 1..).zip(&results) {
            print_hit(position, hit, ctx.verbosity > 0);
        }
    }

    if request.explain {
        println!();
        println!("{}", "SQL".bold());
        println!("{}", plan.sql.dimmed());
        println!("{} {:?}", "params".bold(), plan.params);
    }
    Ok(())
}

fn summary_line(label: &str, query: &str, filters: &str, total: u64, order: SortOrder) -> String {
    let mut line = format!("{total} {label}");
    if !query.is_empty() {
        line.push_str(&format!(" for '{query}'"));
    }
    if !filters.is_empty() {
        line.push_str(&format!(" in {filters}"));
    }
    line.push_str(&format!(", by {}", order.as_str().replace('_', " ")));
    line
}

fn print_hit(position: u64, hit: &SearchHit, show_score: bool) {
    let mut tags = Vec::new();
    if let Some(kind) = hit.entry_type {
        tags.push(kind.discriminator().to_lowercase());
    }
    if let Some(level) = hit.level {
        tags.push(level.label().to_string());
    }

    println!(
        "{:>4}. {}  {}",
        position,
        hit.title.bold(),
        tags.join(" · ").cyan()
    );

    let mut detail = format!("{} · updated {}", hit.slug, hit.updated_at);
    if hit.popularity > 0 {
        detail.push_str(&format!(" · popularity {}", hit.popularity));
    }
    if show_score {
        if let Some(score) = hit.relevance {
            detail.push_str(&format!(" · bm25 {score:.3}"));
        }
    }
    println!("      {}", detail.dimmed());
}
