//! curate authors - Search author profiles
//!
//! Profiles carry no type, level or categories, so only the query, sort and
//! page apply. Apostrophes in names are kept as part of the word.

use clap::Args;

use super::search::{SearchRequest, run_search};
use crate::app::AppContext;
use crate::error::Result;
use crate::search::{AuthorCorpus, RawFacets};

#[derive(Args, Debug)]
pub struct AuthorsArgs {
    /// Name, handle or bio text
    pub query: Option<String>,

    /// Sort: recent (default), newest, oldest, popular (most visible entries)
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

pub fn run(ctx: &AppContext, args: &AuthorsArgs) -> Result<()> {
    let corpus = AuthorCorpus::new(ctx.config.search.author_rules());
    let request = SearchRequest {
        raw: RawFacets {
            q: args.query.clone(),
            sort: args.sort.clone(),
            page: args.page.clone(),
            ..RawFacets::default()
        },
        per_page: args.per_page,
        explain: args.explain,
    };
    run_search(ctx, &corpus, "authors", &request)
}
