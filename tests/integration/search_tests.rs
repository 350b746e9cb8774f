//! Composer behavior over a small, fully known directory.

use curate::search::{
    AuthorCorpus, EntryCorpus, EntryType, Level, RawFacets, SearchComposer, SortOrder,
};
use curate::test_utils::{CorpusFixture, EntrySeed};

struct Scenario {
    fixture: CorpusFixture,
    rails: i64,
    sinatra: i64,
    testing: i64,
    web_category: String,
}

/// Three items: two gems in a web category, one book elsewhere.
fn scenario() -> Scenario {
    let mut fixture = CorpusFixture::new();
    let web = fixture.category("web", "Web");
    let guides = fixture.category("guides", "Guides");

    let rails = fixture.entry(
        EntrySeed::new("Rails Framework")
            .description("Full-stack web framework")
            .kind(EntryType::Gem)
            .level(Level::Beginner)
            .downloads(1_000)
            .categories(&[web.id]),
    );
    let sinatra = fixture.entry(
        EntrySeed::new("Sinatra web microframework")
            .kind(EntryType::Gem)
            .level(Level::Intermediate)
            .downloads(300)
            .categories(&[web.id]),
    );
    let testing = fixture.entry(
        EntrySeed::new("Testing guide")
            .kind(EntryType::Book)
            .level(Level::Intermediate)
            .categories(&[guides.id]),
    );
    fixture.filler(6);

    Scenario {
        fixture,
        rails,
        sinatra,
        testing,
        web_category: web.slug,
    }
}

fn run(fixture: &CorpusFixture, raw: &RawFacets) -> Vec<i64> {
    let corpus = EntryCorpus::default();
    SearchComposer::new(fixture.db().conn(), fixture.db(), &corpus, raw)
        .unwrap()
        .call()
        .ids()
        .unwrap()
}

#[test]
fn text_and_category_return_both_gems_by_relevance() {
    let s = scenario();
    let raw = RawFacets::query("web").with_category(s.web_category.clone());

    let corpus = EntryCorpus::default();
    let composer = SearchComposer::new(s.fixture.db().conn(), s.fixture.db(), &corpus, &raw).unwrap();
    let cursor = composer.call();
    let hits = cursor.fetch().unwrap();

    let mut ids: Vec<i64> = hits.iter().map(|hit| hit.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![s.rails, s.sinatra]);
    assert_eq!(cursor.plan().order, SortOrder::Relevance);

    let scores: Vec<f64> = hits.iter().map(|hit| hit.relevance.unwrap()).collect();
    assert!(scores.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn type_and_level_return_only_the_beginner_gem() {
    let s = scenario();
    let found = run(&s.fixture, &RawFacets::default().with_type("gem").with_level("beginner"));
    assert_eq!(found, vec![s.rails]);
}

#[test]
fn explicit_sort_overrides_relevance() {
    let s = scenario();
    let raw = RawFacets::query("web").with_sort("popular");
    assert_eq!(run(&s.fixture, &raw), vec![s.rails, s.sinatra]);
}

#[test]
fn default_listing_is_newest_first() {
    let s = scenario();
    let found = run(&s.fixture, &RawFacets::default().with_type("gem"));
    assert_eq!(found, vec![s.sinatra, s.rails]);

    let found = run(&s.fixture, &RawFacets::default().with_type("gem").with_sort("oldest"));
    assert_eq!(found, vec![s.rails, s.sinatra]);
}

#[test]
fn beginner_first_puts_beginners_ahead() {
    let s = scenario();
    let found = run(
        &s.fixture,
        &RawFacets::default()
            .with_category("web,guides")
            .with_sort("beginner_first"),
    );
    assert_eq!(found.first(), Some(&s.rails));
    assert_eq!(found.len(), 3);
    assert!(found.contains(&s.testing));
}

#[test]
fn empty_after_sanitizing_lists_everything() {
    let s = scenario();
    let everything = run(&s.fixture, &RawFacets::default());
    let punctuation = run(&s.fixture, &RawFacets::query("()\"*:^-"));
    assert_eq!(punctuation, everything);
    assert_eq!(everything.len(), 9);
}

#[test]
fn pages_walk_the_whole_result_set() {
    let s = scenario();
    let corpus = EntryCorpus::default();
    let composer = SearchComposer::new(s.fixture.db().conn(), s.fixture.db(), &corpus, &RawFacets::default())
        .unwrap()
        .with_per_page(4);
    let cursor = composer.call();

    let pages: Vec<Vec<i64>> = cursor
        .pages()
        .map(|page| page.unwrap().into_iter().map(|hit| hit.id).collect())
        .collect();
    assert_eq!(pages.iter().map(Vec::len).collect::<Vec<_>>(), vec![4, 4, 1]);
    assert_eq!(cursor.count().unwrap(), 9);
    assert_eq!(cursor.page_count().unwrap(), 3);

    let flattened: Vec<i64> = pages.concat();
    let single = run(&s.fixture, &RawFacets::default().with_page(1));
    assert_eq!(&flattened[..single.len()], &single[..]);
}

#[test]
fn authors_match_names_with_apostrophes() {
    let mut fixture = CorpusFixture::new();
    let obrien = fixture.author("pat-obrien", "Pat O'Brien");
    fixture.author("dhh", "David Heinemeier Hansson");
    fixture.author("jeremy", "Jeremy Evans");

    let corpus = AuthorCorpus::default();
    let raw = RawFacets::query("O'Brien").with_type("gem").with_level("beginner");
    let composer = SearchComposer::new(fixture.db().conn(), fixture.db(), &corpus, &raw).unwrap();

    assert_eq!(composer.sanitized_query(), "\"O'Brien\"*");
    assert!(!composer.facets().is_filtered());
    assert_eq!(composer.call().ids().unwrap(), vec![obrien]);
}
