use std::sync::Arc;
use std::time::Duration;

use docfind_core::config::IndexConfig;
use docfind_core::content::{
    AllowAll, ContentEvent, ContentRef, DenyAll, MemoryProvider, ProviderRegistry,
};
use docfind_core::engine::{ContentIndexEngine, FetchHighlightsRequest, FindInContentRequest};
use docfind_core::error::ContentIndexError;
use docfind_core::index::{IndexState, IndexStore, QueryBuilder};
use docfind_core::matching::{MatchLocation, MatchSpec, MatchType};
use tantivy::collector::Count;
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(30);

// Fields drop in order, so the engine stops before its directory is removed.
struct Fixture {
    engine: ContentIndexEngine,
    scripts: Arc<MemoryProvider>,
    _dir: TempDir,
}

fn fixture(seed: impl FnOnce(&MemoryProvider)) -> Fixture {
    let dir = TempDir::new().unwrap();
    let scripts = Arc::new(MemoryProvider::new("script"));
    seed(&scripts);

    let engine = ContentIndexEngine::new(
        IndexConfig::new(dir.path().join("index")),
        ProviderRegistry::new().with(scripts.clone()),
    );
    engine.await_ready(WAIT).unwrap();
    Fixture { engine, scripts, _dir: dir }
}

fn find(engine: &ContentIndexEngine, spec: MatchSpec) -> Vec<(String, MatchLocation)> {
    engine
        .find_in_content(&FindInContentRequest::new(spec), &AllowAll)
        .unwrap()
        .values
        .into_iter()
        .map(|m| (m.content.uuid, m.location))
        .collect()
}

fn uuids(engine: &ContentIndexEngine, spec: MatchSpec) -> Vec<String> {
    let mut found: Vec<_> = find(engine, spec).into_iter().map(|(uuid, _)| uuid).collect();
    found.sort();
    found
}

#[test]
fn contains_finds_quick_brown_fox() {
    let fx = fixture(|p| {
        p.put("1", "Fox", "js", "The quick brown fox");
        p.put("2", "Dog", "js", "The lazy dog");
    });

    let found = find(&fx.engine, MatchSpec::contains("QUICK"));
    assert_eq!(found, vec![("1".to_string(), MatchLocation::new(4, 5))]);
}

#[test]
fn highlights_quick_brown_fox() {
    let fx = fixture(|p| {
        p.put("1", "Fox", "js", "The quick brown fox");
    });

    let request = FetchHighlightsRequest {
        content: ContentRef::new("script", "1"),
        extension: "js".into(),
        filter: MatchSpec::contains("quick"),
    };
    let highlights = fx.engine.fetch_highlights(&request, &AllowAll).unwrap().unwrap();
    assert_eq!(highlights.highlights, vec![MatchLocation::new(4, 5)]);
    assert_eq!(highlights.text, "The quick brown fox");
}

#[test]
fn case_sensitive_contains_uses_exact_case() {
    let fx = fixture(|p| {
        p.put("1", "Upper", "js", "Hello World");
        p.put("2", "Lower", "js", "hello world");
    });

    assert_eq!(uuids(&fx.engine, MatchSpec::contains("World").case_sensitive(true)), vec!["1"]);
    assert_eq!(uuids(&fx.engine, MatchSpec::contains("World")), vec!["1", "2"]);
}

#[test]
fn equals_and_boundaries_are_verified() {
    let fx = fixture(|p| {
        p.put("1", "Exact", "js", "abc");
        p.put("2", "Longer", "js", "xabcx");
        p.put("3", "Prefix", "js", "abcx");
    });

    assert_eq!(uuids(&fx.engine, MatchSpec::equals("ABC")), vec!["1"]);
    assert_eq!(uuids(&fx.engine, MatchSpec::new(MatchType::StartsWith, "abc")), vec!["1", "3"]);
    assert_eq!(uuids(&fx.engine, MatchSpec::new(MatchType::EndsWith, "abc")), vec!["1"]);
    assert_eq!(uuids(&fx.engine, MatchSpec::new(MatchType::NotEquals, "abc")), vec!["2", "3"]);
}

#[test]
fn regex_anchor_is_case_sensitive() {
    let fx = fixture(|p| {
        p.put("1", "Starts", "js", "abcdef");
        p.put("2", "Inner", "js", "xabc");
        p.put("3", "Upper", "js", "ABCdef");
    });

    let found = find(&fx.engine, MatchSpec::regex("/^abc/").case_sensitive(true));
    assert_eq!(found, vec![("1".to_string(), MatchLocation::new(0, 3))]);

    assert_eq!(uuids(&fx.engine, MatchSpec::regex("^abc")), vec!["1", "3"]);
}

#[test]
fn regex_spans_newlines_and_alternation() {
    let fx = fixture(|p| {
        p.put("1", "Multi", "js", "first line\nsecond line");
        p.put("2", "Other", "js", "nothing here");
    });

    assert_eq!(uuids(&fx.engine, MatchSpec::regex("second|third")), vec!["1"]);
    assert_eq!(uuids(&fx.engine, MatchSpec::regex("line$")), vec!["1"]);
}

#[test]
fn regex_beyond_index_automaton_still_matches() {
    let fx = fixture(|p| {
        p.put("1", "Fox", "js", "The quick brown fox jumps over the lazy dog\nÉCOLE");
        p.put("2", "Foxes", "js", "foxes and dogs");
        p.set_tags("1", ["prod"]);
    });

    let found = find(&fx.engine, MatchSpec::regex(r"\bfox\b"));
    assert_eq!(found, vec![("1".to_string(), MatchLocation::new(16, 3))]);

    assert_eq!(uuids(&fx.engine, MatchSpec::regex("fox.*?dog")), vec!["1", "2"]);
    assert_eq!(uuids(&fx.engine, MatchSpec::regex("(?m)^ÉCOLE")), vec!["1"]);
    assert_eq!(uuids(&fx.engine, MatchSpec::regex(r"tag:prod \bfox")), vec!["1"]);
    assert!(uuids(&fx.engine, MatchSpec::regex(r"tag:staging \bfox")).is_empty());
}

#[test]
fn invalid_regex_yields_empty_page() {
    let fx = fixture(|p| {
        p.put("1", "Any", "js", "a(b");
    });

    let page = fx
        .engine
        .find_in_content(&FindInContentRequest::new(MatchSpec::regex("a(")), &AllowAll)
        .unwrap();
    assert!(page.values.is_empty());
    assert_eq!(page.page.total, 0);
    assert!(page.page.exact);
}

#[test]
fn oversize_bodies_still_match_regex() {
    let body = format!("{}needle", "x".repeat(40 * 1024));
    let fx = fixture(|p| {
        p.put("1", "Huge", "js", &body);
        p.put("2", "Huge", "js2", "x");
    });

    assert_eq!(uuids(&fx.engine, MatchSpec::regex("needle$")), vec!["1"]);
}

#[test]
fn chars_anywhere_is_ordered() {
    let fx = fixture(|p| {
        p.put("1", "Ordered", "js", "abcde");
        p.put("2", "Reversed", "js", "eca");
    });

    assert_eq!(uuids(&fx.engine, MatchSpec::chars_anywhere("ace")), vec!["1"]);
}

#[test]
fn tag_filters_are_conjunctive() {
    let fx = fixture(|p| {
        p.put("prod", "Prod only", "js", "shared body");
        p.put("prod-eu", "Prod EU", "js", "shared body");
        p.put("prod-us", "Prod US", "js", "shared body");
        p.set_tags("prod", ["prod"]);
        p.set_tags("prod-eu", ["Prod", "EU"]);
        p.set_tags("prod-us", ["prod", "us"]);
    });

    assert_eq!(uuids(&fx.engine, MatchSpec::contains("tag:prod tag:eu shared")), vec!["prod-eu"]);
    assert_eq!(
        uuids(&fx.engine, MatchSpec::contains("tag:prod")),
        vec!["prod", "prod-eu", "prod-us"]
    );

    let request =
        FindInContentRequest::new(MatchSpec::contains("shared")).with_tags(["PROD", "us"]);
    let page = fx.engine.find_in_content(&request, &AllowAll).unwrap();
    assert_eq!(page.values.len(), 1);
    assert_eq!(page.values[0].content.uuid, "prod-us");
    assert_eq!(page.values[0].tags, vec!["prod", "us"]);
}

#[test]
fn permission_filters_results() {
    let fx = fixture(|p| {
        p.put("1", "Visible", "js", "secret sauce");
        p.put("2", "Hidden", "js", "secret sauce");
    });

    let only_first = |c: &ContentRef| c.uuid == "1";
    let page = fx
        .engine
        .find_in_content(&FindInContentRequest::new(MatchSpec::contains("secret")), &only_first)
        .unwrap();
    assert_eq!(page.values.len(), 1);
    assert_eq!(page.page.total, 1);

    let page = fx
        .engine
        .find_in_content(&FindInContentRequest::new(MatchSpec::contains("secret")), &DenyAll)
        .unwrap();
    assert!(page.values.is_empty());
}

#[test]
fn fetch_highlights_checks_permission_first() {
    let fx = fixture(|p| {
        p.put("1", "Any", "js", "text");
    });

    let request = FetchHighlightsRequest {
        content: ContentRef::new("script", "1"),
        extension: "js".into(),
        filter: MatchSpec::contains("t"),
    };
    let err = fx.engine.fetch_highlights(&request, &DenyAll).unwrap_err();
    assert!(matches!(err, ContentIndexError::PermissionDenied(_)));
}

#[test]
fn fetch_highlights_missing_document_is_none() {
    let fx = fixture(|_| {});
    let request = FetchHighlightsRequest {
        content: ContentRef::new("script", "nope"),
        extension: "js".into(),
        filter: MatchSpec::contains("t"),
    };
    assert!(fx.engine.fetch_highlights(&request, &AllowAll).unwrap().is_none());
}

#[test]
fn fetch_highlights_caps_matches() {
    let fx = fixture(|p| {
        p.put("1", "Many", "js", &"ab ".repeat(500));
    });
    let request = FetchHighlightsRequest {
        content: ContentRef::new("script", "1"),
        extension: "js".into(),
        filter: MatchSpec::contains("ab"),
    };
    let highlights = fx.engine.fetch_highlights(&request, &AllowAll).unwrap().unwrap();
    assert_eq!(highlights.highlights.len(), 100);
}

#[test]
fn pagination_counts_every_qualifying_hit() {
    let fx = fixture(|p| {
        for i in 0..7 {
            p.put(&format!("item-{i}"), "Item", "js", "common text");
        }
    });

    let request = FindInContentRequest::new(MatchSpec::contains("common")).with_page(2, 3);
    let page = fx.engine.find_in_content(&request, &AllowAll).unwrap();
    assert_eq!(page.values.len(), 3);
    assert_eq!(page.page.offset, 2);
    assert_eq!(page.page.total, 7);
    assert!(!page.page.exact);

    let request = FindInContentRequest::new(MatchSpec::contains("common")).with_page(5, 3);
    let page = fx.engine.find_in_content(&request, &AllowAll).unwrap();
    assert_eq!(page.values.len(), 2);
    assert!(page.page.exact);
}

#[test]
fn repeated_update_keeps_one_document_per_extension() {
    let fx = fixture(|p| {
        p.put_all("1", "Multi", [("js", "alpha"), ("meta", "alpha meta")]);
    });
    let content = ContentRef::new("script", "1");

    assert!(fx.engine.on_content_event(ContentEvent::update(content.clone())));
    assert!(fx.engine.on_content_event(ContentEvent::update(content)));
    assert!(fx.engine.flush());

    assert_eq!(find(&fx.engine, MatchSpec::contains("alpha")).len(), 2);
    assert_eq!(fx.engine.status().document_count, 2);
}

#[test]
fn update_replaces_old_text() {
    let fx = fixture(|p| {
        p.put("1", "Doc", "js", "old words");
    });

    let content = fx.scripts.put("1", "Doc", "js", "new words");
    assert!(fx.engine.on_content_event(ContentEvent::update(content)));
    assert!(fx.engine.flush());

    assert!(find(&fx.engine, MatchSpec::contains("old")).is_empty());
    assert_eq!(find(&fx.engine, MatchSpec::contains("new")).len(), 1);
}

#[test]
fn delete_removes_every_extension() {
    let dir = TempDir::new().unwrap();
    let scripts = Arc::new(MemoryProvider::new("script"));
    let content = scripts.put_all("1", "Multi", [("js", "a"), ("meta", "b")]);
    let config = IndexConfig::new(dir.path().join("index"));

    {
        let engine =
            ContentIndexEngine::new(config.clone(), ProviderRegistry::new().with(scripts.clone()));
        engine.await_ready(WAIT).unwrap();
        assert!(engine.on_content_event(ContentEvent::delete(content.clone())));
        assert!(engine.flush());
        assert_eq!(engine.status().document_count, 0);
    }

    // The provider still lists the item, so reopen the raw store to check
    // what the delete committed rather than bootstrapping again.
    let store = IndexStore::open(&config.dir, config.writer_memory_bytes).unwrap();
    let query = QueryBuilder::new(&store, config.regex_size_limit).build_doc_query(&content, None);
    let hits = store.searcher().unwrap().search(query.as_ref(), &Count).unwrap();
    assert_eq!(hits, 0);
}

#[test]
fn reindex_drops_items_removed_from_provider() {
    let fx = fixture(|p| {
        p.put("1", "Kept", "js", "shared");
        p.put("2", "Removed", "js", "shared");
    });

    fx.scripts.remove("2");
    let stats = fx.engine.reindex_all().unwrap().unwrap();
    assert_eq!(stats.documents_added, 1);
    assert_eq!(uuids(&fx.engine, MatchSpec::contains("shared")), vec!["1"]);
}

#[test]
fn predicate_and_any_match_every_document() {
    let fx = fixture(|p| {
        p.put("1", "Blank", "js", "   ");
        p.put("2", "Text", "js", "words");
    });

    assert_eq!(uuids(&fx.engine, MatchSpec::any()), vec!["1", "2"]);
    assert_eq!(uuids(&fx.engine, MatchSpec::new(MatchType::Blank, "")), vec!["1"]);
    assert_eq!(uuids(&fx.engine, MatchSpec::new(MatchType::NonBlank, "")), vec!["2"]);
    assert!(uuids(&fx.engine, MatchSpec::new(MatchType::Null, "")).is_empty());
}

#[test]
fn sample_surrounds_first_match() {
    let text = format!("{}needle{}", "a".repeat(300), "b".repeat(300));
    let fx = fixture(|p| {
        p.put("1", "Long", "js", &text);
    });

    let page = fx
        .engine
        .find_in_content(&FindInContentRequest::new(MatchSpec::contains("needle")), &AllowAll)
        .unwrap();
    let found = &page.values[0];
    assert_eq!(found.location, MatchLocation::new(300, 6));
    assert_eq!(found.sample_location.slice(&found.sample), Some("needle"));
    assert!(found.sample.len() < text.len());
}

#[test]
fn independent_engines_do_not_share_state() {
    let first = fixture(|p| {
        p.put("1", "First", "js", "only in first");
    });
    let second = fixture(|p| {
        p.put("1", "Second", "js", "only in second");
    });

    assert!(find(&first.engine, MatchSpec::contains("second")).is_empty());
    assert_eq!(find(&second.engine, MatchSpec::contains("second")).len(), 1);
    assert_eq!(first.engine.status().state, IndexState::Ready);
}

#[test]
fn search_before_ready_waits_or_reports_not_ready() {
    let dir = TempDir::new().unwrap();
    let scripts = Arc::new(MemoryProvider::new("script"));
    for i in 0..50 {
        scripts.put(&format!("{i}"), "Item", "js", "body text");
    }
    let mut config = IndexConfig::new(dir.path().join("index"));
    config.ready_timeout_ms = 0;
    let engine = ContentIndexEngine::new(config, ProviderRegistry::new().with(scripts));

    let request = FindInContentRequest::new(MatchSpec::contains("body"));
    match engine.find_in_content(&request, &AllowAll) {
        Ok(page) => assert_eq!(page.page.total, 50),
        Err(e) => assert!(e.is_retryable(), "unexpected error: {e}"),
    }

    engine.await_ready(WAIT).unwrap();
    let page = engine.find_in_content(&request, &AllowAll).unwrap();
    assert_eq!(page.page.total, 50);
}
