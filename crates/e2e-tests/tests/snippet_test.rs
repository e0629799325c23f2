//! Result shaping E2E tests: line ranges, snippets, content and metadata.

use pretty_assertions::assert_eq;

use e2e_tests::{memory_engine, TestHarness};
use search_engine::{SearchConfig, SearchOptions};
use search_types::LineRange;

#[tokio::test]
async fn test_line_range_spans_matching_lines() {
    let engine = memory_engine(Vec::new(), SearchConfig::new());
    engine
        .index_content("/doc.txt", "alpha\nbeta gamma\nbeta again\n", None)
        .await
        .unwrap();

    let results = engine.search("beta", &SearchOptions::new()).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].line_range, Some(LineRange { start: 2, end: 3 }));
}

#[tokio::test]
async fn test_snippet_centres_on_first_match() {
    let content = format!("{} needle {}", "hay ".repeat(50), "straw ".repeat(50));
    let engine = memory_engine(Vec::new(), SearchConfig::new().with_snippet_length(30));
    engine.index_content("/big.txt", content.clone(), None).await.unwrap();

    let results = engine.search("needle", &SearchOptions::new()).await.unwrap();
    let snippet = results[0].snippet.as_deref().unwrap();

    assert!(snippet.contains("needle"));
    assert!(snippet.chars().count() <= 30);
    assert_eq!(results[0].content, content);

    let results = engine
        .search("needle", &SearchOptions::new().with_snippet_length(200))
        .await
        .unwrap();
    assert!(results[0].snippet.as_deref().unwrap().chars().count() > 30);
}

#[tokio::test]
async fn test_short_content_snippet_is_whole_text() {
    let engine = memory_engine(Vec::new(), SearchConfig::new());
    engine
        .index_content("/short.txt", "alpha   beta\n\ngamma", None)
        .await
        .unwrap();

    let results = engine.search("gamma", &SearchOptions::new()).await.unwrap();
    assert_eq!(results[0].snippet.as_deref(), Some("alpha beta gamma"));
}

#[tokio::test]
async fn test_without_content_keeps_snippet() {
    let engine = memory_engine(Vec::new(), SearchConfig::new());
    engine.index_content("/a.txt", "alpha beta", None).await.unwrap();

    let results = engine
        .search("alpha", &SearchOptions::new().without_content())
        .await
        .unwrap();

    assert_eq!(results[0].content, "");
    assert_eq!(results[0].snippet.as_deref(), Some("alpha beta"));
}

#[tokio::test]
async fn test_index_content_normalizes_path_and_keeps_metadata() {
    let engine = memory_engine(Vec::new(), SearchConfig::new());
    let mut metadata = serde_json::Map::new();
    metadata.insert("lang".to_string(), serde_json::json!("en"));
    engine
        .index_content("notes/a.txt", "alpha", Some(metadata.clone()))
        .await
        .unwrap();

    let results = engine.search("alpha", &SearchOptions::new()).await.unwrap();
    assert_eq!(results[0].path, "/notes/a.txt");
    assert_eq!(results[0].metadata, Some(metadata));
}

#[tokio::test]
async fn test_store_documents_carry_file_metadata() {
    let harness = TestHarness::new();
    harness.write_file("a.txt", "alpha beta");
    let engine = harness.engine(SearchConfig::new().with_auto_index(["/"]));

    let results = engine.search("alpha", &SearchOptions::new()).await.unwrap();
    let metadata = results[0].metadata.as_ref().unwrap();

    assert_eq!(metadata["size"], serde_json::json!(10));
    assert!(metadata["modified_at"].as_str().is_some());
    assert!(results[0].bm25_score.is_some());
    assert!(results[0].vector_score.is_none());
}
