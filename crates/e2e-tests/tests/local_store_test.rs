//! Directory indexing E2E tests over a real temporary workspace.

use pretty_assertions::assert_eq;

use e2e_tests::{result_ids, TestHarness};
use search_engine::{SearchConfig, SearchOptions};
use search_types::IndexTarget;

fn workspace() -> TestHarness {
    let harness = TestHarness::new();
    harness.write_file("docs/guide.md", "Install the search engine with cargo");
    harness.write_file("docs/deep/faq.md", "Why is search fast? Because of the index");
    harness.write_file("docs/notes.txt", "search notes in plain text");
    harness.write_file("src/main.rs", "fn main() { search(); }");
    harness.write_file(".hidden/secret.md", "search secret");
    harness
}

#[tokio::test]
async fn test_index_directory_with_glob() {
    let harness = workspace();
    let engine = harness.engine(SearchConfig::new());

    let summary = engine
        .index_paths(&[IndexTarget::new("/docs").with_glob("**/*.md")])
        .await
        .unwrap();

    assert_eq!(summary.indexed, 2);
    assert_eq!(summary.skipped, 0);
    assert!(summary.errors.is_empty());
    assert!(summary.vector_indexed.is_none());

    let results = engine
        .search("search", &SearchOptions::new().with_top_k(10))
        .await
        .unwrap();
    let mut ids = result_ids(&results);
    ids.sort();
    assert_eq!(ids, vec!["/docs/deep/faq.md", "/docs/guide.md"]);
}

#[tokio::test]
async fn test_single_star_does_not_cross_directories() {
    let harness = workspace();
    let engine = harness.engine(SearchConfig::new());

    let summary = engine
        .index_paths(&[IndexTarget::new("docs").with_glob("*.md")])
        .await
        .unwrap();

    assert_eq!(summary.indexed, 1);
    assert!(engine.document("/docs/guide.md").is_some());
}

#[tokio::test]
async fn test_oversized_files_are_skipped() {
    let harness = workspace();
    harness.write_file("docs/big.md", "search ".repeat(100));
    let engine = harness.engine(SearchConfig::new().with_max_file_bytes(64));

    let summary = engine
        .index_paths(&[IndexTarget::new("/docs").with_glob("**/*.md")])
        .await
        .unwrap();
    assert_eq!(summary.indexed, 2);
    assert_eq!(summary.skipped, 1);
    assert!(engine.document("/docs/big.md").is_none());

    // A per-call limit of zero disables the check.
    let summary = engine
        .index_paths_with_limit(&[IndexTarget::new("/docs").with_glob("big.md")], 0)
        .await
        .unwrap();
    assert_eq!(summary.indexed, 1);
    assert_eq!(summary.skipped, 0);
}

#[tokio::test]
async fn test_read_failures_are_reported_per_file() {
    let harness = workspace();
    harness.write_file("docs/binary.md", [0xff_u8, 0xfe, 0x00, 0x81]);
    let engine = harness.engine(SearchConfig::new());

    let summary = engine
        .index_paths(&[IndexTarget::new("/docs").with_glob("**/*.md")])
        .await
        .unwrap();

    assert_eq!(summary.indexed, 2);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].starts_with("Failed to read /docs/binary.md:"));
}

#[tokio::test]
async fn test_bad_targets_do_not_stop_other_targets() {
    let harness = workspace();
    let engine = harness.engine(SearchConfig::new());

    let summary = engine
        .index_paths(&[
            IndexTarget::new("/docs").with_glob("[unclosed"),
            IndexTarget::new("/../outside"),
            IndexTarget::new("/missing"),
            IndexTarget::new("/src"),
        ])
        .await
        .unwrap();

    assert_eq!(summary.indexed, 1);
    assert_eq!(summary.errors.len(), 3);
    assert!(summary.errors[0].starts_with("Failed to glob /docs:"));
    assert!(summary.errors[1].starts_with("Failed to glob /../outside:"));
    assert!(summary.errors[2].starts_with("Failed to glob /missing:"));
}

#[tokio::test]
async fn test_auto_index_runs_on_first_search() {
    let harness = workspace();
    let engine = harness.engine(SearchConfig::new().with_auto_index(["/docs"]));
    assert_eq!(engine.document_count(), 0);

    let results = engine
        .search("install", &SearchOptions::new())
        .await
        .unwrap();
    assert_eq!(result_ids(&results), vec!["/docs/guide.md"]);
    assert_eq!(engine.document_count(), 3);

    // Files written later are not picked up without an explicit reindex.
    harness.write_file("docs/later.md", "install later");
    let results = engine
        .search("later", &SearchOptions::new())
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_reindex_reflects_edits_and_deletions() {
    let harness = workspace();
    let engine = harness.engine(SearchConfig::new().with_auto_index(["/docs"]));
    engine.init().await.unwrap();
    assert_eq!(engine.document_count(), 3);

    harness.write_file("docs/guide.md", "Completely rewritten");
    std::fs::remove_file(harness.root().join("docs/notes.txt")).unwrap();

    let summary = engine.reindex(&[]).await.unwrap();
    assert_eq!(summary.indexed, 2);
    assert!(engine.document("/docs/notes.txt").is_none());

    let results = engine
        .search("rewritten", &SearchOptions::new())
        .await
        .unwrap();
    assert_eq!(result_ids(&results), vec!["/docs/guide.md"]);
}

#[tokio::test]
async fn test_dotfiles_are_indexed() {
    let harness = workspace();
    let engine = harness.engine(SearchConfig::new());

    engine.index_paths(&[IndexTarget::new("/")]).await.unwrap();
    assert!(engine.document("/.hidden/secret.md").is_some());
    assert_eq!(engine.document_count(), 5);
}
