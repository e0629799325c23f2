//! CLI command implementations.
//!
//! Each command builds a fresh in-memory engine over a local directory,
//! indexes it, then prints a plain-text or JSON report.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use search_engine::{
    format_index_summary, format_search_results, SearchConfig, SearchOptions, WorkspaceSearch,
};
use search_storage::LocalStore;
use search_types::{IndexTarget, Settings};
use search_vector::InMemoryVectorStore;

use crate::cli::SearchArgs;

/// Load settings and apply the CLI log level override.
fn load_settings(config_path: Option<&str>, log_level: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(level) = log_level {
        settings.log_level = level.to_string();
    }
    Ok(settings)
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Build an engine over `root`.
///
/// `index_glob` replaces the configured auto-index targets. With neither,
/// the whole root is indexed. A vector store is attached only when an
/// embedding endpoint is configured.
pub fn build_engine(
    settings: &Settings,
    root: &Path,
    index_glob: Option<&str>,
) -> Result<WorkspaceSearch> {
    let store = LocalStore::new(root)
        .with_context(|| format!("Failed to open workspace {}", root.display()))?;

    let mut config = SearchConfig::from_settings(settings);
    if let Some(glob) = index_glob {
        config = config.with_auto_index([IndexTarget::new("/").with_glob(glob)]);
    } else if config.auto_index.is_empty() {
        config = config.with_auto_index([IndexTarget::new("/")]);
    }
    if config.embedding.is_some() {
        config = config.with_vector(Arc::new(InMemoryVectorStore::new()));
    }

    debug!(root = %root.display(), targets = config.auto_index.len(), "Building engine");
    let engine = WorkspaceSearch::new(Arc::new(store), config)
        .context("Failed to create search engine")?;
    Ok(engine)
}

/// Translate CLI arguments into query options.
pub fn search_options(args: &SearchArgs) -> SearchOptions {
    SearchOptions {
        mode: args.mode,
        top_k: args.top_k,
        min_score: args.min_score,
        path: args.path.clone(),
        glob: args.glob.clone(),
        snippet_length: args.snippet_length,
        lexical_weight: args.lexical_weight,
        vector_weight: args.vector_weight,
        include_content: !args.no_content,
    }
}

/// Index the engine's targets and render the summary.
pub async fn index_report(engine: &WorkspaceSearch, json: bool) -> Result<String> {
    let summary = engine.index_paths(&[]).await?;
    info!(
        indexed = summary.indexed,
        skipped = summary.skipped,
        errors = summary.errors.len(),
        "Indexing finished"
    );
    if json {
        Ok(serde_json::to_string_pretty(&summary)?)
    } else {
        Ok(format_index_summary(&summary))
    }
}

/// Run a query and render the results.
pub async fn search_report(engine: &WorkspaceSearch, args: &SearchArgs) -> Result<String> {
    let options = search_options(args);
    let results = engine.search(&args.query, &options).await?;
    info!(query = %args.query, results = results.len(), "Search finished");
    if args.json {
        Ok(serde_json::to_string_pretty(&results)?)
    } else {
        Ok(format_search_results(&results))
    }
}

/// Start the engine (running auto-indexing) and render its state as JSON.
pub async fn info_report(engine: &WorkspaceSearch) -> Result<String> {
    engine.init().await?;
    Ok(serde_json::to_string_pretty(&engine.info())?)
}

pub async fn handle_index(
    config_path: Option<&str>,
    log_level: Option<&str>,
    root: &Path,
    glob: Option<&str>,
    json: bool,
) -> Result<()> {
    let settings = load_settings(config_path, log_level)?;
    init_logging(&settings.log_level)?;

    let engine = build_engine(&settings, root, glob)?;
    println!("{}", index_report(&engine, json).await?);
    engine.destroy();
    Ok(())
}

pub async fn handle_search(
    config_path: Option<&str>,
    log_level: Option<&str>,
    args: SearchArgs,
) -> Result<()> {
    let settings = load_settings(config_path, log_level)?;
    init_logging(&settings.log_level)?;

    let engine = build_engine(&settings, &args.root, args.index_glob.as_deref())?;
    println!("{}", search_report(&engine, &args).await?);
    engine.destroy();
    Ok(())
}

pub async fn handle_info(
    config_path: Option<&str>,
    log_level: Option<&str>,
    root: &Path,
) -> Result<()> {
    let settings = load_settings(config_path, log_level)?;
    init_logging(&settings.log_level)?;

    let engine = build_engine(&settings, root, None)?;
    println!("{}", info_report(&engine).await?);
    engine.destroy();
    Ok(())
}
