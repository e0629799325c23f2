//! CLI argument parsing for workspace search.
//!
//! CLI flags override config file and environment values.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use search_types::SearchMode;

/// Workspace Search
///
/// Rank the text files under a directory against a query.
#[derive(Parser, Debug)]
#[command(name = "workspace-search")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides the default config location)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index a directory and report what was indexed
    Index {
        /// Directory to index
        root: PathBuf,

        /// Glob selecting files, relative to the root (default: configured targets or **/*)
        #[arg(short, long)]
        glob: Option<String>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Index a directory and search it
    Search(SearchArgs),

    /// Index a directory and show the engine's configuration and state
    Info {
        /// Directory to index
        root: PathBuf,
    },
}

/// Arguments for `search`
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Directory to index and search
    pub root: PathBuf,

    /// Query text
    pub query: String,

    /// Retrieval mode (bm25, vector, hybrid)
    #[arg(short, long)]
    pub mode: Option<SearchMode>,

    /// Maximum results
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Drop results scoring below this value
    #[arg(long)]
    pub min_score: Option<f32>,

    /// Only return documents under this path (e.g. /src)
    #[arg(short, long)]
    pub path: Option<String>,

    /// Only return documents matching this glob, relative to --path
    #[arg(short, long)]
    pub glob: Option<String>,

    /// Glob selecting files to index (default: configured targets or **/*)
    #[arg(long)]
    pub index_glob: Option<String>,

    /// Snippet window in characters
    #[arg(long)]
    pub snippet_length: Option<usize>,

    /// Hybrid weight for the lexical signal
    #[arg(long)]
    pub lexical_weight: Option<f32>,

    /// Hybrid weight for the vector signal
    #[arg(long)]
    pub vector_weight: Option<f32>,

    /// Omit full document content from results
    #[arg(long)]
    pub no_content: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_index() {
        let cli = Cli::parse_from(["workspace-search", "index", "/tmp/ws"]);
        match cli.command {
            Commands::Index { root, glob, json } => {
                assert_eq!(root, PathBuf::from("/tmp/ws"));
                assert!(glob.is_none());
                assert!(!json);
            }
            _ => panic!("Expected Index command"),
        }
    }

    #[test]
    fn test_cli_index_with_glob() {
        let cli = Cli::parse_from(["workspace-search", "index", ".", "-g", "**/*.md", "--json"]);
        match cli.command {
            Commands::Index { glob, json, .. } => {
                assert_eq!(glob.as_deref(), Some("**/*.md"));
                assert!(json);
            }
            _ => panic!("Expected Index command"),
        }
    }

    #[test]
    fn test_cli_search_defaults() {
        let cli = Cli::parse_from(["workspace-search", "search", ".", "hello world"]);
        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.query, "hello world");
                assert!(args.mode.is_none());
                assert!(args.top_k.is_none());
                assert!(!args.no_content);
            }
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_cli_search_with_options() {
        let cli = Cli::parse_from([
            "workspace-search",
            "search",
            ".",
            "needle",
            "--mode",
            "bm25",
            "-k",
            "3",
            "--min-score",
            "0.2",
            "--path",
            "/src",
            "--glob",
            "*.rs",
            "--lexical-weight",
            "0.7",
            "--no-content",
        ]);
        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.mode, Some(SearchMode::Bm25));
                assert_eq!(args.top_k, Some(3));
                assert_eq!(args.min_score, Some(0.2));
                assert_eq!(args.path.as_deref(), Some("/src"));
                assert_eq!(args.glob.as_deref(), Some("*.rs"));
                assert_eq!(args.lexical_weight, Some(0.7));
                assert!(args.vector_weight.is_none());
                assert!(args.no_content);
            }
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_cli_search_rejects_unknown_mode() {
        let result = Cli::try_parse_from(["workspace-search", "search", ".", "q", "-m", "fuzzy"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_with_config_and_log_level() {
        let cli = Cli::parse_from([
            "workspace-search",
            "--config",
            "/path/to/config.toml",
            "info",
            ".",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.config, Some("/path/to/config.toml".to_string()));
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::Info { .. }));
    }
}
