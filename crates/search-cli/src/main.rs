//! Workspace Search
//!
//! Hybrid BM25 + vector search over a directory of text files.
//!
//! # Usage
//!
//! ```bash
//! workspace-search index <ROOT> [--glob GLOB] [--json]
//! workspace-search search <ROOT> <QUERY> [--mode bm25|vector|hybrid] [--top-k N]
//! workspace-search info <ROOT>
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (<config dir>/workspace-search/config.toml)
//! 3. Environment variables (WORKSPACE_SEARCH_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use search_cli::{handle_index, handle_info, handle_search, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Index { root, glob, json } => {
            handle_index(
                cli.config.as_deref(),
                cli.log_level.as_deref(),
                &root,
                glob.as_deref(),
                json,
            )
            .await?;
        }
        Commands::Search(args) => {
            handle_search(cli.config.as_deref(), cli.log_level.as_deref(), args).await?;
        }
        Commands::Info { root } => {
            handle_info(cli.config.as_deref(), cli.log_level.as_deref(), &root).await?;
        }
    }

    Ok(())
}
