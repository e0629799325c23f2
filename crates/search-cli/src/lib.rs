//! Workspace search CLI library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (index, search, info)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, SearchArgs};
pub use commands::{build_engine, handle_index, handle_info, handle_search, init_logging};
