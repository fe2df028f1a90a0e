//! # Codegraph CLI Module
//!
//! This module implements the CLI interface for codegraph.
//!
//! ## Available Commands
//!
//! - `quads` - Write repositories as N-Quads
//! - `import` - Import repositories into the database
//! - `export` - Dump the database as N-Quads
//! - `load` - Load an N-Quads file into the database
//! - `stats` - Rank commits by how much they changed
//! - `uast` - Convert JSON syntax tree files to N-Quads

mod commands;

use crate::config::Config;
use clap::{Parser, Subcommand};
use codegraph_core::{AstIdPolicy, CodegraphError, SortBy};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Codegraph - git history and syntax trees as a quad graph
#[derive(Parser, Debug)]
#[command(name = "codegraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the quad database
    #[arg(short = 'D', long, global = true, default_value = "codegraph.db")]
    pub database: PathBuf,

    /// Path to a TOML config file (default: ./codegraph.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Syntax tree export flags shared by `quads` and `import`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct AstArgs {
    /// Parse files and export their syntax trees
    #[arg(long)]
    pub uast: bool,

    /// Address of the AST parsing service (implies --uast)
    #[arg(long, value_name = "ADDR")]
    pub parser: Option<String>,

    /// AST node identifiers: "content" or "random"
    #[arg(long, value_name = "POLICY")]
    pub ast_ids: Option<AstIdPolicy>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write repositories as N-Quads
    Quads {
        /// Repository paths
        #[arg(required = true)]
        repos: Vec<PathBuf>,

        /// Output file (stdout if absent; a .gz suffix compresses)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        ast: AstArgs,
    },

    /// Import repositories into the database
    Import {
        /// Repository paths
        #[arg(required = true)]
        repos: Vec<PathBuf>,

        #[command(flatten)]
        ast: AstArgs,
    },

    /// Dump the database as N-Quads
    Export {
        /// Output file (stdout if absent; a .gz suffix compresses)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load an N-Quads file (optionally .gz) into the database
    Load {
        /// Input file path
        file: PathBuf,
    },

    /// Rank the commits of every repository in the database
    Stats {
        /// Number of commits to show per repository (0 = all)
        #[arg(short = 'n', long, default_value = "0")]
        limit: usize,

        /// Sort key: add, remove, modify, file or touch
        #[arg(short, long, default_value = "touch")]
        sort: SortBy,

        /// Leave merge commits out
        #[arg(long)]
        nomerge: bool,
    },

    /// Convert JSON syntax tree files to N-Quads ("-" reads stdin)
    Uast {
        /// JSON files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output file (stdout if absent; a .gz suffix compresses)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// AST node identifiers: "content" or "random"
        #[arg(long, value_name = "POLICY")]
        ast_ids: Option<AstIdPolicy>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Load the config file and apply environment overrides.
pub fn load_config(path: Option<&std::path::Path>) -> Result<Config, CodegraphError> {
    let mut config = Config::load(path)?;
    config.apply_env(|key| std::env::var(key).ok());
    Ok(config)
}

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), CodegraphError> {
    let json_mode = cli.json_mode;
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Quads { repos, output, ast } => {
            config.apply_cli(ast.parser, ast.uast, ast.ast_ids);
            cmd_quads(&config, &repos, output.as_deref(), json_mode)
        }
        Commands::Import { repos, ast } => {
            config.apply_cli(ast.parser, ast.uast, ast.ast_ids);
            cmd_import(&cli.database, &config, &repos, json_mode)
        }
        Commands::Export { output } => cmd_export(&cli.database, output.as_deref(), json_mode),
        Commands::Load { file } => cmd_load(&cli.database, &file, json_mode),
        Commands::Stats {
            limit,
            sort,
            nomerge,
        } => cmd_stats(&cli.database, limit, sort, nomerge, json_mode),
        Commands::Uast {
            files,
            output,
            ast_ids,
        } => {
            config.apply_cli(None, false, ast_ids);
            cmd_uast(&files, output.as_deref(), config.export.ast_ids)
        }
    }
}
