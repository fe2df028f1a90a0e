//! # codegraph
//!
//! Collaborators for codegraph-core plus the command-line surface:
//! the git2 repository source, the HTTP parser client, layered config and
//! quad output streams.

pub mod cli;
pub mod config;
pub mod git;
pub mod output;
pub mod parser;

pub use config::Config;
pub use git::GitSource;
pub use output::QuadOutput;
pub use parser::ParserClient;
