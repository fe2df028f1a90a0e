//! # Configuration
//!
//! Layered settings. Precedence, highest first:
//!
//! 1. CLI flags
//! 2. Environment (`CODEGRAPH_PARSER_ADDR`)
//! 3. TOML file (`--config`, or `codegraph.toml` in the working directory)
//! 4. Built-in defaults
//!
//! ```toml
//! [parser]
//! address = "localhost:9432"
//! connect_timeout_secs = 5
//!
//! [export]
//! uast = true
//! ast_ids = "content-addressed"
//! ```

use codegraph_core::{AstIdPolicy, CodegraphError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parser address used when none is configured.
pub const DEFAULT_PARSER_ADDR: &str = "localhost:9432";

/// Environment variable overriding the parser address.
pub const PARSER_ADDR_ENV: &str = "CODEGRAPH_PARSER_ADDR";

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "codegraph.toml";

/// Handshake timeout used when none is configured.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// `host:port` or URL of the AST parsing service. `None` means the
    /// default address, tried on a best-effort basis.
    pub address: Option<String>,
    pub connect_timeout_secs: u64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            address: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Parse files and export their syntax trees.
    pub uast: bool,
    pub ast_ids: AstIdPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub parser: ParserConfig,
    pub export: ExportConfig,
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, CodegraphError> {
        toml::from_str(text).map_err(|e| CodegraphError::Config(e.to_string()))
    }

    /// Load the config file. An explicit path must exist; the default file
    /// is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, CodegraphError> {
        let (path, required) = match path {
            Some(p) => (p, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            CodegraphError::Config(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup(PARSER_ADDR_ENV).filter(|a| !a.trim().is_empty()) {
            self.parser.address = Some(addr);
        }
    }

    /// Apply CLI flags. `None` and `false` leave the current value alone.
    pub fn apply_cli(&mut self, parser: Option<String>, uast: bool, ast_ids: Option<AstIdPolicy>) {
        if let Some(addr) = parser {
            self.parser.address = Some(addr);
            self.export.uast = true;
        }
        if uast {
            self.export.uast = true;
        }
        if let Some(policy) = ast_ids {
            self.export.ast_ids = policy;
        }
    }

    /// Parser address and whether it was configured explicitly.
    #[must_use]
    pub fn parser_address(&self) -> (&str, bool) {
        match &self.parser.address {
            Some(addr) => (addr.as_str(), true),
            None => (DEFAULT_PARSER_ADDR, false),
        }
    }
}
