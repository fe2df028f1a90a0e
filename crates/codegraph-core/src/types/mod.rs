//! # Core Type Definitions
//!
//! This module contains the data model shared by every component:
//! - Graph terms (`Value`): identifiers and typed literals
//! - Statements (`Quad`)
//! - Error types (`CodegraphError`)
//!
//! ## Term Guarantees
//!
//! - Identifiers distinguish named (`Iri`) from anonymous (`Blank`) nodes
//! - Literals distinguish string, integer, float, boolean and timestamp
//! - `Display` renders the N-Quads term, which is also the index key used by
//!   the stores, so two values are the same node iff they render the same

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// VALUE
// =============================================================================

/// A single graph term: an identifier or a typed literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Named identifier (`<git:Commit>`, `<sha1:…>`).
    Iri(String),
    /// Anonymous, run-scoped identifier (`_:…`).
    Blank(String),
    /// Plain string literal.
    String(String),
    /// Integer literal.
    Int(i64),
    /// Floating point literal.
    Float(f64),
    /// Boolean literal.
    Bool(bool),
    /// Timestamp literal; the original UTC offset is preserved.
    Time(DateTime<FixedOffset>),
}

impl Value {
    /// Create an IRI value.
    #[must_use]
    pub fn iri(s: impl Into<String>) -> Self {
        Self::Iri(s.into())
    }

    /// Create a blank node value.
    #[must_use]
    pub fn blank(s: impl Into<String>) -> Self {
        Self::Blank(s.into())
    }

    /// Create a string literal.
    #[must_use]
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// True for IRIs and blank nodes.
    #[must_use]
    pub fn is_node(&self) -> bool {
        matches!(self, Self::Iri(_) | Self::Blank(_))
    }

    /// Borrow the IRI text, if this is an IRI.
    #[must_use]
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Self::Iri(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the string literal, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::formats::nquads::write_term(f, self)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Self::Time(v)
    }
}

// =============================================================================
// QUAD
// =============================================================================

/// A subject-predicate-object statement with an optional label.
///
/// The label is an annotation on the statement (a timestamp, a path), not a
/// fifth graph dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub subject: Value,
    pub predicate: Value,
    pub object: Value,
    pub label: Option<Value>,
}

impl Quad {
    /// Create an unlabeled quad.
    #[must_use]
    pub fn new(subject: Value, predicate: Value, object: Value) -> Self {
        Self {
            subject,
            predicate,
            object,
            label: None,
        }
    }

    /// Attach a label to this quad.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<Value>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Validate the quad before it reaches a store.
    ///
    /// A quad is valid if:
    /// - Subject and predicate are identifiers (IRI or blank node)
    /// - No identifier in any position is empty
    pub fn validate(&self) -> Result<(), CodegraphError> {
        if !self.subject.is_node() {
            return Err(CodegraphError::InvalidQuad(format!(
                "subject must be an identifier, got {}",
                self.subject
            )));
        }
        if !self.predicate.is_node() {
            return Err(CodegraphError::InvalidQuad(format!(
                "predicate must be an identifier, got {}",
                self.predicate
            )));
        }
        let positions = [
            Some(&self.subject),
            Some(&self.predicate),
            Some(&self.object),
            self.label.as_ref(),
        ];
        for value in positions.into_iter().flatten() {
            if let Value::Iri(s) | Value::Blank(s) = value
                && s.is_empty()
            {
                return Err(CodegraphError::InvalidQuad(
                    "empty identifier".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if let Some(label) = &self.label {
            write!(f, " {}", label)?;
        }
        f.write_str(" .")
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the codegraph engine.
///
/// - No silent failures
/// - Use `Result<T, CodegraphError>` for fallible operations
/// - Collaborator errors are carried as strings so the core stays free of
///   their types
#[derive(Debug, Error)]
pub enum CodegraphError {
    /// A quad has a literal where an identifier is required.
    #[error("Invalid quad: {0}")]
    InvalidQuad(String),

    /// The repository could not be opened or read.
    #[error("Repository error: {0}")]
    Repository(String),

    /// A tree-diff entry lacks the path or hash its action needs.
    #[error("Invalid change: {0}")]
    InvalidChange(String),

    /// A syntax tree node has a shape the encoder cannot represent.
    #[error("Unsupported AST node: {0}")]
    UnsupportedNode(String),

    /// The AST parsing service failed in a non-recoverable way.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The AST parsing service could not be reached.
    #[error("Parser unavailable: {0}")]
    ParserUnavailable(String),

    /// The quad store rejected a read or write.
    #[error("Store error: {0}")]
    Store(String),

    /// A one-by-one write stopped part way through a batch.
    #[error("Write failed after {written} quads: {reason}")]
    PartialWrite { written: usize, reason: String },

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An N-Quads line could not be parsed.
    #[error("Format error at line {line}: {reason}")]
    Format { line: usize, reason: String },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// The configuration is invalid.
    #[error("Config error: {0}")]
    Config(String),
}

impl From<std::io::Error> for CodegraphError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================
