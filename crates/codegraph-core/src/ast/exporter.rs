//! # AST Exporter
//!
//! The blob hook that tags each new file with its language and, when a
//! parser is configured, attaches the file's syntax tree.

use super::{AstEncoder, AstNode};
use crate::identity::AstIdPolicy;
use crate::lang::{ExtensionDetector, LanguageDetector};
use crate::primitives::{PRED_LANGUAGE, iri};
use crate::walker::BlobHook;
use crate::{CodegraphError, Quad, Value};
use thiserror::Error;

// =============================================================================
// PARSER CONTRACT
// =============================================================================

/// Result of a successful parse.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAst {
    pub root: AstNode,
    /// Language reported by the parser, if any.
    pub language: Option<String>,
}

/// Parse failures. The first two mean "skip this file".
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("{0}")]
    Other(String),
}

/// A syntax tree parser.
pub trait AstParser {
    /// Parse `content`. `hint` is the detected language, if any.
    fn parse(
        &self,
        filename: &str,
        content: &[u8],
        hint: Option<&str>,
    ) -> Result<ParsedAst, ParseError>;
}

// =============================================================================
// EXPORTER
// =============================================================================

/// Language tagging plus optional AST export.
pub struct AstExporter {
    detector: Box<dyn LanguageDetector>,
    parser: Option<Box<dyn AstParser>>,
    encoder: AstEncoder,
    parsed: usize,
    skipped: usize,
}

impl std::fmt::Debug for AstExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AstExporter")
            .field("parser", &self.parser.is_some())
            .field("policy", &self.encoder.policy())
            .field("parsed", &self.parsed)
            .field("skipped", &self.skipped)
            .finish_non_exhaustive()
    }
}

impl Default for AstExporter {
    fn default() -> Self {
        Self::new(Box::new(ExtensionDetector::new()))
    }
}

impl AstExporter {
    /// Language tagging only.
    #[must_use]
    pub fn new(detector: Box<dyn LanguageDetector>) -> Self {
        Self {
            detector,
            parser: None,
            encoder: AstEncoder::default(),
            parsed: 0,
            skipped: 0,
        }
    }

    /// Also parse every file and encode its tree.
    #[must_use]
    pub fn with_parser(mut self, parser: Box<dyn AstParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: AstIdPolicy) -> Self {
        self.encoder = AstEncoder::new(policy);
        self
    }

    /// Files whose tree was encoded.
    #[must_use]
    pub fn parsed(&self) -> usize {
        self.parsed
    }

    /// Files the parser declined.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl BlobHook for AstExporter {
    fn on_blob(
        &mut self,
        blob: &Value,
        path: &str,
        content: &[u8],
        out: &mut Vec<Quad>,
    ) -> Result<(), CodegraphError> {
        let detected = self.detector.detect(path, content);
        if let Some(lang) = detected {
            out.push(Quad::new(blob.clone(), iri(PRED_LANGUAGE), Value::string(lang)));
        }

        let Some(parser) = &self.parser else {
            return Ok(());
        };

        let parsed = match parser.parse(path, content, detected) {
            Ok(parsed) => parsed,
            Err(ParseError::UnsupportedLanguage(reason) | ParseError::InvalidEncoding(reason)) => {
                tracing::debug!(path, %reason, "Skipping AST export");
                self.skipped += 1;
                return Ok(());
            }
            Err(ParseError::Other(reason)) => {
                return Err(CodegraphError::Parse(format!("{}: {}", path, reason)));
            }
        };

        if detected.is_none()
            && let Some(lang) = parsed.language.as_deref().filter(|l| !l.is_empty())
        {
            out.push(Quad::new(blob.clone(), iri(PRED_LANGUAGE), Value::string(lang)));
        }

        out.extend(self.encoder.encode(blob, &parsed.root)?);
        self.parsed += 1;
        Ok(())
    }
}
