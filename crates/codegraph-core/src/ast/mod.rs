//! # AST Module
//!
//! Syntax trees as produced by the parsing service, and their encoding into
//! quads:
//! - `AstNode`: exhaustive node shape
//! - `encoder`: recursive tree-to-quads conversion
//! - `exporter`: the per-blob hook (language tag, parse, encode)

pub mod encoder;
pub mod exporter;

pub use encoder::AstEncoder;
pub use exporter::{AstExporter, AstParser, ParseError, ParsedAst};

use crate::CodegraphError;
use std::collections::BTreeMap;

/// One node of a parsed syntax tree.
///
/// Object fields are kept sorted so encoding order never depends on the
/// parser's field order.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    Null,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<AstNode>),
    Object(BTreeMap<String, AstNode>),
}

impl AstNode {
    /// Convert a JSON document.
    ///
    /// Integers beyond `i64` cannot be represented and are rejected rather
    /// than silently rounded to a float.
    pub fn from_json(value: serde_json::Value) -> Result<Self, CodegraphError> {
        use serde_json::Value as Json;

        Ok(match value {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::String(s) => Self::String(s),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if n.is_u64() {
                    return Err(CodegraphError::UnsupportedNode(format!(
                        "integer {} out of range",
                        n
                    )));
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    return Err(CodegraphError::UnsupportedNode(format!(
                        "number {} not representable",
                        n
                    )));
                }
            }
            Json::Array(items) => Self::Array(
                items
                    .into_iter()
                    .map(Self::from_json)
                    .collect::<Result<_, _>>()?,
            ),
            Json::Object(fields) => Self::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| Ok((k, Self::from_json(v)?)))
                    .collect::<Result<_, CodegraphError>>()?,
            ),
        })
    }

    /// Parse a JSON document from text.
    pub fn from_json_str(text: &str) -> Result<Self, CodegraphError> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| CodegraphError::Serialization(e.to_string()))?;
        Self::from_json(value)
    }

    /// Convenience constructor for object nodes.
    #[must_use]
    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, AstNode)>) -> Self {
        Self::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// BLAKE3 digest of the tree's canonical form.
    ///
    /// Every node is tagged by kind and strings are length-prefixed, so two
    /// trees share a digest only if they are equal.
    #[must_use]
    pub fn digest(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        self.hash_into(&mut hasher);
        hasher.finalize()
    }

    fn hash_into(&self, h: &mut blake3::Hasher) {
        fn text(h: &mut blake3::Hasher, s: &str) {
            h.update(&(s.len() as u64).to_le_bytes());
            h.update(s.as_bytes());
        }

        match self {
            Self::Null => {
                h.update(b"n");
            }
            Self::String(s) => {
                h.update(b"s");
                text(h, s);
            }
            Self::Int(i) => {
                h.update(b"i");
                h.update(&i.to_le_bytes());
            }
            Self::Float(f) => {
                h.update(b"f");
                h.update(&f.to_bits().to_le_bytes());
            }
            Self::Bool(b) => {
                h.update(if *b { b"t" } else { b"F" });
            }
            Self::Array(items) => {
                h.update(b"a");
                h.update(&(items.len() as u64).to_le_bytes());
                for item in items {
                    item.hash_into(h);
                }
            }
            Self::Object(fields) => {
                h.update(b"o");
                h.update(&(fields.len() as u64).to_le_bytes());
                for (name, child) in fields {
                    text(h, name);
                    child.hash_into(h);
                }
            }
        }
    }

    /// The `@type` or `type` field, if it is a string.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        let Self::Object(fields) = self else {
            return None;
        };
        ["@type", "type"]
            .into_iter()
            .find_map(|key| match fields.get(key) {
                Some(Self::String(s)) => Some(s.as_str()),
                _ => None,
            })
    }
}

impl From<&str> for AstNode {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}
