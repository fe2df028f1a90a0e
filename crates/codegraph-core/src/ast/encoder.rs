//! # AST Tree Encoder
//!
//! Recursive conversion of a syntax tree into quads.
//!
//! | node | result |
//! |---|---|
//! | null, empty string | nothing |
//! | scalar | one literal |
//! | array | the concatenated results of its elements |
//! | object | a fresh node identifier plus one quad per produced field value |
//!
//! Field names map to predicates as follows: `@type`/`type` to `rdf:type`
//! (a single string becomes an IRI), `@role`/`roles` to `uast:role`,
//! `@pos`/`position` to `uast:pos`, qualified names (`go:Name`) unchanged,
//! and any other name to `<ns>:<name>` where `ns` is the namespace of the
//! node's type, or `uast` when the type has none.

use super::AstNode;
use crate::identity::{AstIdGenerator, AstIdPolicy};
use crate::primitives::{
    DEFAULT_AST_NAMESPACE, PRED_AST_FILE, PRED_AST_POSITION, PRED_AST_ROLE, PRED_AST_ROOT,
    PRED_TYPE, iri,
};
use crate::sink::QuadSink;
use crate::{CodegraphError, Quad, Value};

/// Encodes syntax trees onto file identifiers.
#[derive(Debug)]
pub struct AstEncoder {
    ids: AstIdGenerator,
}

impl Default for AstEncoder {
    fn default() -> Self {
        Self::new(AstIdPolicy::default())
    }
}

impl AstEncoder {
    #[must_use]
    pub fn new(policy: AstIdPolicy) -> Self {
        Self {
            ids: AstIdGenerator::new(policy),
        }
    }

    #[must_use]
    pub fn policy(&self) -> AstIdPolicy {
        self.ids.policy()
    }

    /// Encode `root` as the syntax tree of `file`.
    ///
    /// Every top-level identifier is linked with `(file, uast:root, id)`.
    pub fn encode(&mut self, file: &Value, root: &AstNode) -> Result<Vec<Quad>, CodegraphError> {
        self.ids.begin_tree(file, root.digest().as_bytes());

        let mut quads = Vec::new();
        let values = self.encode_node(file, root, &mut quads)?;
        for value in values {
            if value.is_node() {
                quads.push(Quad::new(file.clone(), iri(PRED_AST_ROOT), value));
            }
        }
        Ok(quads)
    }

    /// Encode and write through `sink`. Returns the number of quads written.
    pub fn as_quads(
        &mut self,
        sink: &mut QuadSink<'_>,
        file: &Value,
        root: &AstNode,
    ) -> Result<usize, CodegraphError> {
        let quads = self.encode(file, root)?;
        sink.write(&quads)
    }

    fn encode_node(
        &mut self,
        file: &Value,
        node: &AstNode,
        out: &mut Vec<Quad>,
    ) -> Result<Vec<Value>, CodegraphError> {
        let value = match node {
            AstNode::Null => return Ok(Vec::new()),
            AstNode::String(s) if s.is_empty() => return Ok(Vec::new()),
            AstNode::String(s) => Value::String(s.clone()),
            AstNode::Int(i) => Value::Int(*i),
            AstNode::Float(f) => Value::Float(*f),
            AstNode::Bool(b) => Value::Bool(*b),
            AstNode::Array(items) => {
                let mut values = Vec::new();
                for item in items {
                    values.extend(self.encode_node(file, item, out)?);
                }
                return Ok(values);
            }
            AstNode::Object(fields) => {
                let id = self.ids.next_id();
                let (namespace, local) = split_type(node.type_name());

                if local == Some("Position") || local == Some("Positions") {
                    out.push(Quad::new(id.clone(), iri(PRED_AST_FILE), file.clone()));
                }

                for (name, child) in fields {
                    let predicate = field_predicate(namespace, name);
                    let values = match child {
                        AstNode::String(s) if is_type_field(name) && !s.is_empty() => {
                            vec![Value::Iri(s.clone())]
                        }
                        _ => self.encode_node(file, child, out)?,
                    };
                    for value in values {
                        out.push(Quad::new(id.clone(), predicate.clone(), value));
                    }
                }
                id
            }
        };
        Ok(vec![value])
    }
}

fn is_type_field(name: &str) -> bool {
    name == "@type" || name == "type"
}

/// Split `go:Ident` into (`go`, `Ident`); untyped or unqualified nodes use
/// the default namespace.
fn split_type(type_name: Option<&str>) -> (&str, Option<&str>) {
    match type_name {
        Some(t) => match t.split_once(':') {
            Some((ns, local)) => (ns, Some(local)),
            None => (DEFAULT_AST_NAMESPACE, Some(t)),
        },
        None => (DEFAULT_AST_NAMESPACE, None),
    }
}

fn field_predicate(namespace: &str, name: &str) -> Value {
    match name {
        "@type" | "type" => iri(PRED_TYPE),
        "@role" | "roles" => iri(PRED_AST_ROLE),
        "@pos" | "position" => iri(PRED_AST_POSITION),
        qualified if qualified.contains(':') => Value::iri(qualified),
        local => Value::Iri(format!("{}:{}", namespace, local)),
    }
}

// =============================================================================
// TESTS
// =============================================================================
