//! # Vocabulary Primitives
//!
//! Hardcoded predicate, type and datatype IRIs for the codegraph engine.
//!
//! The engine starts with zero data but a fixed vocabulary. Every quad the
//! walker, classifier and encoder emit uses a predicate from this module,
//! so queries over the graph can rely on these names.

use crate::Value;

// =============================================================================
// NODE TYPES
// =============================================================================

/// Type of a repository root node.
pub const TYPE_REPO: &str = "git:Repo";
/// Type of a branch node.
pub const TYPE_BRANCH: &str = "git:Branch";
/// Type of a commit node.
pub const TYPE_COMMIT: &str = "git:Commit";
/// Type of a blob node.
pub const TYPE_FILE: &str = "git:File";
/// Type of an author/committer node.
pub const TYPE_AUTHOR: &str = "git:Author";

// =============================================================================
// PREDICATES
// =============================================================================

/// Node type predicate. Also the "is-a" predicate of AST nodes.
pub const PRED_TYPE: &str = "rdf:type";
/// Human readable name (branches, authors).
pub const PRED_NAME: &str = "schema:name";

pub const PRED_BRANCH: &str = "git:branch";
pub const PRED_COMMIT: &str = "git:commit";
pub const PRED_METADATA: &str = "git:metadata";
pub const PRED_MESSAGE: &str = "git:message";
pub const PRED_AUTHOR: &str = "git:author";
/// Single `t`: the established name of this edge in existing git quad graphs.
pub const PRED_COMMITTER: &str = "git:commiter";
pub const PRED_EMAIL: &str = "git:email";
pub const PRED_PARENT: &str = "git:parent";
pub const PRED_CHILD: &str = "git:child";

pub const PRED_FILE: &str = "git:file";
pub const PRED_FILENAME: &str = "git:filename";
pub const PRED_LANGUAGE: &str = "git:language";
pub const PRED_ADD: &str = "git:add";
pub const PRED_REMOVE: &str = "git:remove";
pub const PRED_MODIFY: &str = "git:modify";

/// Links a file to the top-level nodes of its syntax tree.
pub const PRED_AST_ROOT: &str = "uast:root";
/// Reserved predicate for the `roles` field of AST nodes.
pub const PRED_AST_ROLE: &str = "uast:role";
/// Reserved predicate for the `position` field of AST nodes.
pub const PRED_AST_POSITION: &str = "uast:pos";
/// Backlink from a position node to the file it belongs to.
pub const PRED_AST_FILE: &str = "uast:file";

/// Viewer hint: render the subject predicate as a node attribute.
pub const PRED_GEPHI_INLINE: &str = "gephi:inline";

// =============================================================================
// IDENTIFIERS & NAMESPACES
// =============================================================================

/// Prefix of commit and blob IRIs.
pub const HASH_IRI_PREFIX: &str = "sha1:";

/// Prefix stripped from branch reference names.
pub const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Namespace used for AST fields when the node type carries none.
pub const DEFAULT_AST_NAMESPACE: &str = "uast";

// =============================================================================
// LITERAL DATATYPES
// =============================================================================

pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
pub const XSD_DATETIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

/// Shorthand for an IRI value of one of the constants above.
#[must_use]
pub fn iri(name: &str) -> Value {
    Value::iri(name)
}
