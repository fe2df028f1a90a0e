//! # Identity Resolver
//!
//! Deterministic identifiers for git objects and authors, and the
//! run-scoped generator for syntax tree nodes.
//!
//! - Commits and blobs are named by their object hash (`sha1:<hex>`)
//! - Branches are named by repository IRI + "/" + full ref name
//! - Authors are blank nodes named by MD5(`name` NUL `email`), so every
//!   signature with the exact same name and email lands on one node
//! - AST nodes get identifiers from an `AstIdGenerator`, whose policy decides
//!   between content addressing and random snapshots

use crate::Value;
use crate::primitives::HASH_IRI_PREFIX;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// IRI of a commit object.
#[must_use]
pub fn commit_iri(hash: &str) -> Value {
    Value::Iri(format!("{}{}", HASH_IRI_PREFIX, hash))
}

/// IRI of a blob object.
#[must_use]
pub fn blob_iri(hash: &str) -> Value {
    Value::Iri(format!("{}{}", HASH_IRI_PREFIX, hash))
}

/// IRI of a branch: the repository IRI joined with the full ref name.
#[must_use]
pub fn branch_iri(repo: &str, ref_name: &str) -> Value {
    Value::Iri(format!("{}/{}", repo, ref_name))
}

/// Blank identifier of a person. Exact match on name and email only.
#[must_use]
pub fn author_id(name: &str, email: &str) -> Value {
    let mut bytes = Vec::with_capacity(name.len() + email.len() + 1);
    bytes.extend_from_slice(name.as_bytes());
    bytes.push(0);
    bytes.extend_from_slice(email.as_bytes());
    Value::Blank(format!("{:x}", md5::compute(&bytes)))
}

// =============================================================================
// AST NODE IDENTIFIERS
// =============================================================================

/// How AST node identifiers are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AstIdPolicy {
    /// BLAKE3 of the file identifier and the node's pre-order ordinal.
    /// Re-encoding the same file yields the same identifiers.
    #[default]
    #[serde(alias = "content")]
    ContentAddressed,
    /// Random identifiers, unique within the generator. Every import is a
    /// fresh snapshot of the tree.
    Random,
}

impl FromStr for AstIdPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "content" | "content-addressed" => Ok(Self::ContentAddressed),
            "random" => Ok(Self::Random),
            other => Err(format!(
                "unknown AST id policy '{}' (expected content or random)",
                other
            )),
        }
    }
}

/// Generates blank identifiers for AST nodes.
///
/// The seen-set lives in the generator, so its lifetime is the lifetime of
/// the encoder that owns it; nothing is process-global.
#[derive(Debug)]
pub struct AstIdGenerator {
    policy: AstIdPolicy,
    seen: BTreeSet<String>,
    scope: String,
    ordinal: u64,
}

impl AstIdGenerator {
    #[must_use]
    pub fn new(policy: AstIdPolicy) -> Self {
        Self {
            policy,
            seen: BTreeSet::new(),
            scope: String::new(),
            ordinal: 0,
        }
    }

    #[must_use]
    pub fn policy(&self) -> AstIdPolicy {
        self.policy
    }

    /// Start numbering the nodes of a new tree, owned by `file`.
    ///
    /// `tree` is a digest of the whole tree: different trees under the same
    /// file get disjoint identifiers.
    pub fn begin_tree(&mut self, file: &Value, tree: &[u8]) {
        self.scope.clear();
        self.scope.push_str(&file.to_string());
        self.scope.push('\0');
        for byte in tree {
            self.scope.push_str(&format!("{:02x}", byte));
        }
        self.ordinal = 0;
    }

    /// Allocate the next node identifier.
    pub fn next_id(&mut self) -> Value {
        match self.policy {
            AstIdPolicy::ContentAddressed => {
                let mut hasher = blake3::Hasher::new();
                hasher.update(self.scope.as_bytes());
                hasher.update(&[0]);
                hasher.update(&self.ordinal.to_le_bytes());
                self.ordinal = self.ordinal.saturating_add(1);
                let hash = hasher.finalize();
                Value::Blank(format!("n{}", &hash.to_hex()[..32]))
            }
            AstIdPolicy::Random => loop {
                let id = format!("n{:016x}", rand::random::<u64>());
                if self.seen.insert(id.clone()) {
                    return Value::Blank(id);
                }
            },
        }
    }

    /// Number of random identifiers handed out so far.
    #[must_use]
    pub fn issued(&self) -> usize {
        self.seen.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================
