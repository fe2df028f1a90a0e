//! # Repository Source
//!
//! The version-control collaborator contract. The core never parses git
//! objects itself; it walks whatever a `RepositorySource` reports.
//!
//! Hashes are lowercase hex object ids. Paths are repository-relative with
//! `/` separators.

use crate::CodegraphError;
use chrono::{DateTime, FixedOffset};

/// A local branch and the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    /// Full reference name, e.g. `refs/heads/main`.
    pub name: String,
    /// Hash of the head commit.
    pub head: String,
}

/// Author or committer signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub when: DateTime<FixedOffset>,
}

/// One commit from the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub hash: String,
    /// Parent hashes; the first one is the diff base.
    pub parents: Vec<String>,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
    /// `git log`-style rendering of the commit header and message.
    pub metadata: String,
}

/// A blob in a commit's tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: String,
    pub blob: String,
}

/// Kind of tree-diff entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Delete,
    Insert,
    Modify,
    /// Renames, copies, type changes and anything else.
    Other,
}

/// One tree-diff entry. Which sides are present depends on the action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub action: ChangeAction,
    pub from_path: Option<String>,
    pub from_hash: Option<String>,
    pub to_path: Option<String>,
    pub to_hash: Option<String>,
}

impl ChangeRecord {
    #[must_use]
    pub fn insert(path: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            action: ChangeAction::Insert,
            from_path: None,
            from_hash: None,
            to_path: Some(path.into()),
            to_hash: Some(hash.into()),
        }
    }

    #[must_use]
    pub fn delete(path: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            action: ChangeAction::Delete,
            from_path: Some(path.into()),
            from_hash: Some(hash.into()),
            to_path: None,
            to_hash: None,
        }
    }

    #[must_use]
    pub fn modify(path: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            action: ChangeAction::Modify,
            from_path: Some(path.clone()),
            from_hash: Some(from.into()),
            to_path: Some(path),
            to_hash: Some(to.into()),
        }
    }
}

/// Read access to one repository.
pub trait RepositorySource {
    /// Remote `origin` URL if known, else the local path.
    fn canonical_iri(&self) -> Result<String, CodegraphError>;

    /// Local branches.
    fn branches(&self) -> Result<Vec<BranchRef>, CodegraphError>;

    /// Visit the full commit log, newest first. The first callback error
    /// stops the walk and is returned.
    fn for_each_commit(
        &self,
        f: &mut dyn FnMut(&CommitRecord) -> Result<(), CodegraphError>,
    ) -> Result<(), CodegraphError>;

    /// Every blob in the commit's tree.
    fn files_at(&self, commit: &str) -> Result<Vec<FileEntry>, CodegraphError>;

    /// Raw blob content.
    fn read_blob(&self, hash: &str) -> Result<Vec<u8>, CodegraphError>;

    /// Diff `parent`'s tree (or the empty tree) against `commit`'s tree.
    fn diff_trees(
        &self,
        parent: Option<&str>,
        commit: &str,
    ) -> Result<Vec<ChangeRecord>, CodegraphError>;
}
