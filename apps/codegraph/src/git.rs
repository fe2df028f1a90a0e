//! # Git Repository Source
//!
//! `RepositorySource` over a local repository, using libgit2.
//!
//! The commit log starts at HEAD and is sorted by commit time, newest first.
//! Diffs carry no rename detection: a rename shows up as a deletion plus an
//! insertion.

use chrono::{DateTime, FixedOffset};
use codegraph_core::{
    BranchRef, ChangeAction, ChangeRecord, CodegraphError, CommitRecord, FileEntry,
    RepositorySource, Signature,
};
use git2::{
    BranchType, Delta, ErrorCode, ObjectType, Oid, Repository, Sort, TreeWalkMode, TreeWalkResult,
};
use std::path::{Path, PathBuf};

fn repo_err(e: git2::Error) -> CodegraphError {
    CodegraphError::Repository(e.message().to_string())
}

/// A repository opened from a local path.
pub struct GitSource {
    repo: Repository,
    path: PathBuf,
}

impl std::fmt::Debug for GitSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitSource")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl GitSource {
    /// Open the repository at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CodegraphError> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|e| {
            CodegraphError::Repository(format!("Cannot open '{}': {}", path.display(), e.message()))
        })?;
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Ok(Self { repo, path })
    }

    fn find_commit(&self, hash: &str) -> Result<git2::Commit<'_>, CodegraphError> {
        let oid = Oid::from_str(hash).map_err(repo_err)?;
        self.repo.find_commit(oid).map_err(repo_err)
    }

    fn record(&self, commit: &git2::Commit<'_>) -> Result<CommitRecord, CodegraphError> {
        let hash = commit.id().to_string();
        let author = signature(&commit.author())?;
        let committer = signature(&commit.committer())?;
        let message = String::from_utf8_lossy(commit.message_bytes()).into_owned();
        let metadata = render_metadata(&hash, &author, &message);

        Ok(CommitRecord {
            hash,
            parents: commit.parent_ids().map(|id| id.to_string()).collect(),
            author,
            committer,
            message,
            metadata,
        })
    }
}

fn signature(sig: &git2::Signature<'_>) -> Result<Signature, CodegraphError> {
    let time = sig.when();
    let offset = FixedOffset::east_opt(time.offset_minutes().saturating_mul(60)).ok_or_else(|| {
        CodegraphError::Repository(format!("invalid UTC offset {}m", time.offset_minutes()))
    })?;
    let when = DateTime::from_timestamp(time.seconds(), 0)
        .ok_or_else(|| CodegraphError::Repository(format!("invalid timestamp {}", time.seconds())))?
        .with_timezone(&offset);

    Ok(Signature {
        name: String::from_utf8_lossy(sig.name_bytes()).into_owned(),
        email: String::from_utf8_lossy(sig.email_bytes()).into_owned(),
        when,
    })
}

/// Render a commit the way `git log` prints it.
#[must_use]
pub fn render_metadata(hash: &str, author: &Signature, message: &str) -> String {
    let mut out = format!(
        "commit {}\nAuthor: {} <{}>\nDate:   {}\n\n",
        hash,
        author.name,
        author.email,
        author.when.format("%a %b %d %H:%M:%S %Y %z"),
    );
    for line in message.trim_end_matches('\n').lines() {
        out.push_str("    ");
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn path_string(path: Option<&Path>) -> Option<String> {
    path.map(|p| p.to_string_lossy().into_owned())
}

impl RepositorySource for GitSource {
    fn canonical_iri(&self) -> Result<String, CodegraphError> {
        if let Ok(remote) = self.repo.find_remote("origin")
            && let Some(url) = remote.url()
            && !url.is_empty()
        {
            return Ok(url.to_string());
        }
        Ok(self.path.to_string_lossy().into_owned())
    }

    fn branches(&self) -> Result<Vec<BranchRef>, CodegraphError> {
        let mut branches = Vec::new();
        for entry in self.repo.branches(Some(BranchType::Local)).map_err(repo_err)? {
            let (branch, _) = entry.map_err(repo_err)?;
            let reference = branch.get();
            let (Some(name), Some(head)) = (reference.name(), reference.target()) else {
                continue;
            };
            branches.push(BranchRef {
                name: name.to_string(),
                head: head.to_string(),
            });
        }
        Ok(branches)
    }

    fn for_each_commit(
        &self,
        f: &mut dyn FnMut(&CommitRecord) -> Result<(), CodegraphError>,
    ) -> Result<(), CodegraphError> {
        let mut revwalk = self.repo.revwalk().map_err(repo_err)?;
        revwalk.set_sorting(Sort::TIME).map_err(repo_err)?;
        match revwalk.push_head() {
            Ok(()) => {}
            // Empty repository: no history to walk.
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(());
            }
            Err(e) => return Err(repo_err(e)),
        }

        for oid in revwalk {
            let oid = oid.map_err(repo_err)?;
            let commit = self.repo.find_commit(oid).map_err(repo_err)?;
            f(&self.record(&commit)?)?;
        }
        Ok(())
    }

    fn files_at(&self, commit: &str) -> Result<Vec<FileEntry>, CodegraphError> {
        let tree = self.find_commit(commit)?.tree().map_err(repo_err)?;

        let mut files = Vec::new();
        tree.walk(TreeWalkMode::PreOrder, |dir, entry| {
            if entry.kind() == Some(ObjectType::Blob) {
                let name = String::from_utf8_lossy(entry.name_bytes());
                files.push(FileEntry {
                    path: format!("{}{}", dir, name),
                    blob: entry.id().to_string(),
                });
            }
            TreeWalkResult::Ok
        })
        .map_err(repo_err)?;
        Ok(files)
    }

    fn read_blob(&self, hash: &str) -> Result<Vec<u8>, CodegraphError> {
        let oid = Oid::from_str(hash).map_err(repo_err)?;
        let blob = self.repo.find_blob(oid).map_err(repo_err)?;
        Ok(blob.content().to_vec())
    }

    fn diff_trees(
        &self,
        parent: Option<&str>,
        commit: &str,
    ) -> Result<Vec<ChangeRecord>, CodegraphError> {
        let tree = self.find_commit(commit)?.tree().map_err(repo_err)?;
        let parent_tree = match parent {
            Some(hash) => Some(self.find_commit(hash)?.tree().map_err(repo_err)?),
            None => None,
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
            .map_err(repo_err)?;

        let mut changes = Vec::new();
        for delta in diff.deltas() {
            let action = match delta.status() {
                Delta::Added => ChangeAction::Insert,
                Delta::Deleted => ChangeAction::Delete,
                Delta::Modified => ChangeAction::Modify,
                _ => ChangeAction::Other,
            };
            let old = delta.old_file();
            let new = delta.new_file();
            let side = |id: Oid| (!id.is_zero()).then(|| id.to_string());

            changes.push(ChangeRecord {
                action,
                from_path: path_string(old.path()),
                from_hash: side(old.id()),
                to_path: path_string(new.path()),
                to_hash: side(new.id()),
            });
        }
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_looks_like_git_log() {
        let author = Signature {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            when: DateTime::parse_from_rfc3339("2017-06-01T12:00:00-07:00").expect("time"),
        };
        let text = render_metadata("abc123", &author, "Fix parser\n\nDetails here.\n");
        assert_eq!(
            text,
            "commit abc123\n\
             Author: Ada <ada@example.com>\n\
             Date:   Thu Jun 01 12:00:00 2017 -0700\n\
             \n    Fix parser\n    \n    Details here.\n"
        );
    }

    #[test]
    fn open_missing_repository_fails() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = GitSource::open(dir.path().join("nothing"));
        assert!(matches!(result, Err(CodegraphError::Repository(_))));
    }
}
