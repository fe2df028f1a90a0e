//! # Repository History Walker
//!
//! Drives a full import of one repository: repository and branch nodes,
//! then every commit of the log with its signatures, parents, tree
//! membership and changes.
//!
//! An `Importer` owns the blob seen-set, so a blob's descriptive quads are
//! written once per importer no matter how many commits or repositories
//! reference it. Quads of one commit are handed to the sink as one batch.

use crate::classify::classify;
use crate::identity::{author_id, blob_iri, branch_iri, commit_iri};
use crate::primitives::{
    BRANCH_REF_PREFIX, PRED_AUTHOR, PRED_BRANCH, PRED_CHILD, PRED_COMMIT, PRED_COMMITTER,
    PRED_EMAIL, PRED_FILE, PRED_FILENAME, PRED_GEPHI_INLINE, PRED_MESSAGE, PRED_METADATA,
    PRED_NAME, PRED_PARENT, PRED_TYPE, TYPE_AUTHOR, TYPE_BRANCH, TYPE_COMMIT, TYPE_FILE,
    TYPE_REPO, iri,
};
use crate::sink::QuadSink;
use crate::source::{CommitRecord, RepositorySource, Signature};
use crate::{CodegraphError, Quad, Value};
use std::collections::BTreeSet;

// =============================================================================
// BLOB HOOK
// =============================================================================

/// Called once per distinct blob, after its type and filename quads.
pub trait BlobHook {
    /// Append quads describing the blob to `out`.
    fn on_blob(
        &mut self,
        blob: &Value,
        path: &str,
        content: &[u8],
        out: &mut Vec<Quad>,
    ) -> Result<(), CodegraphError>;
}

// =============================================================================
// IMPORTER
// =============================================================================

/// Counters for one repository import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub commits: usize,
    /// Blobs seen for the first time.
    pub files: usize,
    pub quads: usize,
}

/// Imports repositories into a quad sink.
#[derive(Default)]
pub struct Importer {
    seen_blobs: BTreeSet<String>,
    hook: Option<Box<dyn BlobHook>>,
    metadata_written: bool,
}

impl std::fmt::Debug for Importer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Importer")
            .field("seen_blobs", &self.seen_blobs.len())
            .field("hook", &self.hook.is_some())
            .field("metadata_written", &self.metadata_written)
            .finish()
    }
}

impl Importer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a hook that sees every new blob and its content.
    #[must_use]
    pub fn with_hook(mut self, hook: Box<dyn BlobHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Import one repository. The first error aborts the import.
    pub fn import<S: RepositorySource + ?Sized>(
        &mut self,
        source: &S,
        sink: &mut QuadSink<'_>,
    ) -> Result<ImportStats, CodegraphError> {
        let start = sink.written();
        let mut stats = ImportStats::default();

        let repo_iri = source.canonical_iri()?;
        let repo = Value::iri(repo_iri.as_str());
        tracing::info!(repo = %repo_iri, "Importing repository");

        let mut quads = Vec::new();
        if !self.metadata_written {
            let inline = iri(PRED_GEPHI_INLINE);
            quads.push(Quad::new(iri(PRED_METADATA), inline.clone(), Value::Bool(true)));
            quads.push(Quad::new(iri(PRED_MESSAGE), inline, Value::Bool(true)));
            self.metadata_written = true;
        }
        quads.push(Quad::new(repo.clone(), iri(PRED_TYPE), iri(TYPE_REPO)));

        for branch in source.branches()? {
            let b = branch_iri(&repo_iri, &branch.name);
            let short = branch
                .name
                .strip_prefix(BRANCH_REF_PREFIX)
                .unwrap_or(&branch.name);
            quads.push(Quad::new(repo.clone(), iri(PRED_BRANCH), b.clone()));
            quads.push(Quad::new(b.clone(), iri(PRED_COMMIT), commit_iri(&branch.head)));
            quads.push(Quad::new(b.clone(), iri(PRED_TYPE), iri(TYPE_BRANCH)));
            quads.push(Quad::new(b, iri(PRED_NAME), Value::string(short)));
        }
        sink.write(&quads)?;

        source.for_each_commit(&mut |commit| {
            let quads = self.commit_quads(source, &repo, commit, &mut stats)?;
            sink.write(&quads)?;
            stats.commits += 1;
            Ok(())
        })?;

        stats.quads = sink.written().saturating_sub(start);
        tracing::info!(
            repo = %repo_iri,
            commits = stats.commits,
            files = stats.files,
            quads = stats.quads,
            "Imported repository"
        );
        Ok(stats)
    }

    fn commit_quads<S: RepositorySource + ?Sized>(
        &mut self,
        source: &S,
        repo: &Value,
        commit: &CommitRecord,
        stats: &mut ImportStats,
    ) -> Result<Vec<Quad>, CodegraphError> {
        let c = commit_iri(&commit.hash);
        let mut quads = vec![
            Quad::new(repo.clone(), iri(PRED_COMMIT), c.clone()),
            Quad::new(c.clone(), iri(PRED_TYPE), iri(TYPE_COMMIT)),
            Quad::new(c.clone(), iri(PRED_METADATA), Value::string(&commit.metadata)),
            Quad::new(c.clone(), iri(PRED_MESSAGE), Value::string(&commit.message)),
        ];

        signature_quads(&c, PRED_AUTHOR, &commit.author, &mut quads);
        signature_quads(&c, PRED_COMMITTER, &commit.committer, &mut quads);

        for parent in &commit.parents {
            let p = commit_iri(parent);
            quads.push(Quad::new(c.clone(), iri(PRED_PARENT), p.clone()));
            quads.push(Quad::new(p, iri(PRED_CHILD), c.clone()));
        }

        for file in source.files_at(&commit.hash)? {
            let f = blob_iri(&file.blob);
            quads.push(
                Quad::new(c.clone(), iri(PRED_FILE), f.clone()).with_label(file.path.as_str()),
            );
            if !self.seen_blobs.insert(file.blob.clone()) {
                continue;
            }

            stats.files += 1;
            quads.push(Quad::new(f.clone(), iri(PRED_TYPE), iri(TYPE_FILE)));
            quads.push(Quad::new(
                f.clone(),
                iri(PRED_FILENAME),
                Value::string(file.path.as_str()),
            ));
            if let Some(hook) = self.hook.as_mut() {
                let content = source.read_blob(&file.blob)?;
                hook.on_blob(&f, &file.path, &content, &mut quads)?;
            }
        }

        let base = commit.parents.first().map(String::as_str);
        for change in source.diff_trees(base, &commit.hash)? {
            if let Some(quad) = classify(&change, &c)? {
                quads.push(quad);
            }
        }

        Ok(quads)
    }
}

/// `(C, pred, A, when)` plus the person's own quads.
fn signature_quads(commit: &Value, predicate: &str, sig: &Signature, out: &mut Vec<Quad>) {
    let person = author_id(&sig.name, &sig.email);
    out.push(Quad::new(commit.clone(), iri(predicate), person.clone()).with_label(sig.when));
    out.push(Quad::new(person.clone(), iri(PRED_TYPE), iri(TYPE_AUTHOR)));
    out.push(Quad::new(
        person.clone(),
        iri(PRED_NAME),
        Value::string(sig.name.as_str()),
    ));
    if !sig.email.is_empty() {
        out.push(Quad::new(person, iri(PRED_EMAIL), Value::iri(sig.email.as_str())));
    }
}

// =============================================================================
// TESTS
// =============================================================================
