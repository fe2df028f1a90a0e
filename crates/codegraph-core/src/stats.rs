//! # Statistics Aggregator
//!
//! Per-commit metrics computed from a persisted graph, and their ranking.
//!
//! Every metric is a count of quads along one predicate, so the aggregator
//! works against any `QuadStore` and never needs the repository itself.

use crate::graph::QuadStore;
use crate::primitives::{
    PRED_ADD, PRED_COMMIT, PRED_FILE, PRED_MESSAGE, PRED_MODIFY, PRED_PARENT, PRED_REMOVE,
    PRED_TYPE, TYPE_REPO, iri,
};
use crate::{CodegraphError, Value};
use serde::Serialize;
use std::str::FromStr;

/// Metrics of one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitStats {
    /// Commit identifier, rendered as an N-Quads term.
    pub commit: String,
    pub message: String,
    pub parents: usize,
    pub files: usize,
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

impl CommitStats {
    /// Sum of added, removed and modified.
    #[must_use]
    pub fn touched(&self) -> usize {
        self.added
            .saturating_add(self.removed)
            .saturating_add(self.modified)
    }

    /// More than one parent.
    #[must_use]
    pub fn is_merge(&self) -> bool {
        self.parents > 1
    }
}

/// Ranking key. Always descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Added,
    Removed,
    Modified,
    Files,
    #[default]
    Touched,
}

impl SortBy {
    fn key(self, stats: &CommitStats) -> usize {
        match self {
            Self::Added => stats.added,
            Self::Removed => stats.removed,
            Self::Modified => stats.modified,
            Self::Files => stats.files,
            Self::Touched => stats.touched(),
        }
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "add" | "added" => Ok(Self::Added),
            "remove" | "removed" => Ok(Self::Removed),
            "modify" | "modified" => Ok(Self::Modified),
            "file" | "files" => Ok(Self::Files),
            "touch" | "touched" => Ok(Self::Touched),
            other => Err(format!(
                "unknown sort '{}' (expected add, remove, modify, file or touch)",
                other
            )),
        }
    }
}

/// What to rank and how much of it to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsQuery {
    pub sort: SortBy,
    /// Maximum number of results; 0 keeps everything.
    pub limit: usize,
    pub exclude_merges: bool,
}

/// Filter merges, sort descending (stable), then truncate.
#[must_use]
pub fn rank(mut stats: Vec<CommitStats>, query: &StatsQuery) -> Vec<CommitStats> {
    if query.exclude_merges {
        stats.retain(|s| !s.is_merge());
    }
    stats.sort_by(|a, b| query.sort.key(b).cmp(&query.sort.key(a)));
    if query.limit > 0 {
        stats.truncate(query.limit);
    }
    stats
}

// =============================================================================
// AGGREGATOR
// =============================================================================

/// Read-only statistics over a quad store.
pub struct StatsAggregator<'g, G: QuadStore + ?Sized> {
    graph: &'g G,
}

impl<'g, G: QuadStore + ?Sized> StatsAggregator<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self { graph }
    }

    /// Metrics of one commit.
    pub fn commit_stats(&self, commit: &Value) -> Result<CommitStats, CodegraphError> {
        let message = self
            .graph
            .objects(commit, &iri(PRED_MESSAGE))?
            .into_iter()
            .find_map(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        Ok(CommitStats {
            commit: commit.to_string(),
            message,
            parents: self.graph.count_out(commit, &iri(PRED_PARENT))?,
            files: self.graph.count_out(commit, &iri(PRED_FILE))?,
            added: self.graph.count_in(&iri(PRED_ADD), commit)?,
            removed: self.graph.count_in(&iri(PRED_REMOVE), commit)?,
            modified: self.graph.count_in(&iri(PRED_MODIFY), commit)?,
        })
    }

    /// Every repository node in the store.
    pub fn repositories(&self) -> Result<Vec<Value>, CodegraphError> {
        self.graph.subjects(&iri(PRED_TYPE), &iri(TYPE_REPO))
    }

    /// Ranked metrics of every commit of `repo`.
    pub fn repository_stats(
        &self,
        repo: &Value,
        query: &StatsQuery,
    ) -> Result<Vec<CommitStats>, CodegraphError> {
        let commits = self.graph.objects(repo, &iri(PRED_COMMIT))?;
        let stats = commits
            .iter()
            .map(|c| self.commit_stats(c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rank(stats, query))
    }
}

// =============================================================================
// TESTS
// =============================================================================
