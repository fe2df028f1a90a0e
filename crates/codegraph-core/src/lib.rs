//! # codegraph-core
//!
//! The deterministic encoding engine for codegraph.
//!
//! This crate turns a repository's commit history and the syntax trees of
//! its files into one set of subject-predicate-object-label quads.
//!
//! ## Architectural Constraints
//!
//! - Does not parse git objects: history comes from a `RepositorySource`
//! - Does not parse source code: trees come from an `AstParser`
//! - Identifiers are content-addressed wherever the source allows it, so
//!   re-importing into the same store adds nothing
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod ast;
pub mod classify;
pub mod formats;
pub mod graph;
pub mod identity;
pub mod lang;
pub mod primitives;
pub mod sink;
pub mod source;
pub mod stats;
pub mod storage;
pub mod types;
pub mod walker;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{CodegraphError, Quad, Value};

// =============================================================================
// RE-EXPORTS: Encoding Engine
// =============================================================================

pub use ast::{AstEncoder, AstExporter, AstNode, AstParser, ParseError, ParsedAst};
pub use classify::classify;
pub use graph::{MemoryStore, QuadStore};
pub use identity::{AstIdGenerator, AstIdPolicy, author_id, blob_iri, branch_iri, commit_iri};
pub use lang::{ExtensionDetector, LanguageDetector};
pub use sink::{BatchWriter, QuadSink, QuadWriter};
pub use source::{
    BranchRef, ChangeAction, ChangeRecord, CommitRecord, FileEntry, RepositorySource, Signature,
};
pub use stats::{CommitStats, SortBy, StatsAggregator, StatsQuery, rank};
pub use storage::RedbStore;
pub use walker::{BlobHook, ImportStats, Importer};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{NQuadsReader, NQuadsWriter};
