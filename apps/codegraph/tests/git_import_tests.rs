//! Import tests against real repositories built with git2 in temp directories.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use codegraph::GitSource;
use codegraph_core::primitives::{PRED_LANGUAGE, PRED_METADATA, PRED_NAME, iri};
use codegraph_core::{
    AstExporter, Importer, MemoryStore, QuadSink, QuadStore, RedbStore, RepositorySource,
    StatsAggregator, StatsQuery, Value, blob_iri, branch_iri, commit_iri,
};
use git2::{Oid, Repository, RepositoryInitOptions, Signature, Time};
use std::path::Path;

// =============================================================================
// FIXTURE
// =============================================================================

/// Commit ids of the fixture repository.
///
/// ```text
/// c1 (a.go, README.md) ── c2 (a.go modified, b.go added) ── m
///   └──────────────────── c3 (c.txt added) ─────────────────┘
/// ```
struct Fixture {
    _dir: tempfile::TempDir,
    path: std::path::PathBuf,
    c1: Oid,
    c2: Oid,
    c3: Oid,
    m: Oid,
}

fn signature(secs: i64) -> Signature<'static> {
    Signature::new("Ada", "ada@example.com", &Time::new(secs, 120)).unwrap()
}

fn tree(repo: &Repository, files: &[(&str, &str)]) -> Oid {
    let mut builder = repo.treebuilder(None).unwrap();
    for (name, content) in files {
        let blob = repo.blob(content.as_bytes()).unwrap();
        builder.insert(name, blob, 0o100_644).unwrap();
    }
    builder.write().unwrap()
}

fn commit(
    repo: &Repository,
    update_ref: Option<&str>,
    secs: i64,
    message: &str,
    files: &[(&str, &str)],
    parents: &[Oid],
) -> Oid {
    let tree = repo.find_tree(tree(repo, files)).unwrap();
    let parents: Vec<_> = parents.iter().map(|p| repo.find_commit(*p).unwrap()).collect();
    let parents: Vec<_> = parents.iter().collect();
    let sig = signature(secs);
    repo.commit(update_ref, &sig, &sig, message, &tree, &parents)
        .unwrap()
}

fn init(dir: &Path) -> Repository {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    Repository::init_opts(dir, &opts).unwrap()
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_path_buf();
    let repo = init(&path);

    let a1 = ("a.go", "package a\n");
    let a2 = ("a.go", "package a\n\nfunc A() {}\n");
    let readme = ("README.md", "# fixture\n");
    let b = ("b.go", "package b\n");
    let c = ("c.txt", "side\n");

    let c1 = commit(&repo, Some("HEAD"), 1_000, "Initial\n", &[a1, readme], &[]);
    let c2 = commit(&repo, Some("HEAD"), 2_000, "Change a, add b\n", &[a2, readme, b], &[c1]);
    let c3 = commit(&repo, None, 3_000, "Side file\n", &[a1, readme, c], &[c1]);
    let m = commit(
        &repo,
        Some("HEAD"),
        4_000,
        "Merge side\n",
        &[a2, readme, b, c],
        &[c2, c3],
    );

    Fixture {
        _dir: dir,
        path,
        c1,
        c2,
        c3,
        m,
    }
}

fn import_into_memory(path: &Path) -> MemoryStore {
    let source = GitSource::open(path).unwrap();
    let mut store = MemoryStore::new();
    let mut importer = Importer::new().with_hook(Box::new(AstExporter::default()));
    let mut sink = QuadSink::new(&mut store);
    importer.import(&source, &mut sink).unwrap();
    store
}

fn c(oid: Oid) -> Value {
    commit_iri(&oid.to_string())
}

// =============================================================================
// SOURCE TESTS
// =============================================================================

#[test]
fn test_log_walks_every_commit_from_head() {
    let fx = fixture();
    let source = GitSource::open(&fx.path).unwrap();

    let mut seen = Vec::new();
    source
        .for_each_commit(&mut |commit| {
            seen.push(commit.hash.clone());
            Ok(())
        })
        .unwrap();

    let expected: Vec<String> = [fx.m, fx.c3, fx.c2, fx.c1]
        .iter()
        .map(|o| o.to_string())
        .collect();
    assert_eq!(seen, expected);
}

#[test]
fn test_commit_record_fields() {
    let fx = fixture();
    let source = GitSource::open(&fx.path).unwrap();

    let mut merge = None;
    source
        .for_each_commit(&mut |commit| {
            if commit.hash == fx.m.to_string() {
                merge = Some(commit.clone());
            }
            Ok(())
        })
        .unwrap();

    let merge = merge.unwrap();
    assert_eq!(merge.parents, vec![fx.c2.to_string(), fx.c3.to_string()]);
    assert_eq!(merge.author.name, "Ada");
    assert_eq!(merge.author.email, "ada@example.com");
    assert_eq!(merge.author.when.offset().local_minus_utc(), 7_200);
    assert_eq!(merge.message, "Merge side\n");
    assert!(merge.metadata.starts_with(&format!("commit {}\n", fx.m)));
    assert!(merge.metadata.contains("Author: Ada <ada@example.com>"));
}

#[test]
fn test_files_and_diffs() {
    let fx = fixture();
    let source = GitSource::open(&fx.path).unwrap();

    let mut paths: Vec<String> = source
        .files_at(&fx.m.to_string())
        .unwrap()
        .into_iter()
        .map(|f| f.path)
        .collect();
    paths.sort();
    assert_eq!(paths, vec!["README.md", "a.go", "b.go", "c.txt"]);

    let root = source.diff_trees(None, &fx.c1.to_string()).unwrap();
    assert_eq!(root.len(), 2);
    assert!(root.iter().all(|ch| ch.from_hash.is_none() && ch.to_hash.is_some()));
}

#[test]
fn test_branches_and_canonical_iri() {
    let fx = fixture();
    let source = GitSource::open(&fx.path).unwrap();

    let branches = source.branches().unwrap();
    assert_eq!(branches.len(), 1);
    assert_eq!(branches[0].name, "refs/heads/main");
    assert_eq!(branches[0].head, fx.m.to_string());

    let canonical = fx.path.canonicalize().unwrap();
    assert_eq!(
        source.canonical_iri().unwrap(),
        canonical.to_string_lossy()
    );

    let repo = Repository::open(&fx.path).unwrap();
    repo.remote("origin", "https://example.com/fixture.git")
        .unwrap();
    let source = GitSource::open(&fx.path).unwrap();
    assert_eq!(
        source.canonical_iri().unwrap(),
        "https://example.com/fixture.git"
    );
}

#[test]
fn test_empty_repository_has_no_commits() {
    let dir = tempfile::tempdir().unwrap();
    init(dir.path());
    let source = GitSource::open(dir.path()).unwrap();

    let mut count = 0;
    source
        .for_each_commit(&mut |_| {
            count += 1;
            Ok(())
        })
        .unwrap();
    assert_eq!(count, 0);
}

// =============================================================================
// IMPORT TESTS
// =============================================================================

#[test]
fn test_import_change_counts() {
    let fx = fixture();
    let store = import_into_memory(&fx.path);
    let agg = StatsAggregator::new(&store);

    let root = agg.commit_stats(&c(fx.c1)).unwrap();
    assert_eq!((root.added, root.removed, root.modified), (2, 0, 0));
    assert_eq!(root.files, 2);

    let second = agg.commit_stats(&c(fx.c2)).unwrap();
    assert_eq!((second.added, second.removed, second.modified), (1, 0, 1));

    let merge = agg.commit_stats(&c(fx.m)).unwrap();
    assert!(merge.is_merge());
    assert_eq!((merge.added, merge.removed, merge.modified), (1, 0, 0));
    assert_eq!(merge.files, 4);
}

#[test]
fn test_reimport_adds_nothing() {
    let fx = fixture();
    let mut store = import_into_memory(&fx.path);
    let before = store.len();

    let source = GitSource::open(&fx.path).unwrap();
    let mut importer = Importer::new().with_hook(Box::new(AstExporter::default()));
    let mut sink = QuadSink::new(&mut store);
    importer.import(&source, &mut sink).unwrap();
    drop(sink);

    assert_eq!(store.len(), before);
}

#[test]
fn test_branch_and_language_quads() {
    let fx = fixture();
    let store = import_into_memory(&fx.path);
    let repo = fx.path.canonicalize().unwrap();
    let branch = branch_iri(&repo.to_string_lossy(), "refs/heads/main");

    assert_eq!(
        store.objects(&branch, &iri(PRED_NAME)).unwrap(),
        vec![Value::string("main")]
    );

    let repo = Repository::open(&fx.path).unwrap();
    let a_go = repo.blob("package a\n".as_bytes()).unwrap();
    assert_eq!(
        store
            .objects(&blob_iri(&a_go.to_string()), &iri(PRED_LANGUAGE))
            .unwrap(),
        vec![Value::string("Go")]
    );

    let meta = store.objects(&c(fx.c1), &iri(PRED_METADATA)).unwrap();
    assert_eq!(meta.len(), 1);
    assert!(meta[0].as_str().unwrap().contains("    Initial"));
}

#[test]
fn test_redb_import_persists_and_ranks() {
    let fx = fixture();
    let db_dir = tempfile::tempdir().unwrap();
    let db = db_dir.path().join("codegraph.db");

    let memory = import_into_memory(&fx.path);
    {
        let source = GitSource::open(&fx.path).unwrap();
        let mut store = RedbStore::open(&db).unwrap();
        let mut importer = Importer::new().with_hook(Box::new(AstExporter::default()));
        let mut sink = QuadSink::new(&mut store);
        let stats = importer.import(&source, &mut sink).unwrap();
        assert_eq!(stats.commits, 4);
    }

    let store = RedbStore::open(&db).unwrap();
    assert_eq!(store.quad_count().unwrap(), memory.len());

    let agg = StatsAggregator::new(&store);
    let repos = agg.repositories().unwrap();
    assert_eq!(repos.len(), 1);

    let ranked = agg
        .repository_stats(&repos[0], &StatsQuery::default())
        .unwrap();
    assert_eq!(ranked.len(), 4);
    assert_eq!(ranked[0].commit, c(fx.c2).to_string());
    assert_eq!(ranked[0].touched(), 2);

    let no_merges = agg
        .repository_stats(
            &repos[0],
            &StatsQuery {
                exclude_merges: true,
                ..StatsQuery::default()
            },
        )
        .unwrap();
    assert_eq!(no_merges.len(), 3);
}
