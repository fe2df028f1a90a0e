//! # Encoding Benchmarks
//!
//! Performance benchmarks for codegraph-core encoding and storage.
//!
//! Run with: `cargo bench -p codegraph-core`

use codegraph_core::formats::parse_line;
use codegraph_core::{
    AstEncoder, AstIdPolicy, AstNode, MemoryStore, Quad, QuadStore, SortBy, StatsAggregator,
    StatsQuery, Value,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// A file-like tree: `width` statements, each with an identifier and a position.
fn create_tree(width: usize) -> AstNode {
    let statements = (0..width)
        .map(|i| {
            AstNode::object([
                ("@type", AstNode::from("go:AssignStmt")),
                (
                    "Lhs",
                    AstNode::object([
                        ("@type", AstNode::from("go:Ident")),
                        ("Name", AstNode::String(format!("v{}", i))),
                    ]),
                ),
                (
                    "@pos",
                    AstNode::object([
                        ("@type", AstNode::from("uast:Positions")),
                        ("start", AstNode::Int(i as i64)),
                    ]),
                ),
            ])
        })
        .collect();
    AstNode::object([
        ("@type", AstNode::from("go:File")),
        ("Decls", AstNode::Array(statements)),
    ])
}

/// A store with `commits` commits under one repository, each touching three blobs.
fn create_history(commits: usize) -> MemoryStore {
    let repo = Value::iri("https://example.com/repo");
    let mut store = MemoryStore::new();
    store
        .insert(Quad::new(
            repo.clone(),
            Value::iri("rdf:type"),
            Value::iri("git:Repo"),
        ))
        .expect("insert");

    for i in 0..commits {
        let c = Value::iri(format!("sha1:c{}", i));
        store
            .insert(Quad::new(repo.clone(), Value::iri("git:commit"), c.clone()))
            .expect("insert");
        for j in 0..3 {
            let blob = Value::iri(format!("sha1:b{}", i * 3 + j));
            store
                .insert(Quad::new(blob, Value::iri("git:add"), c.clone()).with_label("f"))
                .expect("insert");
        }
    }
    store
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_ast_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("ast_encoding");
    let file = Value::iri("sha1:f00d");

    for width in [10, 100, 1000] {
        let tree = create_tree(width);
        for policy in [AstIdPolicy::ContentAddressed, AstIdPolicy::Random] {
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", policy), width),
                &tree,
                |b, tree| {
                    let mut encoder = AstEncoder::new(policy);
                    b.iter(|| encoder.encode(black_box(&file), black_box(tree)));
                },
            );
        }
    }
    group.finish();
}

fn bench_nquads_parse(c: &mut Criterion) {
    let line = Quad::new(
        Value::iri("sha1:2f1a"),
        Value::iri("git:author"),
        Value::blank("93b885adfe0da089cdf634904fd59f71"),
    )
    .with_label("2017-06-01T12:00:00-07:00")
    .to_string();

    c.bench_function("nquads_parse_line", |b| {
        b.iter(|| parse_line(1, black_box(&line)))
    });
}

fn bench_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("repository_stats");

    for size in [100, 1000] {
        let store = create_history(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &store, |b, store| {
            let agg = StatsAggregator::new(store);
            let repo = Value::iri("https://example.com/repo");
            let query = StatsQuery {
                sort: SortBy::Touched,
                limit: 10,
                exclude_merges: false,
            };
            b.iter(|| agg.repository_stats(black_box(&repo), &query))
        });
        assert_eq!(store.quad_count().expect("count"), 1 + size * 4);
    }
    group.finish();
}

criterion_group!(benches, bench_ast_encoding, bench_nquads_parse, bench_stats);
criterion_main!(benches);
