//! # redb-backed Quad Storage
//!
//! A disk-backed quad store using the redb embedded database.
//!
//! Layout:
//! - `quads`: quad id -> postcard-encoded `Quad`, ids assigned in arrival order
//! - `quad_keys`: N-Quads line -> quad id, for set semantics
//! - `out_index` / `in_index`: (node, predicate, quad id) -> (), so one hop
//!   along a predicate is a single range scan
//!
//! Batches are written in one ACID transaction.

use crate::graph::QuadStore;
use crate::sink::{BatchWriter, QuadWriter};
use crate::{CodegraphError, Quad, Value};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

/// Table for quads: QuadId(u64) -> serialized Quad bytes
const QUADS: TableDefinition<u64, &[u8]> = TableDefinition::new("quads");

/// Table for dedup: N-Quads rendering -> QuadId
const QUAD_KEYS: TableDefinition<&str, u64> = TableDefinition::new("quad_keys");

/// (node, predicate, quad id) -> ()
type NodeIndex = TableDefinition<'static, (&'static str, &'static str, u64), ()>;

/// Forward index: (subject, predicate, quad id)
const OUT_INDEX: NodeIndex = TableDefinition::new("out_index");

/// Backward index: (object, predicate, quad id)
const IN_INDEX: NodeIndex = TableDefinition::new("in_index");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_QUAD_ID: &str = "next_quad_id";

fn store_err(e: impl std::fmt::Display) -> CodegraphError {
    CodegraphError::Store(e.to_string())
}

/// A disk-backed quad store using redb.
pub struct RedbStore {
    db: Database,
    next_quad_id: u64,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("next_quad_id", &self.next_quad_id)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a quad database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CodegraphError> {
        let db = Database::create(path.as_ref()).map_err(store_err)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(store_err)?;
            let _ = write_txn.open_table(QUADS).map_err(store_err)?;
            let _ = write_txn.open_table(QUAD_KEYS).map_err(store_err)?;
            let _ = write_txn.open_table(OUT_INDEX).map_err(store_err)?;
            let _ = write_txn.open_table(IN_INDEX).map_err(store_err)?;
            let _ = write_txn.open_table(METADATA).map_err(store_err)?;
            write_txn.commit().map_err(store_err)?;
        }

        let next_quad_id = {
            let read_txn = db.begin_read().map_err(store_err)?;
            let table = read_txn.open_table(METADATA).map_err(store_err)?;
            table
                .get(NEXT_QUAD_ID)
                .map_err(store_err)?
                .map(|v| v.value())
                .unwrap_or(0)
        };

        Ok(Self { db, next_quad_id })
    }

    /// Compact the database file.
    pub fn compact(&mut self) -> Result<(), CodegraphError> {
        self.db.compact().map_err(store_err)?;
        Ok(())
    }

    /// Insert quads in a single transaction. Returns how many were new.
    ///
    /// Every quad is validated before the transaction opens, so an invalid
    /// quad rejects the whole batch.
    pub fn insert_batch(&mut self, quads: &[Quad]) -> Result<usize, CodegraphError> {
        if quads.is_empty() {
            return Ok(0);
        }
        for quad in quads {
            quad.validate()?;
        }

        let mut next_id = self.next_quad_id;
        let mut inserted = 0;

        let write_txn = self.db.begin_write().map_err(store_err)?;
        {
            let mut quads_table = write_txn.open_table(QUADS).map_err(store_err)?;
            let mut keys_table = write_txn.open_table(QUAD_KEYS).map_err(store_err)?;
            let mut out_table = write_txn.open_table(OUT_INDEX).map_err(store_err)?;
            let mut in_table = write_txn.open_table(IN_INDEX).map_err(store_err)?;
            let mut meta_table = write_txn.open_table(METADATA).map_err(store_err)?;

            for quad in quads {
                let key = quad.to_string();
                if keys_table.get(key.as_str()).map_err(store_err)?.is_some() {
                    continue;
                }

                let id = next_id;
                next_id = next_id.saturating_add(1);

                let bytes = postcard::to_allocvec(quad)
                    .map_err(|e| CodegraphError::Serialization(e.to_string()))?;
                quads_table
                    .insert(id, bytes.as_slice())
                    .map_err(store_err)?;
                keys_table.insert(key.as_str(), id).map_err(store_err)?;

                let subject = quad.subject.to_string();
                let predicate = quad.predicate.to_string();
                let object = quad.object.to_string();
                out_table
                    .insert((subject.as_str(), predicate.as_str(), id), ())
                    .map_err(store_err)?;
                in_table
                    .insert((object.as_str(), predicate.as_str(), id), ())
                    .map_err(store_err)?;

                inserted += 1;
            }

            meta_table.insert(NEXT_QUAD_ID, next_id).map_err(store_err)?;
        }
        write_txn.commit().map_err(store_err)?;

        self.next_quad_id = next_id;
        Ok(inserted)
    }

    /// Quad ids reachable from `(node, predicate)` through one index.
    fn index_ids(
        &self,
        index: NodeIndex,
        node: &Value,
        predicate: &Value,
    ) -> Result<Vec<u64>, CodegraphError> {
        let node = node.to_string();
        let predicate = predicate.to_string();

        let read_txn = self.db.begin_read().map_err(store_err)?;
        let table = read_txn.open_table(index).map_err(store_err)?;

        let mut ids = Vec::new();
        for entry in table
            .range(
                (node.as_str(), predicate.as_str(), 0u64)
                    ..=(node.as_str(), predicate.as_str(), u64::MAX),
            )
            .map_err(store_err)?
        {
            let (key, _) = entry.map_err(store_err)?;
            let (_, _, id) = key.value();
            ids.push(id);
        }
        Ok(ids)
    }

    /// Load quads by id.
    fn load(&self, ids: &[u64]) -> Result<Vec<Quad>, CodegraphError> {
        let read_txn = self.db.begin_read().map_err(store_err)?;
        let table = read_txn.open_table(QUADS).map_err(store_err)?;

        let mut quads = Vec::with_capacity(ids.len());
        for &id in ids {
            let Some(data) = table.get(id).map_err(store_err)? else {
                return Err(CodegraphError::Store(format!(
                    "index points at missing quad {}",
                    id
                )));
            };
            let quad: Quad = postcard::from_bytes(data.value())
                .map_err(|e| CodegraphError::Serialization(e.to_string()))?;
            quads.push(quad);
        }
        Ok(quads)
    }
}

// =============================================================================
// WRITER IMPLEMENTATIONS
// =============================================================================

impl QuadWriter for RedbStore {
    fn write_quad(&mut self, quad: &Quad) -> Result<(), CodegraphError> {
        self.insert_batch(std::slice::from_ref(quad)).map(|_| ())
    }

    fn as_batch(&mut self) -> Option<&mut dyn BatchWriter> {
        Some(self)
    }
}

impl BatchWriter for RedbStore {
    fn write_quads(&mut self, quads: &[Quad]) -> Result<usize, CodegraphError> {
        // Duplicates count as accepted: the store already holds them.
        self.insert_batch(quads)?;
        Ok(quads.len())
    }
}

// =============================================================================
// QUADSTORE TRAIT IMPLEMENTATION
// =============================================================================

impl QuadStore for RedbStore {
    fn objects(&self, subject: &Value, predicate: &Value) -> Result<Vec<Value>, CodegraphError> {
        let ids = self.index_ids(OUT_INDEX, subject, predicate)?;
        Ok(self.load(&ids)?.into_iter().map(|q| q.object).collect())
    }

    fn subjects(&self, predicate: &Value, object: &Value) -> Result<Vec<Value>, CodegraphError> {
        let ids = self.index_ids(IN_INDEX, object, predicate)?;
        Ok(self.load(&ids)?.into_iter().map(|q| q.subject).collect())
    }

    fn count_out(&self, subject: &Value, predicate: &Value) -> Result<usize, CodegraphError> {
        Ok(self.index_ids(OUT_INDEX, subject, predicate)?.len())
    }

    fn count_in(&self, predicate: &Value, object: &Value) -> Result<usize, CodegraphError> {
        Ok(self.index_ids(IN_INDEX, object, predicate)?.len())
    }

    fn quad_count(&self) -> Result<usize, CodegraphError> {
        let read_txn = self.db.begin_read().map_err(store_err)?;
        let table = read_txn.open_table(QUADS).map_err(store_err)?;
        let count = table.len().map_err(store_err)?;
        Ok(count as usize)
    }

    fn for_each_quad(
        &self,
        f: &mut dyn FnMut(&Quad) -> Result<(), CodegraphError>,
    ) -> Result<(), CodegraphError> {
        let read_txn = self.db.begin_read().map_err(store_err)?;
        let table = read_txn.open_table(QUADS).map_err(store_err)?;
        for entry in table.iter().map_err(store_err)? {
            let (_, value) = entry.map_err(store_err)?;
            let quad: Quad = postcard::from_bytes(value.value())
                .map_err(|e| CodegraphError::Serialization(e.to_string()))?;
            f(&quad)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::sink::QuadSink;
    use chrono::DateTime;
    use tempfile::tempdir;

    fn q(s: &str, p: &str, o: Value) -> Quad {
        Quad::new(Value::iri(s), Value::iri(p), o)
    }

    #[test]
    fn basic_operations() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        let n = store
            .insert_batch(&[
                q("r", "git:commit", Value::iri("c1")),
                q("r", "git:commit", Value::iri("c2")),
                q("c2", "git:parent", Value::iri("c1")),
            ])
            .expect("insert");
        assert_eq!(n, 3);
        assert_eq!(store.quad_count().expect("count"), 3);

        let commits = store
            .objects(&Value::iri("r"), &Value::iri("git:commit"))
            .expect("objects");
        assert_eq!(commits, vec![Value::iri("c1"), Value::iri("c2")]);

        let children = store
            .subjects(&Value::iri("git:parent"), &Value::iri("c1"))
            .expect("subjects");
        assert_eq!(children, vec![Value::iri("c2")]);
    }

    #[test]
    fn duplicate_quads_ignored() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        let quad = q("a", "p", Value::string("x"));
        assert_eq!(store.insert_batch(&[quad.clone(), quad.clone()]).expect("insert"), 1);
        assert_eq!(store.insert_batch(&[quad]).expect("insert"), 0);
        assert_eq!(store.quad_count().expect("count"), 1);
    }

    #[test]
    fn invalid_quad_rejects_whole_batch() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        let result = store.insert_batch(&[
            q("a", "p", Value::iri("b")),
            Quad::new(Value::Int(1), Value::iri("p"), Value::iri("b")),
        ]);
        assert!(result.is_err());
        assert_eq!(store.quad_count().expect("count"), 0);
    }

    #[test]
    fn sink_uses_one_batch() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("test.redb")).expect("open db");
        {
            let mut sink = QuadSink::new(&mut store);
            let quads: Vec<Quad> = (0..10).map(|i| q("s", "p", Value::Int(i))).collect();
            assert_eq!(sink.write(&quads).expect("write"), 10);
            assert_eq!(sink.written(), 10);
        }
        assert_eq!(
            store
                .count_out(&Value::iri("s"), &Value::iri("p"))
                .expect("count"),
            10
        );
    }

    #[test]
    fn literal_types_survive_storage() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        let when = DateTime::parse_from_rfc3339("2017-05-01T10:00:00+02:00").expect("time");
        let quads = vec![
            q("c", "git:author", Value::blank("a")).with_label(when),
            q("n", "uast:line", Value::Int(42)),
            q("n", "uast:ratio", Value::Float(0.5)),
            q("n", "uast:flag", Value::Bool(true)),
        ];
        store.insert_batch(&quads).expect("insert");

        let mut loaded = Vec::new();
        store
            .for_each_quad(&mut |quad| {
                loaded.push(quad.clone());
                Ok(())
            })
            .expect("iterate");
        assert_eq!(loaded, quads);
    }

    #[test]
    fn recovery_persistence_after_reopen() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");

        // Phase 1: Create data
        {
            let mut store = RedbStore::open(&db_path).expect("open db");
            store
                .insert_batch(&[
                    q("r", "rdf:type", Value::iri("git:Repo")),
                    q("r", "git:commit", Value::iri("c1")),
                ])
                .expect("insert");
        }

        // Phase 2: Reopen, verify and keep appending
        {
            let mut store = RedbStore::open(&db_path).expect("reopen db");
            assert_eq!(store.quad_count().expect("count"), 2);

            store
                .insert_batch(&[
                    q("r", "git:commit", Value::iri("c1")),
                    q("r", "git:commit", Value::iri("c2")),
                ])
                .expect("insert");
            assert_eq!(store.quad_count().expect("count"), 3);

            let repos = store
                .subjects(&Value::iri("rdf:type"), &Value::iri("git:Repo"))
                .expect("subjects");
            assert_eq!(repos, vec![Value::iri("r")]);
        }
    }

    #[test]
    fn recovery_compact_and_reopen() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");

        {
            let mut store = RedbStore::open(&db_path).expect("open db");
            store
                .insert_batch(&[q("a", "p", Value::iri("b"))])
                .expect("insert");
            store.compact().expect("compact");
        }

        let store = RedbStore::open(&db_path).expect("reopen db");
        assert_eq!(store.quad_count().expect("count"), 1);
    }
}
