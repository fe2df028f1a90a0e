//! # Graph Store
//!
//! The read contract over a quad set, and the in-memory backend.
//!
//! Nodes are keyed by their N-Quads rendering, so an IRI and a string
//! literal with the same text are different keys. Every fallible operation
//! returns `Result<T, CodegraphError>` so in-memory and persistent backends
//! can be used interchangeably.

use crate::sink::QuadWriter;
use crate::{CodegraphError, Quad, Value};
use std::collections::BTreeMap;

// =============================================================================
// QUADSTORE TRAIT
// =============================================================================

/// Path-style access to a quad set: one hop along one predicate.
pub trait QuadStore {
    /// Objects of `(subject, predicate, ?)`, in insertion order.
    fn objects(&self, subject: &Value, predicate: &Value) -> Result<Vec<Value>, CodegraphError>;

    /// Subjects of `(?, predicate, object)`, in insertion order.
    fn subjects(&self, predicate: &Value, object: &Value) -> Result<Vec<Value>, CodegraphError>;

    /// Number of `(subject, predicate, ?)` quads.
    fn count_out(&self, subject: &Value, predicate: &Value) -> Result<usize, CodegraphError> {
        Ok(self.objects(subject, predicate)?.len())
    }

    /// Number of `(?, predicate, object)` quads.
    fn count_in(&self, predicate: &Value, object: &Value) -> Result<usize, CodegraphError> {
        Ok(self.subjects(predicate, object)?.len())
    }

    /// Total number of distinct quads.
    fn quad_count(&self) -> Result<usize, CodegraphError>;

    /// Visit every quad in insertion order. Stops at the first error.
    fn for_each_quad(
        &self,
        f: &mut dyn FnMut(&Quad) -> Result<(), CodegraphError>,
    ) -> Result<(), CodegraphError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

type IndexKey = (String, String);

/// In-memory quad set with forward and backward (node, predicate) indexes.
///
/// Exact duplicate quads are ignored.
#[derive(Debug, Default)]
pub struct MemoryStore {
    quads: Vec<Quad>,
    keys: BTreeMap<String, usize>,
    out_index: BTreeMap<IndexKey, Vec<usize>>,
    in_index: BTreeMap<IndexKey, Vec<usize>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a quad. Returns false if it was already present.
    pub fn insert(&mut self, quad: Quad) -> Result<bool, CodegraphError> {
        quad.validate()?;
        let key = quad.to_string();
        if self.keys.contains_key(&key) {
            return Ok(false);
        }

        let idx = self.quads.len();
        let subject = quad.subject.to_string();
        let predicate = quad.predicate.to_string();
        let object = quad.object.to_string();

        self.out_index
            .entry((subject, predicate.clone()))
            .or_default()
            .push(idx);
        self.in_index
            .entry((object, predicate))
            .or_default()
            .push(idx);
        self.keys.insert(key, idx);
        self.quads.push(quad);
        Ok(true)
    }

    /// All quads in insertion order.
    #[must_use]
    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// True if this exact quad is stored.
    #[must_use]
    pub fn contains(&self, quad: &Quad) -> bool {
        self.keys.contains_key(&quad.to_string())
    }

    fn lookup(
        &self,
        index: &BTreeMap<IndexKey, Vec<usize>>,
        node: &Value,
        predicate: &Value,
    ) -> Vec<&Quad> {
        index
            .get(&(node.to_string(), predicate.to_string()))
            .map(|ids| ids.iter().filter_map(|&i| self.quads.get(i)).collect())
            .unwrap_or_default()
    }
}

impl QuadWriter for MemoryStore {
    fn write_quad(&mut self, quad: &Quad) -> Result<(), CodegraphError> {
        self.insert(quad.clone()).map(|_| ())
    }
}

impl QuadStore for MemoryStore {
    fn objects(&self, subject: &Value, predicate: &Value) -> Result<Vec<Value>, CodegraphError> {
        Ok(self
            .lookup(&self.out_index, subject, predicate)
            .into_iter()
            .map(|q| q.object.clone())
            .collect())
    }

    fn subjects(&self, predicate: &Value, object: &Value) -> Result<Vec<Value>, CodegraphError> {
        Ok(self
            .lookup(&self.in_index, object, predicate)
            .into_iter()
            .map(|q| q.subject.clone())
            .collect())
    }

    fn quad_count(&self) -> Result<usize, CodegraphError> {
        Ok(self.quads.len())
    }

    fn for_each_quad(
        &self,
        f: &mut dyn FnMut(&Quad) -> Result<(), CodegraphError>,
    ) -> Result<(), CodegraphError> {
        for quad in &self.quads {
            f(quad)?;
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn q(s: &str, p: &str, o: Value) -> Quad {
        Quad::new(Value::iri(s), Value::iri(p), o)
    }

    #[test]
    fn exact_duplicates_ignored() {
        let mut store = MemoryStore::new();
        assert!(store.insert(q("a", "p", Value::iri("b"))).expect("insert"));
        assert!(!store.insert(q("a", "p", Value::iri("b"))).expect("insert"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn label_distinguishes_quads() {
        let mut store = MemoryStore::new();
        store
            .insert(q("c", "git:file", Value::iri("f")).with_label("a.go"))
            .expect("insert");
        store
            .insert(q("c", "git:file", Value::iri("f")).with_label("b.go"))
            .expect("insert");
        assert_eq!(store.len(), 2);
        assert_eq!(
            store
                .count_out(&Value::iri("c"), &Value::iri("git:file"))
                .expect("count"),
            2
        );
    }

    #[test]
    fn iri_and_string_are_different_nodes() {
        let mut store = MemoryStore::new();
        store.insert(q("a", "p", Value::iri("x"))).expect("insert");
        store.insert(q("b", "p", Value::string("x"))).expect("insert");

        let subjects = store
            .subjects(&Value::iri("p"), &Value::iri("x"))
            .expect("subjects");
        assert_eq!(subjects, vec![Value::iri("a")]);
    }

    #[test]
    fn objects_keep_insertion_order() {
        let mut store = MemoryStore::new();
        for name in ["z", "a", "m"] {
            store.insert(q("r", "git:commit", Value::iri(name))).expect("insert");
        }
        let objects = store
            .objects(&Value::iri("r"), &Value::iri("git:commit"))
            .expect("objects");
        assert_eq!(objects, vec![Value::iri("z"), Value::iri("a"), Value::iri("m")]);
    }

    #[test]
    fn invalid_quad_rejected() {
        let mut store = MemoryStore::new();
        let bad = Quad::new(Value::string("s"), Value::iri("p"), Value::iri("o"));
        assert!(store.insert(bad).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn for_each_quad_stops_on_error() {
        let mut store = MemoryStore::new();
        for i in 0..3 {
            store
                .insert(q("s", "p", Value::Int(i)))
                .expect("insert");
        }
        let mut visited = 0;
        let result = store.for_each_quad(&mut |_| {
            visited += 1;
            if visited == 2 {
                return Err(CodegraphError::Io("stop".to_string()));
            }
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(visited, 2);
    }
}
