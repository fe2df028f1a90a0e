//! # Quad Sink
//!
//! Batching abstraction over the underlying quad writer.
//!
//! Writers implement `QuadWriter`. Writers that can persist a whole slice
//! natively (one transaction, one syscall) additionally expose a
//! `BatchWriter` through `QuadWriter::as_batch`. The sink hands whole slices
//! to batch writers and otherwise writes quad by quad, so partial progress
//! stays observable when a write fails half way.
//!
//! A sink belongs to a single import; it is not meant to be shared between
//! threads.

use crate::{CodegraphError, Quad};

// =============================================================================
// WRITER TRAITS
// =============================================================================

/// Anything that accepts quads one at a time.
pub trait QuadWriter {
    /// Write a single quad.
    fn write_quad(&mut self, quad: &Quad) -> Result<(), CodegraphError>;

    /// Native batch support, if any.
    fn as_batch(&mut self) -> Option<&mut dyn BatchWriter> {
        None
    }
}

/// Writers that persist a whole slice in one operation.
pub trait BatchWriter {
    /// Write all quads; returns how many were accepted.
    fn write_quads(&mut self, quads: &[Quad]) -> Result<usize, CodegraphError>;
}

// =============================================================================
// SINK
// =============================================================================

/// Counts and forwards quads to a `QuadWriter`.
pub struct QuadSink<'w> {
    writer: &'w mut dyn QuadWriter,
    written: usize,
}

impl<'w> QuadSink<'w> {
    /// Wrap a writer.
    pub fn new(writer: &'w mut dyn QuadWriter) -> Self {
        Self { writer, written: 0 }
    }

    /// Total quads accepted by the writer through this sink.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Write a slice of quads.
    ///
    /// Returns the number of quads written by this call. On failure of a
    /// one-by-one writer, `written()` still accounts for the quads that made
    /// it before the failure, and the error is `PartialWrite`.
    pub fn write(&mut self, quads: &[Quad]) -> Result<usize, CodegraphError> {
        if quads.is_empty() {
            return Ok(0);
        }

        if let Some(batch) = self.writer.as_batch() {
            let n = batch.write_quads(quads)?;
            self.written = self.written.saturating_add(n);
            return Ok(n);
        }

        for (i, quad) in quads.iter().enumerate() {
            if let Err(e) = self.writer.write_quad(quad) {
                self.written = self.written.saturating_add(i);
                return Err(CodegraphError::PartialWrite {
                    written: i,
                    reason: e.to_string(),
                });
            }
        }
        self.written = self.written.saturating_add(quads.len());
        Ok(quads.len())
    }

    /// Write a single quad.
    pub fn write_one(&mut self, quad: Quad) -> Result<(), CodegraphError> {
        self.write(std::slice::from_ref(&quad)).map(|_| ())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    /// Accepts `limit` quads, then fails.
    struct FlakyWriter {
        limit: usize,
        seen: Vec<Quad>,
    }

    impl QuadWriter for FlakyWriter {
        fn write_quad(&mut self, quad: &Quad) -> Result<(), CodegraphError> {
            if self.seen.len() >= self.limit {
                return Err(CodegraphError::Io("disk full".to_string()));
            }
            self.seen.push(quad.clone());
            Ok(())
        }
    }

    /// Records how the sink called it.
    #[derive(Default)]
    struct RecordingBatch {
        batches: Vec<usize>,
    }

    impl QuadWriter for RecordingBatch {
        fn write_quad(&mut self, _quad: &Quad) -> Result<(), CodegraphError> {
            self.batches.push(1);
            Ok(())
        }

        fn as_batch(&mut self) -> Option<&mut dyn BatchWriter> {
            Some(self)
        }
    }

    impl BatchWriter for RecordingBatch {
        fn write_quads(&mut self, quads: &[Quad]) -> Result<usize, CodegraphError> {
            self.batches.push(quads.len());
            Ok(quads.len())
        }
    }

    fn quads(n: usize) -> Vec<Quad> {
        (0..n)
            .map(|i| {
                Quad::new(
                    Value::iri(format!("s{}", i)),
                    Value::iri("p"),
                    Value::Int(i as i64),
                )
            })
            .collect()
    }

    #[test]
    fn partial_progress_is_reported() {
        let mut writer = FlakyWriter {
            limit: 2,
            seen: Vec::new(),
        };
        let mut sink = QuadSink::new(&mut writer);

        let err = sink.write(&quads(5)).expect_err("third write fails");
        assert!(matches!(err, CodegraphError::PartialWrite { written: 2, .. }));
        assert_eq!(sink.written(), 2);
        assert_eq!(writer.seen.len(), 2);
    }

    #[test]
    fn batch_writers_get_whole_slices() {
        let mut writer = RecordingBatch::default();
        let mut sink = QuadSink::new(&mut writer);

        assert_eq!(sink.write(&quads(4)).expect("write"), 4);
        sink.write_one(quads(1).remove(0)).expect("write one");
        assert_eq!(sink.written(), 5);
        assert_eq!(writer.batches, vec![4, 1]);
    }

    #[test]
    fn empty_write_is_noop() {
        let mut writer = RecordingBatch::default();
        let mut sink = QuadSink::new(&mut writer);
        assert_eq!(sink.write(&[]).expect("write"), 0);
        assert!(writer.batches.is_empty());
    }
}
