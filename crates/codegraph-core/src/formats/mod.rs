//! # Formats Module
//!
//! Serialization formats for codegraph quads.
//!
//! This module contains pure transformations (no file I/O):
//! - `nquads`: the line-oriented import/export wire format

pub mod nquads;

pub use nquads::{NQuadsReader, NQuadsWriter, parse_line, write_term};
