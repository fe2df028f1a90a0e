//! # Storage Module
//!
//! Persistent quad storage.

pub mod redb_store;

pub use redb_store::RedbStore;
