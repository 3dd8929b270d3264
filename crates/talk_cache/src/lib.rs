//! # Talk Cache
//!
//! This crate provides a keyed, domain-partitioned persistent cache for
//! the talk digest pipeline. Three artifact kinds are cached, each in
//! its own independently bustable domain: source listings, per-talk
//! detail (transcript or description), and generated summaries.
//!
//! Entries are plain files under a caller-supplied root directory, so
//! cache state outlives the process and is shared across runs. Writes
//! are atomic (temp file + rename): an interrupted write is never
//! visible as a successful read.

mod key;
mod store;

pub use key::{content_fingerprint, CacheDomain, CacheKey};
pub use store::fs::FsCache;
pub use store::{BustFlags, CacheEntry, CacheError, CacheStore};
