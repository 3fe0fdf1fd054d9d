//! Persistence module
//!
//! The store contract and the adapter that maps timer snapshots onto it.

pub mod snapshot;
pub mod store;

// Re-export main types
pub use snapshot::SnapshotStore;
pub use store::{FileStore, KeyValueStore, MemoryStore};
