//! Snapshot files: their shape, their location and the I/O that moves them.

pub mod paths;
mod snapshot;
mod store;

pub use snapshot::{Snapshot, SnapshotHeader, SnapshotNote};
pub use store::SnapshotStore;
