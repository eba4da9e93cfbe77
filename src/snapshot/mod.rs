//! Persistence of the whole tree to a single snapshot file.

mod binary;
mod json;
mod snapshot;

pub use snapshot::{Snapshot, SnapshotError};
