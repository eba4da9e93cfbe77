//! In-memory filesystem tree and path resolution.
//!
//! Directories own their children outright. Locations are plain
//! [`NodePath`]s that get resolved again whenever they are used, so no
//! reference into the tree outlives a single operation.

mod file_system;
mod node;
mod node_path;
mod resolver;

pub use file_system::{FileSystem, FileSystemError};
pub use node::{Node, NodeKind};
pub use node_path::NodePath;
pub use resolver::Resolver;
