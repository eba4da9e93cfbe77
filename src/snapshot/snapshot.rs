use std::path::Path;

use compio::fs;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::ext::PathDisplayExt;
use crate::filesystem::Node;
use crate::snapshot::{binary, json};

const BINARY_EXTENSION: &str = "bin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotFormat {
    /// Nested `{name, type, content}` objects
    #[default]
    Json,
    /// Checksummed, zstd-compressed bincode
    Binary,
}

impl SnapshotFormat {
    /// Picks the format from the file extension; anything but `.bin` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some(BINARY_EXTENSION) => SnapshotFormat::Binary,
            _ => SnapshotFormat::Json,
        }
    }
}

pub struct Snapshot;

impl Snapshot {
    /// Reads the root node stored at `path`.
    pub async fn load(path: &Path) -> Result<Node, SnapshotError> {
        let format = SnapshotFormat::from_path(path);
        debug!(
            "Reading {:?} snapshot from {}",
            format,
            path.lossy_display()
        );

        let bytes = fs::read(path).await.context(ReadSnafu {
            file_path: path.lossy_display(),
        })?;
        let root = Self::decode(format, &bytes)?;

        info!("Loaded snapshot from {}", path.lossy_display());
        Ok(root)
    }

    /// Writes `root` to `path`, creating missing parent directories.
    pub async fn save(path: &Path, root: &Node) -> Result<(), SnapshotError> {
        let format = SnapshotFormat::from_path(path);
        let bytes = Self::encode(format, root)?;

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.context(WriteSnafu {
                file_path: parent.lossy_display(),
            })?;
        }

        debug!(
            "Writing {} bytes of {:?} snapshot to {}",
            bytes.len(),
            format,
            path.lossy_display()
        );
        fs::write(path, bytes).await.0.context(WriteSnafu {
            file_path: path.lossy_display(),
        })?;

        info!("Saved snapshot to {}", path.lossy_display());
        Ok(())
    }

    pub fn encode(format: SnapshotFormat, root: &Node) -> Result<Vec<u8>, SnapshotError> {
        match format {
            SnapshotFormat::Json => json::encode(root),
            SnapshotFormat::Binary => binary::encode(root),
        }
    }

    /// Decodes a root node. Only the format is checked, plus that the root is a directory.
    pub fn decode(format: SnapshotFormat, bytes: &[u8]) -> Result<Node, SnapshotError> {
        let root = match format {
            SnapshotFormat::Json => json::decode(bytes)?,
            SnapshotFormat::Binary => binary::decode(bytes)?,
        };
        ensure!(
            root.is_directory(),
            RootNotDirectorySnafu {
                name: root.name().to_string()
            }
        );
        Ok(root)
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum SnapshotError {
    #[snafu(display("Failed to read the snapshot file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write the snapshot file: {}", file_path))]
    WriteError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Snapshot is not valid JSON"))]
    JsonError { source: serde_json::Error },
    #[snafu(display("Failed to encode the binary snapshot"))]
    EncodeError {
        source: bincode::error::EncodeError,
    },
    #[snafu(display("Failed to decode the binary snapshot"))]
    DecodeError {
        source: bincode::error::DecodeError,
    },
    #[snafu(display("Failed to (de)compress the binary snapshot"))]
    CompressionError { source: std::io::Error },
    #[snafu(display("Not a binary snapshot: missing header"))]
    BadMagic,
    #[snafu(display("Binary snapshot is truncated"))]
    Truncated,
    #[snafu(display("Binary snapshot expands past the {} byte limit", limit))]
    TooLarge { limit: usize },
    #[snafu(display(
        "Binary snapshot is corrupt: checksum {:016x} does not match {:016x}",
        actual,
        expected
    ))]
    ChecksumMismatch { expected: u64, actual: u64 },
    #[snafu(display("Snapshot root '{}' is not a directory", name))]
    RootNotDirectory { name: String },
}
