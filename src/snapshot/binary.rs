use std::hash::Hasher;
use std::io::Read;

use bincode::{Decode, Encode};
use metrohash::MetroHash64;
use snafu::prelude::*;

use crate::filesystem::Node;
use crate::snapshot::snapshot::{
    BadMagicSnafu, ChecksumMismatchSnafu, CompressionSnafu, DecodeSnafu, EncodeSnafu,
    SnapshotError, TooLargeSnafu, TruncatedSnafu,
};

const MAGIC: &[u8; 8] = b"MEMFSNP1";
const COMPRESSION_LEVEL: i32 = 3;
/// Upper bound for the decompressed payload and for any length bincode is asked to allocate.
const MAX_DECODED_SIZE: usize = 64 * 1024 * 1024;

/// Layout of a binary snapshot:
///
/// | bytes | contents                                  |
/// |-------|-------------------------------------------|
/// | 8     | magic `MEMFSNP1`                          |
/// | 8     | MetroHash64 of the payload, little endian |
/// | rest  | zstd-compressed bincode [`BinaryNode`]    |
#[derive(Debug, Encode, Decode)]
enum BinaryNode {
    Directory {
        name: String,
        children: Vec<BinaryNode>,
    },
    File {
        name: String,
        lines: Vec<String>,
    },
}

impl From<&Node> for BinaryNode {
    fn from(node: &Node) -> Self {
        match node {
            Node::Directory { name, children } => BinaryNode::Directory {
                name: name.clone(),
                children: children.values().map(BinaryNode::from).collect(),
            },
            Node::File { name, lines } => BinaryNode::File {
                name: name.clone(),
                lines: lines.clone(),
            },
        }
    }
}

impl From<BinaryNode> for Node {
    fn from(node: BinaryNode) -> Self {
        match node {
            BinaryNode::Directory { name, children } => Node::Directory {
                name,
                children: children
                    .into_iter()
                    .map(Node::from)
                    .map(|child| (child.name().to_string(), child))
                    .collect(),
            },
            BinaryNode::File { name, lines } => Node::File { name, lines },
        }
    }
}

fn checksum(payload: &[u8]) -> u64 {
    let mut hasher = MetroHash64::default();
    hasher.write(payload);
    hasher.finish()
}

pub(super) fn encode(root: &Node) -> Result<Vec<u8>, SnapshotError> {
    let encoded = bincode::encode_to_vec(BinaryNode::from(root), bincode::config::standard())
        .context(EncodeSnafu)?;
    let payload = zstd::encode_all(encoded.as_slice(), COMPRESSION_LEVEL).context(CompressionSnafu)?;

    let mut bytes = Vec::with_capacity(MAGIC.len() + size_of::<u64>() + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&checksum(&payload).to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

pub(super) fn decode(bytes: &[u8]) -> Result<Node, SnapshotError> {
    let rest = bytes.strip_prefix(MAGIC.as_slice()).context(BadMagicSnafu)?;
    let (stored, payload) = rest.split_first_chunk::<8>().context(TruncatedSnafu)?;

    let expected = u64::from_le_bytes(*stored);
    let actual = checksum(payload);
    ensure!(expected == actual, ChecksumMismatchSnafu { expected, actual });

    let encoded = decompress(payload)?;
    let config = bincode::config::standard().with_limit::<MAX_DECODED_SIZE>();
    let (node, _): (BinaryNode, usize) =
        bincode::decode_from_slice(&encoded, config).context(DecodeSnafu)?;
    Ok(node.into())
}

fn decompress(payload: &[u8]) -> Result<Vec<u8>, SnapshotError> {
    let decoder = zstd::stream::read::Decoder::new(payload).context(CompressionSnafu)?;
    let mut encoded = Vec::new();
    decoder
        .take(MAX_DECODED_SIZE as u64 + 1)
        .read_to_end(&mut encoded)
        .context(CompressionSnafu)?;
    ensure!(
        encoded.len() <= MAX_DECODED_SIZE,
        TooLargeSnafu {
            limit: MAX_DECODED_SIZE
        }
    );
    Ok(encoded)
}
