use hashlink::LinkedHashMap;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use tracing::warn;

use crate::filesystem::Node;
use crate::snapshot::snapshot::{JsonSnafu, SnapshotError};

/// On-disk shape of a node: `{"name": .., "type": "directory" | "file", "content": ..}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum JsonNode {
    Directory {
        name: String,
        content: LinkedHashMap<String, JsonNode>,
    },
    File {
        name: String,
        content: Vec<String>,
    },
}

impl From<&Node> for JsonNode {
    fn from(node: &Node) -> Self {
        match node {
            Node::Directory { name, children } => JsonNode::Directory {
                name: name.clone(),
                content: children
                    .iter()
                    .map(|(key, child)| (key.clone(), JsonNode::from(child)))
                    .collect(),
            },
            Node::File { name, lines } => JsonNode::File {
                name: name.clone(),
                content: lines.clone(),
            },
        }
    }
}

impl From<JsonNode> for Node {
    fn from(node: JsonNode) -> Self {
        match node {
            JsonNode::Directory { name, content } => Node::Directory {
                name,
                children: content
                    .into_iter()
                    .map(|(key, child)| {
                        let mut child = Node::from(child);
                        if child.name() != key {
                            warn!(
                                "Snapshot entry '{}' is stored under '{}', renaming it",
                                child.name(),
                                key
                            );
                            child.rename(key.clone());
                        }
                        (key, child)
                    })
                    .collect(),
            },
            JsonNode::File { name, content } => Node::File {
                name,
                lines: content,
            },
        }
    }
}

pub(super) fn encode(root: &Node) -> Result<Vec<u8>, SnapshotError> {
    serde_json::to_vec(&JsonNode::from(root)).context(JsonSnafu)
}

pub(super) fn decode(bytes: &[u8]) -> Result<Node, SnapshotError> {
    let node: JsonNode = serde_json::from_slice(bytes).context(JsonSnafu)?;
    Ok(node.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encodes_nested_name_type_content_objects() {
        let mut root = Node::root();
        let docs = root.create_directory("docs").unwrap();
        docs.create_file("notes.txt")
            .unwrap()
            .append_line("hello")
            .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&encode(&root).unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "name": "/",
                "type": "directory",
                "content": {
                    "docs": {
                        "name": "docs",
                        "type": "directory",
                        "content": {
                            "notes.txt": {
                                "name": "notes.txt",
                                "type": "file",
                                "content": ["hello"]
                            }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn decoding_keeps_document_order() {
        let document = r#"{"name": "/", "type": "directory", "content": {
            "zeta": {"name": "zeta", "type": "file", "content": []},
            "alpha": {"name": "alpha", "type": "directory", "content": {}},
            "mid": {"name": "mid", "type": "file", "content": ["a", "b"]}
        }}"#;

        let root = decode(document.as_bytes()).unwrap();
        let names = root
            .list_children()
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(root.child("mid").unwrap().lines().unwrap(), ["a", "b"]);
    }

    #[test]
    fn child_names_follow_their_keys() {
        let document = r#"{"name": "/", "type": "directory", "content": {
            "real": {"name": "stale", "type": "file", "content": []}
        }}"#;

        let root = decode(document.as_bytes()).unwrap();
        assert_eq!(root.child("real").unwrap().name(), "real");
    }

    #[test]
    fn unknown_node_type_is_rejected() {
        let document = r#"{"name": "/", "type": "symlink", "content": "/etc"}"#;
        assert!(matches!(
            decode(document.as_bytes()),
            Err(SnapshotError::JsonError { .. })
        ));
    }
}
