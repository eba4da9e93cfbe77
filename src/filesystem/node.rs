use derive_more::Display;
use hashlink::LinkedHashMap;
use hashlink::linked_hash_map::Entry;
use snafu::Snafu;

/// Name carried by the root directory
pub const ROOT_NAME: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum NodeKind {
    #[display("directory")]
    Directory,
    #[display("file")]
    File,
}

/// A single entry of the in-memory tree.
///
/// Directories own their children, keyed by the child's name and kept in
/// insertion order. There are no back references: the parent of a node is
/// found by walking from the root again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Directory {
        name: String,
        children: LinkedHashMap<String, Node>,
    },
    File {
        name: String,
        lines: Vec<String>,
    },
}

impl Node {
    pub fn root() -> Self {
        Self::directory(ROOT_NAME)
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Node::Directory {
            name: name.into(),
            children: LinkedHashMap::new(),
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self::file_with_lines(name, Vec::new())
    }

    pub fn file_with_lines(name: impl Into<String>, lines: Vec<String>) -> Self {
        Node::File {
            name: name.into(),
            lines,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Directory { name, .. } | Node::File { name, .. } => name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Directory { .. } => NodeKind::Directory,
            Node::File { .. } => NodeKind::File,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Node::Directory { .. })
    }

    /// Changes the node's own name. Callers re-key the node in its parent.
    pub fn rename(&mut self, new_name: impl Into<String>) {
        match self {
            Node::Directory { name, .. } | Node::File { name, .. } => *name = new_name.into(),
        }
    }

    pub fn children(&self) -> Option<&LinkedHashMap<String, Node>> {
        match self {
            Node::Directory { children, .. } => Some(children),
            Node::File { .. } => None,
        }
    }

    pub fn lines(&self) -> Option<&[String]> {
        match self {
            Node::File { lines, .. } => Some(lines),
            Node::Directory { .. } => None,
        }
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children().and_then(|children| children.get(name))
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        match self {
            Node::Directory { children, .. } => children.get_mut(name),
            Node::File { .. } => None,
        }
    }

    /// Follows `segments` child by child starting at this node.
    ///
    /// Returns `None` on the first missing name or when a file would have to
    /// be traversed as a directory.
    pub fn descendant<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Node> {
        segments
            .iter()
            .try_fold(self, |current, segment| current.child(segment.as_ref()))
    }

    pub fn descendant_mut<S: AsRef<str>>(&mut self, segments: &[S]) -> Option<&mut Node> {
        let mut current = self;
        for segment in segments {
            current = current.child_mut(segment.as_ref())?;
        }
        Some(current)
    }

    /// Inserts `node` under its own name.
    ///
    /// An existing entry with the same name is replaced and the new entry
    /// takes the last position, so listings reflect the latest creation.
    pub fn insert_child(&mut self, node: Node) -> Result<&mut Node, TreeError> {
        let Node::Directory { name, children } = self else {
            return NotADirectorySnafu {
                name: self.name().to_string(),
            }
            .fail();
        };

        match children.entry(node.name().to_string()) {
            Entry::Occupied(mut entry) => {
                tracing::debug!("Replacing '{}' in '{}'", entry.key(), name);
                entry.insert(node);
                entry.to_back();
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => Ok(entry.insert(node)),
        }
    }

    pub fn create_directory(&mut self, name: impl Into<String>) -> Result<&mut Node, TreeError> {
        self.insert_child(Node::directory(name))
    }

    pub fn create_file(&mut self, name: impl Into<String>) -> Result<&mut Node, TreeError> {
        self.insert_child(Node::file(name))
    }

    pub fn append_line(&mut self, text: impl Into<String>) -> Result<(), TreeError> {
        match self {
            Node::File { lines, .. } => {
                lines.push(text.into());
                Ok(())
            }
            Node::Directory { name, .. } => NotAFileSnafu { name: name.clone() }.fail(),
        }
    }

    /// Detaches the child called `name` and hands its ownership to the caller.
    pub fn remove_child(&mut self, name: &str) -> Result<Node, TreeError> {
        match self {
            Node::Directory { children, .. } => children
                .remove(name)
                .ok_or_else(|| TreeError::ChildNotFound {
                    name: name.to_string(),
                }),
            Node::File { name: file_name, .. } => NotADirectorySnafu {
                name: file_name.clone(),
            }
            .fail(),
        }
    }

    /// Returns a fully independent copy of this node and all its descendants.
    pub fn copy_subtree(&self) -> Node {
        match self {
            Node::Directory { name, children } => Node::Directory {
                name: name.clone(),
                children: children
                    .iter()
                    .map(|(key, child)| (key.clone(), child.copy_subtree()))
                    .collect(),
            },
            Node::File { name, lines } => Node::File {
                name: name.clone(),
                lines: lines.clone(),
            },
        }
    }

    pub fn list_children(&self) -> Result<Vec<(String, NodeKind)>, TreeError> {
        let children = self.children().ok_or_else(|| TreeError::NotADirectory {
            name: self.name().to_string(),
        })?;

        Ok(children
            .iter()
            .map(|(name, child)| (name.clone(), child.kind()))
            .collect())
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum TreeError {
    #[snafu(display("'{}' is not a directory", name))]
    NotADirectory { name: String },
    #[snafu(display("'{}' is not a file", name))]
    NotAFile { name: String },
    #[snafu(display("No entry named '{}'", name))]
    ChildNotFound { name: String },
}
