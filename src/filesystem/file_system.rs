use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::filesystem::node::TreeError;
use crate::filesystem::{Node, NodeKind, NodePath, Resolver};

/// The tree together with the directory relative paths start from.
///
/// Every shell command maps onto one method here. Paths are resolved afresh
/// on each call, nothing holds on to a node between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystem {
    root: Node,
    current_directory: NodePath,
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::with_root(Node::root())
    }
}

impl FileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `root` as the whole tree and moves the current directory to it.
    pub fn with_root(root: Node) -> Self {
        Self {
            root,
            current_directory: NodePath::root(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.root, &self.current_directory)
    }

    pub fn mkdir(&mut self, path: &str) -> Result<(), FileSystemError> {
        let (parent, name) = self.resolver().resolve_new_entry(path)?;
        debug!("Creating directory '{}' in '{}'", name, parent);
        self.node_mut(&parent)?
            .create_directory(name)
            .map_err(tree_error(path))?;
        Ok(())
    }

    pub fn touch(&mut self, path: &str) -> Result<(), FileSystemError> {
        let (parent, name) = self.resolver().resolve_new_entry(path)?;
        debug!("Creating file '{}' in '{}'", name, parent);
        self.node_mut(&parent)?
            .create_file(name)
            .map_err(tree_error(path))?;
        Ok(())
    }

    pub fn cd(&mut self, path: &str) -> Result<(), FileSystemError> {
        let target = self.resolver().resolve_directory(path)?;
        debug!("Changing directory to '{}'", target);
        self.current_directory = target;
        Ok(())
    }

    pub fn pwd(&self) -> Result<NodePath, FileSystemError> {
        self.resolver().current_directory()?;
        Ok(self.current_directory.clone())
    }

    /// Children of the directory at `path` (the current directory when absent).
    /// A file lists as itself.
    pub fn ls(&self, path: Option<&str>) -> Result<Vec<(String, NodeKind)>, FileSystemError> {
        let node = self.resolver().resolve(path.unwrap_or("."))?;
        match node.list_children() {
            Ok(children) => Ok(children),
            Err(_) => Ok(vec![(node.name().to_string(), node.kind())]),
        }
    }

    pub fn cat(&self, path: &str) -> Result<Vec<String>, FileSystemError> {
        self.resolver()
            .resolve(path)?
            .lines()
            .map(<[String]>::to_vec)
            .context(IsADirectorySnafu { path })
    }

    /// Lines of the file at `path` containing `pattern`, case-sensitively.
    pub fn grep(&self, path: &str, pattern: &str) -> Result<Vec<String>, FileSystemError> {
        Ok(self
            .cat(path)?
            .into_iter()
            .filter(|line| line.contains(pattern))
            .collect())
    }

    /// Appends `text` as a new line, creating the file when nothing exists at `path` yet.
    pub fn echo(&mut self, path: &str, text: &str) -> Result<(), FileSystemError> {
        let (parent, name) = self.resolver().resolve_new_entry(path)?;
        let parent_node = self.node_mut(&parent)?;

        match parent_node.child_mut(&name) {
            Some(existing) => existing.append_line(text).map_err(tree_error(path)),
            None => {
                debug!("Creating file '{}' in '{}' on first write", name, parent);
                parent_node
                    .insert_child(Node::file_with_lines(name, vec![text.to_string()]))
                    .map(|_| ())
                    .map_err(tree_error(path))
            }
        }
    }

    /// Moves the node at `source`, returning where it ended up.
    ///
    /// An existing directory at `destination` receives the node under its
    /// current name. Otherwise the node is renamed to the last segment of
    /// `destination` inside that path's parent.
    pub fn mv(&mut self, source: &str, destination: &str) -> Result<NodePath, FileSystemError> {
        let source_path = self.resolver().canonicalize(source)?;
        let (source_parent, source_name) = source_path
            .split_leaf()
            .context(NotFoundSnafu { path: source })?;
        let (target_parent, target_name) = self.placement(&source_name, destination)?;
        let target = target_parent.join(target_name.clone());

        ensure!(
            !target_parent.starts_with(&source_path),
            IntoOwnSubtreeSnafu {
                source_path: source_path.to_string(),
                destination: target.to_string(),
            }
        );

        let mut node = self
            .node_mut(&source_parent)?
            .remove_child(&source_name)
            .map_err(tree_error(source))?;
        node.rename(target_name);
        self.node_mut(&target_parent)?
            .insert_child(node)
            .map_err(tree_error(destination))?;

        if self.current_directory.starts_with(&source_path) && source_path != target {
            warn!(
                "Current directory '{}' moved away with '{}'",
                self.current_directory, source_path
            );
        }
        info!("Moved '{}' to '{}'", source_path, target);
        Ok(target)
    }

    /// Places a deep copy of the node at `source`, following the same placement rules as [`FileSystem::mv`].
    pub fn cp(&mut self, source: &str, destination: &str) -> Result<NodePath, FileSystemError> {
        let (source_path, node) = self.resolver().resolve_entry(source)?;
        let source_name = source_path
            .leaf()
            .context(NotFoundSnafu { path: source })?
            .to_string();
        let mut copy = node.copy_subtree();

        let (target_parent, target_name) = self.placement(&source_name, destination)?;
        let target = target_parent.join(target_name.clone());
        copy.rename(target_name);
        self.node_mut(&target_parent)?
            .insert_child(copy)
            .map_err(tree_error(destination))?;

        info!("Copied '{}' to '{}'", source_path, target);
        Ok(target)
    }

    pub fn rm(&mut self, path: &str) -> Result<(), FileSystemError> {
        let (parent, name) = self.resolver().resolve_parent(path)?;
        let removed = parent.join(name.clone());
        self.node_mut(&parent)?
            .remove_child(&name)
            .map_err(tree_error(path))?;

        if self.current_directory.starts_with(&removed) {
            warn!(
                "Current directory '{}' was removed with '{}'",
                self.current_directory, removed
            );
        }
        info!("Removed '{}'", removed);
        Ok(())
    }

    /// Where a node named `source_name` lands for a move or copy to `destination`.
    fn placement(
        &self,
        source_name: &str,
        destination: &str,
    ) -> Result<(NodePath, String), FileSystemError> {
        let resolver = self.resolver();
        match resolver.resolve_directory(destination) {
            Ok(directory) => Ok((directory, source_name.to_string())),
            Err(FileSystemError::NotFound { .. }) => resolver.resolve_parent(destination),
            Err(other) => Err(other),
        }
    }

    fn node_mut(&mut self, path: &NodePath) -> Result<&mut Node, FileSystemError> {
        self.root
            .descendant_mut(path.segments())
            .context(NotFoundSnafu {
                path: path.to_string(),
            })
    }
}

/// Reports a tree-level failure against the path the caller asked for.
fn tree_error(path: &str) -> impl FnOnce(TreeError) -> FileSystemError + '_ {
    move |error| match error {
        TreeError::NotAFile { .. } => FileSystemError::IsADirectory {
            path: path.to_string(),
        },
        TreeError::NotADirectory { .. } | TreeError::ChildNotFound { .. } => {
            FileSystemError::NotFound {
                path: path.to_string(),
            }
        }
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub(super)))]
pub enum FileSystemError {
    #[snafu(display("No such file or directory: {}", path))]
    NotFound { path: String },
    #[snafu(display(
        "Current directory '{}' no longer exists, change to an absolute path first",
        path
    ))]
    StaleContext { path: String },
    #[snafu(display("Is a directory: {}", path))]
    IsADirectory { path: String },
    #[snafu(display("Cannot move '{}' into itself at '{}'", source_path, destination))]
    IntoOwnSubtree {
        source_path: String,
        destination: String,
    },
}
