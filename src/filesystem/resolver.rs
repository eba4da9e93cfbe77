use snafu::prelude::*;
use tracing::debug;

use crate::filesystem::file_system::{FileSystemError, NotFoundSnafu, StaleContextSnafu};
use crate::filesystem::{Node, NodePath};

const SEPARATOR: char = '/';
const PARENT_SEGMENT: &str = "..";
const CURRENT_SEGMENT: &str = ".";

/// Translates path strings into locations inside a tree.
///
/// Absolute paths start at the root, everything else starts at the current
/// directory. The current directory is kept as a [`NodePath`] and looked up
/// again on every use, so a directory removed from under it is reported as a
/// stale context instead of being silently used.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    root: &'a Node,
    current_directory: &'a NodePath,
}

impl<'a> Resolver<'a> {
    pub fn new(root: &'a Node, current_directory: &'a NodePath) -> Self {
        Self {
            root,
            current_directory,
        }
    }

    /// Looks up an already canonical path.
    pub fn locate(&self, path: &NodePath) -> Option<&'a Node> {
        self.root.descendant(path.segments())
    }

    /// The node the current directory points at, if it is still a directory in the tree.
    pub fn current_directory(&self) -> Result<&'a Node, FileSystemError> {
        self.locate(self.current_directory)
            .filter(|node| node.is_directory())
            .context(StaleContextSnafu {
                path: self.current_directory.to_string(),
            })
    }

    pub fn resolve(&self, path: &str) -> Result<&'a Node, FileSystemError> {
        self.resolve_entry(path).map(|(_, node)| node)
    }

    /// Absolute location of the existing node named by `path`.
    pub fn canonicalize(&self, path: &str) -> Result<NodePath, FileSystemError> {
        self.resolve_entry(path).map(|(position, _)| position)
    }

    /// Like [`Resolver::canonicalize`], but the target has to be a directory.
    pub fn resolve_directory(&self, path: &str) -> Result<NodePath, FileSystemError> {
        match self.resolve_entry(path)? {
            (position, node) if node.is_directory() => Ok(position),
            _ => NotFoundSnafu { path }.fail(),
        }
    }

    /// Resolves everything but the last segment of `path`.
    ///
    /// The returned parent is an existing directory. The leaf name itself is
    /// not required to exist, so this also serves creation.
    pub fn resolve_parent(&self, path: &str) -> Result<(NodePath, String), FileSystemError> {
        let trimmed = path.trim_end_matches(SEPARATOR);
        let (directory_part, leaf) = match trimmed.rsplit_once(SEPARATOR) {
            Some(("", leaf)) => ("/", leaf),
            Some((directory_part, leaf)) => (directory_part, leaf),
            None => (CURRENT_SEGMENT, trimmed),
        };

        if leaf.is_empty() {
            return NotFoundSnafu { path }.fail();
        }

        if leaf == CURRENT_SEGMENT || leaf == PARENT_SEGMENT {
            return self
                .canonicalize(path)?
                .split_leaf()
                .context(NotFoundSnafu { path });
        }

        let parent = self.resolve_directory(directory_part).map_err(|error| match error {
            FileSystemError::NotFound { .. } => FileSystemError::NotFound {
                path: path.to_string(),
            },
            other => other,
        })?;

        Ok((parent, leaf.to_string()))
    }

    /// Like [`Resolver::resolve_parent`], for a name that is about to be created.
    ///
    /// A `.` or `..` leaf always names an existing directory and is refused.
    pub fn resolve_new_entry(&self, path: &str) -> Result<(NodePath, String), FileSystemError> {
        let leaf = path
            .trim_end_matches(SEPARATOR)
            .rsplit(SEPARATOR)
            .next()
            .unwrap_or_default();
        ensure!(
            leaf != CURRENT_SEGMENT && leaf != PARENT_SEGMENT,
            NotFoundSnafu { path }
        );
        self.resolve_parent(path)
    }

    /// Walks `path` segment by segment, returning where it ended and the node found there.
    pub fn resolve_entry(&self, path: &str) -> Result<(NodePath, &'a Node), FileSystemError> {
        let (mut position, mut current) = if path.starts_with(SEPARATOR) {
            (NodePath::root(), self.root)
        } else {
            (self.current_directory.clone(), self.current_directory()?)
        };

        for segment in path.split(SEPARATOR).filter(|segment| !segment.is_empty()) {
            ensure!(current.is_directory(), NotFoundSnafu { path });

            match segment {
                CURRENT_SEGMENT => {}
                PARENT_SEGMENT => {
                    // Parents are not linked from children; re-walk from the root.
                    position.pop();
                    current = self.locate(&position).context(NotFoundSnafu { path })?;
                }
                name => {
                    current = current.child(name).context(NotFoundSnafu { path })?;
                    position.push(name);
                }
            }
        }

        debug!("Resolved '{}' to '{}'", path, position);
        Ok((position, current))
    }
}
