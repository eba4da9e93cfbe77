use derive_more::{Display, From};

/// Absolute location of a node, stored as the names leading to it from the root.
///
/// The root itself is the empty path and displays as `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Display, From)]
#[display("/{}", _0.join("/"))]
pub struct NodePath(Vec<String>);

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    /// Drops the last segment. Popping the root leaves the root.
    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut joined = self.clone();
        joined.push(segment);
        joined
    }

    pub fn leaf(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Splits into the parent path and the last segment; `None` for the root.
    pub fn split_leaf(&self) -> Option<(NodePath, String)> {
        let (leaf, parent) = self.0.split_last()?;
        Some((NodePath(parent.to_vec()), leaf.clone()))
    }

    /// Whether `self` equals `ancestor` or lies somewhere below it.
    pub fn starts_with(&self, ancestor: &NodePath) -> bool {
        self.0.starts_with(&ancestor.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn path(segments: &[&str]) -> NodePath {
        NodePath::from(
            segments
                .iter()
                .map(|segment| segment.to_string())
                .collect::<Vec<_>>(),
        )
    }

    #[rstest]
    #[case(&[], "/")]
    #[case(&["docs"], "/docs")]
    #[case(&["a", "b", "c.txt"], "/a/b/c.txt")]
    fn displays_as_absolute_path(#[case] segments: &[&str], #[case] expected: &str) {
        assert_eq!(path(segments).to_string(), expected);
    }

    #[test]
    fn popping_the_root_is_a_no_op() {
        let mut root = NodePath::root();
        assert_eq!(root.pop(), None);
        assert_eq!(root, NodePath::root());
    }

    #[test]
    fn split_leaf_separates_parent_and_name() {
        assert_eq!(
            path(&["a", "b"]).split_leaf(),
            Some((path(&["a"]), "b".to_string()))
        );
        assert_eq!(NodePath::root().split_leaf(), None);
    }

    #[test]
    fn starts_with_matches_whole_segments_only() {
        assert!(path(&["a", "b"]).starts_with(&path(&["a"])));
        assert!(path(&["a"]).starts_with(&path(&["a"])));
        assert!(path(&["a"]).starts_with(&NodePath::root()));
        assert!(!path(&["ab"]).starts_with(&path(&["a"])));
        assert!(!path(&["a"]).starts_with(&path(&["a", "b"])));
    }
}
