//! Key paths from the root of a tree to a node or leaf.

use std::fmt;

/// Separator used for dotted paths in option names and error messages.
pub const PATH_SEPARATOR: &str = ".";

/// Sequence of keys from the root to a node or leaf.
///
/// Segments are kept separately so keys containing the separator never
/// get split when a path is walked back into a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// The empty path naming the root node.
    pub fn root() -> Self {
        Self::default()
    }

    /// Path extended by one key.
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Join the segments with `sep`.
    pub fn join(&self, sep: &str) -> String {
        self.segments.join(sep)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.join(PATH_SEPARATOR))
        }
    }
}

impl<S: Into<String>> FromIterator<S> for KeyPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}
