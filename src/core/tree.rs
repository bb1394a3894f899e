//! # Tree Sources
//!
//! Both trees Logik shows (the component registry and the instantiation
//! hierarchy) are exposed to projections through one trait, so a single
//! adapter type serves both views.
//!
//! Mutations on a model return a [`StructuralChange`] describing what
//! happened. Whoever owns the projection must hand that change to it before
//! anything else reads the projection; [`crate::core::synced::SyncedTree`]
//! does this for you.

use std::fmt;
use std::hash::Hash;

/// Read access to a tree, in the shape a projection needs.
pub trait TreeSource {
    /// Stable identity of one node in the tree.
    type Key: Copy + Eq + Hash + fmt::Debug;

    /// Top-level nodes in display order.
    fn roots(&self) -> Vec<Self::Key>;

    /// Children of `key` in display order. Empty for leaves and unknown keys.
    fn children(&self, key: Self::Key) -> Vec<Self::Key>;

    /// Display label, `None` if the key is not part of the tree.
    fn label(&self, key: Self::Key) -> Option<&str>;

    /// Symbolic icon name, `None` if the key is not part of the tree.
    fn icon(&self, key: Self::Key) -> Option<&str>;

    /// Pre-order flattening tagged with depth. Top-level nodes have depth 0.
    fn flatten(&self) -> Vec<(usize, Self::Key)> {
        let mut out = Vec::new();
        let mut stack: Vec<(usize, Self::Key)> =
            self.roots().into_iter().rev().map(|k| (0, k)).collect();
        while let Some((depth, key)) = stack.pop() {
            out.push((depth, key));
            stack.extend(self.children(key).into_iter().rev().map(|c| (depth + 1, c)));
        }
        out
    }
}

/// What happened under a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind<K> {
    /// `key` now sits at `index` among the parent's children.
    Inserted { index: usize, key: K },
    /// `key` (and its subtree) left the parent; it used to sit at `index`.
    Removed { index: usize, key: K },
    /// The parent's children were permuted.
    Reordered,
}

/// Notification emitted by every structural mutation.
///
/// `parent` is `None` when the change happened among the top-level nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuralChange<K> {
    pub parent: Option<K>,
    pub kind: ChangeKind<K>,
}

impl<K> StructuralChange<K> {
    pub fn inserted(parent: Option<K>, index: usize, key: K) -> Self {
        Self {
            parent,
            kind: ChangeKind::Inserted { index, key },
        }
    }

    pub fn removed(parent: Option<K>, index: usize, key: K) -> Self {
        Self {
            parent,
            kind: ChangeKind::Removed { index, key },
        }
    }

    pub fn reordered(parent: Option<K>) -> Self {
        Self {
            parent,
            kind: ChangeKind::Reordered,
        }
    }
}

/// Errors raised by the tree models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A description violates the finite rooted tree shape.
    MalformedDescription(String),
    /// The targeted node is unknown, detached, or has no parent.
    NotFound(String),
    /// The node cannot go where it was asked to (already attached, or it
    /// would become its own ancestor).
    InvalidInsert(String),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::MalformedDescription(msg) => write!(f, "malformed description: {msg}"),
            TreeError::NotFound(msg) => write!(f, "not found: {msg}"),
            TreeError::InvalidInsert(msg) => write!(f, "invalid insert: {msg}"),
        }
    }
}

impl std::error::Error for TreeError {}

/// Clamp a caller-supplied position into `[0, len]`.
///
/// Negative positions prepend, positions past the end append.
pub fn clamp_index(at: isize, len: usize) -> usize {
    if at <= 0 {
        0
    } else {
        (at as usize).min(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    // 0 -> [1, 2], 1 -> [3], 4 is a second root
    impl TreeSource for Fixed {
        type Key = u8;

        fn roots(&self) -> Vec<u8> {
            vec![0, 4]
        }

        fn children(&self, key: u8) -> Vec<u8> {
            match key {
                0 => vec![1, 2],
                1 => vec![3],
                _ => vec![],
            }
        }

        fn label(&self, _key: u8) -> Option<&str> {
            Some("n")
        }

        fn icon(&self, _key: u8) -> Option<&str> {
            Some("i")
        }
    }

    #[test]
    fn test_flatten_is_preorder_with_depth() {
        assert_eq!(
            Fixed.flatten(),
            vec![(0, 0), (1, 1), (2, 3), (1, 2), (0, 4)]
        );
    }

    #[test]
    fn test_clamp_index() {
        assert_eq!(clamp_index(-5, 3), 0);
        assert_eq!(clamp_index(0, 3), 0);
        assert_eq!(clamp_index(2, 3), 2);
        assert_eq!(clamp_index(3, 3), 3);
        assert_eq!(clamp_index(99, 3), 3);
        assert_eq!(clamp_index(isize::MAX, 0), 0);
    }

    #[test]
    fn test_tree_error_display() {
        let err = TreeError::NotFound("node#1v0 has no parent".into());
        assert_eq!(err.to_string(), "not found: node#1v0 has no parent");
    }
}
