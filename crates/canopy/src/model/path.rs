//! Hierarchical index paths.
//!
//! An [`IndexPath`] addresses an item in a tree by listing the child index
//! taken at every depth, starting from the top-level items. `(0, 2)` is the
//! third child of the first top-level item. The empty path is the "no item"
//! sentinel and is also the address of the invisible root above the
//! top-level items.

use std::cmp::Ordering;
use std::fmt;

/// A variable-length sequence of child indices addressing a tree node.
///
/// Paths compare lexicographically, which orders them the way a fully
/// expanded tree lists its rows (pre-order): a parent sorts before its
/// children, and all descendants of `(0)` sort before `(1)`.
///
/// # Example
///
/// ```
/// use canopy::model::IndexPath;
///
/// let parent = IndexPath::from([0]);
/// let child = parent.child(2);
///
/// assert_eq!(child, IndexPath::from([0, 2]));
/// assert_eq!(child.leaf(), Some(2));
/// assert!(parent.is_ancestor_of(&child));
/// assert!(parent < child && child < IndexPath::from([1]));
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexPath {
    indexes: Vec<usize>,
}

impl IndexPath {
    /// The empty path.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            indexes: Vec::new(),
        }
    }

    /// Creates a path from a sequence of child indices.
    pub fn new(indexes: impl Into<Vec<usize>>) -> Self {
        Self {
            indexes: indexes.into(),
        }
    }

    /// Returns `true` for the empty path.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Number of components, i.e. the depth of the addressed item.
    #[inline]
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// The child index at `depth`, if the path is that deep.
    #[inline]
    pub fn get(&self, depth: usize) -> Option<usize> {
        self.indexes.get(depth).copied()
    }

    /// The last component, or `None` for the empty path.
    #[inline]
    pub fn leaf(&self) -> Option<usize> {
        self.indexes.last().copied()
    }

    /// The components as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.indexes
    }

    /// Returns a new path with `index` appended.
    pub fn child(&self, index: usize) -> Self {
        let mut indexes = Vec::with_capacity(self.indexes.len() + 1);
        indexes.extend_from_slice(&self.indexes);
        indexes.push(index);
        Self { indexes }
    }

    /// Returns the parent path, or `None` for the empty path.
    ///
    /// The parent of a top-level path such as `(3)` is the empty path.
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.indexes.split_last()?;
        Some(Self::new(parent))
    }

    /// Returns `true` if `self` is a prefix of `other` (or equal to it).
    pub fn is_prefix_of(&self, other: &IndexPath) -> bool {
        other.indexes.starts_with(&self.indexes)
    }

    /// Returns `true` if `other` lies strictly below `self`.
    pub fn is_ancestor_of(&self, other: &IndexPath) -> bool {
        self.len() < other.len() && self.is_prefix_of(other)
    }

    /// Compares `self.child(index)` with `other` without allocating.
    pub fn compare_child(&self, index: usize, other: &IndexPath) -> Ordering {
        self.indexes
            .iter()
            .copied()
            .chain(std::iter::once(index))
            .cmp(other.indexes.iter().copied())
    }

    /// Returns a copy with the component at `depth` replaced.
    ///
    /// Returns `None` if the path is not that deep.
    pub fn with_index_at(&self, depth: usize, index: usize) -> Option<Self> {
        let mut indexes = self.indexes.clone();
        *indexes.get_mut(depth)? = index;
        Some(Self { indexes })
    }

    /// Iterates over the components.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indexes.iter().copied()
    }
}

impl From<Vec<usize>> for IndexPath {
    fn from(indexes: Vec<usize>) -> Self {
        Self { indexes }
    }
}

impl From<&[usize]> for IndexPath {
    fn from(indexes: &[usize]) -> Self {
        Self::new(indexes)
    }
}

impl<const N: usize> From<[usize; N]> for IndexPath {
    fn from(indexes: [usize; N]) -> Self {
        Self::new(indexes)
    }
}

impl fmt::Debug for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IndexPath{self}")
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, index) in self.indexes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{index}")?;
        }
        f.write_str(")")
    }
}
