//! Index ranges and range sets.
//!
//! - [`IndexRange`]: an inclusive span of sibling indices.
//! - [`IndexRanges`]: a sorted set of disjoint, non-adjacent ranges used to
//!   store which children of a node are selected.
//! - [`IndexPathRange`]: an inclusive span of tree paths in pre-order, which
//!   can be intersected with the children of one node.

use std::fmt;
use std::ops::RangeInclusive;

use super::path::IndexPath;

/// An inclusive range of sibling indices, `begin..=end`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexRange {
    begin: usize,
    end: usize,
}

impl IndexRange {
    /// Creates a range covering `begin..=end`. The bounds are swapped if
    /// given in reverse.
    pub fn new(begin: usize, end: usize) -> Self {
        if begin <= end {
            Self { begin, end }
        } else {
            Self {
                begin: end,
                end: begin,
            }
        }
    }

    /// A range covering exactly one index.
    pub fn single(index: usize) -> Self {
        Self {
            begin: index,
            end: index,
        }
    }

    /// Every index from `begin` upwards.
    pub fn from_index(begin: usize) -> Self {
        Self {
            begin,
            end: usize::MAX,
        }
    }

    /// The first index in the range.
    #[inline]
    pub fn begin(&self) -> usize {
        self.begin
    }

    /// The last index in the range.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of indices covered, saturating at `usize::MAX`.
    pub fn len(&self) -> usize {
        (self.end - self.begin).saturating_add(1)
    }

    /// Ranges always cover at least one index.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, index: usize) -> bool {
        self.begin <= index && index <= self.end
    }

    /// The overlap of two ranges, if any.
    pub fn intersect(&self, other: &IndexRange) -> Option<IndexRange> {
        let begin = self.begin.max(other.begin);
        let end = self.end.min(other.end);
        (begin <= end).then_some(IndexRange { begin, end })
    }

    /// Returns `true` if the union of the two ranges is contiguous.
    pub fn touches(&self, other: &IndexRange) -> bool {
        self.begin <= other.end.saturating_add(1) && other.begin <= self.end.saturating_add(1)
    }

    /// Iterates over the covered indices.
    pub fn iter(&self) -> RangeInclusive<usize> {
        self.begin..=self.end
    }
}

impl fmt::Debug for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.begin == self.end {
            write!(f, "{}", self.begin)
        } else {
            write!(f, "{}..={}", self.begin, self.end)
        }
    }
}

impl From<RangeInclusive<usize>> for IndexRange {
    fn from(range: RangeInclusive<usize>) -> Self {
        IndexRange::new(*range.start(), *range.end())
    }
}

/// A set of indices stored as sorted, disjoint, non-adjacent ranges.
///
/// Mutators return the pieces that actually changed so callers can report
/// exactly what was added or removed.
///
/// # Example
///
/// ```
/// use canopy::model::{IndexRange, IndexRanges};
///
/// let mut ranges = IndexRanges::new();
/// ranges.add(IndexRange::new(0, 2));
/// let added = ranges.add(IndexRange::new(2, 5));
///
/// assert_eq!(added, vec![IndexRange::new(3, 5)]);
/// assert_eq!(ranges.as_slice(), &[IndexRange::new(0, 5)]);
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct IndexRanges {
    ranges: Vec<IndexRange>,
}

impl IndexRanges {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// The stored ranges, in ascending order.
    pub fn as_slice(&self) -> &[IndexRange] {
        &self.ranges
    }

    pub fn iter(&self) -> impl Iterator<Item = IndexRange> + '_ {
        self.ranges.iter().copied()
    }

    /// Iterates over every index in the set, in ascending order.
    pub fn indexes(&self) -> impl Iterator<Item = usize> + '_ {
        self.ranges.iter().flat_map(IndexRange::iter)
    }

    /// Total number of indices in the set, saturating at `usize::MAX`.
    pub fn count(&self) -> usize {
        self.ranges
            .iter()
            .fold(0usize, |total, range| total.saturating_add(range.len()))
    }

    /// The smallest index in the set.
    pub fn first(&self) -> Option<usize> {
        self.ranges.first().map(IndexRange::begin)
    }

    /// The largest index in the set.
    pub fn last(&self) -> Option<usize> {
        self.ranges.last().map(IndexRange::end)
    }

    pub fn contains(&self, index: usize) -> bool {
        let candidate = self.ranges.partition_point(|range| range.end < index);
        self.ranges
            .get(candidate)
            .is_some_and(|range| range.contains(index))
    }

    /// Adds `range` to the set, returning the pieces that were not already
    /// present.
    pub fn add(&mut self, range: IndexRange) -> Vec<IndexRange> {
        let added = self.uncovered(range);
        if added.is_empty() {
            return added;
        }

        // Every stored range that overlaps or abuts `range` collapses into one.
        let first = self
            .ranges
            .partition_point(|r| r.end.saturating_add(1) < range.begin);
        let mut last = first;
        let mut merged = range;
        while let Some(next) = self.ranges.get(last) {
            if !next.touches(&merged) {
                break;
            }
            merged = IndexRange::new(merged.begin.min(next.begin), merged.end.max(next.end));
            last += 1;
        }
        self.ranges.splice(first..last, [merged]);

        added
    }

    /// Removes `range` from the set, returning the pieces that were present.
    pub fn remove(&mut self, range: IndexRange) -> Vec<IndexRange> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.ranges.len() + 1);

        for existing in std::mem::take(&mut self.ranges) {
            let Some(hit) = existing.intersect(&range) else {
                kept.push(existing);
                continue;
            };
            removed.push(hit);
            if existing.begin < hit.begin {
                kept.push(IndexRange::new(existing.begin, hit.begin - 1));
            }
            if existing.end > hit.end {
                kept.push(IndexRange::new(hit.end + 1, existing.end));
            }
        }

        self.ranges = kept;
        removed
    }

    /// Empties the set, returning everything it held.
    pub fn clear(&mut self) -> Vec<IndexRange> {
        std::mem::take(&mut self.ranges)
    }

    /// Adjusts for `count` new siblings inserted at `index`.
    ///
    /// Indices at or after `index` move up by `count`. A range spanning the
    /// insertion point is split, since the new siblings are not selected.
    pub fn insert_shift(&mut self, index: usize, count: usize) {
        if count == 0 {
            return;
        }

        let mut shifted = Vec::with_capacity(self.ranges.len() + 1);
        for range in std::mem::take(&mut self.ranges) {
            if range.end < index {
                shifted.push(range);
            } else if range.begin >= index {
                shifted.push(IndexRange::new(
                    range.begin.saturating_add(count),
                    range.end.saturating_add(count),
                ));
            } else {
                shifted.push(IndexRange::new(range.begin, index - 1));
                shifted.push(IndexRange::new(
                    index.saturating_add(count),
                    range.end.saturating_add(count),
                ));
            }
        }
        self.ranges = shifted;
    }

    /// Adjusts for `count` siblings removed at `index`.
    ///
    /// Returns the removed indices that were in the set, expressed in
    /// pre-removal positions. Indices after the removed span move down by
    /// `count`, and ranges that become adjacent are merged.
    pub fn remove_shift(&mut self, index: usize, count: usize) -> Vec<IndexRange> {
        if count == 0 {
            return Vec::new();
        }

        let span_end = index.saturating_add(count - 1);
        let removed = self.remove(IndexRange::new(index, span_end));

        for range in &mut self.ranges {
            if range.begin > span_end {
                *range = IndexRange::new(range.begin - count, range.end - count);
            }
        }
        self.coalesce();

        removed
    }

    /// Parts of `range` not covered by the set.
    fn uncovered(&self, range: IndexRange) -> Vec<IndexRange> {
        let mut gaps = Vec::new();
        let mut cursor = range.begin;

        let first = self.ranges.partition_point(|r| r.end < range.begin);
        for existing in &self.ranges[first..] {
            if existing.begin > range.end {
                break;
            }
            if existing.begin > cursor {
                gaps.push(IndexRange::new(cursor, existing.begin - 1));
            }
            if existing.end >= range.end {
                return gaps;
            }
            cursor = existing.end + 1;
        }

        gaps.push(IndexRange::new(cursor, range.end));
        gaps
    }

    /// Merges neighbouring ranges that touch.
    fn coalesce(&mut self) {
        let mut merged: Vec<IndexRange> = Vec::with_capacity(self.ranges.len());
        for range in std::mem::take(&mut self.ranges) {
            match merged.last_mut() {
                Some(previous) if previous.touches(&range) => {
                    *previous = IndexRange::new(previous.begin, previous.end.max(range.end));
                }
                _ => merged.push(range),
            }
        }
        self.ranges = merged;
    }
}

impl fmt::Debug for IndexRanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ranges.iter()).finish()
    }
}

impl fmt::Display for IndexRanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{range}")?;
        }
        f.write_str("]")
    }
}

/// An inclusive span of paths, `begin..=end`, in pre-order.
///
/// A path range covers every path that sorts between its bounds, so the
/// range `(0, 3)..=(2)` includes `(0, 4)`, `(1)`, `(1, 0, 7)` and `(2)` but
/// not `(2, 0)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IndexPathRange {
    begin: IndexPath,
    end: IndexPath,
}

impl IndexPathRange {
    /// Creates a range between two paths. The bounds are swapped if given
    /// in reverse.
    pub fn new(begin: IndexPath, end: IndexPath) -> Self {
        if begin <= end {
            Self { begin, end }
        } else {
            Self {
                begin: end,
                end: begin,
            }
        }
    }

    /// A range covering exactly one path.
    pub fn single(path: IndexPath) -> Self {
        Self {
            begin: path.clone(),
            end: path,
        }
    }

    pub fn begin(&self) -> &IndexPath {
        &self.begin
    }

    pub fn end(&self) -> &IndexPath {
        &self.end
    }

    pub fn contains(&self, path: &IndexPath) -> bool {
        &self.begin <= path && path <= &self.end
    }

    /// The children of `parent` that fall inside the range, limited to the
    /// first `count` children.
    ///
    /// Child paths of one parent are ordered by their last index, so the
    /// matching children form one contiguous run that is found by binary
    /// search.
    pub fn intersect(&self, parent: &IndexPath, count: usize) -> Option<IndexRange> {
        let begin = partition_point(count, |i| parent.compare_child(i, &self.begin).is_lt());
        let end = partition_point(count, |i| parent.compare_child(i, &self.end).is_le());
        (begin < end).then(|| IndexRange::new(begin, end - 1))
    }

    /// Returns `true` if both `first` and `last` lie inside the range.
    pub fn fully_contains(&self, first: &IndexPath, last: &IndexPath) -> bool {
        self.begin <= *first && *last <= self.end
    }
}

/// The first `i` in `0..count` for which `pred` is false, given that `pred`
/// is true for a prefix of the range and false afterwards.
fn partition_point(count: usize, pred: impl Fn(usize) -> bool) -> usize {
    let (mut low, mut high) = (0, count);
    while low < high {
        let mid = low + (high - low) / 2;
        if pred(mid) {
            low = mid + 1;
        } else {
            high = mid;
        }
    }
    low
}
