//! Multi-dimensional hierarchical grid point

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Result, SparseGridError};
use crate::{Index, Level};

/// Which child of a grid point along one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// A single point of a hierarchical sparse grid.
///
/// A point is an ordered tuple of `(level, index)` pairs, one per dimension,
/// plus a leaf flag. Level 0 denotes a boundary point with index 0 or 1; for
/// level >= 1 the index is odd and lies in `(0, 2^level)`.
///
/// Two points are equal iff all `(level, index)` pairs match; the leaf flag
/// never participates in equality or hashing, so a point stays findable in a
/// hash map while its leaf flag changes.
///
/// # Example
/// ```
/// use sparsegrids::GridPoint;
///
/// let p = GridPoint::new(vec![2, 1], vec![3, 1]).unwrap();
/// assert_eq!(p.level_sum(), 3);
/// assert_eq!(p.coordinate(0).unwrap(), 0.75);
/// ```
#[derive(Debug, Clone)]
pub struct GridPoint {
    levels: Vec<Level>,
    indices: Vec<Index>,
    leaf: bool,
}

/// Number of index slots on a level, as u64 to stay shift-safe.
fn capacity(level: Level) -> u64 {
    1u64.checked_shl(level).unwrap_or(u64::MAX)
}

fn valid_pair(level: Level, index: Index) -> bool {
    if level == 0 {
        index <= 1
    } else {
        index % 2 == 1 && (index as u64) < capacity(level)
    }
}

impl GridPoint {
    /// Create a point from per-dimension levels and indices.
    ///
    /// New points start as leaves. Fails with `InvalidDimension` if the two
    /// vectors differ in length or are empty, and with `OutOfRange` if any
    /// `(level, index)` pair violates the hierarchical invariant.
    pub fn new(levels: Vec<Level>, indices: Vec<Index>) -> Result<Self> {
        if levels.is_empty() || levels.len() != indices.len() {
            return Err(SparseGridError::InvalidDimension {
                expected: levels.len().max(1),
                actual: indices.len(),
            });
        }
        for (&l, &i) in levels.iter().zip(indices.iter()) {
            if !valid_pair(l, i) {
                return Err(SparseGridError::OutOfRange {
                    what: "grid index",
                    value: i as usize,
                    max: capacity(l) as usize,
                });
            }
        }
        Ok(Self {
            levels,
            indices,
            leaf: true,
        })
    }

    /// The root point: `(1, 1)` in every dimension.
    pub fn root(dimension: usize) -> Self {
        Self {
            levels: vec![1; dimension],
            indices: vec![1; dimension],
            leaf: true,
        }
    }

    /// The origin corner: boundary pair `(0, 0)` in every dimension.
    pub fn corner(dimension: usize) -> Self {
        Self {
            levels: vec![0; dimension],
            indices: vec![0; dimension],
            leaf: true,
        }
    }

    /// Number of dimensions.
    pub fn dimension(&self) -> usize {
        self.levels.len()
    }

    fn check_dim(&self, d: usize) -> Result<()> {
        if d >= self.levels.len() {
            return Err(SparseGridError::OutOfRange {
                what: "dimension",
                value: d,
                max: self.levels.len(),
            });
        }
        Ok(())
    }

    /// Level in dimension `d`.
    pub fn level(&self, d: usize) -> Result<Level> {
        self.check_dim(d)?;
        Ok(self.levels[d])
    }

    /// Index in dimension `d`.
    pub fn index(&self, d: usize) -> Result<Index> {
        self.check_dim(d)?;
        Ok(self.indices[d])
    }

    /// `(level, index)` pair in dimension `d`.
    pub fn level_index(&self, d: usize) -> Result<(Level, Index)> {
        self.check_dim(d)?;
        Ok((self.levels[d], self.indices[d]))
    }

    /// The `(level, index)` pairs of all dimensions in order.
    pub fn level_index_pairs(&self) -> impl Iterator<Item = (Level, Index)> + '_ {
        self.levels
            .iter()
            .zip(self.indices.iter())
            .map(|(&l, &i)| (l, i))
    }

    /// Replace the `(level, index)` pair in dimension `d`.
    pub fn set(&mut self, d: usize, level: Level, index: Index) -> Result<()> {
        self.check_dim(d)?;
        if !valid_pair(level, index) {
            return Err(SparseGridError::OutOfRange {
                what: "grid index",
                value: index as usize,
                max: capacity(level) as usize,
            });
        }
        self.levels[d] = level;
        self.indices[d] = index;
        Ok(())
    }

    /// Leaf property: true iff the point has no child in any dimension.
    /// Maintained by the storage and the refinement/coarsening engines.
    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    /// Set the leaf property. No side effects on any storage.
    pub fn set_leaf(&mut self, leaf: bool) {
        self.leaf = leaf;
    }

    /// Sum of the per-dimension levels.
    pub fn level_sum(&self) -> Level {
        self.levels.iter().sum()
    }

    /// Maximum of the per-dimension levels.
    pub fn level_max(&self) -> Level {
        self.levels.iter().copied().max().unwrap_or(0)
    }

    /// Minimum of the per-dimension levels.
    pub fn level_min(&self) -> Level {
        self.levels.iter().copied().min().unwrap_or(0)
    }

    /// True iff the point touches no boundary, i.e. every level is >= 1.
    pub fn is_inner_point(&self) -> bool {
        self.levels.iter().all(|&l| l > 0)
    }

    /// Coordinate in dimension `d` on the unit cube: `index / 2^level`.
    pub fn coordinate(&self, d: usize) -> Result<f64> {
        let (l, i) = self.level_index(d)?;
        Ok(i as f64 / capacity(l) as f64)
    }

    /// Unit-cube coordinates of the point in every dimension.
    pub fn coordinates(&self) -> Vec<f64> {
        self.levels
            .iter()
            .zip(self.indices.iter())
            .map(|(&l, &i)| i as f64 / capacity(l) as f64)
            .collect()
    }

    /// Hierarchical parent along dimension `d`, as a pure `(level, index)`
    /// computation: level decreases by one, the index is the unique odd
    /// ancestor. Returns `None` for level <= 1 (no interior parent).
    pub fn parent_in_dim(&self, d: usize) -> Result<Option<(Level, Index)>> {
        let (l, i) = self.level_index(d)?;
        if l <= 1 {
            return Ok(None);
        }
        Ok(Some((l - 1, (i >> 1) | 1)))
    }

    /// Hierarchical child along dimension `d`: level increases by one, the
    /// index doubles and shifts by one to the chosen side. From a level-0
    /// boundary point both children collapse onto `(1, 1)`.
    ///
    /// Fails with `OutOfRange` if the child index no longer fits the
    /// `Index` type.
    pub fn child_in_dim(&self, d: usize, side: Side) -> Result<(Level, Index)> {
        let (l, i) = self.level_index(d)?;
        if l == 0 {
            return Ok((1, 1));
        }
        let child = match side {
            Side::Left => 2 * i as u64 - 1,
            Side::Right => 2 * i as u64 + 1,
        };
        match Index::try_from(child) {
            Ok(c) => Ok((l + 1, c)),
            Err(_) => Err(SparseGridError::OutOfRange {
                what: "grid index",
                value: i as usize,
                max: Index::MAX as usize,
            }),
        }
    }
}

impl PartialEq for GridPoint {
    fn eq(&self, other: &Self) -> bool {
        self.levels == other.levels && self.indices == other.indices
    }
}

impl Eq for GridPoint {}

impl Hash for GridPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.levels.hash(state);
        self.indices.hash(state);
    }
}

impl fmt::Display for GridPoint {
    /// Formats as `[l1, i1, l2, i2, ..., ld, id]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (d, (&l, &i)) in self.levels.iter().zip(self.indices.iter()).enumerate() {
            if d > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}, {}", l, i)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid() {
        let p = GridPoint::new(vec![1, 2], vec![1, 3]).unwrap();
        assert_eq!(p.dimension(), 2);
        assert_eq!(p.level(0).unwrap(), 1);
        assert_eq!(p.index(1).unwrap(), 3);
        assert!(p.is_leaf());
    }

    #[test]
    fn test_new_rejects_even_index() {
        let result = GridPoint::new(vec![2], vec![2]);
        assert!(matches!(result, Err(SparseGridError::OutOfRange { .. })));
    }

    #[test]
    fn test_new_rejects_index_beyond_level() {
        let result = GridPoint::new(vec![2], vec![5]);
        assert!(matches!(result, Err(SparseGridError::OutOfRange { .. })));
    }

    #[test]
    fn test_new_rejects_length_mismatch() {
        let result = GridPoint::new(vec![1, 1], vec![1]);
        assert!(matches!(
            result,
            Err(SparseGridError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn test_boundary_pairs() {
        let p = GridPoint::new(vec![0, 0], vec![0, 1]).unwrap();
        assert!(!p.is_inner_point());
        assert_eq!(p.coordinate(0).unwrap(), 0.0);
        assert_eq!(p.coordinate(1).unwrap(), 1.0);
    }

    #[test]
    fn test_dimension_out_of_range() {
        let p = GridPoint::root(2);
        assert!(matches!(
            p.level(2),
            Err(SparseGridError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_equality_ignores_leaf() {
        let a = GridPoint::new(vec![1, 1], vec![1, 1]).unwrap();
        let mut b = a.clone();
        b.set_leaf(false);
        assert_eq!(a, b);

        use std::collections::hash_map::DefaultHasher;
        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn test_level_aggregates() {
        let p = GridPoint::new(vec![1, 3, 2], vec![1, 5, 3]).unwrap();
        assert_eq!(p.level_sum(), 6);
        assert_eq!(p.level_max(), 3);
        assert_eq!(p.level_min(), 1);
    }

    #[test]
    fn test_coordinate() {
        let p = GridPoint::new(vec![3], vec![5]).unwrap();
        assert_eq!(p.coordinate(0).unwrap(), 0.625);
        assert_eq!(p.coordinates(), vec![0.625]);
    }

    #[test]
    fn test_children() {
        let p = GridPoint::root(1);
        assert_eq!(p.child_in_dim(0, Side::Left).unwrap(), (2, 1));
        assert_eq!(p.child_in_dim(0, Side::Right).unwrap(), (2, 3));
    }

    #[test]
    fn test_child_of_boundary_point() {
        let p = GridPoint::new(vec![0], vec![0]).unwrap();
        assert_eq!(p.child_in_dim(0, Side::Left).unwrap(), (1, 1));
        assert_eq!(p.child_in_dim(0, Side::Right).unwrap(), (1, 1));
    }

    #[test]
    fn test_parent() {
        let p = GridPoint::new(vec![3], vec![5]).unwrap();
        assert_eq!(p.parent_in_dim(0).unwrap(), Some((2, 3)));

        let q = GridPoint::new(vec![2], vec![1]).unwrap();
        assert_eq!(q.parent_in_dim(0).unwrap(), Some((1, 1)));

        let root = GridPoint::root(1);
        assert_eq!(root.parent_in_dim(0).unwrap(), None);
    }

    #[test]
    fn test_parent_child_roundtrip() {
        for l in 1..6u32 {
            let mut i = 1u32;
            while i < (1 << l) {
                let p = GridPoint::new(vec![l], vec![i]).unwrap();
                for side in [Side::Left, Side::Right] {
                    let (cl, ci) = p.child_in_dim(0, side).unwrap();
                    let child = GridPoint::new(vec![cl], vec![ci]).unwrap();
                    assert_eq!(child.parent_in_dim(0).unwrap(), Some((l, i)));
                }
                i += 2;
            }
        }
    }

    #[test]
    fn test_display() {
        let p = GridPoint::new(vec![2, 1], vec![3, 1]).unwrap();
        assert_eq!(p.to_string(), "[2, 3, 1, 1]");
    }
}
