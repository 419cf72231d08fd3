//! Hash-indexed grid point storage
//!
//! [`GridStorage`] owns every point of a grid. Points live in an arena in
//! insertion order; the position of a point in that arena is its *sequence
//! number*, the index external coefficient vectors are addressed by. A hash
//! map from the point's `(level, index)` tuple back to its sequence number
//! gives O(1) lookup.
//!
//! Insertion appends, so refinement never moves existing sequence numbers.
//! Deletion compacts the numbering and hands the caller a [`Reindexing`]
//! that must be applied to any coefficient vector kept in lockstep.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::bounding_box::BoundingBox;
use crate::error::{Result, SparseGridError};
use crate::point::{GridPoint, Side};
use crate::{Index, Level};

/// Permutation handed out by [`GridStorage::delete_points`].
///
/// For every surviving point it records which old sequence number the new
/// one came from. A coefficient vector indexed by the old numbering is
/// compacted in lockstep with [`Reindexing::apply`]; dropping the value
/// unapplied desynchronizes caller data, hence the `must_use`.
#[must_use = "apply the reindexing to every coefficient vector indexed by sequence number"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reindexing {
    old_len: usize,
    old_of_new: Vec<usize>,
}

impl Reindexing {
    /// The no-op permutation over `len` sequence numbers.
    pub fn identity(len: usize) -> Self {
        Self {
            old_len: len,
            old_of_new: (0..len).collect(),
        }
    }

    /// Number of surviving points (the new storage size).
    pub fn len(&self) -> usize {
        self.old_of_new.len()
    }

    pub fn is_empty(&self) -> bool {
        self.old_of_new.is_empty()
    }

    /// Storage size before the deletion.
    pub fn old_len(&self) -> usize {
        self.old_len
    }

    /// True iff no point moved or vanished.
    pub fn is_identity(&self) -> bool {
        self.old_len == self.old_of_new.len()
            && self.old_of_new.iter().enumerate().all(|(n, &o)| n == o)
    }

    /// The old sequence number the new one `new` came from.
    pub fn old_sequence(&self, new: usize) -> Option<usize> {
        self.old_of_new.get(new).copied()
    }

    /// Compact `values` in lockstep with the deletion that produced this
    /// reindexing. Fails with `InvalidDimension` if `values` was not sized
    /// to the old numbering.
    pub fn apply<T: Copy>(&self, values: &mut Vec<T>) -> Result<()> {
        if values.len() != self.old_len {
            return Err(SparseGridError::InvalidDimension {
                expected: self.old_len,
                actual: values.len(),
            });
        }
        // old_of_new is strictly increasing, so the forward in-place copy
        // never reads an already overwritten slot
        for (new, &old) in self.old_of_new.iter().enumerate() {
            values[new] = values[old];
        }
        values.truncate(self.old_of_new.len());
        Ok(())
    }
}

/// Hash-indexed collection of [`GridPoint`]s.
///
/// # Example
/// ```
/// use sparsegrids::{GridPoint, GridStorage};
///
/// let mut storage = GridStorage::new(2);
/// let seq = storage.insert(GridPoint::root(2)).unwrap();
/// assert_eq!(seq, 0);
/// assert_eq!(storage.len(), 1);
///
/// // re-inserting the identical tuple is idempotent
/// let again = storage.insert(GridPoint::root(2)).unwrap();
/// assert_eq!(again, 0);
/// assert_eq!(storage.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GridStorage {
    dimension: usize,
    points: Vec<GridPoint>,
    map: HashMap<GridPoint, usize>,
    bounding_box: BoundingBox,
}

impl GridStorage {
    /// Create an empty storage over the unit cube.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            points: Vec::new(),
            map: HashMap::new(),
            bounding_box: BoundingBox::unit(dimension),
        }
    }

    /// Create an empty storage with an explicit bounding box.
    pub fn with_bounding_box(dimension: usize, bounding_box: BoundingBox) -> Result<Self> {
        if bounding_box.dimension() != dimension {
            return Err(SparseGridError::InvalidDimension {
                expected: dimension,
                actual: bounding_box.dimension(),
            });
        }
        Ok(Self {
            dimension,
            points: Vec::new(),
            map: HashMap::new(),
            bounding_box,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    pub fn set_bounding_box(&mut self, bounding_box: BoundingBox) -> Result<()> {
        if bounding_box.dimension() != self.dimension {
            return Err(SparseGridError::InvalidDimension {
                expected: self.dimension,
                actual: bounding_box.dimension(),
            });
        }
        self.bounding_box = bounding_box;
        Ok(())
    }

    /// Drop every point.
    pub fn clear(&mut self) {
        self.points.clear();
        self.map.clear();
    }

    fn check_seq(&self, seq: usize) -> Result<()> {
        if seq >= self.points.len() {
            return Err(SparseGridError::OutOfRange {
                what: "sequence number",
                value: seq,
                max: self.points.len(),
            });
        }
        Ok(())
    }

    /// Insert a point, returning its sequence number. Idempotent: inserting
    /// an already stored tuple returns the existing sequence number and
    /// leaves the storage unchanged.
    pub fn insert(&mut self, point: GridPoint) -> Result<usize> {
        if point.dimension() != self.dimension {
            return Err(SparseGridError::InvalidDimension {
                expected: self.dimension,
                actual: point.dimension(),
            });
        }
        if let Some(&seq) = self.map.get(&point) {
            return Ok(seq);
        }
        let seq = self.points.len();
        self.map.insert(point.clone(), seq);
        self.points.push(point);
        Ok(seq)
    }

    /// Sequence number of a point, if stored. A point of foreign dimension
    /// is simply absent.
    pub fn find(&self, point: &GridPoint) -> Option<usize> {
        self.map.get(point).copied()
    }

    pub fn contains(&self, point: &GridPoint) -> bool {
        self.map.contains_key(point)
    }

    /// The point stored at `seq`.
    pub fn point(&self, seq: usize) -> Result<&GridPoint> {
        self.check_seq(seq)?;
        Ok(&self.points[seq])
    }

    /// Flip the leaf flag of the point at `seq`. The flag is not part of
    /// the hash key, so the point stays findable.
    pub fn set_leaf(&mut self, seq: usize, leaf: bool) -> Result<()> {
        self.check_seq(seq)?;
        self.points[seq].set_leaf(leaf);
        Ok(())
    }

    /// Replace the point stored at `seq` with `point`, keeping the sequence
    /// number. Fails with `DuplicatePoint` if the new tuple is already
    /// stored under a different sequence number.
    pub fn update(&mut self, point: GridPoint, seq: usize) -> Result<()> {
        if point.dimension() != self.dimension {
            return Err(SparseGridError::InvalidDimension {
                expected: self.dimension,
                actual: point.dimension(),
            });
        }
        self.check_seq(seq)?;
        if let Some(&other) = self.map.get(&point) {
            if other != seq {
                return Err(SparseGridError::DuplicatePoint { sequence: other });
            }
        }
        self.map.remove(&self.points[seq]);
        self.map.insert(point.clone(), seq);
        self.points[seq] = point;
        Ok(())
    }

    /// Remove the given sequence numbers, compact the numbering, recompute
    /// every leaf flag, and return the permutation the caller must apply to
    /// coefficient vectors kept in lockstep.
    pub fn delete_points(&mut self, remove: &BTreeSet<usize>) -> Result<Reindexing> {
        if let Some(&highest) = remove.iter().next_back() {
            self.check_seq(highest)?;
        }
        let old_len = self.points.len();
        let mut old_of_new = Vec::with_capacity(old_len - remove.len());
        let mut points = Vec::with_capacity(old_len - remove.len());

        for (old, point) in self.points.drain(..).enumerate() {
            if !remove.contains(&old) {
                old_of_new.push(old);
                points.push(point);
            }
        }
        self.points = points;
        self.map.clear();
        for (new, point) in self.points.iter().enumerate() {
            self.map.insert(point.clone(), new);
        }
        self.recalc_leaf_property();

        Ok(Reindexing {
            old_len,
            old_of_new,
        })
    }

    /// Iterate over `(sequence, point)` pairs in sequence order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &GridPoint)> {
        self.points.iter().enumerate()
    }

    fn probe(&self, seq: usize, d: usize, pair: Option<(Level, Index)>) -> bool {
        match pair {
            Some((l, i)) => {
                let mut probe = self.points[seq].clone();
                probe.set(d, l, i).is_ok() && self.map.contains_key(&probe)
            }
            None => false,
        }
    }

    /// Does the point at `seq` have the given child in dimension `d`?
    pub fn has_child(&self, seq: usize, d: usize, side: Side) -> Result<bool> {
        self.check_seq(seq)?;
        let pair = self.points[seq].child_in_dim(d, side)?;
        Ok(self.probe(seq, d, Some(pair)))
    }

    /// Does the point at `seq` have its hierarchical parent in dimension
    /// `d` stored? Level <= 1 has no interior parent, so this is false.
    pub fn has_parent(&self, seq: usize, d: usize) -> Result<bool> {
        self.check_seq(seq)?;
        let pair = self.points[seq].parent_in_dim(d)?;
        Ok(self.probe(seq, d, pair))
    }

    /// True iff the point at `seq` has no child in any dimension.
    pub fn is_childless(&self, seq: usize) -> Result<bool> {
        self.check_seq(seq)?;
        for d in 0..self.dimension {
            let (l, _) = self.points[seq].level_index(d)?;
            if l == 0 {
                if self.probe(seq, d, Some((1, 1))) {
                    return Ok(false);
                }
            } else {
                for side in [Side::Left, Side::Right] {
                    if self.has_child(seq, d, side)? {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }

    /// Recompute the leaf flag of every stored point from actual child
    /// existence. Deletion calls this; it is public for callers that build
    /// grids by raw insertion.
    pub fn recalc_leaf_property(&mut self) {
        let mut flags = vec![true; self.points.len()];
        for (seq, flag) in flags.iter_mut().enumerate() {
            // a point with all dimensions checked childless is a leaf
            *flag = self.is_childless(seq).unwrap_or(true);
        }
        for (point, flag) in self.points.iter_mut().zip(flags) {
            point.set_leaf(flag);
        }
    }

    /// Maximum single-dimension level over all stored points.
    pub fn max_level(&self) -> Level {
        self.points.iter().map(|p| p.level_max()).max().unwrap_or(0)
    }

    /// Number of stored points with no level-0 component.
    pub fn num_inner_points(&self) -> usize {
        self.points.iter().filter(|p| p.is_inner_point()).count()
    }

    /// Row-major `len x dimension` arrays of `2^level` and `index` per
    /// point, the layout vectorized evaluation kernels consume.
    pub fn level_index_arrays(&self) -> (Vec<f64>, Vec<f64>) {
        let mut levels = Vec::with_capacity(self.points.len() * self.dimension);
        let mut indices = Vec::with_capacity(self.points.len() * self.dimension);
        for point in &self.points {
            for (l, i) in point.level_index_pairs() {
                levels.push((1u64 << l) as f64);
                indices.push(i as f64);
            }
        }
        (levels, indices)
    }

    /// Domain coordinates of a point under this storage's bounding box.
    pub fn coordinates(&self, point: &GridPoint) -> Result<Vec<f64>> {
        if point.dimension() != self.dimension {
            return Err(SparseGridError::InvalidDimension {
                expected: self.dimension,
                actual: point.dimension(),
            });
        }
        (0..self.dimension)
            .map(|d| self.bounding_box.to_domain(d, point.coordinate(d)?))
            .collect()
    }
}

impl fmt::Display for GridStorage {
    /// One point per line, `seq: [l1, i1, ...]` with a `*` marking leaves.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (seq, point) in self.iter() {
            writeln!(
                f,
                "{}: {}{}",
                seq,
                point,
                if point.is_leaf() { " *" } else { "" }
            )?;
        }
        Ok(())
    }
}
