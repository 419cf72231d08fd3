//! Hierarchical cursor over a grid
//!
//! [`GridIterator`] walks parent/child links of a [`GridStorage`] without
//! mutating it. Multilevel algorithms (hierarchisation-style sweeps,
//! evaluation descents) move the cursor with [`left_child`](GridIterator::left_child) /
//! [`right_child`](GridIterator::right_child) / [`up`](GridIterator::up) and
//! read the sequence number of the current point to address coefficients.
//!
//! The cursor may sit on a tuple that is not stored (e.g. after descending
//! past the deepest level); [`is_valid`](GridIterator::is_valid) and
//! [`seq`](GridIterator::seq) report that.

use crate::error::{Result, SparseGridError};
use crate::point::{GridPoint, Side};
use crate::storage::GridStorage;
use crate::{Index, Level};

/// Cursor for hierarchical traversal of a [`GridStorage`].
///
/// # Example
/// ```
/// use sparsegrids::{generator, GridIterator, GridStorage};
///
/// let mut storage = GridStorage::new(1);
/// generator::regular(&mut storage, 2).unwrap();
///
/// let mut cursor = GridIterator::new(&storage);
/// assert!(cursor.is_valid());
/// cursor.left_child(0).unwrap();
/// assert_eq!(cursor.point().level_index(0).unwrap(), (2, 1));
/// ```
#[derive(Debug, Clone)]
pub struct GridIterator<'a> {
    storage: &'a GridStorage,
    point: GridPoint,
}

impl<'a> GridIterator<'a> {
    /// A cursor positioned on the root `(1, 1, ..., 1, 1)`.
    pub fn new(storage: &'a GridStorage) -> Self {
        Self {
            storage,
            point: GridPoint::root(storage.dimension()),
        }
    }

    /// Current working point of the cursor.
    pub fn point(&self) -> &GridPoint {
        &self.point
    }

    /// Sequence number of the current point, if it is stored.
    pub fn seq(&self) -> Option<usize> {
        self.storage.find(&self.point)
    }

    /// Is the current point stored?
    pub fn is_valid(&self) -> bool {
        self.storage.contains(&self.point)
    }

    /// Move back to the root `(1, 1)` in every dimension.
    pub fn reset_to_level_one(&mut self) {
        self.point = GridPoint::root(self.storage.dimension());
    }

    /// Move to the origin corner `(0, 0)` in every dimension.
    pub fn reset_to_level_zero(&mut self) {
        self.point = GridPoint::corner(self.storage.dimension());
    }

    /// Place the cursor on an explicit `(level, index)` pair in dimension
    /// `d`, leaving the other dimensions unchanged.
    pub fn set(&mut self, d: usize, level: Level, index: Index) -> Result<()> {
        self.point.set(d, level, index)
    }

    /// Descend to the left child in dimension `d`.
    pub fn left_child(&mut self, d: usize) -> Result<()> {
        let (l, i) = self.point.child_in_dim(d, Side::Left)?;
        self.point.set(d, l, i)
    }

    /// Descend to the right child in dimension `d`.
    pub fn right_child(&mut self, d: usize) -> Result<()> {
        let (l, i) = self.point.child_in_dim(d, Side::Right)?;
        self.point.set(d, l, i)
    }

    /// Ascend to the hierarchical parent in dimension `d`. Fails with
    /// `OutOfRange` at level <= 1, where no interior parent exists.
    pub fn up(&mut self, d: usize) -> Result<()> {
        match self.point.parent_in_dim(d)? {
            Some((l, i)) => self.point.set(d, l, i),
            None => Err(SparseGridError::OutOfRange {
                what: "level",
                value: self.point.level(d)? as usize,
                max: 2,
            }),
        }
    }

    /// Does the grid continue below the current point to the left in
    /// dimension `d`?
    pub fn hint_left(&self, d: usize) -> Result<bool> {
        let (l, i) = self.point.child_in_dim(d, Side::Left)?;
        let mut probe = self.point.clone();
        probe.set(d, l, i)?;
        Ok(self.storage.contains(&probe))
    }

    /// Does the grid continue below the current point to the right in
    /// dimension `d`?
    pub fn hint_right(&self, d: usize) -> Result<bool> {
        let (l, i) = self.point.child_in_dim(d, Side::Right)?;
        let mut probe = self.point.clone();
        probe.set(d, l, i)?;
        Ok(self.storage.contains(&probe))
    }

    /// Does the current point have any child at all? False for tuples that
    /// are not stored.
    pub fn hint(&self) -> bool {
        match self.seq() {
            Some(seq) => !matches!(self.storage.is_childless(seq), Ok(true)),
            None => false,
        }
    }
}
