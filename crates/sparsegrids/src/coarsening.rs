//! Adaptive grid coarsening
//!
//! Mirror image of refinement: a [`CoarseningFunctor`] scores leaf points,
//! [`HashCoarsening`] removes the lowest-scoring ones below the threshold.
//! Removal compacts the sequence numbering, so every pass hands back the
//! [`Reindexing`] the caller must apply to its coefficient vectors.

use std::collections::BTreeSet;

use crate::error::{Result, SparseGridError};
use crate::storage::{GridStorage, Reindexing};

/// Data source a coarsening priority is computed from.
#[derive(Debug, Clone, Copy)]
pub enum CoarseningCriterion<'a> {
    /// Absolute hierarchical surplus: `|alpha[seq]|`.
    Surplus { alpha: &'a [f64] },
    /// Surplus weighted by subspace volume: `|alpha[seq]| * 2^(-levelsum)`.
    SurplusVolume { alpha: &'a [f64] },
}

/// Scores grid points for removal and carries the pass budget.
///
/// Only points scoring strictly below the threshold are candidates.
#[derive(Debug, Clone, Copy)]
pub struct CoarseningFunctor<'a> {
    criterion: CoarseningCriterion<'a>,
    removements_num: usize,
    threshold: f64,
}

impl<'a> CoarseningFunctor<'a> {
    /// Functor from an explicit criterion.
    pub fn new(criterion: CoarseningCriterion<'a>, removements_num: usize, threshold: f64) -> Self {
        Self {
            criterion,
            removements_num,
            threshold,
        }
    }

    /// Surplus-magnitude functor.
    pub fn surplus(alpha: &'a [f64], removements_num: usize, threshold: f64) -> Self {
        Self {
            criterion: CoarseningCriterion::Surplus { alpha },
            removements_num,
            threshold,
        }
    }

    /// Volume-weighted surplus functor.
    pub fn surplus_volume(alpha: &'a [f64], removements_num: usize, threshold: f64) -> Self {
        Self {
            criterion: CoarseningCriterion::SurplusVolume { alpha },
            removements_num,
            threshold,
        }
    }

    /// Removal priority of the point at `seq`; smaller means removed
    /// earlier. Fails with `OutOfRange` if the backing vector is shorter
    /// than the storage.
    pub fn value(&self, storage: &GridStorage, seq: usize) -> Result<f64> {
        storage.point(seq)?;
        let (data, weighted) = match self.criterion {
            CoarseningCriterion::Surplus { alpha } => (alpha, false),
            CoarseningCriterion::SurplusVolume { alpha } => (alpha, true),
        };
        let raw = *data.get(seq).ok_or(SparseGridError::OutOfRange {
            what: "coefficient index",
            value: seq,
            max: data.len(),
        })?;
        let mut value = raw.abs();
        if weighted {
            value *= f64::exp2(-(storage.point(seq)?.level_sum() as f64));
        }
        Ok(value)
    }

    /// Priority a candidate must stay strictly below.
    pub fn start(&self) -> f64 {
        self.threshold
    }

    /// Maximum number of points one pass may remove.
    pub fn removements_num(&self) -> usize {
        self.removements_num
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// Coarsening engine over a [`GridStorage`].
///
/// # Example
/// ```
/// use sparsegrids::{generator, CoarseningFunctor, GridStorage, HashCoarsening};
///
/// let mut storage = GridStorage::new(1);
/// generator::regular(&mut storage, 2).unwrap();
/// let mut alpha = vec![1.0, 0.001, 0.8];
///
/// let functor = CoarseningFunctor::surplus(&alpha, 1, 0.1);
/// let reindexing = HashCoarsening::new()
///     .free_coarsen(&mut storage, &functor)
///     .unwrap();
/// reindexing.apply(&mut alpha).unwrap();
///
/// assert_eq!(storage.len(), 2);
/// assert_eq!(alpha, vec![1.0, 0.8]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HashCoarsening;

impl HashCoarsening {
    pub fn new() -> Self {
        Self
    }

    /// Run one coarsening pass and return the resulting permutation.
    ///
    /// Candidates are leaf points whose priority is strictly below the
    /// threshold; they are removed in ascending priority order, at most
    /// the functor's budget many. A point with a child in any dimension is
    /// never removed, whatever its score. The returned [`Reindexing`] is
    /// the identity when nothing qualifies.
    pub fn free_coarsen(
        &self,
        storage: &mut GridStorage,
        functor: &CoarseningFunctor<'_>,
    ) -> Result<Reindexing> {
        if storage.is_empty() {
            return Err(SparseGridError::EmptyStorage);
        }
        let budget = functor.removements_num();
        if budget == 0 {
            return Ok(Reindexing::identity(storage.len()));
        }

        let mut candidates = Vec::new();
        for (seq, point) in storage.iter() {
            if !point.is_leaf() || !storage.is_childless(seq)? {
                continue;
            }
            let value = functor.value(storage, seq)?;
            if value < functor.start() {
                candidates.push((seq, value));
            }
        }
        // ascending by priority, ties stable by insertion order
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        candidates.truncate(budget);

        if candidates.is_empty() {
            return Ok(Reindexing::identity(storage.len()));
        }
        let remove: BTreeSet<usize> = candidates.into_iter().map(|(seq, _)| seq).collect();
        storage.delete_points(&remove)
    }

    /// [`free_coarsen`](Self::free_coarsen) and apply the permutation to
    /// `alpha` in lockstep, so point and coefficient stay attached.
    pub fn free_coarsen_with_values(
        &self,
        storage: &mut GridStorage,
        functor: &CoarseningFunctor<'_>,
        alpha: &mut Vec<f64>,
    ) -> Result<Reindexing> {
        let reindexing = self.free_coarsen(storage, functor)?;
        reindexing.apply(alpha)?;
        Ok(reindexing)
    }

    /// Number of points a pass could currently remove (childless leaves).
    pub fn num_removable_points(&self, storage: &GridStorage) -> Result<usize> {
        let mut count = 0;
        for (seq, point) in storage.iter() {
            if point.is_leaf() && storage.is_childless(seq)? {
                count += 1;
            }
        }
        Ok(count)
    }
}
