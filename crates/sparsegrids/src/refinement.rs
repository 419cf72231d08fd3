//! Adaptive grid refinement
//!
//! A [`RefinementFunctor`] scores stored points from a coefficient (or
//! external error) vector; [`HashRefinement`] picks the highest-scoring
//! refinable points and inserts their hierarchical children.

use crate::error::{Result, SparseGridError};
use crate::point::{GridPoint, Side};
use crate::storage::GridStorage;

/// Data source a refinement priority is computed from.
#[derive(Debug, Clone, Copy)]
pub enum RefinementCriterion<'a> {
    /// Absolute hierarchical surplus: `|alpha[seq]|`.
    Surplus { alpha: &'a [f64] },
    /// Surplus weighted by subspace volume: `|alpha[seq]| * 2^(-levelsum)`.
    /// Damps fine points, controlling grid anisotropy.
    SurplusVolume { alpha: &'a [f64] },
    /// Externally supplied per-point error indicator: `|errors[seq]|`.
    DataBased { errors: &'a [f64] },
}

/// Scores grid points for refinement and carries the pass budget.
///
/// # Example
/// ```
/// use sparsegrids::{generator, GridStorage, HashRefinement, RefinementFunctor};
///
/// let mut storage = GridStorage::new(1);
/// generator::regular(&mut storage, 1).unwrap();
/// let alpha = vec![1.0];
///
/// let functor = RefinementFunctor::surplus(&alpha, 1, 0.0);
/// let refined = HashRefinement::new().free_refine(&mut storage, &functor).unwrap();
/// assert_eq!(refined, 1);
/// assert_eq!(storage.len(), 3);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RefinementFunctor<'a> {
    criterion: RefinementCriterion<'a>,
    refinements_num: usize,
    threshold: f64,
}

impl<'a> RefinementFunctor<'a> {
    /// Functor from an explicit criterion.
    pub fn new(criterion: RefinementCriterion<'a>, refinements_num: usize, threshold: f64) -> Self {
        Self {
            criterion,
            refinements_num,
            threshold,
        }
    }

    /// Surplus-magnitude functor.
    pub fn surplus(alpha: &'a [f64], refinements_num: usize, threshold: f64) -> Self {
        Self {
            criterion: RefinementCriterion::Surplus { alpha },
            refinements_num,
            threshold,
        }
    }

    /// Volume-weighted surplus functor.
    pub fn surplus_volume(alpha: &'a [f64], refinements_num: usize, threshold: f64) -> Self {
        Self {
            criterion: RefinementCriterion::SurplusVolume { alpha },
            refinements_num,
            threshold,
        }
    }

    /// Functor driven by an external error vector instead of surpluses.
    pub fn data_based(errors: &'a [f64], refinements_num: usize, threshold: f64) -> Self {
        Self {
            criterion: RefinementCriterion::DataBased { errors },
            refinements_num,
            threshold,
        }
    }

    /// Refinement priority of the point at `seq`. Fails with `OutOfRange`
    /// if the backing vector is shorter than the storage.
    pub fn value(&self, storage: &GridStorage, seq: usize) -> Result<f64> {
        storage.point(seq)?;
        let (data, weighted) = match self.criterion {
            RefinementCriterion::Surplus { alpha } => (alpha, false),
            RefinementCriterion::SurplusVolume { alpha } => (alpha, true),
            RefinementCriterion::DataBased { errors } => (errors, false),
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

    /// Base priority a candidate must exceed to be considered.
    pub fn start(&self) -> f64 {
        0.0
    }

    /// Maximum number of points one pass may refine.
    pub fn refinements_num(&self) -> usize {
        self.refinements_num
    }

    /// Minimum priority an exceeding candidate must still reach.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// Refinement engine over a [`GridStorage`].
///
/// A pass scores every leaf point, keeps the functor's budget of best
/// candidates (stable tie-break by sequence number) and inserts the missing
/// children of each, completing missing ancestors so the hierarchical
/// parent-before-child structure stays intact. New points strictly append:
/// no existing sequence number moves, so callers extend their coefficient
/// vectors with entries for the new tail.
///
/// A pass applies point by point; if scoring fails mid-pass (mis-sized
/// coefficient vector), previously refined points of the same pass remain
/// refined. Candidates are validated up front, so this cannot happen with a
/// vector sized to the storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashRefinement {
    refine_active_dimensions_only: bool,
}

impl HashRefinement {
    /// Engine refining along every dimension.
    pub fn new() -> Self {
        Self {
            refine_active_dimensions_only: false,
        }
    }

    /// Engine that skips dimensions still at level <= 1, preserving
    /// non-interacting dimensions (ANOVA-style refinement).
    pub fn active_dimensions_only() -> Self {
        Self {
            refine_active_dimensions_only: true,
        }
    }

    /// Run one refinement pass. Returns the number of points that gained at
    /// least one child. Fails with `EmptyStorage` on an empty grid; a zero
    /// budget or the absence of candidates above the threshold is a no-op.
    pub fn free_refine(
        &self,
        storage: &mut GridStorage,
        functor: &RefinementFunctor<'_>,
    ) -> Result<usize> {
        if storage.is_empty() {
            return Err(SparseGridError::EmptyStorage);
        }
        let candidates = self.collect_candidates(storage, functor)?;

        let mut refined = 0;
        for (seq, _) in candidates {
            if self.refine_point(storage, seq)? > 0 {
                refined += 1;
            }
        }
        Ok(refined)
    }

    /// Number of points a pass would currently consider refinable.
    pub fn num_refinable_points(&self, storage: &GridStorage) -> Result<usize> {
        if storage.is_empty() {
            return Err(SparseGridError::EmptyStorage);
        }
        Ok(storage.iter().filter(|(_, p)| p.is_leaf()).count())
    }

    /// Leaf points above threshold, best first, capped at the budget.
    fn collect_candidates(
        &self,
        storage: &GridStorage,
        functor: &RefinementFunctor<'_>,
    ) -> Result<Vec<(usize, f64)>> {
        let budget = functor.refinements_num();
        if budget == 0 {
            return Ok(Vec::new());
        }

        let mut candidates = Vec::new();
        for (seq, point) in storage.iter() {
            if !point.is_leaf() {
                continue;
            }
            let value = functor.value(storage, seq)?;
            if value > functor.start() && value >= functor.threshold() {
                candidates.push((seq, value));
            }
        }
        // descending by priority, ties stable by insertion order
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        candidates.truncate(budget);
        Ok(candidates)
    }

    /// Insert the missing children of the point at `seq` along every
    /// eligible dimension; clears the leaf flag once a child was inserted.
    /// Returns the number of points inserted.
    fn refine_point(&self, storage: &mut GridStorage, seq: usize) -> Result<usize> {
        let point = storage.point(seq)?.clone();
        let mut inserted = 0;

        for d in 0..storage.dimension() {
            if self.refine_active_dimensions_only && point.level(d)? <= 1 {
                continue;
            }
            inserted += self.refine_point_1d(storage, &point, d)?;
        }
        // an earlier refinement of the same pass may already have created
        // children here; keep the flag consistent either way
        if inserted > 0 || !storage.is_childless(seq)? {
            storage.set_leaf(seq, false)?;
        }
        Ok(inserted)
    }

    fn refine_point_1d(
        &self,
        storage: &mut GridStorage,
        point: &GridPoint,
        d: usize,
    ) -> Result<usize> {
        let mut inserted = 0;
        for side in [Side::Left, Side::Right] {
            let (l, i) = point.child_in_dim(d, side)?;
            let mut child = point.clone();
            child.set(d, l, i)?;
            if storage.find(&child).is_none() {
                create_point(storage, child)?;
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

/// Insert `point` as a leaf, creating every missing hierarchical ancestor
/// first and clearing the leaf flag of each direct parent.
fn create_point(storage: &mut GridStorage, mut point: GridPoint) -> Result<usize> {
    for d in 0..storage.dimension() {
        if let Some((pl, pi)) = point.parent_in_dim(d)? {
            let mut parent = point.clone();
            parent.set(d, pl, pi)?;
            let parent_seq = match storage.find(&parent) {
                Some(seq) => seq,
                None => create_point(storage, parent)?,
            };
            storage.set_leaf(parent_seq, false)?;
        }
    }
    point.set_leaf(true);
    storage.insert(point)
}
