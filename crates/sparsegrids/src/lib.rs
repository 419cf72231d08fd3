//! Hierarchical sparse-grid storage, generation, refinement and coarsening.
//!
//! This crate implements the indexing engine underneath sparse-grid
//! numerics: multi-dimensional grid points addressed by hierarchical
//! `(level, index)` tuples, a hash-indexed storage with dense sequence
//! numbering, regular-grid generation, and adaptive refinement/coarsening
//! driven by pluggable numeric criteria. Basis evaluation, quadrature and
//! solvers live outside; they consume the storage through its iteration and
//! lookup interfaces and keep coefficient vectors indexed by sequence
//! number.
//!
//! # Overview
//!
//! - [`GridPoint`]: one point, `(level, index)` per dimension plus a leaf
//!   flag; parent and child tuples are pure arithmetic on the point.
//! - [`GridStorage`]: owns all points; insertion order defines the dense
//!   sequence numbering that external coefficient vectors follow.
//! - [`generator`]: seeds an empty storage with a regular, generalized or
//!   full grid.
//! - [`RefinementFunctor`] / [`HashRefinement`]: score points and insert
//!   children of the highest-scoring leaves. New points append; existing
//!   sequence numbers never move.
//! - [`CoarseningFunctor`] / [`HashCoarsening`]: remove low-scoring
//!   childless leaves. Removal compacts the numbering and returns a
//!   [`Reindexing`] that must be applied to coefficient vectors.
//! - [`GridIterator`]: hierarchical cursor for multilevel sweeps.
//!
//! # Quick Start
//!
//! ```
//! use sparsegrids::{generator, GridStorage, HashRefinement, RefinementFunctor};
//!
//! // 2D regular sparse grid of level 3
//! let mut storage = GridStorage::new(2);
//! generator::regular(&mut storage, 3).unwrap();
//! assert_eq!(storage.len(), 17);
//!
//! // refine the two points with the largest surplus
//! let alpha: Vec<f64> = (0..storage.len()).map(|i| (i as f64 * 0.37).sin()).collect();
//! let functor = RefinementFunctor::surplus(&alpha, 2, 0.0);
//! HashRefinement::new().free_refine(&mut storage, &functor).unwrap();
//! assert!(storage.len() > 17);
//! ```
//!
//! # Coefficient vectors and sequence numbers
//!
//! A coefficient vector is a plain `Vec<f64>` owned by the caller, entry
//! `i` belonging to the point with sequence number `i`. Refinement appends
//! points, so the vector grows at the tail; coarsening compacts the
//! numbering and hands back the permutation:
//!
//! ```
//! use sparsegrids::{generator, CoarseningFunctor, GridStorage, HashCoarsening};
//!
//! let mut storage = GridStorage::new(1);
//! generator::regular(&mut storage, 2).unwrap();
//! let mut alpha = vec![0.9, 0.02, 0.6];
//!
//! let functor = CoarseningFunctor::surplus(&alpha, 1, 0.1);
//! let reindexing = HashCoarsening::new()
//!     .free_coarsen(&mut storage, &functor)
//!     .unwrap();
//! reindexing.apply(&mut alpha).unwrap();
//!
//! assert_eq!(storage.len(), alpha.len());
//! assert_eq!(alpha, vec![0.9, 0.6]);
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result`] with [`SparseGridError`]:
//!
//! ```
//! use sparsegrids::{generator, GridStorage, SparseGridError};
//!
//! let mut storage = GridStorage::new(2);
//! let result = generator::regular(&mut storage, 0);
//! assert!(matches!(result, Err(SparseGridError::InvalidLevel { level: 0 })));
//!
//! let storage = GridStorage::new(2);
//! assert!(matches!(
//!     storage.point(5),
//!     Err(SparseGridError::OutOfRange { .. })
//! ));
//! ```
//!
//! # Concurrency
//!
//! All mutation requires `&mut GridStorage`; shared read-only iteration
//! from several threads is safe. There is no interior synchronization:
//! a refinement or coarsening pass must hold the storage exclusively,
//! which the borrow checker enforces.

mod bounding_box;
mod coarsening;
mod error;
pub mod generator;
mod iterator;
mod point;
mod refinement;
mod storage;

pub use bounding_box::{BoundingBox, Interval};
pub use coarsening::{CoarseningCriterion, CoarseningFunctor, HashCoarsening};
pub use error::{Result, SparseGridError};
pub use iterator::GridIterator;
pub use point::{GridPoint, Side};
pub use refinement::{HashRefinement, RefinementCriterion, RefinementFunctor};
pub use storage::{GridStorage, Reindexing};

/// Hierarchical level of a grid point in one dimension.
pub type Level = u32;

/// Position of a grid point within its level in one dimension.
pub type Index = u32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports_compose() {
        let mut storage = GridStorage::new(1);
        generator::regular(&mut storage, 1).unwrap();
        let p: &GridPoint = storage.point(0).unwrap();
        assert_eq!(p.level_index(0).unwrap(), (1, 1));
    }
}
