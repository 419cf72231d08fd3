//! Regular sparse-grid and full-grid generation
//!
//! Seeds an empty [`GridStorage`] by enumerating level/index combinations.
//! All constructors work iteratively: the first dimension is seeded as a 1D
//! grid, then every further dimension extends each existing point by the
//! admissible `(level, index)` pairs, updating the point in place for the
//! first pair and inserting copies for the rest.

use crate::error::{Result, SparseGridError};
use crate::point::GridPoint;
use crate::storage::GridStorage;
use crate::{Index, Level};

/// Largest level whose index range still fits the `Index` type.
const MAX_LEVEL: Level = 31;

fn check_target(storage: &GridStorage, level: Level) -> Result<()> {
    if storage.dimension() == 0 {
        return Err(SparseGridError::InvalidDimension {
            expected: 1,
            actual: 0,
        });
    }
    if level == 0 || level > MAX_LEVEL {
        return Err(SparseGridError::InvalidLevel { level });
    }
    if !storage.is_empty() {
        return Err(SparseGridError::StorageNotEmpty {
            size: storage.len(),
        });
    }
    Ok(())
}

fn odd_indices(level: Level) -> impl Iterator<Item = Index> {
    (1..(1u64 << level)).step_by(2).map(|i| i as Index)
}

/// Generate a regular sparse grid of the given level: interior points only,
/// levels >= 1 per dimension, level sums bounded by `level + dimension - 1`.
/// Leaf flags mark the outermost level-sum shell.
///
/// Fails with `InvalidLevel` for level 0, `InvalidDimension` for a
/// zero-dimensional storage, and `StorageNotEmpty` if points already exist.
///
/// # Example
/// ```
/// use sparsegrids::{generator, GridStorage};
///
/// let mut storage = GridStorage::new(2);
/// generator::regular(&mut storage, 3).unwrap();
/// assert_eq!(storage.len(), 17);
/// ```
pub fn regular(storage: &mut GridStorage, level: Level) -> Result<()> {
    regular_generalized(storage, level, 0.0)
}

/// Generate a generalized sparse grid with the Griebel-Knapek subspace
/// parameter `t`; `t = 0` yields the standard sparse grid, larger `t`
/// thins out strongly anisotropic subspaces.
pub fn regular_generalized(storage: &mut GridStorage, level: Level, t: f64) -> Result<()> {
    check_target(storage, level)?;

    let dim = storage.dimension();
    let n = level;

    // 1D seed in the first dimension, all other dimensions at (1, 1)
    let mut seed = GridPoint::root(dim);
    seed.set_leaf(false);
    for l in 1..=n {
        for i in odd_indices(l) {
            seed.set(0, l, i)?;
            seed.set_leaf(l == n);
            storage.insert(seed.clone())?;
        }
    }

    // extend every intermediate point along each further dimension
    for d in 1..dim {
        let grid_size = storage.len();

        for g in 0..grid_size {
            let original = storage.point(g)?.clone();
            // dimension d still holds its placeholder level 1
            let level_sum = original.level_sum() - 1;
            let level_max = original.level_max();
            let mut point = original;
            let mut first = true;

            let mut l: Level = 1;
            while admissible(l, level_sum, level_max, n, dim, t) {
                for i in odd_indices(l) {
                    point.set(d, l, i)?;
                    point.set_leaf(l + level_sum == n + dim as Level - 1);
                    if first {
                        storage.update(point.clone(), g)?;
                        first = false;
                    } else {
                        storage.insert(point.clone())?;
                    }
                }
                l += 1;
            }
        }
    }

    Ok(())
}

/// Griebel-Knapek admissibility of extending a point by level `l`.
fn admissible(l: Level, level_sum: Level, level_max: Level, n: Level, dim: usize, t: f64) -> bool {
    let lmax = l.max(level_max);
    if lmax > n {
        return false;
    }
    (l + level_sum) as f64 - t * lmax as f64 <= (n + dim as Level - 1) as f64 - t * n as f64
}

/// Generate a full tensor grid: every interior level combination with each
/// per-dimension level up to `level`.
pub fn full(storage: &mut GridStorage, level: Level) -> Result<()> {
    check_target(storage, level)?;
    let dim = storage.dimension();
    let bounds = vec![level; dim];
    full_impl(storage, &bounds)
}

/// Generate an anisotropic full tensor grid with a separate level bound per
/// dimension.
pub fn anisotropic_full(storage: &mut GridStorage, levels: &[Level]) -> Result<()> {
    if levels.len() != storage.dimension() {
        return Err(SparseGridError::InvalidDimension {
            expected: storage.dimension(),
            actual: levels.len(),
        });
    }
    let min = levels.iter().copied().min().unwrap_or(0);
    let max = levels.iter().copied().max().unwrap_or(0);
    check_target(storage, if min == 0 { 0 } else { max })?;
    full_impl(storage, levels)
}

fn full_impl(storage: &mut GridStorage, bounds: &[Level]) -> Result<()> {
    let dim = storage.dimension();
    // a full-grid point is a leaf iff every dimension sits at its bound
    let full_sum: Level = bounds.iter().sum();

    let mut seed = GridPoint::root(dim);
    seed.set_leaf(false);
    for l in 1..=bounds[0] {
        for i in odd_indices(l) {
            seed.set(0, l, i)?;
            seed.set_leaf(l + (dim as Level - 1) == full_sum);
            storage.insert(seed.clone())?;
        }
    }

    for d in 1..dim {
        let grid_size = storage.len();

        for g in 0..grid_size {
            let original = storage.point(g)?.clone();
            let base_sum = original.level_sum() - original.level(d)?;
            let mut point = original;
            let mut first = true;

            for l in 1..=bounds[d] {
                for i in odd_indices(l) {
                    point.set(d, l, i)?;
                    point.set_leaf(base_sum + l == full_sum);
                    if first {
                        storage.update(point.clone(), g)?;
                        first = false;
                    } else {
                        storage.insert(point.clone())?;
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_1d_counts() {
        for n in 1..=6u32 {
            let mut storage = GridStorage::new(1);
            regular(&mut storage, n).unwrap();
            assert_eq!(storage.len(), (1usize << n) - 1, "level {}", n);
        }
    }

    #[test]
    fn test_regular_2d_level_3() {
        let mut storage = GridStorage::new(2);
        regular(&mut storage, 3).unwrap();
        assert_eq!(storage.len(), 17);
    }

    #[test]
    fn test_regular_3d_level_3() {
        let mut storage = GridStorage::new(3);
        regular(&mut storage, 3).unwrap();
        assert_eq!(storage.len(), 31);
    }

    #[test]
    fn test_regular_level_1_single_point() {
        for dim in 1..=4 {
            let mut storage = GridStorage::new(dim);
            regular(&mut storage, 1).unwrap();
            assert_eq!(storage.len(), 1);
            assert_eq!(storage.find(&GridPoint::root(dim)), Some(0));
            assert!(storage.point(0).unwrap().is_leaf());
        }
    }

    #[test]
    fn test_regular_level_sums_bounded() {
        let mut storage = GridStorage::new(3);
        regular(&mut storage, 4).unwrap();
        for (_, point) in storage.iter() {
            assert!(point.level_sum() <= 4 + 3 - 1);
            assert!(point.is_inner_point());
        }
    }

    #[test]
    fn test_regular_leaf_flags_on_outer_shell() {
        let mut storage = GridStorage::new(2);
        regular(&mut storage, 3).unwrap();
        for (_, point) in storage.iter() {
            assert_eq!(point.is_leaf(), point.level_sum() == 4, "{}", point);
        }
    }

    #[test]
    fn test_regular_odd_index_invariant() {
        let mut storage = GridStorage::new(2);
        regular(&mut storage, 4).unwrap();
        for (_, point) in storage.iter() {
            for d in 0..2 {
                let (l, i) = point.level_index(d).unwrap();
                assert!(l >= 1);
                assert_eq!(i % 2, 1);
                assert!(i < (1u32 << l));
            }
        }
    }

    #[test]
    fn test_generalized_t_zero_matches_regular() {
        let mut plain = GridStorage::new(2);
        regular(&mut plain, 4).unwrap();

        let mut generalized = GridStorage::new(2);
        regular_generalized(&mut generalized, 4, 0.0).unwrap();

        assert_eq!(plain.len(), generalized.len());
        for (_, point) in plain.iter() {
            assert!(generalized.contains(point), "missing {}", point);
        }
    }

    #[test]
    fn test_generalized_positive_t_thins_grid() {
        let mut plain = GridStorage::new(2);
        regular(&mut plain, 4).unwrap();

        let mut thinned = GridStorage::new(2);
        regular_generalized(&mut thinned, 4, 0.5).unwrap();

        assert!(thinned.len() < plain.len());
        // thinned grid is a subset of the standard one
        for (_, point) in thinned.iter() {
            assert!(plain.contains(point), "extra {}", point);
        }
    }

    #[test]
    fn test_full_2d() {
        let mut storage = GridStorage::new(2);
        full(&mut storage, 2).unwrap();
        // (2^2 - 1)^2 interior points
        assert_eq!(storage.len(), 9);

        let leaves: Vec<_> = storage.iter().filter(|(_, p)| p.is_leaf()).collect();
        for (_, point) in &leaves {
            assert_eq!(point.level(0).unwrap(), 2);
            assert_eq!(point.level(1).unwrap(), 2);
        }
        assert_eq!(leaves.len(), 4);
    }

    #[test]
    fn test_anisotropic_full() {
        let mut storage = GridStorage::new(2);
        anisotropic_full(&mut storage, &[2, 1]).unwrap();
        // 3 points along dim 0, 1 along dim 1
        assert_eq!(storage.len(), 3);
        for (_, point) in storage.iter() {
            assert!(point.level(0).unwrap() <= 2);
            assert_eq!(point.level(1).unwrap(), 1);
        }
    }

    #[test]
    fn test_anisotropic_dimension_mismatch() {
        let mut storage = GridStorage::new(2);
        assert!(matches!(
            anisotropic_full(&mut storage, &[2]),
            Err(SparseGridError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn test_level_zero_rejected() {
        let mut storage = GridStorage::new(2);
        assert!(matches!(
            regular(&mut storage, 0),
            Err(SparseGridError::InvalidLevel { level: 0 })
        ));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let mut storage = GridStorage::new(0);
        assert!(matches!(
            regular(&mut storage, 2),
            Err(SparseGridError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn test_non_empty_storage_rejected() {
        let mut storage = GridStorage::new(1);
        storage.insert(GridPoint::root(1)).unwrap();
        assert!(matches!(
            regular(&mut storage, 2),
            Err(SparseGridError::StorageNotEmpty { size: 1 })
        ));
    }

    #[test]
    fn test_leaf_flags_match_recalc() {
        let mut storage = GridStorage::new(2);
        regular(&mut storage, 3).unwrap();
        let flags: Vec<bool> = storage.iter().map(|(_, p)| p.is_leaf()).collect();
        storage.recalc_leaf_property();
        let recalc: Vec<bool> = storage.iter().map(|(_, p)| p.is_leaf()).collect();
        assert_eq!(flags, recalc);
    }
}
