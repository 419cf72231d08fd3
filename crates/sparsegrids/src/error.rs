//! Error types for sparsegrids

use thiserror::Error;

/// Result type for sparse-grid operations
pub type Result<T> = std::result::Result<T, SparseGridError>;

/// Errors that can occur during sparse-grid operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SparseGridError {
    /// Point/storage dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    /// Sequence number or dimension index out of bounds
    #[error("{what} {value} out of bounds [0, {max})")]
    OutOfRange {
        what: &'static str,
        value: usize,
        max: usize,
    },

    /// Generator called with an unusable level
    #[error("Grid generation requires level >= 1, got {level}")]
    InvalidLevel { level: u32 },

    /// Bounding-box interval with left >= right
    #[error("Interval for dimension {dim} must have left < right, got [{left}, {right}]")]
    InvalidInterval { dim: usize, left: f64, right: f64 },

    /// Updating a stored point to a tuple another sequence already holds
    #[error("Grid point already stored at sequence {sequence}")]
    DuplicatePoint { sequence: usize },

    /// Operation requires a non-empty storage
    #[error("Storage is empty")]
    EmptyStorage,

    /// Generation requires an empty storage
    #[error("Storage is not empty ({size} points)")]
    StorageNotEmpty { size: usize },

    /// Declared feature gap, distinguishable from real failures
    #[error("Operation not implemented: {operation}")]
    NotImplemented { operation: &'static str },
}
