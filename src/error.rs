//! Error types for surface extraction.

use std::collections::TryReserveError;
use thiserror::Error;

/// Errors reported by field construction and surface extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// A grid dimension is too small to contain a single cell.
    ///
    /// Cell index arithmetic assumes at least one cell per axis, so every
    /// dimension must be at least 2 grid points.
    #[error("invalid grid dimensions {dims:?}: every axis needs at least 2 points")]
    InvalidDimensions {
        /// The offending grid dimensions.
        dims: [usize; 3],
    },

    /// The sample buffer length does not match the grid dimensions.
    #[error("sample count mismatch: grid needs {expected} samples, got {actual}")]
    SampleCountMismatch {
        /// Sample count implied by the grid dimensions.
        expected: usize,
        /// Sample count actually provided.
        actual: usize,
    },

    /// Output buffer allocation failed.
    ///
    /// The extraction is abandoned and the surface is left in the empty
    /// state; no partially written output is retained.
    #[error("output buffer allocation failed: {0}")]
    OutOfMemory(#[from] TryReserveError),
}
