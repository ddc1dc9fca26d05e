//! # isomarch
//!
//! Data-parallel Marching Cubes isosurface extraction over regular 3D
//! scalar grids.
//!
//! The extractor runs as a sequence of bulk, data-independent passes:
//!
//! - **Classification**: every cell gets a case index and vertex count
//!   from the static configuration tables.
//! - **Compaction**: two prefix-sum passes discard empty cells and
//!   allocate each survivor's slot in the packed output arrays.
//! - **Generation**: every surviving cell interpolates its edge crossings
//!   and writes positions and flat triangle normals into its own disjoint
//!   output range.
//!
//! No cell depends on another outside the scans, so each pass runs either
//! sequentially or on the rayon thread pool with identical results.
//!
//! ## Example
//!
//! ```rust
//! use isomarch::prelude::*;
//!
//! // Sample a sphere of radius 0.3 centred in the unit cube.
//! let field = GridScalarField::from_fn(
//!     [16, 16, 16],
//!     Vec3::ZERO,
//!     Vec3::splat(1.0 / 15.0),
//!     |p| (p - Vec3::splat(0.5)).length(),
//! )
//! .unwrap();
//!
//! let mut mc = MarchingCubes::new(&field, 0.3);
//! mc.extract().unwrap();
//!
//! assert!(mc.num_total_vertices() > 0);
//! assert_eq!(mc.num_total_vertices() % 3, 0);
//! ```

#![warn(missing_docs)]

pub mod classify;
pub mod compact;
mod error;
pub mod field;
pub mod scan;
pub mod surface;
pub mod tables;

mod generate;

pub use error::ExtractError;
pub use field::{GridScalarField, ScalarField, ScalarSource};
pub use surface::MarchingCubes;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Executor choice for the bulk passes.
///
/// Semantics are identical either way; only scheduling differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    /// Single-threaded in-order passes.
    Sequential,
    /// Rayon thread-pool passes.
    #[default]
    Parallel,
}

/// Commonly used types and functions.
pub mod prelude {
    pub use crate::classify::{classify_cell, CellClass};
    pub use crate::field::{GridScalarField, ScalarField, ScalarSource};
    pub use crate::surface::MarchingCubes;
    pub use crate::{ExtractError, Execution};
    pub use glam::{Vec3, Vec4};
}
