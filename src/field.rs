//! Scalar-field capability interface and the in-memory grid field.
//!
//! The extraction pipeline never owns its input data; it consumes any type
//! implementing [`ScalarField`], which exposes a regular 3D grid of scalar
//! samples together with discrete and physical coordinates per grid point.
//! [`GridScalarField`] is the bundled in-memory implementation, supporting
//! non-uniform per-axis spacing.

use glam::Vec3;

use crate::error::ExtractError;

/// A regular 3D grid of scalar samples.
///
/// Samples are stored or produced in row-major order: x varies fastest,
/// then y, then z. Implementations must be immutable for the duration of
/// one extraction; `Sync` is required so bulk passes can sample the field
/// from many threads at once.
pub trait ScalarField: Sync {
    /// Grid dimensions `[dim0, dim1, dim2]` in points per axis.
    fn dims(&self) -> [usize; 3];

    /// Scalar value at a linear grid-point index.
    fn scalar_at(&self, index: usize) -> f32;

    /// Discrete grid coordinate of a linear grid-point index.
    fn grid_coord_at(&self, index: usize) -> [i32; 3] {
        let [d0, d1, _] = self.dims();
        [
            (index % d0) as i32,
            ((index / d0) % d1) as i32,
            (index / (d0 * d1)) as i32,
        ]
    }

    /// Physical (world-space) coordinate of a linear grid-point index.
    fn physical_coord_at(&self, index: usize) -> Vec3;

    /// Total number of grid points.
    fn point_count(&self) -> usize {
        let [d0, d1, d2] = self.dims();
        d0 * d1 * d2
    }

    /// Total number of cells (unit cubes of 8 adjacent points).
    fn cell_count(&self) -> usize {
        let [d0, d1, d2] = self.dims();
        (d0 - 1) * (d1 - 1) * (d2 - 1)
    }
}

/// A secondary scalar source for interpolated per-vertex output.
///
/// Extraction only needs raw values from the secondary source; its grid is
/// assumed congruent with the primary field's. Every [`ScalarField`] is
/// usable as a source.
pub trait ScalarSource: Sync {
    /// Scalar value at a linear grid-point index.
    fn value_at(&self, index: usize) -> f32;
}

impl<F: ScalarField> ScalarSource for F {
    #[inline(always)]
    fn value_at(&self, index: usize) -> f32 {
        self.scalar_at(index)
    }
}

/// An owned in-memory scalar grid with per-axis physical coordinates.
///
/// Axis coordinates are stored explicitly, so grids with non-uniform
/// spacing along any axis are representable; the uniform-spacing
/// constructors just precompute them.
#[derive(Debug, Clone)]
pub struct GridScalarField {
    dims: [usize; 3],
    samples: Vec<f32>,
    axis_coords: [Vec<f32>; 3],
}

impl GridScalarField {
    /// Create a field with uniform spacing from row-major samples.
    ///
    /// # Errors
    /// [`ExtractError::InvalidDimensions`] if any dimension is below 2,
    /// [`ExtractError::SampleCountMismatch`] if `samples` does not hold
    /// exactly `dim0 * dim1 * dim2` values.
    pub fn new(
        dims: [usize; 3],
        samples: Vec<f32>,
        origin: Vec3,
        spacing: Vec3,
    ) -> Result<Self, ExtractError> {
        let axis_coords = [
            uniform_axis(dims[0], origin.x, spacing.x),
            uniform_axis(dims[1], origin.y, spacing.y),
            uniform_axis(dims[2], origin.z, spacing.z),
        ];
        Self::with_axis_coords(dims, samples, axis_coords)
    }

    /// Create a field with explicit (possibly non-uniform) axis coordinates.
    ///
    /// # Errors
    /// Same as [`GridScalarField::new`]; additionally each axis coordinate
    /// vector must have exactly `dims[axis]` entries.
    pub fn with_axis_coords(
        dims: [usize; 3],
        samples: Vec<f32>,
        axis_coords: [Vec<f32>; 3],
    ) -> Result<Self, ExtractError> {
        validate_dims(dims)?;
        let expected = dims[0] * dims[1] * dims[2];
        if samples.len() != expected {
            return Err(ExtractError::SampleCountMismatch {
                expected,
                actual: samples.len(),
            });
        }
        for axis in 0..3 {
            if axis_coords[axis].len() != dims[axis] {
                return Err(ExtractError::SampleCountMismatch {
                    expected: dims[axis],
                    actual: axis_coords[axis].len(),
                });
            }
        }
        Ok(GridScalarField {
            dims,
            samples,
            axis_coords,
        })
    }

    /// Create a uniformly spaced field by sampling a function of position.
    ///
    /// # Errors
    /// [`ExtractError::InvalidDimensions`] if any dimension is below 2.
    pub fn from_fn(
        dims: [usize; 3],
        origin: Vec3,
        spacing: Vec3,
        f: impl Fn(Vec3) -> f32,
    ) -> Result<Self, ExtractError> {
        validate_dims(dims)?;
        let mut samples = Vec::with_capacity(dims[0] * dims[1] * dims[2]);
        for z in 0..dims[2] {
            for y in 0..dims[1] {
                for x in 0..dims[0] {
                    let p = origin
                        + Vec3::new(
                            x as f32 * spacing.x,
                            y as f32 * spacing.y,
                            z as f32 * spacing.z,
                        );
                    samples.push(f(p));
                }
            }
        }
        Self::new(dims, samples, origin, spacing)
    }

    /// Borrow the raw row-major sample buffer.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

impl ScalarField for GridScalarField {
    fn dims(&self) -> [usize; 3] {
        self.dims
    }

    #[inline(always)]
    fn scalar_at(&self, index: usize) -> f32 {
        self.samples[index]
    }

    #[inline(always)]
    fn physical_coord_at(&self, index: usize) -> Vec3 {
        let [d0, d1, _] = self.dims;
        let x = index % d0;
        let y = (index / d0) % d1;
        let z = index / (d0 * d1);
        Vec3::new(
            self.axis_coords[0][x],
            self.axis_coords[1][y],
            self.axis_coords[2][z],
        )
    }
}

fn uniform_axis(points: usize, origin: f32, spacing: f32) -> Vec<f32> {
    (0..points).map(|i| origin + i as f32 * spacing).collect()
}

pub(crate) fn validate_dims(dims: [usize; 3]) -> Result<(), ExtractError> {
    if dims.iter().any(|&d| d < 2) {
        return Err(ExtractError::InvalidDimensions { dims });
    }
    Ok(())
}
