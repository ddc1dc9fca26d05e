//! Common test helpers for isomarch integration tests.

#![allow(dead_code)]

use isomarch::prelude::*;

/// Point indices of the first cell's corners in fixed corner order.
///
/// Corner order is not row-major point order: corners 2 and 3 swap.
pub const FIRST_CELL_CORNERS: [usize; 8] = [0, 1, 3, 2, 4, 5, 7, 6];

/// A 2x2x2 grid (one cell) with the given per-corner values, unit spacing.
pub fn single_cell_field(corner_values: [f32; 8]) -> GridScalarField {
    let mut samples = vec![0.0f32; 8];
    for (corner, &value) in corner_values.iter().enumerate() {
        samples[FIRST_CELL_CORNERS[corner]] = value;
    }
    GridScalarField::new([2, 2, 2], samples, Vec3::ZERO, Vec3::ONE).unwrap()
}

/// A grid where every sample holds the same value.
pub fn uniform_field(dims: [usize; 3], value: f32) -> GridScalarField {
    let samples = vec![value; dims[0] * dims[1] * dims[2]];
    GridScalarField::new(dims, samples, Vec3::ZERO, Vec3::ONE).unwrap()
}

/// Distance-from-centre field over the unit cube.
///
/// Isovalues in (0, 0.5) cut a sphere out of the grid interior.
pub fn sphere_field(resolution: usize) -> GridScalarField {
    GridScalarField::from_fn(
        [resolution, resolution, resolution],
        Vec3::ZERO,
        Vec3::splat(1.0 / (resolution - 1) as f32),
        |p| (p - Vec3::splat(0.5)).length(),
    )
    .unwrap()
}

/// The half-cube scenario: bottom face at 0, top face at 1.
///
/// At isovalue 0.5 the top corners are above, giving case 0b1111_0000 and
/// a separating plane at z = 0.5 with every interpolation factor 0.5.
pub fn half_cube_field() -> GridScalarField {
    single_cell_field([0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0])
}
