//! Cell classification pass.
//!
//! Maps every cell to its Marching Cubes case index and output vertex
//! count by sampling the 8 corner scalars against the isovalue. The pass
//! is pure per cell with no shared mutable state, so it runs over all
//! cells concurrently in any order.

use rayon::prelude::*;

use crate::field::ScalarField;
use crate::tables;
use crate::Execution;

/// Per-cell classification result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellClass {
    /// Marching Cubes case: bit `k` set iff corner `k` is above the isovalue.
    pub case_index: u8,
    /// Number of output vertices this cell emits (0, 3, 6, 9, 12 or 15).
    pub num_vertices: u8,
}

/// Linear point indices of a cell's 8 corners, in fixed corner order.
///
/// The cell id decomposes as `x = id % (dim0-1)`,
/// `y = (id / (dim0-1)) % (dim1-1)`, `z = id / cells_per_layer`; corner
/// offsets are +1 in x, +dim0 in y and +dim0*dim1 in z.
#[inline(always)]
pub(crate) fn cell_corners(dims: [usize; 3], cell_id: usize) -> [usize; 8] {
    let [d0, d1, _] = dims;
    let cells_per_layer = (d0 - 1) * (d1 - 1);
    let points_per_layer = d0 * d1;

    let x = cell_id % (d0 - 1);
    let y = (cell_id / (d0 - 1)) % (d1 - 1);
    let z = cell_id / cells_per_layer;

    let i0 = x + y * d0 + z * points_per_layer;
    let i1 = i0 + 1;
    let i2 = i0 + 1 + d0;
    let i3 = i0 + d0;
    [
        i0,
        i1,
        i2,
        i3,
        i0 + points_per_layer,
        i1 + points_per_layer,
        i2 + points_per_layer,
        i3 + points_per_layer,
    ]
}

/// Classify one cell against the isovalue.
///
/// A corner counts as above only for a strict `> isovalue` comparison;
/// samples exactly on the isovalue are "not above". The geometry pass uses
/// the same convention, so a listed edge always has its endpoints on
/// opposite sides.
///
/// When `min_valid` is set, a cell touching any sample at or below the
/// threshold is forced empty (sentinel/invalid sample discard).
#[inline]
pub fn classify_cell<F: ScalarField + ?Sized>(
    field: &F,
    cell_id: usize,
    isovalue: f32,
    min_valid: Option<f32>,
) -> CellClass {
    let corners = cell_corners(field.dims(), cell_id);

    let mut f = [0.0f32; 8];
    for (value, &corner) in f.iter_mut().zip(corners.iter()) {
        *value = field.scalar_at(corner);
    }

    let mut case_index = 0u8;
    for (k, &value) in f.iter().enumerate() {
        case_index |= u8::from(value > isovalue) << k;
    }

    let mut num_vertices = tables::NUM_VERTS_TABLE[case_index as usize];
    if let Some(min) = min_valid {
        if f.iter().any(|&value| value <= min) {
            num_vertices = 0;
        }
    }

    CellClass {
        case_index,
        num_vertices,
    }
}

/// Classify all cells, filling the per-cell case and count arrays.
pub(crate) fn classify_cells<F: ScalarField + ?Sized>(
    field: &F,
    isovalue: f32,
    min_valid: Option<f32>,
    execution: Execution,
    case_index: &mut Vec<u8>,
    num_vertices: &mut Vec<u8>,
) {
    let ncells = field.cell_count();
    case_index.clear();
    case_index.resize(ncells, 0);
    num_vertices.clear();
    num_vertices.resize(ncells, 0);

    match execution {
        Execution::Sequential => {
            for (cell_id, (case, count)) in case_index
                .iter_mut()
                .zip(num_vertices.iter_mut())
                .enumerate()
            {
                let class = classify_cell(field, cell_id, isovalue, min_valid);
                *case = class.case_index;
                *count = class.num_vertices;
            }
        }
        Execution::Parallel => {
            case_index
                .par_iter_mut()
                .zip(num_vertices.par_iter_mut())
                .enumerate()
                .for_each(|(cell_id, (case, count))| {
                    let class = classify_cell(field, cell_id, isovalue, min_valid);
                    *case = class.case_index;
                    *count = class.num_vertices;
                });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::GridScalarField;
    use glam::Vec3;

    fn single_cell(corner_values: [f32; 8]) -> GridScalarField {
        // Corner order differs from row-major point order: corners 2/3 swap.
        let mut samples = vec![0.0f32; 8];
        for (corner, &value) in corner_values.iter().enumerate() {
            let i = cell_corners([2, 2, 2], 0)[corner];
            samples[i] = value;
        }
        GridScalarField::new([2, 2, 2], samples, Vec3::ZERO, Vec3::ONE).unwrap()
    }

    #[test]
    fn corner_indices_of_first_cell() {
        assert_eq!(cell_corners([2, 2, 2], 0), [0, 1, 3, 2, 4, 5, 7, 6]);
        // Second cell along x in a 3x3x3 grid starts one point over.
        assert_eq!(cell_corners([3, 3, 3], 1), [1, 2, 5, 4, 10, 11, 14, 13]);
    }

    #[test]
    fn cell_id_decomposition_covers_all_axes() {
        let dims = [4, 3, 5];
        // Cell (2, 1, 3): id = 2 + 1*3 + 3*6 = 23.
        let corners = cell_corners(dims, 23);
        assert_eq!(corners[0], 2 + 1 * 4 + 3 * 12);
        assert_eq!(corners[6], corners[0] + 1 + 4 + 12);
    }

    #[test]
    fn bottom_below_top_above_is_case_240() {
        let field = single_cell([0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
        let class = classify_cell(&field, 0, 0.5, None);
        assert_eq!(class.case_index, 0b1111_0000);
        assert_eq!(
            class.num_vertices,
            crate::tables::NUM_VERTS_TABLE[240],
        );
    }

    #[test]
    fn sample_on_isovalue_is_not_above() {
        let field = single_cell([0.5; 8]);
        let class = classify_cell(&field, 0, 0.5, None);
        assert_eq!(class.case_index, 0);
        assert_eq!(class.num_vertices, 0);
    }

    #[test]
    fn min_valid_discards_cells_with_sentinel_samples() {
        let field = single_cell([-900.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
        let kept = classify_cell(&field, 0, 0.5, None);
        assert!(kept.num_vertices > 0);
        let dropped = classify_cell(&field, 0, 0.5, Some(-500.0));
        assert_eq!(dropped.num_vertices, 0);
        // The case index itself is still reported.
        assert_eq!(dropped.case_index, kept.case_index);
    }
}
