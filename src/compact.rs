//! Stream compaction and output-index allocation.
//!
//! Bridges classification and geometry generation: from the per-cell
//! vertex counts it derives which cells survive, a dense ordered list of
//! their indices, and the offset at which each survivor's vertices land in
//! the packed output arrays. Two scans carry the whole stage, matching the
//! ordering contract the geometry pass relies on:
//!
//! 1. an inclusive scan of the 0/1 "cell is non-empty" indicator, whose
//!    last element is the survivor count and whose step function, inverted
//!    by per-rank upper-bound searches, yields the compacted index list;
//! 2. an exclusive scan of the survivors' vertex counts in list order,
//!    yielding each survivor's first output index.

use rayon::prelude::*;

use crate::scan;
use crate::Execution;

/// Inclusive enumeration of non-empty cells.
///
/// `valid_enum[i]` counts the non-empty cells among cells `0..=i`; the
/// last element is the total number of valid cells (0 when `num_vertices`
/// is empty).
pub fn enumerate_valid_cells(
    num_vertices: &[u8],
    valid_enum: &mut Vec<u32>,
    execution: Execution,
) -> u32 {
    scan::transform_inclusive_scan(
        num_vertices,
        |&count| u32::from(count != 0),
        valid_enum,
        execution,
    );
    valid_enum.last().copied().unwrap_or(0)
}

/// Recover the compacted list of valid cell indices.
///
/// For each output rank `r` in `0..num_valid`, finds the smallest cell
/// index whose cumulative valid count exceeds `r`. Ranks are independent,
/// so the inversion runs as a bulk pass of binary searches.
pub fn valid_cell_indices(
    valid_enum: &[u32],
    num_valid: u32,
    indices: &mut Vec<u32>,
    execution: Execution,
) {
    indices.clear();
    indices.resize(num_valid as usize, 0);
    match execution {
        Execution::Sequential => {
            for (rank, slot) in indices.iter_mut().enumerate() {
                *slot = scan::upper_bound(valid_enum, rank as u32) as u32;
            }
        }
        Execution::Parallel => {
            indices.par_iter_mut().enumerate().for_each(|(rank, slot)| {
                *slot = scan::upper_bound(valid_enum, rank as u32) as u32;
            });
        }
    }
}

/// Output offsets for the compacted cell list.
///
/// Exclusive scan over the valid cells' vertex counts in list order;
/// `offsets[r]` is the index of the first vertex cell `indices[r]` writes.
pub fn output_offsets(
    num_vertices: &[u8],
    indices: &[u32],
    offsets: &mut Vec<u32>,
    execution: Execution,
) {
    scan::transform_exclusive_scan(
        indices,
        |&cell| u32::from(num_vertices[cell as usize]),
        offsets,
        execution,
    );
}

/// Total vertices the valid cells emit.
///
/// By the scan closure invariant this equals the last offset plus the last
/// valid cell's count; 0 when no cell survives.
pub fn total_vertices(num_vertices: &[u8], indices: &[u32], offsets: &[u32]) -> u32 {
    match (indices.last(), offsets.last()) {
        (Some(&last_cell), Some(&last_offset)) => {
            last_offset + u32::from(num_vertices[last_cell as usize])
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Counts for six cells, three of them empty.
    const COUNTS: [u8; 6] = [0, 3, 0, 12, 6, 0];

    #[test]
    fn enumeration_counts_valid_cells() {
        let mut valid_enum = Vec::new();
        let num_valid = enumerate_valid_cells(&COUNTS, &mut valid_enum, Execution::Sequential);
        assert_eq!(valid_enum, vec![0, 1, 1, 2, 3, 3]);
        assert_eq!(num_valid, 3);
    }

    #[test]
    fn compacted_list_preserves_cell_order() {
        let mut valid_enum = Vec::new();
        let num_valid = enumerate_valid_cells(&COUNTS, &mut valid_enum, Execution::Sequential);
        let mut indices = Vec::new();
        valid_cell_indices(&valid_enum, num_valid, &mut indices, Execution::Sequential);
        assert_eq!(indices, vec![1, 3, 4]);

        let mut parallel = Vec::new();
        valid_cell_indices(&valid_enum, num_valid, &mut parallel, Execution::Parallel);
        assert_eq!(indices, parallel);
    }

    #[test]
    fn offsets_partition_the_output_range() {
        let indices = vec![1u32, 3, 4];
        let mut offsets = Vec::new();
        output_offsets(&COUNTS, &indices, &mut offsets, Execution::Sequential);
        assert_eq!(offsets, vec![0, 3, 15]);
        assert_eq!(total_vertices(&COUNTS, &indices, &offsets), 21);

        // Offsets are strictly increasing in whole-triangle steps.
        for pair in offsets.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!((pair[1] - pair[0]) % 3, 0);
        }
    }

    #[test]
    fn all_empty_cells_short_circuit() {
        let counts = [0u8; 5];
        let mut valid_enum = Vec::new();
        let num_valid = enumerate_valid_cells(&counts, &mut valid_enum, Execution::Parallel);
        assert_eq!(num_valid, 0);
        assert_eq!(total_vertices(&counts, &[], &[]), 0);
    }
}
