//! Prefix-sum primitives for the compaction passes.
//!
//! Both scans come in a transform flavor: the input elements pass through a
//! caller-supplied mapping before accumulation, which lets the compaction
//! stage scan 0/1 validity indicators and permuted vertex counts without
//! materializing them. The parallel path is the standard block
//! decomposition: per-block local scans, a sequential scan of the block
//! totals, then a parallel fixup adding each block's base offset. Left-to-
//! right accumulation order is preserved exactly, so sequential and
//! parallel execution produce identical results.

use rayon::prelude::*;

use crate::Execution;

/// Elements per parallel scan block.
const SCAN_BLOCK: usize = 4096;

/// Inclusive prefix sum of `f(input[i])` into `out`.
pub fn transform_inclusive_scan<T, F>(input: &[T], f: F, out: &mut Vec<u32>, execution: Execution)
where
    T: Sync,
    F: Fn(&T) -> u32 + Sync,
{
    scan_impl(input, f, out, execution, true);
}

/// Exclusive prefix sum of `f(input[i])` into `out`.
///
/// `out[0]` is 0; `out[i]` is the sum of the first `i` mapped elements.
pub fn transform_exclusive_scan<T, F>(input: &[T], f: F, out: &mut Vec<u32>, execution: Execution)
where
    T: Sync,
    F: Fn(&T) -> u32 + Sync,
{
    scan_impl(input, f, out, execution, false);
}

fn scan_impl<T, F>(input: &[T], f: F, out: &mut Vec<u32>, execution: Execution, inclusive: bool)
where
    T: Sync,
    F: Fn(&T) -> u32 + Sync,
{
    out.clear();
    out.resize(input.len(), 0);
    if input.is_empty() {
        return;
    }

    match execution {
        Execution::Sequential => {
            scan_block(input, out, &f, 0, inclusive);
        }
        Execution::Parallel => {
            // Block totals first, so every block knows its base offset.
            let totals: Vec<u32> = input
                .par_chunks(SCAN_BLOCK)
                .map(|block| block.iter().map(&f).sum())
                .collect();

            let mut bases = Vec::with_capacity(totals.len());
            let mut acc = 0u32;
            for &total in &totals {
                bases.push(acc);
                acc += total;
            }

            out.par_chunks_mut(SCAN_BLOCK)
                .zip(input.par_chunks(SCAN_BLOCK))
                .zip(bases.into_par_iter())
                .for_each(|((out_block, in_block), base)| {
                    scan_block(in_block, out_block, &f, base, inclusive);
                });
        }
    }
}

#[inline]
fn scan_block<T, F>(input: &[T], out: &mut [u32], f: &F, base: u32, inclusive: bool)
where
    F: Fn(&T) -> u32,
{
    let mut acc = base;
    for (slot, value) in out.iter_mut().zip(input.iter()) {
        if inclusive {
            acc += f(value);
            *slot = acc;
        } else {
            *slot = acc;
            acc += f(value);
        }
    }
}

/// Index of the first element strictly greater than `value`.
///
/// `sorted` must be non-decreasing. Inverts a scan's step function: for a
/// target rank `r`, returns the smallest index whose cumulative count
/// exceeds `r`.
#[inline]
pub fn upper_bound(sorted: &[u32], value: u32) -> usize {
    sorted.partition_point(|&x| x <= value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(v: &u32) -> u32 {
        *v
    }

    #[test]
    fn inclusive_scan_matches_running_total() {
        let input = [3u32, 0, 6, 1, 0, 2];
        let mut out = Vec::new();
        transform_inclusive_scan(&input, identity, &mut out, Execution::Sequential);
        assert_eq!(out, vec![3, 3, 9, 10, 10, 12]);
    }

    #[test]
    fn exclusive_scan_shifts_by_one() {
        let input = [3u32, 0, 6, 1, 0, 2];
        let mut out = Vec::new();
        transform_exclusive_scan(&input, identity, &mut out, Execution::Sequential);
        assert_eq!(out, vec![0, 3, 3, 9, 10, 10]);
    }

    #[test]
    fn parallel_scans_match_sequential_across_block_boundaries() {
        // Deterministic pseudo-random input longer than one scan block.
        let input: Vec<u32> = (0..3 * SCAN_BLOCK + 17)
            .map(|i| ((i as u32).wrapping_mul(2654435761)) % 7)
            .collect();

        let mut seq = Vec::new();
        let mut par = Vec::new();

        transform_inclusive_scan(&input, identity, &mut seq, Execution::Sequential);
        transform_inclusive_scan(&input, identity, &mut par, Execution::Parallel);
        assert_eq!(seq, par);

        transform_exclusive_scan(&input, identity, &mut seq, Execution::Sequential);
        transform_exclusive_scan(&input, identity, &mut par, Execution::Parallel);
        assert_eq!(seq, par);
    }

    #[test]
    fn transform_applies_before_accumulation() {
        let input = [5u8, 0, 9, 0];
        let mut out = Vec::new();
        transform_inclusive_scan(&input, |&v| u32::from(v != 0), &mut out, Execution::Sequential);
        assert_eq!(out, vec![1, 1, 2, 2]);
    }

    #[test]
    fn empty_input_produces_empty_output() {
        let mut out = vec![7u32; 4];
        transform_inclusive_scan(&[] as &[u32], identity, &mut out, Execution::Parallel);
        assert!(out.is_empty());
    }

    #[test]
    fn upper_bound_finds_first_strictly_greater() {
        let steps = [1u32, 1, 2, 3, 3, 3, 4];
        assert_eq!(upper_bound(&steps, 0), 0);
        assert_eq!(upper_bound(&steps, 1), 2);
        assert_eq!(upper_bound(&steps, 2), 3);
        assert_eq!(upper_bound(&steps, 3), 6);
        assert_eq!(upper_bound(&steps, 4), 7);
    }
}
