//! Geometry generation pass.
//!
//! For each surviving cell: re-sample the 8 corners, interpolate a vertex
//! on every edge the case table lists, then derive one flat normal per
//! triangle from the freshly written positions. Corner data is re-derived
//! rather than cached from classification; that keeps the pass stateless
//! and avoids storing 8 floats per cell globally.
//!
//! The valid cells' output ranges exactly tile the packed output arrays,
//! so the driver pre-splits every array into per-cell `&mut` chunks and
//! hands each cell its own slice. Cells never observe each other's
//! output, which makes the parallel pass race-free without locks.

use glam::{Vec3, Vec4};
use rayon::prelude::*;

use crate::classify::cell_corners;
use crate::field::{ScalarField, ScalarSource};
use crate::tables;
use crate::Execution;

/// Interpolation factor of the isovalue along an edge.
///
/// Clamped to `[0, 1]`; a zero denominator (both endpoints exactly equal)
/// deterministically falls back to the edge midpoint instead of
/// propagating 0/0 as NaN.
#[inline(always)]
pub(crate) fn interp_factor(isovalue: f32, f0: f32, f1: f32) -> f32 {
    let denom = f1 - f0;
    if denom == 0.0 {
        0.5
    } else {
        ((isovalue - f0) / denom).clamp(0.0, 1.0)
    }
}

/// Emit one cell's vertices, normals and optional interpolated scalars.
///
/// `verts`, `norms` and `scalars` are the cell's private output chunks,
/// all of length `num_vertices`.
fn generate_cell<F: ScalarField + ?Sized>(
    field: &F,
    source: Option<&dyn ScalarSource>,
    isovalue: f32,
    cell_id: usize,
    case_index: u8,
    verts: &mut [Vec4],
    norms: &mut [Vec3],
    scalars: Option<&mut [f32]>,
) {
    let corners = cell_corners(field.dims(), cell_id);

    let mut f = [0.0f32; 8];
    let mut p = [Vec3::ZERO; 8];
    for (k, &corner) in corners.iter().enumerate() {
        f[k] = field.scalar_at(corner);
        p[k] = field.physical_coord_at(corner);
    }

    let mut s = [0.0f32; 8];
    if let Some(src) = source {
        for (k, &corner) in corners.iter().enumerate() {
            s[k] = src.value_at(corner);
        }
    }

    let edges = tables::case_edges(case_index);
    for (v, vert) in verts.iter_mut().enumerate() {
        let edge = edges[v] as usize;
        let [a, b] = tables::EDGE_ENDPOINTS[edge];
        let t = interp_factor(isovalue, f[a], f[b]);
        *vert = (p[a] + (p[b] - p[a]) * t).extend(1.0);
    }
    if let Some(scalars) = scalars {
        for (v, scalar) in scalars.iter_mut().enumerate() {
            let edge = edges[v] as usize;
            let [a, b] = tables::EDGE_ENDPOINTS[edge];
            let t = interp_factor(isovalue, f[a], f[b]);
            *scalar = s[a] + (s[b] - s[a]) * t;
        }
    }

    // One flat normal per triangle, shared by its three vertices.
    for tri in (0..verts.len()).step_by(3) {
        let v0 = verts[tri].truncate();
        let v1 = verts[tri + 1].truncate();
        let v2 = verts[tri + 2].truncate();
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
        norms[tri] = normal;
        norms[tri + 1] = normal;
        norms[tri + 2] = normal;
    }
}

/// Split `buffer` into per-cell chunks sized by the valid cells' counts.
///
/// The chunks tile the buffer exactly; the surface sizes the output arrays
/// to the scan total before calling in.
fn split_by_counts<'a, T>(
    mut buffer: &'a mut [T],
    num_vertices: &[u8],
    indices: &[u32],
) -> Vec<&'a mut [T]> {
    let mut chunks = Vec::with_capacity(indices.len());
    for &cell in indices {
        let count = num_vertices[cell as usize] as usize;
        let (head, tail) = buffer.split_at_mut(count);
        chunks.push(head);
        buffer = tail;
    }
    chunks
}

/// Run the geometry pass over all valid cells.
#[allow(clippy::too_many_arguments)]
pub(crate) fn generate_geometry<F: ScalarField + ?Sized>(
    field: &F,
    source: Option<&dyn ScalarSource>,
    isovalue: f32,
    case_index: &[u8],
    num_vertices: &[u8],
    indices: &[u32],
    vertices: &mut [Vec4],
    normals: &mut [Vec3],
    scalars: Option<&mut [f32]>,
    execution: Execution,
) {
    let vert_chunks = split_by_counts(vertices, num_vertices, indices);
    let norm_chunks = split_by_counts(normals, num_vertices, indices);
    let scalar_chunks: Vec<Option<&mut [f32]>> = match scalars {
        Some(buffer) => split_by_counts(buffer, num_vertices, indices)
            .into_iter()
            .map(Some)
            .collect(),
        None => indices.iter().map(|_| None).collect(),
    };

    match execution {
        Execution::Sequential => {
            for (((&cell, verts), norms), scalars) in indices
                .iter()
                .zip(vert_chunks)
                .zip(norm_chunks)
                .zip(scalar_chunks)
            {
                generate_cell(
                    field,
                    source,
                    isovalue,
                    cell as usize,
                    case_index[cell as usize],
                    verts,
                    norms,
                    scalars,
                );
            }
        }
        Execution::Parallel => {
            indices
                .par_iter()
                .zip(vert_chunks)
                .zip(norm_chunks)
                .zip(scalar_chunks)
                .for_each(|(((&cell, verts), norms), scalars)| {
                    generate_cell(
                        field,
                        source,
                        isovalue,
                        cell as usize,
                        case_index[cell as usize],
                        verts,
                        norms,
                        scalars,
                    );
                });
        }
    }
}
