//! Surface extraction orchestrator.
//!
//! [`MarchingCubes`] owns every per-extraction buffer and sequences the
//! three passes: classification, compaction/index allocation and geometry
//! generation. Data flows strictly forward; re-running after an isovalue
//! change recomputes everything, since classification depends on the
//! isovalue entirely.

use glam::{Vec3, Vec4};

use crate::classify;
use crate::compact;
use crate::error::ExtractError;
use crate::field::{validate_dims, ScalarField, ScalarSource};
use crate::generate;
use crate::Execution;

/// Marching Cubes isosurface extractor over a borrowed scalar field.
///
/// Intermediate arrays are kept between extractions so repeated runs with
/// new isovalues reuse their allocations; [`MarchingCubes::free_intermediate`]
/// and [`MarchingCubes::free_output`] release them explicitly.
pub struct MarchingCubes<'a, F: ScalarField + ?Sized> {
    field: &'a F,
    source: Option<&'a dyn ScalarSource>,
    isovalue: f32,
    min_valid: Option<f32>,
    execution: Execution,

    // Per-extraction intermediates, indexed per cell / per valid cell.
    case_index: Vec<u8>,
    num_vertices: Vec<u8>,
    valid_cell_enum: Vec<u32>,
    valid_cell_indices: Vec<u32>,
    output_vertices_enum: Vec<u32>,

    // Packed outputs, all of length `num_total_vertices`.
    vertices: Vec<Vec4>,
    normals: Vec<Vec3>,
    scalars: Vec<f32>,
    num_total_vertices: usize,
}

impl<'a, F: ScalarField + ?Sized> MarchingCubes<'a, F> {
    /// Create an extractor for `field` at the given isovalue.
    pub fn new(field: &'a F, isovalue: f32) -> Self {
        Self::with_scalar_source(field, None, isovalue)
    }

    /// Create an extractor that also interpolates a secondary scalar source.
    ///
    /// The source's grid is assumed congruent with `field`'s; its values
    /// are interpolated at every output vertex into the scalar output
    /// array.
    pub fn with_scalar_source(
        field: &'a F,
        source: Option<&'a dyn ScalarSource>,
        isovalue: f32,
    ) -> Self {
        MarchingCubes {
            field,
            source,
            isovalue,
            min_valid: None,
            execution: Execution::default(),
            case_index: Vec::new(),
            num_vertices: Vec::new(),
            valid_cell_enum: Vec::new(),
            valid_cell_indices: Vec::new(),
            output_vertices_enum: Vec::new(),
            vertices: Vec::new(),
            normals: Vec::new(),
            scalars: Vec::new(),
            num_total_vertices: 0,
        }
    }

    /// Set the isovalue for subsequent extractions.
    pub fn set_isovalue(&mut self, isovalue: f32) {
        self.isovalue = isovalue;
    }

    /// Current isovalue.
    pub fn isovalue(&self) -> f32 {
        self.isovalue
    }

    /// Set the minimum-valid sample threshold.
    ///
    /// When set, cells touching any sample at or below the threshold are
    /// discarded during classification; `None` disables the check.
    pub fn set_min_valid(&mut self, min_valid: Option<f32>) {
        self.min_valid = min_valid;
    }

    /// Choose the executor for subsequent extractions.
    ///
    /// Sequential and parallel execution produce identical output; the
    /// switch only affects scheduling.
    pub fn set_execution(&mut self, execution: Execution) {
        self.execution = execution;
    }

    /// Run the full extraction pipeline.
    ///
    /// On success the output accessors reflect the new surface; when no
    /// cell intersects the isosurface the outputs are empty and
    /// [`MarchingCubes::num_total_vertices`] is 0.
    ///
    /// # Errors
    /// [`ExtractError::InvalidDimensions`] if any grid dimension is below
    /// 2 (checked before any pass runs), [`ExtractError::OutOfMemory`] if
    /// the output buffers cannot be allocated; the surface is left empty
    /// in both cases.
    pub fn extract(&mut self) -> Result<(), ExtractError> {
        validate_dims(self.field.dims())?;

        // Pass 1: classify every cell.
        classify::classify_cells(
            self.field,
            self.isovalue,
            self.min_valid,
            self.execution,
            &mut self.case_index,
            &mut self.num_vertices,
        );

        // Pass 2: compaction and output-index allocation.
        let num_valid = compact::enumerate_valid_cells(
            &self.num_vertices,
            &mut self.valid_cell_enum,
            self.execution,
        );
        if num_valid == 0 {
            self.valid_cell_indices.clear();
            self.output_vertices_enum.clear();
            self.free_output();
            return Ok(());
        }
        compact::valid_cell_indices(
            &self.valid_cell_enum,
            num_valid,
            &mut self.valid_cell_indices,
            self.execution,
        );
        compact::output_offsets(
            &self.num_vertices,
            &self.valid_cell_indices,
            &mut self.output_vertices_enum,
            self.execution,
        );
        let total = compact::total_vertices(
            &self.num_vertices,
            &self.valid_cell_indices,
            &self.output_vertices_enum,
        ) as usize;

        self.resize_output(total)?;

        // Pass 3: geometry generation into disjoint per-cell ranges.
        generate::generate_geometry(
            self.field,
            self.source,
            self.isovalue,
            &self.case_index,
            &self.num_vertices,
            &self.valid_cell_indices,
            &mut self.vertices,
            &mut self.normals,
            if self.source.is_some() {
                Some(&mut self.scalars)
            } else {
                None
            },
            self.execution,
        );
        self.num_total_vertices = total;
        Ok(())
    }

    /// Size the output arrays to exactly `total` entries.
    ///
    /// Allocation failure clears the outputs and reports
    /// [`ExtractError::OutOfMemory`] rather than leaving partial state.
    fn resize_output(&mut self, total: usize) -> Result<(), ExtractError> {
        self.num_total_vertices = 0;
        let grown = self.try_resize(total);
        if grown.is_err() {
            self.free_output();
        }
        grown
    }

    fn try_resize(&mut self, total: usize) -> Result<(), ExtractError> {
        self.vertices.clear();
        self.vertices.try_reserve_exact(total)?;
        self.vertices.resize(total, Vec4::ZERO);

        self.normals.clear();
        self.normals.try_reserve_exact(total)?;
        self.normals.resize(total, Vec3::ZERO);

        self.scalars.clear();
        if self.source.is_some() {
            self.scalars.try_reserve_exact(total)?;
            self.scalars.resize(total, 0.0);
        }
        Ok(())
    }

    /// Release intermediate arrays.
    ///
    /// With `include_classification` the per-cell classification arrays
    /// are dropped too; otherwise only the compaction arrays go, matching
    /// the cheaper between-extraction reset.
    pub fn free_intermediate(&mut self, include_classification: bool) {
        if include_classification {
            free(&mut self.case_index);
            free(&mut self.num_vertices);
            free(&mut self.valid_cell_enum);
        }
        free(&mut self.valid_cell_indices);
        free(&mut self.output_vertices_enum);
    }

    /// Release the output arrays, leaving a well-formed empty surface.
    pub fn free_output(&mut self) {
        free(&mut self.vertices);
        free(&mut self.normals);
        free(&mut self.scalars);
        self.num_total_vertices = 0;
    }

    /// Packed vertex positions, grouped in consecutive triangles; `w` is 1.
    pub fn vertices(&self) -> &[Vec4] {
        &self.vertices
    }

    /// Per-vertex normals; flat per triangle, unit length for
    /// non-degenerate triangles.
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Interpolated secondary scalars; empty unless a scalar source is
    /// attached.
    pub fn scalars(&self) -> &[f32] {
        &self.scalars
    }

    /// Total vertices emitted by the last extraction.
    pub fn num_total_vertices(&self) -> usize {
        self.num_total_vertices
    }

    /// Compacted valid-cell index list from the last extraction.
    pub fn valid_cell_indices(&self) -> &[u32] {
        &self.valid_cell_indices
    }

    /// Per-valid-cell output offsets from the last extraction.
    pub fn output_offsets(&self) -> &[u32] {
        &self.output_vertices_enum
    }

    /// Per-cell vertex counts from the last extraction's classification.
    pub fn cell_vertex_counts(&self) -> &[u8] {
        &self.num_vertices
    }
}

fn free<T>(buffer: &mut Vec<T>) {
    buffer.clear();
    buffer.shrink_to_fit();
}
