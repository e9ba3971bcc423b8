//! Fluent builder API for measurement passes.

use shape_mesh::{CleanParams, SmoothMethod};

use crate::engine::{SurfaceEngine, VoxelMeasurer};
use crate::error::StatsResult;
use crate::image::{Label, LabelImage};
use crate::measure::{measure_with, measure_with_params};
use crate::params::MeasureParams;
use crate::table::MeasurementTable;
use crate::voxel::Connectivity;

/// Fluent builder for a measurement pass.
///
/// # Example
///
/// ```
/// use shape_stats::{LabelImage, MeasureBuilder};
///
/// let image = LabelImage::from_fn([6, 6, 6], |x, y, z| {
///     u8::from((1..5).contains(&x) && (1..5).contains(&y) && (1..5).contains(&z))
/// });
///
/// // Defaults: 15 smoothing iterations, no voxel column
/// let table = MeasureBuilder::new(&image).build().unwrap();
/// assert_eq!(table.len(), 1);
///
/// // Unsmoothed, anisotropic voxels, with the voxel-based sphericity
/// let table = MeasureBuilder::new(&image)
///     .no_smoothing()
///     .voxel_spacing([0.5, 0.5, 2.0])
///     .secondary_sphericity(true)
///     .build()
///     .unwrap();
/// assert!(table.rows()[0].sphericity_diplib.is_some());
/// ```
pub struct MeasureBuilder<'a, L> {
    image: &'a LabelImage<L>,
    params: MeasureParams,
}

impl<'a, L: Label> MeasureBuilder<'a, L> {
    /// Start from default parameters.
    pub fn new(image: &'a LabelImage<L>) -> Self {
        Self {
            image,
            params: MeasureParams::default(),
        }
    }

    /// Start from existing parameters.
    pub fn with_params(image: &'a LabelImage<L>, params: MeasureParams) -> Self {
        Self { image, params }
    }

    // =========================================================================
    // Surface options
    // =========================================================================

    /// Smoothing iterations per surface.
    pub fn smooth_iterations(mut self, iterations: usize) -> Self {
        self.params.smooth_iterations = iterations;
        self
    }

    /// Measure the raw extracted surfaces.
    pub fn no_smoothing(mut self) -> Self {
        self.params.smooth_iterations = 0;
        self
    }

    pub fn smooth_method(mut self, method: SmoothMethod) -> Self {
        self.params.smooth_method = method;
        self
    }

    pub fn clean_params(mut self, clean: CleanParams) -> Self {
        self.params.clean = clean;
        self
    }

    /// Physical voxel size along x, y and z.
    pub fn voxel_spacing(mut self, spacing: [f64; 3]) -> Self {
        self.params.voxel_spacing = spacing;
        self
    }

    // =========================================================================
    // Voxel measurement options
    // =========================================================================

    /// Add the voxel-based `sphericity_diplib` column.
    pub fn secondary_sphericity(mut self, enable: bool) -> Self {
        self.params.use_secondary_sphericity = enable;
        self
    }

    /// Component connectivity for the voxel measurer.
    pub fn connectivity(mut self, connectivity: Connectivity) -> Self {
        self.params.connectivity = connectivity;
        self
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Measure labels on the rayon thread pool.
    pub fn parallel(mut self, enable: bool) -> Self {
        self.params.parallel = enable;
        self
    }

    pub fn params(&self) -> &MeasureParams {
        &self.params
    }

    pub fn into_params(self) -> MeasureParams {
        self.params
    }

    /// Run the pass with the default engines.
    pub fn build(self) -> StatsResult<MeasurementTable<L>> {
        measure_with_params(self.image, &self.params)
    }

    /// Run the pass with caller-supplied engines.
    pub fn build_with<E, V>(self, engine: &E, voxels: &V) -> StatsResult<MeasurementTable<L>>
    where
        E: SurfaceEngine + ?Sized,
        V: VoxelMeasurer + ?Sized,
    {
        measure_with(self.image, &self.params, engine, voxels)
    }
}
