//! Measurement configuration.

use shape_mesh::{CleanParams, SmoothMethod, SmoothParams};

use crate::error::{StatsError, StatsResult};
use crate::pipeline::DEFAULT_SMOOTH_ITERATIONS;
use crate::voxel::{Connectivity, VoxelFeatureMeasurer};

/// Parameters for a measurement pass.
///
/// ```
/// use shape_stats::MeasureParams;
///
/// let params = MeasureParams::default();
/// assert_eq!(params.smooth_iterations, 15);
/// assert_eq!(params.iso_level, 0.5);
/// assert!(!params.use_secondary_sphericity);
///
/// let raw = MeasureParams::unsmoothed();
/// assert_eq!(raw.smooth_iterations, 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasureParams {
    /// Smoothing iterations applied to each surface. Zero disables smoothing.
    pub smooth_iterations: usize,

    /// Add the voxel-based `sphericity_diplib` column.
    pub use_secondary_sphericity: bool,

    /// Threshold between outside (0) and inside (1) mask samples.
    pub iso_level: f64,

    /// Physical voxel size along x, y and z.
    pub voxel_spacing: [f64; 3],

    /// Measure labels on the rayon thread pool. Results are identical to
    /// a sequential pass.
    pub parallel: bool,

    /// Mesh cleanup applied after extraction.
    pub clean: CleanParams,

    /// Smoothing filter.
    pub smooth_method: SmoothMethod,

    /// Component connectivity for the voxel measurer.
    pub connectivity: Connectivity,
}

impl Default for MeasureParams {
    fn default() -> Self {
        Self {
            smooth_iterations: DEFAULT_SMOOTH_ITERATIONS,
            use_secondary_sphericity: false,
            iso_level: 0.5,
            voxel_spacing: [1.0, 1.0, 1.0],
            parallel: false,
            clean: CleanParams::default(),
            smooth_method: SmoothMethod::default(),
            connectivity: Connectivity::default(),
        }
    }
}

impl MeasureParams {
    /// Raw extracted surfaces with no smoothing.
    pub fn unsmoothed() -> Self {
        Self {
            smooth_iterations: 0,
            ..Self::default()
        }
    }

    /// Default smoothing plus the voxel-based sphericity column.
    pub fn with_voxel_comparison() -> Self {
        Self {
            use_secondary_sphericity: true,
            ..Self::default()
        }
    }

    /// Smoothing parameters for the surface engine.
    pub fn smooth_params(&self) -> SmoothParams {
        SmoothParams::new(self.smooth_iterations, self.smooth_method)
    }

    /// The default voxel measurer configured with these parameters.
    pub fn voxel_measurer(&self) -> VoxelFeatureMeasurer {
        VoxelFeatureMeasurer::new(self.connectivity)
    }

    /// Check values the engines cannot validate themselves.
    pub fn validate(&self) -> StatsResult<()> {
        if !(self.iso_level.is_finite() && self.iso_level > 0.0 && self.iso_level < 1.0) {
            return Err(StatsError::invalid_params(
                "iso_level",
                format!("must lie strictly between 0 and 1, got {}", self.iso_level),
            ));
        }
        if self
            .voxel_spacing
            .iter()
            .any(|s| !s.is_finite() || *s <= 0.0)
        {
            return Err(StatsError::invalid_params(
                "voxel_spacing",
                format!("must be positive and finite, got {:?}", self.voxel_spacing),
            ));
        }
        if !(self.clean.weld_epsilon.is_finite() && self.clean.weld_epsilon > 0.0) {
            return Err(StatsError::invalid_params(
                "weld_epsilon",
                format!("must be finite and positive, got {}", self.clean.weld_epsilon),
            ));
        }
        Ok(())
    }
}
