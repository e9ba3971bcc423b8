//! Capability traits for the two external engines the aggregator drives.
//!
//! [`SurfaceEngine`] turns a scalar volume into a measured surface and hull.
//! [`VoxelMeasurer`] measures named features straight off a binary mask.
//! Both are object-safe and `Send + Sync` so they can be shared across the
//! label workers, and both can be replaced with test doubles.

use shape_mesh::{CleanParams, Mesh, MeshResult, ScalarVolume, SmoothParams};

use crate::error::StatsResult;
use crate::mask::BinaryMask;

/// Mesh-from-volume builder.
pub trait SurfaceEngine: Send + Sync {
    /// Extract the surface where the volume crosses `level`.
    fn isosurface(&self, volume: &ScalarVolume, level: f64) -> MeshResult<Mesh>;

    /// Remove duplicate and degenerate geometry.
    fn clean(&self, mesh: &mut Mesh, params: &CleanParams) -> MeshResult<()>;

    /// Smooth for `params.iterations` rounds. Zero iterations must be a no-op.
    fn smooth(&self, mesh: &mut Mesh, params: &SmoothParams) -> MeshResult<()>;

    /// Convex hull of the mesh's point set.
    fn convex_hull(&self, mesh: &Mesh) -> MeshResult<Mesh>;

    fn area(&self, mesh: &Mesh) -> f64 {
        mesh.surface_area()
    }

    fn volume(&self, mesh: &Mesh) -> f64 {
        mesh.volume()
    }
}

/// Default [`SurfaceEngine`] backed by `shape-mesh`: Surface Nets extraction,
/// spatial-hash cleanup, umbrella smoothing and a quickhull convex hull.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurfaceNetsEngine;

impl SurfaceEngine for SurfaceNetsEngine {
    fn isosurface(&self, volume: &ScalarVolume, level: f64) -> MeshResult<Mesh> {
        shape_mesh::extract_isosurface(volume, level)
    }

    fn clean(&self, mesh: &mut Mesh, params: &CleanParams) -> MeshResult<()> {
        shape_mesh::clean_mesh(mesh, params).map(|_| ())
    }

    fn smooth(&self, mesh: &mut Mesh, params: &SmoothParams) -> MeshResult<()> {
        shape_mesh::smooth_mesh(mesh, params)
    }

    fn convex_hull(&self, mesh: &Mesh) -> MeshResult<Mesh> {
        shape_mesh::convex_hull(mesh)
    }
}

/// Named voxel features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VoxelFeature {
    /// Boundary area, weighted by the local arrangement of exposed voxel faces.
    SurfaceArea,
    /// Sphericity index `S^1.5 / (6√π · V)`.
    P2A,
    /// Physical volume: voxel count times voxel volume.
    Size,
}

impl VoxelFeature {
    pub fn name(&self) -> &'static str {
        match self {
            VoxelFeature::SurfaceArea => "SurfaceArea",
            VoxelFeature::P2A => "P2A",
            VoxelFeature::Size => "Size",
        }
    }
}

impl std::fmt::Display for VoxelFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Features of one connected component. Only requested features are set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentFeatures {
    /// 1-based component id in raster order of each component's first voxel.
    pub id: usize,
    pub surface_area: Option<f64>,
    pub p2a: Option<f64>,
    pub size: Option<f64>,
}

impl ComponentFeatures {
    pub fn get(&self, feature: VoxelFeature) -> Option<f64> {
        match feature {
            VoxelFeature::SurfaceArea => self.surface_area,
            VoxelFeature::P2A => self.p2a,
            VoxelFeature::Size => self.size,
        }
    }
}

/// Named-feature voxel measurer.
pub trait VoxelMeasurer: Send + Sync {
    /// Measure `features` for every connected component of `mask`, ordered
    /// by component id. `spacing` is the physical voxel size per axis.
    fn measure(
        &self,
        mask: &BinaryMask,
        spacing: [f64; 3],
        features: &[VoxelFeature],
    ) -> StatsResult<Vec<ComponentFeatures>>;
}
