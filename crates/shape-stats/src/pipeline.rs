//! Mask-to-surface pipeline and hull metrics.

use std::collections::BTreeMap;

use shape_mesh::{Mesh, log_mesh_stats};
use tracing::debug;

use crate::engine::{SurfaceEngine, SurfaceNetsEngine};
use crate::error::StatsResult;
use crate::image::{Label, LabelImage};
use crate::mask::{BinaryMask, padded_mask};
use crate::params::MeasureParams;

/// Smoothing iterations used when the caller does not choose.
pub const DEFAULT_SMOOTH_ITERATIONS: usize = 15;

/// Areas and volumes of a surface and its convex hull.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceMetrics {
    pub hull_area: f64,
    pub hull_volume: f64,
    pub area: f64,
    pub volume: f64,
}

/// Build a closed surface from a padded mask with the default engine.
///
/// ```
/// use shape_stats::{LabelImage, build_surface, padded_mask};
///
/// let image = LabelImage::from_fn([4, 4, 4], |x, y, z| {
///     u8::from((1..3).contains(&x) && (1..3).contains(&y) && (1..3).contains(&z))
/// });
/// let mesh = build_surface(&padded_mask(&image, 1), 0).unwrap();
///
/// assert!(mesh.validate().is_closed_solid());
/// ```
pub fn build_surface(mask: &BinaryMask, smooth_iterations: usize) -> StatsResult<Mesh> {
    let params = MeasureParams {
        smooth_iterations,
        ..MeasureParams::default()
    };
    build_surface_with(&SurfaceNetsEngine, mask, &params)
}

/// Build a surface with any engine: extract at `params.iso_level`, clean,
/// then smooth unless `params.smooth_iterations` is zero.
pub fn build_surface_with<E: SurfaceEngine + ?Sized>(
    engine: &E,
    mask: &BinaryMask,
    params: &MeasureParams,
) -> StatsResult<Mesh> {
    let volume = mask.to_scalar_volume(params.voxel_spacing)?;

    let mut mesh = engine.isosurface(&volume, params.iso_level)?;
    log_mesh_stats(&mesh, "isosurface");

    engine.clean(&mut mesh, &params.clean)?;

    if params.smooth_iterations > 0 {
        engine.smooth(&mut mesh, &params.smooth_params())?;
    }

    debug!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        smooth_iterations = params.smooth_iterations,
        "Surface built"
    );
    Ok(mesh)
}

/// One surface per non-background label, keyed in ascending label order.
pub fn surface_meshes<L: Label>(
    image: &LabelImage<L>,
    smooth_iterations: usize,
) -> StatsResult<BTreeMap<L, Mesh>> {
    let mut meshes = BTreeMap::new();
    for label in image.unique_labels() {
        let mesh = build_surface(&padded_mask(image, label), smooth_iterations)
            .map_err(|e| e.for_label(label))?;
        meshes.insert(label, mesh);
    }
    Ok(meshes)
}

/// Convex hull plus surface and hull areas and volumes, via the default engine.
pub fn hull_and_metrics(mesh: &Mesh) -> StatsResult<SurfaceMetrics> {
    hull_and_metrics_with(&SurfaceNetsEngine, mesh)
}

/// [`hull_and_metrics`] with any engine.
pub fn hull_and_metrics_with<E: SurfaceEngine + ?Sized>(
    engine: &E,
    mesh: &Mesh,
) -> StatsResult<SurfaceMetrics> {
    let hull = engine.convex_hull(mesh)?;
    let metrics = SurfaceMetrics {
        hull_area: engine.area(&hull),
        hull_volume: engine.volume(&hull),
        area: engine.area(mesh),
        volume: engine.volume(mesh),
    };

    debug!(
        hull_faces = hull.face_count(),
        area = metrics.area,
        volume = metrics.volume,
        hull_volume = metrics.hull_volume,
        "Hull computed"
    );
    Ok(metrics)
}
