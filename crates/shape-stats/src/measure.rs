//! Per-label measurement pass.

use rayon::prelude::*;
use shape_mesh::OperationTimer;
use tracing::{debug, info, warn};

use crate::engine::{SurfaceEngine, SurfaceNetsEngine, VoxelFeature, VoxelMeasurer};
use crate::error::{StatsError, StatsResult};
use crate::formulas::{solidity, sphericity_legland, sphericity_wadell};
use crate::image::{Label, LabelImage};
use crate::mask::{binary_mask, padded_mask};
use crate::params::MeasureParams;
use crate::pipeline::{build_surface_with, hull_and_metrics_with};
use crate::table::{MeasurementRow, MeasurementTable};

/// Ratios above this are logged. The hull is computed in single precision,
/// so a convex surface can land a hair above one.
const RATIO_WARN_THRESHOLD: f64 = 1.0 + 1e-4;

const VOXEL_FEATURES: [VoxelFeature; 3] = [
    VoxelFeature::SurfaceArea,
    VoxelFeature::P2A,
    VoxelFeature::Size,
];

/// Measure every non-background label of `image`.
///
/// One row per label, in ascending label order. An empty or all-background
/// image gives an empty table. The first failing label aborts the pass with
/// its error wrapped in [`StatsError::Label`].
///
/// ```
/// use shape_stats::{LabelImage, measure};
///
/// let image = LabelImage::from_fn([10, 5, 5], |x, y, z| {
///     let inside = (1..4).contains(&y) && (1..4).contains(&z);
///     match x {
///         1..=3 if inside => 1u8,
///         6..=8 if inside => 5,
///         _ => 0,
///     }
/// });
///
/// let table = measure(&image, 15, false).unwrap();
/// assert_eq!(table.labels(), vec![1, 5]);
/// for row in &table {
///     assert!(row.sphericity_wadell > 0.5 && row.sphericity_wadell < 1.0);
/// }
/// ```
pub fn measure<L: Label>(
    image: &LabelImage<L>,
    smooth_iterations: usize,
    use_secondary_sphericity: bool,
) -> StatsResult<MeasurementTable<L>> {
    let params = MeasureParams {
        smooth_iterations,
        use_secondary_sphericity,
        ..MeasureParams::default()
    };
    measure_with_params(image, &params)
}

/// Measure with full parameters and the default engines.
pub fn measure_with_params<L: Label>(
    image: &LabelImage<L>,
    params: &MeasureParams,
) -> StatsResult<MeasurementTable<L>> {
    measure_with(image, params, &SurfaceNetsEngine, &params.voxel_measurer())
}

/// Measure with caller-supplied engines.
pub fn measure_with<L, E, V>(
    image: &LabelImage<L>,
    params: &MeasureParams,
    engine: &E,
    voxels: &V,
) -> StatsResult<MeasurementTable<L>>
where
    L: Label,
    E: SurfaceEngine + ?Sized,
    V: VoxelMeasurer + ?Sized,
{
    params.validate()?;

    let labels = image.unique_labels();
    let _timer = OperationTimer::with_items("measure", labels.len());
    info!(
        labels = labels.len(),
        dims = ?image.dims(),
        smooth_iterations = params.smooth_iterations,
        secondary_sphericity = params.use_secondary_sphericity,
        parallel = params.parallel,
        "Measuring label image"
    );

    if labels.is_empty() {
        info!("No foreground labels; returning empty table");
        return Ok(MeasurementTable::new(params.use_secondary_sphericity));
    }

    let measure_one = |&label: &L| {
        measure_label(image, label, params, engine, voxels).map_err(|e| e.for_label(label))
    };

    // Collect every result first so the reported error is the lowest
    // failing label whether or not the pass ran in parallel.
    let results: Vec<StatsResult<MeasurementRow<L>>> = if params.parallel {
        labels.par_iter().map(measure_one).collect()
    } else {
        labels.iter().map(measure_one).collect()
    };
    let rows = results.into_iter().collect::<StatsResult<Vec<_>>>()?;

    let mut table = MeasurementTable::new(params.use_secondary_sphericity);
    for row in rows {
        table.push(row);
    }

    info!(rows = table.len(), "Measurement complete");
    Ok(table)
}

fn measure_label<L, E, V>(
    image: &LabelImage<L>,
    label: L,
    params: &MeasureParams,
    engine: &E,
    voxels: &V,
) -> StatsResult<MeasurementRow<L>>
where
    L: Label,
    E: SurfaceEngine + ?Sized,
    V: VoxelMeasurer + ?Sized,
{
    let mask = padded_mask(image, label);
    let mesh = build_surface_with(engine, &mask, params)?;
    let metrics = hull_and_metrics_with(engine, &mesh)?;

    let solidity = solidity(metrics.volume, metrics.hull_volume)?;
    let wadell = sphericity_wadell(metrics.volume, metrics.area)?;
    let legland = sphericity_legland(metrics.volume, metrics.area)?;

    if solidity > RATIO_WARN_THRESHOLD {
        warn!(label = ?label, solidity, "Solidity above one; hull does not enclose the surface");
    }
    if wadell > RATIO_WARN_THRESHOLD {
        warn!(
            label = ?label,
            sphericity_wadell = wadell,
            "Sphericity above one; surface may self-intersect"
        );
    }

    let sphericity_diplib = if params.use_secondary_sphericity {
        let components = voxels.measure(
            &binary_mask(image, label),
            params.voxel_spacing,
            &VOXEL_FEATURES,
        )?;
        if components.len() > 1 {
            debug!(
                label = ?label,
                components = components.len(),
                "Label has several voxel components; using the first"
            );
        }
        let p2a = components
            .first()
            .and_then(|c| c.p2a)
            .ok_or_else(|| StatsError::voxel_measurement("no P2A value for the first component"))?;
        Some(p2a)
    } else {
        None
    };

    debug!(
        label = ?label,
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        area = metrics.area,
        volume = metrics.volume,
        solidity,
        sphericity_wadell = wadell,
        "Label measured"
    );

    Ok(MeasurementRow {
        label,
        surface_area: metrics.area,
        volume: metrics.volume,
        convex_hull_area: metrics.hull_area,
        convex_hull_volume: metrics.hull_volume,
        solidity,
        sphericity_wadell: wadell,
        sphericity_legland: legland,
        sphericity_diplib,
    })
}
