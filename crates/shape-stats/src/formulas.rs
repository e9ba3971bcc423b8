//! Dimensionless shape descriptors.
//!
//! All three functions return the raw ratio without clamping. Values above
//! one mean the inputs are inconsistent (a self-intersecting surface, or a
//! hull that does not enclose the mesh) and are passed through so callers
//! can see them.

use std::f64::consts::PI;

use crate::error::{StatsError, StatsResult};

/// Wadell sphericity: surface area of the volume-equivalent sphere divided
/// by the actual surface area, `π^(1/3) · (6V)^(2/3) / A`.
///
/// ```
/// use shape_stats::sphericity_wadell;
///
/// let r: f64 = 2.0;
/// let volume = 4.0 / 3.0 * std::f64::consts::PI * r.powi(3);
/// let area = 4.0 * std::f64::consts::PI * r.powi(2);
/// assert!((sphericity_wadell(volume, area).unwrap() - 1.0).abs() < 1e-12);
/// ```
pub fn sphericity_wadell(volume: f64, surface_area: f64) -> StatsResult<f64> {
    check_denominator("sphericity_wadell", surface_area)?;
    Ok(PI.cbrt() * (6.0 * volume).powf(2.0 / 3.0) / surface_area)
}

/// Legland sphericity, `36π · V² / A³`. Equal to the cube of the Wadell value.
pub fn sphericity_legland(volume: f64, surface_area: f64) -> StatsResult<f64> {
    check_denominator("sphericity_legland", surface_area)?;
    Ok(36.0 * PI * volume * volume / surface_area.powi(3))
}

/// Solidity: enclosed volume over convex hull volume.
pub fn solidity(surface_volume: f64, convex_hull_volume: f64) -> StatsResult<f64> {
    check_denominator("solidity", convex_hull_volume)?;
    Ok(surface_volume / convex_hull_volume)
}

/// Voxel-based sphericity from a surface area estimate and volume,
/// `S^1.5 / (6√π · V)`. Equal to one for a perfect sphere.
pub fn perimeter_to_area(surface_area: f64, volume: f64) -> StatsResult<f64> {
    check_denominator("p2a", volume)?;
    Ok(surface_area.powf(1.5) / (6.0 * PI.sqrt() * volume))
}

fn check_denominator(quantity: &'static str, denominator: f64) -> StatsResult<()> {
    if denominator == 0.0 || !denominator.is_finite() {
        return Err(StatsError::arithmetic(quantity, denominator));
    }
    Ok(())
}
