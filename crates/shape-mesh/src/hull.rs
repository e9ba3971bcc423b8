//! Convex hull of a mesh's point set.

use nalgebra::Vector3;
use parry3d::math::Point as ParryPoint;
use parry3d::transformation::try_convex_hull;
use tracing::debug;

use crate::error::{MeshError, MeshResult};
use crate::{Mesh, Vertex};

/// Relative thickness below which a point set counts as flat.
const COPLANAR_TOLERANCE: f64 = 1e-9;

/// Compute the convex hull of a mesh's vertices as a closed triangle mesh.
///
/// Fails with [`MeshError::DegenerateGeometry`] for fewer than 4 distinct
/// points or a point set with no extent along some direction, and with
/// [`MeshError::HullFailed`] if the hull algorithm itself gives up.
///
/// ```
/// use shape_mesh::{Mesh, Vertex, convex_hull};
///
/// let mut mesh = Mesh::new();
/// for &(x, y, z) in &[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0), (0.0, 0.0, 1.0), (0.1, 0.1, 0.1)] {
///     mesh.vertices.push(Vertex::from_coords(x, y, z));
/// }
///
/// let hull = convex_hull(&mesh).unwrap();
/// assert_eq!(hull.face_count(), 4);
/// assert!((hull.volume() - 1.0 / 6.0).abs() < 1e-6);
/// ```
pub fn convex_hull(mesh: &Mesh) -> MeshResult<Mesh> {
    let points = distinct_points(mesh);
    if points.len() < 4 {
        return Err(MeshError::degenerate_geometry(format!(
            "convex hull needs at least 4 distinct points, got {}",
            points.len()
        )));
    }
    check_not_flat(&points)?;

    let (hull_points, hull_faces) =
        try_convex_hull(&points).map_err(|e| MeshError::hull_failed(format!("{:?}", e)))?;

    if hull_faces.len() < 4 {
        return Err(MeshError::hull_failed(format!(
            "hull has only {} faces",
            hull_faces.len()
        )));
    }

    let mut hull = Mesh::with_capacity(hull_points.len(), hull_faces.len());
    hull.vertices.extend(
        hull_points
            .iter()
            .map(|p| Vertex::from_coords(p.x as f64, p.y as f64, p.z as f64)),
    );
    hull.faces = hull_faces;

    debug!(
        input_points = points.len(),
        hull_vertices = hull.vertex_count(),
        hull_faces = hull.face_count(),
        "Convex hull computed"
    );

    Ok(hull)
}

/// Mesh vertices as hull input, with duplicates removed after the narrowing
/// to the hull library's precision.
fn distinct_points(mesh: &Mesh) -> Vec<ParryPoint<f32>> {
    let mut keyed: Vec<[u32; 3]> = mesh
        .vertices
        .iter()
        .map(|v| {
            let p = v.position;
            [
                (p.x as f32).to_bits(),
                (p.y as f32).to_bits(),
                (p.z as f32).to_bits(),
            ]
        })
        .collect();
    keyed.sort_unstable();
    keyed.dedup();

    keyed
        .into_iter()
        .map(|[x, y, z]| ParryPoint::new(f32::from_bits(x), f32::from_bits(y), f32::from_bits(z)))
        .collect()
}

/// Reject point sets that are collinear or coplanar.
///
/// Picks the farthest point from the first as an axis, the point farthest
/// from that axis as a second direction, and measures the spread along the
/// normal of the plane they span.
fn check_not_flat(points: &[ParryPoint<f32>]) -> MeshResult<()> {
    let origin = to_f64(&points[0]);
    let offsets: Vec<Vector3<f64>> = points.iter().map(|p| to_f64(p) - origin).collect();

    let axis_point = farthest_by(&offsets, |d| d.norm_squared());
    let extent = axis_point.norm();
    if extent <= 0.0 {
        return Err(MeshError::degenerate_geometry("all points coincide"));
    }
    let axis = axis_point / extent;

    let off_axis = |d: &Vector3<f64>| d - axis * d.dot(&axis);
    let side_point = off_axis(&farthest_by(&offsets, |d| off_axis(d).norm_squared()));
    if side_point.norm() <= COPLANAR_TOLERANCE * extent {
        return Err(MeshError::degenerate_geometry("all points are collinear"));
    }

    let normal = axis.cross(&side_point).normalize();
    let thickness = offsets
        .iter()
        .map(|d| d.dot(&normal).abs())
        .fold(0.0_f64, f64::max);
    if thickness <= COPLANAR_TOLERANCE * extent {
        return Err(MeshError::degenerate_geometry("all points are coplanar"));
    }

    Ok(())
}

fn farthest_by(offsets: &[Vector3<f64>], score: impl Fn(&Vector3<f64>) -> f64) -> Vector3<f64> {
    offsets
        .iter()
        .copied()
        .max_by(|a, b| score(a).total_cmp(&score(b)))
        .unwrap_or_else(Vector3::zeros)
}

#[inline]
fn to_f64(p: &ParryPoint<f32>) -> Vector3<f64> {
    Vector3::new(p.x as f64, p.y as f64, p.z as f64)
}
