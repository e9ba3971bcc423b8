//! Isosurface extraction using Surface Nets.

use fast_surface_nets::{SurfaceNetsBuffer, ndshape::RuntimeShape, surface_nets};
use tracing::{debug, info};

use crate::error::{MeshError, MeshResult};
use crate::volume::ScalarVolume;
use crate::{Mesh, Vertex};

/// Extract the surface where the volume crosses `level`.
///
/// Samples at or above `level` are inside. Faces are wound so normals point
/// from inside to outside. Samples on the outermost layer of the grid never
/// get a surface on their far side, so a region touching the grid boundary
/// comes out open; pad the volume with outside samples to close it.
///
/// Vertices are placed in world space using the volume's origin and spacing.
pub fn extract_isosurface(volume: &ScalarVolume, level: f64) -> MeshResult<Mesh> {
    let [nx, ny, nz] = volume.dims();
    if nx < 2 || ny < 2 || nz < 2 {
        return Err(MeshError::invalid_volume(format!(
            "isosurface extraction needs at least 2 samples per axis, got {:?}",
            volume.dims()
        )));
    }
    if !level.is_finite() {
        return Err(MeshError::invalid_params(
            "level",
            format!("must be finite, got {}", level),
        ));
    }

    info!(dims = ?volume.dims(), level, "Extracting isosurface");

    // Surface nets treats negative samples as inside
    let level = level as f32;
    let sdf: Vec<f32> = volume.values().iter().map(|&v| level - v).collect();

    let shape = RuntimeShape::<u32, 3>::new([nx as u32, ny as u32, nz as u32]);
    let mut buffer = SurfaceNetsBuffer::default();
    surface_nets(
        &sdf,
        &shape,
        [0, 0, 0],
        [nx as u32 - 1, ny as u32 - 1, nz as u32 - 1],
        &mut buffer,
    );

    if buffer.positions.is_empty() || buffer.indices.is_empty() {
        return Err(MeshError::EmptyIsosurface {
            level: level as f64,
        });
    }

    debug!(
        positions = buffer.positions.len(),
        indices = buffer.indices.len(),
        "Surface nets complete"
    );

    let mut mesh = Mesh::with_capacity(buffer.positions.len(), buffer.indices.len() / 3);
    mesh.vertices.extend(buffer.positions.iter().map(|pos| {
        Vertex::new(volume.world_position([pos[0] as f64, pos[1] as f64, pos[2] as f64]))
    }));
    mesh.faces.extend(
        buffer
            .indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]]),
    );

    debug!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "Isosurface mesh created"
    );

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_mesh;

    /// A zero-bordered volume with a solid box of ones inside.
    fn padded_box(dims: [usize; 3], lo: [usize; 3], hi: [usize; 3]) -> ScalarVolume {
        let mut volume = ScalarVolume::filled(dims, 0.0);
        for z in lo[2]..hi[2] {
            for y in lo[1]..hi[1] {
                for x in lo[0]..hi[0] {
                    volume.set(x, y, z, 1.0);
                }
            }
        }
        volume
    }

    #[test]
    fn test_box_surface_is_closed() {
        let volume = padded_box([8, 8, 8], [2, 2, 2], [6, 6, 6]);
        let mesh = extract_isosurface(&volume, 0.5).unwrap();

        let report = validate_mesh(&mesh);
        assert!(report.is_watertight(), "{}", report);
        // 4^3 voxels with chamfered edges and corners
        assert!(report.volume() > 40.0 && report.volume() <= 64.0, "{}", report);
    }

    #[test]
    fn test_box_against_far_border_is_closed() {
        // Boxes ending on the last interior sample of each axis
        for axis in 0..3 {
            let mut hi = [5, 5, 5];
            hi[axis] = 6;
            let volume = padded_box([7, 7, 7], [2, 2, 2], hi);
            let mesh = extract_isosurface(&volume, 0.5).unwrap();

            let report = validate_mesh(&mesh);
            assert!(report.is_closed_solid(), "axis {}: {}", axis, report);
        }
    }

    #[test]
    fn test_far_and_near_border_boxes_match() {
        let near = extract_isosurface(&padded_box([6, 6, 6], [1, 2, 2], [4, 4, 4]), 0.5).unwrap();
        let far = extract_isosurface(&padded_box([6, 6, 6], [2, 2, 2], [5, 4, 4]), 0.5).unwrap();

        assert_eq!(near.face_count(), far.face_count());
        assert!((near.volume() - far.volume()).abs() < 1e-4);
    }

    #[test]
    fn test_vertices_follow_spacing_and_origin() {
        let volume = padded_box([5, 5, 5], [2, 2, 2], [3, 3, 3])
            .with_spacing([2.0, 2.0, 2.0])
            .unwrap()
            .with_origin(nalgebra::Point3::new(-2.0, -2.0, -2.0));
        let mesh = extract_isosurface(&volume, 0.5).unwrap();

        let (min, max) = mesh.bounds().unwrap();
        // Lone voxel at lattice 2 maps to world 2; the surface sits within a voxel of it
        assert!(min.x > 0.0 && max.x < 4.0, "{:?} {:?}", min, max);
    }

    #[test]
    fn test_uniform_volume_has_no_surface() {
        let volume = ScalarVolume::filled([4, 4, 4], 0.0);
        let err = extract_isosurface(&volume, 0.5).unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::EmptyIsosurface);
    }

    #[test]
    fn test_too_small_volume() {
        let volume = ScalarVolume::filled([1, 4, 4], 1.0);
        assert!(extract_isosurface(&volume, 0.5).is_err());
    }
}
