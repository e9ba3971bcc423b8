//! Mesh cleanup: vertex welding, degenerate and duplicate removal, compaction.
//!
//! Extracted isosurfaces carry coincident vertices along cell seams and the
//! occasional zero-area sliver. Area, volume and smoothing all assume an
//! indexed surface without either, so [`clean_mesh`] runs before any of them.

use hashbrown::{HashMap, HashSet};
use nalgebra::Point3;
use tracing::debug;

use crate::error::{MeshError, MeshResult};
use crate::{Mesh, Triangle};

/// Configuration for mesh cleanup.
///
/// Thresholds are in mesh coordinate units.
///
/// # Example
///
/// ```
/// use shape_mesh::CleanParams;
///
/// let params = CleanParams::default();
/// assert!(params.weld_epsilon > 0.0);
///
/// let strict = CleanParams {
///     degenerate_area_threshold: 1e-9,
///     ..CleanParams::default()
/// };
/// assert!(strict.remove_duplicates);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CleanParams {
    /// Vertices closer than this are merged.
    pub weld_epsilon: f64,

    /// Triangles with area at or below this are dropped.
    pub degenerate_area_threshold: f64,

    /// Drop faces that repeat another face's vertex set.
    pub remove_duplicates: bool,

    /// Compact the vertex array after face removal.
    pub remove_unreferenced: bool,
}

impl Default for CleanParams {
    fn default() -> Self {
        Self {
            weld_epsilon: 1e-6,
            degenerate_area_threshold: 0.0,
            remove_duplicates: true,
            remove_unreferenced: true,
        }
    }
}

/// Counts of what [`clean_mesh`] removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub vertices_welded: usize,
    pub degenerate_faces_removed: usize,
    pub duplicate_faces_removed: usize,
    pub unreferenced_vertices_removed: usize,
}

/// Run the cleanup pipeline in place.
///
/// Fails with [`MeshError::EmptyMesh`] if nothing is left afterwards.
pub fn clean_mesh(mesh: &mut Mesh, params: &CleanParams) -> MeshResult<CleanReport> {
    if params.weld_epsilon <= 0.0 || !params.weld_epsilon.is_finite() {
        return Err(MeshError::invalid_params(
            "weld_epsilon",
            format!("must be finite and positive, got {}", params.weld_epsilon),
        ));
    }
    mesh.check_integrity()?;

    let initial_vertices = mesh.vertex_count();
    let initial_faces = mesh.face_count();

    let mut report = CleanReport {
        vertices_welded: weld_vertices(mesh, params.weld_epsilon),
        ..CleanReport::default()
    };
    report.degenerate_faces_removed =
        remove_degenerate_triangles(mesh, params.degenerate_area_threshold);
    if params.remove_duplicates {
        report.duplicate_faces_removed = remove_duplicate_faces(mesh);
    }
    if params.remove_unreferenced {
        report.unreferenced_vertices_removed = remove_unreferenced_vertices(mesh);
    }

    debug!(
        vertices_before = initial_vertices,
        faces_before = initial_faces,
        vertices_after = mesh.vertex_count(),
        faces_after = mesh.face_count(),
        ?report,
        "Mesh cleaned"
    );

    if mesh.is_empty() {
        return Err(MeshError::empty_mesh(format!(
            "no faces left after cleanup of {} faces",
            initial_faces
        )));
    }

    Ok(report)
}

/// Remove triangles whose area is at or below `area_threshold`, plus any
/// triangle that repeats a vertex index.
///
/// Returns the number of triangles removed.
pub fn remove_degenerate_triangles(mesh: &mut Mesh, area_threshold: f64) -> usize {
    let original_count = mesh.faces.len();
    let vertices = &mesh.vertices;

    mesh.faces.retain(|&[i0, i1, i2]| {
        if i0 == i1 || i1 == i2 || i0 == i2 {
            return false;
        }
        let tri = Triangle::new(
            vertices[i0 as usize].position,
            vertices[i1 as usize].position,
            vertices[i2 as usize].position,
        );
        !tri.is_degenerate(area_threshold)
    });

    let removed = original_count - mesh.faces.len();
    if removed > 0 {
        debug!(removed, area_threshold, "Removed degenerate triangles");
    }
    removed
}

/// Merge vertices within `epsilon` of each other.
///
/// Uses a spatial hash with cells of twice epsilon, checking the 3x3x3
/// neighbourhood. Every cluster collapses onto its smallest index, so the
/// result depends only on vertex order. Faces that collapse are dropped.
///
/// Returns the number of vertices merged.
pub fn weld_vertices(mesh: &mut Mesh, epsilon: f64) -> usize {
    if mesh.vertices.is_empty() {
        return 0;
    }

    let cell_size = epsilon * 2.0;
    let mut spatial_hash: HashMap<(i64, i64, i64), Vec<u32>> =
        HashMap::with_capacity(mesh.vertices.len());
    for (idx, vertex) in mesh.vertices.iter().enumerate() {
        spatial_hash
            .entry(pos_to_cell(&vertex.position, cell_size))
            .or_default()
            .push(idx as u32);
    }

    let mut remap: Vec<u32> = (0..mesh.vertices.len() as u32).collect();
    let mut merged = 0;

    for (idx, vertex) in mesh.vertices.iter().enumerate() {
        let idx = idx as u32;
        if remap[idx as usize] != idx {
            continue;
        }
        let (cx, cy, cz) = pos_to_cell(&vertex.position, cell_size);

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(candidates) = spatial_hash.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &other in candidates {
                        if other <= idx || remap[other as usize] != other {
                            continue;
                        }
                        let dist = (vertex.position - mesh.vertices[other as usize].position).norm();
                        if dist < epsilon {
                            remap[other as usize] = idx;
                            merged += 1;
                        }
                    }
                }
            }
        }
    }

    if merged == 0 {
        return 0;
    }

    // Targets are always unmerged representatives, so one hop resolves chains
    for face in &mut mesh.faces {
        for index in face.iter_mut() {
            *index = remap[*index as usize];
        }
    }
    mesh.faces
        .retain(|&[i0, i1, i2]| i0 != i1 && i1 != i2 && i0 != i2);

    debug!(merged, epsilon, "Welded vertices");
    merged
}

/// Remove faces with the same vertex set as an earlier face, in either winding.
///
/// Returns the number of faces removed.
pub fn remove_duplicate_faces(mesh: &mut Mesh) -> usize {
    let original_count = mesh.faces.len();
    let mut seen: HashSet<[u32; 3]> = HashSet::with_capacity(original_count);

    mesh.faces.retain(|face| {
        let mut key = *face;
        key.sort_unstable();
        seen.insert(key)
    });

    let removed = original_count - mesh.faces.len();
    if removed > 0 {
        debug!(removed, "Removed duplicate faces");
    }
    removed
}

/// Drop vertices no face references and compact the vertex array.
///
/// Relative vertex order is preserved. Returns the number removed.
pub fn remove_unreferenced_vertices(mesh: &mut Mesh) -> usize {
    let original_count = mesh.vertices.len();

    let mut referenced = vec![false; original_count];
    for face in &mesh.faces {
        for &i in face {
            referenced[i as usize] = true;
        }
    }

    let mut remap = vec![u32::MAX; original_count];
    let mut new_vertices = Vec::with_capacity(original_count);
    for (old_idx, vertex) in mesh.vertices.drain(..).enumerate() {
        if referenced[old_idx] {
            remap[old_idx] = new_vertices.len() as u32;
            new_vertices.push(vertex);
        }
    }
    mesh.vertices = new_vertices;

    for face in &mut mesh.faces {
        for index in face.iter_mut() {
            *index = remap[*index as usize];
        }
    }

    let removed = original_count - mesh.vertices.len();
    if removed > 0 {
        debug!(removed, "Removed unreferenced vertices");
    }
    removed
}

fn pos_to_cell(pos: &Point3<f64>, cell_size: f64) -> (i64, i64, i64) {
    (
        (pos.x / cell_size).floor() as i64,
        (pos.y / cell_size).floor() as i64,
        (pos.z / cell_size).floor() as i64,
    )
}
