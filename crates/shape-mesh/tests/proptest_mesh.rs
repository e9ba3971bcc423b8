//! Property-based tests for mesh operations.
//!
//! Run with: cargo test -p shape-mesh -- proptest

use proptest::prelude::*;
use shape_mesh::{
    CleanParams, Mesh, ScalarVolume, SmoothParams, Vertex, clean_mesh, convex_hull,
    extract_isosurface, remove_duplicate_faces, smooth_mesh, validate_mesh, weld_vertices,
};

// =============================================================================
// Strategies
// =============================================================================

/// Random vertex position in a bounded range.
fn arb_vertex() -> impl Strategy<Value = Vertex> {
    prop::array::uniform3(-50.0..50.0f64).prop_map(|[x, y, z]| Vertex::from_coords(x, y, z))
}

/// Mesh with valid (but otherwise arbitrary) face indices.
fn arb_mesh(max_vertices: usize, max_faces: usize) -> impl Strategy<Value = Mesh> {
    prop::collection::vec(arb_vertex(), 3..=max_vertices).prop_flat_map(move |verts| {
        let n = verts.len() as u32;
        prop::collection::vec(prop::array::uniform3(0..n), 1..=max_faces).prop_map(
            move |faces| Mesh {
                vertices: verts.clone(),
                faces,
            },
        )
    })
}

/// Axis-aligned block of ones inside a one-sample zero border.
fn arb_block_volume() -> impl Strategy<Value = ScalarVolume> {
    (2usize..6, 2usize..6, 2usize..6).prop_map(|(sx, sy, sz)| {
        let dims = [sx + 2, sy + 2, sz + 2];
        let mut volume = ScalarVolume::filled(dims, 0.0);
        for z in 1..=sz {
            for y in 1..=sy {
                for x in 1..=sx {
                    volume.set(x, y, z, 1.0);
                }
            }
        }
        volume
    })
}

// =============================================================================
// Cleanup invariants
// =============================================================================

proptest! {
    #[test]
    fn proptest_weld_merges_copies(mesh in arb_mesh(30, 40)) {
        // Append an exact copy of every vertex and a copy of every face using it
        let mut mesh = mesh;
        let n = mesh.vertices.len() as u32;
        let copies = mesh.vertices.clone();
        mesh.vertices.extend(copies);
        let shifted: Vec<[u32; 3]> = mesh.faces.iter().map(|f| [f[0] + n, f[1] + n, f[2] + n]).collect();
        mesh.faces.extend(shifted);

        prop_assert!(weld_vertices(&mut mesh, 1e-6) >= n as usize);
        for face in &mesh.faces {
            prop_assert!(face.iter().all(|&i| i < n));
        }

        let faces = mesh.faces.clone();
        weld_vertices(&mut mesh, 1e-6);
        prop_assert_eq!(mesh.faces, faces);
    }

    #[test]
    fn proptest_no_duplicates_after_removal(mesh in arb_mesh(10, 60)) {
        let mut mesh = mesh;
        remove_duplicate_faces(&mut mesh);
        prop_assert_eq!(remove_duplicate_faces(&mut mesh), 0);
    }

    #[test]
    fn proptest_clean_leaves_valid_indices(mesh in arb_mesh(30, 40)) {
        let mut mesh = mesh;
        if clean_mesh(&mut mesh, &CleanParams::default()).is_ok() {
            prop_assert!(mesh.check_integrity().is_ok());
            for face in &mesh.faces {
                prop_assert!(face[0] != face[1] && face[1] != face[2] && face[0] != face[2]);
            }
        } else {
            prop_assert!(mesh.faces.is_empty());
        }
    }
}

// =============================================================================
// Extraction pipeline invariants
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn proptest_block_surface_is_closed(volume in arb_block_volume()) {
        let mut mesh = extract_isosurface(&volume, 0.5).unwrap();
        clean_mesh(&mut mesh, &CleanParams::default()).unwrap();

        let report = validate_mesh(&mesh);
        prop_assert!(report.is_closed_solid(), "{}", report);
    }

    #[test]
    fn proptest_smoothing_keeps_topology(volume in arb_block_volume(), iterations in 0usize..20) {
        let mut mesh = extract_isosurface(&volume, 0.5).unwrap();
        clean_mesh(&mut mesh, &CleanParams::default()).unwrap();
        let faces = mesh.faces.clone();

        smooth_mesh(&mut mesh, &SmoothParams { iterations, ..SmoothParams::default() }).unwrap();

        prop_assert_eq!(&mesh.faces, &faces);
        prop_assert!(validate_mesh(&mesh).is_watertight());
    }

    #[test]
    fn proptest_hull_contains_mesh(volume in arb_block_volume()) {
        let mut mesh = extract_isosurface(&volume, 0.5).unwrap();
        clean_mesh(&mut mesh, &CleanParams::default()).unwrap();
        smooth_mesh(&mut mesh, &SmoothParams::default()).unwrap();

        let hull = convex_hull(&mesh).unwrap();
        prop_assert!(hull.volume() > 0.0);
        prop_assert!(mesh.volume() <= hull.volume() * (1.0 + 1e-5));
    }
}
