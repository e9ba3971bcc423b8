//! Triangle mesh engine for volumetric shape analysis.
//!
//! This crate turns scalar voxel volumes into closed triangle surfaces and
//! provides the geometric measurements shape descriptors are built from.
//!
//! # Features
//!
//! - **Extraction**: Surface Nets isosurfaces of a [`ScalarVolume`] at any level
//! - **Cleanup**: vertex welding, degenerate and duplicate face removal, compaction
//! - **Smoothing**: Laplacian and Taubin umbrella-operator smoothing
//! - **Hulls**: convex hull of a mesh's point set as a closed mesh
//! - **Measurement**: surface area, enclosed volume, watertightness report
//!
//! # Units and Coordinates
//!
//! The library is unit-agnostic. Vertices are placed at
//! `origin + lattice * spacing`, so areas and volumes come out in the units
//! of the volume's spacing.
//!
//! Face winding is counter-clockwise when viewed from outside. Volumes are
//! reported as absolute values, so a mesh wound the other way still measures
//! correctly.
//!
//! # Quick Start
//!
//! ```
//! use shape_mesh::{CleanParams, ScalarVolume, SmoothParams, clean_mesh, convex_hull,
//!     extract_isosurface, smooth_mesh};
//!
//! // A 3x3x3 block of ones inside a zero border
//! let mut volume = ScalarVolume::filled([5, 5, 5], 0.0);
//! for z in 1..4 {
//!     for y in 1..4 {
//!         for x in 1..4 {
//!             volume.set(x, y, z, 1.0);
//!         }
//!     }
//! }
//!
//! let mut mesh = extract_isosurface(&volume, 0.5).unwrap();
//! clean_mesh(&mut mesh, &CleanParams::default()).unwrap();
//! smooth_mesh(&mut mesh, &SmoothParams::default()).unwrap();
//!
//! let hull = convex_hull(&mesh).unwrap();
//! assert!(mesh.volume() <= hull.volume() * (1.0 + 1e-5));
//! println!("area = {:.3}, volume = {:.3}", mesh.surface_area(), mesh.volume());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod types;

pub mod adjacency;
pub mod clean;
pub mod hull;
pub mod isosurface;
pub mod smooth;
pub mod tracing_ext;
pub mod validate;
pub mod volume;

pub use error::{ErrorCode, MeshError, MeshResult, RecoverySuggestion};
pub use types::{Mesh, Triangle, Vertex};

pub use adjacency::MeshAdjacency;
pub use clean::{
    CleanParams, CleanReport, clean_mesh, remove_degenerate_triangles,
    remove_duplicate_faces, remove_unreferenced_vertices, weld_vertices,
};
pub use hull::convex_hull;
pub use isosurface::extract_isosurface;
pub use smooth::{SmoothMethod, SmoothParams, build_vertex_adjacency, smooth_mesh};
pub use validate::{MeshReport, validate_mesh};
pub use volume::ScalarVolume;

pub use tracing_ext::{OperationTimer, log_mesh_stats};

impl Mesh {
    /// Check edge topology and measure this surface.
    pub fn validate(&self) -> MeshReport {
        validate::validate_mesh(self)
    }
}
