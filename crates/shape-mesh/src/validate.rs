//! Closed-surface checks.
//!
//! A volume computed by the divergence theorem is only meaningful for a
//! surface with no open edges, so every extracted surface can be checked
//! here before it is measured.

use tracing::{debug, warn};

use crate::Mesh;
use crate::adjacency::MeshAdjacency;

/// Edge topology and measurements of a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshReport {
    pub vertex_count: usize,
    pub face_count: usize,
    /// Edges used by exactly one face.
    pub open_edges: usize,
    /// Edges shared by three or more faces.
    pub overshared_edges: usize,
    /// Positive when faces wind counter-clockwise seen from outside.
    pub signed_volume: f64,
    pub surface_area: f64,
}

impl MeshReport {
    #[inline]
    pub fn is_watertight(&self) -> bool {
        self.open_edges == 0
    }

    #[inline]
    pub fn is_manifold(&self) -> bool {
        self.overshared_edges == 0
    }

    #[inline]
    pub fn volume(&self) -> f64 {
        self.signed_volume.abs()
    }

    /// Watertight, non-empty, and enclosing a finite non-zero volume.
    pub fn is_closed_solid(&self) -> bool {
        self.face_count > 0 && self.is_watertight() && self.volume().is_finite() && self.volume() > 0.0
    }
}

impl std::fmt::Display for MeshReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} vertices, {} faces, area {:.4}, volume {:.4}",
            self.vertex_count,
            self.face_count,
            self.surface_area,
            self.volume()
        )?;
        if !self.is_watertight() {
            write!(f, ", {} open edges", self.open_edges)?;
        }
        if !self.is_manifold() {
            write!(f, ", {} edges shared by 3+ faces", self.overshared_edges)?;
        }
        Ok(())
    }
}

/// Check edge topology and measure a surface.
pub fn validate_mesh(mesh: &Mesh) -> MeshReport {
    let adjacency = MeshAdjacency::build(&mesh.faces);

    let report = MeshReport {
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
        open_edges: adjacency.boundary_edge_count(),
        overshared_edges: adjacency.non_manifold_edge_count(),
        signed_volume: mesh.signed_volume(),
        surface_area: mesh.surface_area(),
    };

    if report.is_watertight() {
        debug!(%report, "Surface checked");
    } else {
        warn!(open_edges = report.open_edges, "Surface is open; its volume is unreliable");
    }

    report
}
