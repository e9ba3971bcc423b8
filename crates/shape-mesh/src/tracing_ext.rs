//! Timing and mesh-state events.
//!
//! Nothing here installs a subscriber. Events go to two targets:
//!
//! - `shape_mesh::timing` for how long a pass took
//! - `shape_mesh::mesh_state` for counts and extent after a stage
//!
//! `RUST_LOG=shape_mesh::timing=info` shows only the timings.

use nalgebra::Vector3;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Emits an info event with the elapsed time when dropped.
///
/// ```
/// use shape_mesh::OperationTimer;
///
/// let timer = OperationTimer::with_items("relabel", 12);
/// assert!(timer.elapsed().as_secs() < 60);
/// drop(timer);
/// ```
#[must_use = "the timer reports when it is dropped"]
pub struct OperationTimer {
    name: &'static str,
    items: Option<usize>,
    started: Instant,
}

impl OperationTimer {
    pub fn new(name: &'static str) -> Self {
        debug!(target: "shape_mesh::timing", operation = name, "Started");
        Self {
            name,
            items: None,
            started: Instant::now(),
        }
    }

    /// Timer for a pass over `items` units of work.
    pub fn with_items(name: &'static str, items: usize) -> Self {
        debug!(target: "shape_mesh::timing", operation = name, items, "Started");
        Self {
            name,
            items: Some(items),
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed().as_secs_f64() * 1e3;
        match self.items {
            Some(items) => info!(
                target: "shape_mesh::timing",
                operation = self.name,
                items,
                elapsed_ms = format!("{elapsed_ms:.2}"),
                "Finished"
            ),
            None => info!(
                target: "shape_mesh::timing",
                operation = self.name,
                elapsed_ms = format!("{elapsed_ms:.2}"),
                "Finished"
            ),
        }
    }
}

/// Debug event with the counts and bounding-box extent of `mesh` after `stage`.
pub fn log_mesh_stats(mesh: &crate::Mesh, stage: &str) {
    let extent = mesh
        .bounds()
        .map(|(lo, hi)| hi - lo)
        .unwrap_or_else(Vector3::zeros);

    debug!(
        target: "shape_mesh::mesh_state",
        stage,
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        extent = format!("{:.2} x {:.2} x {:.2}", extent.x, extent.y, extent.z),
        "Mesh state"
    );
}
