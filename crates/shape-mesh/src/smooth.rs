//! Iterative umbrella-operator smoothing.
//!
//! Surfaces extracted from binary voxel masks carry a staircase pattern at
//! the voxel scale. Left in place it inflates the surface area and pulls
//! sphericity down. Both methods here move each vertex toward the centroid
//! of its one-ring; Taubin follows every shrinking step with an inflating
//! one so the enclosed volume stays close to the original.

use nalgebra::Vector3;
use tracing::debug;

use crate::Mesh;
use crate::error::{MeshError, MeshResult};

/// Smoothing filter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SmoothMethod {
    /// Plain Laplacian: `p += strength * (centroid - p)`. Shrinks the surface.
    Laplacian { strength: f64 },

    /// Taubin lambda/mu low-pass filter. Requires `0 < lambda < -mu`.
    Taubin { lambda: f64, mu: f64 },
}

impl Default for SmoothMethod {
    fn default() -> Self {
        SmoothMethod::Taubin {
            lambda: 0.5,
            mu: -0.53,
        }
    }
}

impl SmoothMethod {
    /// Laplacian smoothing at the given strength.
    pub fn laplacian(strength: f64) -> Self {
        SmoothMethod::Laplacian { strength }
    }

    fn validate(&self) -> MeshResult<()> {
        match *self {
            SmoothMethod::Laplacian { strength } => {
                if !(strength > 0.0 && strength <= 1.0) {
                    return Err(MeshError::invalid_params(
                        "strength",
                        format!("must be in (0, 1], got {}", strength),
                    ));
                }
            }
            SmoothMethod::Taubin { lambda, mu } => {
                if !(lambda > 0.0 && lambda <= 1.0) {
                    return Err(MeshError::invalid_params(
                        "lambda",
                        format!("must be in (0, 1], got {}", lambda),
                    ));
                }
                if !(mu < -lambda) {
                    return Err(MeshError::invalid_params(
                        "mu",
                        format!("must be below -lambda ({}), got {}", -lambda, mu),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Smoothing configuration.
///
/// ```
/// use shape_mesh::{SmoothMethod, SmoothParams};
///
/// let params = SmoothParams::default();
/// assert_eq!(params.iterations, 15);
/// assert_eq!(params.method, SmoothMethod::default());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmoothParams {
    /// Number of iterations. Zero leaves the mesh untouched.
    pub iterations: usize,
    pub method: SmoothMethod,
}

impl Default for SmoothParams {
    fn default() -> Self {
        Self {
            iterations: 15,
            method: SmoothMethod::default(),
        }
    }
}

impl SmoothParams {
    pub fn new(iterations: usize, method: SmoothMethod) -> Self {
        Self { iterations, method }
    }
}

/// Smooth a mesh in place. Topology is unchanged.
pub fn smooth_mesh(mesh: &mut Mesh, params: &SmoothParams) -> MeshResult<()> {
    params.method.validate()?;
    if params.iterations == 0 || mesh.is_empty() {
        return Ok(());
    }

    let adjacency = build_vertex_adjacency(mesh);
    let mut positions: Vec<Vector3<f64>> =
        mesh.vertices.iter().map(|v| v.position.coords).collect();
    let mut scratch = positions.clone();

    for _ in 0..params.iterations {
        match params.method {
            SmoothMethod::Laplacian { strength } => {
                laplacian_step(&adjacency, &positions, &mut scratch, strength);
                std::mem::swap(&mut positions, &mut scratch);
            }
            SmoothMethod::Taubin { lambda, mu } => {
                laplacian_step(&adjacency, &positions, &mut scratch, lambda);
                laplacian_step(&adjacency, &scratch, &mut positions, mu);
            }
        }
    }

    for (vertex, p) in mesh.vertices.iter_mut().zip(positions) {
        vertex.position.coords = p;
    }

    debug!(
        iterations = params.iterations,
        method = ?params.method,
        vertices = mesh.vertex_count(),
        "Mesh smoothed"
    );
    Ok(())
}

/// One-ring neighbours per vertex, sorted and deduplicated.
pub fn build_vertex_adjacency(mesh: &Mesh) -> Vec<Vec<u32>> {
    let mut adjacency: Vec<Vec<u32>> = vec![Vec::new(); mesh.vertices.len()];

    for face in &mesh.faces {
        for i in 0..3 {
            let v0 = face[i];
            let v1 = face[(i + 1) % 3];
            adjacency[v0 as usize].push(v1);
            adjacency[v1 as usize].push(v0);
        }
    }

    for neighbors in &mut adjacency {
        neighbors.sort_unstable();
        neighbors.dedup();
    }

    adjacency
}

/// `out[i] = src[i] + factor * (centroid(neighbours) - src[i])`
fn laplacian_step(
    adjacency: &[Vec<u32>],
    src: &[Vector3<f64>],
    out: &mut [Vector3<f64>],
    factor: f64,
) {
    for (i, neighbors) in adjacency.iter().enumerate() {
        let p = src[i];
        if neighbors.is_empty() {
            out[i] = p;
            continue;
        }
        let centroid = neighbors
            .iter()
            .map(|&n| src[n as usize])
            .sum::<Vector3<f64>>()
            / neighbors.len() as f64;
        out[i] = p + (centroid - p) * factor;
    }
}
