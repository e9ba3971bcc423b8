//! Indexed triangle surfaces.

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, MeshResult};

/// Surface point in the physical units of the voxel spacing that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: Point3<f64>,
}

impl Vertex {
    #[inline]
    pub fn new(position: Point3<f64>) -> Self {
        Self { position }
    }

    #[inline]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }
}

/// Triangles indexing into a shared vertex list.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,

    /// Outward faces wind counter-clockwise when viewed from outside.
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// No faces, or nothing for faces to reference.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Axis-aligned bounding box as (min, max), or `None` for a mesh without vertices.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;
        Some(
            self.vertices[1..]
                .iter()
                .fold((first, first), |(lo, hi), v| {
                    (lo.inf(&v.position), hi.sup(&v.position))
                }),
        )
    }

    /// Resolved triangles in face order.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces.iter().map(|&[i0, i1, i2]| {
            Triangle::new(
                self.vertices[i0 as usize].position,
                self.vertices[i1 as usize].position,
                self.vertices[i2 as usize].position,
            )
        })
    }


    /// Enclosed volume by the divergence theorem, positive for outward winding.
    ///
    /// Only a surface with no open edges encloses anything; for an open surface
    /// the sum depends on where the origin is.
    pub fn signed_volume(&self) -> f64 {
        let sixfold: f64 = self
            .triangles()
            .map(|t| t.v0.coords.dot(&t.v1.coords.cross(&t.v2.coords)))
            .sum();
        sixfold / 6.0
    }

    /// Enclosed volume ignoring winding.
    #[inline]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    pub fn surface_area(&self) -> f64 {
        self.triangles().fold(0.0, |total, tri| total + tri.area())
    }

    /// Fails on the first out-of-range face index, then on the first
    /// non-finite coordinate.
    pub fn check_integrity(&self) -> MeshResult<()> {
        let vertex_count = self.vertices.len();
        for (face_index, face) in self.faces.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::invalid_vertex_index(face_index, bad, vertex_count));
            }
        }

        for (vertex_index, v) in self.vertices.iter().enumerate() {
            let p = v.position;
            for (coordinate, value) in [("x", p.x), ("y", p.y), ("z", p.z)] {
                if !value.is_finite() {
                    return Err(MeshError::invalid_coordinate(vertex_index, coordinate, value));
                }
            }
        }

        Ok(())
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

/// Three resolved corner positions.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    #[inline]
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Cross product of the two edges leaving `v0`; its length is twice the area.
    #[inline]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }

    /// Area at or below `epsilon`.
    #[inline]
    pub fn is_degenerate(&self, epsilon: f64) -> bool {
        self.area() <= epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    /// Axis-aligned cube with outward CCW winding.
    fn make_cube(size: f64) -> Mesh {
        let mut mesh = Mesh::new();
        for &(x, y, z) in &[
            (0.0, 0.0, 0.0),
            (size, 0.0, 0.0),
            (size, size, 0.0),
            (0.0, size, 0.0),
            (0.0, 0.0, size),
            (size, 0.0, size),
            (size, size, size),
            (0.0, size, size),
        ] {
            mesh.vertices.push(Vertex::from_coords(x, y, z));
        }
        mesh.faces = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [3, 7, 6],
            [3, 6, 2],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ];
        mesh
    }

    #[test]
    fn test_vertex_from_coords() {
        let v = Vertex::from_coords(-0.5, 4.0, 2.25);
        assert_eq!(v.position, Point3::new(-0.5, 4.0, 2.25));
        assert_eq!(v, Vertex::new(v.position));
    }

    #[test]
    fn test_triangle_normal_and_area() {
        // Right triangle in the plane z = 1 with legs 2 and 3
        let tri = Triangle::new(
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(3.0, 1.0, 1.0),
            Point3::new(1.0, 4.0, 1.0),
        );

        assert_eq!(tri.normal_unnormalized(), Vector3::new(0.0, 0.0, 6.0));
        assert!(close(tri.area(), 3.0));
        assert!(!tri.is_degenerate(1e-12));
    }

    #[test]
    fn test_degenerate_triangle() {
        let tri = Triangle::new(
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 1.0),
            Point3::new(0.0, 2.0, 5.0),
        );
        assert_eq!(tri.area(), 0.0);
        assert!(tri.is_degenerate(1e-12));
    }

    #[test]
    fn test_cube_volume_and_area() {
        let cube = make_cube(2.0);
        assert!(close(cube.signed_volume(), 8.0), "got {}", cube.signed_volume());
        assert!(close(cube.surface_area(), 24.0));
    }

    #[test]
    fn test_inverted_cube_volume_is_absolute() {
        let mut cube = make_cube(1.0);
        for face in &mut cube.faces {
            face.swap(1, 2);
        }
        assert!(close(cube.signed_volume(), -1.0));
        assert!(close(cube.volume(), 1.0));
    }

    #[test]
    fn test_volume_is_translation_invariant() {
        let mut cube = make_cube(1.0);
        let offset = Vector3::new(10.0, -4.0, 7.5);
        for v in &mut cube.vertices {
            v.position += offset;
        }
        assert!((cube.volume() - 1.0).abs() < 1e-9);

        let (min, max) = cube.bounds().unwrap();
        assert_eq!(min, Point3::new(10.0, -4.0, 7.5));
        assert_eq!(max, Point3::new(11.0, -3.0, 8.5));
    }

    #[test]
    fn test_empty_mesh() {
        let empty = Mesh::default();
        assert!(empty.is_empty());
        assert_eq!(empty.bounds(), None);
        assert_eq!(empty.volume(), 0.0);
        assert!(empty.surface_area().is_sign_positive());
    }

    #[test]
    fn test_check_integrity() {
        let mut cube = make_cube(1.0);
        assert!(cube.check_integrity().is_ok());

        cube.faces.push([0, 1, 42]);
        let err = cube.check_integrity().unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::InvalidVertexIndex);

        cube.faces.pop();
        cube.vertices[3].position.y = f64::NAN;
        let err = cube.check_integrity().unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::InvalidCoordinate);
    }
}
