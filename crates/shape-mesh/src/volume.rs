//! Regular 3D scalar grid, the input to isosurface extraction.

use nalgebra::Point3;

use crate::error::{MeshError, MeshResult};

/// Scalar samples on a regular grid.
///
/// Values are stored x-fastest: index = `x + y * nx + z * nx * ny`. Sample
/// `(x, y, z)` sits at `origin + (x * sx, y * sy, z * sz)` in world space.
#[derive(Debug, Clone)]
pub struct ScalarVolume {
    dims: [usize; 3],
    values: Vec<f32>,
    spacing: [f64; 3],
    origin: Point3<f64>,
}

impl ScalarVolume {
    /// Wrap a value buffer. Fails if its length does not match `dims`.
    pub fn new(dims: [usize; 3], values: Vec<f32>) -> MeshResult<Self> {
        let expected = dims[0] * dims[1] * dims[2];
        if values.len() != expected {
            return Err(MeshError::invalid_volume(format!(
                "dims {:?} need {} values, got {}",
                dims,
                expected,
                values.len()
            )));
        }
        Ok(Self {
            dims,
            values,
            spacing: [1.0; 3],
            origin: Point3::origin(),
        })
    }

    /// A volume with every sample set to `value`.
    #[must_use]
    pub fn filled(dims: [usize; 3], value: f32) -> Self {
        Self {
            dims,
            values: vec![value; dims[0] * dims[1] * dims[2]],
            spacing: [1.0; 3],
            origin: Point3::origin(),
        }
    }

    /// Set the sample spacing along each axis.
    pub fn with_spacing(mut self, spacing: [f64; 3]) -> MeshResult<Self> {
        if let Some(bad) = spacing.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(MeshError::invalid_params(
                "spacing",
                format!("must be finite and positive, got {}", bad),
            ));
        }
        self.spacing = spacing;
        Ok(self)
    }

    /// Set the world position of sample (0, 0, 0).
    #[must_use]
    pub fn with_origin(mut self, origin: Point3<f64>) -> Self {
        self.origin = origin;
        self
    }

    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    #[inline]
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    #[inline]
    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Linear index of a sample, or `None` outside the grid.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        let [nx, ny, nz] = self.dims;
        (x < nx && y < ny && z < nz).then(|| x + y * nx + z * nx * ny)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<f32> {
        self.index(x, y, z).map(|i| self.values[i])
    }

    /// Set a sample. Returns `false` if the coordinates are outside the grid.
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: f32) -> bool {
        match self.index(x, y, z) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => false,
        }
    }

    /// World position of a (possibly fractional) lattice coordinate.
    #[inline]
    pub fn world_position(&self, lattice: [f64; 3]) -> Point3<f64> {
        Point3::new(
            self.origin.x + lattice[0] * self.spacing[0],
            self.origin.y + lattice[1] * self.spacing[1],
            self.origin.z + lattice[2] * self.spacing[2],
        )
    }
}
