//! Per-label binary masks.
//!
//! Isosurface extraction only closes a surface where the region is enclosed
//! by outside samples. A region touching the image boundary would come out
//! open, so the mask handed to the mesh pipeline carries a one-voxel zero
//! border on every side.

use nalgebra::Point3;
use shape_mesh::{MeshResult, ScalarVolume};

use crate::image::{Label, LabelImage};

/// A 3D {0, 1} indicator array stored x-fastest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    dims: [usize; 3],
    data: Vec<u8>,
    /// Zero voxels added on each side of the source image.
    padding: usize,
}

/// Indicator of `label` with a one-voxel zero border.
///
/// The result has shape `image.dims() + 2` on every axis, and voxel
/// `(x, y, z)` of the image lands at `(x + 1, y + 1, z + 1)`.
///
/// ```
/// use shape_stats::{LabelImage, padded_mask};
///
/// let image = LabelImage::new([2, 1, 1], vec![3u8, 0]).unwrap();
/// let mask = padded_mask(&image, 3);
///
/// assert_eq!(mask.dims(), [4, 3, 3]);
/// assert_eq!(mask.get(1, 1, 1), Some(1));
/// assert_eq!(mask.get(2, 1, 1), Some(0));
/// assert!(mask.is_border_clear());
/// ```
pub fn padded_mask<L: Label>(image: &LabelImage<L>, label: L) -> BinaryMask {
    build_mask(image, label, 1)
}

/// Indicator of `label` with the image's own shape.
pub fn binary_mask<L: Label>(image: &LabelImage<L>, label: L) -> BinaryMask {
    build_mask(image, label, 0)
}

fn build_mask<L: Label>(image: &LabelImage<L>, label: L, padding: usize) -> BinaryMask {
    let [nx, ny, nz] = image.dims();
    let dims = [nx + 2 * padding, ny + 2 * padding, nz + 2 * padding];
    let mut data = vec![0u8; dims[0] * dims[1] * dims[2]];

    let src = image.data();
    for z in 0..nz {
        for y in 0..ny {
            let src_row = y * nx + z * nx * ny;
            let dst_row = padding + (y + padding) * dims[0] + (z + padding) * dims[0] * dims[1];
            for x in 0..nx {
                data[dst_row + x] = u8::from(src[src_row + x] == label);
            }
        }
    }

    BinaryMask {
        dims,
        data,
        padding,
    }
}

impl BinaryMask {
    /// Wrap raw {0, 1} data with no padding. Any non-zero byte counts as 1.
    pub fn from_raw(dims: [usize; 3], data: Vec<u8>) -> Option<Self> {
        (data.len() == dims[0] * dims[1] * dims[2]).then(|| Self {
            dims,
            data: data.into_iter().map(|v| u8::from(v != 0)).collect(),
            padding: 0,
        })
    }

    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Zero voxels on each side that were not part of the source image.
    #[inline]
    pub fn padding(&self) -> usize {
        self.padding
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        let [nx, ny, nz] = self.dims;
        (x < nx && y < ny && z < nz).then(|| x + y * nx + z * nx * ny)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<u8> {
        self.index(x, y, z).map(|i| self.data[i])
    }

    /// Number of set voxels.
    pub fn count_ones(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// True if every voxel on the outer faces of the array is zero.
    pub fn is_border_clear(&self) -> bool {
        let [nx, ny, nz] = self.dims;
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    let on_border = x == 0
                        || y == 0
                        || z == 0
                        || x + 1 == nx
                        || y + 1 == ny
                        || z + 1 == nz;
                    if on_border && self.data[x + y * nx + z * nx * ny] != 0 {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Wrap as a scalar volume for isosurface extraction.
    ///
    /// The origin is shifted back by the padding so that surface vertices
    /// land in the source image's coordinate frame, scaled by `spacing`.
    pub fn to_scalar_volume(&self, spacing: [f64; 3]) -> MeshResult<ScalarVolume> {
        let values = self.data.iter().map(|&v| f32::from(v)).collect();
        let pad = self.padding as f64;
        let origin = Point3::new(-pad * spacing[0], -pad * spacing[1], -pad * spacing[2]);

        Ok(ScalarVolume::new(self.dims, values)?
            .with_spacing(spacing)?
            .with_origin(origin))
    }
}
