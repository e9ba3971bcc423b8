//! Multi-label 3D segmentation images.

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::{StatsError, StatsResult};

/// A voxel label value.
///
/// Implemented for every primitive integer type and `bool`. The type's zero
/// (`false` for `bool`) is background; every other value names one region.
pub trait Label: Copy + Ord + Hash + Debug + Send + Sync + 'static {
    /// True for the background value.
    fn is_background(self) -> bool;
}

macro_rules! impl_label_for_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl Label for $t {
                #[inline]
                fn is_background(self) -> bool {
                    self == 0
                }
            }
        )*
    };
}

impl_label_for_int!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

impl Label for bool {
    #[inline]
    fn is_background(self) -> bool {
        !self
    }
}

/// An immutable 3D label image stored x-fastest.
///
/// ```
/// use shape_stats::LabelImage;
///
/// let mut data = vec![0u16; 4 * 4 * 4];
/// data[5] = 2;
/// data[42] = 9;
/// let image = LabelImage::new([4, 4, 4], data).unwrap();
///
/// assert_eq!(image.unique_labels(), vec![2, 9]);
/// assert_eq!(image.get(1, 1, 0), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelImage<L> {
    dims: [usize; 3],
    data: Vec<L>,
}

impl<L: Label> LabelImage<L> {
    /// Wrap a label buffer. Index is `x + y * nx + z * nx * ny`.
    pub fn new(dims: [usize; 3], data: Vec<L>) -> StatsResult<Self> {
        let expected = dims
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| StatsError::invalid_image(format!("dims {:?} overflow", dims)))?;
        if data.len() != expected {
            return Err(StatsError::invalid_image(format!(
                "dims {:?} need {} labels, got {}",
                dims,
                expected,
                data.len()
            )));
        }
        Ok(Self { dims, data })
    }

    /// Build an image by evaluating `f(x, y, z)` at every voxel.
    pub fn from_fn(dims: [usize; 3], mut f: impl FnMut(usize, usize, usize) -> L) -> Self {
        let [nx, ny, nz] = dims;
        let mut data = Vec::with_capacity(nx * ny * nz);
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    data.push(f(x, y, z));
                }
            }
        }
        Self { dims, data }
    }

    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    #[inline]
    pub fn data(&self) -> &[L] {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if any dimension is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        let [nx, ny, nz] = self.dims;
        (x < nx && y < ny && z < nz).then(|| x + y * nx + z * nx * ny)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<L> {
        self.index(x, y, z).map(|i| self.data[i])
    }

    /// Distinct non-background labels in ascending order.
    pub fn unique_labels(&self) -> Vec<L> {
        let labels: BTreeSet<L> = self
            .data
            .iter()
            .copied()
            .filter(|l| !l.is_background())
            .collect();
        labels.into_iter().collect()
    }

    /// Number of voxels carrying `label`.
    pub fn voxel_count(&self, label: L) -> usize {
        self.data.iter().filter(|&&l| l == label).count()
    }

    /// True if no voxel carries a foreground label.
    pub fn is_all_background(&self) -> bool {
        self.data.iter().all(|l| l.is_background())
    }
}
