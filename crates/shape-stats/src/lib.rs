//! Shape statistics for labeled 3D segmentation images.
//!
//! Every non-background label of a [`LabelImage`] is turned into a closed,
//! smoothed triangle surface, wrapped in its convex hull, and summarised by
//! dimensionless descriptors:
//!
//! - **Solidity**: surface volume over convex hull volume
//! - **Wadell sphericity**: `π^(1/3) (6V)^(2/3) / A`
//! - **Legland sphericity**: `36π V² / A³`
//! - **P2A** (optional): a voxel-based sphericity index, reported as
//!   `sphericity_diplib`
//!
//! Results come back as a [`MeasurementTable`] with one row per label in
//! ascending label order.
//!
//! # Pipeline
//!
//! 1. [`padded_mask`]: label indicator with a one-voxel zero border
//! 2. [`build_surface`]: Surface Nets isosurface at 0.5, cleanup, smoothing
//! 3. [`hull_and_metrics`]: convex hull plus surface and hull area and volume
//! 4. [`measure`]: descriptors per label, assembled into the table
//!
//! The two external engines sit behind [`SurfaceEngine`] and
//! [`VoxelMeasurer`], so either can be swapped or mocked.
//!
//! # Quick Start
//!
//! ```
//! use shape_stats::{LabelImage, MeasureBuilder};
//!
//! // Two boxes: label 3 is 4x4x4, label 8 is a 12x2x2 rod
//! let image = LabelImage::from_fn([20, 6, 6], |x, y, z| match (x, y, z) {
//!     (1..=4, 1..=4, 1..=4) => 3u16,
//!     (6..=17, 2..=3, 2..=3) => 8,
//!     _ => 0,
//! });
//!
//! let table = MeasureBuilder::new(&image).build().unwrap();
//! assert_eq!(table.labels(), vec![3, 8]);
//!
//! // The elongated box is less spherical
//! let cube = table.get(3).unwrap();
//! let rod = table.get(8).unwrap();
//! assert!(cube.sphericity_wadell > rod.sphericity_wadell);
//!
//! let mut csv = Vec::new();
//! table.write_csv(&mut csv).unwrap();
//! ```
//!
//! # Logging
//!
//! All diagnostics go through `tracing`. Nothing is printed unless the host
//! installs a subscriber; with the `subscriber` feature, [`init_tracing`]
//! installs one filtered by `RUST_LOG`.
//!
//! # Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for parameters, rows and tables
//! - `subscriber`: [`init_tracing`]

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;

pub mod builder;
pub mod engine;
pub mod formulas;
pub mod image;
pub mod mask;
pub mod measure;
pub mod params;
pub mod pipeline;
pub mod table;
pub mod voxel;

#[cfg(feature = "subscriber")]
mod init;

pub use error::{StatsError, StatsErrorCode, StatsRecoverySuggestion, StatsResult};

pub use builder::MeasureBuilder;
pub use engine::{ComponentFeatures, SurfaceEngine, SurfaceNetsEngine, VoxelFeature, VoxelMeasurer};
pub use formulas::{perimeter_to_area, solidity, sphericity_legland, sphericity_wadell};
pub use image::{Label, LabelImage};
pub use mask::{BinaryMask, binary_mask, padded_mask};
pub use measure::{measure, measure_with, measure_with_params};
pub use params::MeasureParams;
pub use pipeline::{
    DEFAULT_SMOOTH_ITERATIONS, SurfaceMetrics, build_surface, build_surface_with,
    hull_and_metrics, hull_and_metrics_with, surface_meshes,
};
pub use table::{MeasurementRow, MeasurementTable};
pub use voxel::{Connectivity, VoxelFeatureMeasurer};

#[cfg(feature = "subscriber")]
pub use init::init_tracing;

// Mesh engine types that appear in this crate's API
pub use shape_mesh::{CleanParams, Mesh, MeshError, SmoothMethod, SmoothParams};
