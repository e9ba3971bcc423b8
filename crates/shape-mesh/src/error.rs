//! Errors raised while extracting, cleaning and measuring surfaces.
//!
//! Every [`MeshError`] maps to a stable [`ErrorCode`] of the form `MESH-NNNN`.
//! Codes in the 2000 range reject malformed input (indices, coordinates,
//! volumes, parameters). Codes in the 3000 range report geometry that could
//! not be built.
//!
//! ```
//! use shape_mesh::{ErrorCode, MeshError};
//!
//! let err = MeshError::degenerate_geometry("all points coplanar");
//! assert_eq!(err.code(), ErrorCode::DegenerateGeometry);
//! assert_eq!(err.code().as_str(), "MESH-3002");
//! ```

use miette::Diagnostic;
use thiserror::Error;

pub type MeshResult<T> = Result<T, MeshError>;

/// Stable identifier for each kind of [`MeshError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// MESH-2001
    InvalidVertexIndex = 2001,
    /// MESH-2002
    InvalidCoordinate = 2002,
    /// MESH-2003
    EmptyMesh = 2003,
    /// MESH-2004
    InvalidVolume = 2004,
    /// MESH-2005
    InvalidParams = 2005,
    /// MESH-3001
    EmptyIsosurface = 3001,
    /// MESH-3002
    DegenerateGeometry = 3002,
    /// MESH-3003
    HullFailed = 3003,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidVertexIndex => "MESH-2001",
            Self::InvalidCoordinate => "MESH-2002",
            Self::EmptyMesh => "MESH-2003",
            Self::InvalidVolume => "MESH-2004",
            Self::InvalidParams => "MESH-2005",
            Self::EmptyIsosurface => "MESH-3001",
            Self::DegenerateGeometry => "MESH-3002",
            Self::HullFailed => "MESH-3003",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a caller can change to get past a [`MeshError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// The labelled region, or the volume built from it, is unusable.
    CheckRegion { reason: &'static str },
    /// A parameter value is out of range.
    ChangeParameter { name: String, expected: &'static str },
    /// The mesh was assembled inconsistently; rebuild it from the volume.
    RebuildMesh,
    /// The region is too thin to enclose a volume.
    EnlargeRegion { min_extent: usize },
    None,
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CheckRegion { reason } => write!(f, "Inspect the region: {reason}"),
            Self::ChangeParameter { name, expected } => {
                write!(f, "Set `{name}` to {expected}")
            }
            Self::RebuildMesh => f.write_str("Rebuild the surface from its scalar volume"),
            Self::EnlargeRegion { min_extent } => write!(
                f,
                "The region must span at least {min_extent} voxels along every axis"
            ),
            Self::None => f.write_str("Nothing to suggest"),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum MeshError {
    #[error("no geometry to work with: {details}")]
    #[diagnostic(code(mesh::input::empty))]
    EmptyMesh { details: String },

    #[error("face {face_index} points at vertex {vertex_index} of {vertex_count}")]
    #[diagnostic(
        code(mesh::input::face_index),
        help("Face indices must be smaller than the vertex count.")
    )]
    InvalidVertexIndex {
        face_index: usize,
        vertex_index: u32,
        vertex_count: usize,
    },

    #[error("vertex {vertex_index} has non-finite {coordinate} = {value}")]
    #[diagnostic(
        code(mesh::input::coordinate),
        help("Check the voxel spacing and the iso level.")
    )]
    InvalidCoordinate {
        vertex_index: usize,
        coordinate: &'static str,
        value: f64,
    },

    #[error("scalar volume is malformed: {details}")]
    #[diagnostic(
        code(mesh::input::volume),
        help("Samples are stored x-fastest and there must be nx * ny * nz of them.")
    )]
    InvalidVolume { details: String },

    #[error("`{name}` is out of range: {details}")]
    #[diagnostic(code(mesh::input::params))]
    InvalidParams { name: &'static str, details: String },

    #[error("no surface crosses level {level}")]
    #[diagnostic(
        code(mesh::geometry::no_crossing),
        help("Every sample lies on the same side of the iso level.")
    )]
    EmptyIsosurface { level: f64 },

    #[error("geometry is degenerate: {details}")]
    #[diagnostic(
        code(mesh::geometry::degenerate),
        help("A convex hull needs four points that do not share a plane.")
    )]
    DegenerateGeometry { details: String },

    #[error("hull construction failed: {details}")]
    #[diagnostic(code(mesh::geometry::hull))]
    HullFailed { details: String },
}

impl MeshError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyMesh { .. } => ErrorCode::EmptyMesh,
            Self::InvalidVertexIndex { .. } => ErrorCode::InvalidVertexIndex,
            Self::InvalidCoordinate { .. } => ErrorCode::InvalidCoordinate,
            Self::InvalidVolume { .. } => ErrorCode::InvalidVolume,
            Self::InvalidParams { .. } => ErrorCode::InvalidParams,
            Self::EmptyIsosurface { .. } => ErrorCode::EmptyIsosurface,
            Self::DegenerateGeometry { .. } => ErrorCode::DegenerateGeometry,
            Self::HullFailed { .. } => ErrorCode::HullFailed,
        }
    }

    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            Self::EmptyMesh { .. } => RecoverySuggestion::CheckRegion {
                reason: "it contains no voxels",
            },
            Self::EmptyIsosurface { .. } => RecoverySuggestion::CheckRegion {
                reason: "no sample reaches the iso level",
            },
            Self::InvalidVolume { .. } => RecoverySuggestion::CheckRegion {
                reason: "its dimensions disagree with its sample count",
            },
            Self::InvalidVertexIndex { .. } => RecoverySuggestion::RebuildMesh,
            Self::InvalidCoordinate { .. } => RecoverySuggestion::ChangeParameter {
                name: "voxel_spacing".to_owned(),
                expected: "finite positive values",
            },
            Self::InvalidParams { name, .. } => RecoverySuggestion::ChangeParameter {
                name: (*name).to_owned(),
                expected: "a value inside its documented range",
            },
            Self::DegenerateGeometry { .. } => RecoverySuggestion::EnlargeRegion { min_extent: 2 },
            Self::HullFailed { .. } => RecoverySuggestion::None,
        }
    }

    pub fn empty_mesh(details: impl Into<String>) -> Self {
        Self::EmptyMesh {
            details: details.into(),
        }
    }

    pub fn invalid_vertex_index(face_index: usize, vertex_index: u32, vertex_count: usize) -> Self {
        Self::InvalidVertexIndex {
            face_index,
            vertex_index,
            vertex_count,
        }
    }

    pub fn invalid_coordinate(vertex_index: usize, coordinate: &'static str, value: f64) -> Self {
        Self::InvalidCoordinate {
            vertex_index,
            coordinate,
            value,
        }
    }

    pub fn invalid_volume(details: impl Into<String>) -> Self {
        Self::InvalidVolume {
            details: details.into(),
        }
    }

    pub fn invalid_params(name: &'static str, details: impl Into<String>) -> Self {
        Self::InvalidParams {
            name,
            details: details.into(),
        }
    }

    pub fn degenerate_geometry(details: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            details: details.into(),
        }
    }

    pub fn hull_failed(details: impl Into<String>) -> Self {
        Self::HullFailed {
            details: details.into(),
        }
    }
}
