// thiserror Display fields read as "never assigned" to newer compilers
#![allow(unused_assignments)]

//! Error types for shape statistics with rich diagnostics.
//!
//! Codes follow the pattern `STATS-XXXX`:
//! - `STATS-1xxx`: Input validation errors
//! - `STATS-2xxx`: Computation errors
//! - `STATS-3xxx`: Geometry errors from the mesh engine

use miette::Diagnostic;
use shape_mesh::MeshError;
use thiserror::Error;

/// Result type alias for shape statistics.
pub type StatsResult<T> = Result<T, StatsError>;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsErrorCode {
    /// STATS-1001: Label image is malformed
    InvalidImage = 1001,
    /// STATS-1002: Invalid parameters
    InvalidParams = 1002,

    /// STATS-2001: Division by zero or non-finite denominator in a descriptor
    Arithmetic = 2001,
    /// STATS-2002: Voxel feature measurement failed
    VoxelMeasurement = 2002,

    /// STATS-3001: Mesh construction or hull failed
    Geometry = 3001,
}

impl StatsErrorCode {
    /// Returns the error code as a string in the format `STATS-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatsErrorCode::InvalidImage => "STATS-1001",
            StatsErrorCode::InvalidParams => "STATS-1002",
            StatsErrorCode::Arithmetic => "STATS-2001",
            StatsErrorCode::VoxelMeasurement => "STATS-2002",
            StatsErrorCode::Geometry => "STATS-3001",
        }
    }
}

impl std::fmt::Display for StatsErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for statistics errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsRecoverySuggestion {
    /// The segmentation has a region that cannot be measured as a solid.
    CheckSegmentation { label: Option<String> },
    /// Change a parameter.
    AdjustParameter { name: String, hint: String },
    /// Measure without the voxel-based sphericity column.
    DisableSecondarySphericity,
    /// No specific suggestion.
    None,
}

impl std::fmt::Display for StatsRecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsRecoverySuggestion::CheckSegmentation { label: Some(label) } => write!(
                f,
                "Label {} is too small or too flat to form a closed surface; remove or merge it",
                label
            ),
            StatsRecoverySuggestion::CheckSegmentation { label: None } => {
                write!(f, "Check the segmentation for tiny or flat regions")
            }
            StatsRecoverySuggestion::AdjustParameter { name, hint } => {
                write!(f, "Adjust {}: {}", name, hint)
            }
            StatsRecoverySuggestion::DisableSecondarySphericity => {
                write!(f, "Measure without use_secondary_sphericity")
            }
            StatsRecoverySuggestion::None => write!(f, "No specific suggestion available"),
        }
    }
}

/// Errors that can occur while measuring shape statistics.
#[derive(Debug, Error, Diagnostic)]
pub enum StatsError {
    /// Label image dimensions do not match its data.
    #[error("invalid label image: {details}")]
    #[diagnostic(
        code(stats::input::image),
        help("The data buffer must hold exactly nx * ny * nz labels, stored x-fastest.")
    )]
    InvalidImage { details: String },

    /// Invalid parameters.
    #[error("invalid parameter {name}: {details}")]
    #[diagnostic(code(stats::params::invalid))]
    InvalidParams { name: &'static str, details: String },

    /// A descriptor denominator was zero or not finite.
    #[error("cannot compute {quantity}: denominator {denominator} is not a positive finite value")]
    #[diagnostic(
        code(stats::compute::arithmetic),
        help("A zero surface area or hull volume means the region has no measurable solid.")
    )]
    Arithmetic {
        quantity: &'static str,
        denominator: f64,
    },

    /// Voxel feature measurement failed.
    #[error("voxel measurement failed: {details}")]
    #[diagnostic(code(stats::compute::voxel))]
    VoxelMeasurement { details: String },

    /// Mesh engine failure.
    #[error("geometry error: {0}")]
    #[diagnostic(code(stats::geometry))]
    Geometry(#[from] MeshError),

    /// Failure while measuring one label.
    #[error("label {label}: {source}")]
    #[diagnostic(code(stats::label))]
    Label {
        label: String,
        #[source]
        source: Box<StatsError>,
    },
}

impl StatsError {
    /// Returns the machine-readable error code. Label context is looked through.
    pub fn code(&self) -> StatsErrorCode {
        match self {
            StatsError::InvalidImage { .. } => StatsErrorCode::InvalidImage,
            StatsError::InvalidParams { .. } => StatsErrorCode::InvalidParams,
            StatsError::Arithmetic { .. } => StatsErrorCode::Arithmetic,
            StatsError::VoxelMeasurement { .. } => StatsErrorCode::VoxelMeasurement,
            StatsError::Geometry(_) => StatsErrorCode::Geometry,
            StatsError::Label { source, .. } => source.code(),
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> StatsRecoverySuggestion {
        match self {
            StatsError::InvalidImage { .. } => StatsRecoverySuggestion::None,
            StatsError::InvalidParams { name, details } => {
                StatsRecoverySuggestion::AdjustParameter {
                    name: (*name).into(),
                    hint: details.clone(),
                }
            }
            StatsError::Arithmetic { .. } | StatsError::Geometry(_) => {
                StatsRecoverySuggestion::CheckSegmentation { label: None }
            }
            StatsError::VoxelMeasurement { .. } => {
                StatsRecoverySuggestion::DisableSecondarySphericity
            }
            StatsError::Label { label, source } => match source.recovery_suggestion() {
                StatsRecoverySuggestion::CheckSegmentation { .. } => {
                    StatsRecoverySuggestion::CheckSegmentation {
                        label: Some(label.clone()),
                    }
                }
                other => other,
            },
        }
    }

    /// The label being measured when the error occurred, if known.
    pub fn label(&self) -> Option<&str> {
        match self {
            StatsError::Label { label, .. } => Some(label),
            _ => None,
        }
    }

    // Constructor helpers

    pub fn invalid_image(details: impl Into<String>) -> Self {
        StatsError::InvalidImage {
            details: details.into(),
        }
    }

    pub fn invalid_params(name: &'static str, details: impl Into<String>) -> Self {
        StatsError::InvalidParams {
            name,
            details: details.into(),
        }
    }

    pub fn arithmetic(quantity: &'static str, denominator: f64) -> Self {
        StatsError::Arithmetic {
            quantity,
            denominator,
        }
    }

    pub fn voxel_measurement(details: impl Into<String>) -> Self {
        StatsError::VoxelMeasurement {
            details: details.into(),
        }
    }

    /// Attach the label being measured.
    pub fn for_label(self, label: impl std::fmt::Debug) -> Self {
        StatsError::Label {
            label: format!("{:?}", label),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = StatsError::arithmetic("solidity", 0.0);
        assert_eq!(err.code(), StatsErrorCode::Arithmetic);
        assert_eq!(err.code().as_str(), "STATS-2001");
    }

    #[test]
    fn test_label_context_keeps_code() {
        let err = StatsError::from(MeshError::degenerate_geometry("3 points")).for_label(7u16);
        assert_eq!(err.code(), StatsErrorCode::Geometry);
        assert_eq!(err.label(), Some("7"));
        assert_eq!(
            err.recovery_suggestion(),
            StatsRecoverySuggestion::CheckSegmentation {
                label: Some("7".into())
            }
        );
    }

    #[test]
    fn test_error_display() {
        let err = StatsError::arithmetic("sphericity_wadell", 0.0).for_label(3u8);
        let display = err.to_string();
        assert!(display.starts_with("label 3:"));
        assert!(display.contains("sphericity_wadell"));
    }

    #[test]
    fn test_from_mesh_error() {
        let err: StatsError = MeshError::empty_mesh("test").into();
        assert!(matches!(err, StatsError::Geometry(_)));
        assert!(err.recovery_suggestion().to_string().contains("segmentation"));
    }
}
