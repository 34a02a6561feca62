//! Zone-specific error types.

use fsi_core::ZoneId;

pub type MeshResult<T> = Result<T, MeshError>;

/// Zone construction and validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A zone must have at least one face.
    EmptyZone { zone: ZoneId },

    /// A face has fewer than three points.
    TooFewPoints { face: usize, count: usize },

    /// A face refers to a point that doesn't exist.
    InvalidPointRef {
        face: usize,
        point: usize,
        n_points: usize,
    },

    /// A face lists the same point twice.
    DuplicatePoint { face: usize, point: usize },

    /// A point is not used by any face.
    UnusedPoint { point: usize },

    /// A coordinate is NaN or infinite.
    NonFiniteCoordinate { point: usize },

    /// Replacement coordinates don't match the zone's point count.
    PointCountMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for MeshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshError::EmptyZone { zone } => write!(f, "{} has no faces", zone),
            MeshError::TooFewPoints { face, count } => {
                write!(f, "Face {} has {} points (expected at least 3)", face, count)
            }
            MeshError::InvalidPointRef {
                face,
                point,
                n_points,
            } => {
                write!(
                    f,
                    "Face {} refers to point {} but the zone has {} points",
                    face, point, n_points
                )
            }
            MeshError::DuplicatePoint { face, point } => {
                write!(f, "Face {} lists point {} more than once", face, point)
            }
            MeshError::UnusedPoint { point } => {
                write!(f, "Point {} is not used by any face", point)
            }
            MeshError::NonFiniteCoordinate { point } => {
                write!(f, "Point {} has a non-finite coordinate", point)
            }
            MeshError::PointCountMismatch { expected, actual } => {
                write!(
                    f,
                    "Expected {} point coordinates but got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for MeshError {}
