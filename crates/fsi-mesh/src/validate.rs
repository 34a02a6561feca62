//! Zone validation logic.

use std::collections::HashSet;

use fsi_core::{Vec3, ZoneId};

use crate::error::{MeshError, MeshResult};
use crate::zone::Face;

/// Validate the zone structure: faces exist, reference valid points, and
/// coordinates are finite.
pub(crate) fn validate_structure(id: ZoneId, points: &[Vec3], faces: &[Face]) -> MeshResult<()> {
    if faces.is_empty() {
        return Err(MeshError::EmptyZone { zone: id });
    }

    for (i, p) in points.iter().enumerate() {
        if !p.iter().all(|c| c.is_finite()) {
            return Err(MeshError::NonFiniteCoordinate { point: i });
        }
    }

    for (f, face) in faces.iter().enumerate() {
        if face.len() < 3 {
            return Err(MeshError::TooFewPoints {
                face: f,
                count: face.len(),
            });
        }

        let mut seen = HashSet::with_capacity(face.len());
        for &p in &face.points {
            if p >= points.len() {
                return Err(MeshError::InvalidPointRef {
                    face: f,
                    point: p,
                    n_points: points.len(),
                });
            }
            if !seen.insert(p) {
                return Err(MeshError::DuplicatePoint { face: f, point: p });
            }
        }
    }

    Ok(())
}

/// Every point must belong to at least one face.
pub(crate) fn validate_usage(point_face_offsets: &[usize]) -> MeshResult<()> {
    for (point, w) in point_face_offsets.windows(2).enumerate() {
        if w[0] == w[1] {
            return Err(MeshError::UnusedPoint { point });
        }
    }
    Ok(())
}
