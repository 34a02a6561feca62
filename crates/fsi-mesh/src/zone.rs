//! Core zone data structures.

use fsi_core::{Real, Vec3, ZoneId};
use rayon::prelude::*;

use crate::error::{MeshError, MeshResult};
use crate::geometry::{polygon_area_vector, polygon_centre};

/// A polygonal face given by local point indices, ordered about its normal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    pub points: Vec<usize>,
}

impl Face {
    pub fn new(points: impl Into<Vec<usize>>) -> Self {
        Self {
            points: points.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Consecutive point pairs, wrapping around.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }
}

/// The zone: a validated surface patch with fixed topology.
///
/// The zone stores:
/// - Points in local numbering (coordinates may be replaced, topology may not)
/// - Faces as point index lists
/// - Compact point→face adjacency and the unique edge list
#[derive(Debug, Clone)]
pub struct Zone {
    pub(crate) id: ZoneId,
    pub(crate) name: String,
    pub(crate) points: Vec<Vec3>,
    pub(crate) faces: Vec<Face>,

    /// Offsets for point->face adjacency: point i's faces are in
    /// point_faces[point_face_offsets[i]..point_face_offsets[i+1]].
    pub(crate) point_face_offsets: Vec<usize>,

    /// Flat list of face indices incident to points (sorted for determinism).
    pub(crate) point_faces: Vec<usize>,

    /// Unique edges as (lower, higher) point pairs, sorted.
    pub(crate) edges: Vec<(usize, usize)>,
}

impl Zone {
    pub fn id(&self) -> ZoneId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face(&self, face: usize) -> Option<&Face> {
        self.faces.get(face)
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Faces using a point.
    pub fn point_faces(&self, point: usize) -> &[usize] {
        if point >= self.points.len() {
            return &[];
        }
        let start = self.point_face_offsets[point];
        let end = self.point_face_offsets[point + 1];
        &self.point_faces[start..end]
    }

    /// Coordinates of one face's points.
    pub fn face_points(&self, face: usize) -> Vec<Vec3> {
        self.faces[face]
            .points
            .iter()
            .map(|&p| self.points[p])
            .collect()
    }

    pub fn face_area_vector(&self, face: usize) -> Vec3 {
        polygon_area_vector(&self.face_points(face))
    }

    pub fn face_area(&self, face: usize) -> Real {
        self.face_area_vector(face).norm()
    }

    /// Unit normal, zero for a degenerate face.
    pub fn face_normal(&self, face: usize) -> Vec3 {
        self.face_area_vector(face)
            .try_normalize(Real::EPSILON)
            .unwrap_or_else(Vec3::zeros)
    }

    pub fn face_centre(&self, face: usize) -> Vec3 {
        polygon_centre(&self.face_points(face))
    }

    pub fn face_centres(&self) -> Vec<Vec3> {
        (0..self.faces.len())
            .into_par_iter()
            .map(|f| self.face_centre(f))
            .collect()
    }

    pub fn face_area_vectors(&self) -> Vec<Vec3> {
        (0..self.faces.len())
            .into_par_iter()
            .map(|f| self.face_area_vector(f))
            .collect()
    }

    pub fn face_areas(&self) -> Vec<Real> {
        (0..self.faces.len())
            .into_par_iter()
            .map(|f| self.face_area(f))
            .collect()
    }

    pub fn total_area(&self) -> Real {
        self.face_areas().iter().sum()
    }

    /// Minimum length of the edges meeting at each point.
    pub fn min_edge_lengths(&self) -> Vec<Real> {
        let mut min_len = vec![Real::INFINITY; self.points.len()];
        for &(a, b) in &self.edges {
            let len = (self.points[a] - self.points[b]).norm();
            min_len[a] = min_len[a].min(len);
            min_len[b] = min_len[b].min(len);
        }
        min_len
    }

    /// Mean length of the zone edges, zero for a zone without edges.
    pub fn mean_edge_length(&self) -> Real {
        if self.edges.is_empty() {
            return 0.0;
        }
        let total: Real = self
            .edges
            .iter()
            .map(|&(a, b)| (self.points[a] - self.points[b]).norm())
            .sum();
        total / self.edges.len() as Real
    }

    /// Same topology at new coordinates.
    pub fn with_points(&self, points: Vec<Vec3>) -> MeshResult<Zone> {
        if points.len() != self.points.len() {
            return Err(MeshError::PointCountMismatch {
                expected: self.points.len(),
                actual: points.len(),
            });
        }
        if let Some(point) = points.iter().position(|p| !p.iter().all(|c| c.is_finite())) {
            return Err(MeshError::NonFiniteCoordinate { point });
        }
        Ok(Zone {
            points,
            ..self.clone()
        })
    }

    /// Same topology with every point moved by `displacement`.
    pub fn displaced(&self, displacement: &[Vec3]) -> MeshResult<Zone> {
        if displacement.len() != self.points.len() {
            return Err(MeshError::PointCountMismatch {
                expected: self.points.len(),
                actual: displacement.len(),
            });
        }
        let moved = self
            .points
            .iter()
            .zip(displacement)
            .map(|(p, d)| p + d)
            .collect();
        self.with_points(moved)
    }
}
