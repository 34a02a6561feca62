//! Incremental zone builder.

use std::collections::BTreeSet;

use fsi_core::{Vec3, ZoneId};

use crate::error::MeshResult;
use crate::validate;
use crate::zone::{Face, Zone};

/// Builder for constructing a zone incrementally.
///
/// Use `add_point` and `add_face` to build up the zone,
/// then call `build()` to validate and freeze it into an immutable `Zone`.
#[derive(Debug)]
pub struct ZoneBuilder {
    id: ZoneId,
    name: String,
    points: Vec<Vec3>,
    faces: Vec<Face>,
}

impl ZoneBuilder {
    /// Create a new empty builder.
    pub fn new(id: ZoneId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            points: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Add a point and return its local index.
    pub fn add_point(&mut self, p: Vec3) -> usize {
        self.points.push(p);
        self.points.len() - 1
    }

    /// Add a face from local point indices and return its local index.
    pub fn add_face(&mut self, points: impl Into<Vec<usize>>) -> usize {
        self.faces.push(Face::new(points));
        self.faces.len() - 1
    }

    /// Build and validate the zone.
    ///
    /// This performs validation and constructs the point→face adjacency and
    /// the edge list.
    pub fn build(self) -> MeshResult<Zone> {
        validate::validate_structure(self.id, &self.points, &self.faces)?;

        let (point_face_offsets, point_faces) = Self::build_adjacency(&self.points, &self.faces);
        validate::validate_usage(&point_face_offsets)?;

        let edges = Self::build_edges(&self.faces);

        Ok(Zone {
            id: self.id,
            name: self.name,
            points: self.points,
            faces: self.faces,
            point_face_offsets,
            point_faces,
            edges,
        })
    }

    /// Build compact adjacency lists: for each point, collect its faces.
    fn build_adjacency(points: &[Vec3], faces: &[Face]) -> (Vec<usize>, Vec<usize>) {
        let mut point_to_faces: Vec<Vec<usize>> = vec![Vec::new(); points.len()];
        for (f, face) in faces.iter().enumerate() {
            for &p in &face.points {
                point_to_faces[p].push(f);
            }
        }

        let mut offsets = Vec::with_capacity(points.len() + 1);
        let mut flat = Vec::new();
        offsets.push(0);
        for list in &mut point_to_faces {
            list.sort_unstable();
            flat.extend_from_slice(list);
            offsets.push(flat.len());
        }

        (offsets, flat)
    }

    fn build_edges(faces: &[Face]) -> Vec<(usize, usize)> {
        let unique: BTreeSet<(usize, usize)> = faces
            .iter()
            .flat_map(|f| f.edges())
            .map(|(a, b)| if a < b { (a, b) } else { (b, a) })
            .collect();
        unique.into_iter().collect()
    }
}
