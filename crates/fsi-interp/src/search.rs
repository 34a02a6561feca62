//! Candidate search over a source zone.
//!
//! Faces are indexed by their bounding boxes inflated by the search distance,
//! face centres and points by position. All query results are returned in
//! ascending index order so weight assembly is independent of tree layout.

use fsi_core::{Real, Vec3};
use fsi_mesh::Zone;
use fsi_mesh::geometry::average;
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree, RTreeObject};

use crate::error::{InterpError, InterpResult};
use crate::settings::InterpolationSettings;

type IndexedPoint = GeomWithData<[Real; 3], usize>;

/// Inflated axis-aligned bounding box of one face.
#[derive(Debug, Clone)]
pub struct FaceBox {
    pub face: usize,
    min: [Real; 3],
    max: [Real; 3],
}

impl RTreeObject for FaceBox {
    type Envelope = AABB<[Real; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

fn to_array(v: &Vec3) -> [Real; 3] {
    [v.x, v.y, v.z]
}

/// Precomputed face geometry and spatial indices of one zone.
pub struct ZoneSearch {
    pub centres: Vec<Vec3>,
    /// Point average of each face: apex of its fan triangulation.
    pub apexes: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub areas: Vec<Real>,
    /// False for faces excluded as degenerate.
    pub valid: Vec<bool>,
    /// Square root of the mean face area.
    pub mean_size: Real,
    boxes: RTree<FaceBox>,
    centre_tree: RTree<IndexedPoint>,
    point_tree: RTree<IndexedPoint>,
}

impl ZoneSearch {
    pub fn new(zone: &Zone, settings: &InterpolationSettings) -> InterpResult<Self> {
        let centres = zone.face_centres();
        let area_vectors = zone.face_area_vectors();
        let areas: Vec<Real> = area_vectors.iter().map(|a| a.norm()).collect();
        let normals: Vec<Vec3> = area_vectors
            .iter()
            .map(|a| a.try_normalize(Real::EPSILON).unwrap_or_else(Vec3::zeros))
            .collect();
        let apexes: Vec<Vec3> = (0..zone.n_faces())
            .map(|f| average(&zone.face_points(f)))
            .collect();

        let n_faces = zone.n_faces().max(1) as Real;
        let mean_area = areas.iter().sum::<Real>() / n_faces;
        let valid: Vec<bool> = areas
            .iter()
            .map(|&a| a > settings.degenerate_area * mean_area && a > 0.0)
            .collect();
        if !valid.iter().any(|&v| v) {
            return Err(InterpError::Degenerate {
                zone: zone.name().to_string(),
            });
        }

        let mut boxes = Vec::new();
        let mut centre_points = Vec::new();
        for f in 0..zone.n_faces() {
            if !valid[f] {
                continue;
            }
            let inflate = settings.search_tolerance * areas[f].sqrt();
            let mut min = [Real::INFINITY; 3];
            let mut max = [Real::NEG_INFINITY; 3];
            for p in zone.face_points(f) {
                for k in 0..3 {
                    min[k] = min[k].min(p[k] - inflate);
                    max[k] = max[k].max(p[k] + inflate);
                }
            }
            boxes.push(FaceBox { face: f, min, max });
            centre_points.push(IndexedPoint::new(to_array(&centres[f]), f));
        }
        let point_entries = zone
            .points()
            .iter()
            .enumerate()
            .map(|(i, p)| IndexedPoint::new(to_array(p), i))
            .collect();

        Ok(Self {
            centres,
            apexes,
            normals,
            areas,
            valid,
            mean_size: mean_area.sqrt(),
            boxes: RTree::bulk_load(boxes),
            centre_tree: RTree::bulk_load(centre_points),
            point_tree: RTree::bulk_load(point_entries),
        })
    }

    /// Valid faces whose inflated box intersects the box `[min, max]`.
    pub fn faces_in_box(&self, min: &Vec3, max: &Vec3) -> Vec<usize> {
        let envelope = AABB::from_corners(to_array(min), to_array(max));
        let mut found: Vec<usize> = self
            .boxes
            .locate_in_envelope_intersecting(&envelope)
            .map(|b| b.face)
            .collect();
        found.sort_unstable();
        found
    }

    /// Valid faces whose inflated box lies within `radius` of `p`.
    pub fn faces_near(&self, p: &Vec3, radius: Real) -> Vec<usize> {
        let r = Vec3::repeat(radius);
        self.faces_in_box(&(p - r), &(p + r))
    }

    /// Up to `k` valid faces ordered by centre distance, with the distance.
    pub fn nearest_faces(&self, p: &Vec3, k: usize) -> Vec<(usize, Real)> {
        self.centre_tree
            .nearest_neighbor_iter(&to_array(p))
            .take(k)
            .map(|e| (e.data, (self.centres[e.data] - p).norm()))
            .collect()
    }

    /// Nearest zone point.
    pub fn nearest_point(&self, p: &Vec3) -> Option<usize> {
        self.point_tree.nearest_neighbor(&to_array(p)).map(|e| e.data)
    }
}
