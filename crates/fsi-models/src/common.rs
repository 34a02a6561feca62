//! Shared parameter blocks and helpers for the reference models.

use fsi_core::units::{Length, m, meters};
use fsi_core::{Real, Vec3, ZoneId};
use fsi_mesh::Zone;
use fsi_mesh::shapes::rectangle_zone;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Flat rectangular interface wall: `origin + s·u + t·v`, `s, t ∈ [0, 1]`,
/// split into `nu × nv` quadrilaterals. The zone normal is `u × v`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateGeometry {
    /// Name of both the interface zone and its patch.
    pub zone_name: String,
    pub origin: [Length; 3],
    pub u: [Length; 3],
    pub v: [Length; 3],
    pub nu: usize,
    pub nv: usize,
}

impl Default for PlateGeometry {
    fn default() -> Self {
        Self {
            zone_name: "interface".to_string(),
            origin: [m(0.0), m(0.0), m(0.0)],
            u: [m(1.0), m(0.0), m(0.0)],
            v: [m(0.0), m(1.0), m(0.0)],
            nu: 8,
            nv: 8,
        }
    }
}

fn to_vec3(v: &[Length; 3]) -> Vec3 {
    Vec3::new(meters(v[0]), meters(v[1]), meters(v[2]))
}

impl PlateGeometry {
    /// Same plate with a different resolution.
    pub fn with_resolution(mut self, nu: usize, nv: usize) -> Self {
        self.nu = nu;
        self.nv = nv;
        self
    }

    pub fn u_vector(&self) -> Vec3 {
        to_vec3(&self.u)
    }

    pub fn v_vector(&self) -> Vec3 {
        to_vec3(&self.v)
    }

    pub fn zone(&self, id: ZoneId) -> ModelResult<Zone> {
        if self.nu == 0 || self.nv == 0 {
            return Err(ModelError::InvalidArg {
                what: "plate resolution must be at least 1x1",
            });
        }
        if self.u_vector().cross(&self.v_vector()).norm() <= Real::EPSILON {
            return Err(ModelError::InvalidArg {
                what: "plate edges u and v must span a plane",
            });
        }
        Ok(rectangle_zone(
            id,
            self.zone_name.clone(),
            to_vec3(&self.origin),
            self.u_vector(),
            self.v_vector(),
            self.nu,
            self.nv,
        )?)
    }
}

pub(crate) fn check_positive(value: Real, what: &'static str) -> ModelResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ModelError::NonPhysical { what })
    }
}

pub(crate) fn check_non_negative(value: Real, what: &'static str) -> ModelResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ModelError::NonPhysical { what })
    }
}

/// Per-face mean of the face point values.
pub(crate) fn face_average(zone: &Zone, point_values: &[Vec3]) -> Vec<Vec3> {
    zone.faces()
        .iter()
        .map(|face| {
            face.points.iter().map(|&p| point_values[p]).sum::<Vec3>() / face.len() as Real
        })
        .collect()
}

/// Per-point area-weighted mean of the adjacent face values.
pub(crate) fn point_average(zone: &Zone, areas: &[Real], face_values: &[Vec3]) -> Vec<Vec3> {
    (0..zone.n_points())
        .map(|p| {
            let faces = zone.point_faces(p);
            let weight: Real = faces.iter().map(|&f| areas[f]).sum();
            if weight <= 0.0 {
                return Vec3::zeros();
            }
            faces
                .iter()
                .map(|&f| areas[f] * face_values[f])
                .sum::<Vec3>()
                / weight
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plate_is_the_unit_square() {
        let zone = PlateGeometry::default().zone(ZoneId::from_index(0)).unwrap();
        assert_eq!(zone.n_faces(), 64);
        assert_eq!(zone.name(), "interface");
        assert!((zone.total_area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_plates_are_rejected() {
        let flat = PlateGeometry::default().with_resolution(0, 3);
        assert!(flat.zone(ZoneId::from_index(0)).is_err());
        let line = PlateGeometry {
            v: [m(2.0), m(0.0), m(0.0)],
            ..Default::default()
        };
        assert!(line.zone(ZoneId::from_index(0)).is_err());
    }

    #[test]
    fn averages_of_linear_fields() {
        let zone = PlateGeometry::default()
            .with_resolution(2, 2)
            .zone(ZoneId::from_index(0))
            .unwrap();
        let points: Vec<Vec3> = zone.points().iter().map(|p| Vec3::new(p.x, 0.0, 0.0)).collect();
        let faces = face_average(&zone, &points);
        assert!((faces[0].x - 0.25).abs() < 1e-12);
        // centre point sees all four faces symmetrically
        let back = point_average(&zone, &zone.face_areas(), &faces);
        assert!((back[4].x - 0.5).abs() < 1e-12);
    }
}
