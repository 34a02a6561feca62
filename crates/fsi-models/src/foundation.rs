//! Elastic-foundation stress model.
//!
//! The interface wall is a thin plate of areal mass `ρ·h` resting on an
//! elastic layer of modulus `E` and thickness `H` (a Winkler foundation of
//! stiffness `k = E / H` per unit area) with viscous damping
//! `c = 2ζ·sqrt(k·ρh)`. Every wall point carries its own spring:
//!
//! ```text
//! ρh·ẅ + c·ẇ + k·w = q
//! ```
//!
//! with `q` the area-weighted mean of the loads on the adjacent faces. Each
//! `evolve` takes one backward-Euler step from the old-time state; with zero
//! mass and damping the response is quasi-static, `w = q / k`.

use fsi_core::units::{
    Length, MassDensity, Pressure, Ratio, kg_per_m3, kgpm3, m, meters, pa, pascals, ratio,
    unitless,
};
use fsi_core::{PatchId, Real, Vec3, ZoneId, check_len};
use fsi_coupling::{CouplingError, CouplingResult, SolveStatus, StressModel, TimeStep};
use fsi_mesh::Zone;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::{PlateGeometry, check_non_negative, check_positive, point_average};
use crate::error::ModelResult;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoundationParams {
    pub geometry: PlateGeometry,
    /// Young's modulus of the foundation layer.
    pub modulus: Pressure,
    /// Foundation layer thickness.
    pub thickness: Length,
    /// Wall density; zero gives a quasi-static response.
    pub density: MassDensity,
    pub wall_thickness: Length,
    pub damping_ratio: Ratio,
}

impl Default for FoundationParams {
    fn default() -> Self {
        Self {
            geometry: PlateGeometry::default().with_resolution(6, 6),
            modulus: pa(1.0e5),
            thickness: m(0.1),
            density: kgpm3(0.0),
            wall_thickness: m(0.01),
            damping_ratio: unitless(0.0),
        }
    }
}

impl FoundationParams {
    pub fn validate(&self) -> ModelResult<()> {
        check_positive(pascals(self.modulus), "foundation modulus")?;
        check_positive(meters(self.thickness), "foundation thickness")?;
        check_non_negative(kg_per_m3(self.density), "wall density")?;
        check_non_negative(meters(self.wall_thickness), "wall thickness")?;
        check_non_negative(ratio(self.damping_ratio), "damping ratio")?;
        Ok(())
    }

    /// Foundation stiffness per unit area (Pa/m).
    pub fn stiffness(&self) -> Real {
        pascals(self.modulus) / meters(self.thickness)
    }

    /// Wall mass per unit area (kg/m²).
    pub fn areal_mass(&self) -> Real {
        kg_per_m3(self.density) * meters(self.wall_thickness)
    }

    /// Damping coefficient per unit area (Pa·s/m).
    pub fn damping(&self) -> Real {
        2.0 * ratio(self.damping_ratio) * (self.stiffness() * self.areal_mass()).sqrt()
    }
}

pub struct ElasticFoundation {
    name: String,
    params: FoundationParams,
    zone_id: ZoneId,
    zone: Zone,
    normals: Vec<Vec3>,
    areas: Vec<Real>,

    traction: Vec<Vec3>,
    pressure: Vec<Real>,

    displacement: Vec<Vec3>,
    velocity: Vec<Vec3>,
    displacement_old: Vec<Vec3>,
    velocity_old: Vec<Vec3>,
    dt: Real,
    /// Largest point displacement change in the last solve.
    residual: Real,
}

impl ElasticFoundation {
    pub fn new(name: impl Into<String>, params: FoundationParams) -> ModelResult<Self> {
        params.validate()?;
        let zone_id = ZoneId::from_index(0);
        let zone = params.geometry.zone(zone_id)?;
        let n_points = zone.n_points();
        let n_faces = zone.n_faces();
        Ok(Self {
            name: name.into(),
            zone_id,
            normals: (0..n_faces).map(|f| zone.face_normal(f)).collect(),
            areas: zone.face_areas(),
            traction: vec![Vec3::zeros(); n_faces],
            pressure: vec![0.0; n_faces],
            displacement: vec![Vec3::zeros(); n_points],
            velocity: vec![Vec3::zeros(); n_points],
            displacement_old: vec![Vec3::zeros(); n_points],
            velocity_old: vec![Vec3::zeros(); n_points],
            dt: 0.0,
            residual: 0.0,
            zone,
            params,
        })
    }

    pub fn params(&self) -> &FoundationParams {
        &self.params
    }

    /// Face loads: traction plus pressure along the face normal.
    pub fn face_loads(&self) -> Vec<Vec3> {
        self.traction
            .iter()
            .zip(&self.pressure)
            .zip(&self.normals)
            .map(|((t, p), n)| t + *p * n)
            .collect()
    }

    fn is_dynamic(&self) -> bool {
        self.dt > 0.0 && (self.params.areal_mass() > 0.0 || self.params.damping() > 0.0)
    }

    fn check_zone(&self, zone: ZoneId) -> CouplingResult<()> {
        if zone == self.zone_id {
            Ok(())
        } else {
            Err(CouplingError::InvalidArg {
                what: "elastic foundation has a single interface zone",
            })
        }
    }
}

impl StressModel for ElasticFoundation {
    fn name(&self) -> &str {
        &self.name
    }

    fn find_zone(&self, name: &str) -> Option<ZoneId> {
        (name == self.params.geometry.zone_name).then_some(self.zone_id)
    }

    fn find_patch(&self, name: &str) -> Option<PatchId> {
        (name == self.params.geometry.zone_name).then(|| PatchId::from_index(0))
    }

    fn zone(&self, _zone: ZoneId) -> &Zone {
        &self.zone
    }

    fn begin_time_step(&mut self, step: &TimeStep) {
        self.dt = step.dt;
        self.displacement_old.clone_from(&self.displacement);
        self.velocity_old.clone_from(&self.velocity);
    }

    fn evolve(&mut self) -> SolveStatus {
        let loads = point_average(&self.zone, &self.areas, &self.face_loads());
        let k = self.params.stiffness();
        let dynamic = self.is_dynamic();
        let (mass, damping, dt) = (self.params.areal_mass(), self.params.damping(), self.dt);

        let mut change: Real = 0.0;
        for (i, q) in loads.iter().enumerate() {
            let w_old = self.displacement_old[i];
            let w = if dynamic {
                let inertia = mass / (dt * dt);
                let drag = damping / dt;
                (q + inertia * (w_old + dt * self.velocity_old[i]) + drag * w_old)
                    / (inertia + drag + k)
            } else {
                q / k
            };
            change = change.max((w - self.displacement[i]).norm());
            self.velocity[i] = if dt > 0.0 { (w - w_old) / dt } else { Vec3::zeros() };
            self.displacement[i] = w;
        }
        self.residual = change;
        debug!(model = %self.name, change, dynamic, "foundation displacement updated");
        SolveStatus::converged(1, change)
    }

    fn zone_point_displacement(&self, _zone: ZoneId) -> Vec<Vec3> {
        self.displacement.clone()
    }

    fn mesh_points(&self) -> &[Vec3] {
        self.zone.points()
    }

    fn point_displacement(&self, point: usize) -> Vec3 {
        self.displacement[point]
    }

    fn point_velocity(&self, point: usize) -> Vec3 {
        self.velocity[point]
    }

    fn set_traction(
        &mut self,
        _patch: PatchId,
        zone: ZoneId,
        traction: &[Vec3],
    ) -> CouplingResult<()> {
        self.check_zone(zone)?;
        check_len(traction, self.traction.len(), "foundation traction")?;
        self.traction.copy_from_slice(traction);
        Ok(())
    }

    fn set_pressure(
        &mut self,
        _patch: PatchId,
        zone: ZoneId,
        pressure: &[Real],
    ) -> CouplingResult<()> {
        self.check_zone(zone)?;
        check_len(pressure, self.pressure.len(), "foundation pressure")?;
        self.pressure.copy_from_slice(pressure);
        Ok(())
    }

    fn residual(&self) -> Real {
        self.residual
    }
}
