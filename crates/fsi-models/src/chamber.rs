//! Compliant-chamber flow model.
//!
//! A gas-filled chamber of depth `depth` closed on one side by the interface
//! wall. Wall motion along the zone normal changes the chamber volume and,
//! through the gas bulk modulus, the wall pressure:
//!
//! ```text
//! p_f = p_drive(t) + tilt · (s_f − ½) − K · w̄ / depth
//! ```
//!
//! where `w̄` is the area-weighted mean normal wall displacement and `s_f`
//! the position of face `f` along `u` in `[0, 1]`. The driving pressure is
//! `p + A · sin(2π t / T)` (steady when `T = 0`). A uniform shear stress acts
//! along `u`.
//!
//! The zone normal points from the fluid into the wall, so a positive
//! pressure pushes the wall along it.

use fsi_core::units::{Length, Pressure, Time, m, meters, pa, pascals, s, seconds};
use fsi_core::{PatchId, Real, Vec3, ZoneId, check_len};
use fsi_coupling::{CouplingError, CouplingResult, FlowModel, SolveStatus, TimeStep};
use fsi_mesh::Zone;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::{PlateGeometry, check_non_negative, check_positive, face_average};
use crate::error::{ModelError, ModelResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChamberParams {
    pub geometry: PlateGeometry,
    /// Mean driving pressure.
    pub pressure: Pressure,
    /// Amplitude of the sinusoidal part of the driving pressure.
    pub pressure_amplitude: Pressure,
    /// Period of the driving pressure; zero for a steady drive.
    pub period: Time,
    /// Pressure difference across the wall along `u`.
    pub pressure_tilt: Pressure,
    /// Bulk modulus of the chamber gas.
    pub bulk_modulus: Pressure,
    /// Chamber depth behind the wall.
    pub depth: Length,
    /// Wall shear stress along `u`.
    pub shear_stress: Pressure,
}

impl Default for ChamberParams {
    fn default() -> Self {
        Self {
            geometry: PlateGeometry::default(),
            pressure: pa(1.0e3),
            pressure_amplitude: pa(0.0),
            period: s(0.0),
            pressure_tilt: pa(0.0),
            bulk_modulus: pa(1.0e4),
            depth: m(0.1),
            shear_stress: pa(0.0),
        }
    }
}

impl ChamberParams {
    pub fn validate(&self) -> ModelResult<()> {
        check_non_negative(pascals(self.bulk_modulus), "chamber bulk modulus")?;
        check_positive(meters(self.depth), "chamber depth")?;
        check_non_negative(seconds(self.period), "driving pressure period")?;
        for (value, what) in [
            (self.pressure, "chamber pressure"),
            (self.pressure_amplitude, "driving pressure amplitude"),
            (self.pressure_tilt, "pressure tilt"),
            (self.shear_stress, "wall shear stress"),
        ] {
            if !pascals(value).is_finite() {
                return Err(ModelError::NonPhysical { what });
            }
        }
        Ok(())
    }

    /// Pressure drop per unit mean wall displacement (Pa/m).
    pub fn volume_stiffness(&self) -> Real {
        pascals(self.bulk_modulus) / meters(self.depth)
    }
}

pub struct CompliantChamber {
    name: String,
    params: ChamberParams,
    zone_id: ZoneId,
    reference: Zone,
    zone: Zone,
    displacement: Vec<Vec3>,
    normals: Vec<Vec3>,
    areas: Vec<Real>,
    /// Face position along `u`, in `[0, 1]`.
    face_s: Vec<Real>,
    shear_direction: Vec3,
    time: Real,
    pressure: Vec<Real>,
}

impl CompliantChamber {
    pub fn new(name: impl Into<String>, params: ChamberParams) -> ModelResult<Self> {
        params.validate()?;
        let zone_id = ZoneId::from_index(0);
        let reference = params.geometry.zone(zone_id)?;

        let u = params.geometry.u_vector();
        let origin = reference.points()[0];
        let face_s = reference
            .face_centres()
            .iter()
            .map(|c| (c - origin).dot(&u) / u.norm_squared())
            .collect();
        let n_faces = reference.n_faces();

        let mut chamber = Self {
            name: name.into(),
            zone_id,
            displacement: vec![Vec3::zeros(); reference.n_points()],
            normals: (0..n_faces).map(|f| reference.face_normal(f)).collect(),
            areas: reference.face_areas(),
            face_s,
            shear_direction: u.normalize(),
            time: 0.0,
            pressure: vec![0.0; n_faces],
            zone: reference.clone(),
            reference,
            params,
        };
        chamber.update_pressure();
        Ok(chamber)
    }

    pub fn params(&self) -> &ChamberParams {
        &self.params
    }

    /// Face pressure from the last solve.
    pub fn pressure(&self) -> &[Real] {
        &self.pressure
    }

    pub fn driving_pressure(&self) -> Real {
        let p = pascals(self.params.pressure);
        let period = seconds(self.params.period);
        if period > 0.0 {
            let phase = 2.0 * std::f64::consts::PI * self.time / period;
            p + pascals(self.params.pressure_amplitude) * phase.sin()
        } else {
            p
        }
    }

    /// Area-weighted mean wall displacement along the zone normal.
    pub fn mean_normal_displacement(&self) -> Real {
        let faces = face_average(&self.reference, &self.displacement);
        let total: Real = self.areas.iter().sum();
        faces
            .iter()
            .zip(&self.normals)
            .zip(&self.areas)
            .map(|((d, n), a)| a * d.dot(n))
            .sum::<Real>()
            / total
    }

    fn update_pressure(&mut self) {
        let base = self.driving_pressure()
            - self.params.volume_stiffness() * self.mean_normal_displacement();
        let tilt = pascals(self.params.pressure_tilt);
        for (p, s) in self.pressure.iter_mut().zip(&self.face_s) {
            *p = base + tilt * (s - 0.5);
        }
    }

    fn check_zone(&self, zone: ZoneId) -> CouplingResult<()> {
        if zone == self.zone_id {
            Ok(())
        } else {
            Err(CouplingError::InvalidArg {
                what: "compliant chamber has a single interface zone",
            })
        }
    }

    fn shear(&self) -> Vec3 {
        pascals(self.params.shear_stress) * self.shear_direction
    }
}

impl FlowModel for CompliantChamber {
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
        self.time = step.time;
    }

    fn evolve(&mut self) -> SolveStatus {
        let before = self.pressure.iter().sum::<Real>() / self.pressure.len() as Real;
        self.update_pressure();
        let after = self.pressure.iter().sum::<Real>() / self.pressure.len() as Real;
        debug!(model = %self.name, mean_pressure = after, "chamber pressure updated");
        SolveStatus::converged(1, (after - before).abs())
    }

    fn move_mesh(&mut self, zone: ZoneId, displacement: &[Vec3]) -> CouplingResult<()> {
        self.check_zone(zone)?;
        check_len(displacement, self.reference.n_points(), "chamber wall displacement")?;
        self.zone = self.reference.displaced(displacement)?;
        self.displacement = displacement.to_vec();
        Ok(())
    }

    fn patch_traction(&self, _patch: PatchId, _zone: ZoneId) -> Vec<Vec3> {
        let shear = self.shear();
        self.pressure
            .iter()
            .zip(&self.normals)
            .map(|(p, n)| *p * n + shear)
            .collect()
    }

    fn patch_pressure(&self, _patch: PatchId, _zone: ZoneId) -> Vec<Real> {
        self.pressure.clone()
    }

    fn patch_viscous_traction(&self, _patch: PatchId, _zone: ZoneId) -> Vec<Vec3> {
        vec![self.shear(); self.pressure.len()]
    }
}
