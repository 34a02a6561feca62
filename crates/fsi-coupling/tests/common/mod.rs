//! Minimal flow and stress models for exercising the coupling loop.
//!
//! The flow model is a closed chamber whose pressure drops linearly with the
//! mean wall deflection; the stress model is a wall on independent springs.
//! The coupled deflection is `p0 / (k + c)`.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use fsi_core::{PatchId, Real, Vec3, ZoneId, check_len};
use fsi_coupling::{CouplingResult, FlowModel, SolveStatus, StressModel, TimeStep};
use fsi_mesh::Zone;
use fsi_mesh::shapes::rectangle_zone;

#[derive(Default)]
pub struct Counters {
    pub flow_evolves: AtomicUsize,
    pub stress_evolves: AtomicUsize,
    pub mesh_moves: AtomicUsize,
}

impl Counters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::Relaxed)
    }
}

fn wall(id: u32, n: usize) -> Zone {
    rectangle_zone(
        ZoneId::from_index(id),
        "wall",
        Vec3::zeros(),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        n,
        n,
    )
    .unwrap()
}

pub struct ChamberFlow {
    reference: Zone,
    zone: Zone,
    displacement: Vec<Vec3>,
    p0: Real,
    compliance: Real,
    pressure: Real,
    counters: Arc<Counters>,
}

impl ChamberFlow {
    pub fn new(n: usize, p0: Real, compliance: Real, counters: Arc<Counters>) -> Self {
        let zone = wall(0, n);
        Self {
            displacement: vec![Vec3::zeros(); zone.n_points()],
            reference: zone.clone(),
            zone,
            p0,
            compliance,
            pressure: p0,
            counters,
        }
    }
}

impl FlowModel for ChamberFlow {
    fn name(&self) -> &str {
        "chamber"
    }

    fn find_zone(&self, name: &str) -> Option<ZoneId> {
        (name == "wall").then(|| ZoneId::from_index(0))
    }

    fn find_patch(&self, name: &str) -> Option<PatchId> {
        (name == "wall").then(|| PatchId::from_index(0))
    }

    fn zone(&self, _zone: ZoneId) -> &Zone {
        &self.zone
    }

    fn begin_time_step(&mut self, _step: &TimeStep) {}

    fn evolve(&mut self) -> SolveStatus {
        self.counters.flow_evolves.fetch_add(1, Ordering::Relaxed);
        let mean = self.displacement.iter().map(|d| d.z).sum::<Real>()
            / self.displacement.len() as Real;
        self.pressure = self.p0 - self.compliance * mean;
        SolveStatus::converged(1, 0.0)
    }

    fn move_mesh(&mut self, _zone: ZoneId, displacement: &[Vec3]) -> CouplingResult<()> {
        self.counters.mesh_moves.fetch_add(1, Ordering::Relaxed);
        check_len(displacement, self.reference.n_points(), "chamber displacement")?;
        self.displacement = displacement.to_vec();
        self.zone = self.reference.displaced(displacement)?;
        Ok(())
    }

    fn patch_traction(&self, _patch: PatchId, _zone: ZoneId) -> Vec<Vec3> {
        vec![Vec3::new(0.0, 0.0, self.pressure); self.zone.n_faces()]
    }

    fn patch_pressure(&self, _patch: PatchId, _zone: ZoneId) -> Vec<Real> {
        vec![self.pressure; self.zone.n_faces()]
    }

    fn patch_viscous_traction(&self, _patch: PatchId, _zone: ZoneId) -> Vec<Vec3> {
        vec![Vec3::zeros(); self.zone.n_faces()]
    }
}

pub struct SpringWall {
    zone: Zone,
    stiffness: Real,
    traction: Vec<Vec3>,
    pressure: Vec<Real>,
    displacement: Vec<Vec3>,
    displacement_old: Vec<Vec3>,
    dt: Real,
    counters: Arc<Counters>,
}

impl SpringWall {
    pub fn new(n: usize, stiffness: Real, counters: Arc<Counters>) -> Self {
        let zone = wall(1, n);
        Self {
            traction: vec![Vec3::zeros(); zone.n_faces()],
            pressure: vec![0.0; zone.n_faces()],
            displacement: vec![Vec3::zeros(); zone.n_points()],
            displacement_old: vec![Vec3::zeros(); zone.n_points()],
            zone,
            stiffness,
            dt: 1.0,
            counters,
        }
    }
}

impl StressModel for SpringWall {
    fn name(&self) -> &str {
        "springs"
    }

    fn find_zone(&self, name: &str) -> Option<ZoneId> {
        (name == "wall").then(|| ZoneId::from_index(1))
    }

    fn find_patch(&self, name: &str) -> Option<PatchId> {
        (name == "wall").then(|| PatchId::from_index(1))
    }

    fn zone(&self, _zone: ZoneId) -> &Zone {
        &self.zone
    }

    fn begin_time_step(&mut self, step: &TimeStep) {
        self.dt = step.dt;
        self.displacement_old.clone_from(&self.displacement);
    }

    fn evolve(&mut self) -> SolveStatus {
        self.counters.stress_evolves.fetch_add(1, Ordering::Relaxed);
        for (p, d) in self.displacement.iter_mut().enumerate() {
            let faces = self.zone.point_faces(p);
            let load: Vec3 = faces
                .iter()
                .map(|&f| self.traction[f] + Vec3::new(0.0, 0.0, self.pressure[f]))
                .sum::<Vec3>()
                / faces.len() as Real;
            *d = load / self.stiffness;
        }
        SolveStatus::converged(1, 0.0)
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
        (self.displacement[point] - self.displacement_old[point]) / self.dt
    }

    fn set_traction(
        &mut self,
        _patch: PatchId,
        _zone: ZoneId,
        traction: &[Vec3],
    ) -> CouplingResult<()> {
        check_len(traction, self.traction.len(), "spring wall traction")?;
        self.traction = traction.to_vec();
        Ok(())
    }

    fn set_pressure(
        &mut self,
        _patch: PatchId,
        _zone: ZoneId,
        pressure: &[Real],
    ) -> CouplingResult<()> {
        check_len(pressure, self.pressure.len(), "spring wall pressure")?;
        self.pressure = pressure.to_vec();
        Ok(())
    }

    fn residual(&self) -> Real {
        0.0
    }
}
