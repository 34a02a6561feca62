//! Contracts for the single-physics solvers driven by the coupling loop.
//!
//! Both models own their meshes and fields. The coupling layer only sees the
//! interface: one face zone and the boundary patch carrying the interface
//! condition on each side.

use fsi_core::{PatchId, Real, Vec3, ZoneId};
use fsi_mesh::Zone;

use crate::error::CouplingResult;

/// The time level a model is asked to advance to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeStep {
    /// 1-based step counter.
    pub index: usize,
    /// Time at the end of the step (seconds).
    pub time: Real,
    /// Step size (seconds).
    pub dt: Real,
}

/// Outcome of one `evolve` call. Models report trouble here instead of
/// failing; the coupling loop logs it and carries on.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SolveStatus {
    pub converged: bool,
    pub iterations: usize,
    pub residual: Real,
}

impl SolveStatus {
    pub fn converged(iterations: usize, residual: Real) -> Self {
        Self {
            converged: true,
            iterations,
            residual,
        }
    }
}

/// Fluid-side solver.
pub trait FlowModel: Send {
    /// Model name for logging and error messages.
    fn name(&self) -> &str;

    fn find_zone(&self, name: &str) -> Option<ZoneId>;

    fn find_patch(&self, name: &str) -> Option<PatchId>;

    /// Interface zone in its current (moved) configuration.
    fn zone(&self, zone: ZoneId) -> &Zone;

    /// Store old-time fields before the outer iterations of a new step.
    fn begin_time_step(&mut self, step: &TimeStep);

    /// Solve the flow from the old-time state on the current mesh.
    fn evolve(&mut self) -> SolveStatus;

    /// Place the interface zone points at reference + `displacement`.
    fn move_mesh(&mut self, zone: ZoneId, displacement: &[Vec3]) -> CouplingResult<()>;

    /// Total traction (pressure and viscous) on the zone faces.
    fn patch_traction(&self, patch: PatchId, zone: ZoneId) -> Vec<Vec3>;

    /// Pressure on the zone faces.
    fn patch_pressure(&self, patch: PatchId, zone: ZoneId) -> Vec<Real>;

    /// Viscous part of the traction on the zone faces.
    fn patch_viscous_traction(&self, patch: PatchId, zone: ZoneId) -> Vec<Vec3>;
}

/// Solid-side solver.
pub trait StressModel: Send {
    fn name(&self) -> &str;

    fn find_zone(&self, name: &str) -> Option<ZoneId>;

    fn find_patch(&self, name: &str) -> Option<PatchId>;

    /// Interface zone in the reference (undeformed) configuration.
    fn zone(&self, zone: ZoneId) -> &Zone;

    fn begin_time_step(&mut self, step: &TimeStep);

    /// Solve for the displacement under the current interface loads.
    fn evolve(&mut self) -> SolveStatus;

    /// Total displacement of the zone points.
    fn zone_point_displacement(&self, zone: ZoneId) -> Vec<Vec3>;

    /// Reference coordinates of every solid mesh point held by this process.
    fn mesh_points(&self) -> &[Vec3];

    fn point_displacement(&self, point: usize) -> Vec3;

    fn point_velocity(&self, point: usize) -> Vec3;

    /// Apply a face traction on the interface patch.
    fn set_traction(&mut self, patch: PatchId, zone: ZoneId, traction: &[Vec3])
    -> CouplingResult<()>;

    /// Apply a face pressure on the interface patch.
    fn set_pressure(&mut self, patch: PatchId, zone: ZoneId, pressure: &[Real])
    -> CouplingResult<()>;

    /// Model-specific traction prediction for the coming step.
    fn predict_traction(&self, _patch: PatchId, _zone: ZoneId) -> Option<Vec<Vec3>> {
        None
    }

    fn predict_pressure(&self, _patch: PatchId, _zone: ZoneId) -> Option<Vec<Real>> {
        None
    }

    /// Residual of the last solid solve.
    fn residual(&self) -> Real;
}
