//! The coupling orchestrator.
//!
//! Per outer iteration: move fluid mesh → evolve flow → transfer loads to the
//! solid → evolve stress → transfer displacement to the fluid → residual →
//! scheme update, until the residual norm drops below the tolerance or the
//! iteration cap is hit.

use std::sync::Arc;

use fsi_core::comm::{global_max_mag, global_norm};
use fsi_core::timing::coupling_timing;
use fsi_core::{
    Communicator, PatchId, Real, SerialComm, Vec3, ZoneId, check_len, ensure_vectors_finite, sub,
};
use fsi_interp::{InterpolatorCache, Transfer, ZoneInterpolator};
use tracing::{debug, info, warn};

use crate::error::{CouplingError, CouplingResult};
use crate::models::{FlowModel, SolveStatus, StressModel, TimeStep};
use crate::scheme::{CouplingScheme, build_scheme};
use crate::settings::{CouplingSettings, ForceCoupling};
use crate::state::CouplingState;
use crate::tracker::InterfaceGeometryTracker;

/// Outcome of one coupled time step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    pub index: usize,
    pub time: Real,
    pub outer_iterations: usize,
    /// True when the residual met the tolerance. Uncoupled steps have no
    /// residual and always report true.
    pub converged: bool,
    /// Scaled residual norm of the last outer iteration.
    pub residual_norm: Option<Real>,
    pub max_residual_norm: Option<Real>,
    /// Relaxation factor of the last scheme update.
    pub relaxation_factor: Option<Real>,
    /// Interpolators were invalidated at the start of this step.
    pub interpolator_rebuilt: bool,
}

/// Owns both models and the coupling state, and drives the outer iterations.
pub struct FluidStructureInterface {
    flow: Box<dyn FlowModel>,
    stress: Box<dyn StressModel>,
    comm: Arc<dyn Communicator>,
    settings: CouplingSettings,

    fluid_zone: ZoneId,
    fluid_patch: PatchId,
    solid_zone: ZoneId,
    solid_patch: PatchId,

    /// Mean fluid zone edge length at setup, the residual scale floor.
    zone_size: Real,
    tracker: InterfaceGeometryTracker,
    fluid_to_solid: InterpolatorCache,
    solid_to_fluid: InterpolatorCache,
    scheme: Box<dyn CouplingScheme>,
    state: CouplingState,

    time_step: Option<TimeStep>,
    rebuilt_this_step: bool,
}

impl FluidStructureInterface {
    pub fn new(
        flow: Box<dyn FlowModel>,
        stress: Box<dyn StressModel>,
        settings: CouplingSettings,
        comm: Arc<dyn Communicator>,
    ) -> CouplingResult<Self> {
        settings.validate()?;

        let fluid_zone = flow.find_zone(&settings.fluid_zone).ok_or_else(|| {
            CouplingError::setup(format!(
                "fluid zone '{}' not found in flow model '{}'",
                settings.fluid_zone,
                flow.name()
            ))
        })?;
        let fluid_patch = flow.find_patch(&settings.fluid_patch).ok_or_else(|| {
            CouplingError::setup(format!(
                "fluid patch '{}' not found in flow model '{}'",
                settings.fluid_patch,
                flow.name()
            ))
        })?;
        let solid_zone = stress.find_zone(&settings.solid_zone).ok_or_else(|| {
            CouplingError::setup(format!(
                "solid zone '{}' not found in stress model '{}'",
                settings.solid_zone,
                stress.name()
            ))
        })?;
        let solid_patch = stress.find_patch(&settings.solid_patch).ok_or_else(|| {
            CouplingError::setup(format!(
                "solid patch '{}' not found in stress model '{}'",
                settings.solid_patch,
                stress.name()
            ))
        })?;

        let fluid = flow.zone(fluid_zone);
        let solid = stress.zone(solid_zone);
        let zone_size = comm.global_max(fluid.mean_edge_length());
        if !(zone_size.is_finite() && zone_size > 0.0) {
            return Err(CouplingError::setup(format!(
                "fluid zone '{}' has no edges of positive length",
                settings.fluid_zone
            )));
        }
        let state = CouplingState::new(fluid.n_points(), solid.n_points(), solid.n_faces());
        let tracker = InterfaceGeometryTracker::new(solid.clone(), fluid.n_points());
        info!(
            flow = flow.name(),
            stress = stress.name(),
            scheme = settings.scheme.name(),
            fluid_points = fluid.n_points(),
            solid_points = solid.n_points(),
            zone_size,
            "fluid-structure interface created"
        );

        Ok(Self {
            scheme: build_scheme(&settings),
            fluid_to_solid: InterpolatorCache::new(settings.interpolation.clone()),
            solid_to_fluid: InterpolatorCache::new(settings.interpolation.clone()),
            flow,
            stress,
            comm,
            settings,
            fluid_zone,
            fluid_patch,
            solid_zone,
            solid_patch,
            zone_size,
            tracker,
            state,
            time_step: None,
            rebuilt_this_step: false,
        })
    }

    /// Single-process interface.
    pub fn serial(
        flow: Box<dyn FlowModel>,
        stress: Box<dyn StressModel>,
        settings: CouplingSettings,
    ) -> CouplingResult<Self> {
        Self::new(flow, stress, settings, Arc::new(SerialComm))
    }

    pub fn flow(&self) -> &dyn FlowModel {
        self.flow.as_ref()
    }

    pub fn flow_mut(&mut self) -> &mut dyn FlowModel {
        self.flow.as_mut()
    }

    pub fn stress(&self) -> &dyn StressModel {
        self.stress.as_ref()
    }

    pub fn stress_mut(&mut self) -> &mut dyn StressModel {
        self.stress.as_mut()
    }

    pub fn comm(&self) -> &dyn Communicator {
        self.comm.as_ref()
    }

    pub fn settings(&self) -> &CouplingSettings {
        &self.settings
    }

    pub fn state(&self) -> &CouplingState {
        &self.state
    }

    pub fn tracker(&self) -> &InterfaceGeometryTracker {
        &self.tracker
    }

    pub fn fluid_zone(&self) -> ZoneId {
        self.fluid_zone
    }

    pub fn solid_zone(&self) -> ZoneId {
        self.solid_zone
    }

    /// Interpolator builds so far: (fluid to solid, solid to fluid).
    pub fn interpolator_builds(&self) -> (usize, usize) {
        (self.fluid_to_solid.builds(), self.solid_to_fluid.builds())
    }

    /// Zero the coupling fields and histories (restart).
    pub fn initialize_fields(&mut self) {
        self.state.initialize();
        self.scheme.reset();
        self.tracker.reset();
        self.fluid_to_solid.mark_stale();
        self.solid_to_fluid.mark_stale();
    }

    /// Fluid-to-solid interpolator at the geometry of its last build.
    pub fn fluid_to_solid_interpolator(&mut self) -> CouplingResult<Arc<ZoneInterpolator>> {
        self.refresh_interpolators()?;
        let solid = self.tracker.current_zone()?;
        let fluid = self.flow.zone(self.fluid_zone);
        Ok(self.fluid_to_solid.get_or_build(fluid, solid)?)
    }

    pub fn solid_to_fluid_interpolator(&mut self) -> CouplingResult<Arc<ZoneInterpolator>> {
        self.refresh_interpolators()?;
        let solid = self.tracker.current_zone()?;
        let fluid = self.flow.zone(self.fluid_zone);
        Ok(self.solid_to_fluid.get_or_build(solid, fluid)?)
    }

    /// Rebuild both directions from the same solid zone snapshot when either
    /// one is stale, and record that snapshot as the build state.
    fn refresh_interpolators(&mut self) -> CouplingResult<()> {
        if !(self.fluid_to_solid.is_stale() || self.solid_to_fluid.is_stale()) {
            return Ok(());
        }
        let solid = self.tracker.current_zone()?;
        let fluid = self.flow.zone(self.fluid_zone);
        self.fluid_to_solid.recompute(fluid, solid)?;
        self.solid_to_fluid.recompute(solid, fluid)?;
        self.tracker.mark_built();
        Ok(())
    }

    /// Invalidate both interpolators when the solid zone has deformed past the
    /// limit since the last build, or when the periodic update is due. They
    /// are rebuilt together on next use. Returns whether they were invalidated.
    pub fn update_interpolator(&mut self) -> bool {
        let deformation = self.tracker.deformation_since_build(self.comm.as_ref());
        let frequency = self.settings.interpolator_update_frequency;
        let periodic = frequency > 0
            && self
                .time_step
                .is_some_and(|step| step.index % frequency == 0);
        let deformed = deformation > self.settings.interface_deformation_limit;
        if !(periodic || deformed) {
            return false;
        }
        debug!(deformation, periodic, "interface interpolators marked stale");
        self.fluid_to_solid.mark_stale();
        self.solid_to_fluid.mark_stale();
        true
    }

    /// Prepare both models and the coupling state for a new time step.
    pub fn begin_time_step(&mut self, step: TimeStep) {
        self.time_step = Some(step);
        self.flow.begin_time_step(&step);
        self.stress.begin_time_step(&step);
        self.state.begin_time_step();
        self.scheme.begin_time_step();
        self.rebuilt_this_step = self.update_interpolator();
    }

    /// Run the outer iterations of the current time step.
    pub fn solve_time_step(&mut self) -> CouplingResult<StepReport> {
        let step = self.time_step.ok_or(CouplingError::InvalidArg {
            what: "solve_time_step called before begin_time_step",
        })?;

        if !self.settings.coupled {
            return self.solve_uncoupled(step);
        }

        if self.settings.predictor {
            self.predict_and_update_force()?;
            self.evolve_stress();
            let predicted = self.update_displacement()?;
            self.state.fluid_zone_points_displ = predicted;
        }

        let mut converged = false;
        let mut residual_norm = 0.0;
        for outer in 1..=self.settings.n_outer_corr {
            self.state.outer_corr = outer;
            self.move_fluid_mesh()?;
            self.evolve_flow();
            self.update_force()?;
            self.evolve_stress();
            let x_tilde = self.update_displacement()?;
            residual_norm = self.update_residual(&x_tilde)?;
            self.apply_scheme(&x_tilde)?;

            info!(
                step = step.index,
                outer,
                residual = residual_norm,
                omega = self.scheme.relaxation_factor(),
                "fsi outer iteration"
            );
            if residual_norm <= self.settings.outer_corr_tolerance {
                converged = true;
                break;
            }
        }
        if !converged {
            warn!(
                step = step.index,
                iterations = self.state.outer_corr,
                residual = residual_norm,
                tolerance = self.settings.outer_corr_tolerance,
                "fsi outer iterations did not converge"
            );
        }

        self.end_time_step()?;
        Ok(StepReport {
            index: step.index,
            time: step.time,
            outer_iterations: self.state.outer_corr,
            converged,
            residual_norm: Some(residual_norm),
            max_residual_norm: Some(self.state.max_residual_norm),
            relaxation_factor: Some(self.scheme.relaxation_factor()),
            interpolator_rebuilt: self.rebuilt_this_step,
        })
    }

    /// `begin_time_step` followed by `solve_time_step`.
    pub fn advance(&mut self, step: TimeStep) -> CouplingResult<StepReport> {
        self.begin_time_step(step);
        self.solve_time_step()
    }

    /// One pass flow → loads → stress, no mesh motion or residual.
    fn solve_uncoupled(&mut self, step: TimeStep) -> CouplingResult<StepReport> {
        self.state.outer_corr = 1;
        self.evolve_flow();
        self.update_force()?;
        self.evolve_stress();
        self.update_solid_displacement()?;
        self.state.record_converged_loads();
        info!(step = step.index, "uncoupled fsi step");
        Ok(StepReport {
            index: step.index,
            time: step.time,
            outer_iterations: 1,
            converged: true,
            residual_norm: None,
            max_residual_norm: None,
            relaxation_factor: None,
            interpolator_rebuilt: self.rebuilt_this_step,
        })
    }

    fn end_time_step(&mut self) -> CouplingResult<()> {
        self.state.record_converged_loads();
        let increment = sub(
            &self.state.fluid_zone_points_displ,
            &self.state.fluid_zone_points_displ_ref,
        );
        self.tracker.accumulate_fluid_displacement(&increment)
    }

    /// Move the fluid interface to the current displacement guess.
    pub fn move_fluid_mesh(&mut self) -> CouplingResult<()> {
        let _timer = coupling_timing::MESH_MOTION.start();
        ensure_vectors_finite(&self.state.fluid_zone_points_displ, "fluid zone displacement")?;
        self.flow
            .move_mesh(self.fluid_zone, &self.state.fluid_zone_points_displ)?;
        Ok(())
    }

    fn evolve_flow(&mut self) {
        let _timer = coupling_timing::FLOW_EVOLVE.start();
        let status = self.flow.evolve();
        log_status(self.flow.name(), &status);
    }

    fn evolve_stress(&mut self) {
        let _timer = coupling_timing::STRESS_EVOLVE.start();
        let status = self.stress.evolve();
        log_status(self.stress.name(), &status);
    }

    /// Transfer fluid loads onto the solid zone and apply them.
    pub fn update_force(&mut self) -> CouplingResult<()> {
        let interp = self.fluid_to_solid_interpolator()?;
        match self.settings.force_coupling {
            ForceCoupling::Strong => {
                let fluid = self.flow.patch_traction(self.fluid_patch, self.fluid_zone);
                check_len(&fluid, interp.n_source_faces(), "fluid zone traction")?;
                let traction = interp.interpolate_faces_vector(&fluid, Transfer::AreaWeighted)?;
                self.state.set_traction(traction)?;
            }
            ForceCoupling::Weak => {
                let pressure = self.flow.patch_pressure(self.fluid_patch, self.fluid_zone);
                let viscous = self
                    .flow
                    .patch_viscous_traction(self.fluid_patch, self.fluid_zone);
                let pressure = interp.interpolate_faces_scalar(&pressure, Transfer::AreaWeighted)?;
                let viscous = interp.interpolate_faces_vector(&viscous, Transfer::AreaWeighted)?;
                self.state.set_pressure(pressure)?;
                self.state.set_traction(viscous)?;
            }
        }
        self.apply_loads()
    }

    /// Seed the solid loads for a new step before the first outer iteration.
    pub fn predict_and_update_force(&mut self) -> CouplingResult<()> {
        let traction = self
            .stress
            .predict_traction(self.solid_patch, self.solid_zone)
            .unwrap_or_else(|| self.state.extrapolated_traction());
        self.state.set_traction(traction)?;
        if self.settings.force_coupling == ForceCoupling::Weak {
            let pressure = self
                .stress
                .predict_pressure(self.solid_patch, self.solid_zone)
                .unwrap_or_else(|| self.state.extrapolated_pressure());
            self.state.set_pressure(pressure)?;
        }
        debug!(
            converged_steps = self.state.converged_steps(),
            "solid loads predicted"
        );
        self.apply_loads()
    }

    fn apply_loads(&mut self) -> CouplingResult<()> {
        if self.settings.force_coupling == ForceCoupling::Weak {
            self.stress.set_pressure(
                self.solid_patch,
                self.solid_zone,
                &self.state.solid_zone_pressure,
            )?;
        }
        self.stress.set_traction(
            self.solid_patch,
            self.solid_zone,
            &self.state.solid_zone_traction,
        )
    }

    /// Pull the solid zone displacement from the stress model.
    fn update_solid_displacement(&mut self) -> CouplingResult<()> {
        let displacement = self.stress.zone_point_displacement(self.solid_zone);
        check_len(
            &displacement,
            self.state.solid_zone_points_displ.len(),
            "solid zone point displacement",
        )?;
        self.tracker.update_displacement(&displacement)?;
        self.state.solid_zone_points_displ = displacement;
        Ok(())
    }

    /// Solid displacement mapped onto the fluid zone points (`x̃`).
    pub fn update_displacement(&mut self) -> CouplingResult<Vec<Vec3>> {
        self.update_solid_displacement()?;
        let interp = self.solid_to_fluid_interpolator()?;
        Ok(interp.interpolate_points_vector(&self.state.solid_zone_points_displ)?)
    }

    /// Store `r = x̃ − x` and return its scaled norm.
    pub fn update_residual(&mut self, x_tilde: &[Vec3]) -> CouplingResult<Real> {
        let x = &self.state.fluid_zone_points_displ;
        check_len(x_tilde, x.len(), "solid displacement on fluid zone")?;
        let residual = sub(x_tilde, x);
        let motion = global_max_mag(
            self.comm.as_ref(),
            &sub(x, &self.state.fluid_zone_points_displ_ref),
        );
        let norm = global_norm(self.comm.as_ref(), &residual)
            / self.settings.residual_scale.value(motion, self.zone_size);
        self.state.set_residual(residual)?;
        self.state.max_residual_norm = self.state.max_residual_norm.max(norm);
        Ok(norm)
    }

    fn apply_scheme(&mut self, x_tilde: &[Vec3]) -> CouplingResult<()> {
        let residual = self.state.residual.as_deref().ok_or(CouplingError::InvalidArg {
            what: "scheme update before the first residual",
        })?;
        let _timer = coupling_timing::SCHEME_UPDATE.start();
        let next = self.scheme.update(
            self.comm.as_ref(),
            &self.state.fluid_zone_points_displ,
            x_tilde,
            residual,
        )?;
        self.state.fluid_zone_points_displ_prev =
            std::mem::replace(&mut self.state.fluid_zone_points_displ, next);
        Ok(())
    }
}

fn log_status(model: &str, status: &SolveStatus) {
    if status.converged {
        debug!(
            model,
            iterations = status.iterations,
            residual = status.residual,
            "model solve"
        );
    } else {
        warn!(
            model,
            iterations = status.iterations,
            residual = status.residual,
            "model solve did not converge"
        );
    }
}
