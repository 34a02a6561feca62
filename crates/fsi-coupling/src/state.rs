//! Interface fields carried between outer iterations and time steps.

use fsi_core::{Real, Vec3, check_len, zero_vectors};

use crate::error::CouplingResult;

/// Coupling state owned by the orchestrator.
///
/// Fluid-side fields are sized by the fluid zone point count, solid-side
/// point fields by the solid zone point count and solid-side loads by the
/// solid zone face count.
#[derive(Clone, Debug)]
pub struct CouplingState {
    /// Current displacement guess for the fluid zone points.
    pub fluid_zone_points_displ: Vec<Vec3>,
    /// Guess of the previous outer iteration.
    pub fluid_zone_points_displ_prev: Vec<Vec3>,
    /// Converged displacement at the start of the step.
    pub fluid_zone_points_displ_ref: Vec<Vec3>,

    pub solid_zone_points_displ: Vec<Vec3>,
    pub solid_zone_points_displ_ref: Vec<Vec3>,

    pub solid_zone_pressure: Vec<Real>,
    pub solid_zone_traction: Vec<Vec3>,
    pub solid_zone_traction_prev: Vec<Vec3>,

    /// `x̃ − x` of the latest outer iteration; none before the first one.
    pub residual: Option<Vec<Vec3>>,
    pub residual_prev: Option<Vec<Vec3>>,
    pub max_residual_norm: Real,
    pub outer_corr: usize,

    /// Converged loads of the last two steps, newest first.
    converged_traction: [Option<Vec<Vec3>>; 2],
    converged_pressure: [Option<Vec<Real>>; 2],
}

impl CouplingState {
    pub fn new(n_fluid_points: usize, n_solid_points: usize, n_solid_faces: usize) -> Self {
        Self {
            fluid_zone_points_displ: zero_vectors(n_fluid_points),
            fluid_zone_points_displ_prev: zero_vectors(n_fluid_points),
            fluid_zone_points_displ_ref: zero_vectors(n_fluid_points),
            solid_zone_points_displ: zero_vectors(n_solid_points),
            solid_zone_points_displ_ref: zero_vectors(n_solid_points),
            solid_zone_pressure: vec![0.0; n_solid_faces],
            solid_zone_traction: zero_vectors(n_solid_faces),
            solid_zone_traction_prev: zero_vectors(n_solid_faces),
            residual: None,
            residual_prev: None,
            max_residual_norm: 0.0,
            outer_corr: 0,
            converged_traction: [None, None],
            converged_pressure: [None, None],
        }
    }

    /// Zero every field and forget the load history.
    pub fn initialize(&mut self) {
        *self = Self::new(
            self.fluid_zone_points_displ.len(),
            self.solid_zone_points_displ.len(),
            self.solid_zone_traction.len(),
        );
    }

    /// Snapshot the converged displacements as the new step's reference and
    /// clear the per-step residual bookkeeping.
    pub fn begin_time_step(&mut self) {
        self.fluid_zone_points_displ_ref
            .clone_from(&self.fluid_zone_points_displ);
        self.fluid_zone_points_displ_prev
            .clone_from(&self.fluid_zone_points_displ);
        self.solid_zone_points_displ_ref
            .clone_from(&self.solid_zone_points_displ);
        self.residual = None;
        self.residual_prev = None;
        self.max_residual_norm = 0.0;
        self.outer_corr = 0;
    }

    /// Install a new residual, shifting the current one to `residual_prev`.
    pub fn set_residual(&mut self, residual: Vec<Vec3>) -> CouplingResult<()> {
        check_len(&residual, self.fluid_zone_points_displ.len(), "fsi residual")?;
        self.residual_prev = self.residual.replace(residual);
        Ok(())
    }

    /// Install a new traction, shifting the current one to
    /// `solid_zone_traction_prev`.
    pub fn set_traction(&mut self, traction: Vec<Vec3>) -> CouplingResult<()> {
        check_len(&traction, self.solid_zone_traction.len(), "solid zone traction")?;
        self.solid_zone_traction_prev = std::mem::replace(&mut self.solid_zone_traction, traction);
        Ok(())
    }

    pub fn set_pressure(&mut self, pressure: Vec<Real>) -> CouplingResult<()> {
        check_len(&pressure, self.solid_zone_pressure.len(), "solid zone pressure")?;
        self.solid_zone_pressure = pressure;
        Ok(())
    }

    /// Push the current loads into the converged history.
    pub fn record_converged_loads(&mut self) {
        let [newest, older] = &mut self.converged_traction;
        *older = newest.replace(self.solid_zone_traction.clone());
        let [newest, older] = &mut self.converged_pressure;
        *older = newest.replace(self.solid_zone_pressure.clone());
    }

    /// Number of steps in the converged load history (at most two).
    pub fn converged_steps(&self) -> usize {
        self.converged_traction.iter().flatten().count()
    }

    /// `2 t_n − t_{n−1}`, or `t_n` with a single converged step, or the
    /// current traction with none.
    pub fn extrapolated_traction(&self) -> Vec<Vec3> {
        match &self.converged_traction {
            [Some(tn), Some(tnm1)] => tn.iter().zip(tnm1).map(|(a, b)| 2.0 * *a - *b).collect(),
            [Some(tn), None] => tn.clone(),
            _ => self.solid_zone_traction.clone(),
        }
    }

    pub fn extrapolated_pressure(&self) -> Vec<Real> {
        match &self.converged_pressure {
            [Some(pn), Some(pnm1)] => pn.iter().zip(pnm1).map(|(a, b)| 2.0 * a - b).collect(),
            [Some(pn), None] => pn.clone(),
            _ => self.solid_zone_pressure.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residual_exists_only_after_first_iteration() {
        let mut state = CouplingState::new(3, 2, 1);
        assert!(state.residual.is_none());
        state.set_residual(vec![Vec3::x(); 3]).unwrap();
        state.set_residual(vec![Vec3::y(); 3]).unwrap();
        assert_eq!(state.residual_prev.as_ref().unwrap()[0], Vec3::x());
        assert!(state.set_residual(vec![Vec3::y(); 2]).is_err());

        state.begin_time_step();
        assert!(state.residual.is_none() && state.residual_prev.is_none());
    }

    #[test]
    fn traction_extrapolation() {
        let mut state = CouplingState::new(1, 1, 2);
        assert_eq!(state.extrapolated_traction(), vec![Vec3::zeros(); 2]);

        state.set_traction(vec![Vec3::x(); 2]).unwrap();
        state.record_converged_loads();
        assert_eq!(state.converged_steps(), 1);
        assert_eq!(state.extrapolated_traction(), vec![Vec3::x(); 2]);

        state.set_traction(vec![3.0 * Vec3::x(); 2]).unwrap();
        assert_eq!(state.solid_zone_traction_prev, vec![Vec3::x(); 2]);
        state.record_converged_loads();
        assert_eq!(state.extrapolated_traction(), vec![5.0 * Vec3::x(); 2]);
    }

    #[test]
    fn references_refresh_at_step_start() {
        let mut state = CouplingState::new(2, 2, 1);
        state.fluid_zone_points_displ = vec![Vec3::z(); 2];
        state.begin_time_step();
        assert_eq!(state.fluid_zone_points_displ_ref, vec![Vec3::z(); 2]);
        state.initialize();
        assert_eq!(state.fluid_zone_points_displ_ref, vec![Vec3::zeros(); 2]);
        assert_eq!(state.converged_steps(), 0);
    }
}
