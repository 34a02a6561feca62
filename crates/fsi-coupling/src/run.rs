//! Fixed-step time loop over a coupled interface.

use fsi_core::timing::coupling_timing;
use fsi_core::units::{Time, s, seconds};
use fsi_core::{Real, Vec3};
use tracing::info;

use crate::error::{CouplingError, CouplingResult};
use crate::history::{PointHistory, PointSample};
use crate::interface::{FluidStructureInterface, StepReport};
use crate::models::TimeStep;

/// Point probe requested for a run.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbeOptions {
    pub location: Vec3,
    pub record_velocity: bool,
}

/// Options for coupled runs.
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Fixed time step
    pub dt: Time,
    /// Final time
    pub t_end: Time,
    /// Maximum number of steps (safety limit)
    pub max_steps: usize,
    pub probe: Option<ProbeOptions>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dt: s(1e-3),
            t_end: s(0.01),
            max_steps: 100_000,
            probe: None,
        }
    }
}

impl RunOptions {
    pub fn validate(&self) -> CouplingResult<()> {
        if !(seconds(self.dt) > 0.0) {
            return Err(CouplingError::InvalidArg {
                what: "dt must be positive",
            });
        }
        if !(seconds(self.t_end) >= 0.0) {
            return Err(CouplingError::InvalidArg {
                what: "t_end must be non-negative",
            });
        }
        if self.max_steps == 0 {
            return Err(CouplingError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        Ok(())
    }
}

/// Per-step record of a coupled run.
#[derive(Clone, Debug, Default)]
pub struct FsiRecord {
    pub steps: Vec<StepReport>,
    pub probe: Vec<PointSample>,
}

impl FsiRecord {
    pub fn times(&self) -> Vec<Real> {
        self.steps.iter().map(|s| s.time).collect()
    }

    pub fn all_converged(&self) -> bool {
        self.steps.iter().all(|s| s.converged)
    }

    pub fn total_outer_iterations(&self) -> usize {
        self.steps.iter().map(|s| s.outer_iterations).sum()
    }
}

/// Progress reported after every step.
#[derive(Clone, Debug)]
pub struct FsiProgress {
    pub step: usize,
    pub time: Real,
    pub t_end: Real,
    pub fraction_complete: Real,
    pub outer_iterations: usize,
    pub residual_norm: Option<Real>,
    pub converged: bool,
}

/// Advance the coupled problem with fixed steps until `t_end` or
/// `max_steps`.
pub fn run_fsi(fsi: &mut FluidStructureInterface, opts: &RunOptions) -> CouplingResult<FsiRecord> {
    run_fsi_with_progress(fsi, opts, None)
}

pub fn run_fsi_with_progress(
    fsi: &mut FluidStructureInterface,
    opts: &RunOptions,
    mut progress_cb: Option<&mut dyn FnMut(FsiProgress)>,
) -> CouplingResult<FsiRecord> {
    opts.validate()?;
    let dt = seconds(opts.dt);
    let t_end = seconds(opts.t_end);

    let mut probe = match &opts.probe {
        Some(p) => Some(PointHistory::new(
            fsi.stress(),
            fsi.comm(),
            p.location,
            p.record_velocity,
        )?),
        None => None,
    };

    let mut record = FsiRecord::default();
    let mut t = 0.0;
    let mut step = 0;
    // half-step slack so round-off in t does not add a step
    while t + 0.5 * dt < t_end && step < opts.max_steps {
        step += 1;
        t = step as Real * dt;
        let report = fsi.advance(TimeStep { index: step, time: t, dt })?;

        if let Some(probe) = probe.as_mut() {
            probe.sample(fsi.stress(), fsi.comm(), t);
        }
        if let Some(cb) = progress_cb.as_mut() {
            cb(FsiProgress {
                step,
                time: t,
                t_end,
                fraction_complete: if t_end > 0.0 { (t / t_end).min(1.0) } else { 1.0 },
                outer_iterations: report.outer_iterations,
                residual_norm: report.residual_norm,
                converged: report.converged,
            });
        }
        record.steps.push(report);
    }

    info!(
        steps = record.steps.len(),
        outer_iterations = record.total_outer_iterations(),
        all_converged = record.all_converged(),
        "fsi run finished"
    );
    coupling_timing::print_summary();

    if let Some(probe) = probe {
        record.probe = probe.into_samples();
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_options_defaults() {
        let opts = RunOptions::default();
        assert_eq!(seconds(opts.dt), 1e-3);
        assert_eq!(opts.max_steps, 100_000);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn run_options_invalid() {
        let zero_dt = RunOptions {
            dt: s(0.0),
            ..Default::default()
        };
        assert!(zero_dt.validate().is_err());
        let negative_end = RunOptions {
            t_end: s(-1.0),
            ..Default::default()
        };
        assert!(negative_end.validate().is_err());
        let no_steps = RunOptions {
            max_steps: 0,
            ..Default::default()
        };
        assert!(no_steps.validate().is_err());
    }
}
