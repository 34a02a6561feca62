//! Fixed and Aitken-adaptive under-relaxation.

use fsi_core::comm::global_dot;
use fsi_core::{Communicator, Real, SMALL, Vec3, check_len, sub};
use tracing::debug;

use crate::error::CouplingResult;
use crate::scheme::{CouplingScheme, relaxed};
use crate::settings::{AitkenSettings, CouplingSchemeKind};

/// `x_{k+1} = x_k + ω (x̃_k − x_k)` with constant ω.
#[derive(Clone, Debug)]
pub struct FixedRelaxation {
    omega: Real,
}

impl FixedRelaxation {
    pub fn new(omega: Real) -> Self {
        Self { omega }
    }
}

impl CouplingScheme for FixedRelaxation {
    fn kind(&self) -> CouplingSchemeKind {
        CouplingSchemeKind::FixedRelaxation
    }

    fn begin_time_step(&mut self) {}

    fn update(
        &mut self,
        _comm: &dyn Communicator,
        x: &[Vec3],
        _x_tilde: &[Vec3],
        residual: &[Vec3],
    ) -> CouplingResult<Vec<Vec3>> {
        check_len(residual, x.len(), "fsi residual")?;
        Ok(relaxed(x, residual, self.omega))
    }

    fn relaxation_factor(&self) -> Real {
        self.omega
    }

    fn reset(&mut self) {}
}

/// Aitken Δ² relaxation.
///
/// `ω_k = −ω_{k−1} (r_{k−1}·(r_k − r_{k−1})) / |r_k − r_{k−1}|²`, clamped to
/// the configured bounds and restarted from the initial factor every step.
#[derive(Clone, Debug)]
pub struct Aitken {
    settings: AitkenSettings,
    omega: Real,
    residual_prev: Option<Vec<Vec3>>,
}

impl Aitken {
    pub fn new(settings: AitkenSettings) -> Self {
        let omega = settings.initial_factor;
        Self {
            settings,
            omega,
            residual_prev: None,
        }
    }
}

impl CouplingScheme for Aitken {
    fn kind(&self) -> CouplingSchemeKind {
        CouplingSchemeKind::Aitken
    }

    fn begin_time_step(&mut self) {
        self.omega = self.settings.initial_factor;
        self.residual_prev = None;
    }

    fn update(
        &mut self,
        comm: &dyn Communicator,
        x: &[Vec3],
        _x_tilde: &[Vec3],
        residual: &[Vec3],
    ) -> CouplingResult<Vec<Vec3>> {
        check_len(residual, x.len(), "fsi residual")?;
        if let Some(prev) = &self.residual_prev {
            let delta = sub(residual, prev);
            let denom = global_dot(comm, &delta, &delta);
            if denom > SMALL {
                let num = global_dot(comm, prev, &delta);
                let omega = -self.omega * num / denom;
                self.omega = omega.clamp(self.settings.min_factor, self.settings.max_factor);
            }
        }
        debug!(omega = self.omega, "aitken relaxation factor");
        self.residual_prev = Some(residual.to_vec());
        Ok(relaxed(x, residual, self.omega))
    }

    fn relaxation_factor(&self) -> Real {
        self.omega
    }

    fn reset(&mut self) {
        self.begin_time_step();
    }
}
