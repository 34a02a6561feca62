//! Interface displacement update schemes.

use fsi_core::{Communicator, Real, Vec3};

use crate::error::CouplingResult;
use crate::iqn_ils::IqnIls;
use crate::relaxation::{Aitken, FixedRelaxation};
use crate::settings::{CouplingSchemeKind, CouplingSettings};

/// Produces the next interface displacement guess from the current guess
/// `x`, the solid response `x̃` mapped to the fluid zone and the residual
/// `r = x̃ − x`.
///
/// Every scalar that influences the update is reduced through the
/// communicator, so all processes produce consistent guesses.
pub trait CouplingScheme: Send {
    fn kind(&self) -> CouplingSchemeKind;

    /// Called before the first outer iteration of each time step.
    fn begin_time_step(&mut self);

    fn update(
        &mut self,
        comm: &dyn Communicator,
        x: &[Vec3],
        x_tilde: &[Vec3],
        residual: &[Vec3],
    ) -> CouplingResult<Vec<Vec3>>;

    /// Relaxation factor applied by the last update, for reporting.
    fn relaxation_factor(&self) -> Real;

    /// Forget all history (restart).
    fn reset(&mut self);
}

pub fn build_scheme(settings: &CouplingSettings) -> Box<dyn CouplingScheme> {
    match settings.scheme {
        CouplingSchemeKind::FixedRelaxation => {
            Box::new(FixedRelaxation::new(settings.relaxation_factor))
        }
        CouplingSchemeKind::Aitken => Box::new(Aitken::new(settings.aitken.clone())),
        CouplingSchemeKind::IqnIls => Box::new(IqnIls::new(
            settings.relaxation_factor,
            settings.coupling_reuse,
            settings.iqn.clone(),
        )),
    }
}

/// `x + ω r`
pub(crate) fn relaxed(x: &[Vec3], residual: &[Vec3], omega: Real) -> Vec<Vec3> {
    x.iter().zip(residual).map(|(xi, ri)| xi + omega * ri).collect()
}
