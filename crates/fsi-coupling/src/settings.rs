//! Coupling loop settings.

use fsi_core::units::{Length, meters};
use fsi_core::Real;
use fsi_interp::InterpolationSettings;

use crate::error::{CouplingError, CouplingResult};

/// Interface displacement update scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CouplingSchemeKind {
    /// `x ← x + ω r` with a constant factor.
    FixedRelaxation,
    /// Relaxation factor adapted from consecutive residuals.
    #[default]
    Aitken,
    /// Interface quasi-Newton with inverse Jacobian from least squares.
    IqnIls,
}

impl CouplingSchemeKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::FixedRelaxation => "FixedRelaxation",
            Self::Aitken => "Aitken",
            Self::IqnIls => "IQN-ILS",
        }
    }
}

impl std::str::FromStr for CouplingSchemeKind {
    type Err = CouplingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "fixedrelaxation" | "fixed" => Ok(Self::FixedRelaxation),
            "aitken" => Ok(Self::Aitken),
            "iqnils" => Ok(Self::IqnIls),
            _ => Err(CouplingError::setup(format!(
                "unknown coupling scheme '{s}' (expected FixedRelaxation, Aitken or IQN-ILS)"
            ))),
        }
    }
}

/// How fluid loads are handed to the solid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ForceCoupling {
    /// Full traction vector in one transfer.
    #[default]
    Strong,
    /// Pressure and viscous traction transferred separately.
    Weak,
}

/// Normalisation of the residual norm in the convergence test.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ResidualScale {
    /// Divide by a fixed length.
    Fixed(Length),
    /// Divide by the mean edge length of the fluid zone, taken at setup.
    #[default]
    ZoneSize,
    /// Divide by the largest interface motion in the current step, floored
    /// by the fluid zone edge length so a resting interface stays scaled.
    InterfaceMotion,
}

impl ResidualScale {
    /// Scale for the given maximal motion since the start of the step and
    /// the setup-time fluid zone edge length.
    pub fn value(&self, max_motion: Real, zone_size: Real) -> Real {
        match self {
            Self::Fixed(length) => meters(*length),
            Self::ZoneSize => zone_size,
            Self::InterfaceMotion => max_motion.max(zone_size),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AitkenSettings {
    /// Factor used at the first outer iteration of every step.
    pub initial_factor: Real,
    pub min_factor: Real,
    pub max_factor: Real,
}

impl Default for AitkenSettings {
    fn default() -> Self {
        Self {
            initial_factor: 0.5,
            min_factor: 1e-3,
            max_factor: 10.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IqnSettings {
    /// Tikhonov term relative to the mean Gram diagonal.
    pub regularisation: Real,
    /// Columns whose part independent of the kept ones is below this
    /// fraction of their own norm are dropped.
    pub filter_tolerance: Real,
}

impl Default for IqnSettings {
    fn default() -> Self {
        Self {
            regularisation: 1e-12,
            filter_tolerance: 1e-6,
        }
    }
}

/// Everything the orchestrator needs apart from the two models.
#[derive(Clone, Debug)]
pub struct CouplingSettings {
    pub fluid_zone: String,
    pub fluid_patch: String,
    pub solid_zone: String,
    pub solid_patch: String,

    pub scheme: CouplingSchemeKind,
    /// Fixed relaxation factor; also the first IQN-ILS step.
    pub relaxation_factor: Real,
    pub aitken: AitkenSettings,
    pub iqn: IqnSettings,
    /// Past time steps whose IQN-ILS columns are kept.
    pub coupling_reuse: usize,

    pub outer_corr_tolerance: Real,
    pub n_outer_corr: usize,
    pub coupled: bool,
    pub predictor: bool,
    pub force_coupling: ForceCoupling,
    pub residual_scale: ResidualScale,

    /// Rebuild the interpolators every this many steps (0 disables).
    pub interpolator_update_frequency: usize,
    /// Rebuild when the solid zone moved more than this fraction of the
    /// local minimum edge length since the last build.
    pub interface_deformation_limit: Real,
    pub interpolation: InterpolationSettings,
}

impl Default for CouplingSettings {
    fn default() -> Self {
        Self {
            fluid_zone: "interface".to_string(),
            fluid_patch: "interface".to_string(),
            solid_zone: "interface".to_string(),
            solid_patch: "interface".to_string(),
            scheme: CouplingSchemeKind::default(),
            relaxation_factor: 0.5,
            aitken: AitkenSettings::default(),
            iqn: IqnSettings::default(),
            coupling_reuse: 0,
            outer_corr_tolerance: 1e-6,
            n_outer_corr: 20,
            coupled: true,
            predictor: false,
            force_coupling: ForceCoupling::default(),
            residual_scale: ResidualScale::default(),
            interpolator_update_frequency: 0,
            interface_deformation_limit: 0.1,
            interpolation: InterpolationSettings::default(),
        }
    }
}

impl CouplingSettings {
    pub fn validate(&self) -> CouplingResult<()> {
        let positive = |v: Real, what: &str| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(CouplingError::setup(format!("{what} must be positive, got {v}")))
            }
        };
        positive(self.relaxation_factor, "relaxationFactor")?;
        positive(self.aitken.initial_factor, "aitken initial factor")?;
        positive(self.aitken.min_factor, "aitken min factor")?;
        positive(self.outer_corr_tolerance, "outerCorrTolerance")?;
        positive(self.interface_deformation_limit, "interfaceDeformationLimit")?;
        if self.aitken.min_factor > self.aitken.max_factor {
            return Err(CouplingError::setup(format!(
                "aitken factor bounds are inverted: [{}, {}]",
                self.aitken.min_factor, self.aitken.max_factor
            )));
        }
        if self.iqn.regularisation < 0.0 || self.iqn.filter_tolerance < 0.0 {
            return Err(CouplingError::setup(
                "IQN-ILS regularisation and filter tolerance must be non-negative",
            ));
        }
        if self.n_outer_corr == 0 {
            return Err(CouplingError::setup("nOuterCorr must be at least 1"));
        }
        if let ResidualScale::Fixed(length) = self.residual_scale {
            positive(meters(length), "residual scale length")?;
        }
        self.interpolation
            .validate()
            .map_err(|e| CouplingError::setup(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsi_core::units::m;

    #[test]
    fn scheme_names_parse() {
        for (name, kind) in [
            ("FixedRelaxation", CouplingSchemeKind::FixedRelaxation),
            ("aitken", CouplingSchemeKind::Aitken),
            ("IQN-ILS", CouplingSchemeKind::IqnIls),
            ("iqn_ils", CouplingSchemeKind::IqnIls),
        ] {
            assert_eq!(name.parse::<CouplingSchemeKind>().unwrap(), kind);
        }
        let err = "Newton".parse::<CouplingSchemeKind>().unwrap_err();
        assert!(err.to_string().contains("Newton"));
    }

    #[test]
    fn residual_scale_values() {
        assert_eq!(ResidualScale::Fixed(m(2.0)).value(5.0, 0.1), 2.0);
        assert_eq!(ResidualScale::default(), ResidualScale::ZoneSize);
        assert_eq!(ResidualScale::ZoneSize.value(5.0, 0.1), 0.1);
        assert_eq!(ResidualScale::InterfaceMotion.value(0.5, 0.1), 0.5);
        // a resting interface falls back to the zone size
        assert_eq!(ResidualScale::InterfaceMotion.value(0.0, 0.1), 0.1);
    }

    #[test]
    fn validation() {
        assert!(CouplingSettings::default().validate().is_ok());
        let bad = CouplingSettings {
            n_outer_corr: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let inverted = CouplingSettings {
            aitken: AitkenSettings {
                min_factor: 2.0,
                max_factor: 1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }
}
