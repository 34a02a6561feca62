//! Conversion of validated properties into runtime settings.

use std::str::FromStr;
use std::sync::Arc;

use fsi_core::units::{m, s};
use fsi_core::{Communicator, SerialComm, Vec3};
use fsi_coupling::{
    AitkenSettings, CouplingSchemeKind, CouplingSettings, FluidStructureInterface,
    ForceCoupling, IqnSettings, ModelRegistry, ProbeOptions, ResidualScale, RunOptions,
};
use fsi_interp::{InterpolationMethod, InterpolationSettings};

use crate::schema::{ForceCouplingDef, FsiProperties, ResidualScaleDef};
use crate::validate::{ValidationError, validate_models, validate_properties};
use crate::{ConfigError, ConfigResult};

impl FsiProperties {
    /// Coupling loop settings.
    pub fn to_settings(&self) -> ConfigResult<CouplingSettings> {
        validate_properties(self)?;
        let c = &self.coupling;
        let i = &self.interpolation;

        let scheme = CouplingSchemeKind::from_str(&c.scheme)?;
        let method = InterpolationMethod::from_str(&i.method).map_err(|e| {
            ValidationError::InvalidValue {
                field: "interpolation.method".to_string(),
                value: i.method.clone(),
                reason: e.to_string(),
            }
        })?;

        let settings = CouplingSettings {
            fluid_zone: self.interface.fluid_zone.clone(),
            fluid_patch: self.interface.fluid_patch.clone(),
            solid_zone: self.interface.solid_zone.clone(),
            solid_patch: self.interface.solid_patch.clone(),
            scheme,
            relaxation_factor: c.relaxation_factor,
            aitken: AitkenSettings {
                initial_factor: c.aitken.initial_factor,
                min_factor: c.aitken.min_factor,
                max_factor: c.aitken.max_factor,
            },
            iqn: IqnSettings {
                regularisation: c.iqn.regularisation,
                filter_tolerance: c.iqn.filter_tolerance,
            },
            coupling_reuse: c.coupling_reuse,
            outer_corr_tolerance: c.outer_corr_tolerance,
            n_outer_corr: c.n_outer_corr,
            coupled: c.coupled,
            predictor: c.predictor,
            force_coupling: match c.force_coupling {
                ForceCouplingDef::Strong => ForceCoupling::Strong,
                ForceCouplingDef::Weak => ForceCoupling::Weak,
            },
            residual_scale: match c.residual_scale {
                ResidualScaleDef::ZoneSize => ResidualScale::ZoneSize,
                ResidualScaleDef::InterfaceMotion => ResidualScale::InterfaceMotion,
                ResidualScaleDef::Fixed { length_m } => ResidualScale::Fixed(m(length_m)),
            },
            interpolator_update_frequency: i.update_frequency,
            interface_deformation_limit: i.deformation_limit,
            interpolation: InterpolationSettings {
                method,
                search_tolerance: i.search_tolerance,
                inside_tolerance: i.inside_tolerance,
                projection_neighbours: i.projection_neighbours,
                degenerate_area: i.degenerate_area,
                min_normal_alignment: i.min_normal_alignment,
                nearest_fallback: i.nearest_fallback,
            },
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Time loop options, including the probe.
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            dt: s(self.run.dt_s),
            t_end: s(self.run.t_end_s),
            max_steps: self.run.max_steps,
            probe: self.probe.as_ref().map(|p| ProbeOptions {
                location: Vec3::from(p.location_m),
                record_velocity: p.write_velocity,
            }),
        }
    }

    /// Create both models from `registry` and couple them.
    pub fn build_interface(
        &self,
        registry: &ModelRegistry,
        comm: Arc<dyn Communicator>,
    ) -> ConfigResult<FluidStructureInterface> {
        let settings = self.to_settings()?;
        validate_models(self, registry)?;
        let flow = registry.create_flow(&self.flow)?;
        let stress = registry.create_stress(&self.stress)?;
        FluidStructureInterface::new(flow, stress, settings, comm).map_err(ConfigError::from)
    }

    /// Single-process `build_interface`.
    pub fn build_serial_interface(
        &self,
        registry: &ModelRegistry,
    ) -> ConfigResult<FluidStructureInterface> {
        self.build_interface(registry, Arc::new(SerialComm))
    }
}
