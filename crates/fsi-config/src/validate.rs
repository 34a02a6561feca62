//! Properties validation.

use std::str::FromStr;

use fsi_coupling::{CouplingSchemeKind, ModelRegistry};
use fsi_interp::InterpolationMethod;

use crate::schema::{CURRENT_VERSION, FsiProperties, ResidualScaleDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive and finite"))
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be non-negative and finite"))
    }
}

fn non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(invalid(field, "''", "must not be empty"))
    } else {
        Ok(())
    }
}

pub fn validate_properties(props: &FsiProperties) -> Result<(), ValidationError> {
    if props.version == 0 || props.version > CURRENT_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: props.version,
        });
    }

    let interface = &props.interface;
    non_empty("interface.fluid_zone", &interface.fluid_zone)?;
    non_empty("interface.fluid_patch", &interface.fluid_patch)?;
    non_empty("interface.solid_zone", &interface.solid_zone)?;
    non_empty("interface.solid_patch", &interface.solid_patch)?;

    let coupling = &props.coupling;
    CouplingSchemeKind::from_str(&coupling.scheme)
        .map_err(|_| invalid("coupling.scheme", &coupling.scheme, "unknown coupling scheme"))?;
    positive("coupling.relaxation_factor", coupling.relaxation_factor)?;
    positive("coupling.aitken.initial_factor", coupling.aitken.initial_factor)?;
    positive("coupling.aitken.min_factor", coupling.aitken.min_factor)?;
    positive("coupling.aitken.max_factor", coupling.aitken.max_factor)?;
    if coupling.aitken.min_factor > coupling.aitken.max_factor {
        return Err(invalid(
            "coupling.aitken.min_factor",
            coupling.aitken.min_factor,
            "must not exceed max_factor",
        ));
    }
    non_negative("coupling.iqn.regularisation", coupling.iqn.regularisation)?;
    non_negative("coupling.iqn.filter_tolerance", coupling.iqn.filter_tolerance)?;
    positive("coupling.outer_corr_tolerance", coupling.outer_corr_tolerance)?;
    if coupling.n_outer_corr == 0 {
        return Err(invalid("coupling.n_outer_corr", 0, "must be at least 1"));
    }
    if let ResidualScaleDef::Fixed { length_m } = coupling.residual_scale {
        positive("coupling.residual_scale.length_m", length_m)?;
    }

    let interp = &props.interpolation;
    InterpolationMethod::from_str(&interp.method).map_err(|_| {
        invalid(
            "interpolation.method",
            &interp.method,
            "expected 'ggi' or 'projection'",
        )
    })?;
    positive("interpolation.deformation_limit", interp.deformation_limit)?;
    positive("interpolation.search_tolerance", interp.search_tolerance)?;
    non_negative("interpolation.inside_tolerance", interp.inside_tolerance)?;
    non_negative("interpolation.degenerate_area", interp.degenerate_area)?;
    if interp.projection_neighbours == 0 {
        return Err(invalid(
            "interpolation.projection_neighbours",
            0,
            "must be at least 1",
        ));
    }
    if !(0.0..=1.0).contains(&interp.min_normal_alignment) {
        return Err(invalid(
            "interpolation.min_normal_alignment",
            interp.min_normal_alignment,
            "must lie in [0, 1]",
        ));
    }

    non_empty("flow.type", &props.flow.type_name)?;
    non_empty("stress.type", &props.stress.type_name)?;

    positive("run.dt_s", props.run.dt_s)?;
    non_negative("run.t_end_s", props.run.t_end_s)?;
    if props.run.max_steps == 0 {
        return Err(invalid("run.max_steps", 0, "must be at least 1"));
    }

    if let Some(probe) = &props.probe
        && probe.location_m.iter().any(|c| !c.is_finite())
    {
        return Err(invalid(
            "probe.location_m",
            format!("{:?}", probe.location_m),
            "coordinates must be finite",
        ));
    }

    Ok(())
}

/// Check that both model types are known to `registry`.
pub fn validate_models(
    props: &FsiProperties,
    registry: &ModelRegistry,
) -> Result<(), ValidationError> {
    if !registry.flow_types().contains(&props.flow.type_name.as_str()) {
        return Err(ValidationError::MissingReference {
            id: props.flow.type_name.clone(),
            context: format!("flow model types ({})", registry.flow_types().join(", ")),
        });
    }
    if !registry
        .stress_types()
        .contains(&props.stress.type_name.as_str())
    {
        return Err(ValidationError::MissingReference {
            id: props.stress.type_name.clone(),
            context: format!(
                "stress model types ({})",
                registry.stress_types().join(", ")
            ),
        });
    }
    Ok(())
}
