//! Registry of the reference models under their configuration type names.

use fsi_coupling::{FlowModel, ModelRegistry, ModelSpec, StressModel};

use crate::chamber::{ChamberParams, CompliantChamber};
use crate::foundation::{ElasticFoundation, FoundationParams};

pub const COMPLIANT_CHAMBER: &str = "compliant_chamber";
pub const ELASTIC_FOUNDATION: &str = "elastic_foundation";

/// Registry with every model this crate provides.
pub fn builtin_registry() -> ModelRegistry {
    let mut registry = ModelRegistry::new();
    register_builtin(&mut registry);
    registry
}

/// Add the reference models to an existing registry.
pub fn register_builtin(registry: &mut ModelRegistry) {
    registry.register_flow(COMPLIANT_CHAMBER, |spec: &ModelSpec| {
        let params: ChamberParams = spec.params_as()?;
        let model = CompliantChamber::new(COMPLIANT_CHAMBER, params)
            .map_err(|e| e.into_coupling(COMPLIANT_CHAMBER))?;
        Ok(Box::new(model) as Box<dyn FlowModel>)
    });
    registry.register_stress(ELASTIC_FOUNDATION, |spec: &ModelSpec| {
        let params: FoundationParams = spec.params_as()?;
        let model = ElasticFoundation::new(ELASTIC_FOUNDATION, params)
            .map_err(|e| e.into_coupling(ELASTIC_FOUNDATION))?;
        Ok(Box::new(model) as Box<dyn StressModel>)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_types_are_listed() {
        let registry = builtin_registry();
        assert_eq!(registry.flow_types(), vec![COMPLIANT_CHAMBER]);
        assert_eq!(registry.stress_types(), vec![ELASTIC_FOUNDATION]);
    }

    #[test]
    fn parameters_come_from_the_spec() {
        let registry = builtin_registry();
        let spec: ModelSpec = serde_yaml::from_str(
            "type: compliant_chamber\nparams:\n  pressure: 250.0\n  geometry:\n    zone_name: wall\n    nu: 3\n    nv: 2\n",
        )
        .unwrap();
        let flow = registry.create_flow(&spec).unwrap();
        let zone = flow.find_zone("wall").unwrap();
        assert_eq!(flow.zone(zone).n_faces(), 6);
        assert!(flow.find_zone("interface").is_none());
    }

    #[test]
    fn bad_parameters_name_the_model() {
        let registry = builtin_registry();
        let spec: ModelSpec =
            serde_yaml::from_str("type: elastic_foundation\nparams:\n  thickness: -1.0\n").unwrap();
        let err = registry.create_stress(&spec).err().unwrap();
        assert!(err.to_string().contains(ELASTIC_FOUNDATION));
    }
}
