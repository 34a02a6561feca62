//! Runtime model selection by type name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::error::{CouplingError, CouplingResult};
use crate::models::{FlowModel, StressModel};

/// A model type name plus its free-form parameter block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub params: serde_yaml::Value,
}

impl ModelSpec {
    pub fn new(type_name: impl Into<String>, params: serde_yaml::Value) -> Self {
        Self {
            type_name: type_name.into(),
            params,
        }
    }

    /// Deserialize the parameter block into a model's own parameter type.
    /// A missing block deserializes like an empty mapping.
    pub fn params_as<T: DeserializeOwned>(&self) -> CouplingResult<T> {
        let value = match &self.params {
            serde_yaml::Value::Null => serde_yaml::Value::Mapping(Default::default()),
            other => other.clone(),
        };
        serde_yaml::from_value(value).map_err(|e| {
            CouplingError::setup(format!("invalid parameters for '{}': {e}", self.type_name))
        })
    }
}

pub type FlowFactory = Box<dyn Fn(&ModelSpec) -> CouplingResult<Box<dyn FlowModel>> + Send + Sync>;
pub type StressFactory =
    Box<dyn Fn(&ModelSpec) -> CouplingResult<Box<dyn StressModel>> + Send + Sync>;

/// Factories for flow and stress models, keyed by type name.
#[derive(Default)]
pub struct ModelRegistry {
    flow: BTreeMap<String, FlowFactory>,
    stress: BTreeMap<String, StressFactory>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_flow<F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        F: Fn(&ModelSpec) -> CouplingResult<Box<dyn FlowModel>> + Send + Sync + 'static,
    {
        self.flow.insert(type_name.into(), Box::new(factory));
    }

    pub fn register_stress<F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        F: Fn(&ModelSpec) -> CouplingResult<Box<dyn StressModel>> + Send + Sync + 'static,
    {
        self.stress.insert(type_name.into(), Box::new(factory));
    }

    pub fn create_flow(&self, spec: &ModelSpec) -> CouplingResult<Box<dyn FlowModel>> {
        let factory = self.flow.get(&spec.type_name).ok_or_else(|| {
            CouplingError::setup(format!(
                "unknown flow model type '{}' (available: {})",
                spec.type_name,
                self.flow_types().join(", ")
            ))
        })?;
        factory(spec)
    }

    pub fn create_stress(&self, spec: &ModelSpec) -> CouplingResult<Box<dyn StressModel>> {
        let factory = self.stress.get(&spec.type_name).ok_or_else(|| {
            CouplingError::setup(format!(
                "unknown stress model type '{}' (available: {})",
                spec.type_name,
                self.stress_types().join(", ")
            ))
        })?;
        factory(spec)
    }

    /// Registered flow model names, sorted.
    pub fn flow_types(&self) -> Vec<&str> {
        self.flow.keys().map(String::as_str).collect()
    }

    pub fn stress_types(&self) -> Vec<&str> {
        self.stress.keys().map(String::as_str).collect()
    }
}
