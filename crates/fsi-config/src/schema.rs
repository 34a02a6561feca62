//! Coupling properties file schema.

use fsi_coupling::ModelSpec;
use serde::{Deserialize, Serialize};

/// Schema version written by this crate.
pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FsiProperties {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub interface: InterfaceDef,
    #[serde(default)]
    pub coupling: CouplingDef,
    #[serde(default)]
    pub interpolation: InterpolationDef,
    pub flow: ModelSpec,
    pub stress: ModelSpec,
    #[serde(default)]
    pub run: RunDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe: Option<ProbeDef>,
}

/// Zone and patch names on both sides of the interface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterfaceDef {
    #[serde(default = "default_interface_name")]
    pub fluid_zone: String,
    #[serde(default = "default_interface_name")]
    pub fluid_patch: String,
    #[serde(default = "default_interface_name")]
    pub solid_zone: String,
    #[serde(default = "default_interface_name")]
    pub solid_patch: String,
}

impl Default for InterfaceDef {
    fn default() -> Self {
        Self {
            fluid_zone: default_interface_name(),
            fluid_patch: default_interface_name(),
            solid_zone: default_interface_name(),
            solid_patch: default_interface_name(),
        }
    }
}

fn default_interface_name() -> String {
    "interface".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CouplingDef {
    /// `fixed_relaxation`, `aitken` or `iqn_ils` (case and separators are
    /// ignored).
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default = "default_relaxation_factor")]
    pub relaxation_factor: f64,
    #[serde(default)]
    pub aitken: AitkenDef,
    #[serde(default)]
    pub iqn: IqnDef,
    #[serde(default)]
    pub coupling_reuse: usize,
    #[serde(default = "default_outer_corr_tolerance")]
    pub outer_corr_tolerance: f64,
    #[serde(default = "default_n_outer_corr")]
    pub n_outer_corr: usize,
    #[serde(default = "default_true")]
    pub coupled: bool,
    #[serde(default)]
    pub predictor: bool,
    #[serde(default)]
    pub force_coupling: ForceCouplingDef,
    #[serde(default)]
    pub residual_scale: ResidualScaleDef,
}

impl Default for CouplingDef {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            relaxation_factor: default_relaxation_factor(),
            aitken: AitkenDef::default(),
            iqn: IqnDef::default(),
            coupling_reuse: 0,
            outer_corr_tolerance: default_outer_corr_tolerance(),
            n_outer_corr: default_n_outer_corr(),
            coupled: true,
            predictor: false,
            force_coupling: ForceCouplingDef::default(),
            residual_scale: ResidualScaleDef::default(),
        }
    }
}

fn default_scheme() -> String {
    "aitken".to_string()
}

fn default_relaxation_factor() -> f64 {
    0.5
}

fn default_outer_corr_tolerance() -> f64 {
    1e-6
}

fn default_n_outer_corr() -> usize {
    20
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AitkenDef {
    pub initial_factor: f64,
    pub min_factor: f64,
    pub max_factor: f64,
}

impl Default for AitkenDef {
    fn default() -> Self {
        Self {
            initial_factor: 0.5,
            min_factor: 1e-3,
            max_factor: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IqnDef {
    pub regularisation: f64,
    pub filter_tolerance: f64,
}

impl Default for IqnDef {
    fn default() -> Self {
        Self {
            regularisation: 1e-12,
            filter_tolerance: 1e-6,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ForceCouplingDef {
    #[default]
    Strong,
    Weak,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResidualScaleDef {
    /// Mean fluid zone edge length.
    #[default]
    ZoneSize,
    /// Largest interface motion since the start of the step, floored by the
    /// fluid zone edge length.
    InterfaceMotion,
    Fixed { length_m: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InterpolationDef {
    /// `ggi` or `projection`.
    pub method: String,
    /// Rebuild every this many time steps (0 disables).
    pub update_frequency: usize,
    /// Rebuild when the solid zone moves more than this fraction of the local
    /// minimum edge length.
    pub deformation_limit: f64,
    pub search_tolerance: f64,
    pub inside_tolerance: f64,
    pub projection_neighbours: usize,
    pub degenerate_area: f64,
    pub min_normal_alignment: f64,
    pub nearest_fallback: bool,
}

impl Default for InterpolationDef {
    fn default() -> Self {
        Self {
            method: "ggi".to_string(),
            update_frequency: 0,
            deformation_limit: 0.1,
            search_tolerance: 0.5,
            inside_tolerance: 1e-6,
            projection_neighbours: 4,
            degenerate_area: 1e-12,
            min_normal_alignment: 0.5,
            nearest_fallback: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunDef {
    pub dt_s: f64,
    pub t_end_s: f64,
    pub max_steps: usize,
}

impl Default for RunDef {
    fn default() -> Self {
        Self {
            dt_s: 1e-3,
            t_end_s: 0.01,
            max_steps: 100_000,
        }
    }
}

/// Solid point whose displacement is recorded every step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeDef {
    pub location_m: [f64; 3],
    #[serde(default)]
    pub write_velocity: bool,
}
