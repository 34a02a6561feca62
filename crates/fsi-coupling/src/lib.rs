//! Partitioned fluid-structure coupling.
//!
//! Provides:
//! - `FlowModel` / `StressModel` contracts for the two single-physics solvers
//! - A registry selecting model implementations by type name
//! - Interface displacement schemes: fixed relaxation, Aitken, IQN-ILS
//! - The `FluidStructureInterface` orchestrator running the outer iterations
//! - A fixed-step time loop with progress reporting and a point probe

pub mod error;
pub mod history;
pub mod interface;
pub mod iqn_ils;
pub mod models;
pub mod registry;
pub mod relaxation;
pub mod run;
pub mod scheme;
pub mod settings;
pub mod state;
pub mod tracker;

pub use error::{CouplingError, CouplingResult};
pub use history::{PointHistory, PointSample};
pub use interface::{FluidStructureInterface, StepReport};
pub use iqn_ils::IqnIls;
pub use models::{FlowModel, SolveStatus, StressModel, TimeStep};
pub use registry::{ModelRegistry, ModelSpec};
pub use relaxation::{Aitken, FixedRelaxation};
pub use run::{FsiProgress, FsiRecord, ProbeOptions, RunOptions, run_fsi, run_fsi_with_progress};
pub use scheme::{CouplingScheme, build_scheme};
pub use settings::{
    AitkenSettings, CouplingSchemeKind, CouplingSettings, ForceCoupling, IqnSettings,
    ResidualScale,
};
pub use state::CouplingState;
pub use tracker::InterfaceGeometryTracker;
