//! fsi-models: reduced-order reference models for the coupling loop.
//!
//! Provides:
//! - `CompliantChamber`: a gas chamber whose wall pressure responds to the
//!   volume change caused by wall motion
//! - `ElasticFoundation`: a thin wall on an elastic layer, one damped spring
//!   per wall point
//!
//! Both are analytic and cheap, and meshed independently so the interface is
//! non-matching by default.
//!
//! # Example
//!
//! ```no_run
//! use fsi_coupling::{CouplingSettings, FluidStructureInterface, ModelSpec, TimeStep};
//! use fsi_models::builtin_registry;
//!
//! let registry = builtin_registry();
//! let flow = registry
//!     .create_flow(&ModelSpec::new("compliant_chamber", Default::default()))
//!     .unwrap();
//! let stress = registry
//!     .create_stress(&ModelSpec::new("elastic_foundation", Default::default()))
//!     .unwrap();
//!
//! let mut fsi =
//!     FluidStructureInterface::serial(flow, stress, CouplingSettings::default()).unwrap();
//! let report = fsi
//!     .advance(TimeStep { index: 1, time: 1e-3, dt: 1e-3 })
//!     .unwrap();
//! println!("converged in {} outer iterations", report.outer_iterations);
//! ```

pub mod chamber;
pub mod common;
pub mod error;
pub mod foundation;
pub mod registry;

pub use chamber::{ChamberParams, CompliantChamber};
pub use common::PlateGeometry;
pub use error::{ModelError, ModelResult};
pub use foundation::{ElasticFoundation, FoundationParams};
pub use registry::{COMPLIANT_CHAMBER, ELASTIC_FOUNDATION, builtin_registry, register_builtin};
