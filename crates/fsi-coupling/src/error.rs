//! Error types for coupling operations.

use fsi_core::FsiError;
use fsi_interp::InterpError;
use fsi_mesh::MeshError;
use thiserror::Error;

/// Errors raised while setting up or running the coupled problem.
///
/// Outer-loop non-convergence is not an error: it is logged and recorded in
/// the step report.
#[derive(Error, Debug)]
pub enum CouplingError {
    #[error("Coupling setup error: {what}")]
    Setup { what: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    #[error("Model error in '{model}': {message}")]
    Model { model: String, message: String },

    #[error("Interpolation error: {0}")]
    Interp(#[from] InterpError),

    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Core(#[from] FsiError),
}

pub type CouplingResult<T> = Result<T, CouplingError>;

impl CouplingError {
    pub fn setup(what: impl Into<String>) -> Self {
        CouplingError::Setup { what: what.into() }
    }
}
