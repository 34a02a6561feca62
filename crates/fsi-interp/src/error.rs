//! Error types for interpolation operations.

use fsi_core::FsiError;
use fsi_mesh::MeshError;
use thiserror::Error;

/// Errors raised while assembling or applying interpolation weights.
#[derive(Error, Debug)]
pub enum InterpError {
    #[error("No geometric correspondence for target {what} {index} within tolerance")]
    NoCorrespondence { what: &'static str, index: usize },

    #[error("Zone '{zone}' has no non-degenerate faces")]
    Degenerate { zone: String },

    #[error("Invalid interpolation settings: {what}")]
    InvalidSettings { what: String },

    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Core(#[from] FsiError),
}

pub type InterpResult<T> = Result<T, InterpError>;
