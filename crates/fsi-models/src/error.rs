//! Error types for the reference models.

use fsi_coupling::CouplingError;
use fsi_mesh::MeshError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ModelError {
    #[error("Non-physical parameter: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),
}

pub type ModelResult<T> = Result<T, ModelError>;

impl ModelError {
    pub(crate) fn into_coupling(self, model: &str) -> CouplingError {
        match self {
            ModelError::Mesh(e) => CouplingError::Mesh(e),
            other => CouplingError::Model {
                model: model.to_string(),
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ModelError::NonPhysical { what: "bulk modulus" };
        assert!(err.to_string().contains("bulk modulus"));
    }

    #[test]
    fn error_conversion() {
        let err = ModelError::InvalidArg { what: "dt" }.into_coupling("springs");
        match err {
            CouplingError::Model { model, message } => {
                assert_eq!(model, "springs");
                assert!(message.contains("dt"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
