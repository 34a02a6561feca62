use thiserror::Error;

pub type FsiResult<T> = Result<T, FsiError>;

/// Failures of the shared field and numeric helpers.
#[derive(Error, Debug)]
pub enum FsiError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Field size mismatch for {what}: expected {expected}, got {actual}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}
