//! fsi-config: coupling properties file format, validation and conversion
//! to runtime settings.

pub mod convert;
pub mod schema;
pub mod validate;

pub use schema::*;
pub use validate::{ValidationError, validate_models, validate_properties};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Setup error: {0}")]
    Coupling(#[from] fsi_coupling::CouplingError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn from_yaml_str(content: &str) -> ConfigResult<FsiProperties> {
    let props: FsiProperties = serde_yaml::from_str(content)?;
    validate_properties(&props)?;
    Ok(props)
}

pub fn load_yaml(path: &std::path::Path) -> ConfigResult<FsiProperties> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

pub fn save_yaml(path: &std::path::Path, props: &FsiProperties) -> ConfigResult<()> {
    validate_properties(props)?;
    let content = serde_yaml::to_string(props)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ConfigResult<FsiProperties> {
    let content = std::fs::read_to_string(path)?;
    let props: FsiProperties = serde_json::from_str(&content)?;
    validate_properties(&props)?;
    Ok(props)
}

pub fn save_json(path: &std::path::Path, props: &FsiProperties) -> ConfigResult<()> {
    validate_properties(props)?;
    let content = serde_json::to_string_pretty(props)?;
    std::fs::write(path, content)?;
    Ok(())
}
