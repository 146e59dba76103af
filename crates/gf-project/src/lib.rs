//! gf-project: canonical model file format and validation.
//!
//! A model file is YAML: a name, a schema version and a (partially
//! specified) greenhouse configuration. Missing sections fall back to
//! the engine defaults; present sections are validated here before the
//! engine ever sees them, so a bad file fails fast with a field-level
//! message instead of a construction error deep in the build.

pub mod schema;
pub mod validate;

pub use schema::{LATEST_VERSION, ModelDef};
pub use validate::{ValidationError, validate_model};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load and validate a model definition from a YAML file.
pub fn load_yaml(path: &std::path::Path) -> ProjectResult<ModelDef> {
    let content = std::fs::read_to_string(path)?;
    let model: ModelDef = serde_yaml::from_str(&content)?;
    validate_model(&model)?;
    Ok(model)
}

/// Serialize a model definition to a YAML string.
pub fn to_yaml(model: &ModelDef) -> ProjectResult<String> {
    Ok(serde_yaml::to_string(model)?)
}
