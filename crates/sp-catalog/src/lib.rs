//! sp-catalog: analysis configuration and the run catalog.
//!
//! A catalog is the list of [`RunDescriptor`]s an analysis works on. It is
//! loaded either from an explicit parameter table or by walking a directory
//! tree whose level names encode parameter values.

pub mod descriptor;
pub mod directory;
pub mod schema;
pub mod source;
pub mod table;
pub mod template;
pub mod validate;

use std::path::PathBuf;

pub use descriptor::RunDescriptor;
pub use directory::DirectorySource;
pub use schema::*;
pub use source::{CatalogSource, build_source, load_catalog};
pub use table::TableSource;
pub use template::{FileTemplate, TemplateError};
pub use validate::{ValidationError, validate_config};

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("Failed to open parameter table {path}: {source}")]
    Open { path: PathBuf, source: csv::Error },

    #[error("Failed to read parameter table {path}: {source}")]
    Read { path: PathBuf, source: csv::Error },

    #[error("Parameter table {path} is missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Parameter table {path}, row {row}: column '{column}' is not numeric ('{value}')")]
    BadValue {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    #[error("No directories matching {grammar} under {parent}")]
    EmptyLevel { parent: PathBuf, grammar: String },

    #[error("Failed to list directory {path}: {source}")]
    ListDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid run descriptor: {what}")]
    InvalidDescriptor { what: String },

    #[error("Parameter error: {0}")]
    Core(#[from] sp_core::CoreError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub fn load_yaml(path: &std::path::Path) -> CatalogResult<AnalysisConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AnalysisConfig = serde_yaml::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn save_yaml(path: &std::path::Path, config: &AnalysisConfig) -> CatalogResult<()> {
    validate_config(config)?;
    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
