//! Error types for the sp-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Config file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Config validation failed: {0}")]
    Validation(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Summary file not found: {path} (run `update` first)")]
    MissingSummary { path: PathBuf },

    #[error("Results error: {0}")]
    Results(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sp-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<sp_catalog::CatalogError> for AppError {
    fn from(err: sp_catalog::CatalogError) -> Self {
        match err {
            sp_catalog::CatalogError::Validation(e) => AppError::Validation(e.to_string()),
            sp_catalog::CatalogError::Yaml(e) => AppError::Config(e.to_string()),
            other => AppError::Catalog(other.to_string()),
        }
    }
}

impl From<sp_catalog::TemplateError> for AppError {
    fn from(err: sp_catalog::TemplateError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<sp_results::ResultsError> for AppError {
    fn from(err: sp_results::ResultsError) -> Self {
        match err {
            sp_results::ResultsError::MissingSummaryFile { path } => {
                AppError::MissingSummary { path }
            }
            other => AppError::Results(other.to_string()),
        }
    }
}

impl From<sp_reduce::ReduceError> for AppError {
    fn from(err: sp_reduce::ReduceError) -> Self {
        AppError::Query(err.to_string())
    }
}

impl From<sp_core::CoreError> for AppError {
    fn from(err: sp_core::CoreError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}
