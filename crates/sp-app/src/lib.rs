//! Shared application service layer for squarephase.
//!
//! Centralizes the analysis pipeline (catalog, compile, reduce, write),
//! config handling and summary queries so the CLI stays a thin shell.

pub mod analysis;
pub mod config_service;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod query;

// Re-export key types for convenience
pub use analysis::{AnalysisOutput, MeshAnalysis, SummaryAnalysis, run_analysis};
pub use config_service::{AnalysisRoot, ConfigSummary, describe_config, load_config, save_config};
pub use error::{AppError, AppResult};
pub use pipeline::{
    LoadedSummary, PipelineOptions, PipelineRequest, PipelineResponse, PipelineTiming,
    ensure_summary, ensure_summary_with_progress, list_runs, load_summary,
};
pub use progress::{CompileProgress, PipelineProgressEvent, PipelineStage};
