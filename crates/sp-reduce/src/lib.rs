//! sp-reduce: aggregation of compiled runs.
//!
//! Contains:
//! - reducer (replicate averaging into a [`SummaryTable`](sp_results::SummaryTable))
//! - mesh (two-parameter pivot of a summary)
//! - expectation (field-alignment expectation of a von Mises distribution)

pub mod expectation;
pub mod mesh;
pub mod reducer;

pub use expectation::{magnetization_expectation, mean_cos};
pub use mesh::{MeshFilter, ParameterMesh};
pub use reducer::{Reducer, Reduction};

pub type ReduceResult<T> = Result<T, ReduceError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ReduceError {
    #[error("Unknown column '{name}'")]
    UnknownColumn { name: String },

    #[error("Column '{name}' is not a parameter column")]
    NotAParameter { name: String },

    #[error(transparent)]
    Core(#[from] sp_core::CoreError),
}
