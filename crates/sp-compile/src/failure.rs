use core::fmt;
use sp_catalog::RunDescriptor;
use std::path::PathBuf;

/// Why a run (or one annealing stage of it) produced no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    MissingFile,
    ShortFile,
    HeaderMismatch,
    MalformedValue,
}

impl FailureReason {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureReason::MissingFile => "missing_file",
            FailureReason::ShortFile => "short_file",
            FailureReason::HeaderMismatch => "header_mismatch",
            FailureReason::MalformedValue => "malformed_value",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A run that could not be compiled. Permanent for the current file state.
#[derive(thiserror::Error, Debug, Clone)]
#[error("{reason} at {}: {detail}", .path.display())]
pub struct CompilationFailure {
    pub run: RunDescriptor,
    pub reason: FailureReason,
    pub path: PathBuf,
    pub detail: String,
}
