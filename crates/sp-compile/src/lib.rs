//! sp-compile: per-run result compilation.
//!
//! Turns the raw result files of one run into a single record of scalar
//! properties, or a typed [`CompilationFailure`]. Failures are values:
//! one broken run never stops the rest of a batch.

pub mod compiler;
pub mod failure;
pub mod layout;
pub mod parse;
pub mod record;
pub mod trajectory;

pub use compiler::RunCompiler;
pub use failure::{CompilationFailure, FailureReason};
pub use layout::ResultLayout;
pub use record::{CompiledRun, FieldRecord, StageRecord, StageSkip};
pub use trajectory::TemperatureTrajectory;

/// Result of compiling one run.
pub type CompileOutcome = Result<CompiledRun, CompilationFailure>;

/// Descriptor of the run an outcome belongs to.
pub fn outcome_run(outcome: &CompileOutcome) -> &sp_catalog::RunDescriptor {
    match outcome {
        Ok(compiled) => &compiled.run,
        Err(failure) => &failure.run,
    }
}
