//! sp-core: stable foundation for squarephase.
//!
//! Contains:
//! - grammar (directory-name parameter encoding, e.g. `h030` -> 0.30)
//! - params (ordered named parameter sets + grouping keys)
//! - ids (annealing stage indices)
//! - numeric (Real + tolerances + float helpers)
//! - timing (stage timers)
//! - error (shared error types)

pub mod error;
pub mod grammar;
pub mod ids;
pub mod numeric;
pub mod params;
pub mod timing;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use grammar::DirGrammar;
pub use ids::StageId;
pub use numeric::*;
pub use params::{GroupKey, ParamSet};
