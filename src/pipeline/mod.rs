//! Sequential illustration pipeline
//!
//! One shared, run-versioned item store; an initial sweep that illustrates
//! items strictly one at a time in appearance order; and single-item
//! regeneration that can run alongside the sweep. The only per-item
//! coordination is the `is_generating` flag, checked before dispatch.

mod orchestrator;
mod prompt;
mod store;

pub use orchestrator::{Pipeline, PipelineOptions, RegenerateOutcome};
pub use store::{Phase, RunId, Snapshot};
