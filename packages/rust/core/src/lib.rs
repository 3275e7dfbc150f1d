//! Pipeline and orchestration surface for wikideck.
//!
//! Composes retrieval and assembly into the `build` pipeline, provides the
//! pure outline transforms behind it, and exposes the capability registry
//! consumed by external agent orchestrators.

pub mod agents;
pub mod outline;
pub mod pipeline;

pub use agents::{ASSEMBLY_CAPABILITY, Capability, RETRIEVAL_CAPABILITY, ToolSpec};
pub use pipeline::{BuildConfig, BuildResult, ProgressReporter, SilentProgress, build_deck};
