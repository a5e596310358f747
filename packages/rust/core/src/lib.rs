//! Run orchestration for shelfwatch.

pub mod pipeline;

pub use pipeline::{ProgressReporter, RunConfig, RunReport, SilentProgress, run};
