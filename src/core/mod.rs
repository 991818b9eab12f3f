// Public modules
pub mod bench;
pub mod checks;
pub mod defaults;
pub mod environment;
pub mod error;
pub mod git;
pub mod hooks;
pub mod package_root;
pub mod pipeline;
pub mod probe;
pub mod runner;
pub mod step;

// Re-export common types for convenience
pub use environment::Environment;
pub use error::{Error, ErrorCode, Result};
pub use package_root::PackageRoot;
pub use pipeline::{Pipeline, PipelineReport, PipelineState, Stage};
pub use probe::{ProbeOutcome, ToolProbe};
pub use runner::{CommandRunner, ExitOutcome, SystemRunner};
pub use step::{Step, StepMode};
