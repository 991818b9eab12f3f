use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::runner::{CommandRunner, ExitOutcome};
use crate::utils::shell;

/// How a step's exit status is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMode {
    /// Non-zero exit aborts the pipeline.
    FailFast,
    /// Exit status is returned to the caller as a plain value.
    Probe,
}

/// One external command invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    #[serde(skip)]
    pub env: Environment,
    pub mode: StepMode,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub capture_stdout: bool,
}

impl Step {
    /// Create a fail-fast step running `program` in `working_dir` with `env`.
    pub fn new(id: &str, program: &str, working_dir: &Path, env: &Environment) -> Self {
        Self {
            id: id.to_string(),
            program: program.to_string(),
            args: Vec::new(),
            working_dir: working_dir.to_path_buf(),
            env: env.clone(),
            mode: StepMode::FailFast,
            capture_stdout: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add an argument if condition is true.
    pub fn arg_if(mut self, condition: bool, arg: &str) -> Self {
        if condition {
            self.args.push(arg.to_string());
        }
        self
    }

    pub fn probe(mut self) -> Self {
        self.mode = StepMode::Probe;
        self
    }

    /// Capture stdout as text instead of passing it through. Stderr still
    /// goes to the terminal.
    pub fn capture_stdout(mut self) -> Self {
        self.capture_stdout = true;
        self
    }

    pub fn command_line(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// Shell-quoted command line for logs and error details.
    pub fn display(&self) -> String {
        shell::quote_args(&self.command_line())
    }

    /// Run this step through `runner`, applying its mode.
    ///
    /// Fail-fast steps turn a non-zero exit into a `StepFailed` error.
    /// Probe steps always return the outcome.
    pub fn execute(&self, runner: &dyn CommandRunner) -> Result<ExitOutcome> {
        let outcome = runner.run(self)?;

        if self.mode == StepMode::FailFast && !outcome.success() {
            return Err(Error::step_failed(
                &self.id,
                self.display(),
                outcome.exit_code(),
            ));
        }

        Ok(outcome)
    }
}
