//! Command execution seam.
//!
//! Every step goes through [`CommandRunner`], so the orchestrator never
//! knows which concrete tool it is driving and tests can swap in a fake.

use std::process::{Command, Stdio};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::step::Step;
use crate::utils::command;

/// Result of one command execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitOutcome {
    /// `None` when the child was terminated by a signal.
    pub code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
}

impl ExitOutcome {
    pub fn new(code: Option<i32>, stdout: Option<String>) -> Self {
        Self { code, stdout }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit code to propagate; signal termination maps to 1.
    pub fn exit_code(&self) -> i32 {
        self.code.unwrap_or(1)
    }
}

pub trait CommandRunner {
    /// Run `step` to completion. Errors only when the process cannot be
    /// started; a non-zero exit is reported in the outcome.
    fn run(&self, step: &Step) -> Result<ExitOutcome>;
}

/// Spawns real child processes, blocking until each exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, step: &Step) -> Result<ExitOutcome> {
        let mut cmd = Command::new(&step.program);
        cmd.args(&step.args)
            .current_dir(&step.working_dir)
            .env_clear()
            .envs(step.env.iter())
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit());

        if step.capture_stdout {
            cmd.stdout(Stdio::piped());
            let output = cmd
                .output()
                .map_err(|e| Error::step_spawn_failed(&step.id, step.display(), e.to_string()))?;

            return Ok(ExitOutcome::new(
                output.status.code(),
                Some(command::stdout_text(&output.stdout)),
            ));
        }

        cmd.stdout(Stdio::inherit());
        let status = cmd
            .status()
            .map_err(|e| Error::step_spawn_failed(&step.id, step.display(), e.to_string()))?;

        Ok(ExitOutcome::new(status.code(), None))
    }
}
