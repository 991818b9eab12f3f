//! Availability check for auxiliary cargo subcommands.

use serde::Serialize;

use crate::error::Result;
use crate::runner::CommandRunner;
use crate::step::Step;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// Version query succeeded; nothing was installed.
    Present,
    /// Version query failed and the install step ran successfully.
    Installed,
}

/// A version query paired with the install step to run when it fails.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolProbe {
    pub id: String,
    pub check: Step,
    pub install: Step,
}

impl ToolProbe {
    /// `check` is forced into probing mode; `install` keeps its own mode.
    pub fn new(id: &str, check: Step, install: Step) -> Self {
        Self {
            id: id.to_string(),
            check: check.probe(),
            install,
        }
    }

    pub fn is_present(&self, runner: &dyn CommandRunner) -> bool {
        // A probe that cannot even be spawned counts as absent.
        self.check
            .execute(runner)
            .map(|outcome| outcome.success())
            .unwrap_or(false)
    }

    /// Make sure the tool is available, installing it when the probe fails.
    pub fn ensure(&self, runner: &dyn CommandRunner) -> Result<ProbeOutcome> {
        if self.is_present(runner) {
            return Ok(ProbeOutcome::Present);
        }

        log_status!(
            "probe",
            "'{}' failed, running {}",
            self.check.display(),
            self.install.display()
        );
        self.install.execute(runner)?;
        Ok(ProbeOutcome::Installed)
    }
}
