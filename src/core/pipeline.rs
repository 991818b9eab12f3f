use std::path::PathBuf;

use serde::Serialize;

use crate::error::{ErrorCode, Result};
use crate::package_root::PackageRoot;
use crate::probe::{ProbeOutcome, ToolProbe};
use crate::runner::CommandRunner;
use crate::step::Step;

/// One unit of work in a pipeline.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stage {
    Run(Step),
    EnsureTool(ToolProbe),
}

impl Stage {
    pub fn id(&self) -> &str {
        match self {
            Stage::Run(step) => &step.id,
            Stage::EnsureTool(probe) => &probe.id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    Pending,
    Running { step_index: usize },
    Succeeded,
    Failed { step_index: usize, exit_code: i32 },
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Succeeded | PipelineState::Failed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRecord {
    pub index: usize,
    pub id: String,
    pub status: StageStatus,
    /// Last command the stage ran.
    pub command: String,
    pub working_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe: Option<ProbeOutcome>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSummary {
    pub total_stages: usize,
    pub executed: usize,
    pub succeeded: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_actions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub pipeline: String,
    pub root: PackageRoot,
    pub state: PipelineState,
    pub stages: Vec<StageRecord>,
    pub summary: PipelineSummary,
    pub exit_code: i32,
}

impl PipelineReport {
    pub fn succeeded(&self) -> bool {
        self.state == PipelineState::Succeeded
    }
}

/// A fixed, ordered list of stages run with fail-fast semantics.
#[derive(Debug, Clone, Serialize)]
pub struct Pipeline {
    pub name: String,
    pub root: PackageRoot,
    pub stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new(name: &str, root: &PackageRoot) -> Self {
        Self {
            name: name.to_string(),
            root: root.clone(),
            stages: Vec::new(),
        }
    }

    pub fn step(mut self, step: Step) -> Self {
        self.stages.push(Stage::Run(step));
        self
    }

    pub fn ensure_tool(mut self, probe: ToolProbe) -> Self {
        self.stages.push(Stage::EnsureTool(probe));
        self
    }

    pub fn stage_ids(&self) -> Vec<&str> {
        self.stages.iter().map(Stage::id).collect()
    }

    /// Run every stage in order, stopping at the first failure.
    ///
    /// A failed fail-fast step ends the run in `PipelineState::Failed`; no
    /// later stage is started. Errors other than step failures (a program
    /// that cannot be spawned) are returned as-is.
    pub fn run(&self, runner: &dyn CommandRunner) -> Result<PipelineReport> {
        let mut state = PipelineState::Pending;
        let mut records = Vec::with_capacity(self.stages.len());

        for (index, stage) in self.stages.iter().enumerate() {
            state = PipelineState::Running { step_index: index };
            let record = run_stage(index, stage, runner)?;
            let failed = record.status == StageStatus::Failed;
            let exit_code = record.exit_code.unwrap_or(1);
            records.push(record);

            if failed {
                state = PipelineState::Failed {
                    step_index: index,
                    exit_code,
                };
                break;
            }
        }

        if !state.is_terminal() {
            state = PipelineState::Succeeded;
        }

        let exit_code = match state {
            PipelineState::Failed { exit_code, .. } => exit_code,
            _ => 0,
        };
        let summary = build_summary(self.stages.len(), &records, &state);

        Ok(PipelineReport {
            pipeline: self.name.clone(),
            root: self.root.clone(),
            state,
            stages: records,
            summary,
            exit_code,
        })
    }
}

fn run_stage(index: usize, stage: &Stage, runner: &dyn CommandRunner) -> Result<StageRecord> {
    match stage {
        Stage::Run(step) => {
            log_status!("step", "{}", step.display());
            let result = step.execute(runner);
            step_record(index, step, None, result.map(|o| o.code))
        }
        Stage::EnsureTool(probe) => {
            log_status!("probe", "{}", probe.check.display());
            match probe.ensure(runner) {
                Ok(ProbeOutcome::Present) => Ok(StageRecord {
                    index,
                    id: probe.id.clone(),
                    status: StageStatus::Succeeded,
                    command: probe.check.display(),
                    working_dir: probe.check.working_dir.clone(),
                    exit_code: Some(0),
                    probe: Some(ProbeOutcome::Present),
                }),
                Ok(ProbeOutcome::Installed) => {
                    step_record(index, &probe.install, Some(ProbeOutcome::Installed), Ok(Some(0)))
                        .map(|record| StageRecord {
                            id: probe.id.clone(),
                            ..record
                        })
                }
                Err(err) => step_record(index, &probe.install, None, Err(err)).map(|record| {
                    StageRecord {
                        id: probe.id.clone(),
                        ..record
                    }
                }),
            }
        }
    }
}

/// Turn a step result into a record, keeping step failures as values.
fn step_record(
    index: usize,
    step: &Step,
    probe: Option<ProbeOutcome>,
    result: Result<Option<i32>>,
) -> Result<StageRecord> {
    let (status, exit_code) = match result {
        Ok(code) => (StageStatus::Succeeded, code),
        Err(err) if err.code == ErrorCode::StepFailed => {
            (StageStatus::Failed, err.step_exit_code())
        }
        Err(err) => return Err(err),
    };

    Ok(StageRecord {
        index,
        id: step.id.clone(),
        status,
        command: step.display(),
        working_dir: step.working_dir.clone(),
        exit_code,
        probe,
    })
}

fn build_summary(
    total_stages: usize,
    records: &[StageRecord],
    state: &PipelineState,
) -> PipelineSummary {
    let succeeded = records
        .iter()
        .filter(|r| r.status == StageStatus::Succeeded)
        .count();

    let next_actions = match state {
        PipelineState::Failed { .. } => {
            vec![
                "Fix the issue and re-run (completed steps are safe to repeat)".to_string(),
            ]
        }
        _ => Vec::new(),
    };

    PipelineSummary {
        total_stages,
        executed: records.len(),
        succeeded,
        next_actions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::error::Error;
    use crate::runner::ExitOutcome;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Records every invocation; exit codes are looked up by step id.
    struct RecordingRunner {
        codes: HashMap<String, i32>,
        calls: RefCell<Vec<String>>,
    }

    impl RecordingRunner {
        fn new(codes: &[(&str, i32)]) -> Self {
            Self {
                codes: codes.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, step: &Step) -> Result<ExitOutcome> {
            self.calls.borrow_mut().push(step.id.clone());
            if step.program == "missing" {
                return Err(Error::step_spawn_failed(&step.id, step.display(), "not found"));
            }
            let code = self.codes.get(&step.id).copied().unwrap_or(0);
            Ok(ExitOutcome::new(Some(code), None))
        }
    }

    fn root() -> PackageRoot {
        let dir = std::env::temp_dir();
        crate::package_root::resolve(&dir.join("run-checks"), 1).unwrap()
    }

    fn pipeline(ids: &[&str]) -> Pipeline {
        let root = root();
        let env = Environment::default();
        ids.iter().fold(Pipeline::new("test", &root), |p, id| {
            p.step(Step::new(id, "tool", root.path(), &env).arg(*id))
        })
    }

    #[test]
    fn all_steps_run_in_order_on_success() {
        let runner = RecordingRunner::new(&[]);
        let report = pipeline(&["a", "b", "c"]).run(&runner).unwrap();

        assert_eq!(runner.calls(), vec!["a", "b", "c"]);
        assert_eq!(report.state, PipelineState::Succeeded);
        assert_eq!(report.exit_code, 0);
        assert_eq!(report.summary.executed, 3);
        assert!(report.summary.next_actions.is_empty());
    }

    #[test]
    fn first_failure_stops_the_pipeline() {
        for k in 0..4 {
            let ids = ["a", "b", "c", "d"];
            let runner = RecordingRunner::new(&[(ids[k], 7)]);
            let report = pipeline(&ids).run(&runner).unwrap();

            assert_eq!(runner.calls(), ids[..=k].to_vec());
            assert_eq!(
                report.state,
                PipelineState::Failed {
                    step_index: k,
                    exit_code: 7
                }
            );
            assert_eq!(report.exit_code, 7);
            assert_eq!(report.stages.len(), k + 1);
            assert_eq!(report.stages[k].status, StageStatus::Failed);
        }
    }

    #[test]
    fn spawn_failure_propagates() {
        let root = root();
        let env = Environment::default();
        let pipeline = Pipeline::new("test", &root)
            .step(Step::new("gone", "missing", root.path(), &env))
            .step(Step::new("after", "tool", root.path(), &env));
        let runner = RecordingRunner::new(&[]);

        let err = pipeline.run(&runner).unwrap_err();
        assert_eq!(err.code, ErrorCode::StepSpawnFailed);
        assert_eq!(runner.calls(), vec!["gone"]);
    }

    #[test]
    fn probe_stage_records_outcome() {
        let root = root();
        let env = Environment::default();
        let probe = ToolProbe::new(
            "tool",
            Step::new("tool-version", "tool", root.path(), &env).arg("-V"),
            Step::new("tool-install", "tool", root.path(), &env).arg("install"),
        );
        let runner = RecordingRunner::new(&[("tool-version", 1)]);
        let report = Pipeline::new("test", &root)
            .ensure_tool(probe)
            .run(&runner)
            .unwrap();

        assert_eq!(runner.calls(), vec!["tool-version", "tool-install"]);
        assert_eq!(report.stages[0].id, "tool");
        assert_eq!(report.stages[0].probe, Some(ProbeOutcome::Installed));
        assert_eq!(report.stages[0].command, "tool install");
    }

    #[test]
    fn report_serializes_state() {
        let runner = RecordingRunner::new(&[("b", 1)]);
        let report = pipeline(&["a", "b"]).run(&runner).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["state"]["state"], "failed");
        assert_eq!(json["state"]["step_index"], 1);
        assert_eq!(json["exitCode"], 1);
        assert_eq!(json["summary"]["totalStages"], 2);
    }
}
