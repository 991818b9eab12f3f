//! Benchmark run saved under the current commit's short hash.

use serde::Serialize;

use crate::defaults::PreflightConfig;
use crate::environment::Environment;
use crate::error::Result;
use crate::git;
use crate::package_root::PackageRoot;
use crate::pipeline::{Pipeline, PipelineReport};
use crate::runner::CommandRunner;
use crate::step::Step;

/// The bench script lives in `scripts/`.
pub const ANCESTOR_LEVELS: usize = 2;
pub const DEFAULT_ANCHOR: &str = "scripts/run-bench";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchReport {
    pub baseline: String,
    #[serde(flatten)]
    pub report: PipelineReport,
}

pub fn build_pipeline(
    root: &PackageRoot,
    config: &PreflightConfig,
    ambient: &Environment,
    baseline: &str,
) -> Pipeline {
    Pipeline::new("bench", root).step(
        Step::new("bench", &config.cargo, root.path(), ambient).args([
            "bench",
            "--",
            "--save-baseline",
            baseline,
        ]),
    )
}

/// Resolve the baseline label from git, then run the benchmarks. The label is
/// passed on as git printed it; an unusable one is left for cargo to reject.
pub fn run(
    runner: &dyn CommandRunner,
    root: &PackageRoot,
    config: &PreflightConfig,
    ambient: &Environment,
) -> Result<BenchReport> {
    let baseline = git::short_head_hash(runner, root, ambient)?;
    if baseline.is_empty() {
        log_status!("bench", "git printed no commit hash; baseline label is empty");
    } else {
        log_status!("bench", "Saving baseline {}", baseline);
    }

    let report = build_pipeline(root, config, ambient, &baseline).run(runner)?;
    Ok(BenchReport { baseline, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package_root;

    #[test]
    fn baseline_is_passed_after_separator() {
        let root = package_root::resolve(&std::env::temp_dir().join("run-bench"), 1).unwrap();
        let pipeline = build_pipeline(
            &root,
            &PreflightConfig::default(),
            &Environment::default(),
            "abc1234",
        );
        assert_eq!(pipeline.stage_ids(), vec!["bench"]);
        let crate::pipeline::Stage::Run(step) = &pipeline.stages[0] else {
            panic!("bench stage should be a plain step");
        };
        assert_eq!(step.display(), "cargo bench -- --save-baseline abc1234");
    }
}
