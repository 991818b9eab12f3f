//! The verification pipeline: check, fmt, clippy, doc, README sync and a
//! dry-run publish.

use std::path::Path;

use serde::Serialize;

use crate::defaults::PreflightConfig;
use crate::environment::{Environment, RUSTDOCFLAGS};
use crate::error::Result;
use crate::package_root::{self, PackageRoot};
use crate::pipeline::{Pipeline, PipelineReport};
use crate::probe::ToolProbe;
use crate::runner::CommandRunner;
use crate::step::Step;

/// The two entry points of the checker. They differ in where the entry-point
/// script lives and in whether `--all-features` is passed to check, clippy
/// and doc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckVariant {
    /// Top-level checker living in the package root.
    Workspace,
    /// Checker living in `scripts/`, building with every feature enabled.
    AllFeatures,
}

impl CheckVariant {
    pub fn ancestor_levels(&self) -> usize {
        match self {
            CheckVariant::Workspace => 1,
            CheckVariant::AllFeatures => 2,
        }
    }

    pub fn all_features(&self) -> bool {
        matches!(self, CheckVariant::AllFeatures)
    }

    /// Entry-point path assumed when none is given, relative to the
    /// current directory.
    pub fn default_anchor(&self) -> &'static str {
        match self {
            CheckVariant::Workspace => "run-checks",
            CheckVariant::AllFeatures => "scripts/run-checks",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckVariant::Workspace => "workspace",
            CheckVariant::AllFeatures => "all-features",
        }
    }
}

/// Build the check pipeline for `variant`.
///
/// Every step gets an explicit environment: `ambient` as-is, or, for the doc
/// step, `ambient` overlaid with `RUSTDOCFLAGS`.
pub fn build_pipeline(
    variant: CheckVariant,
    root: &PackageRoot,
    config: &PreflightConfig,
    ambient: &Environment,
) -> Pipeline {
    let cargo = config.cargo.as_str();
    let all_features = variant.all_features();
    let root_dir = root.path();
    let package_dir = config.package_path(root);
    let doc_env = ambient.overlay(&[(RUSTDOCFLAGS, config.doc_flags.as_str())]);
    let readme = &config.readme_tool;

    let readme_probe = ToolProbe::new(
        "readme-tool",
        Step::new("readme-tool-version", cargo, root_dir, ambient)
            .args([readme.subcommand.as_str(), "-V"]),
        Step::new("readme-tool-install", cargo, root_dir, ambient)
            .args(["install", readme.package.as_str()]),
    );

    Pipeline::new(&format!("check:{}", variant.as_str()), root)
        .step(
            Step::new("check", cargo, root_dir, ambient)
                .arg("check")
                .arg_if(all_features, "--all-features"),
        )
        .step(Step::new("fmt", cargo, root_dir, ambient).arg("fmt"))
        .step(
            Step::new("clippy", cargo, root_dir, ambient)
                .arg("clippy")
                .arg_if(all_features, "--all-features"),
        )
        .step(
            Step::new("doc", cargo, root_dir, &doc_env)
                .arg("doc")
                .arg_if(all_features, "--all-features"),
        )
        .ensure_tool(readme_probe)
        .step(
            Step::new("readme-sync", cargo, &package_dir, ambient)
                .args([readme.subcommand.as_str(), "--check"]),
        )
        .step(
            Step::new("publish-dry-run", cargo, &package_dir, ambient)
                .args(["publish", "--locked", "--dry-run"]),
        )
}

/// Resolve the root from `anchor`, load its configuration and run the
/// pipeline. Resolution and configuration errors are returned before any
/// step runs.
pub fn run(
    runner: &dyn CommandRunner,
    variant: CheckVariant,
    anchor: &Path,
    package_dir: Option<String>,
    ambient: &Environment,
) -> Result<PipelineReport> {
    let root = package_root::resolve(anchor, variant.ancestor_levels())?;
    let config = PreflightConfig::load(&root)?.with_package_dir(package_dir)?;

    if let Some(warning) = config.package_dir_warning() {
        log_status!("check", "{}", warning);
    }

    build_pipeline(variant, &root, &config, ambient).run(runner)
}
