use clap::{Args, ValueEnum};

use preflight::checks::{self, CheckVariant};
use preflight::pipeline::PipelineReport;
use preflight::{Environment, SystemRunner};

use super::{AnchorArgs, CmdResult, GlobalArgs};

#[derive(Args)]
pub struct CheckArgs {
    /// Which checker to run
    #[arg(long, value_enum, default_value = "workspace")]
    pub variant: VariantArg,

    #[command(flatten)]
    pub anchor: AnchorArgs,

    /// Package subdirectory for the README and publish steps
    /// (overrides [package.metadata.preflight] package-dir)
    #[arg(long, value_name = "DIR")]
    pub package_dir: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VariantArg {
    /// Checker in the package root; no extra feature flags
    Workspace,
    /// Checker in scripts/; passes --all-features to check, clippy and doc
    AllFeatures,
}

impl From<VariantArg> for CheckVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Workspace => CheckVariant::Workspace,
            VariantArg::AllFeatures => CheckVariant::AllFeatures,
        }
    }
}

pub fn run(args: CheckArgs, _global: &GlobalArgs) -> CmdResult<PipelineReport> {
    let variant = CheckVariant::from(args.variant);
    let anchor = args.anchor.path(variant.default_anchor());

    let report = checks::run(
        &SystemRunner,
        variant,
        &anchor,
        args.package_dir,
        &Environment::ambient(),
    )?;
    let exit_code = report.exit_code;

    Ok((report, exit_code))
}
