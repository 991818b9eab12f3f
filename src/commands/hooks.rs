use clap::Args;

use preflight::{hooks, package_root};
use preflight::pipeline::PipelineReport;
use preflight::{Environment, SystemRunner};

use super::{AnchorArgs, CmdResult, GlobalArgs};

#[derive(Args)]
pub struct HooksArgs {
    #[command(flatten)]
    pub anchor: AnchorArgs,
}

pub fn run(args: HooksArgs, _global: &GlobalArgs) -> CmdResult<PipelineReport> {
    let root = package_root::resolve(
        &args.anchor.path(hooks::DEFAULT_ANCHOR),
        hooks::ANCESTOR_LEVELS,
    )?;

    let report = hooks::build_pipeline(&root, &Environment::ambient()).run(&SystemRunner)?;
    let exit_code = report.exit_code;

    Ok((report, exit_code))
}
