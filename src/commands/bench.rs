use clap::Args;

use preflight::bench::{self, BenchReport};
use preflight::defaults::PreflightConfig;
use preflight::package_root;
use preflight::{Environment, SystemRunner};

use super::{AnchorArgs, CmdResult, GlobalArgs};

#[derive(Args)]
pub struct BenchArgs {
    #[command(flatten)]
    pub anchor: AnchorArgs,
}

pub fn run(args: BenchArgs, _global: &GlobalArgs) -> CmdResult<BenchReport> {
    let root = package_root::resolve(
        &args.anchor.path(bench::DEFAULT_ANCHOR),
        bench::ANCESTOR_LEVELS,
    )?;
    let config = PreflightConfig::load(&root)?;

    let report = bench::run(&SystemRunner, &root, &config, &Environment::ambient())?;
    let exit_code = report.report.exit_code;

    Ok((report, exit_code))
}
