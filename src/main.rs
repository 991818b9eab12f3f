use clap::{Parser, Subcommand};

use commands::GlobalArgs;

mod commands;
mod output;

use commands::{bench, check, hooks};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "preflight")]
#[command(version = VERSION)]
#[command(about = "Fail-fast verification pipeline for a cargo package")]
struct Cli {
    /// Print a JSON report on stdout
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run check, fmt, clippy, doc, README sync and a dry-run publish
    Check(check::CheckArgs),
    /// Run benchmarks saved under the current commit's short hash
    Bench(bench::BenchArgs),
    /// Install the pre-commit hooks
    Hooks(hooks::HooksArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let global = GlobalArgs { json: cli.json };

    let (json_result, exit_code) = commands::run_json(cli.command, &global);

    if global.json {
        if let Err(err) = output::print_json_result(json_result, exit_code) {
            output::print_error_text(&err);
            return std::process::ExitCode::from(1);
        }
    } else if let Err(err) = &json_result {
        output::print_error_text(err);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code == 0 {
        0
    } else if code < 0 {
        1
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
