use std::path::PathBuf;

use clap::Args;

pub mod bench;
pub mod check;
pub mod hooks;

pub type CmdResult<T> = preflight::Result<(T, i32)>;

pub(crate) struct GlobalArgs {
    /// Print the JSON envelope on stdout.
    pub json: bool,
}

/// Where the package root is resolved from.
#[derive(Args, Default, Debug)]
pub struct AnchorArgs {
    /// Path of the entry-point script the package root is resolved from
    /// (default: the entry point's conventional location under the current
    /// directory)
    #[arg(long, value_name = "PATH")]
    pub anchor: Option<String>,
}

impl AnchorArgs {
    /// Entry-point path with `~` expanded, or `default_anchor`.
    pub fn path(&self, default_anchor: &str) -> PathBuf {
        match &self.anchor {
            Some(path) => PathBuf::from(shellexpand::tilde(path).into_owned()),
            None => PathBuf::from(default_anchor),
        }
    }
}

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (preflight::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Check(args) => dispatch!(args, global, check),
        crate::Commands::Bench(args) => dispatch!(args, global, bench),
        crate::Commands::Hooks(args) => dispatch!(args, global, hooks),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_anchor_is_used_as_given() {
        let args = AnchorArgs {
            anchor: Some("/srv/pkg/scripts/run-checks".to_string()),
        };
        assert_eq!(
            args.path("unused"),
            PathBuf::from("/srv/pkg/scripts/run-checks")
        );
    }

    #[test]
    fn missing_anchor_falls_back_to_default() {
        let args = AnchorArgs::default();
        assert_eq!(args.path("scripts/run-bench"), PathBuf::from("scripts/run-bench"));
    }

    #[test]
    fn tilde_is_expanded() {
        let args = AnchorArgs {
            anchor: Some("~/pkg/run-checks".to_string()),
        };
        let path = args.path("unused");
        assert!(!path.starts_with("~"));
        assert!(path.ends_with("pkg/run-checks"));
    }
}
