use crate::environment::Environment;
use crate::error::Result;
use crate::package_root::PackageRoot;
use crate::runner::CommandRunner;
use crate::step::Step;

/// Step printing the abbreviated hash of `HEAD`. Runs in probing mode with
/// stdout captured; stderr still reaches the terminal.
pub fn short_head_step(root: &PackageRoot, env: &Environment) -> Step {
    Step::new("git-short-hash", "git", root.path(), env)
        .args(["rev-parse", "--short", "HEAD"])
        .probe()
        .capture_stdout()
}

/// Abbreviated hash of the commit checked out at `root`.
///
/// The git call is not fail-fast: its exit status is ignored and whatever it
/// printed is used, even nothing. Only a failure to spawn git is an error.
pub fn short_head_hash(
    runner: &dyn CommandRunner,
    root: &PackageRoot,
    env: &Environment,
) -> Result<String> {
    let outcome = short_head_step(root, env).execute(runner)?;
    Ok(outcome.stdout.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package_root;
    use crate::runner::ExitOutcome;
    use crate::step::StepMode;

    struct GitRunner {
        code: i32,
        stdout: &'static str,
    }

    impl CommandRunner for GitRunner {
        fn run(&self, step: &Step) -> Result<ExitOutcome> {
            assert!(step.capture_stdout);
            assert_eq!(step.mode, StepMode::Probe);
            // The real runner trims trailing newlines from captured output.
            let stdout = crate::utils::command::trim_trailing_newlines(self.stdout);
            Ok(ExitOutcome::new(Some(self.code), Some(stdout.to_string())))
        }
    }

    fn root() -> PackageRoot {
        package_root::resolve(&std::env::temp_dir().join("run-bench"), 1).unwrap()
    }

    #[test]
    fn hash_is_returned_without_newline() {
        let runner = GitRunner {
            code: 0,
            stdout: "abc1234\n",
        };
        let hash = short_head_hash(&runner, &root(), &Environment::default()).unwrap();
        assert_eq!(hash, "abc1234");
    }

    #[test]
    fn non_zero_exit_does_not_abort_when_output_exists() {
        let runner = GitRunner {
            code: 128,
            stdout: "abc1234\n",
        };
        let hash = short_head_hash(&runner, &root(), &Environment::default()).unwrap();
        assert_eq!(hash, "abc1234");
    }

    #[test]
    fn failed_git_yields_empty_label() {
        let runner = GitRunner {
            code: 128,
            stdout: "",
        };
        let hash = short_head_hash(&runner, &root(), &Environment::default()).unwrap();
        assert_eq!(hash, "");
    }

    #[test]
    fn step_targets_head_in_root() {
        let root = root();
        let step = short_head_step(&root, &Environment::default());
        assert_eq!(step.display(), "git rev-parse --short HEAD");
        assert_eq!(step.working_dir, root.path());
    }
}
