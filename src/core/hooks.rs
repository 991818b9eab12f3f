//! Pre-commit hook registration.

use crate::environment::Environment;
use crate::package_root::PackageRoot;
use crate::pipeline::Pipeline;
use crate::step::Step;

/// The hook installer lives in `scripts/`.
pub const ANCESTOR_LEVELS: usize = 2;
pub const DEFAULT_ANCHOR: &str = "scripts/install-hooks";

pub fn build_pipeline(root: &PackageRoot, ambient: &Environment) -> Pipeline {
    Pipeline::new("hooks", root)
        .step(Step::new("pre-commit-install", "pre-commit", root.path(), ambient).arg("install"))
}
