//! Package root resolution from an entry-point script location.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};

/// Absolute path of the package under verification. Only constructed by
/// [`resolve`], so it always existed at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PackageRoot(PathBuf);

impl PackageRoot {
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Path of a directory below the root.
    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.0.join(relative)
    }
}

/// Resolve the package root as the `levels`-th ancestor of `anchor`.
///
/// `levels == 1` is the directory containing the script. A relative anchor is
/// taken relative to the current directory. The anchor itself does not have
/// to exist; the resolved root must be an existing directory.
pub fn resolve(anchor: &Path, levels: usize) -> Result<PackageRoot> {
    if anchor.as_os_str().is_empty() {
        return Err(Error::validation_invalid_argument(
            "anchor",
            "must name the entry-point script",
        ));
    }

    let anchor = absolute(anchor)?;
    let anchor_display = anchor.display().to_string();

    let root = anchor
        .ancestors()
        .nth(levels)
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| Error::path_resolution_failed(&anchor_display, levels, None))?;

    if !root.is_dir() {
        return Err(Error::path_resolution_failed(
            anchor_display,
            levels,
            Some(root.display().to_string()),
        ));
    }

    Ok(PackageRoot(root.to_path_buf()))
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let cwd = std::env::current_dir().map_err(|e| {
        Error::internal_io(e.to_string(), Some("read current directory".to_string()))
    })?;
    Ok(cwd.join(path))
}
