//! Configuration read from the package's own `Cargo.toml`.
//!
//! ```toml
//! [package.metadata.preflight]   # or [workspace.metadata.preflight]
//! package-dir = "ndhistogram"
//! doc-flags = "-D warnings"
//!
//! [package.metadata.preflight.readme-tool]
//! subcommand = "sync-readme"
//! package = "cargo-sync-readme"
//! ```
//!
//! Every key is optional.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::package_root::PackageRoot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PreflightConfig {
    #[serde(default = "default_package_dir")]
    pub package_dir: String,

    #[serde(default = "default_cargo")]
    pub cargo: String,

    #[serde(default = "default_doc_flags")]
    pub doc_flags: String,

    #[serde(default)]
    pub readme_tool: ReadmeToolConfig,

    /// Set when the manifest has `[workspace]` but no `[package]`.
    #[serde(skip)]
    pub virtual_manifest: bool,
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            package_dir: default_package_dir(),
            cargo: default_cargo(),
            doc_flags: default_doc_flags(),
            readme_tool: ReadmeToolConfig::default(),
            virtual_manifest: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReadmeToolConfig {
    /// Cargo subcommand, invoked as `cargo <subcommand>`.
    #[serde(default = "default_readme_subcommand")]
    pub subcommand: String,

    /// Crate passed to `cargo install` when the subcommand is missing.
    #[serde(default = "default_readme_package")]
    pub package: String,
}

impl Default for ReadmeToolConfig {
    fn default() -> Self {
        Self {
            subcommand: default_readme_subcommand(),
            package: default_readme_package(),
        }
    }
}

fn default_package_dir() -> String {
    ".".to_string()
}

fn default_cargo() -> String {
    "cargo".to_string()
}

fn default_doc_flags() -> String {
    "-D warnings".to_string()
}

fn default_readme_subcommand() -> String {
    "sync-readme".to_string()
}

fn default_readme_package() -> String {
    "cargo-sync-readme".to_string()
}

#[derive(Debug, Default, Deserialize)]
struct Manifest {
    package: Option<MetadataHolder>,
    workspace: Option<MetadataHolder>,
}

#[derive(Debug, Default, Deserialize)]
struct MetadataHolder {
    metadata: Option<Metadata>,
}

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    preflight: Option<PreflightConfig>,
}

impl PreflightConfig {
    /// Load from `<root>/Cargo.toml`, falling back to defaults when the file
    /// or the table is absent. `[package.metadata]` wins over
    /// `[workspace.metadata]`.
    pub fn load(root: &PackageRoot) -> Result<Self> {
        let path = root.join("Cargo.toml");
        if !path.is_file() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
        })?;
        let config = Self::from_manifest_str(&content)
            .map_err(|e| Error::config_invalid_toml(path.display().to_string(), e))?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_manifest_str(content: &str) -> std::result::Result<Self, String> {
        let manifest: Manifest = toml::from_str(content).map_err(|e| e.to_string())?;
        let virtual_manifest = manifest.package.is_none() && manifest.workspace.is_some();

        let from = |holder: Option<MetadataHolder>| {
            holder
                .and_then(|h| h.metadata)
                .and_then(|m| m.preflight)
        };

        let mut config = from(manifest.package)
            .or_else(|| from(manifest.workspace))
            .unwrap_or_default();
        config.virtual_manifest = virtual_manifest;
        Ok(config)
    }

    /// Override the package directory, e.g. from a CLI flag.
    pub fn with_package_dir(mut self, package_dir: Option<String>) -> Result<Self> {
        if let Some(dir) = package_dir {
            self.package_dir = dir;
        }
        self.validate()?;
        Ok(self)
    }

    /// Package directory must stay inside the root.
    pub fn validate(&self) -> Result<()> {
        let dir = Path::new(&self.package_dir);
        let escapes = dir.is_absolute()
            || dir
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));

        if escapes {
            return Err(Error::config_invalid_value(
                "package-dir",
                Some(self.package_dir.clone()),
                "must be a relative path inside the package root",
            ));
        }

        if self.cargo.trim().is_empty() {
            return Err(Error::config_invalid_value(
                "cargo",
                None,
                "must name a program",
            ));
        }

        Ok(())
    }

    /// Warning for a virtual workspace whose package steps would run in the
    /// workspace root because `package-dir` was left at its default.
    pub fn package_dir_warning(&self) -> Option<String> {
        if self.virtual_manifest && self.package_dir == default_package_dir() {
            return Some(
                "Cargo.toml is a virtual workspace and package-dir is \".\"; \
                 set [workspace.metadata.preflight] package-dir or pass --package-dir"
                    .to_string(),
            );
        }
        None
    }

    pub fn package_path(&self, root: &PackageRoot) -> PathBuf {
        if self.package_dir == "." {
            return root.path().to_path_buf();
        }
        root.join(&self.package_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::package_root;

    #[test]
    fn empty_manifest_uses_defaults() {
        let config = PreflightConfig::from_manifest_str("").unwrap();
        assert_eq!(config, PreflightConfig::default());
        assert_eq!(config.doc_flags, "-D warnings");
        assert_eq!(config.readme_tool.package, "cargo-sync-readme");
    }

    #[test]
    fn reads_workspace_metadata() {
        let config = PreflightConfig::from_manifest_str(
            r#"
[workspace]
members = ["ndhistogram"]

[workspace.metadata.preflight]
package-dir = "ndhistogram"
"#,
        )
        .unwrap();
        assert_eq!(config.package_dir, "ndhistogram");
        assert_eq!(config.cargo, "cargo");
    }

    #[test]
    fn package_metadata_wins_over_workspace() {
        let config = PreflightConfig::from_manifest_str(
            r#"
[package]
name = "demo"

[package.metadata.preflight]
package-dir = "crate-a"

[package.metadata.preflight.readme-tool]
subcommand = "rdme"
package = "cargo-rdme"

[workspace.metadata.preflight]
package-dir = "crate-b"
"#,
        )
        .unwrap();
        assert_eq!(config.package_dir, "crate-a");
        assert_eq!(config.readme_tool.subcommand, "rdme");
        assert_eq!(config.readme_tool.package, "cargo-rdme");
    }

    #[test]
    fn virtual_workspace_without_package_dir_warns() {
        let config =
            PreflightConfig::from_manifest_str("[workspace]\nmembers = [\"ndhistogram\"]\n")
                .unwrap();
        assert!(config.virtual_manifest);
        assert!(config.package_dir_warning().is_some());

        let config = config
            .with_package_dir(Some("ndhistogram".to_string()))
            .unwrap();
        assert_eq!(config.package_dir_warning(), None);
    }

    #[test]
    fn package_manifest_never_warns() {
        let config = PreflightConfig::from_manifest_str("[package]\nname = \"demo\"\n").unwrap();
        assert!(!config.virtual_manifest);
        assert_eq!(config.package_dir_warning(), None);
    }

    #[test]
    fn invalid_toml_is_reported() {
        assert!(PreflightConfig::from_manifest_str("[package").is_err());
    }

    #[test]
    fn load_without_manifest_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let root = package_root::resolve(&dir.path().join("run-checks"), 1).unwrap();
        assert_eq!(PreflightConfig::load(&root).unwrap(), PreflightConfig::default());
    }

    #[test]
    fn load_reports_broken_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Cargo.toml"), "[package\nname = 1").unwrap();
        let root = package_root::resolve(&dir.path().join("run-checks"), 1).unwrap();

        let err = PreflightConfig::load(&root).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidToml);
    }

    #[test]
    fn escaping_package_dir_is_rejected() {
        let err = PreflightConfig::default()
            .with_package_dir(Some("../elsewhere".to_string()))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);
    }

    #[test]
    fn package_path_joins_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = package_root::resolve(&dir.path().join("run-checks"), 1).unwrap();
        let config = PreflightConfig::default()
            .with_package_dir(Some("ndhistogram".to_string()))
            .unwrap();

        assert_eq!(config.package_path(&root), dir.path().join("ndhistogram"));
        assert_eq!(PreflightConfig::default().package_path(&root), dir.path());
    }
}
