//! Explicit environment mappings handed to every step.
//!
//! The process environment is snapshotted once with [`Environment::ambient`]
//! and threaded through the pipeline builders, so tests can substitute a
//! controlled mapping without touching real process state.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};

/// Variable that tells rustdoc how to treat warnings.
pub const RUSTDOCFLAGS: &str = "RUSTDOCFLAGS";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<OsString, OsString>,
}

impl Environment {
    /// Snapshot of the current process environment.
    pub fn ambient() -> Self {
        Self {
            vars: std::env::vars_os().collect(),
        }
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<OsString>,
        V: Into<OsString>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Fresh copy of this mapping with `overrides` inserted or replaced.
    ///
    /// `self` is left untouched; override keys always win.
    pub fn overlay<K, V>(&self, overrides: &[(K, V)]) -> Self
    where
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        let mut vars = self.vars.clone();
        for (key, value) in overrides {
            vars.insert(key.as_ref().to_os_string(), value.as_ref().to_os_string());
        }
        Self { vars }
    }

    pub fn get(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        self.vars.get(key.as_ref()).map(OsString::as_os_str)
    }

    pub fn contains_key(&self, key: impl AsRef<OsStr>) -> bool {
        self.vars.contains_key(key.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Environment {
        Environment::from_pairs([
            ("PATH", "/usr/bin"),
            ("HOME", "/home/dev"),
            (RUSTDOCFLAGS, "--cfg docsrs"),
        ])
    }

    #[test]
    fn overlay_keeps_every_ambient_key() {
        let ambient = snapshot();
        let overlay = ambient.overlay(&[(RUSTDOCFLAGS, "-D warnings")]);

        for (key, _) in ambient.iter() {
            assert!(overlay.contains_key(key), "missing {:?}", key);
        }
        assert_eq!(overlay.get("PATH"), Some(OsStr::new("/usr/bin")));
        assert_eq!(overlay.get("HOME"), Some(OsStr::new("/home/dev")));
    }

    #[test]
    fn overlay_value_wins_over_ambient() {
        let overlay = snapshot().overlay(&[(RUSTDOCFLAGS, "-D warnings")]);
        assert_eq!(overlay.get(RUSTDOCFLAGS), Some(OsStr::new("-D warnings")));
        assert_eq!(overlay.iter().count(), 3);
    }

    #[test]
    fn overlay_adds_new_keys() {
        let ambient = Environment::from_pairs([("PATH", "/bin")]);
        let overlay = ambient.overlay(&[(RUSTDOCFLAGS, "-D warnings")]);
        assert_eq!(overlay.iter().count(), 2);
        assert!(overlay.contains_key(RUSTDOCFLAGS));
    }

    #[test]
    fn overlay_does_not_mutate_source() {
        let ambient = snapshot();
        let before = ambient.clone();
        let _ = ambient.overlay(&[(RUSTDOCFLAGS, "-D warnings"), ("EXTRA", "1")]);
        assert_eq!(ambient, before);
    }

    #[test]
    fn ambient_snapshot_matches_process() {
        let ambient = Environment::ambient();
        for (key, value) in std::env::vars_os() {
            assert_eq!(ambient.get(&key), Some(value.as_os_str()));
        }
    }
}
