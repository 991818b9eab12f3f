//! Helpers for interpreting captured command output.

/// Decode captured stdout and strip trailing newline characters.
///
/// Only line terminators are removed; other surrounding whitespace is kept.
pub fn stdout_text(stdout: &[u8]) -> String {
    trim_trailing_newlines(&String::from_utf8_lossy(stdout)).to_string()
}

pub fn trim_trailing_newlines(text: &str) -> &str {
    text.trim_end_matches(['\n', '\r'])
}
