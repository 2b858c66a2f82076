//! ESLint JSON results.
//!
//! The file is whatever `eslint --format json` wrote. Only the fields needed
//! for reporting are read; everything else is ignored.

use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer};
use serde::Deserialize;
use tracing::debug;

use crate::error::LoadError;

/// All per-file results, in the order the linter wrote them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintResultSet {
    files: Vec<FileLintResult>,
}

/// Findings for one source file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileLintResult {
    /// Absolute path as reported by the linter
    pub file_path: PathBuf,

    #[serde(default)]
    pub error_count: u64,

    #[serde(default)]
    pub messages: Vec<LintMessage>,
}

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintMessage {
    pub message: String,

    /// Absent for parser errors
    #[serde(default)]
    pub rule_id: Option<String>,

    /// 1-based line; absent for file-level messages
    #[serde(default)]
    pub line: Option<u32>,

    pub severity: Severity,
}

/// ESLint severity: `1` is a warning, `2` an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match u8::deserialize(deserializer)? {
            1 => Ok(Severity::Warning),
            2 => Ok(Severity::Error),
            other => Err(de::Error::custom(format!(
                "unknown severity {other}, expected 1 (warning) or 2 (error)"
            ))),
        }
    }
}

impl LintResultSet {
    #[must_use]
    pub fn new(files: Vec<FileLintResult>) -> Self {
        Self { files }
    }

    #[must_use]
    pub fn files(&self) -> &[FileLintResult] {
        &self.files
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sum of `errorCount` over every file.
    #[must_use]
    pub fn total_errors(&self) -> u64 {
        self.files.iter().map(|file| file.error_count).sum()
    }
}

/// Load a result set from `path`, resolved against `cwd` when relative.
///
/// A JSON `null` document yields an empty set.
///
/// # Errors
///
/// [`LoadError::Read`] when the file cannot be read, [`LoadError::Parse`]
/// when it is not an ESLint result array.
pub fn load_results(path: &Path, cwd: &Path) -> Result<LintResultSet, LoadError> {
    let resolved = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    let raw = std::fs::read_to_string(&resolved).map_err(|source| LoadError::Read {
        path: resolved.clone(),
        source,
    })?;

    let files: Option<Vec<FileLintResult>> =
        serde_json::from_str(&raw).map_err(|source| LoadError::Parse {
            path: resolved.clone(),
            source,
        })?;

    let results = LintResultSet::new(files.unwrap_or_default());
    debug!(
        path = %resolved.display(),
        files = results.files().len(),
        "Loaded lint results"
    );
    Ok(results)
}
