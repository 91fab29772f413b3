use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RevuError;
use crate::types::DiffSource;

/// Allowed values for the number of recent commits to include.
pub const RECENT_COMMIT_LIMIT_RANGE: RangeInclusive<usize> = 1..=20;
/// Allowed values for the per-file patch line cap.
pub const MAX_PATCH_LINES_RANGE: RangeInclusive<usize> = 10..=2000;
/// Allowed values for the large-file churn threshold.
pub const LARGE_FILE_THRESHOLD_RANGE: RangeInclusive<usize> = 50..=5000;
/// Allowed values for the heuristics patch context size.
pub const PATCH_CONTEXT_LINES_RANGE: RangeInclusive<usize> = 50..=2000;

/// Top-level configuration loaded from `.revu.toml`.
///
/// Resolution order: tool/CLI arguments > config file > defaults.
///
/// # Examples
///
/// ```
/// use revu_core::RevuConfig;
///
/// let config = RevuConfig::default();
/// assert_eq!(config.heuristics.large_file_threshold, 400);
/// assert_eq!(config.diff.max_patch_lines, 400);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevuConfig {
    /// Repository context collection settings.
    #[serde(default)]
    pub context: ContextConfig,
    /// Diff acquisition settings.
    #[serde(default)]
    pub diff: DiffConfig,
    /// Heuristic evaluation settings.
    #[serde(default)]
    pub heuristics: HeuristicsConfig,
}

impl RevuConfig {
    /// Load and validate configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RevuError::Io`] if the file cannot be read,
    /// [`RevuError::Toml`] if the content is not valid TOML, or
    /// [`RevuError::InvalidInput`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, RevuError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Examples
    ///
    /// ```
    /// use revu_core::RevuConfig;
    ///
    /// let toml = r#"
    /// [heuristics]
    /// large_file_threshold = 120
    /// "#;
    /// let config = RevuConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.heuristics.large_file_threshold, 120);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, RevuError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.revu.toml` from `dir` if present, otherwise return defaults.
    pub fn discover(dir: &Path) -> Result<Self, RevuError> {
        let path = dir.join(".revu.toml");
        if path.is_file() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check every numeric setting against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`RevuError::InvalidInput`] naming the first offending key.
    pub fn validate(&self) -> Result<(), RevuError> {
        check_range(
            "context.recent_commit_limit",
            self.context.recent_commit_limit,
            &RECENT_COMMIT_LIMIT_RANGE,
        )?;
        check_range(
            "diff.max_patch_lines",
            self.diff.max_patch_lines,
            &MAX_PATCH_LINES_RANGE,
        )?;
        check_range(
            "heuristics.large_file_threshold",
            self.heuristics.large_file_threshold,
            &LARGE_FILE_THRESHOLD_RANGE,
        )?;
        check_range(
            "heuristics.patch_context_lines",
            self.heuristics.patch_context_lines,
            &PATCH_CONTEXT_LINES_RANGE,
        )?;
        Ok(())
    }
}

/// Fail with [`RevuError::InvalidInput`] unless `value` lies in `range`.
///
/// # Examples
///
/// ```
/// use revu_core::check_range;
///
/// assert!(check_range("limit", 5, &(1..=20)).is_ok());
/// assert!(check_range("limit", 21, &(1..=20)).is_err());
/// ```
pub fn check_range(
    name: &str,
    value: usize,
    range: &RangeInclusive<usize>,
) -> Result<(), RevuError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(RevuError::InvalidInput(format!(
            "{name} must be between {} and {} (got {value})",
            range.start(),
            range.end()
        )))
    }
}

/// Defaults for the `collect-context` operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Include the short status report (default: true).
    #[serde(default = "default_true")]
    pub include_git_status: bool,
    /// Include recent commits (default: false).
    #[serde(default)]
    pub include_recent_commits: bool,
    /// How many commits to include, 1–20 (default: 5).
    #[serde(default = "default_recent_commit_limit")]
    pub recent_commit_limit: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            include_git_status: true,
            include_recent_commits: false,
            recent_commit_limit: default_recent_commit_limit(),
        }
    }
}

/// Defaults for the `diff-insights` operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Compare against the index or the working tree (default: staged).
    #[serde(default)]
    pub source: DiffSource,
    /// Attach truncated unified patches to each file (default: false).
    #[serde(default)]
    pub include_patch: bool,
    /// Maximum lines kept per attached patch, 10–2000 (default: 400).
    #[serde(default = "default_max_patch_lines")]
    pub max_patch_lines: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            source: DiffSource::default(),
            include_patch: false,
            max_patch_lines: default_max_patch_lines(),
        }
    }
}

/// Defaults for the `run-heuristics` operation.
///
/// # Examples
///
/// ```
/// use revu_core::HeuristicsConfig;
///
/// let config = HeuristicsConfig::default();
/// assert!(config.require_tests_for_code);
/// assert!(config.warn_on_config_changes);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicsConfig {
    /// Churn (additions + deletions) at which a file counts as large, 50–5000.
    #[serde(default = "default_large_file_threshold")]
    pub large_file_threshold: usize,
    /// Flag code changes that arrive without test changes (default: true).
    #[serde(default = "default_true")]
    pub require_tests_for_code: bool,
    /// Flag manifest, lockfile, and CI edits (default: true).
    #[serde(default = "default_true")]
    pub warn_on_config_changes: bool,
    /// Patch line cap forwarded to diff acquisition, 50–2000 (default: 400).
    #[serde(default = "default_patch_context_lines")]
    pub patch_context_lines: usize,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            large_file_threshold: default_large_file_threshold(),
            require_tests_for_code: true,
            warn_on_config_changes: true,
            patch_context_lines: default_patch_context_lines(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_recent_commit_limit() -> usize {
    5
}

fn default_max_patch_lines() -> usize {
    400
}

fn default_large_file_threshold() -> usize {
    400
}

fn default_patch_context_lines() -> usize {
    400
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = RevuConfig::default();
        assert!(config.context.include_git_status);
        assert!(!config.context.include_recent_commits);
        assert_eq!(config.context.recent_commit_limit, 5);
        assert_eq!(config.diff.source, DiffSource::Staged);
        assert!(!config.diff.include_patch);
        assert_eq!(config.diff.max_patch_lines, 400);
        assert_eq!(config.heuristics.large_file_threshold, 400);
        assert!(config.heuristics.require_tests_for_code);
        assert!(config.heuristics.warn_on_config_changes);
        assert_eq!(config.heuristics.patch_context_lines, 400);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[context]
include_recent_commits = true
recent_commit_limit = 10

[diff]
source = "working"
include_patch = true
max_patch_lines = 50

[heuristics]
large_file_threshold = 200
require_tests_for_code = false
warn_on_config_changes = false
"#;
        let config = RevuConfig::from_toml(toml).unwrap();
        assert!(config.context.include_recent_commits);
        assert_eq!(config.context.recent_commit_limit, 10);
        assert_eq!(config.diff.source, DiffSource::Working);
        assert!(config.diff.include_patch);
        assert_eq!(config.diff.max_patch_lines, 50);
        assert_eq!(config.heuristics.large_file_threshold, 200);
        assert!(!config.heuristics.require_tests_for_code);
        assert!(!config.heuristics.warn_on_config_changes);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = RevuConfig::from_toml("").unwrap();
        assert_eq!(config.heuristics.large_file_threshold, 400);
        assert_eq!(config.context.recent_commit_limit, 5);
    }

    #[test]
    fn invalid_toml_returns_error() {
        assert!(RevuConfig::from_toml("{{invalid}}").is_err());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = RevuConfig::from_toml("[heuristics]\nlarge_file_threshold = 10\n").unwrap_err();
        assert!(err.to_string().contains("heuristics.large_file_threshold"));

        let err = RevuConfig::from_toml("[context]\nrecent_commit_limit = 0\n").unwrap_err();
        assert!(err.to_string().contains("context.recent_commit_limit"));

        let err = RevuConfig::from_toml("[diff]\nmax_patch_lines = 2001\n").unwrap_err();
        assert!(err.to_string().contains("diff.max_patch_lines"));
    }

    #[test]
    fn check_range_is_inclusive() {
        assert!(check_range("x", 50, &LARGE_FILE_THRESHOLD_RANGE).is_ok());
        assert!(check_range("x", 5000, &LARGE_FILE_THRESHOLD_RANGE).is_ok());
        assert!(check_range("x", 49, &LARGE_FILE_THRESHOLD_RANGE).is_err());
    }

    #[test]
    fn discover_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RevuConfig::discover(dir.path()).unwrap();
        assert_eq!(config.diff.max_patch_lines, 400);
    }

    #[test]
    fn discover_reads_local_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".revu.toml"), "[diff]\nmax_patch_lines = 25\n").unwrap();
        let config = RevuConfig::discover(dir.path()).unwrap();
        assert_eq!(config.diff.max_patch_lines, 25);
    }
}
