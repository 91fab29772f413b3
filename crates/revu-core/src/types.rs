use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Per-file change classification, serialized as git's single-letter code.
///
/// # Examples
///
/// ```
/// use revu_core::ChangeType;
///
/// assert_eq!(ChangeType::from_code("R100"), Some(ChangeType::Renamed));
/// assert_eq!(ChangeType::Added.code(), 'A');
/// assert_eq!(serde_json::to_string(&ChangeType::Deleted).unwrap(), "\"D\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeType {
    /// New file.
    #[serde(rename = "A")]
    Added,
    /// Existing file modified in place.
    #[serde(rename = "M")]
    Modified,
    /// File removed.
    #[serde(rename = "D")]
    Deleted,
    /// File moved from a previous path.
    #[serde(rename = "R")]
    Renamed,
    /// File copied from another path.
    #[serde(rename = "C")]
    Copied,
    /// File type changed (e.g. regular file to symlink).
    #[serde(rename = "T")]
    TypeChanged,
    /// Unmerged path.
    #[serde(rename = "U")]
    Unmerged,
}

impl ChangeType {
    /// Parse a git name-status code such as `M`, `A`, or `R087`.
    ///
    /// Only the leading letter matters; similarity scores are ignored.
    /// Returns `None` for codes git documents as unknown (`X`) or that are
    /// not recognized at all.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().chars().next()? {
            'A' => Some(ChangeType::Added),
            'M' => Some(ChangeType::Modified),
            'D' => Some(ChangeType::Deleted),
            'R' => Some(ChangeType::Renamed),
            'C' => Some(ChangeType::Copied),
            'T' => Some(ChangeType::TypeChanged),
            'U' => Some(ChangeType::Unmerged),
            _ => None,
        }
    }

    /// The single-letter git code.
    pub fn code(self) -> char {
        match self {
            ChangeType::Added => 'A',
            ChangeType::Modified => 'M',
            ChangeType::Deleted => 'D',
            ChangeType::Renamed => 'R',
            ChangeType::Copied => 'C',
            ChangeType::TypeChanged => 'T',
            ChangeType::Unmerged => 'U',
        }
    }

    /// Whether this change carries a previous path.
    pub fn has_previous_path(self) -> bool {
        matches!(self, ChangeType::Renamed | ChangeType::Copied)
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Which side of the repository a diff is computed against.
///
/// # Examples
///
/// ```
/// use revu_core::DiffSource;
///
/// let source: DiffSource = "working".parse().unwrap();
/// assert_eq!(source, DiffSource::Working);
/// assert_eq!(DiffSource::default(), DiffSource::Staged);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffSource {
    /// Changes recorded in the index (`git diff --cached`).
    #[default]
    Staged,
    /// Unstaged edits in the working tree (`git diff`).
    Working,
}

impl DiffSource {
    /// Human-readable label used in summaries.
    pub fn label(self) -> &'static str {
        match self {
            DiffSource::Staged => "staged",
            DiffSource::Working => "working tree",
        }
    }
}

impl fmt::Display for DiffSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffSource::Staged => write!(f, "staged"),
            DiffSource::Working => write!(f, "working"),
        }
    }
}

impl FromStr for DiffSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "staged" | "cached" | "index" => Ok(DiffSource::Staged),
            "working" | "worktree" | "working-tree" => Ok(DiffSource::Working),
            other => Err(format!("unknown diff source: {other}")),
        }
    }
}

/// Severity of a heuristic finding.
///
/// # Examples
///
/// ```
/// use revu_core::Severity;
///
/// assert!(Severity::Critical.meets_threshold(Severity::Warn));
/// assert!(!Severity::Info.meets_threshold(Severity::Warn));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational observation.
    Info,
    /// Worth a second look before merging.
    Warn,
    /// Should block the change.
    Critical,
}

impl Severity {
    /// Returns `true` if `self` is at least as severe as `threshold`.
    pub fn meets_threshold(self, threshold: Severity) -> bool {
        self.rank() >= threshold.rank()
    }

    fn rank(self) -> u8 {
        match self {
            Severity::Info => 0,
            Severity::Warn => 1,
            Severity::Critical => 2,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warn => write!(f, "warn"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "critical" => Ok(Severity::Critical),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// Grouping for heuristic findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingCategory {
    Testing,
    Risk,
    Dependencies,
    Maintenance,
    General,
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingCategory::Testing => write!(f, "testing"),
            FindingCategory::Risk => write!(f, "risk"),
            FindingCategory::Dependencies => write!(f, "dependencies"),
            FindingCategory::Maintenance => write!(f, "maintenance"),
            FindingCategory::General => write!(f, "general"),
        }
    }
}

/// Output format for CLI subcommands.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use revu_core::OutputFormat;
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summaries.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
