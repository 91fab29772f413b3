//! Heuristic evaluation of a diff: file classification, metrics, findings,
//! and reviewer suggestions.

use std::fmt;
use std::path::Path;

use revu_core::{
    check_range, DiffSource, FindingCategory, HeuristicsConfig, RevuError, Severity,
    LARGE_FILE_THRESHOLD_RANGE,
};
use serde::Serialize;

use crate::classify::FileClass;
use crate::insights::{collect_diff_insights, DiffInsights, DiffOptions};

/// Thresholds and switches for [`evaluate`].
#[derive(Debug, Clone)]
pub struct HeuristicOptions {
    /// Churn at which a text file counts as large.
    pub large_file_threshold: usize,
    pub require_tests_for_code: bool,
    pub warn_on_config_changes: bool,
}

impl Default for HeuristicOptions {
    fn default() -> Self {
        Self::from(&HeuristicsConfig::default())
    }
}

impl From<&HeuristicsConfig> for HeuristicOptions {
    fn from(config: &HeuristicsConfig) -> Self {
        Self {
            large_file_threshold: config.large_file_threshold,
            require_tests_for_code: config.require_tests_for_code,
            warn_on_config_changes: config.warn_on_config_changes,
        }
    }
}

impl HeuristicOptions {
    /// Check the large-file threshold range.
    pub fn validate(&self) -> Result<(), RevuError> {
        check_range(
            "largeFileThreshold",
            self.large_file_threshold,
            &LARGE_FILE_THRESHOLD_RANGE,
        )
    }
}

/// A single categorized observation about a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewFinding {
    /// Stable identifier, e.g. `large-files`.
    pub id: String,
    pub category: FindingCategory,
    pub severity: Severity,
    pub summary: String,
    pub details: String,
    pub affected_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

/// Aggregate counts over the evaluated diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeuristicMetrics {
    pub file_count: usize,
    pub total_additions: u64,
    pub total_deletions: u64,
    pub large_files: usize,
    pub binary_files: usize,
    pub code_files: usize,
    pub test_files: usize,
}

/// Findings, suggestions, and metrics for one diff, plus the diff itself.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use revu_core::{ChangeType, DiffSource};
/// use revu_difflens::heuristics::{evaluate, HeuristicOptions};
/// use revu_difflens::insights::{DiffFileChange, DiffInsights};
///
/// let insights = DiffInsights::new(
///     PathBuf::from("/repo"),
///     DiffSource::Staged,
///     vec![DiffFileChange::new("src/a.ts".into(), ChangeType::Modified, Some(12), Some(3), None)],
/// );
/// let report = evaluate(insights, &HeuristicOptions::default());
/// assert_eq!(report.metrics.code_files, 1);
/// assert!(report.findings.iter().any(|f| f.id == "missing-tests"));
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeuristicReport {
    pub metrics: HeuristicMetrics,
    pub findings: Vec<ReviewFinding>,
    pub suggestions: Vec<String>,
    pub insights: DiffInsights,
}

impl HeuristicReport {
    /// The most severe finding level, if any finding fired.
    pub fn max_severity(&self) -> Option<Severity> {
        self.findings
            .iter()
            .map(|f| f.severity)
            .reduce(|a, b| if b.meets_threshold(a) { b } else { a })
    }

    /// `true` if any finding is at or above `threshold`.
    pub fn has_findings_at(&self, threshold: Severity) -> bool {
        self.findings
            .iter()
            .any(|f| f.severity.meets_threshold(threshold))
    }
}

/// Fetch the diff described by `diff_options` and evaluate it.
///
/// # Errors
///
/// Returns [`RevuError::InvalidInput`] for out-of-range options and
/// [`RevuError::Git`] if acquiring the diff fails.
pub async fn run_heuristics(
    repo_root: &Path,
    diff_options: &DiffOptions,
    options: &HeuristicOptions,
) -> Result<HeuristicReport, RevuError> {
    options.validate()?;
    let insights = collect_diff_insights(repo_root, diff_options).await?;
    Ok(evaluate(insights, options))
}

/// Classify every file in `insights` and derive findings and suggestions.
///
/// Each finding fires at most once and none suppresses another.
pub fn evaluate(insights: DiffInsights, options: &HeuristicOptions) -> HeuristicReport {
    let threshold = options.large_file_threshold as u64;

    let mut large: Vec<(&str, u64, u64)> = Vec::new();
    let mut binaries: Vec<&str> = Vec::new();
    let mut code: Vec<&str> = Vec::new();
    let mut tests: Vec<&str> = Vec::new();
    let mut configs: Vec<&str> = Vec::new();

    for file in &insights.files {
        let class = FileClass::of(&file.path);
        if class.is_code {
            code.push(&file.path);
        }
        if class.is_test {
            tests.push(&file.path);
        }
        if class.is_config {
            configs.push(&file.path);
        }
        if file.is_binary {
            binaries.push(&file.path);
        } else if let (Some(a), Some(d)) = (file.additions, file.deletions) {
            if a + d >= threshold {
                large.push((&file.path, a, d));
            }
        }
    }

    let metrics = HeuristicMetrics {
        file_count: insights.file_count,
        total_additions: insights.total_additions,
        total_deletions: insights.total_deletions,
        large_files: large.len(),
        binary_files: binaries.len(),
        code_files: code.len(),
        test_files: tests.len(),
    };

    let mut findings = Vec::new();

    if !large.is_empty() {
        let details = large
            .iter()
            .map(|(path, a, d)| format!("{path}: {} lines changed (+{a}/-{d})", a + d))
            .collect::<Vec<_>>()
            .join("\n");
        findings.push(ReviewFinding {
            id: "large-files".into(),
            category: FindingCategory::Risk,
            severity: Severity::Warn,
            summary: format!(
                "{} file(s) reach the {threshold}-line churn threshold",
                large.len()
            ),
            details,
            affected_files: large.iter().map(|(p, _, _)| p.to_string()).collect(),
            recommendation: Some(
                "Review large files in a dedicated pass or split them into smaller commits."
                    .into(),
            ),
        });
    }

    if options.require_tests_for_code && !code.is_empty() && tests.is_empty() {
        findings.push(ReviewFinding {
            id: "missing-tests".into(),
            category: FindingCategory::Testing,
            severity: Severity::Warn,
            summary: "Code changed without accompanying test changes".into(),
            details: format!(
                "{} code file(s) changed but no test files were touched.",
                code.len()
            ),
            affected_files: to_owned(&code),
            recommendation: Some("Add or update tests covering the modified code paths.".into()),
        });
    }

    if options.warn_on_config_changes && !configs.is_empty() {
        findings.push(ReviewFinding {
            id: "config-edits".into(),
            category: FindingCategory::Dependencies,
            severity: Severity::Info,
            summary: "Configuration or dependency files changed".into(),
            details: format!(
                "{} manifest, lockfile, CI or configuration file(s) changed.",
                configs.len()
            ),
            affected_files: to_owned(&configs),
            recommendation: Some(
                "Double-check version bumps and environment-specific settings.".into(),
            ),
        });
    }

    if !binaries.is_empty() {
        findings.push(ReviewFinding {
            id: "binary-files".into(),
            category: FindingCategory::Maintenance,
            severity: Severity::Info,
            summary: "Binary files changed".into(),
            details: format!(
                "Line counts are unavailable for {} binary file(s); inspect them manually.",
                binaries.len()
            ),
            affected_files: to_owned(&binaries),
            recommendation: Some("Confirm binary assets are intentional.".into()),
        });
    }

    let suggestions = suggestions_for(insights.is_empty(), insights.source, &findings);

    HeuristicReport {
        metrics,
        findings,
        suggestions,
        insights,
    }
}

fn to_owned(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

fn suggestions_for(empty: bool, source: DiffSource, findings: &[ReviewFinding]) -> Vec<String> {
    let mut suggestions = Vec::new();

    if empty {
        suggestions.push(match source {
            DiffSource::Staged => {
                "Nothing is staged. Stage changes with `git add` or inspect the working tree instead."
                    .to_string()
            }
            DiffSource::Working => "The working tree has no unstaged changes.".to_string(),
        });
    } else if findings.is_empty() {
        suggestions.push(
            "No heuristic concerns detected. Proceed with a manual review of the diff.".into(),
        );
    }

    for finding in findings {
        match finding.id.as_str() {
            "large-files" => suggestions.push(
                "Start with the largest files and consider splitting them into focused commits."
                    .into(),
            ),
            "missing-tests" => suggestions.push(
                "Add tests for the changed code before requesting review.".into(),
            ),
            _ => {}
        }
    }

    suggestions
}

impl fmt::Display for HeuristicReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.metrics;
        writeln!(f, "Heuristic Review ({})", self.insights.source.label())?;
        writeln!(f, "=================")?;
        writeln!(
            f,
            "{} file(s), +{} / -{} | code {} | tests {} | large {} | binary {}",
            m.file_count,
            m.total_additions,
            m.total_deletions,
            m.code_files,
            m.test_files,
            m.large_files,
            m.binary_files
        )?;

        if self.findings.is_empty() {
            writeln!(f, "\nNo findings.")?;
        } else {
            writeln!(f, "\nFindings:")?;
            for finding in &self.findings {
                writeln!(
                    f,
                    "  [{}] {} ({}): {}",
                    finding.severity, finding.id, finding.category, finding.summary
                )?;
                for line in finding.details.lines() {
                    writeln!(f, "      {line}")?;
                }
                if let Some(rec) = &finding.recommendation {
                    writeln!(f, "      -> {rec}")?;
                }
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f, "\nSuggestions:")?;
            for s in &self.suggestions {
                writeln!(f, "  - {s}")?;
            }
        }
        Ok(())
    }
}

impl HeuristicReport {
    /// Render the report as a markdown string.
    pub fn to_markdown(&self) -> String {
        let m = &self.metrics;
        let mut out = String::new();
        out.push_str(&format!(
            "# Heuristic Review ({})\n\n",
            self.insights.source.label()
        ));
        out.push_str("| Files | + | - | Code | Tests | Large | Binary |\n");
        out.push_str("|-------|---|---|------|-------|-------|--------|\n");
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n\n",
            m.file_count,
            m.total_additions,
            m.total_deletions,
            m.code_files,
            m.test_files,
            m.large_files,
            m.binary_files
        ));

        out.push_str("## Findings\n\n");
        if self.findings.is_empty() {
            out.push_str("_No findings._\n\n");
        }
        for finding in &self.findings {
            out.push_str(&format!(
                "### `{}` ({} / {})\n\n{}\n\n",
                finding.id, finding.category, finding.severity, finding.summary
            ));
            for line in finding.details.lines() {
                out.push_str(&format!("> {line}\n"));
            }
            out.push('\n');
            if !finding.affected_files.is_empty() {
                for path in &finding.affected_files {
                    out.push_str(&format!("- `{path}`\n"));
                }
                out.push('\n');
            }
            if let Some(rec) = &finding.recommendation {
                out.push_str(&format!("**Recommendation:** {rec}\n\n"));
            }
        }

        if !self.suggestions.is_empty() {
            out.push_str("## Suggestions\n\n");
            for s in &self.suggestions {
                out.push_str(&format!("- {s}\n"));
            }
        }
        out
    }
}
