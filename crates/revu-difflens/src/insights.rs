//! Diff acquisition and the merged change model.
//!
//! [`collect_diff_insights`] issues the three `git diff` forms in sequence
//! (name-status, numstat, and optionally the unified patch) against one
//! repository, then merges and annotates them into a [`DiffInsights`].

use std::fmt;
use std::path::{Path, PathBuf};

use revu_core::{check_range, ChangeType, DiffConfig, DiffSource, RevuError, MAX_PATCH_LINES_RANGE};
use revu_gitpulse::git::run_git;
use serde::Serialize;

use crate::merge::merge_changes;
use crate::parser::{parse_name_status, parse_numstat};
use crate::patch::attach_patches;

/// One changed file in a diff.
///
/// `is_binary` is true when either count is unknown, and for paths git
/// listed without any line counts (see [`DiffFileChange::uncounted`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffFileChange {
    /// Current path, normalized to forward slashes.
    pub path: String,
    /// Kind of change.
    pub change_type: ChangeType,
    /// Added lines, `None` when git cannot count them.
    pub additions: Option<u64>,
    /// Deleted lines, `None` when git cannot count them.
    pub deletions: Option<u64>,
    /// Derived from the counts.
    pub is_binary: bool,
    /// Source path for renames and copies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_path: Option<String>,
    /// Possibly truncated unified diff for this file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
}

impl DiffFileChange {
    /// Build a record, deriving `is_binary` from the counts.
    ///
    /// # Examples
    ///
    /// ```
    /// use revu_core::ChangeType;
    /// use revu_difflens::insights::DiffFileChange;
    ///
    /// let text = DiffFileChange::new("a.rs".into(), ChangeType::Modified, Some(1), Some(2), None);
    /// assert!(!text.is_binary);
    ///
    /// let blob = DiffFileChange::new("a.png".into(), ChangeType::Added, None, None, None);
    /// assert!(blob.is_binary);
    /// ```
    pub fn new(
        path: String,
        change_type: ChangeType,
        additions: Option<u64>,
        deletions: Option<u64>,
        previous_path: Option<String>,
    ) -> Self {
        Self {
            path,
            change_type,
            additions,
            deletions,
            is_binary: additions.is_none() || deletions.is_none(),
            previous_path,
            patch: None,
        }
    }

    /// Build a record for a path that name-status reported but numstat did
    /// not. Counts are zero and the file is treated as binary.
    ///
    /// # Examples
    ///
    /// ```
    /// use revu_core::ChangeType;
    /// use revu_difflens::insights::DiffFileChange;
    ///
    /// let moved = DiffFileChange::uncounted("new.bin".into(), ChangeType::Renamed, Some("old.bin".into()));
    /// assert!(moved.is_binary);
    /// assert_eq!(moved.churn(), Some(0));
    /// ```
    pub fn uncounted(path: String, change_type: ChangeType, previous_path: Option<String>) -> Self {
        Self {
            is_binary: true,
            ..Self::new(path, change_type, Some(0), Some(0), previous_path)
        }
    }

    /// Additions plus deletions, when both are known.
    pub fn churn(&self) -> Option<u64> {
        Some(self.additions? + self.deletions?)
    }
}

/// Options for [`collect_diff_insights`].
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Staged (index vs HEAD) or working tree (worktree vs index).
    pub source: DiffSource,
    /// Restrict the diff to these paths; empty means everything.
    pub paths: Vec<String>,
    /// Fetch and attach per-file patches.
    pub include_patch: bool,
    /// Line limit for each attached patch.
    pub max_patch_lines: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self::from(&DiffConfig::default())
    }
}

impl From<&DiffConfig> for DiffOptions {
    fn from(config: &DiffConfig) -> Self {
        Self {
            source: config.source,
            paths: Vec::new(),
            include_patch: config.include_patch,
            max_patch_lines: config.max_patch_lines,
        }
    }
}

impl DiffOptions {
    /// Check the patch line limit range.
    pub fn validate(&self) -> Result<(), RevuError> {
        check_range("maxPatchLines", self.max_patch_lines, &MAX_PATCH_LINES_RANGE)
    }
}

/// Merged view of a staged or working-tree diff.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use revu_core::{ChangeType, DiffSource};
/// use revu_difflens::insights::{DiffFileChange, DiffInsights};
///
/// let insights = DiffInsights::new(
///     PathBuf::from("/repo"),
///     DiffSource::Staged,
///     vec![
///         DiffFileChange::new("src/a.ts".into(), ChangeType::Modified, Some(12), Some(3), None),
///         DiffFileChange::new("img.png".into(), ChangeType::Added, None, None, None),
///     ],
/// );
/// assert_eq!(insights.file_count, 2);
/// assert_eq!(insights.total_additions, 12);
/// assert_eq!(insights.total_deletions, 3);
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffInsights {
    pub repository_root: PathBuf,
    pub source: DiffSource,
    pub file_count: usize,
    pub total_additions: u64,
    pub total_deletions: u64,
    pub files: Vec<DiffFileChange>,
}

impl DiffInsights {
    /// Wrap `files`, computing the count and totals. Unknown counts add zero.
    pub fn new(repository_root: PathBuf, source: DiffSource, files: Vec<DiffFileChange>) -> Self {
        let total_additions = files.iter().filter_map(|f| f.additions).sum();
        let total_deletions = files.iter().filter_map(|f| f.deletions).sum();
        Self {
            repository_root,
            source,
            file_count: files.len(),
            total_additions,
            total_deletions,
            files,
        }
    }

    /// `true` when no files changed.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Attached patches concatenated under per-file headings, or `None`
    /// when no file carries a patch.
    pub fn patch_appendix(&self) -> Option<String> {
        let mut out = String::new();
        for file in &self.files {
            let Some(patch) = &file.patch else {
                continue;
            };
            out.push_str(&format!("### {}\n\n```diff\n{}", file.path, patch));
            if !patch.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n\n");
        }
        if out.is_empty() {
            None
        } else {
            Some(out.trim_end().to_string())
        }
    }

    /// Render the diff summary as markdown.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# Diff Insights ({})\n\n", self.source.label()));
        out.push_str(&format!(
            "**Root:** `{}`\n\n",
            self.repository_root.display()
        ));

        if self.is_empty() {
            out.push_str(&format!("_No {} changes._\n", self.source.label()));
            return out;
        }

        out.push_str(&format!(
            "**{} file(s) changed**, +{} / -{}\n\n",
            self.file_count, self.total_additions, self.total_deletions
        ));
        out.push_str("| Status | File | + | - |\n");
        out.push_str("|--------|------|---|---|\n");
        for file in &self.files {
            let name = match &file.previous_path {
                Some(prev) => format!("`{prev}` → `{}`", file.path),
                None => format!("`{}`", file.path),
            };
            out.push_str(&format!(
                "| {} | {name} | {} | {} |\n",
                file.change_type,
                count_cell(file.additions),
                count_cell(file.deletions)
            ));
        }

        if let Some(appendix) = self.patch_appendix() {
            out.push_str("\n## Patches\n\n");
            out.push_str(&appendix);
            out.push('\n');
        }
        out
    }
}

fn count_cell(count: Option<u64>) -> String {
    count.map_or_else(|| "bin".to_string(), |n| n.to_string())
}

impl fmt::Display for DiffInsights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Diff insights ({}) for {}",
            self.source.label(),
            self.repository_root.display()
        )?;

        if self.is_empty() {
            return writeln!(f, "No {} changes.", self.source.label());
        }

        writeln!(
            f,
            "{} file(s) changed, +{} / -{}",
            self.file_count, self.total_additions, self.total_deletions
        )?;
        for file in &self.files {
            let counts = match (file.additions, file.deletions) {
                (Some(a), Some(d)) => format!("+{a}/-{d}"),
                _ => "binary".to_string(),
            };
            match &file.previous_path {
                Some(prev) => writeln!(
                    f,
                    "  {} {} (from {prev}) {counts}",
                    file.change_type, file.path
                )?,
                None => writeln!(f, "  {} {} {counts}", file.change_type, file.path)?,
            }
        }
        Ok(())
    }
}

/// Build the argument vector for one `git diff` form.
///
/// # Examples
///
/// ```
/// use revu_core::DiffSource;
/// use revu_difflens::insights::diff_args;
///
/// let args = diff_args(DiffSource::Staged, &["--numstat"], &["src".to_string()]);
/// assert_eq!(args, ["diff", "--no-color", "-M", "--cached", "--numstat", "--", "src"]);
///
/// let args = diff_args(DiffSource::Working, &["--name-status"], &[]);
/// assert_eq!(args, ["diff", "--no-color", "-M", "--name-status"]);
/// ```
pub fn diff_args(source: DiffSource, form: &[&str], paths: &[String]) -> Vec<String> {
    let mut args: Vec<String> = vec!["diff".into(), "--no-color".into(), "-M".into()];
    if source == DiffSource::Staged {
        args.push("--cached".into());
    }
    args.extend(form.iter().map(|s| s.to_string()));
    if !paths.is_empty() {
        args.push("--".into());
        args.extend(paths.iter().cloned());
    }
    args
}

/// Flags for the unified patch form. The explicit prefixes override
/// `diff.noprefix` and `diff.mnemonicPrefix` so headers always read
/// `a/<path> b/<path>`.
pub const PATCH_FORM: &[&str] = &[
    "--no-ext-diff",
    "--unified=3",
    "--src-prefix=a/",
    "--dst-prefix=b/",
];

/// Acquire, merge, and optionally patch-annotate the diff of `repo_root`.
///
/// `repo_root` must be a repository top-level directory; path filters are
/// interpreted relative to it.
///
/// # Errors
///
/// Returns [`RevuError::InvalidInput`] for an out-of-range patch limit and
/// [`RevuError::Git`] if any `git diff` invocation fails.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use revu_difflens::insights::{collect_diff_insights, DiffOptions};
///
/// # async fn example() -> Result<(), revu_core::RevuError> {
/// let insights = collect_diff_insights(Path::new("."), &DiffOptions::default()).await?;
/// println!("{insights}");
/// # Ok(())
/// # }
/// ```
pub async fn collect_diff_insights(
    repo_root: &Path,
    options: &DiffOptions,
) -> Result<DiffInsights, RevuError> {
    options.validate()?;
    let paths = relative_paths(repo_root, &options.paths);

    let name_status = run_git(
        repo_root,
        diff_args(options.source, &["--name-status"], &paths),
    )
    .await?;
    let numstat = run_git(repo_root, diff_args(options.source, &["--numstat"], &paths)).await?;

    let filter = (!paths.is_empty()).then_some(paths.as_slice());
    let mut files = merge_changes(
        parse_numstat(&numstat),
        parse_name_status(&name_status),
        filter,
    );

    if options.include_patch && !files.is_empty() {
        let raw = run_git(
            repo_root,
            diff_args(options.source, PATCH_FORM, &paths),
        )
        .await?;
        let attached = attach_patches(&mut files, &raw, options.max_patch_lines);
        tracing::debug!(attached, files = files.len(), "attached patches");
    }

    Ok(DiffInsights::new(
        repo_root.to_path_buf(),
        options.source,
        files,
    ))
}

// Absolute filters inside the repository become root-relative; anything else
// is passed through for git to interpret.
fn relative_paths(repo_root: &Path, paths: &[String]) -> Vec<String> {
    paths
        .iter()
        .filter(|p| !p.trim().is_empty())
        .map(|p| {
            Path::new(p)
                .strip_prefix(repo_root)
                .ok()
                .map(|rel| {
                    let rel = rel.to_string_lossy().into_owned();
                    if rel.is_empty() {
                        ".".to_string()
                    } else {
                        rel
                    }
                })
                .unwrap_or_else(|| p.clone())
        })
        .collect()
}
