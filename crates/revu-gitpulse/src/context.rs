//! Repository context collection: root, status, and recent history.

use std::fmt;
use std::path::{Path, PathBuf};

use revu_core::{check_range, ContextConfig, RevuError, RECENT_COMMIT_LIMIT_RANGE};
use serde::Serialize;

use crate::git::repository_root;
use crate::history::{read_recent_commits, CommitRecord};
use crate::status::{read_status, RepoStatus};

/// Fully-resolved options for [`collect_context`].
///
/// # Examples
///
/// ```
/// use revu_gitpulse::context::ContextOptions;
///
/// let opts = ContextOptions::default();
/// assert!(opts.include_git_status);
/// assert!(!opts.include_recent_commits);
/// assert_eq!(opts.recent_commit_limit, 5);
/// ```
#[derive(Debug, Clone)]
pub struct ContextOptions {
    pub include_git_status: bool,
    pub include_recent_commits: bool,
    pub recent_commit_limit: usize,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self::from(&ContextConfig::default())
    }
}

impl From<&ContextConfig> for ContextOptions {
    fn from(config: &ContextConfig) -> Self {
        Self {
            include_git_status: config.include_git_status,
            include_recent_commits: config.include_recent_commits,
            recent_commit_limit: config.recent_commit_limit,
        }
    }
}

impl ContextOptions {
    /// Check the commit limit range.
    pub fn validate(&self) -> Result<(), RevuError> {
        check_range(
            "recentCommitLimit",
            self.recent_commit_limit,
            &RECENT_COMMIT_LIMIT_RANGE,
        )
    }
}

/// Repository context returned by the `collect-context` operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoContext {
    /// Absolute path of the repository's top-level directory.
    pub repository_root: PathBuf,
    /// Short status report, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RepoStatus>,
    /// Most recent commits first, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_commits: Option<Vec<CommitRecord>>,
}

/// Locate the repository enclosing `working_dir` and gather the requested
/// context.
///
/// # Errors
///
/// Returns [`RevuError::InvalidInput`] for an out-of-range commit limit and
/// [`RevuError::Git`] if any git invocation fails.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use revu_gitpulse::context::{collect_context, ContextOptions};
///
/// # async fn example() -> Result<(), revu_core::RevuError> {
/// let ctx = collect_context(Path::new("."), &ContextOptions::default()).await?;
/// println!("{ctx}");
/// # Ok(())
/// # }
/// ```
pub async fn collect_context(
    working_dir: &Path,
    options: &ContextOptions,
) -> Result<RepoContext, RevuError> {
    options.validate()?;
    let root = repository_root(working_dir).await?;

    let status = if options.include_git_status {
        Some(read_status(&root).await?)
    } else {
        None
    };

    let recent_commits = if options.include_recent_commits {
        Some(read_recent_commits(&root, options.recent_commit_limit).await?)
    } else {
        None
    };

    Ok(RepoContext {
        repository_root: root,
        status,
        recent_commits,
    })
}

impl fmt::Display for RepoContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Repository: {}", self.repository_root.display())?;

        if let Some(status) = &self.status {
            let branch = status.branch.as_deref().unwrap_or("(detached HEAD)");
            match &status.upstream {
                Some(upstream) => writeln!(f, "Branch: {branch} -> {upstream}")?,
                None => writeln!(f, "Branch: {branch}")?,
            }
            if status.ahead.is_some() || status.behind.is_some() {
                writeln!(
                    f,
                    "Ahead {} / behind {}",
                    status.ahead.unwrap_or(0),
                    status.behind.unwrap_or(0)
                )?;
            }

            if status.is_clean() {
                writeln!(f, "Working tree clean.")?;
            }
            write_entries(f, "Staged", status.staged.iter().map(|e| (&e.status, &e.path)))?;
            write_entries(
                f,
                "Unstaged",
                status.unstaged.iter().map(|e| (&e.status, &e.path)),
            )?;
            if !status.untracked.is_empty() {
                writeln!(f, "Untracked ({}):", status.untracked.len())?;
                for path in &status.untracked {
                    writeln!(f, "  ?? {path}")?;
                }
            }
            write_entries(
                f,
                "Conflicts",
                status.conflicts.iter().map(|c| (&c.detail, &c.path)),
            )?;
        }

        if let Some(commits) = &self.recent_commits {
            if commits.is_empty() {
                writeln!(f, "No commits found.")?;
            } else {
                writeln!(f, "Recent commits:")?;
                for c in commits {
                    writeln!(
                        f,
                        "  {} {} ({}, {})",
                        c.short_hash(),
                        c.summary,
                        c.author,
                        c.relative_date
                    )?;
                }
            }
        }

        Ok(())
    }
}

fn write_entries<'a>(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    entries: impl ExactSizeIterator<Item = (&'a String, &'a String)>,
) -> fmt::Result {
    if entries.len() == 0 {
        return Ok(());
    }
    writeln!(f, "{label} ({}):", entries.len())?;
    for (code, path) in entries {
        writeln!(f, "  {code:<2} {path}")?;
    }
    Ok(())
}

impl RepoContext {
    /// Render the context as a markdown string.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Repository Context\n\n");
        out.push_str(&format!(
            "**Root:** `{}`\n\n",
            self.repository_root.display()
        ));

        if let Some(status) = &self.status {
            out.push_str("## Status\n\n");
            out.push_str(&format!(
                "- **Branch:** {}\n",
                status.branch.as_deref().unwrap_or("(detached HEAD)")
            ));
            if let Some(upstream) = &status.upstream {
                out.push_str(&format!(
                    "- **Upstream:** {upstream} (ahead {}, behind {})\n",
                    status.ahead.unwrap_or(0),
                    status.behind.unwrap_or(0)
                ));
            }
            out.push_str(&format!(
                "- **Staged:** {} | **Unstaged:** {} | **Untracked:** {} | **Conflicts:** {}\n\n",
                status.staged.len(),
                status.unstaged.len(),
                status.untracked.len(),
                status.conflicts.len()
            ));
        }

        if let Some(commits) = &self.recent_commits {
            out.push_str("## Recent Commits\n\n");
            if commits.is_empty() {
                out.push_str("_No commits found._\n");
            }
            for c in commits {
                out.push_str(&format!(
                    "- `{}` {} ({}, {})\n",
                    c.short_hash(),
                    c.summary,
                    c.author,
                    c.relative_date
                ));
            }
        }

        out
    }
}
