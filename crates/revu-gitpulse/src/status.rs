//! Short-form status parsing (`git status --short --branch`).
//!
//! Splits the report into staged, unstaged, untracked, and conflicted
//! entries, plus the branch tracking line.

use std::path::Path;

use revu_core::RevuError;
use serde::{Deserialize, Serialize};

use crate::git::{run_git, unquote_path};

/// Parsed working-copy status.
///
/// A path carrying an unmerged marker only ever appears in `conflicts`.
///
/// # Examples
///
/// ```
/// use revu_gitpulse::status::parse_status;
///
/// let status = parse_status("## main...origin/main [ahead 1]\nM  src/a.ts\n?? notes.txt\n");
/// assert_eq!(status.branch.as_deref(), Some("main"));
/// assert_eq!(status.upstream.as_deref(), Some("origin/main"));
/// assert_eq!(status.ahead, Some(1));
/// assert_eq!(status.staged[0].path, "src/a.ts");
/// assert_eq!(status.untracked, vec!["notes.txt"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoStatus {
    /// Current branch, unset when HEAD is detached.
    pub branch: Option<String>,
    /// Tracking ref, e.g. `origin/main`.
    pub upstream: Option<String>,
    /// Commits ahead of upstream.
    pub ahead: Option<u32>,
    /// Commits behind upstream.
    pub behind: Option<u32>,
    /// Changes recorded in the index.
    pub staged: Vec<StatusEntry>,
    /// Changes in the working tree not yet staged.
    pub unstaged: Vec<StatusEntry>,
    /// Paths git does not track.
    pub untracked: Vec<String>,
    /// Paths with merge conflicts.
    pub conflicts: Vec<ConflictEntry>,
}

impl RepoStatus {
    /// `true` when nothing is staged, modified, untracked, or conflicted.
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self.unstaged.is_empty()
            && self.untracked.is_empty()
            && self.conflicts.is_empty()
    }
}

/// One side (index or worktree) of a status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    /// Single-letter status code for this side.
    pub status: String,
    /// Path relative to the repository root.
    pub path: String,
}

/// An unmerged path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictEntry {
    /// Path relative to the repository root.
    pub path: String,
    /// Raw two-character status code, e.g. `UU` or `AA`.
    pub detail: String,
}

/// Run `git status --short --branch` in `repo_root` and parse the result.
///
/// # Errors
///
/// Returns [`RevuError::Git`] if the git invocation fails.
pub async fn read_status(repo_root: &Path) -> Result<RepoStatus, RevuError> {
    let stdout = run_git(repo_root, ["status", "--short", "--branch"]).await?;
    Ok(parse_status(&stdout))
}

/// Parse the output of `git status --short --branch`.
///
/// Lines that are too short to carry a status code are skipped.
pub fn parse_status(output: &str) -> RepoStatus {
    let mut status = RepoStatus::default();

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("## ") {
            parse_branch_line(rest, &mut status);
            continue;
        }

        if let Some(path) = line.strip_prefix("?? ") {
            status.untracked.push(unquote_path(path));
            continue;
        }

        if line.starts_with("!! ") {
            continue;
        }

        let Some((code, raw_path)) = split_entry(line) else {
            tracing::warn!("skipping unrecognized status line: {line}");
            continue;
        };
        let path = entry_path(raw_path);

        let mut codes = code.chars();
        let index = codes.next().unwrap_or(' ');
        let worktree = codes.next().unwrap_or(' ');

        // Both-added and both-deleted are unmerged states without a U marker.
        if index == 'U' || worktree == 'U' || code == "AA" || code == "DD" {
            status.conflicts.push(ConflictEntry {
                path,
                detail: code.to_string(),
            });
            continue;
        }

        if index != ' ' && index != '?' {
            status.staged.push(StatusEntry {
                status: index.to_string(),
                path: path.clone(),
            });
        }
        if worktree != ' ' {
            status.unstaged.push(StatusEntry {
                status: worktree.to_string(),
                path,
            });
        }
    }

    status
}

fn split_entry(line: &str) -> Option<(&str, &str)> {
    let code = line.get(..2)?;
    let path = line.get(3..)?;
    if line.as_bytes().get(2) != Some(&b' ') || path.is_empty() {
        return None;
    }
    Some((code, path))
}

// Renames and copies are reported as `old -> new`; keep the current path.
fn entry_path(raw: &str) -> String {
    match raw.split_once(" -> ") {
        Some((_, new)) => unquote_path(new),
        None => unquote_path(raw),
    }
}

fn parse_branch_line(rest: &str, status: &mut RepoStatus) {
    let (head, tracking) = match rest.find(" [") {
        Some(idx) => (&rest[..idx], Some(rest[idx + 2..].trim_end_matches(']'))),
        None => (rest, None),
    };

    let head = head
        .strip_prefix("No commits yet on ")
        .or_else(|| head.strip_prefix("Initial commit on "))
        .unwrap_or(head);

    if head.starts_with("HEAD (no branch)") {
        status.branch = None;
    } else if let Some((branch, upstream)) = head.split_once("...") {
        status.branch = Some(branch.to_string());
        status.upstream = Some(upstream.trim().to_string());
    } else if !head.is_empty() {
        status.branch = Some(head.trim().to_string());
    }

    if let Some(tracking) = tracking {
        for token in tracking.split(',').map(str::trim) {
            if let Some(n) = token.strip_prefix("ahead ") {
                status.ahead = n.trim().parse().ok();
            } else if let Some(n) = token.strip_prefix("behind ") {
                status.behind = n.trim().parse().ok();
            }
        }
    }
}
