//! Recent commit history via `git log`.

use std::path::Path;

use revu_core::{check_range, RevuError, RECENT_COMMIT_LIMIT_RANGE};
use serde::{Deserialize, Serialize};

use crate::git::run_git;

/// Tab-delimited: full hash, author name, relative date, subject.
const LOG_FORMAT: &str = "--pretty=format:%H%x09%an%x09%ar%x09%s";

/// A single commit from the history reader.
///
/// # Examples
///
/// ```
/// use revu_gitpulse::history::parse_log;
///
/// let commits = parse_log("abc123\talice\t2 hours ago\tfix: auth bug\n");
/// assert_eq!(commits[0].author, "alice");
/// assert_eq!(commits[0].summary, "fix: auth bug");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecord {
    /// Full commit hash.
    pub hash: String,
    /// Author name.
    pub author: String,
    /// Human-readable age, e.g. `3 days ago`.
    pub relative_date: String,
    /// First line of the commit message.
    pub summary: String,
}

impl CommitRecord {
    /// The first seven characters of the hash.
    pub fn short_hash(&self) -> &str {
        self.hash.get(..7).unwrap_or(&self.hash)
    }
}

/// Read the last `limit` commits reachable from HEAD, newest first.
///
/// # Errors
///
/// Returns [`RevuError::InvalidInput`] if `limit` is outside 1–20, or
/// [`RevuError::Git`] if `git log` fails (including on a repository with
/// no commits yet).
pub async fn read_recent_commits(
    repo_root: &Path,
    limit: usize,
) -> Result<Vec<CommitRecord>, RevuError> {
    check_range("recentCommitLimit", limit, &RECENT_COMMIT_LIMIT_RANGE)?;
    let count = format!("-n{limit}");
    let stdout = run_git(repo_root, ["log", count.as_str(), LOG_FORMAT]).await?;
    Ok(parse_log(&stdout))
}

/// Parse `git log` output produced with the tab-delimited format.
///
/// Lines that do not split into four fields are skipped. A subject that
/// itself contains tabs stays intact.
pub fn parse_log(output: &str) -> Vec<CommitRecord> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let fields: Vec<&str> = line.splitn(4, '\t').collect();
            let [hash, author, relative_date, summary] = fields[..] else {
                tracing::warn!("skipping malformed log line: {line}");
                return None;
            };
            Some(CommitRecord {
                hash: hash.to_string(),
                author: author.to_string(),
                relative_date: relative_date.to_string(),
                summary: summary.to_string(),
            })
        })
        .collect()
}
