//! Thin async wrapper around the `git` executable.
//!
//! Every repository read in Revu goes through [`run_git`]: the subprocess is
//! awaited to completion with stdout and stderr captured, and any launch
//! failure or non-zero exit surfaces as [`RevuError::Git`].

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use revu_core::RevuError;
use tokio::process::Command;

/// Run `git` with `args` inside `cwd` and return its stdout.
///
/// The locale is pinned to `C` so that branch tracking annotations and
/// relative dates come back in a parseable form, and terminal prompts are
/// disabled so a credential request can never block on stdin. Paths are
/// requested unquoted (`core.quotePath=false`); names git still quotes are
/// decoded by [`unquote_path`].
///
/// # Errors
///
/// Returns [`RevuError::Git`] if git cannot be launched (not installed) or
/// exits with a non-zero status. The message carries git's stderr.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// # async fn example() -> Result<(), revu_core::RevuError> {
/// let out = revu_gitpulse::git::run_git(Path::new("."), ["status", "--short"]).await?;
/// println!("{out}");
/// # Ok(())
/// # }
/// ```
pub async fn run_git<I, S>(cwd: &Path, args: I) -> Result<String, RevuError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<S> = args.into_iter().collect();
    let rendered = args
        .iter()
        .map(|a| a.as_ref().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    tracing::debug!(cwd = %cwd.display(), "git {rendered}");

    let output = Command::new("git")
        .args(["-c", "core.quotePath=false"])
        .args(&args)
        .current_dir(cwd)
        .env("LC_ALL", "C")
        .env("GIT_TERMINAL_PROMPT", "0")
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| RevuError::Git(format!("failed to run git {rendered}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let cause = stderr.trim();
        let cause = if cause.is_empty() {
            format!("exited with {}", output.status)
        } else {
            cause.to_string()
        };
        return Err(RevuError::Git(format!("git {rendered} failed: {cause}")));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Find the top-level directory of the repository enclosing `dir`.
///
/// # Errors
///
/// Returns [`RevuError::Git`] if `dir` is not inside a repository or git is
/// unavailable; the two cases are not distinguished.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// # async fn example() -> Result<(), revu_core::RevuError> {
/// let root = revu_gitpulse::git::repository_root(Path::new("src")).await?;
/// assert!(root.is_absolute());
/// # Ok(())
/// # }
/// ```
pub async fn repository_root(dir: &Path) -> Result<PathBuf, RevuError> {
    let stdout = run_git(dir, ["rev-parse", "--show-toplevel"])
        .await
        .map_err(|e| match e {
            RevuError::Git(cause) => RevuError::Git(format!(
                "{} is not inside a git repository ({cause})",
                dir.display()
            )),
            other => other,
        })?;

    let root = stdout.trim();
    if root.is_empty() {
        return Err(RevuError::Git(format!(
            "git rev-parse returned no top-level directory for {}",
            dir.display()
        )));
    }
    Ok(PathBuf::from(root))
}

/// Strip the C-style quoting git applies to paths with unusual characters.
///
/// Octal byte escapes (`\303\251`) are decoded back into the UTF-8 bytes
/// they stand for; invalid sequences are replaced lossily.
///
/// # Examples
///
/// ```
/// use revu_gitpulse::git::unquote_path;
///
/// assert_eq!(unquote_path("\"docs/read me.md\""), "docs/read me.md");
/// assert_eq!(unquote_path("\"caf\\303\\251.rs\""), "café.rs");
/// assert_eq!(unquote_path("src/lib.rs"), "src/lib.rs");
/// ```
pub fn unquote_path(raw: &str) -> String {
    let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
    else {
        return raw.to_string();
    };

    let bytes = inner.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        i += 1;
        if b != b'\\' {
            out.push(b);
            continue;
        }
        let Some(&next) = bytes.get(i) else {
            out.push(b'\\');
            break;
        };
        i += 1;
        match next {
            b'"' => out.push(b'"'),
            b'\\' => out.push(b'\\'),
            b't' => out.push(b'\t'),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'v' => out.push(0x0b),
            b'0'..=b'3' => match octal_byte(next, bytes.get(i..i + 2)) {
                Some(value) => {
                    out.push(value);
                    i += 2;
                }
                None => {
                    out.push(b'\\');
                    out.push(next);
                }
            },
            other => {
                out.push(b'\\');
                out.push(other);
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn octal_byte(first: u8, rest: Option<&[u8]>) -> Option<u8> {
    let rest = rest?;
    let digit = |d: u8| matches!(d, b'0'..=b'7').then(|| d - b'0');
    let value = (digit(first)? << 6) | (digit(rest[0])? << 3) | digit(rest[1])?;
    Some(value)
}
