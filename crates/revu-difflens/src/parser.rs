//! Parsers for `git diff --name-status` and `git diff --numstat` output,
//! plus the path normalization both sides are keyed by.

use revu_core::ChangeType;
use revu_gitpulse::git::unquote_path;

/// One line of `git diff --name-status`.
///
/// # Examples
///
/// ```
/// use revu_core::ChangeType;
/// use revu_difflens::parser::parse_name_status;
///
/// let entries = parse_name_status("R087\tsrc/old.rs\tsrc/new.rs\n");
/// assert_eq!(entries[0].change_type, Some(ChangeType::Renamed));
/// assert_eq!(entries[0].path, "src/new.rs");
/// assert_eq!(entries[0].previous_path.as_deref(), Some("src/old.rs"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameStatusEntry {
    /// Parsed change code; `None` for codes git reports as unknown.
    pub change_type: Option<ChangeType>,
    /// Current path.
    pub path: String,
    /// Source path for renames and copies.
    pub previous_path: Option<String>,
}

/// One line of `git diff --numstat`.
///
/// # Examples
///
/// ```
/// use revu_difflens::parser::parse_numstat;
///
/// let entries = parse_numstat("12\t3\tsrc/a.ts\n-\t-\timg.png\n");
/// assert_eq!(entries[0].additions, Some(12));
/// assert_eq!(entries[1].additions, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumstatEntry {
    /// Current path.
    pub path: String,
    /// Source path when git reports a rename.
    pub previous_path: Option<String>,
    /// Added lines; `None` for binary files.
    pub additions: Option<u64>,
    /// Deleted lines; `None` for binary files.
    pub deletions: Option<u64>,
}

/// Parse `git diff --name-status` output.
///
/// Renames and copies carry three tab-separated fields (`R100`, old, new);
/// everything else carries two. Lines with too few fields are skipped.
pub fn parse_name_status(output: &str) -> Vec<NameStatusEntry> {
    let mut entries = Vec::new();

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let code = fields[0];
        let change_type = ChangeType::from_code(code);
        let takes_two_paths = change_type.is_some_and(ChangeType::has_previous_path);

        let entry = match (takes_two_paths, fields.as_slice()) {
            (true, [_, old, new, ..]) => NameStatusEntry {
                change_type,
                path: unquote_path(new),
                previous_path: Some(unquote_path(old)),
            },
            (false, [_, path, ..]) => NameStatusEntry {
                change_type,
                path: unquote_path(path),
                previous_path: None,
            },
            _ => {
                tracing::warn!("skipping malformed name-status line: {line}");
                continue;
            }
        };
        entries.push(entry);
    }

    entries
}

/// Parse `git diff --numstat` output.
///
/// A `-` count marks a binary file and becomes `None`. Rename paths in either
/// `old => new` or `dir/{old => new}/file` form are expanded.
pub fn parse_numstat(output: &str) -> Vec<NumstatEntry> {
    let mut entries = Vec::new();

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.splitn(3, '\t');
        let (Some(added), Some(deleted), Some(raw_path)) =
            (fields.next(), fields.next(), fields.next())
        else {
            tracing::warn!("skipping malformed numstat line: {line}");
            continue;
        };

        let (Some(additions), Some(deletions)) = (parse_count(added), parse_count(deleted)) else {
            tracing::warn!("skipping numstat line with invalid counts: {line}");
            continue;
        };

        let (path, previous_path) = match expand_rename(raw_path) {
            Some((old, new)) => (new, Some(old)),
            None => (unquote_path(raw_path), None),
        };

        entries.push(NumstatEntry {
            path,
            previous_path,
            additions,
            deletions,
        });
    }

    entries
}

// Outer `None` means the field is garbage; inner `None` is git's binary marker.
fn parse_count(field: &str) -> Option<Option<u64>> {
    let field = field.trim();
    if field == "-" {
        return Some(None);
    }
    field.parse().ok().map(Some)
}

/// Expand a numstat rename path into `(previous, current)`.
///
/// # Examples
///
/// ```
/// use revu_difflens::parser::expand_rename;
///
/// assert_eq!(
///     expand_rename("src/{old => new}/lib.rs"),
///     Some(("src/old/lib.rs".to_string(), "src/new/lib.rs".to_string()))
/// );
/// assert_eq!(
///     expand_rename("a.txt => b.txt"),
///     Some(("a.txt".to_string(), "b.txt".to_string()))
/// );
/// assert_eq!(expand_rename("plain.rs"), None);
/// ```
pub fn expand_rename(raw: &str) -> Option<(String, String)> {
    if let (Some(open), Some(close)) = (raw.find('{'), raw.rfind('}')) {
        if open < close {
            if let Some((from, to)) = raw[open + 1..close].split_once(" => ") {
                let prefix = &raw[..open];
                let suffix = &raw[close + 1..];
                let old = collapse_slashes(&format!("{prefix}{from}{suffix}"));
                let new = collapse_slashes(&format!("{prefix}{to}{suffix}"));
                return Some((old, new));
            }
        }
    }

    let (from, to) = raw.split_once(" => ")?;
    Some((unquote_path(from), unquote_path(to)))
}

// `dir/{ => sub}/f` expands to `dir//f` on one side.
fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Normalize a path for identity comparisons.
///
/// Backslashes become forward slashes, then `.` segments, repeated
/// separators, and trailing separators are removed and `..` segments are
/// resolved. Case is preserved.
///
/// # Examples
///
/// ```
/// use revu_difflens::parser::normalize_path;
///
/// assert_eq!(normalize_path("src\\lib.rs"), "src/lib.rs");
/// assert_eq!(normalize_path("./src//a/../b.rs"), "src/b.rs");
/// assert_eq!(normalize_path("Src/Main.rs"), "Src/Main.rs");
/// ```
pub fn normalize_path(raw: &str) -> String {
    let unified = raw.replace('\\', "/");
    let absolute = unified.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
