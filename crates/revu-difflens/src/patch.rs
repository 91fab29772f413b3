//! Splits a unified patch into per-file segments and attaches them to
//! merged records.

use std::collections::HashMap;

use revu_gitpulse::git::unquote_path;

use crate::insights::DiffFileChange;
use crate::parser::normalize_path;

/// One file's slice of a unified patch, from its `diff --git` header up to
/// the next header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchSegment {
    /// Pre-image path, when the header or `---`/`rename from` lines name one.
    pub old_path: Option<String>,
    /// Post-image path.
    pub new_path: Option<String>,
    /// Verbatim segment text including the header line.
    pub text: String,
}

/// Split raw `git diff` patch output into [`PatchSegment`]s.
///
/// Text before the first `diff --git` header is ignored. Paths come from the
/// header line and are refined by `rename from`/`rename to` and `---`/`+++`
/// lines appearing before the first hunk.
///
/// # Examples
///
/// ```
/// use revu_difflens::patch::split_patch;
///
/// let raw = "diff --git a/src/a.rs b/src/a.rs\n\
///            --- a/src/a.rs\n\
///            +++ b/src/a.rs\n\
///            @@ -1 +1 @@\n\
///            -old\n\
///            +new\n";
/// let segments = split_patch(raw);
/// assert_eq!(segments.len(), 1);
/// assert_eq!(segments[0].new_path.as_deref(), Some("src/a.rs"));
/// assert!(segments[0].text.starts_with("diff --git"));
/// ```
pub fn split_patch(raw: &str) -> Vec<PatchSegment> {
    let mut segments = Vec::new();
    let mut current: Option<PatchSegment> = None;
    let mut in_hunks = false;

    for line in raw.split_inclusive('\n') {
        let bare = line.trim_end_matches(['\n', '\r']);

        if let Some(rest) = bare.strip_prefix("diff --git ") {
            if let Some(segment) = current.take() {
                segments.push(segment);
            }
            let (old_path, new_path) = parse_header(rest);
            current = Some(PatchSegment {
                old_path,
                new_path,
                text: line.to_string(),
            });
            in_hunks = false;
            continue;
        }

        let Some(segment) = current.as_mut() else {
            continue;
        };
        segment.text.push_str(line);

        if in_hunks {
            continue;
        }
        if bare.starts_with("@@ ") {
            in_hunks = true;
        } else if let Some(path) = bare.strip_prefix("rename from ") {
            segment.old_path = Some(unquote_path(path));
        } else if let Some(path) = bare.strip_prefix("rename to ") {
            segment.new_path = Some(unquote_path(path));
        } else if let Some(path) = bare.strip_prefix("--- ") {
            if let Some(path) = parse_path(path) {
                segment.old_path = Some(path);
            }
        } else if let Some(path) = bare.strip_prefix("+++ ") {
            if let Some(path) = parse_path(path) {
                segment.new_path = Some(path);
            }
        }
    }

    if let Some(segment) = current.take() {
        segments.push(segment);
    }
    segments
}

/// Parse the `a/<old> b/<new>` tail of a `diff --git` header.
fn parse_header(rest: &str) -> (Option<String>, Option<String>) {
    if rest.starts_with('"') {
        if let Some(end) = closing_quote(rest) {
            let old = &rest[..=end];
            let new = rest[end + 1..].trim_start();
            return (parse_path(old), parse_path(new));
        }
    }

    // Unquoted paths may contain spaces; when both sides name the same file
    // the header is `a/X b/X` and splits evenly.
    if let Some(body) = rest.strip_prefix("a/") {
        if body.len() >= 3 && (body.len() - 3) % 2 == 0 {
            let mid = (body.len() - 3) / 2;
            if body.is_char_boundary(mid)
                && body.get(mid..mid + 3) == Some(" b/")
                && body.get(..mid) == body.get(mid + 3..)
            {
                let path = body[..mid].to_string();
                return (Some(path.clone()), Some(path));
            }
        }
    }

    match rest.rfind(" b/") {
        Some(idx) => (parse_path(&rest[..idx]), parse_path(&rest[idx + 1..])),
        None => (None, None),
    }
}

fn closing_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, c) in s.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Strip quoting and the `a/`/`b/` side prefix. `/dev/null` yields `None`.
fn parse_path(raw: &str) -> Option<String> {
    let unquoted = unquote_path(raw.trim());
    if unquoted == "/dev/null" || unquoted.is_empty() {
        return None;
    }
    let stripped = unquoted
        .strip_prefix("a/")
        .or_else(|| unquoted.strip_prefix("b/"))
        .unwrap_or(&unquoted);
    Some(stripped.to_string())
}

/// Limit `text` to `max_lines` lines, appending a single marker line when
/// anything was cut. Text within the limit is returned unchanged.
///
/// # Examples
///
/// ```
/// use revu_difflens::patch::truncate_patch;
///
/// let text = "l1\nl2\nl3\nl4\n";
/// assert_eq!(truncate_patch(text, 10), text);
///
/// let cut = truncate_patch(text, 2);
/// assert_eq!(cut.lines().count(), 3);
/// assert!(cut.ends_with("... truncated 2 more line(s)\n"));
/// ```
pub fn truncate_patch(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= max_lines {
        return text.to_string();
    }
    let omitted = lines.len() - max_lines;
    let mut out = lines[..max_lines].join("\n");
    out.push('\n');
    out.push_str(&format!("... truncated {omitted} more line(s)\n"));
    out
}

/// Attach truncated patch segments from `raw` to the matching `files`.
///
/// A segment matches a record through its new path or its old path, compared
/// against both the record's current and previous path. Segments matching no
/// record are dropped. Returns the number of patches attached.
pub fn attach_patches(files: &mut [DiffFileChange], raw: &str, max_lines: usize) -> usize {
    let mut index: HashMap<String, usize> = HashMap::new();
    for (i, file) in files.iter().enumerate() {
        index.entry(normalize_path(&file.path)).or_insert(i);
    }
    for (i, file) in files.iter().enumerate() {
        if let Some(previous) = &file.previous_path {
            index.entry(normalize_path(previous)).or_insert(i);
        }
    }

    let mut attached = 0;
    for segment in split_patch(raw) {
        let target = [&segment.new_path, &segment.old_path]
            .into_iter()
            .flatten()
            .find_map(|p| index.get(&normalize_path(p)).copied());

        let Some(i) = target else {
            tracing::warn!(
                old = ?segment.old_path,
                new = ?segment.new_path,
                "dropping patch segment with no matching file"
            );
            continue;
        };

        let file = &mut files[i];
        if file.patch.is_some() {
            tracing::warn!(path = %file.path, "ignoring duplicate patch segment");
            continue;
        }
        file.patch = Some(truncate_patch(&segment.text, max_lines));
        attached += 1;
    }

    attached
}
