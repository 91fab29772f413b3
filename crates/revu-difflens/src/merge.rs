//! Correlates name-status and numstat results into one record per path.

use std::collections::{HashMap, HashSet};

use revu_core::ChangeType;

use crate::insights::DiffFileChange;
use crate::parser::{normalize_path, NameStatusEntry, NumstatEntry};

/// Merge the two parsed diff forms into sorted [`DiffFileChange`] records.
///
/// Numstat drives the record set; name-status, looked up by normalized
/// path, supplies the change type and previous path. Paths only present in
/// name-status are kept with zero counts and flagged binary. When `filter` is given, only
/// records matching one of its paths survive (see [`path_matches`]).
///
/// # Examples
///
/// ```
/// use revu_core::ChangeType;
/// use revu_difflens::merge::merge_changes;
/// use revu_difflens::parser::{parse_name_status, parse_numstat};
///
/// let files = merge_changes(
///     parse_numstat("12\t3\tsrc/a.ts\n"),
///     parse_name_status("M\tsrc/a.ts\n"),
///     None,
/// );
/// assert_eq!(files.len(), 1);
/// assert_eq!(files[0].change_type, ChangeType::Modified);
/// assert_eq!(files[0].churn(), Some(15));
/// ```
pub fn merge_changes(
    numstat: Vec<NumstatEntry>,
    name_status: Vec<NameStatusEntry>,
    filter: Option<&[String]>,
) -> Vec<DiffFileChange> {
    let mut by_path: HashMap<String, NameStatusEntry> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for entry in name_status {
        let key = normalize_path(&entry.path);
        if by_path.contains_key(&key) {
            tracing::warn!("duplicate name-status entry for {key}");
            continue;
        }
        order.push(key.clone());
        by_path.insert(key, entry);
    }

    let mut files: Vec<DiffFileChange> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for stat in numstat {
        let key = normalize_path(&stat.path);
        if seen.contains(&key) {
            tracing::warn!("duplicate numstat entry for {key}");
            continue;
        }

        let status = by_path.remove(&key);
        let change_type = status
            .as_ref()
            .and_then(|s| s.change_type)
            .unwrap_or_else(|| infer_change_type(&stat));

        let previous_path = if change_type.has_previous_path() {
            status
                .and_then(|s| s.previous_path)
                .or(stat.previous_path)
                .map(|p| normalize_path(&p))
        } else {
            None
        };

        seen.insert(key.clone());
        files.push(DiffFileChange::new(
            key,
            change_type,
            stat.additions,
            stat.deletions,
            previous_path,
        ));
    }

    // Pure renames and other entries numstat did not report.
    for key in order {
        let Some(entry) = by_path.remove(&key) else {
            continue;
        };
        let change_type = entry.change_type.unwrap_or(ChangeType::Modified);
        let previous_path = if change_type.has_previous_path() {
            entry.previous_path.map(|p| normalize_path(&p))
        } else {
            None
        };
        files.push(DiffFileChange::uncounted(key, change_type, previous_path));
    }

    if let Some(filter) = filter.filter(|f| !f.is_empty()) {
        let filters: Vec<String> = filter.iter().map(|f| normalize_path(f)).collect();
        files.retain(|file| filters.iter().any(|f| path_matches(&file.path, f)));
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}

/// Change type used when name-status did not report the path.
fn infer_change_type(stat: &NumstatEntry) -> ChangeType {
    if stat.previous_path.is_some() {
        return ChangeType::Renamed;
    }
    match (stat.additions, stat.deletions) {
        (Some(0), Some(0)) => ChangeType::Modified,
        (Some(_), None) => ChangeType::Added,
        _ => ChangeType::Modified,
    }
}

/// Whether normalized `path` is selected by normalized `filter`.
///
/// A filter selects the identical path, anything beneath it when it names a
/// directory, or everything when it is `.`.
///
/// # Examples
///
/// ```
/// use revu_difflens::merge::path_matches;
///
/// assert!(path_matches("src/a.ts", "src/a.ts"));
/// assert!(path_matches("src/a.ts", "src"));
/// assert!(path_matches("src/a.ts", "."));
/// assert!(!path_matches("srcx/a.ts", "src"));
/// ```
pub fn path_matches(path: &str, filter: &str) -> bool {
    if filter == "." || path == filter {
        return true;
    }
    path.strip_prefix(filter)
        .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_name_status, parse_numstat};

    fn merge(numstat: &str, name_status: &str) -> Vec<DiffFileChange> {
        merge_changes(parse_numstat(numstat), parse_name_status(name_status), None)
    }

    #[test]
    fn modified_text_file() {
        let files = merge("12\t3\tsrc/a.ts\n", "M\tsrc/a.ts\n");
        assert_eq!(files.len(), 1);
        let f = &files[0];
        assert_eq!(f.path, "src/a.ts");
        assert_eq!(f.change_type, ChangeType::Modified);
        assert_eq!(f.additions, Some(12));
        assert_eq!(f.deletions, Some(3));
        assert!(!f.is_binary);
        assert!(f.previous_path.is_none());
    }

    #[test]
    fn added_binary_file() {
        let files = merge("-\t-\timg.png\n", "A\timg.png\n");
        let f = &files[0];
        assert_eq!(f.change_type, ChangeType::Added);
        assert!(f.is_binary);
        assert_eq!(f.additions, None);
        assert_eq!(f.deletions, None);
    }

    #[test]
    fn rename_takes_previous_path_from_name_status() {
        let files = merge(
            "3\t1\tsrc/{old => new}/lib.rs\n",
            "R090\tsrc/old/lib.rs\tsrc/new/lib.rs\n",
        );
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "src/new/lib.rs");
        assert_eq!(files[0].change_type, ChangeType::Renamed);
        assert_eq!(files[0].previous_path.as_deref(), Some("src/old/lib.rs"));
    }

    #[test]
    fn name_status_only_path_is_kept_with_zero_counts() {
        let files = merge("", "R100\told.rs\tnew.rs\n");
        assert_eq!(files.len(), 1);
        let f = &files[0];
        assert_eq!(f.path, "new.rs");
        assert_eq!(f.change_type, ChangeType::Renamed);
        assert!(f.is_binary);
        assert_eq!(f.additions, Some(0));
        assert_eq!(f.deletions, Some(0));
        assert_eq!(f.previous_path.as_deref(), Some("old.rs"));
    }

    #[test]
    fn inference_when_name_status_missing() {
        let files = merge("0\t0\tzero.txt\n5\t2\tplain.rs\n-\t-\tblob.bin\n", "");
        let kinds: Vec<(&str, ChangeType)> = files
            .iter()
            .map(|f| (f.path.as_str(), f.change_type))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("blob.bin", ChangeType::Modified),
                ("plain.rs", ChangeType::Modified),
                ("zero.txt", ChangeType::Modified),
            ]
        );
    }

    #[test]
    fn inference_additions_without_deletions_is_added() {
        let stat = NumstatEntry {
            path: "x.rs".into(),
            previous_path: None,
            additions: Some(4),
            deletions: None,
        };
        assert_eq!(infer_change_type(&stat), ChangeType::Added);
    }

    #[test]
    fn numstat_rename_without_name_status_is_renamed() {
        let files = merge("1\t1\ta.rs => b.rs\n", "");
        assert_eq!(files[0].change_type, ChangeType::Renamed);
        assert_eq!(files[0].previous_path.as_deref(), Some("a.rs"));
    }

    #[test]
    fn unknown_code_falls_back_to_inference() {
        let files = merge("2\t0\tweird\n", "X\tweird\n");
        assert_eq!(files[0].change_type, ChangeType::Modified);
    }

    #[test]
    fn correlation_survives_separator_differences() {
        let files = merge("1\t1\tsrc\\win\\f.rs\n", "D\tsrc/win/f.rs\n");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "src/win/f.rs");
        assert_eq!(files[0].change_type, ChangeType::Deleted);
    }

    #[test]
    fn one_record_per_path() {
        let files = merge("1\t1\ta.rs\n2\t2\ta.rs\n", "M\ta.rs\nM\ta.rs\n");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].additions, Some(1));
    }

    #[test]
    fn output_is_sorted_by_path() {
        let files = merge("1\t0\tz.rs\n1\t0\ta.rs\n1\t0\tm/b.rs\n", "");
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["a.rs", "m/b.rs", "z.rs"]);
    }

    #[test]
    fn filter_keeps_matching_paths() {
        let filter = vec!["src".to_string(), "docs\\guide.md".to_string()];
        let files = merge_changes(
            parse_numstat("1\t0\tsrc/a.rs\n1\t0\tsrcx/b.rs\n1\t0\tdocs/guide.md\n1\t0\tREADME.md\n"),
            Vec::new(),
            Some(filter.as_slice()),
        );
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["docs/guide.md", "src/a.rs"]);
    }

    #[test]
    fn filter_is_case_sensitive() {
        let filter = vec!["SRC".to_string()];
        let files = merge_changes(
            parse_numstat("1\t0\tsrc/a.rs\n"),
            Vec::new(),
            Some(filter.as_slice()),
        );
        assert!(files.is_empty());
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let none: Vec<String> = Vec::new();
        let files = merge_changes(
            parse_numstat("1\t0\ta.rs\n"),
            Vec::new(),
            Some(none.as_slice()),
        );
        assert_eq!(files.len(), 1);
    }
}
