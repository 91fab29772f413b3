//! Working-directory resolution for tool calls.

use std::path::{Path, PathBuf};

use revu_core::RevuError;

/// Resolve an optional caller-supplied path against the process's current
/// directory.
///
/// # Errors
///
/// See [`resolve_against`].
pub fn resolve_working_directory(requested: Option<&str>) -> Result<PathBuf, RevuError> {
    let cwd = std::env::current_dir()?;
    resolve_against(&cwd, requested)
}

/// Resolve an optional path against `base` into an absolute, existing
/// directory.
///
/// `None` (or a blank string) yields `base` itself. Relative paths are joined
/// onto `base`; absolute paths are used as given. The result is
/// canonicalized.
///
/// # Errors
///
/// Returns [`RevuError::PathNotFound`] if the path cannot be accessed, or
/// [`RevuError::InvalidInput`] if it exists but is not a directory.
///
/// # Examples
///
/// ```
/// use revu_gitpulse::workdir::resolve_against;
///
/// let base = std::env::temp_dir();
/// let resolved = resolve_against(&base, None).unwrap();
/// assert!(resolved.is_absolute());
/// assert!(resolve_against(&base, Some("surely/not/here")).is_err());
/// ```
pub fn resolve_against(base: &Path, requested: Option<&str>) -> Result<PathBuf, RevuError> {
    let candidate = match requested.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => {
            let input = PathBuf::from(p);
            if input.is_absolute() {
                input
            } else {
                base.join(input)
            }
        }
        None => base.to_path_buf(),
    };

    let resolved = candidate
        .canonicalize()
        .map_err(|_| RevuError::PathNotFound(candidate.clone()))?;

    if !resolved.is_dir() {
        return Err(RevuError::InvalidInput(format!(
            "{} is not a directory",
            resolved.display()
        )));
    }

    Ok(resolved)
}
