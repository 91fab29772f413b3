use std::path::PathBuf;

/// Errors that can occur across the Revu crates.
///
/// Library crates return this type directly; the binary reports it through
/// `miette`, and the MCP layer flattens it into an error-flagged tool result.
///
/// # Examples
///
/// ```
/// use revu_core::RevuError;
///
/// let err = RevuError::Git("not a git repository".into());
/// assert!(err.to_string().contains("not a git repository"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum RevuError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(help("check the values in your .revu.toml"))]
    Config(String),

    /// A caller-supplied argument is out of range or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested working directory does not exist or cannot be accessed.
    #[error("path not found: {}", .0.display())]
    #[diagnostic(help("pass an existing directory inside a git working copy"))]
    PathNotFound(PathBuf),

    /// The git subprocess could not be launched or exited non-zero.
    ///
    /// Covers "not a repository", "git not installed", and any failed git
    /// operation alike.
    #[error("git error: {0}")]
    #[diagnostic(help("make sure git is installed and the path is inside a repository"))]
    Git(String),

    /// The MCP stdio transport failed to start or broke mid-session.
    #[error("MCP transport error: {0}")]
    Transport(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
