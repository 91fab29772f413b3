//! Core types, configuration, and error handling for Revu.
//!
//! This crate provides the shared foundation used by all other Revu crates:
//! - [`RevuError`]: unified error type using `thiserror` and `miette`
//! - [`RevuConfig`]: configuration loaded from `.revu.toml`
//! - Shared enums: [`ChangeType`], [`DiffSource`], [`Severity`],
//!   [`FindingCategory`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{
    check_range, ContextConfig, DiffConfig, HeuristicsConfig, RevuConfig,
    LARGE_FILE_THRESHOLD_RANGE, MAX_PATCH_LINES_RANGE, PATCH_CONTEXT_LINES_RANGE,
    RECENT_COMMIT_LIMIT_RANGE,
};
pub use error::RevuError;
pub use types::{ChangeType, DiffSource, FindingCategory, OutputFormat, Severity};

/// A convenience `Result` type for Revu operations.
pub type Result<T> = std::result::Result<T, RevuError>;
