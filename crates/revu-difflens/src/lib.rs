//! Diff acquisition, correlation, and heuristic review.
//!
//! Runs the staged or working-tree diff through git in two textual forms,
//! correlates them per path (following renames), optionally attaches
//! truncated per-file patches, and evaluates the result against a small set
//! of review heuristics.

pub mod classify;
pub mod heuristics;
pub mod insights;
pub mod merge;
pub mod parser;
pub mod patch;
