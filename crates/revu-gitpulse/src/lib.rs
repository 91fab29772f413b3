//! Repository reads through the `git` executable.
//!
//! Resolves the working directory, locates the enclosing repository, and
//! parses short-form status and recent history into structured records for
//! the `collect-context` operation. Diff acquisition in `revu-difflens`
//! shares the same subprocess runner in [`git`].

pub mod context;
pub mod git;
pub mod history;
pub mod status;
pub mod workdir;
