//! MCP server interface exposing Revu tools to IDEs and agents.
//!
//! Implements a Model Context Protocol server using rmcp that exposes
//! `collect-context`, `diff-insights`, and `run-heuristics` over stdio
//! transport.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), revu_core::RevuError> {
//! revu_mcp::server::run_server(PathBuf::from("."), revu_core::RevuConfig::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod server;
pub mod tools;
