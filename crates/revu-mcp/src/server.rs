//! MCP server setup and lifecycle.
//!
//! Provides [`run_server`] which starts the stdio-based MCP server,
//! registering the Revu tools and blocking until the client disconnects.

use std::path::PathBuf;

use revu_core::{RevuConfig, RevuError};
use rmcp::{model::*, tool_handler, transport::stdio, ServerHandler, ServiceExt};

use crate::tools::RevuServer;

const SERVER_INSTRUCTIONS: &str = "\
Revu gives code reviewers git-aware context. Use these tools:\n\
- collect-context: Repository root, branch, status, and optionally recent commits\n\
- diff-insights: Per-file changes in the staged or working-tree diff, with optional patches\n\
- run-heuristics: Review findings (large files, missing tests, config edits, binaries) and suggestions";

#[tool_handler]
impl ServerHandler for RevuServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "revu".to_string(),
                title: Some("Revu Code Review Context".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: Some(
                    "Repository context, diff insights, and review heuristics".to_string(),
                ),
                icons: None,
                website_url: None,
            },
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
        }
    }
}

/// Start the MCP server on stdio transport.
///
/// Tool calls that omit `workingDirectory` resolve against `default_dir`,
/// and omitted arguments fall back to `config`. Blocks until the client
/// closes stdin.
///
/// # Errors
///
/// Returns [`RevuError::Transport`] if the server fails to initialize or the
/// stdio session breaks.
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use revu_core::RevuConfig;
///
/// # async fn example() -> Result<(), revu_core::RevuError> {
/// revu_mcp::server::run_server(PathBuf::from("."), RevuConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_server(default_dir: PathBuf, config: RevuConfig) -> Result<(), RevuError> {
    tracing::info!(dir = %default_dir.display(), "starting MCP server on stdio");
    let server = RevuServer::with_config(default_dir, config);
    let service = server
        .serve(stdio())
        .await
        .map_err(|e| RevuError::Transport(format!("failed to start: {e}")))?;

    service
        .waiting()
        .await
        .map_err(|e| RevuError::Transport(e.to_string()))?;

    tracing::info!("MCP client disconnected");
    Ok(())
}
