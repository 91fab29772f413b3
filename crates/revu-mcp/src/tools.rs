//! Tool implementations for the Revu MCP server.
//!
//! Three tools are exposed: `collect-context`, `diff-insights`, and
//! `run-heuristics`. Arguments are validated before any git work; failures
//! after that point come back as error-flagged results of the form
//! `<tool> failed: <cause>` rather than protocol errors.

use std::path::PathBuf;

use revu_core::{
    check_range, DiffSource, RevuConfig, RevuError, LARGE_FILE_THRESHOLD_RANGE,
    PATCH_CONTEXT_LINES_RANGE,
};
use revu_difflens::heuristics::{run_heuristics, HeuristicOptions};
use revu_difflens::insights::{collect_diff_insights, DiffOptions};
use revu_gitpulse::context::{collect_context, ContextOptions};
use revu_gitpulse::git::repository_root;
use revu_gitpulse::workdir::resolve_against;
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars, tool, tool_router, ErrorData as McpError,
};
use serde::{Deserialize, Serialize};

/// MCP server exposing Revu's review tools.
///
/// # Examples
///
/// ```
/// use revu_mcp::tools::RevuServer;
/// use std::path::PathBuf;
///
/// let server = RevuServer::new(PathBuf::from("."));
/// ```
#[derive(Clone)]
pub struct RevuServer {
    pub(crate) default_dir: PathBuf,
    pub(crate) config: RevuConfig,
    pub(crate) tool_router: ToolRouter<Self>,
}

// --- Parameter structs ---

/// Which side of the index to diff.
#[derive(Debug, Clone, Copy, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SourceParam {
    /// Index against HEAD.
    Staged,
    /// Working tree against the index.
    Working,
}

impl From<SourceParam> for DiffSource {
    fn from(source: SourceParam) -> Self {
        match source {
            SourceParam::Staged => DiffSource::Staged,
            SourceParam::Working => DiffSource::Working,
        }
    }
}

/// Parameters for the `collect-context` tool.
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectContextParams {
    /// Directory inside the repository (default: server's working directory).
    pub working_directory: Option<String>,
    /// Include branch and short status (default: true).
    pub include_git_status: Option<bool>,
    /// Include recent commits (default: false).
    pub include_recent_commits: Option<bool>,
    /// Number of commits to include, 1-20 (default: 5).
    pub recent_commit_limit: Option<usize>,
}

/// Parameters for the `diff-insights` tool.
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiffInsightsParams {
    /// Directory inside the repository (default: server's working directory).
    pub working_directory: Option<String>,
    /// "staged" (default) or "working".
    pub source: Option<SourceParam>,
    /// Limit the diff to these repository-relative paths.
    pub paths: Option<Vec<String>>,
    /// Attach a unified patch excerpt to each file (default: false).
    pub include_patch: Option<bool>,
    /// Maximum lines per patch excerpt, 10-2000 (default: 400).
    pub max_patch_lines: Option<usize>,
}

/// Parameters for the `run-heuristics` tool.
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunHeuristicsParams {
    /// Directory inside the repository (default: server's working directory).
    pub working_directory: Option<String>,
    /// "staged" (default) or "working".
    pub source: Option<SourceParam>,
    /// Limit the diff to these repository-relative paths.
    pub paths: Option<Vec<String>>,
    /// Churn at which a file is flagged as large, 50-5000 (default: 400).
    pub large_file_threshold: Option<usize>,
    /// Flag code changes without test changes (default: true).
    pub require_tests_for_code: Option<bool>,
    /// Patch context budget, 50-2000 (default: 400).
    pub include_patch_context_lines: Option<usize>,
    /// Flag manifest, lockfile, and CI edits (default: true).
    pub warn_on_config_changes: Option<bool>,
}

fn invalid_params(e: RevuError) -> McpError {
    McpError::invalid_params(e.to_string(), None)
}

fn tool_failure(tool: &str, e: RevuError) -> CallToolResult {
    tracing::warn!("{tool} failed: {e}");
    CallToolResult::error(vec![Content::text(format!("{tool} failed: {e}"))])
}

/// Summary text, pretty JSON, and optional appendix as content items, with
/// the JSON also carried as structured content.
fn respond<T: Serialize>(
    summary: String,
    payload: &T,
    appendix: Option<String>,
) -> Result<CallToolResult, McpError> {
    let value = serde_json::to_value(payload)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    let pretty = serde_json::to_string_pretty(&value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;

    let mut content = vec![Content::text(summary), Content::text(pretty)];
    if let Some(appendix) = appendix {
        content.push(Content::text(appendix));
    }
    let mut result = CallToolResult::success(content);
    result.structured_content = Some(value);
    Ok(result)
}

#[tool_router]
impl RevuServer {
    /// Create a server with built-in defaults, resolving relative working
    /// directories against `default_dir`.
    pub fn new(default_dir: PathBuf) -> Self {
        Self::with_config(default_dir, RevuConfig::default())
    }

    /// Create a server whose omitted tool arguments fall back to `config`.
    pub fn with_config(default_dir: PathBuf, config: RevuConfig) -> Self {
        Self {
            default_dir,
            config,
            tool_router: Self::tool_router(),
        }
    }

    async fn locate_root(&self, working_directory: Option<&str>) -> Result<PathBuf, RevuError> {
        let dir = resolve_against(&self.default_dir, working_directory)?;
        repository_root(&dir).await
    }

    #[tool(
        name = "collect-context",
        description = "Summarize the git repository enclosing a working directory: its root, branch and upstream tracking, staged/unstaged/untracked/conflicted files, and optionally the most recent commits. Use this first to orient yourself before reviewing changes."
    )]
    pub async fn collect_context(
        &self,
        Parameters(params): Parameters<CollectContextParams>,
    ) -> Result<CallToolResult, McpError> {
        let defaults = &self.config.context;
        let options = ContextOptions {
            include_git_status: params
                .include_git_status
                .unwrap_or(defaults.include_git_status),
            include_recent_commits: params
                .include_recent_commits
                .unwrap_or(defaults.include_recent_commits),
            recent_commit_limit: params
                .recent_commit_limit
                .unwrap_or(defaults.recent_commit_limit),
        };
        options.validate().map_err(invalid_params)?;

        let working_directory = params.working_directory;
        let result = async {
            let dir = resolve_against(&self.default_dir, working_directory.as_deref())?;
            collect_context(&dir, &options).await
        }
        .await;

        match result {
            Ok(context) => respond(context.to_string(), &context, None),
            Err(e) => Ok(tool_failure("collect-context", e)),
        }
    }

    #[tool(
        name = "diff-insights",
        description = "Report the staged or working-tree diff file by file: change type (A/M/D/R/C), line additions and deletions (null for binary files), previous path for renames, and optionally a truncated unified patch per file. Use this to see exactly what changed."
    )]
    pub async fn diff_insights(
        &self,
        Parameters(params): Parameters<DiffInsightsParams>,
    ) -> Result<CallToolResult, McpError> {
        let defaults = &self.config.diff;
        let options = DiffOptions {
            source: params.source.map(Into::into).unwrap_or(defaults.source),
            paths: params.paths.unwrap_or_default(),
            include_patch: params.include_patch.unwrap_or(defaults.include_patch),
            max_patch_lines: params.max_patch_lines.unwrap_or(defaults.max_patch_lines),
        };
        options.validate().map_err(invalid_params)?;

        let working_directory = params.working_directory;
        let result = async {
            let root = self.locate_root(working_directory.as_deref()).await?;
            collect_diff_insights(&root, &options).await
        }
        .await;

        match result {
            Ok(insights) => {
                let appendix = insights.patch_appendix();
                respond(insights.to_string(), &insights, appendix)
            }
            Err(e) => Ok(tool_failure("diff-insights", e)),
        }
    }

    #[tool(
        name = "run-heuristics",
        description = "Run review heuristics over the staged or working-tree diff. Flags large files, code changed without tests, configuration or dependency edits, and binary files, and returns metrics plus reviewer suggestions. Use this to decide where a review should focus."
    )]
    pub async fn run_heuristics(
        &self,
        Parameters(params): Parameters<RunHeuristicsParams>,
    ) -> Result<CallToolResult, McpError> {
        let defaults = &self.config.heuristics;
        let options = HeuristicOptions {
            large_file_threshold: params
                .large_file_threshold
                .unwrap_or(defaults.large_file_threshold),
            require_tests_for_code: params
                .require_tests_for_code
                .unwrap_or(defaults.require_tests_for_code),
            warn_on_config_changes: params
                .warn_on_config_changes
                .unwrap_or(defaults.warn_on_config_changes),
        };
        let context_lines = params
            .include_patch_context_lines
            .unwrap_or(defaults.patch_context_lines);

        check_range(
            "largeFileThreshold",
            options.large_file_threshold,
            &LARGE_FILE_THRESHOLD_RANGE,
        )
        .and_then(|()| {
            check_range(
                "includePatchContextLines",
                context_lines,
                &PATCH_CONTEXT_LINES_RANGE,
            )
        })
        .map_err(invalid_params)?;

        // Heuristics work from counts alone; patches are never fetched.
        let diff_options = DiffOptions {
            source: params
                .source
                .map(Into::into)
                .unwrap_or(self.config.diff.source),
            paths: params.paths.unwrap_or_default(),
            include_patch: false,
            max_patch_lines: context_lines,
        };

        let working_directory = params.working_directory;
        let result = async {
            let root = self.locate_root(working_directory.as_deref()).await?;
            run_heuristics(&root, &diff_options, &options).await
        }
        .await;

        match result {
            Ok(report) => respond(report.to_string(), &report, None),
            Err(e) => Ok(tool_failure("run-heuristics", e)),
        }
    }
}
