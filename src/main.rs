use std::fmt;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use revu_core::{DiffSource, OutputFormat, RevuConfig, Severity};
use revu_difflens::heuristics::{run_heuristics, HeuristicOptions, HeuristicReport};
use revu_difflens::insights::{collect_diff_insights, DiffInsights, DiffOptions};
use revu_gitpulse::context::{collect_context, ContextOptions, RepoContext};
use revu_gitpulse::git::repository_root;
use revu_gitpulse::workdir::resolve_working_directory;

#[derive(Parser)]
#[command(
    name = "revu",
    version,
    about = "Git-aware review context and heuristics for AI assistants",
    long_about = "Revu gives code reviewers, human or AI, a structured view of a git repository:\n\
                   where it is, what is staged, what changed, and what deserves a closer look.\n\n\
                   Examples:\n  \
                     revu mcp                      Serve the tools over MCP on stdio\n  \
                     revu context --commits        Branch, status, and recent commits\n  \
                     revu diff --patch             Staged changes with patch excerpts\n  \
                     revu check --fail-on warn     Run heuristics, fail on warnings\n  \
                     revu init                     Write a default .revu.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .revu.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable summaries (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run the MCP server on stdio
    #[command(long_about = "Run the MCP server on stdio.\n\n\
        Exposes collect-context, diff-insights, and run-heuristics. Tool calls that\n\
        omit workingDirectory resolve against --path.\n\n\
        Examples:\n  revu mcp\n  revu mcp --path ~/src/project")]
    Mcp {
        /// Default working directory for tool calls (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },
    /// Show repository root, branch, status, and recent commits
    Context {
        /// Directory inside the repository (default: current directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Skip the status section
        #[arg(long)]
        no_status: bool,

        /// Include recent commits
        #[arg(long)]
        commits: bool,

        /// Number of commits to show, 1-20
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Summarize the staged or working-tree diff per file
    #[command(long_about = "Summarize the staged or working-tree diff per file.\n\n\
        Examples:\n  revu diff\n  revu diff --working --patch\n  revu diff src/ docs/guide.md")]
    Diff {
        /// Directory inside the repository (default: current directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Diff the working tree against the index instead of staged changes
        #[arg(long)]
        working: bool,

        /// Attach a unified patch excerpt per file
        #[arg(long)]
        patch: bool,

        /// Maximum lines per patch excerpt, 10-2000
        #[arg(long)]
        max_patch_lines: Option<usize>,

        /// Restrict the diff to these repository-relative paths
        files: Vec<String>,
    },
    /// Run review heuristics over the diff
    #[command(long_about = "Run review heuristics over the diff.\n\n\
        Flags large files, code without tests, configuration edits, and binary files.\n\n\
        Examples:\n  revu check\n  revu check --threshold 200 --fail-on warn")]
    Check {
        /// Directory inside the repository (default: current directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Check the working tree instead of staged changes
        #[arg(long)]
        working: bool,

        /// Churn at which a file counts as large, 50-5000
        #[arg(long)]
        threshold: Option<usize>,

        /// Do not flag code changes that lack test changes
        #[arg(long)]
        no_require_tests: bool,

        /// Do not flag configuration and dependency edits
        #[arg(long)]
        no_config_warnings: bool,

        /// Exit with code 1 if any finding meets this severity (info, warn, critical)
        #[arg(long)]
        fail_on: Option<Severity>,

        /// Restrict the diff to these repository-relative paths
        files: Vec<String>,
    },
    /// Create a default .revu.toml in the current directory
    Init,
}

const DEFAULT_CONFIG: &str = r#"# Revu Configuration

[context]
# include_git_status = true
# include_recent_commits = false
# recent_commit_limit = 5          # 1-20

[diff]
# source = "staged"                # "staged" or "working"
# include_patch = false
# max_patch_lines = 400            # 10-2000

[heuristics]
# large_file_threshold = 400       # 50-5000
# require_tests_for_code = true
# warn_on_config_changes = true
# patch_context_lines = 400        # 50-2000
"#;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    // stdout carries the JSON-RPC stream in `mcp` mode.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn load_config(explicit: Option<&Path>) -> Result<RevuConfig> {
    let config = match explicit {
        Some(path) => RevuConfig::from_file(path)?,
        None => {
            let cwd = std::env::current_dir().into_diagnostic()?;
            RevuConfig::discover(&cwd)?
        }
    };
    Ok(config)
}

fn working_dir(path: Option<&Path>) -> Result<PathBuf> {
    let requested = path.map(|p| p.to_string_lossy().into_owned());
    Ok(resolve_working_directory(requested.as_deref())?)
}

fn emit<T>(format: OutputFormat, value: &T, to_markdown: fn(&T) -> String) -> Result<()>
where
    T: Serialize + fmt::Display,
{
    match format {
        OutputFormat::Text => print!("{value}"),
        OutputFormat::Markdown => print!("{}", to_markdown(value)),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?)
        }
    }
    Ok(())
}

fn source_of(working: bool, config: &RevuConfig) -> DiffSource {
    if working {
        DiffSource::Working
    } else {
        config.diff.source
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(format = %cli.format, "configuration loaded");

    match cli.command {
        None => {
            Cli::command().print_help().into_diagnostic()?;
        }
        Some(Command::Mcp { ref path }) => {
            let dir = working_dir(Some(path.as_path()))?;
            revu_mcp::server::run_server(dir, config).await?;
        }
        Some(Command::Context {
            ref path,
            no_status,
            commits,
            limit,
        }) => {
            let dir = working_dir(path.as_deref())?;
            let mut options = ContextOptions::from(&config.context);
            if no_status {
                options.include_git_status = false;
            }
            if commits {
                options.include_recent_commits = true;
            }
            if let Some(limit) = limit {
                options.recent_commit_limit = limit;
            }
            let context = collect_context(&dir, &options).await?;
            emit(cli.format, &context, RepoContext::to_markdown)?;
        }
        Some(Command::Diff {
            ref path,
            working,
            patch,
            max_patch_lines,
            ref files,
        }) => {
            let dir = working_dir(path.as_deref())?;
            let root = repository_root(&dir).await?;
            let mut options = DiffOptions::from(&config.diff);
            options.source = source_of(working, &config);
            options.include_patch |= patch;
            options.paths = files.clone();
            if let Some(max) = max_patch_lines {
                options.max_patch_lines = max;
            }

            let insights = collect_diff_insights(&root, &options).await?;
            emit(cli.format, &insights, DiffInsights::to_markdown)?;
            if cli.format == OutputFormat::Text {
                if let Some(appendix) = insights.patch_appendix() {
                    println!("\n{appendix}");
                }
            }
        }
        Some(Command::Check {
            ref path,
            working,
            threshold,
            no_require_tests,
            no_config_warnings,
            fail_on,
            ref files,
        }) => {
            let dir = working_dir(path.as_deref())?;
            let root = repository_root(&dir).await?;

            let mut options = HeuristicOptions::from(&config.heuristics);
            if let Some(threshold) = threshold {
                options.large_file_threshold = threshold;
            }
            options.require_tests_for_code &= !no_require_tests;
            options.warn_on_config_changes &= !no_config_warnings;

            let diff_options = DiffOptions {
                source: source_of(working, &config),
                paths: files.clone(),
                include_patch: false,
                max_patch_lines: config.heuristics.patch_context_lines,
            };

            let report = run_heuristics(&root, &diff_options, &options).await?;
            emit(cli.format, &report, HeuristicReport::to_markdown)?;

            if let Some(threshold) = fail_on {
                if report.has_findings_at(threshold) {
                    std::process::exit(1);
                }
            }
        }
        Some(Command::Init) => {
            let path = Path::new(".revu.toml");
            if path.exists() {
                miette::bail!(".revu.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .revu.toml with default configuration");
        }
    }

    Ok(())
}
