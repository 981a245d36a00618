//! MCP server that helps write pull request descriptions.
//!
//! Provides three tools:
//! - `analyze_file_changes`: changed files and a paginated diff against a base branch
//! - `get_pr_templates`: the Markdown templates in the template directory
//! - `suggest_template`: the template matching a change type
//!
//! # Usage
//!
//! ```bash
//! # MCP mode (stdio)
//! pr-agent
//!
//! # Write starter templates
//! pr-agent init
//!
//! # Same payloads as the tools, printed to stdout
//! pr-agent analyze --base main --max-lines 200
//! pr-agent suggest "fixes a null pointer" bug
//! ```

mod config;
mod init;
mod server;
mod tools;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing::{info, warn};

use pr_agent_core::default_working_dir;
use pr_agent_git::TruncationPolicy;
use pr_agent_logging::{init_tracing, LogFormat};

use crate::config::{FileConfig, Overrides, Settings};
use crate::server::PrAgentServer;

#[derive(Parser, Debug)]
#[command(
    name = "pr-agent",
    about = "MCP server that analyzes git changes and suggests pull request templates",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file (default: ./pr-agent.toml, then the global config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Repository used when the client declares no root (default: current directory)
    #[arg(short = 'd', long, global = true)]
    working_dir: Option<PathBuf>,

    /// Directory holding *.md PR templates
    #[arg(long, global = true)]
    templates_dir: Option<PathBuf>,

    /// Path to the git binary
    #[arg(long, global = true)]
    git_binary: Option<PathBuf>,

    /// Seconds before a git command is killed (0 = no limit)
    #[arg(long, global = true)]
    git_timeout_secs: Option<u64>,

    /// When to flag a diff page as truncated: window-full or remaining
    #[arg(long, global = true)]
    truncation: Option<TruncationPolicy>,

    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format: pretty, json or compact
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the MCP server on stdio (default)
    Serve,

    /// Print the analyze_file_changes payload for the working directory
    Analyze {
        /// Base branch to compare against
        #[arg(short, long)]
        base: Option<String>,

        /// List changed files only
        #[arg(long)]
        no_diff: bool,

        /// Maximum diff lines per page
        #[arg(short = 'n', long)]
        max_lines: Option<usize>,

        /// next_diff_index from a previous page
        #[arg(short, long)]
        cursor: Option<String>,
    },

    /// Print the get_pr_templates payload
    Templates,

    /// Print the suggest_template payload
    Suggest {
        /// Summary of what the changes do
        changes_summary: String,

        /// Change type (bug, feature, docs, ...)
        change_type: String,
    },

    /// Write the bundled templates into the templates directory
    Init {
        /// Target directory (default: the configured templates directory)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Replace templates that already exist
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = default_working_dir();
    let lookup_dir = cli.working_dir.clone().unwrap_or_else(|| cwd.clone());
    let discovered = FileConfig::discover(cli.config.as_deref(), &lookup_dir)?;
    let (config_path, file_config) = match discovered {
        Some((path, config)) => (Some(path), config),
        None => (None, FileConfig::default()),
    };

    let overrides = Overrides {
        working_dir: cli.working_dir,
        templates_dir: cli.templates_dir,
        git_binary: cli.git_binary,
        git_timeout_secs: cli.git_timeout_secs,
        truncation: cli.truncation,
        log_level: cli.log_level,
        log_format: cli.log_format,
    };
    let settings = Settings::resolve(overrides, file_config, cwd);

    init_tracing(&settings.log_level, settings.log_format);
    if let Some(path) = &config_path {
        info!(config = %path.display(), "Loaded configuration");
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings).await,
        Command::Analyze {
            base,
            no_diff,
            max_lines,
            cursor,
        } => {
            let options = settings.analyze_options(base, Some(!no_diff), max_lines, cursor);
            let json =
                tools::analyze_file_changes(&settings.git(), &settings.working_dir, &options)
                    .await;
            println!("{}", json);
            Ok(())
        }
        Command::Templates => {
            println!("{}", tools::get_pr_templates(&settings.templates_dir).await);
            Ok(())
        }
        Command::Suggest {
            changes_summary,
            change_type,
        } => {
            let json =
                tools::suggest_template(&settings.templates_dir, &changes_summary, &change_type)
                    .await;
            println!("{}", json);
            Ok(())
        }
        Command::Init { dir, force } => {
            let target = dir.unwrap_or_else(|| settings.templates_dir.clone());
            init::handle_init(&settings.git(), &target, force).await
        }
    }
}

async fn serve(settings: Settings) -> Result<()> {
    if !settings.git().is_available().await {
        warn!(
            git_binary = %settings.git_binary.display(),
            "git is not available; analyze_file_changes will report errors"
        );
    }
    if !settings.templates_dir.is_dir() {
        warn!(
            templates_dir = %settings.templates_dir.display(),
            "Templates directory not found; run `pr-agent init` to create it"
        );
    }

    info!(
        working_dir = %settings.working_dir.display(),
        templates_dir = %settings.templates_dir.display(),
        truncation = %settings.truncation,
        "Starting pr-agent MCP server"
    );

    let server = PrAgentServer::new(settings);

    let transport = (stdin(), stdout());
    let service = server
        .serve(transport)
        .await
        .context("Failed to start MCP server")?;

    service.waiting().await?;

    Ok(())
}
