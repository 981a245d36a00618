//! `pr-agent init`: write the bundled templates and check the environment.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use pr_agent_git::GitCli;
use pr_agent_templates::{write_defaults, WriteOutcome};

use crate::config::CONFIG_FILE_NAME;

pub async fn handle_init(git: &GitCli, templates_dir: &Path, force: bool) -> Result<()> {
    eprintln!("{}", "Setting up pr-agent...".bold());
    eprintln!();

    eprintln!("{}", "Checking for git...".dimmed());
    if git.is_available().await {
        eprintln!("  {} {}", "✓".bright_green(), git.binary_path().display());
    } else {
        eprintln!(
            "  {} {} (not found)",
            "⚠".bright_yellow(),
            git.binary_path().display()
        );
        eprintln!("  Install git or set git_binary in {}", CONFIG_FILE_NAME);
    }
    eprintln!();

    eprintln!(
        "{} {}",
        "Writing templates to".dimmed(),
        templates_dir.display()
    );
    let outcomes = write_defaults(templates_dir, force)
        .with_context(|| format!("Failed to write templates to {}", templates_dir.display()))?;

    let mut skipped = 0;
    for outcome in &outcomes {
        match outcome {
            WriteOutcome::Written(path) => {
                eprintln!("  {} {}", "✓".bright_green(), file_name(path));
            }
            WriteOutcome::Skipped(path) => {
                skipped += 1;
                eprintln!("  {} {} (exists)", "-".dimmed(), file_name(path));
            }
        }
    }

    if skipped > 0 {
        eprintln!();
        eprintln!(
            "Kept {} existing template(s). Use {} to replace them.",
            skipped,
            "--force".bright_cyan()
        );
    }

    print_getting_started();

    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Print the getting started guide
pub fn print_getting_started() {
    eprintln!();
    eprintln!("{}", "Getting started:".bold());
    eprintln!(
        "  {} Register the server with your MCP client: {}",
        "1.".dimmed(),
        "pr-agent serve".bright_cyan()
    );
    eprintln!(
        "  {} Try it locally: {}",
        "2.".dimmed(),
        "pr-agent analyze --base main".bright_cyan()
    );
    eprintln!(
        "  {} Edit the templates, or add your own *.md files",
        "3.".dimmed()
    );
}
