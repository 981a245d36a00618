//! The three tool operations, shared by the MCP server and the CLI.
//!
//! Each returns the pretty-printed JSON payload sent to the caller. Failures
//! are encoded in the payload, never returned as errors.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use pr_agent_core::{analyze_changes, AnalyzeOptions};
use pr_agent_git::GitRunner;
use pr_agent_templates::{suggest, TemplateCatalog};

/// `analyze_file_changes`
pub async fn analyze_file_changes(
    git: &dyn GitRunner,
    working_dir: &Path,
    options: &AnalyzeOptions,
) -> String {
    info!(
        base_branch = %options.base_branch,
        working_dir = %working_dir.display(),
        cursor = ?options.cursor,
        "Analyzing file changes"
    );
    let result = analyze_changes(git, working_dir, options).await;
    to_json(&result)
}

/// `get_pr_templates`
pub async fn get_pr_templates(templates_dir: &Path) -> String {
    match load_catalog(templates_dir.to_path_buf()).await {
        Ok(catalog) => to_json(&catalog),
        Err(error) => error_json(error),
    }
}

/// `suggest_template`
pub async fn suggest_template(templates_dir: &Path, changes_summary: &str, change_type: &str) -> String {
    match load_catalog(templates_dir.to_path_buf()).await {
        Ok(catalog) => {
            let suggestion = suggest(&catalog, changes_summary, change_type);
            info!(
                change_type,
                matched = suggestion.is_recommended(),
                "Suggested template"
            );
            to_json(&suggestion)
        }
        Err(error) => error_json(error),
    }
}

/// Read the catalog on the blocking pool
async fn load_catalog(dir: PathBuf) -> Result<TemplateCatalog, String> {
    let loaded = tokio::task::spawn_blocking(move || TemplateCatalog::load(&dir)).await;

    match loaded {
        Ok(Ok(catalog)) => Ok(catalog),
        Ok(Err(e)) => {
            warn!(error = %e, "Template load failed");
            Err(format!("Failed to load templates: {}", e))
        }
        Err(e) => Err(format!("Failed to load templates: {}", e)),
    }
}

#[derive(Serialize)]
struct ErrorPayload {
    error: String,
}

fn error_json(error: String) -> String {
    to_json(&ErrorPayload { error })
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        serde_json::json!({ "error": format!("Failed to serialize response: {}", e) }).to_string()
    })
}
