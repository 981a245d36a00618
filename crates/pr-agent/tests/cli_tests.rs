use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn pr_agent(working_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pr-agent"))
        .arg("--working-dir")
        .arg(working_dir)
        .args(["--log-level", "error"])
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_templates_command_lists_directory() {
    let dir = TempDir::new().unwrap();
    let templates = dir.path().join("templates");
    fs::create_dir(&templates).unwrap();
    fs::write(templates.join("bug.md"), "## Bug\n").unwrap();
    fs::write(templates.join("feature.md"), "## Feature\n").unwrap();

    let json = stdout_json(&pr_agent(dir.path(), &["templates"]));
    assert_eq!(
        json,
        serde_json::json!({"templates": {"bug": "## Bug\n", "feature": "## Feature\n"}})
    );
}

#[test]
fn test_suggest_command() {
    let dir = TempDir::new().unwrap();
    let templates = dir.path().join("templates");
    fs::create_dir(&templates).unwrap();
    fs::write(templates.join("bug.md"), "## Bug\n").unwrap();

    let json = stdout_json(&pr_agent(
        dir.path(),
        &["suggest", "fixes a null pointer", "bug"],
    ));
    assert_eq!(json["recommended_template"], "## Bug\n");
    assert!(json["reasoning"]
        .as_str()
        .unwrap()
        .contains("fixes a null pointer"));

    let json = stdout_json(&pr_agent(dir.path(), &["suggest", "x", "nonexistent_type"]));
    assert_eq!(
        json["error"],
        "No template found for change type 'nonexistent_type'. Available types: bug"
    );
}

#[test]
fn test_init_writes_templates() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("pr-templates");

    let output = pr_agent(
        dir.path(),
        &["--git-binary", "/nonexistent/git", "init", "--dir", target.to_str().unwrap()],
    );
    assert!(output.status.success());
    assert!(target.join("bug.md").is_file());
    assert!(target.join("feature.md").is_file());

    let json = stdout_json(&pr_agent(
        dir.path(),
        &["--templates-dir", target.to_str().unwrap(), "templates"],
    ));
    assert!(json["templates"]["docs"].is_string());
}

#[test]
fn test_analyze_outside_repository_reports_error() {
    let dir = TempDir::new().unwrap();

    let json = stdout_json(&pr_agent(dir.path(), &["analyze"]));
    let error = json["error"].as_str().unwrap();
    assert!(
        error.starts_with("Git command failed: ") || error.starts_with("Failed to analyze changes: "),
        "{}",
        error
    );
}

#[test]
fn test_project_config_is_applied() {
    let dir = TempDir::new().unwrap();
    let custom = dir.path().join("custom");
    fs::create_dir(&custom).unwrap();
    fs::write(custom.join("docs.md"), "## Docs\n").unwrap();
    fs::write(
        dir.path().join("pr-agent.toml"),
        "templates_dir = \"custom\"\n",
    )
    .unwrap();

    let json = stdout_json(&pr_agent(dir.path(), &["templates"]));
    assert_eq!(json, serde_json::json!({"templates": {"docs": "## Docs\n"}}));
}
