//! Configuration file support for pr-agent.
//!
//! Loads `pr-agent.toml` from the working directory, or the global
//! `<config dir>/pr-agent/config.toml`, and merges it with CLI flags.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pr_agent_core::{AnalyzeOptions, DEFAULT_BASE_BRANCH, DEFAULT_MAX_DIFF_LINES};
use pr_agent_git::{GitCli, TruncationPolicy};
use pr_agent_logging::LogFormat;

/// The project config file name
pub const CONFIG_FILE_NAME: &str = "pr-agent.toml";
pub const GLOBAL_CONFIG_DIR: &str = "pr-agent";
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";
pub const TEMPLATES_DIR_NAME: &str = "templates";

const DEFAULT_GIT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ROOTS_TIMEOUT_SECS: u64 = 5;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Settings as written in a config file. Every key is optional.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub git_binary: Option<PathBuf>,
    /// 0 disables the timeout
    pub git_timeout_secs: Option<u64>,
    pub roots_timeout_secs: Option<u64>,
    pub templates_dir: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
    pub default_base_branch: Option<String>,
    pub default_max_diff_lines: Option<usize>,
    pub truncation: Option<TruncationPolicy>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

impl FileConfig {
    /// Parse a config file, resolving relative paths against its directory
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let mut config: FileConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.templates_dir = config.templates_dir.map(|p| base.join(p));
            config.working_dir = config.working_dir.map(|p| base.join(p));
        }

        Ok(config)
    }

    /// Find and load the config that applies to `working_dir`.
    ///
    /// Priority: explicit path > `pr-agent.toml` in the working dir > global config.
    /// Returns `Ok(None)` when no file exists; an explicit path that is missing is an error.
    pub fn discover(explicit: Option<&Path>, working_dir: &Path) -> Result<Option<(PathBuf, Self)>> {
        if let Some(path) = explicit {
            return Ok(Some((path.to_path_buf(), Self::load(path)?)));
        }

        let candidates = [
            Some(working_dir.join(CONFIG_FILE_NAME)),
            global_config_dir().map(|d| d.join(GLOBAL_CONFIG_FILE)),
        ];

        for path in candidates.into_iter().flatten() {
            if path.exists() {
                let config = Self::load(&path)?;
                return Ok(Some((path, config)));
            }
        }

        Ok(None)
    }
}

/// `<config dir>/pr-agent`
pub fn global_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(GLOBAL_CONFIG_DIR))
}

/// Values supplied on the command line; these win over the config file
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub working_dir: Option<PathBuf>,
    pub templates_dir: Option<PathBuf>,
    pub git_binary: Option<PathBuf>,
    pub git_timeout_secs: Option<u64>,
    pub truncation: Option<TruncationPolicy>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Where git runs when the client declares no usable root
    pub working_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub git_binary: PathBuf,
    pub git_timeout: Option<Duration>,
    pub roots_timeout: Duration,
    pub default_base_branch: String,
    pub default_max_diff_lines: usize,
    pub truncation: TruncationPolicy,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Settings {
    /// Merge CLI overrides over file values over built-in defaults
    pub fn resolve(overrides: Overrides, file: FileConfig, cwd: PathBuf) -> Self {
        let working_dir = overrides.working_dir.or(file.working_dir).unwrap_or(cwd);

        let templates_dir = overrides
            .templates_dir
            .or(file.templates_dir)
            .unwrap_or_else(|| default_templates_dir(&working_dir));

        let git_timeout_secs = overrides
            .git_timeout_secs
            .or(file.git_timeout_secs)
            .unwrap_or(DEFAULT_GIT_TIMEOUT_SECS);

        Self {
            templates_dir,
            git_binary: overrides
                .git_binary
                .or(file.git_binary)
                .unwrap_or_else(|| PathBuf::from("git")),
            git_timeout: (git_timeout_secs > 0).then(|| Duration::from_secs(git_timeout_secs)),
            roots_timeout: Duration::from_secs(
                file.roots_timeout_secs.unwrap_or(DEFAULT_ROOTS_TIMEOUT_SECS),
            ),
            default_base_branch: file
                .default_base_branch
                .unwrap_or_else(|| DEFAULT_BASE_BRANCH.to_string()),
            default_max_diff_lines: file
                .default_max_diff_lines
                .unwrap_or(DEFAULT_MAX_DIFF_LINES),
            truncation: overrides.truncation.or(file.truncation).unwrap_or_default(),
            log_level: overrides
                .log_level
                .or(file.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_format: overrides.log_format.or(file.log_format).unwrap_or_default(),
            working_dir,
        }
    }

    pub fn git(&self) -> GitCli {
        let git = GitCli::new().with_binary_path(self.git_binary.clone());
        match self.git_timeout {
            Some(timeout) => git.with_timeout(timeout),
            None => git,
        }
    }

    /// Analysis options with configured defaults filled in for missing values
    pub fn analyze_options(
        &self,
        base_branch: Option<String>,
        include_diff: Option<bool>,
        max_diff_lines: Option<usize>,
        cursor: Option<String>,
    ) -> AnalyzeOptions {
        AnalyzeOptions::new(base_branch.unwrap_or_else(|| self.default_base_branch.clone()))
            .with_diff(include_diff.unwrap_or(true))
            .with_max_diff_lines(max_diff_lines.unwrap_or(self.default_max_diff_lines))
            .with_cursor(cursor)
            .with_truncation(self.truncation)
    }
}

/// `./templates` in the working dir if present, else the global templates dir
fn default_templates_dir(working_dir: &Path) -> PathBuf {
    let local = working_dir.join(TEMPLATES_DIR_NAME);
    if local.is_dir() {
        return local;
    }
    global_config_dir()
        .map(|d| d.join(TEMPLATES_DIR_NAME))
        .unwrap_or(local)
}
