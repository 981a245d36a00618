use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to spawn git: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("Git command timed out after {0:?}")]
    Timeout(Duration),

    #[error("Git command failed: {stderr}")]
    CommandFailed { exit_code: i32, stderr: String },

    #[error("Invalid base reference: {0}")]
    InvalidRef(String),
}

/// Output captured from a single git invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, or -1 when the process was killed by a signal
    pub exit_code: i32,
}

impl GitOutput {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Turn a non-zero exit into [`GitError::CommandFailed`], keeping stdout otherwise
    pub fn into_stdout(self) -> Result<String, GitError> {
        if self.success() {
            Ok(self.stdout)
        } else {
            Err(GitError::CommandFailed {
                exit_code: self.exit_code,
                stderr: self.stderr,
            })
        }
    }
}

/// Something that can run git subcommands in a directory.
///
/// The production implementation is [`GitCli`]; tests substitute canned output.
#[async_trait]
pub trait GitRunner: Send + Sync {
    async fn run(&self, args: &[&str], working_dir: &Path) -> Result<GitOutput, GitError>;
}

/// Runs the `git` command-line tool as a subprocess
#[derive(Debug, Clone)]
pub struct GitCli {
    binary: PathBuf,
    /// None = wait forever
    timeout: Option<Duration>,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("git"),
            timeout: None,
        }
    }

    pub fn with_binary_path(mut self, path: PathBuf) -> Self {
        self.binary = path;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn binary_path(&self) -> &Path {
        &self.binary
    }

    /// Check if the git binary can be executed
    pub async fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl GitRunner for GitCli {
    async fn run(&self, args: &[&str], working_dir: &Path) -> Result<GitOutput, GitError> {
        let start = Instant::now();

        debug!(
            binary = %self.binary.display(),
            args = ?args,
            working_dir = %working_dir.display(),
            "Spawning git"
        );

        let mut cmd = Command::new(&self.binary);
        cmd.args(args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| GitError::Timeout(limit))??,
            None => cmd.output().await?,
        };

        let exit_code = output.status.code().unwrap_or(-1);

        debug!(
            exit_code,
            stdout_len = output.stdout.len(),
            duration_ms = start.elapsed().as_millis(),
            "Git completed"
        );

        Ok(GitOutput::new(
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
            exit_code,
        ))
    }
}

/// Reject references git would parse as an option
pub(crate) fn check_ref(base_ref: &str) -> Result<(), GitError> {
    if base_ref.is_empty() || base_ref.starts_with('-') {
        return Err(GitError::InvalidRef(base_ref.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_stdout_success() {
        let output = GitOutput::new("M\tsrc/lib.rs\n", "", 0);
        assert_eq!(output.into_stdout().unwrap(), "M\tsrc/lib.rs\n");
    }

    #[test]
    fn test_into_stdout_failure_keeps_stderr() {
        let output = GitOutput::new("", "fatal: bad revision 'nope'\n", 128);
        match output.into_stdout() {
            Err(GitError::CommandFailed { exit_code, stderr }) => {
                assert_eq!(exit_code, 128);
                assert_eq!(stderr, "fatal: bad revision 'nope'\n");
            }
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_check_ref_rejects_options() {
        assert!(check_ref("main").is_ok());
        assert!(check_ref("origin/main").is_ok());
        assert!(check_ref("HEAD~3").is_ok());
        assert!(matches!(check_ref("--output=/tmp/x"), Err(GitError::InvalidRef(_))));
        assert!(matches!(check_ref(""), Err(GitError::InvalidRef(_))));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let git = GitCli::new().with_binary_path(PathBuf::from("/nonexistent/bin/git-xyz"));
        let dir = std::env::temp_dir();
        let result = git.run(&["--version"], &dir).await;
        assert!(matches!(result, Err(GitError::SpawnFailed(_))));
        assert!(!git.is_available().await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_command_times_out() {
        let git = GitCli::new()
            .with_binary_path(PathBuf::from("/bin/sh"))
            .with_timeout(Duration::from_millis(100));
        let dir = std::env::temp_dir();

        let start = Instant::now();
        let result = git.run(&["-c", "sleep 5"], &dir).await;

        assert!(matches!(result, Err(GitError::Timeout(d)) if d == Duration::from_millis(100)));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fast_command_within_timeout() {
        let git = GitCli::new()
            .with_binary_path(PathBuf::from("/bin/sh"))
            .with_timeout(Duration::from_secs(10));
        let dir = std::env::temp_dir();

        let output = git.run(&["-c", "echo ok"], &dir).await.unwrap();
        assert_eq!(output.into_stdout().unwrap(), "ok\n");
    }
}
