use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

use pr_agent_git::{
    fetch_diff, list_changes, paginate, parse_cursor, ChangedFile, DiffWindow, GitError,
    GitRunner, TruncationPolicy,
};

pub const DEFAULT_BASE_BRANCH: &str = "main";
pub const DEFAULT_MAX_DIFF_LINES: usize = 500;

/// Parameters of one `analyze_file_changes` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeOptions {
    pub base_branch: String,
    pub include_diff: bool,
    pub max_diff_lines: usize,
    /// `next_diff_index` from a previous call, echoed back verbatim
    pub cursor: Option<String>,
    pub truncation: TruncationPolicy,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            base_branch: DEFAULT_BASE_BRANCH.to_string(),
            include_diff: true,
            max_diff_lines: DEFAULT_MAX_DIFF_LINES,
            cursor: None,
            truncation: TruncationPolicy::default(),
        }
    }
}

impl AnalyzeOptions {
    pub fn new(base_branch: impl Into<String>) -> Self {
        Self {
            base_branch: base_branch.into(),
            ..Default::default()
        }
    }

    pub fn with_diff(mut self, include: bool) -> Self {
        self.include_diff = include;
        self
    }

    pub fn with_max_diff_lines(mut self, max: usize) -> Self {
        self.max_diff_lines = max;
        self
    }

    pub fn with_cursor(mut self, cursor: Option<String>) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn with_truncation(mut self, policy: TruncationPolicy) -> Self {
        self.truncation = policy;
        self
    }
}

/// Wire form of a [`DiffWindow`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffPage {
    pub diff: String,
    pub diff_lines_shown: usize,
    pub total_diff_lines: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_diff_index: Option<String>,
    pub has_more_diff: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

impl From<DiffWindow> for DiffPage {
    fn from(window: DiffWindow) -> Self {
        Self {
            diff: window.text(),
            diff_lines_shown: window.shown_count(),
            total_diff_lines: window.total_count,
            next_diff_index: window.next_offset.map(|n| n.to_string()),
            has_more_diff: window.has_more(),
            truncated: window.truncated,
        }
    }
}

/// Changed files plus, optionally, one page of the diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeAnalysis {
    pub base_branch: String,
    pub changed_files: Vec<ChangedFile>,
    pub total_files: usize,
    #[serde(flatten)]
    pub diff: Option<DiffPage>,
    /// Set instead of `diff` when only the diff command failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_error: Option<String>,
}

/// Outcome of `analyze_file_changes`.
///
/// Failures are data: they serialize as `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    Success(ChangeAnalysis),
    Failure { error: String },
}

impl AnalysisResult {
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failure { error } => Some(error),
            Self::Success(_) => None,
        }
    }
}

/// List changed files against the base branch and page through the diff.
///
/// A failing name-status command fails the call. A failing diff command only
/// attaches `diff_error`. The diff is skipped when there are no changed files.
pub async fn analyze_changes(
    git: &dyn GitRunner,
    working_dir: &Path,
    options: &AnalyzeOptions,
) -> AnalysisResult {
    let base = options.base_branch.as_str();

    let changed_files = match list_changes(git, base, working_dir).await {
        Ok(files) => files,
        Err(e @ GitError::CommandFailed { .. }) => {
            warn!(base_branch = base, error = %e, "Listing changes failed");
            return AnalysisResult::failure(e.to_string());
        }
        Err(e) => return unexpected(e),
    };

    let mut analysis = ChangeAnalysis {
        base_branch: options.base_branch.clone(),
        total_files: changed_files.len(),
        changed_files,
        diff: None,
        diff_error: None,
    };

    if options.include_diff && !analysis.changed_files.is_empty() {
        match fetch_diff(git, base, working_dir).await {
            Ok(diff) => {
                let start = parse_cursor(options.cursor.as_deref());
                let window = paginate(&diff, start, options.max_diff_lines, options.truncation);
                debug!(
                    start,
                    shown = window.shown_count(),
                    total = window.total_count,
                    has_more = window.has_more(),
                    "Paged diff"
                );
                analysis.diff = Some(window.into());
            }
            Err(GitError::CommandFailed { stderr, .. }) => {
                warn!(base_branch = base, "Diff command failed");
                analysis.diff_error = Some(stderr);
            }
            Err(e) => return unexpected(e),
        }
    }

    AnalysisResult::Success(analysis)
}

fn unexpected(e: GitError) -> AnalysisResult {
    warn!(error = %e, "Change analysis failed");
    AnalysisResult::failure(format!("Failed to analyze changes: {}", e))
}
