use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::runner::{check_ref, GitError, GitRunner};

/// How a window decides whether it was truncated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TruncationPolicy {
    /// Truncated whenever the window is full. A diff ending exactly on a
    /// window boundary is reported as truncated on its last page.
    #[default]
    WindowFull,
    /// Truncated only when lines remain after the window
    Remaining,
}

impl std::fmt::Display for TruncationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TruncationPolicy::WindowFull => write!(f, "window-full"),
            TruncationPolicy::Remaining => write!(f, "remaining"),
        }
    }
}

impl std::str::FromStr for TruncationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "window-full" | "window_full" | "full" => Ok(TruncationPolicy::WindowFull),
            "remaining" => Ok(TruncationPolicy::Remaining),
            _ => Err(format!("Unknown truncation policy: {}", s)),
        }
    }
}

/// A bounded page of unified diff lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffWindow {
    pub lines: Vec<String>,
    pub start_offset: usize,
    pub total_count: usize,
    /// Offset of the next page, present iff more lines follow
    pub next_offset: Option<usize>,
    pub truncated: bool,
}

impl DiffWindow {
    pub fn shown_count(&self) -> usize {
        self.lines.len()
    }

    pub fn has_more(&self) -> bool {
        self.next_offset.is_some()
    }

    /// Page lines joined back into diff text
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Interpret a caller-supplied cursor.
///
/// Absent, non-numeric and negative values all mean "start from the top".
pub fn parse_cursor(cursor: Option<&str>) -> usize {
    cursor
        .and_then(|c| c.trim().parse::<usize>().ok())
        .unwrap_or(0)
}

/// Cut one window out of `diff`.
///
/// The diff is split on `\n`, so an empty diff is a single empty line and a
/// trailing newline contributes a trailing empty line. `max_lines` below 1 is
/// treated as 1 so every cursor advances.
pub fn paginate(
    diff: &str,
    start_offset: usize,
    max_lines: usize,
    policy: TruncationPolicy,
) -> DiffWindow {
    let max_lines = max_lines.max(1);
    let all: Vec<&str> = diff.split('\n').collect();
    let total_count = all.len();

    let start = start_offset.min(total_count);
    let end = start_offset.saturating_add(max_lines).min(total_count);
    let lines: Vec<String> = all[start..end].iter().map(|l| l.to_string()).collect();

    let has_more = start_offset.saturating_add(lines.len()) < total_count;
    let next_offset = has_more.then_some(end);

    let truncated = match policy {
        TruncationPolicy::WindowFull => lines.len() == max_lines,
        TruncationPolicy::Remaining => has_more,
    };

    DiffWindow {
        lines,
        start_offset,
        total_count,
        next_offset,
        truncated,
    }
}

/// Fetch the full unified diff between the working tree and `base_ref`
pub async fn fetch_diff(
    git: &dyn GitRunner,
    base_ref: &str,
    working_dir: &Path,
) -> Result<String, GitError> {
    check_ref(base_ref)?;

    let diff = git
        .run(&["diff", "--no-color", base_ref, "--"], working_dir)
        .await?
        .into_stdout()?;

    debug!(base_ref, diff_len = diff.len(), "Captured git diff");

    Ok(diff)
}
