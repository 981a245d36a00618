use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::runner::{check_ref, GitError, GitRunner};

/// One line of `git diff --name-status` output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Status code as printed by git (`M`, `A`, `D`, `R100`, ...)
    pub status: String,
    /// Path as printed in the second field; the old path for renames and copies
    pub file: String,
    /// New path for renames and copies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renamed_to: Option<String>,
}

impl ChangedFile {
    pub fn new(status: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            file: file.into(),
            renamed_to: None,
        }
    }

    pub fn is_rename(&self) -> bool {
        self.status.starts_with('R') || self.status.starts_with('C')
    }
}

/// Parse `git diff --name-status` output.
///
/// Lines with fewer than two tab-separated fields are skipped. Order is kept as printed.
pub fn parse_name_status(output: &str) -> Vec<ChangedFile> {
    output
        .trim()
        .split('\n')
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let status = fields.next()?;
            let file = fields.next()?;
            Some(ChangedFile {
                status: status.to_string(),
                file: file.to_string(),
                renamed_to: fields.next().map(str::to_string),
            })
        })
        .collect()
}

/// List files changed between the working tree and `base_ref`
pub async fn list_changes(
    git: &dyn GitRunner,
    base_ref: &str,
    working_dir: &Path,
) -> Result<Vec<ChangedFile>, GitError> {
    check_ref(base_ref)?;

    let stdout = git
        .run(
            &["diff", "--no-color", "--name-status", base_ref, "--"],
            working_dir,
        )
        .await?
        .into_stdout()?;

    let files = parse_name_status(&stdout);

    debug!(
        base_ref,
        files = files.len(),
        renames = files.iter().filter(|f| f.is_rename()).count(),
        "Listed changed files"
    );

    Ok(files)
}
