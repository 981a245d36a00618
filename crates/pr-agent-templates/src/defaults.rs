use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::catalog::{TemplateError, TEMPLATE_EXTENSION};

/// Templates bundled into the binary, written out by `pr-agent init`
pub const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    ("bug", include_str!("../templates/bug.md")),
    ("docs", include_str!("../templates/docs.md")),
    ("feature", include_str!("../templates/feature.md")),
    ("performance", include_str!("../templates/performance.md")),
    ("refactor", include_str!("../templates/refactor.md")),
    ("security", include_str!("../templates/security.md")),
    ("test", include_str!("../templates/test.md")),
];

/// What happened to one bundled template during [`write_defaults`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    /// Already present and `overwrite` was false
    Skipped(PathBuf),
}

/// Write the bundled templates into `dir`, creating it if needed
pub fn write_defaults(dir: &Path, overwrite: bool) -> Result<Vec<WriteOutcome>, TemplateError> {
    fs::create_dir_all(dir).map_err(|source| TemplateError::WriteTemplate {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut outcomes = Vec::with_capacity(DEFAULT_TEMPLATES.len());

    for (name, content) in DEFAULT_TEMPLATES {
        let path = dir.join(format!("{}.{}", name, TEMPLATE_EXTENSION));

        if path.exists() && !overwrite {
            debug!(path = %path.display(), "Template exists, skipping");
            outcomes.push(WriteOutcome::Skipped(path));
            continue;
        }

        fs::write(&path, content).map_err(|source| TemplateError::WriteTemplate {
            path: path.clone(),
            source,
        })?;
        outcomes.push(WriteOutcome::Written(path));
    }

    Ok(outcomes)
}
