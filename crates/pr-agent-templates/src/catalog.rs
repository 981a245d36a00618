use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// File extension that marks a template
pub const TEMPLATE_EXTENSION: &str = "md";

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to read template directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read template {path}: {source}")]
    ReadTemplate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write template {path}: {source}")]
    WriteTemplate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Named pull request templates, keyed by file stem.
///
/// Serializes as `{"templates": {name: content}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateCatalog {
    templates: BTreeMap<String, String>,
}

impl TemplateCatalog {
    /// Load every `*.md` file directly inside `dir`.
    ///
    /// Hidden files and subdirectories are not searched. Any unreadable template fails the whole load.
    pub fn load(dir: &Path) -> Result<Self, TemplateError> {
        let read_dir_err = |source| TemplateError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };

        let mut templates = BTreeMap::new();

        for entry in fs::read_dir(dir).map_err(read_dir_err)? {
            let path = entry.map_err(read_dir_err)?.path();

            if !is_template(&path) {
                continue;
            }
            let Some(name) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };

            let content =
                fs::read_to_string(&path).map_err(|source| TemplateError::ReadTemplate {
                    path: path.clone(),
                    source,
                })?;

            templates.insert(name, content);
        }

        debug!(dir = %dir.display(), count = templates.len(), "Loaded template catalog");

        Ok(Self { templates })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }

    /// Template names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

}

impl<K, V> FromIterator<(K, V)> for TemplateCatalog
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            templates: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn is_template(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'));

    !hidden && path.is_file() && path.extension().is_some_and(|ext| ext == TEMPLATE_EXTENSION)
}
