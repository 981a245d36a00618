use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The process working directory, or `.` if it cannot be determined
pub fn default_working_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Pick the directory git commands run in.
///
/// Uses the first client-declared root when it names an existing directory,
/// otherwise `fallback`. Never fails.
pub fn resolve_working_dir(roots: Option<&[String]>, fallback: &Path) -> PathBuf {
    let first = roots.and_then(|r| r.first());

    match first.and_then(|uri| root_uri_to_path(uri)) {
        Some(path) => {
            debug!(root = %path.display(), "Using client root as working directory");
            path
        }
        None => {
            debug!(
                root = ?first,
                fallback = %fallback.display(),
                "No usable client root, using fallback working directory"
            );
            fallback.to_path_buf()
        }
    }
}

/// Convert a root URI into an existing directory path.
///
/// Accepts `file://` URIs (with an empty or `localhost` authority) and plain
/// absolute paths. Other schemes, relative paths and missing directories yield None.
pub fn root_uri_to_path(uri: &str) -> Option<PathBuf> {
    let raw = match uri.strip_prefix("file://") {
        Some(rest) => {
            let rest = rest.strip_prefix("localhost").unwrap_or(rest);
            if !rest.starts_with('/') {
                return None;
            }
            let decoded = urlencoding::decode(rest).ok().map(Cow::into_owned)?;
            strip_drive_slash(decoded)
        }
        None if uri.contains("://") => return None,
        None => uri.to_string(),
    };

    let path = PathBuf::from(raw);
    (path.is_absolute() && path.is_dir()).then_some(path)
}

// `/C:/work` -> `C:/work`
fn strip_drive_slash(path: String) -> String {
    let bytes = path.as_bytes();
    if cfg!(windows) && bytes.len() >= 3 && bytes[0] == b'/' && bytes[2] == b':' {
        path[1..].to_string()
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_utf8_escape_rejected() {
        assert_eq!(root_uri_to_path("file:///tmp/%FF%FE"), None);
    }

    #[test]
    fn test_other_schemes_rejected() {
        assert_eq!(root_uri_to_path("https://example.com/repo"), None);
        assert_eq!(root_uri_to_path("file://server/share"), None);
        assert_eq!(root_uri_to_path("relative/path"), None);
    }

    #[test]
    fn test_file_uri_to_existing_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let spaced = dir.path().join("my repo");
        std::fs::create_dir(&spaced).unwrap();

        let uri = format!("file://{}", dir.path().display());
        assert_eq!(root_uri_to_path(&uri), Some(dir.path().to_path_buf()));

        let encoded = format!("file://{}/my%20repo", dir.path().display());
        assert_eq!(root_uri_to_path(&encoded), Some(spaced));

        let plain = dir.path().display().to_string();
        assert_eq!(root_uri_to_path(&plain), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn test_only_first_root_is_considered() {
        let dir = tempfile::TempDir::new().unwrap();
        let roots = vec![
            "file:///no/such/dir/anywhere".to_string(),
            format!("file://{}", dir.path().display()),
        ];
        let fallback = Path::new("/fallback");
        assert_eq!(resolve_working_dir(Some(roots.as_slice()), fallback), fallback);

        let roots = vec![format!("file://{}", dir.path().display())];
        assert_eq!(resolve_working_dir(Some(roots.as_slice()), fallback), dir.path());
    }

    #[test]
    fn test_fallback_when_no_roots() {
        let fallback = Path::new("/fallback");
        assert_eq!(resolve_working_dir(None, fallback), fallback);
        assert_eq!(resolve_working_dir(Some(&[][..]), fallback), fallback);
    }
}
