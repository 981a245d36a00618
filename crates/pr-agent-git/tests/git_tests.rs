use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use pr_agent_git::{
    fetch_diff, list_changes, paginate, GitCli, GitError, TruncationPolicy,
};
use tempfile::TempDir;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args([
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        status.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&status.stderr)
    );
}

/// Helper: a repository with one commit on `main`.
fn create_test_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    git(dir.path(), &["init", "-q"]);
    git(dir.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);

    fs::write(dir.path().join("keep.txt"), "unchanged\n").unwrap();
    fs::write(dir.path().join("edit.txt"), "one\ntwo\nthree\n").unwrap();
    fs::write(dir.path().join("gone.txt"), "bye\n").unwrap();
    git(dir.path(), &["add", "."]);
    git(dir.path(), &["commit", "-q", "-m", "initial"]);

    dir
}

#[tokio::test]
async fn test_clean_tree_has_no_changes() {
    if !git_available() {
        return;
    }
    let repo = create_test_repo();
    let cli = GitCli::new();

    let files = list_changes(&cli, "main", repo.path()).await.unwrap();
    assert!(files.is_empty());

    let diff = fetch_diff(&cli, "main", repo.path()).await.unwrap();
    assert_eq!(diff, "");
}

#[tokio::test]
async fn test_lists_modified_and_deleted_files() {
    if !git_available() {
        return;
    }
    let repo = create_test_repo();
    fs::write(repo.path().join("edit.txt"), "one\n2\nthree\n").unwrap();
    fs::remove_file(repo.path().join("gone.txt")).unwrap();

    let cli = GitCli::new();
    let files = list_changes(&cli, "main", repo.path()).await.unwrap();

    let summary: Vec<(&str, &str)> = files
        .iter()
        .map(|f| (f.status.as_str(), f.file.as_str()))
        .collect();
    assert_eq!(summary, vec![("M", "edit.txt"), ("D", "gone.txt")]);
}

#[tokio::test]
async fn test_staged_addition_is_listed() {
    if !git_available() {
        return;
    }
    let repo = create_test_repo();
    fs::write(repo.path().join("new.txt"), "hello\n").unwrap();
    git(repo.path(), &["add", "new.txt"]);

    let files = list_changes(&GitCli::new(), "main", repo.path())
        .await
        .unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].status, "A");
    assert_eq!(files[0].file, "new.txt");
}

#[tokio::test]
async fn test_unknown_base_is_command_failure() {
    if !git_available() {
        return;
    }
    let repo = create_test_repo();

    let result = list_changes(&GitCli::new(), "no-such-branch", repo.path()).await;
    match result {
        Err(GitError::CommandFailed { exit_code, stderr }) => {
            assert_ne!(exit_code, 0);
            assert!(!stderr.is_empty());
        }
        other => panic!("expected CommandFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_option_like_base_is_rejected() {
    let dir = TempDir::new().unwrap();
    let result = fetch_diff(&GitCli::new(), "--output=/tmp/pwned", dir.path()).await;
    assert!(matches!(result, Err(GitError::InvalidRef(_))));
}

#[tokio::test]
async fn test_diff_pages_cover_whole_diff() {
    if !git_available() {
        return;
    }
    let repo = create_test_repo();
    let body: String = (0..40).map(|i| format!("row {}\n", i)).collect();
    fs::write(repo.path().join("edit.txt"), body).unwrap();

    let cli = GitCli::new().with_timeout(Duration::from_secs(30));
    let diff = fetch_diff(&cli, "main", repo.path()).await.unwrap();
    assert!(diff.starts_with("diff --git a/edit.txt b/edit.txt"));

    let mut offset = 0;
    let mut pages = Vec::new();
    loop {
        let window = paginate(&diff, offset, 7, TruncationPolicy::WindowFull);
        pages.push(window.text());
        match window.next_offset {
            Some(next) => offset = next,
            None => break,
        }
    }
    assert!(pages.len() > 1);
    assert_eq!(pages.join("\n"), diff);
}
