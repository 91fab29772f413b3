use std::path::Path;
use std::process::Command;

use revu_gitpulse::context::{collect_context, ContextOptions};
use revu_gitpulse::git::repository_root;
use revu_gitpulse::history::read_recent_commits;
use revu_gitpulse::status::read_status;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn init_repo() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    git(dir.path(), &["init", "--quiet"]);
    git(dir.path(), &["config", "user.name", "Test Author"]);
    git(dir.path(), &["config", "user.email", "test@example.com"]);
    git(dir.path(), &["config", "commit.gpgsign", "false"]);
    dir
}

fn commit_file(dir: &Path, name: &str, content: &str, message: &str) {
    std::fs::write(dir.join(name), content).unwrap();
    git(dir, &["add", name]);
    git(dir, &["commit", "--quiet", "-m", message]);
}

#[tokio::test]
async fn locates_root_from_subdirectory() {
    if !git_available() {
        return;
    }
    let repo = init_repo();
    let nested = repo.path().join("src/deep");
    std::fs::create_dir_all(&nested).unwrap();

    let root = repository_root(&nested).await.unwrap();
    assert_eq!(
        root.canonicalize().unwrap(),
        repo.path().canonicalize().unwrap()
    );
}

#[tokio::test]
async fn non_repository_is_a_git_error() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    // A temp dir could still sit inside some enclosing checkout; only assert
    // the error shape when git agrees there is no repository.
    if let Err(err) = repository_root(dir.path()).await {
        assert!(matches!(err, revu_core::RevuError::Git(_)));
        assert!(err.to_string().contains("not inside a git repository"));
    }
}

#[tokio::test]
async fn status_reports_staged_unstaged_and_untracked() {
    if !git_available() {
        return;
    }
    let repo = init_repo();
    commit_file(repo.path(), "a.txt", "one\n", "first");

    std::fs::write(repo.path().join("a.txt"), "one\ntwo\n").unwrap();
    std::fs::write(repo.path().join("b.txt"), "new\n").unwrap();
    git(repo.path(), &["add", "b.txt"]);
    std::fs::write(repo.path().join("notes.md"), "scratch\n").unwrap();

    let status = read_status(repo.path()).await.unwrap();
    assert!(status.branch.is_some());
    assert_eq!(status.staged.len(), 1);
    assert_eq!(status.staged[0].path, "b.txt");
    assert_eq!(status.staged[0].status, "A");
    assert_eq!(status.unstaged.len(), 1);
    assert_eq!(status.unstaged[0].path, "a.txt");
    assert_eq!(status.untracked, vec!["notes.md".to_string()]);
    assert!(status.conflicts.is_empty());
}

#[tokio::test]
async fn status_decodes_non_ascii_paths() {
    if !git_available() {
        return;
    }
    let repo = init_repo();
    git(repo.path(), &["config", "core.quotePath", "true"]);
    commit_file(repo.path(), "seed.txt", "seed\n", "first");

    std::fs::write(repo.path().join("café.rs"), "fn main() {}\n").unwrap();
    git(repo.path(), &["add", "café.rs"]);
    std::fs::write(repo.path().join("naïve notes.md"), "draft\n").unwrap();

    let status = read_status(repo.path()).await.unwrap();
    assert_eq!(status.staged.len(), 1);
    assert_eq!(status.staged[0].path, "café.rs");
    assert_eq!(status.untracked, vec!["naïve notes.md".to_string()]);
}

#[tokio::test]
async fn history_is_newest_first_and_bounded() {
    if !git_available() {
        return;
    }
    let repo = init_repo();
    commit_file(repo.path(), "a.txt", "1\n", "first commit");
    commit_file(repo.path(), "a.txt", "2\n", "second commit");
    commit_file(repo.path(), "a.txt", "3\n", "third commit");

    let commits = read_recent_commits(repo.path(), 2).await.unwrap();
    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0].summary, "third commit");
    assert_eq!(commits[1].summary, "second commit");
    assert_eq!(commits[0].author, "Test Author");
    assert_eq!(commits[0].hash.len(), 40);
}

#[tokio::test]
async fn collect_context_honours_flags() {
    if !git_available() {
        return;
    }
    let repo = init_repo();
    commit_file(repo.path(), "a.txt", "1\n", "only commit");

    let ctx = collect_context(
        repo.path(),
        &ContextOptions {
            include_git_status: false,
            include_recent_commits: true,
            recent_commit_limit: 5,
        },
    )
    .await
    .unwrap();

    assert!(ctx.status.is_none());
    let commits = ctx.recent_commits.unwrap();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].summary, "only commit");
}
