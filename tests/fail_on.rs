use std::path::Path;
use std::process::{Command, Output};

use revu_core::Severity;

#[test]
fn fail_on_threshold_ordering() {
    let threshold = Severity::Warn;

    assert!(Severity::Critical.meets_threshold(threshold));
    assert!(Severity::Warn.meets_threshold(threshold));
    assert!(!Severity::Info.meets_threshold(threshold));
    assert!(Severity::Info.meets_threshold(Severity::Info));
}

#[test]
fn fail_on_parses_cli_spellings() {
    assert_eq!("warn".parse::<Severity>().unwrap(), Severity::Warn);
    assert_eq!("WARNING".parse::<Severity>().unwrap(), Severity::Warn);
    assert_eq!("critical".parse::<Severity>().unwrap(), Severity::Critical);
    assert!("bug".parse::<Severity>().is_err());
}

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
    assert!(output.status.success(), "git {args:?} failed");
}

/// A repository with a staged code change and no test changes.
fn repo_with_untested_change() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path();
    git(path, &["init", "--quiet"]);
    git(path, &["config", "user.name", "Test Author"]);
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "commit.gpgsign", "false"]);
    std::fs::write(path.join("lib.rs"), "pub fn a() {}\n").unwrap();
    git(path, &["add", "."]);
    git(path, &["commit", "--quiet", "-m", "seed"]);
    std::fs::write(path.join("lib.rs"), "pub fn a() {}\npub fn b() {}\n").unwrap();
    git(path, &["add", "."]);
    dir
}

fn revu(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_revu"))
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap()
}

#[test]
fn check_exits_one_when_finding_meets_threshold() {
    if !git_available() {
        return;
    }
    let repo = repo_with_untested_change();

    let output = revu(repo.path(), &["check", "--fail-on", "warn"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("missing-tests"));
}

#[test]
fn check_exits_zero_below_threshold() {
    if !git_available() {
        return;
    }
    let repo = repo_with_untested_change();

    let output = revu(repo.path(), &["check", "--fail-on", "critical"]);
    assert!(output.status.success());

    let output = revu(repo.path(), &["check", "--no-require-tests", "--fail-on", "warn"]);
    assert!(output.status.success());
}

#[test]
fn diff_json_output_is_structured() {
    if !git_available() {
        return;
    }
    let repo = repo_with_untested_change();

    let output = revu(repo.path(), &["--format", "json", "diff"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["fileCount"], 1);
    assert_eq!(json["files"][0]["path"], "lib.rs");
    assert_eq!(json["files"][0]["additions"], 1);
}
