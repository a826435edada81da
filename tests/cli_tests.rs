//! CLI interface tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn subfetch() -> Command {
    let mut cmd = Command::cargo_bin("subfetch").unwrap();
    for var in [
        "SUBFETCH_REPO_URL",
        "SUBFETCH_SUBFOLDER_NAME",
        "SUBFETCH_BRANCH",
        "SUBFETCH_DEST_DIR",
        "SUBFETCH_GIT",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_version_flag() {
    subfetch()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("subfetch"));
}

#[test]
fn test_help_flag() {
    subfetch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "A CLI tool for fetching a single subfolder",
        ))
        .stdout(predicate::str::contains("--subfolder_name"))
        .stdout(predicate::str::contains("--no_unpack"));
}

#[test]
fn test_missing_required_arguments() {
    subfetch()
        .arg("--repo_url")
        .arg("myorg/repo")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--subfolder_name"));
}

#[test]
fn test_unpack_flags_are_exclusive() {
    subfetch()
        .args(["--repo_url", "myorg/repo", "--subfolder_name", "utils"])
        .args(["--is_unpack", "--no_unpack"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_dry_run_unpack() {
    let work_dir = TempDir::new().unwrap();

    subfetch()
        .current_dir(work_dir.path())
        .args(["--repo_url", "https://example.com/org/repo.git"])
        .args(["--subfolder_name", "tools/widget", "--dest_dir", "./out"])
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run preview"))
        .stdout(predicate::str::contains(
            "git clone --filter=blob:none --no-checkout https://example.com/org/repo.git",
        ))
        .stdout(predicate::str::contains("git sparse-checkout set tools/widget"))
        .stdout(predicate::str::contains("git checkout main"))
        .stdout(predicate::str::contains("Unpack contents of 'tools/widget'"));

    assert!(!work_dir.path().join("out").exists());
}

#[test]
fn test_dry_run_nested_from_env() {
    let work_dir = TempDir::new().unwrap();

    subfetch()
        .current_dir(work_dir.path())
        .env("SUBFETCH_REPO_URL", "myorg/repo")
        .env("SUBFETCH_SUBFOLDER_NAME", "utils")
        .env("SUBFETCH_BRANCH", "develop")
        .args(["--no_unpack", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://github.com/myorg/repo.git"))
        .stdout(predicate::str::contains("git checkout develop"))
        .stdout(predicate::str::contains("Move 'utils' to"));
}

#[test]
fn test_unsafe_subfolder_is_configuration_error() {
    subfetch()
        .args(["--repo_url", "myorg/repo", "--subfolder_name", "../escape"])
        .arg("--dry-run")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("unsafe directory traversal"));
}

#[test]
fn test_invalid_branch_is_configuration_error() {
    subfetch()
        .args(["--repo_url", "myorg/repo", "--subfolder_name", "utils"])
        .args(["--branch", "bad..name"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Invalid branch name"));
}

#[test]
fn test_missing_git_binary() {
    let work_dir = TempDir::new().unwrap();

    subfetch()
        .current_dir(work_dir.path())
        .args(["--repo_url", "myorg/repo", "--subfolder_name", "utils"])
        .args(["--git", "subfetch-no-such-git-binary"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Git validation failed"));
}
