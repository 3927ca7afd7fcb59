use std::{ffi::OsStr, path::Path, process::Command};

use assert_cmd::cargo;
use oxgit_on_disk::OnDisk;

type GitOp = fn(&OsStr, &Path);

/// Returns true if a `git` executable can be run. Comparisons with
/// command-line git are skipped when it can't.
#[allow(dead_code)]
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run `op` once with command-line git and once with oxgit, each in its own
/// empty temporary directory, then require the two directories to match.
#[allow(dead_code)]
pub fn compare_git_and_oxgit(op: GitOp) {
    if !git_available() {
        return;
    }

    let c_temp = tempfile::tempdir().unwrap();
    let c_dir = c_temp.path();
    op(OsStr::new("git"), c_dir);

    let r_temp = tempfile::tempdir().unwrap();
    let r_dir = r_temp.path();
    let oxgit = cargo::cargo_bin("oxgit");
    op(oxgit.as_os_str(), r_dir);

    if dir_diff::is_different(c_dir, r_dir).unwrap() {
        panic!(
            "Directories differ:\n\n  c git: {}\n  oxgit: {}\n\n",
            c_dir.display(),
            r_dir.display()
        );
    }
}

/// Create the same `.git` skeleton on either side of a comparison, so
/// that only what the command under test writes can differ.
#[allow(dead_code)]
pub fn init_empty_repo(path: &Path) {
    OnDisk::init(path).unwrap();
}

/// Identity and clock for commits made by either tool.
#[allow(dead_code)]
pub fn with_fixed_identity(cmd: &mut Command) -> &mut Command {
    cmd.env("GIT_AUTHOR_NAME", "A U Thor")
        .env("GIT_AUTHOR_EMAIL", "author@example.com")
        .env("GIT_AUTHOR_DATE", "1234567890 +0000")
        .env("GIT_COMMITTER_NAME", "C O Mitter")
        .env("GIT_COMMITTER_EMAIL", "committer@example.com")
        .env("GIT_COMMITTER_DATE", "1234567890 +0000")
        .env("GIT_CONFIG_NOSYSTEM", "1")
}
