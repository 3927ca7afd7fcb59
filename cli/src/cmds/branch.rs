use std::io::Write;

use super::{find_repo, rev, usage_error};
use crate::{App, Result};

use clap::{Arg, ArgMatches, SubCommand};
use oxgit_core::repo::{branch_name, check_ref_name, RefStore};

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("branch")
        .about("List or create branches")
        .arg(
            Arg::with_name("name")
                .help("The branch to create; lists branches if omitted"),
        )
        .arg(
            Arg::with_name("start")
                .requires("name")
                .help("Where the new branch should point (default HEAD)"),
        )
}

pub(crate) fn run(app: &mut App, args: &ArgMatches) -> Result<()> {
    let repo = find_repo::from_current_dir()?;

    let name = match args.value_of("name") {
        Some(name) => name,
        None => return list(app, &repo),
    };

    let full = rev::branch_ref(name);
    check_ref_name(&full)?;

    if repo.read_ref(&full)?.is_some() {
        return Err(usage_error(format!(
            "a branch named '{}' already exists",
            name
        )));
    }

    let start = args.value_of("start").unwrap_or("HEAD");
    let id = rev::resolve_existing(&repo, start)?;
    repo.update_ref(&full, &id)?;

    Ok(())
}

fn list<R: RefStore>(app: &mut App, repo: &R) -> Result<()> {
    let current = repo.current_ref()?;

    for name in repo.branch_refs(false)?.keys() {
        let marker = if *name == current { '*' } else { ' ' };
        writeln!(app, "{} {}", marker, branch_name(name))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{cmds::test_support::committed_repo, temp_cwd::TempCwd, App};

    use oxgit_core::repo::RefStore;
    use oxgit_on_disk::{OnDisk, TempGitRepo};

    use serial_test::serial;

    #[test]
    #[serial]
    fn create_and_list() {
        let (temp, r) = committed_repo(&[("a.txt", "a")]);
        let head = r.head_id().unwrap();
        let _cwd = TempCwd::new(temp.path());

        App::run_with_args(vec!["branch", "topic"]).unwrap();
        App::run_with_args(vec!["branch", "feature/x", "master"]).unwrap();
        assert_eq!(r.read_ref("refs/heads/topic").unwrap(), head);

        assert_eq!(
            App::run_with_args(vec!["branch"]).unwrap(),
            b"  feature/x\n* master\n  topic\n".to_vec()
        );

        let err = App::run_with_args(vec!["branch", "topic"]).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        let err = App::run_with_args(vec!["branch", "bad..name"]).unwrap_err();
        assert!(err.to_string().contains("invalid ref name"));
    }

    #[test]
    #[serial]
    fn unborn_branch() {
        let temp = tempfile::tempdir().unwrap();
        OnDisk::init(temp.path()).unwrap();
        let _cwd = TempCwd::new(temp.path());

        assert_eq!(App::run_with_args(vec!["branch"]).unwrap(), b"");

        let err = App::run_with_args(vec!["branch", "topic"]).unwrap_err();
        assert!(err.to_string().contains("not a valid object name: 'HEAD'"));
    }

    #[test]
    #[serial]
    fn matches_command_line_git() {
        if !TempGitRepo::git_available() {
            return;
        }

        let mut tgr = TempGitRepo::new();
        tgr.write_file("a.txt", "a")
            .git_command(&["add", "a.txt"])
            .git_command(&["commit", "-q", "-m", "first"])
            .git_command(&["branch", "zeta"])
            .git_command(&["branch", "alpha"]);

        let _cwd = TempCwd::new(tgr.path());
        App::run_with_args(vec!["branch", "mid"]).unwrap();

        let ours = String::from_utf8(App::run_with_args(vec!["branch"]).unwrap()).unwrap();
        assert_eq!(ours.trim_end(), tgr.git_output(&["branch", "--no-color"]));
    }
}
