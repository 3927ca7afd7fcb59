use super::{find_repo, paths_from_args};
use crate::{App, Result};

use clap::{Arg, ArgMatches, SubCommand};
use log::debug;

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("add")
        .about("Add file contents to the index")
        .arg(
            Arg::with_name("paths")
                .required(true)
                .multiple(true)
                .help("Files or directories to stage"),
        )
}

pub(crate) fn run(_app: &mut App, args: &ArgMatches) -> Result<()> {
    let repo = find_repo::from_current_dir()?;
    let paths = paths_from_args(args, "paths")?;

    let staged = repo.stage_files(&paths)?;
    debug!("staged {} files", staged.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::{cmds::test_support::write_files, temp_cwd::TempCwd, App};

    use oxgit_on_disk::{OnDisk, TempGitRepo};

    use serial_test::serial;

    #[test]
    #[serial]
    fn paths_are_relative_to_cwd() {
        let temp = tempfile::tempdir().unwrap();
        let r = OnDisk::init(temp.path()).unwrap();
        write_files(temp.path(), &[("top.txt", "top"), ("sub/inner.txt", "inner")]);

        let _cwd = TempCwd::new(temp.path().join("sub"));
        App::run_with_args(vec!["add", "inner.txt", "../top.txt"]).unwrap();

        let index = r.read_index().unwrap();
        let paths: Vec<&str> = index.entries().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["sub/inner.txt", "top.txt"]);
    }

    #[test]
    #[serial]
    fn errors() {
        let temp = tempfile::tempdir().unwrap();
        OnDisk::init(temp.path()).unwrap();
        let _cwd = TempCwd::new(temp.path());

        let err = App::run_with_args(vec!["add", "missing.txt"]).unwrap_err();
        assert!(err.to_string().contains("No such file"));

        fs::write(temp.path().join(".git/x"), "x").unwrap();
        let err = App::run_with_args(vec!["add", ".git/x"]).unwrap_err();
        assert!(err.to_string().contains("outside of the working directory"));

        assert!(App::run_with_args(vec!["add"]).is_err());
    }

    #[test]
    #[serial]
    fn matches_command_line_git() {
        if !TempGitRepo::git_available() {
            return;
        }

        let mut tgr = TempGitRepo::new();
        tgr.write_file("a.txt", "hello\n")
            .write_file("dir/b.txt", "world\n")
            .write_file("dir/c/d.txt", "deep\n");

        {
            let _cwd = TempCwd::new(tgr.path());
            App::run_with_args(vec!["add", "."]).unwrap();
        }

        let ours = tgr.git_output(&["ls-files", "-s"]);
        let tree = tgr.git_output(&["write-tree"]);

        tgr.git_command(&["rm", "-q", "-r", "--cached", "."])
            .git_command(&["add", "."]);

        assert_eq!(tgr.git_output(&["ls-files", "-s"]), ours);
        assert_eq!(tgr.git_output(&["write-tree"]), tree);
    }
}
