use std::io::Write;

use super::{find_repo, rev};
use crate::{App, Result};

use clap::{Arg, ArgGroup, ArgMatches, SubCommand};
use oxgit_core::repo::Repo;

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("cat-file")
        .about("Provide content or type and size information for repository objects")
        .arg(
            Arg::with_name("t")
                .short("t")
                .help("Show the object type"),
        )
        .arg(
            Arg::with_name("s")
                .short("s")
                .help("Show the object size"),
        )
        .arg(
            Arg::with_name("e")
                .short("e")
                .help("Exit with zero status if the object exists and is valid"),
        )
        .arg(
            Arg::with_name("p")
                .short("p")
                .help("Pretty-print the object's content"),
        )
        .group(
            ArgGroup::with_name("mode")
                .args(&["t", "s", "e", "p"])
                .required(true),
        )
        .arg(
            Arg::with_name("object")
                .required(true)
                .help("The name of the object to show"),
        )
}

pub(crate) fn run(app: &mut App, args: &ArgMatches) -> Result<()> {
    let repo = find_repo::from_current_dir()?;
    let name = args.value_of("object").unwrap_or_default();

    let id = rev::resolve(&repo, name)?;
    let object = repo.get_object(&id)?;

    if args.is_present("t") {
        writeln!(app, "{}", object.kind())?;
    } else if args.is_present("s") {
        writeln!(app, "{}", object.size())?;
    } else if args.is_present("p") {
        app.write_all(&object.pretty())?;
    }
    // -e: reading the object successfully is the whole check.

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{cmds::test_support::committed_repo, temp_cwd::TempCwd, App};

    use oxgit_core::repo::RefStore;
    use oxgit_on_disk::TempGitRepo;

    use serial_test::serial;

    #[test]
    #[serial]
    fn types_sizes_and_content() {
        let (temp, r) = committed_repo(&[("a.txt", "hello"), ("dir/b.txt", "world")]);
        let _cwd = TempCwd::new(temp.path());

        let blob = "b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0";
        assert_eq!(App::run_with_args(vec!["cat-file", "-t", blob]).unwrap(), b"blob\n");
        assert_eq!(App::run_with_args(vec!["cat-file", "-s", blob]).unwrap(), b"5\n");
        assert_eq!(App::run_with_args(vec!["cat-file", "-p", blob]).unwrap(), b"hello");
        assert_eq!(App::run_with_args(vec!["cat-file", "-e", blob]).unwrap(), b"");

        assert_eq!(
            App::run_with_args(vec!["cat-file", "-t", "HEAD"]).unwrap(),
            b"commit\n"
        );

        let head = r.head_id().unwrap().unwrap().to_string();
        let commit = App::run_with_args(vec!["cat-file", "-p", &head]).unwrap();
        let commit = String::from_utf8(commit).unwrap();
        assert!(commit.starts_with("tree d5f0fc3dfb21ae6650f380a7b101c390f29940e4\n"));
        assert!(commit.ends_with("\nfirst\n"));

        let tree = App::run_with_args(vec![
            "cat-file",
            "-p",
            "d5f0fc3dfb21ae6650f380a7b101c390f29940e4",
        ])
        .unwrap();
        let tree = String::from_utf8(tree).unwrap();
        let lines: Vec<&str> = tree.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "100644 blob b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0\ta.txt"
        );
        assert!(lines[1].starts_with("040000 tree "));
        assert!(lines[1].ends_with("\tdir"));
    }

    #[test]
    #[serial]
    fn missing_object() {
        let temp = tempfile::tempdir().unwrap();
        oxgit_on_disk::OnDisk::init(temp.path()).unwrap();
        let _cwd = TempCwd::new(temp.path());

        let err = App::run_with_args(vec![
            "cat-file",
            "-e",
            "d670460b4b4aece5915caf5c68d12f560a9fe3e4",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("not found"));

        let err = App::run_with_args(vec!["cat-file", "-t", "HEAD"]).unwrap_err();
        assert!(err.to_string().contains("not a valid object name"));
    }

    #[test]
    fn exactly_one_mode() {
        let id = "d670460b4b4aece5915caf5c68d12f560a9fe3e4";
        assert!(App::run_with_args(vec!["cat-file", id]).is_err());
        assert!(App::run_with_args(vec!["cat-file", "-t", "-s", id]).is_err());
    }

    #[test]
    #[serial]
    fn matches_command_line_git() {
        if !TempGitRepo::git_available() {
            return;
        }

        let mut tgr = TempGitRepo::new();
        tgr.write_file("a.txt", "hello\n")
            .write_file("sub/b.txt", "world\n")
            .git_command(&["add", "."])
            .git_command(&["commit", "-q", "-m", "first"]);

        let _cwd = TempCwd::new(tgr.path());

        for name in &["HEAD", "master"] {
            for mode in &["-t", "-s", "-p"] {
                let expected = tgr.git_output(&["cat-file", mode, name]);
                let actual = App::run_with_args(vec!["cat-file", mode, name]).unwrap();
                assert_eq!(String::from_utf8(actual).unwrap().trim_end(), expected);
            }
        }

        let tree = tgr.git_output(&["rev-parse", "HEAD^{tree}"]);
        let expected = tgr.git_output(&["cat-file", "-p", &tree]);
        let actual = App::run_with_args(vec!["cat-file", "-p", &tree]).unwrap();
        assert_eq!(String::from_utf8(actual).unwrap().trim_end(), expected);
    }
}
