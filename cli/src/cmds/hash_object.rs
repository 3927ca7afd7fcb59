use std::{
    fs,
    io::Write,
};

use super::{find_repo, usage_error};
use crate::{App, Result};

use clap::{Arg, ArgMatches, Error, ErrorKind, SubCommand};
use oxgit_core::{
    object::{tag_is_valid, Commit, Kind, Object},
    repo::Repo,
};

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("hash-object")
        .about("Compute object ID and optionally creates a blob from a file")
        .arg(
            Arg::with_name("t")
                .short("t")
                .value_name("type")
                .help("Specify the type (default 'blob')"),
        )
        .arg(
            Arg::with_name("w")
                .short("w")
                .help("Actually write the object into the object database"),
        )
        .arg(
            Arg::with_name("stdin")
                .long("stdin")
                .help("Read the object from standard input instead of from a file"),
        )
        .arg(Arg::with_name("file"))
}

pub(crate) fn run(app: &mut App, args: &ArgMatches) -> Result<()> {
    let kind = kind_from_args(args)?;
    let payload = payload_from_args(app, args)?;

    // Trees are validated while decoding.
    let corrupt = || usage_error(format!("corrupt {}", kind));
    let object = Object::new(kind, payload).map_err(|_| corrupt())?;

    let valid = match kind {
        Kind::Commit => Commit::from_object(&object).is_ok(),
        Kind::Tag => tag_is_valid(object.payload()),
        Kind::Blob | Kind::Tree => true,
    };
    if !valid {
        return Err(corrupt());
    }

    if args.is_present("w") {
        let repo = find_repo::from_current_dir()?;
        repo.put_object(&object)?;
    }

    writeln!(app, "{}", object.id())?;

    Ok(())
}

fn kind_from_args(args: &ArgMatches) -> Result<Kind> {
    match args.value_of("t") {
        Some(type_str) => Kind::from_bytes(type_str.as_bytes()).ok_or_else(|| {
            usage_error("-t must be one of blob, commit, tag, or tree")
        }),
        None => Ok(Kind::Blob),
    }
}

fn payload_from_args(app: &mut App, args: &ArgMatches) -> Result<Vec<u8>> {
    let stdin = args.is_present("stdin");

    match (args.value_of("file"), stdin) {
        (Some(file), false) => Ok(fs::read(file)?),
        (None, true) => {
            let mut payload = Vec::new();
            app.stdin.read_to_end(&mut payload)?;
            Ok(payload)
        }
        _ => Err(Box::new(Error {
            message: "content source must be either --stdin or a file path".to_string(),
            kind: ErrorKind::MissingRequiredArgument,
            info: None,
        })),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::{temp_cwd::TempCwd, App};

    use oxgit_core::{object::Id, repo::Repo};
    use oxgit_on_disk::OnDisk;

    use serial_test::serial;

    const HELLO_SHA1: &str = "5e1c309dae7f45e0f39b1bf3ac3cd9db12e7d689";

    #[test]
    fn hash_file_without_writing() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("hello");
        fs::write(&path, "Hello World").unwrap();

        let stdout = App::run_with_args(vec!["hash-object", path.to_str().unwrap()]).unwrap();
        assert_eq!(stdout, format!("{}\n", HELLO_SHA1).as_bytes());
    }

    #[test]
    fn hash_stdin() {
        let stdout =
            App::run_with_stdin_and_args(b"Hello World".to_vec(), vec!["hash-object", "--stdin"])
                .unwrap();
        assert_eq!(stdout, format!("{}\n", HELLO_SHA1).as_bytes());
    }

    #[test]
    #[serial]
    fn hash_and_write() {
        let temp = tempfile::tempdir().unwrap();
        let r = OnDisk::init(temp.path()).unwrap();
        let _cwd = TempCwd::new(temp.path());

        App::run_with_stdin_and_args(
            b"Hello World".to_vec(),
            vec!["hash-object", "-w", "--stdin"],
        )
        .unwrap();

        let id = Id::from_hex(HELLO_SHA1).unwrap();
        assert_eq!(r.get_object(&id).unwrap().payload(), b"Hello World");
    }

    #[test]
    fn valid_commit() {
        let commit = "tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904\n\
                      author A U Thor <author@example.com> 1234567890 +0000\n\
                      committer C O Mitter <committer@example.com> 1234567890 +0000\n\
                      \n\
                      empty\n";

        App::run_with_stdin_and_args(
            commit.as_bytes().to_vec(),
            vec!["hash-object", "-t", "commit", "--stdin"],
        )
        .unwrap();
    }

    #[test]
    fn corrupt_commit_tree_and_tag() {
        for t in &["commit", "tree", "tag"] {
            let err = App::run_with_stdin_and_args(
                b"garbage".to_vec(),
                vec!["hash-object", "-t", t, "--stdin"],
            )
            .unwrap_err();
            assert!(err.to_string().contains(&format!("corrupt {}", t)));
        }
    }

    #[test]
    fn error_unknown_type() {
        let err = App::run_with_stdin_and_args(
            b"x".to_vec(),
            vec!["hash-object", "-t", "bogus", "--stdin"],
        )
        .unwrap_err();
        assert!(err.to_string().contains("-t must be one of"));
    }

    #[test]
    fn error_both_stdin_and_file() {
        let err = App::run_with_args(vec!["hash-object", "--stdin", "foo"]).unwrap_err();
        assert!(err.to_string().contains("either --stdin or a file path"));

        let err = App::run_with_args(vec!["hash-object"]).unwrap_err();
        assert!(err.to_string().contains("either --stdin or a file path"));
    }
}
