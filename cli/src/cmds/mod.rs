use std::{env, path::PathBuf};

use crate::{App, Result};

use clap::{ArgMatches, Error, ErrorKind};

mod find_repo;
mod rev;

mod add;
mod branch;
mod cat_file;
mod checkout;
mod commit;
mod hash_object;
mod init;
mod log;
mod ls_files;
mod reset;
mod rm;
mod status;
mod symbolic_ref;
mod update_ref;
mod verify_pack;

pub(crate) fn add_subcommands<'a, 'b>(app: clap::App<'a, 'b>) -> clap::App<'a, 'b> {
    app.subcommand(add::subcommand())
        .subcommand(branch::subcommand())
        .subcommand(cat_file::subcommand())
        .subcommand(checkout::subcommand())
        .subcommand(commit::subcommand())
        .subcommand(hash_object::subcommand())
        .subcommand(init::subcommand())
        .subcommand(log::subcommand())
        .subcommand(ls_files::subcommand())
        .subcommand(reset::subcommand())
        .subcommand(rm::subcommand())
        .subcommand(status::subcommand())
        .subcommand(symbolic_ref::subcommand())
        .subcommand(update_ref::subcommand())
        .subcommand(verify_pack::subcommand())
}

pub(crate) fn dispatch(app: &mut App) -> Result<()> {
    let matches = app.arg_matches.clone();
    // ^^ Ugh. Need an independent copy of matches so we can still pass
    // the App struct through to subcommand imps.

    match matches.subcommand() {
        ("add", Some(m)) => add::run(app, &m),
        ("branch", Some(m)) => branch::run(app, &m),
        ("cat-file", Some(m)) => cat_file::run(app, &m),
        ("checkout", Some(m)) => checkout::run(app, &m),
        ("commit", Some(m)) => commit::run(app, &m),
        ("hash-object", Some(m)) => hash_object::run(app, &m),
        ("init", Some(m)) => init::run(app, &m),
        ("log", Some(m)) => log::run(app, &m),
        ("ls-files", Some(m)) => ls_files::run(app, &m),
        ("reset", Some(m)) => reset::run(app, &m),
        ("rm", Some(m)) => rm::run(app, &m),
        ("status", Some(m)) => status::run(app, &m),
        ("symbolic-ref", Some(m)) => symbolic_ref::run(app, &m),
        ("update-ref", Some(m)) => update_ref::run(app, &m),
        ("verify-pack", Some(m)) => verify_pack::run(app, &m),
        _ => unreachable!(),
        // unreachable: Should have exited out with appropriate help or
        // error message if no subcommand was given.
    }
}

/// An error about how a command was invoked rather than about the repository.
pub(crate) fn usage_error<S: Into<String>>(message: S) -> Box<dyn std::error::Error> {
    Box::new(Error {
        message: message.into(),
        kind: ErrorKind::InvalidValue,
        info: None,
    })
}

/// The values of a path argument, made absolute against the current directory.
pub(crate) fn paths_from_args(args: &ArgMatches, name: &str) -> Result<Vec<PathBuf>> {
    let cwd = env::current_dir()?;
    Ok(args
        .values_of_os(name)
        .map(|values| values.map(|v| cwd.join(v)).collect())
        .unwrap_or_default())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::{Path, PathBuf};

    use oxgit_core::object::Attribution;
    use oxgit_on_disk::OnDisk;

    pub fn person(ts: i64) -> Attribution {
        Attribution::new("A U Thor", "author@example.com", ts, 0)
    }

    /// A fresh repo with `files` written and committed as a single commit.
    pub fn committed_repo(files: &[(&str, &str)]) -> (tempfile::TempDir, OnDisk) {
        let temp = tempfile::tempdir().unwrap();
        let r = OnDisk::init(temp.path()).unwrap();
        write_files(temp.path(), files);

        let paths: Vec<PathBuf> = files.iter().map(|(p, _)| PathBuf::from(*p)).collect();
        r.stage_files(&paths).unwrap();
        r.commit(&person(1_000), &person(1_000), "first").unwrap();

        (temp, r)
    }

    pub fn write_files(root: &Path, files: &[(&str, &str)]) {
        for (path, content) in files {
            let full = root.join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, content).unwrap();
        }
    }
}
