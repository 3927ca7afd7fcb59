#![deny(warnings)]

use std::{
    env,
    io::{Read, Write},
};

#[cfg(test)]
use std::ffi::OsString;

use crate::{cmds, Result};

use clap::{crate_version, AppSettings, Arg, ArgMatches};

pub(crate) fn clap_app<'a, 'b>() -> clap::App<'a, 'b> {
    let app = clap::App::new("oxgit")
        .version(crate_version!())
        .about("Reads and writes git repositories")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .setting(AppSettings::VersionlessSubcommands)
        .arg(
            Arg::with_name("C")
                .short("C")
                .value_name("path")
                .number_of_values(1)
                .help("Run as if oxgit was started in <path>"),
        );

    cmds::add_subcommands(app)
}

pub(crate) struct App<'a> {
    pub arg_matches: ArgMatches<'a>,
    pub stdin: &'a mut dyn Read,
    pub stdout: &'a mut dyn Write,
}

impl<'a> App<'a> {
    pub fn run(&mut self) -> Result<()> {
        if let Some(dir) = self.arg_matches.value_of_os("C") {
            env::set_current_dir(dir)
                .map_err(|err| format!("cannot change to '{}': {}", dir.to_string_lossy(), err))?;
        }

        cmds::dispatch(self)
    }

    #[cfg(test)]
    pub fn run_with_stdin_and_args<I, T>(stdin: Vec<u8>, args: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut args: Vec<OsString> = args.into_iter().map(|x| x.into()).collect();
        args.insert(0, OsString::from("oxgit"));

        let mut stdin = std::io::Cursor::new(stdin);
        let mut stdout = Vec::new();

        App {
            arg_matches: clap_app().get_matches_from_safe(args)?,
            stdin: &mut stdin,
            stdout: &mut stdout,
        }
        .run()?;

        Ok(stdout)
    }

    #[cfg(test)]
    pub fn run_with_args<I, T>(args: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let stdin: Vec<u8> = Vec::new();
        App::run_with_stdin_and_args(stdin, args)
    }
}

impl<'a> Write for App<'a> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.stdout.write(buf)
    }

    #[cfg(not(tarpaulin_include))]
    fn flush(&mut self) -> std::io::Result<()> {
        self.stdout.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs};

    use crate::temp_cwd::TempCwd;

    use assert_cmd::Command;
    use oxgit_on_disk::OnDisk;
    use predicates::prelude::*;
    use serial_test::serial;

    #[test]
    fn no_subcommand_prints_help() {
        let mut cmd = Command::cargo_bin("oxgit").unwrap();
        cmd.assert()
            .failure()
            .stdout("")
            .stderr(predicate::str::starts_with("oxgit 0."))
            .stderr(predicate::str::contains("USAGE:"));
    }

    #[test]
    fn unknown_subcommand() {
        let err = super::App::run_with_args(vec!["frobnicate"]).unwrap_err();
        assert!(err.to_string().contains("frobnicate"));
    }

    #[test]
    fn errors_are_reported_on_stderr() {
        let temp = tempfile::tempdir().unwrap();

        let mut cmd = Command::cargo_bin("oxgit").unwrap();
        cmd.current_dir(temp.path())
            .arg("status")
            .assert()
            .failure()
            .code(1)
            .stdout("")
            .stderr(predicate::str::starts_with("ERROR: not a git repository"));
    }

    #[test]
    #[serial]
    fn run_in_other_directory() {
        let repo_dir = tempfile::tempdir().unwrap();
        OnDisk::init(repo_dir.path()).unwrap();
        fs::write(repo_dir.path().join("a.txt"), "a").unwrap();

        let elsewhere = tempfile::tempdir().unwrap();
        let _cwd = TempCwd::new(elsewhere.path());
        let start = env::current_dir().unwrap();

        let repo_arg = repo_dir.path().to_str().unwrap();
        super::App::run_with_args(vec!["-C", repo_arg, "add", "a.txt"]).unwrap();
        let stdout = super::App::run_with_args(vec!["-C", repo_arg, "ls-files"]).unwrap();
        assert_eq!(stdout, b"a.txt\n");

        env::set_current_dir(&start).unwrap();
        let err = super::App::run_with_args(vec!["-C", "no-such-dir", "status"]).unwrap_err();
        assert!(err.to_string().starts_with("cannot change to 'no-such-dir'"));
    }

    #[test]
    fn version() {
        let mut cmd = Command::cargo_bin("oxgit").unwrap();
        cmd.arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::starts_with("oxgit 0."))
            .stderr("");
    }
}
