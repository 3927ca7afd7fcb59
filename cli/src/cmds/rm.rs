use std::io::Write;

use super::{find_repo, paths_from_args, usage_error};
use crate::{App, Result};

use clap::{Arg, ArgMatches, SubCommand};

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("rm")
        .about("Remove files from the index")
        .arg(
            Arg::with_name("cached")
                .long("cached")
                .required(true)
                .help("Only remove from the index; working files are left alone"),
        )
        .arg(
            Arg::with_name("paths")
                .required(true)
                .multiple(true)
                .help("Files to unstage"),
        )
}

pub(crate) fn run(app: &mut App, args: &ArgMatches) -> Result<()> {
    let repo = find_repo::from_current_dir()?;

    for path in paths_from_args(args, "paths")? {
        let name = repo.repo_path(&path)?;
        if !repo.unstage(&path)? {
            return Err(usage_error(format!(
                "pathspec '{}' did not match any files",
                name
            )));
        }
        writeln!(app, "rm '{}'", name)?;
    }

    Ok(())
}
