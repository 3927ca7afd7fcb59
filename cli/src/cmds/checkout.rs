use std::io::Write;

use super::find_repo;
use crate::{App, Result};

use clap::{Arg, ArgMatches, SubCommand};
use oxgit_core::repo::branch_name;

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("checkout")
        .about("Switch branches, replacing tracked files with the branch's versions")
        .arg(
            Arg::with_name("branch")
                .required(true)
                .help("The branch to switch to"),
        )
}

pub(crate) fn run(app: &mut App, args: &ArgMatches) -> Result<()> {
    let branch = args.value_of("branch").unwrap_or_default();

    let repo = find_repo::from_current_dir()?;
    repo.checkout(branch)?;

    writeln!(app, "Switched to branch '{}'", branch_name(branch))?;
    Ok(())
}
