use std::io::Write;

use super::find_repo;
use crate::{App, Result};

use clap::{Arg, ArgMatches, SubCommand};

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("ls-files")
        .about("Show the files in the index")
        .arg(
            Arg::with_name("stage")
                .short("s")
                .long("stage")
                .help("Show mode, object ID, and stage number as well"),
        )
}

pub(crate) fn run(app: &mut App, args: &ArgMatches) -> Result<()> {
    let repo = find_repo::from_current_dir()?;
    let index = repo.read_index()?;

    for entry in index.entries() {
        if args.is_present("stage") {
            writeln!(app, "{} {} 0\t{}", entry.mode, entry.id, entry.path)?;
        } else {
            writeln!(app, "{}", entry.path)?;
        }
    }

    Ok(())
}
