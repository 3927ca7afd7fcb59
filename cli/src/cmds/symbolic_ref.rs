use std::io::Write;

use super::{find_repo, usage_error};
use crate::{App, Result};

use clap::{Arg, ArgMatches, SubCommand};
use oxgit_core::repo::{check_ref_name, RefStore};

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("symbolic-ref")
        .about("Read or modify the ref HEAD points to")
        .arg(
            Arg::with_name("name")
                .required(true)
                .help("The symbolic ref (only HEAD is supported)"),
        )
        .arg(Arg::with_name("ref").help("The ref HEAD should point to"))
}

pub(crate) fn run(app: &mut App, args: &ArgMatches) -> Result<()> {
    let name = args.value_of("name").unwrap_or_default();
    if name != "HEAD" {
        return Err(usage_error(format!(
            "symbolic ref {} is not supported; only HEAD is",
            name
        )));
    }

    let repo = find_repo::from_current_dir()?;

    match args.value_of("ref") {
        Some(target) => {
            check_ref_name(target)?;
            repo.update_current_ref(target)?;
        }
        None => writeln!(app, "{}", repo.current_ref()?)?,
    }

    Ok(())
}
