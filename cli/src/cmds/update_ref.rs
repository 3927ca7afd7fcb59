use super::{find_repo, rev, usage_error};
use crate::{App, Result};

use clap::{Arg, ArgMatches, SubCommand};
use oxgit_core::repo::RefStore;

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("update-ref")
        .about("Update the object name stored in a ref safely")
        .arg(
            Arg::with_name("d")
                .short("d")
                .help("Delete the named ref"),
        )
        .arg(
            Arg::with_name("ref")
                .required(true)
                .help("The ref to update (`HEAD` means the current branch)"),
        )
        .arg(Arg::with_name("newvalue").help("The object the ref should point to"))
}

pub(crate) fn run(_app: &mut App, args: &ArgMatches) -> Result<()> {
    let repo = find_repo::from_current_dir()?;

    let name = match args.value_of("ref").unwrap_or_default() {
        "HEAD" => repo.current_ref()?,
        name => name.to_string(),
    };

    if args.is_present("d") {
        repo.delete_ref(&name)?;
        return Ok(());
    }

    let value = args
        .value_of("newvalue")
        .ok_or_else(|| usage_error("update-ref needs a new value unless -d is given"))?;

    let id = rev::resolve_existing(&repo, value)?;
    repo.update_ref(&name, &id)?;

    Ok(())
}
