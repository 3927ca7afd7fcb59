use std::{io::Write, path::Path};

use crate::{App, Result};

use clap::{Arg, ArgMatches, SubCommand};
use oxgit_core::pack::{Pack, PackEntry};
use oxgit_on_disk::load_pack;

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("verify-pack")
        .about("Validate packed git archive files")
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("List every object in the pack, then a histogram of delta chain lengths"),
        )
        .arg(
            Arg::with_name("pack")
                .required(true)
                .multiple(true)
                .help("The .idx or .pack file(s) to check"),
        )
}

pub(crate) fn run(app: &mut App, args: &ArgMatches) -> Result<()> {
    let verbose = args.is_present("verbose");

    for path in args.values_of_os("pack").into_iter().flatten() {
        let path = Path::new(path);

        let (index, pack) = load_pack(path)?;
        index.verify_checksum()?;
        pack.verify_checksum()?;

        if verbose {
            write_entries(app, &pack)?;
            writeln!(app, "{}: ok", path.with_extension("pack").display())?;
        }
    }

    Ok(())
}

fn write_entries(app: &mut App, pack: &Pack) -> Result<()> {
    for entry in pack.entries() {
        write!(
            app,
            "{} {:<6} {} {} {}",
            entry.id(),
            entry.kind().to_string(),
            entry.size(),
            entry.size_in_pack(),
            entry.offset()
        )?;

        if let PackEntry::Delta(delta) = entry {
            write!(app, " {} {}", delta.depth, delta.base_id)?;
        }
        writeln!(app)?;
    }

    writeln!(app, "non delta: {} objects", pack.non_delta_count())?;

    for (depth, count) in pack.chain_length_histogram() {
        let plural = if count == 1 { "" } else { "s" };
        writeln!(app, "chain length = {}: {} object{}", depth, count, plural)?;
    }

    Ok(())
}
