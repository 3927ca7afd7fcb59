use std::{collections::BTreeSet, io::Write};

use super::find_repo;
use crate::{App, Result};

use clap::{Arg, ArgMatches, SubCommand};
use oxgit_core::repo::{branch_name, RefStore};
use oxgit_on_disk::{Change, Status};

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("status")
        .about("Show the working tree status")
        .arg(
            Arg::with_name("short")
                .short("s")
                .long("short")
                .help("Give the output in the short format"),
        )
        .arg(
            Arg::with_name("porcelain")
                .long("porcelain")
                .help("Same as --short; stable for scripts"),
        )
}

pub(crate) fn run(app: &mut App, args: &ArgMatches) -> Result<()> {
    let repo = find_repo::from_current_dir()?;
    let status = repo.status()?;

    if args.is_present("short") || args.is_present("porcelain") {
        return write_short(app, &status);
    }

    let branch = repo.current_ref()?;
    writeln!(app, "On branch {}", branch_name(&branch))?;
    if repo.head_id()?.is_none() {
        writeln!(app, "\nNo commits yet")?;
    }

    write_long(app, &status)
}

fn write_long(app: &mut App, status: &Status) -> Result<()> {
    if !status.staged.is_empty() {
        writeln!(app, "\nChanges to be committed:")?;
        for (path, change) in &status.staged {
            writeln!(app, "\t{:<12}{}", format!("{}:", change), path)?;
        }
    }

    if !status.unstaged.is_empty() {
        writeln!(app, "\nChanges not staged for commit:")?;
        for (path, change) in &status.unstaged {
            writeln!(app, "\t{:<12}{}", format!("{}:", change), path)?;
        }
    }

    if !status.untracked.is_empty() {
        writeln!(app, "\nUntracked files:")?;
        for path in &status.untracked {
            writeln!(app, "\t{}", path)?;
        }
    }

    if status.is_clean() {
        writeln!(app, "\nnothing to commit, working tree clean")?;
    } else if status.staged.is_empty() {
        writeln!(app, "\nno changes added to commit")?;
    }

    Ok(())
}

/// One `XY path` line per changed path, where X is the staged change and Y
/// the unstaged one, then `?? path` for each untracked file.
fn write_short(app: &mut App, status: &Status) -> Result<()> {
    let paths: BTreeSet<&String> = status.staged.keys().chain(status.unstaged.keys()).collect();

    for path in paths {
        writeln!(
            app,
            "{}{} {}",
            code(status.staged.get(path)),
            code(status.unstaged.get(path)),
            path
        )?;
    }

    for path in &status.untracked {
        writeln!(app, "?? {}", path)?;
    }

    Ok(())
}

fn code(change: Option<&Change>) -> char {
    match change {
        Some(Change::Added) => 'A',
        Some(Change::Modified) => 'M',
        Some(Change::Deleted) => 'D',
        None => ' ',
    }
}
