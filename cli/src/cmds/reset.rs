use std::io::Write;

use super::{find_repo, paths_from_args, usage_error};
use crate::{App, Result};

use clap::{Arg, ArgMatches, SubCommand};
use oxgit_core::commit_graph::resolve_head;

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("reset")
        .about("Reset the index, and optionally the working tree, to HEAD")
        .arg(
            Arg::with_name("hard")
                .long("hard")
                .conflicts_with("mixed")
                .help("Also overwrite tracked files in the working tree"),
        )
        .arg(
            Arg::with_name("mixed")
                .long("mixed")
                .help("Reset only the index (the default)"),
        )
        .arg(
            Arg::with_name("paths")
                .multiple(true)
                .help("Limit the reset to these paths"),
        )
}

pub(crate) fn run(app: &mut App, args: &ArgMatches) -> Result<()> {
    let repo = find_repo::from_current_dir()?;
    let paths = paths_from_args(args, "paths")?;

    if args.is_present("hard") {
        if !paths.is_empty() {
            return Err(usage_error("Cannot do hard reset with paths."));
        }

        repo.reset_hard()?;

        if let Some(head) = resolve_head(&repo)? {
            let id = head.id.to_string();
            let subject = head.message.lines().next().unwrap_or_default();
            writeln!(app, "HEAD is now at {} {}", &id[..7], subject)?;
        }
        return Ok(());
    }

    let tree = resolve_head(&repo)?.map(|head| head.tree);

    if paths.is_empty() {
        repo.reset_index_to_tree(tree.as_ref(), None)?;
    } else {
        let names = paths
            .iter()
            .map(|p| repo.repo_path(p))
            .collect::<oxgit_core::repo::Result<Vec<String>>>()?;
        repo.reset_index_to_tree(tree.as_ref(), Some(&names))?;
    }

    Ok(())
}
