use std::{collections::HashMap, io::Write};

use super::{find_repo, usage_error};
use crate::{App, Result};

use clap::{Arg, ArgMatches, SubCommand};
use oxgit_core::{
    commit_graph::walk,
    object::{Commit, Id},
    repo::{branch_name, RefStore},
};

const REMOTE_PREFIX: &str = "refs/remotes/";

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("log")
        .about("Show commit logs, newest first")
        .arg(
            Arg::with_name("max-count")
                .short("n")
                .long("max-count")
                .value_name("number")
                .help("Limit the number of commits to show"),
        )
}

pub(crate) fn run(app: &mut App, args: &ArgMatches) -> Result<()> {
    let repo = find_repo::from_current_dir()?;

    let max_count = match args.value_of("max-count") {
        Some(n) => n
            .parse::<usize>()
            .map_err(|_| usage_error(format!("'{}': not an integer", n)))?,
        None => usize::MAX,
    };

    let current = repo.current_ref()?;
    let head = repo.read_ref(&current)?.ok_or_else(|| {
        usage_error(format!(
            "your current branch '{}' does not have any commits yet",
            branch_name(&current)
        ))
    })?;

    let decorations = decorations(&repo, &current, &head)?;

    for (n, commit) in walk(&repo, &[head]).take(max_count).enumerate() {
        let commit = commit?;
        if n > 0 {
            writeln!(app)?;
        }
        write_commit(app, &commit, decorations.get(&commit.id))?;
    }

    Ok(())
}

fn write_commit(app: &mut App, commit: &Commit, decoration: Option<&String>) -> Result<()> {
    match decoration {
        Some(names) => writeln!(app, "commit {} ({})", commit.id, names)?,
        None => writeln!(app, "commit {}", commit.id)?,
    }

    writeln!(app, "Author: {}", commit.author.name_and_email())?;
    writeln!(
        app,
        "Date:   {} {}",
        commit.author.timestamp(),
        commit.author.format_tz()
    )?;
    writeln!(app)?;

    for line in commit.message.lines() {
        writeln!(app, "    {}", line)?;
    }

    Ok(())
}

/// Branch names to show beside each commit, e.g. `HEAD -> master, topic`.
fn decorations<R: RefStore>(repo: &R, current: &str, head: &Id) -> Result<HashMap<Id, String>> {
    let mut names: HashMap<Id, Vec<String>> = HashMap::new();

    names
        .entry(*head)
        .or_default()
        .push(format!("HEAD -> {}", branch_name(current)));

    for (name, id) in repo.branch_refs(true)? {
        if name == current {
            continue;
        }
        let short = match name.strip_prefix(REMOTE_PREFIX) {
            Some(remote) => remote.to_string(),
            None => branch_name(&name).to_string(),
        };
        names.entry(id).or_default().push(short);
    }

    Ok(names
        .into_iter()
        .map(|(id, names)| (id, names.join(", ")))
        .collect())
}
