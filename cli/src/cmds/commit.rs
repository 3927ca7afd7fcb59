use std::{
    env,
    io::Write,
    time::{SystemTime, UNIX_EPOCH},
};

use super::{find_repo, usage_error};
use crate::{App, Result};

use clap::{Arg, ArgMatches, SubCommand};
use oxgit_core::{
    object::Attribution,
    repo::{branch_name, RefStore},
};

const DEFAULT_NAME: &str = "oxgit";
const DEFAULT_EMAIL: &str = "oxgit@localhost";

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("commit")
        .about("Record the index as a new commit on the current branch")
        .arg(
            Arg::with_name("message")
                .short("m")
                .long("message")
                .value_name("msg")
                .required(true)
                .help("The commit message"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .long("quiet")
                .help("Suppress the commit summary"),
        )
}

pub(crate) fn run(app: &mut App, args: &ArgMatches) -> Result<()> {
    let message = args.value_of("message").unwrap_or_default();
    if message.trim().is_empty() {
        return Err(usage_error("aborting commit due to empty commit message"));
    }

    let repo = find_repo::from_current_dir()?;

    let author = identity("AUTHOR")?;
    let committer = identity("COMMITTER")?;
    let commit = repo.commit(&author, &committer, message)?;
    if args.is_present("quiet") {
        return Ok(());
    }

    let branch = repo.current_ref()?;
    let root = if commit.parents.is_empty() {
        " (root-commit)"
    } else {
        ""
    };
    let id = commit.id.to_string();
    let subject = commit.message.lines().next().unwrap_or_default();

    writeln!(
        app,
        "[{}{} {}] {}",
        branch_name(&branch),
        root,
        &id[..7],
        subject
    )?;

    Ok(())
}

/// Build an attribution from `GIT_<role>_NAME`, `GIT_<role>_EMAIL`, and
/// `GIT_<role>_DATE` (`<unix seconds> <+/-HHMM>`).
fn identity(role: &str) -> Result<Attribution> {
    let var = |field: &str| env::var(format!("GIT_{}_{}", role, field)).ok();

    let name = var("NAME").unwrap_or_else(|| DEFAULT_NAME.to_string());
    let email = var("EMAIL").unwrap_or_else(|| DEFAULT_EMAIL.to_string());

    let (timestamp, tz_offset) = match var("DATE") {
        Some(date) => parse_date(&date)
            .ok_or_else(|| usage_error(format!("invalid date format: {}", date)))?,
        None => (now()?, 0),
    };

    Ok(Attribution::new(&name, &email, timestamp, tz_offset))
}

fn parse_date(date: &str) -> Option<(i64, i16)> {
    let mut parts = date.split_whitespace();
    let timestamp = parts.next()?.parse::<i64>().ok()?;

    let tz_offset = match parts.next() {
        Some(tz) => parse_tz(tz)?,
        None => 0,
    };

    if parts.next().is_some() {
        return None;
    }
    Some((timestamp, tz_offset))
}

fn parse_tz(tz: &str) -> Option<i16> {
    let (sign, digits) = match tz.as_bytes().first()? {
        b'+' => (1, &tz[1..]),
        b'-' => (-1, &tz[1..]),
        _ => return None,
    };

    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i16 = digits[..2].parse().ok()?;
    let minutes: i16 = digits[2..].parse().ok()?;
    Some(sign * (hours * 60 + minutes))
}

fn now() -> Result<i64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64)
}
