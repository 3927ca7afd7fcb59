use std::str;

use super::parse_utils::{header, split_once};
use super::{Attribution, Id, Object};
use crate::repo::{Error, Result};

/// A parsed commit object.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Commit {
    pub id: Id,
    pub tree: Id,

    /// Parent IDs in stored order; the first is the mainline parent.
    pub parents: Vec<Id>,

    pub author: Attribution,
    pub committer: Attribution,

    /// Everything after the header block, with surrounding whitespace trimmed.
    pub message: String,
}

impl Commit {
    /// Parse the payload of a commit object.
    ///
    /// Headers other than `tree`, `parent`, `author`, and `committer`
    /// (for example `encoding` or a multi-line `gpgsig`) are skipped.
    pub fn parse(id: Id, payload: &[u8]) -> Result<Commit> {
        let mut tree: Option<Id> = None;
        let mut parents: Vec<Id> = Vec::new();
        let mut author: Option<Attribution> = None;
        let mut committer: Option<Attribution> = None;

        let mut rest = payload;
        let mut message: &[u8] = &[];

        while !rest.is_empty() {
            let (line, next) = split_once(rest, &b'\n');
            rest = next;

            if line.is_empty() {
                message = rest;
                break;
            }

            if let Some(value) = header(line, b"tree") {
                if tree.is_some() || author.is_some() {
                    return Err(malformed(id, "unexpected tree line"));
                }
                tree = Some(Id::from_hex(value).map_err(|_| malformed(id, "invalid tree ID"))?);
            } else if let Some(value) = header(line, b"parent") {
                if tree.is_none() || author.is_some() {
                    return Err(malformed(id, "parent line out of order"));
                }
                parents
                    .push(Id::from_hex(value).map_err(|_| malformed(id, "invalid parent ID"))?);
            } else if let Some(value) = header(line, b"author") {
                if author.is_some() {
                    return Err(malformed(id, "duplicate author line"));
                }
                author = Some(
                    Attribution::parse(value).ok_or_else(|| malformed(id, "invalid author line"))?,
                );
            } else if let Some(value) = header(line, b"committer") {
                if committer.is_some() {
                    return Err(malformed(id, "duplicate committer line"));
                }
                committer = Some(
                    Attribution::parse(value)
                        .ok_or_else(|| malformed(id, "invalid committer line"))?,
                );
            }
        }

        let tree = tree.ok_or_else(|| malformed(id, "missing tree line"))?;
        let author = author.ok_or_else(|| malformed(id, "missing author line"))?;
        let committer = committer.ok_or_else(|| malformed(id, "missing committer line"))?;

        let message = str::from_utf8(message)
            .map_err(|_| malformed(id, "message is not valid UTF-8"))?
            .trim()
            .to_string();

        Ok(Commit {
            id,
            tree,
            parents,
            author,
            committer,
            message,
        })
    }

    /// Parse a commit from an object, failing if it is some other kind.
    pub fn from_object(object: &Object) -> Result<Commit> {
        match object.body() {
            super::Body::Commit(payload) => Commit::parse(object.id(), payload),
            _ => Err(Error::MalformedCommit(format!(
                "{} is a {}, not a commit",
                object.id(),
                object.kind()
            ))),
        }
    }
}

fn malformed(id: Id, detail: &str) -> Error {
    Error::MalformedCommit(format!("{}: {}", id, detail))
}

/// Serialize a commit and return it as an object (with its ID computed).
///
/// A trailing newline is added to `message` if it doesn't have one.
pub fn build_commit(
    tree: Id,
    parents: &[Id],
    author: &Attribution,
    committer: &Attribution,
    message: &str,
) -> Object {
    let mut payload = format!("tree {}\n", tree);
    for parent in parents {
        payload.push_str(&format!("parent {}\n", parent));
    }
    payload.push_str(&format!("author {}\n", author));
    payload.push_str(&format!("committer {}\n", committer));
    payload.push('\n');
    payload.push_str(message);
    if !message.ends_with('\n') {
        payload.push('\n');
    }

    Object::commit(payload.into_bytes())
}
