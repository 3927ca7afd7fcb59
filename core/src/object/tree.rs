use std::cmp::Ordering;
use std::collections::HashSet;

use super::{parse_utils, Id, Kind};
use crate::path::{FileMode, PathMode};
use crate::repo::{Error, Result};

/// One child of a tree object.
///
/// `name` is a single path segment; it never contains `/`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TreeEntry {
    pub mode: FileMode,
    pub name: String,
    pub id: Id,
}

impl TreeEntry {
    pub fn new<S: Into<String>>(mode: FileMode, name: S, id: Id) -> TreeEntry {
        TreeEntry {
            mode,
            name: name.into(),
            id,
        }
    }

    /// Returns the kind of object this entry points to.
    pub fn kind(&self) -> Kind {
        self.mode.kind()
    }

    fn path_mode(&self) -> PathMode {
        PathMode::new(self.name.as_bytes(), self.mode)
    }
}

/// Compares two entries using git's tree ordering.
pub fn cmp_entries(a: &TreeEntry, b: &TreeEntry) -> Ordering {
    a.path_mode().cmp(&b.path_mode())
}

/// Sorts entries into the order git stores them in a tree.
pub fn sort_entries(entries: &mut [TreeEntry]) {
    entries.sort_by(cmp_entries);
}

/// Encodes already-sorted entries as the body of a tree object.
///
/// Each record is `<mode-octal> <name>\0` followed by the raw 20-byte ID.
pub fn encode_entries(entries: &[TreeEntry]) -> Vec<u8> {
    let len = entries
        .iter()
        .map(|e| e.mode.tree_octal().len() + e.name.len() + 22)
        .sum();

    let mut body = Vec::with_capacity(len);
    for entry in entries {
        body.extend_from_slice(entry.mode.tree_octal());
        body.push(b' ');
        body.extend_from_slice(entry.name.as_bytes());
        body.push(0);
        body.extend_from_slice(entry.id.as_bytes());
    }
    body
}

/// Decodes the body of a tree object.
///
/// Entries are returned in stored order.
pub fn decode_entries(body: &[u8]) -> Result<Vec<TreeEntry>> {
    let mut entries = Vec::new();
    let mut names = HashSet::new();
    let mut pos = 0;

    while pos < body.len() {
        let rest = &body[pos..];

        let space = rest
            .iter()
            .position(|b| *b == b' ')
            .ok_or_else(|| malformed(pos, "missing space after mode"))?;
        let nul = space
            + 1
            + rest[space + 1..]
                .iter()
                .position(|b| *b == 0)
                .ok_or_else(|| malformed(pos, "missing NUL after name"))?;

        if rest.len() < nul + 21 {
            return Err(malformed(pos, "truncated object ID"));
        }

        let mode = FileMode::from_octal_slice(&rest[..space]).ok_or_else(|| {
            malformed(
                pos,
                &format!(
                    "unrecognized mode `{}`",
                    String::from_utf8_lossy(&rest[..space])
                ),
            )
        })?;

        let name = &rest[space + 1..nul];
        if name.is_empty() {
            return Err(malformed(pos, "empty name"));
        }
        if name.contains(&b'/') {
            return Err(malformed(pos, "name contains `/`"));
        }

        let name = String::from_utf8(name.to_vec())
            .map_err(|_| malformed(pos, "name is not valid UTF-8"))?;
        if !names.insert(name.clone()) {
            return Err(malformed(pos, &format!("duplicate name `{}`", name)));
        }

        // Length was checked above, so this cannot fail.
        let id = Id::new(&rest[nul + 1..nul + 21])?;

        entries.push(TreeEntry { mode, name, id });
        pos += nul + 21;
    }

    Ok(entries)
}

fn malformed(offset: usize, detail: &str) -> Error {
    Error::MalformedTree(format!("entry at byte {}: {}", offset, detail))
}

/// Splits a repository-relative path into its parent directory and final
/// segment. Top-level paths have the parent `.`.
pub fn split_path(path: &str) -> (&str, &str) {
    match parse_utils::rsplit_once(path.as_bytes(), &b'/') {
        // Splitting on an ASCII byte keeps both halves valid UTF-8.
        Some((dir, _)) => (&path[..dir.len()], &path[dir.len() + 1..]),
        None => (".", path),
    }
}
