//! Turns the flat list of staged files into a hierarchy of tree objects.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::thread;

use log::debug;

use crate::index::{Index, IndexEntry};
use crate::object::tree::split_path;
use crate::object::{Id, Object, TreeEntry};
use crate::path::FileMode;
use crate::repo::{Repo, Result};

/// Key of the top-level directory in the map returned by [`build_trees`].
pub const ROOT: &str = ".";

const WRITERS: usize = 8;

/// Build one tree object for every directory that contains a staged file,
/// directly or below it.
///
/// Directories are built deepest-first (reverse path order) so that each
/// parent can refer to its already-built subtrees; the root is built last.
/// The result is keyed by directory path, with the root under [`ROOT`].
/// An empty row set yields just the empty root tree.
pub fn build_trees<'a, I>(rows: I) -> BTreeMap<String, Object>
where
    I: IntoIterator<Item = &'a IndexEntry>,
{
    let mut pending: HashMap<String, Vec<TreeEntry>> = HashMap::new();
    let mut dirs: BTreeSet<String> = BTreeSet::new();

    for row in rows {
        let (dir, name) = split_path(&row.path);
        pending
            .entry(dir.to_string())
            .or_default()
            .push(TreeEntry::new(row.mode, name, row.id));

        let mut dir = dir;
        while dir != ROOT && dirs.insert(dir.to_string()) {
            dir = split_path(dir).0;
        }
    }

    let mut trees = BTreeMap::new();

    for dir in dirs.iter().rev().map(String::as_str).chain(Some(ROOT)) {
        let tree = Object::tree(pending.remove(dir).unwrap_or_default());

        if dir != ROOT {
            let (parent, name) = split_path(dir);
            pending
                .entry(parent.to_string())
                .or_default()
                .push(TreeEntry::new(FileMode::Tree, name, tree.id()));
        }

        trees.insert(dir.to_string(), tree);
    }

    trees
}

/// Write every tree to `repo`, spreading the work over a few threads.
///
/// Trees are independent content-addressed objects, so they may land in
/// any order. Returns once all writes have finished.
pub fn write_trees<R>(repo: &R, trees: &BTreeMap<String, Object>) -> Result<()>
where
    R: Repo + Sync + ?Sized,
{
    let objects: Vec<&Object> = trees.values().collect();
    if objects.is_empty() {
        return Ok(());
    }

    let chunk = (objects.len() + WRITERS - 1) / WRITERS;
    debug!(
        "writing {} trees in {} batches",
        objects.len(),
        (objects.len() + chunk - 1) / chunk
    );

    thread::scope(|s| {
        let handles: Vec<_> = objects
            .chunks(chunk)
            .map(|batch| s.spawn(move || batch.iter().try_for_each(|o| repo.put_object(o))))
            .collect();

        handles.into_iter().try_for_each(|h| match h.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        })
    })
}

/// Build and write the trees for every row in `index`; returns the root tree ID.
pub fn write_tree_from_index<R>(repo: &R, index: &Index) -> Result<Id>
where
    R: Repo + Sync + ?Sized,
{
    let trees = build_trees(index.entries());
    write_trees(repo, &trees)?;

    // build_trees always produces a root.
    Ok(trees
        .get(ROOT)
        .map(Object::id)
        .unwrap_or_else(|| Object::tree(Vec::new()).id()))
}
