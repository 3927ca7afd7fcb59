//! Commit history: resolving parent chains, walking history, and creating
//! new commits from the staging area.

use std::collections::{BinaryHeap, HashMap, HashSet};
use std::rc::Rc;

use log::debug;

use crate::index::Index;
use crate::object::{build_commit, Attribution, Commit, Id, Object};
use crate::path::FileMode;
use crate::repo::{Error, RefStore, Repo, Result};
use crate::tree_builder::write_tree_from_index;

/// A commit with its ancestors resolved.
///
/// Shared history (e.g. below a merge) is represented by a single node
/// referenced from several children.
#[derive(Debug)]
pub struct CommitNode {
    pub commit: Commit,

    /// In the commit's parent order.
    pub parents: Vec<Rc<CommitNode>>,
}

/// Load and parse a commit.
pub fn find_commit<R: Repo + ?Sized>(repo: &R, id: &Id) -> Result<Commit> {
    Commit::from_object(&repo.get_object(id)?)
}

/// Resolve a commit and, transitively, every ancestor.
///
/// A parent missing from the repository is an error
/// ([`Error::ObjectNotFound`]); history is never silently truncated.
pub fn find_commit_and_ancestors<R: Repo + ?Sized>(repo: &R, id: &Id) -> Result<Rc<CommitNode>> {
    let mut done: HashMap<Id, Rc<CommitNode>> = HashMap::new();
    let mut loaded: HashMap<Id, Commit> = HashMap::new();
    let mut stack = vec![*id];

    while let Some(current) = stack.last().copied() {
        if done.contains_key(&current) {
            stack.pop();
            continue;
        }

        if !loaded.contains_key(&current) {
            loaded.insert(current, find_commit(repo, &current)?);
        }

        let unresolved: Vec<Id> = loaded[&current]
            .parents
            .iter()
            .filter(|p| !done.contains_key(p))
            .copied()
            .collect();

        if unresolved.is_empty() {
            stack.pop();
            if let Some(commit) = loaded.remove(&current) {
                let parents = commit.parents.iter().map(|p| done[p].clone()).collect();
                done.insert(current, Rc::new(CommitNode { commit, parents }));
            }
        } else {
            stack.extend(unresolved);
        }
    }

    done.remove(id).ok_or(Error::ObjectNotFound(*id))
}

/// Iterator over history, newest first. See [`walk`].
pub struct Walk<'r, R: ?Sized> {
    repo: &'r R,
    queue: BinaryHeap<(i64, Id)>,
    pending: HashMap<Id, Commit>,
    seen: HashSet<Id>,
    failed: Option<Error>,
}

/// Walk the history reachable from `starts`.
///
/// Commits come out ordered by committer timestamp, newest first, with ties
/// broken by ID; each commit is yielded once even if reachable by several
/// paths. After the first error the iterator yields that error and stops.
pub fn walk<'r, R: Repo + ?Sized>(repo: &'r R, starts: &[Id]) -> Walk<'r, R> {
    let mut w = Walk {
        repo,
        queue: BinaryHeap::new(),
        pending: HashMap::new(),
        seen: HashSet::new(),
        failed: None,
    };

    for id in starts {
        w.enqueue(*id);
    }
    w
}

impl<'r, R: Repo + ?Sized> Walk<'r, R> {
    fn enqueue(&mut self, id: Id) {
        if self.failed.is_some() || !self.seen.insert(id) {
            return;
        }

        match find_commit(self.repo, &id) {
            Ok(commit) => {
                self.queue.push((commit.committer.timestamp(), id));
                self.pending.insert(id, commit);
            }
            Err(e) => self.failed = Some(e),
        }
    }
}

impl<'r, R: Repo + ?Sized> Iterator for Walk<'r, R> {
    type Item = Result<Commit>;

    fn next(&mut self) -> Option<Result<Commit>> {
        if let Some(e) = self.failed.take() {
            self.queue.clear();
            self.pending.clear();
            return Some(Err(e));
        }

        let (_, id) = self.queue.pop()?;
        let commit = self.pending.remove(&id)?;

        for parent in &commit.parents {
            self.enqueue(*parent);
        }

        Some(Ok(commit))
    }
}

/// The commit `HEAD` resolves to, or `None` on an unborn branch.
pub fn resolve_head<R: Repo + RefStore + ?Sized>(repo: &R) -> Result<Option<Commit>> {
    match repo.head_id()? {
        Some(id) => Ok(Some(find_commit(repo, &id)?)),
        None => Ok(None),
    }
}

/// The tree of the commit `HEAD` resolves to, or `None` on an unborn branch.
pub fn current_tree<R: Repo + RefStore + ?Sized>(repo: &R) -> Result<Option<Object>> {
    match resolve_head(repo)? {
        Some(commit) => Ok(Some(repo.get_object(&commit.tree)?)),
        None => Ok(None),
    }
}

/// A non-tree entry found by [`flatten_tree`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TreeFile {
    /// Relative to the tree's root, with `/` separators.
    pub path: String,
    pub mode: FileMode,
    pub id: Id,
}

/// List every file (blob, symlink, or submodule) below a tree, sorted by path.
pub fn flatten_tree<R: Repo + ?Sized>(repo: &R, tree: &Id) -> Result<Vec<TreeFile>> {
    let mut files = Vec::new();
    let mut stack = vec![(String::new(), *tree)];

    while let Some((prefix, id)) = stack.pop() {
        let object = repo.get_object(&id)?;
        let entries = object.tree_entries().ok_or_else(|| {
            Error::MalformedTree(format!("{} is a {}, not a tree", id, object.kind()))
        })?;

        for entry in entries {
            let path = if prefix.is_empty() {
                entry.name.clone()
            } else {
                format!("{}/{}", prefix, entry.name)
            };

            match entry.mode {
                FileMode::Tree => stack.push((path, entry.id)),
                mode => files.push(TreeFile {
                    path,
                    mode,
                    id: entry.id,
                }),
            }
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Commit the staging area on the current branch.
///
/// Trees are written first, then the commit, then the branch ref is moved,
/// each step finishing before the next begins. The current branch tip, if
/// there is one, becomes the only parent.
pub fn create_commit<R>(
    repo: &R,
    index: &Index,
    author: &Attribution,
    committer: &Attribution,
    message: &str,
) -> Result<Commit>
where
    R: Repo + RefStore + Sync + ?Sized,
{
    let tree = write_tree_from_index(repo, index)?;

    let branch = repo.current_ref()?;
    let parents: Vec<Id> = repo.read_ref(&branch)?.into_iter().collect();

    let object = build_commit(tree, &parents, author, committer, message);
    repo.put_object(&object)?;
    repo.update_ref(&branch, &object.id())?;

    debug!("committed {} on {}", object.id(), branch);

    Commit::parse(object.id(), object.payload())
}
