//! Compare `HEAD`, the index, and the working tree.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;

use log::debug;

use oxgit_core::commit_graph::{current_tree, flatten_tree};
use oxgit_core::object::{Id, Kind};
use oxgit_core::path::FileMode;
use oxgit_core::repo::Result;

use crate::worktree::{index_entry, read_work_file, stat_matches, WorkTree};
use crate::OnDisk;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Change {
    Added,
    Modified,
    Deleted,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Change::Added => "new file",
            Change::Modified => "modified",
            Change::Deleted => "deleted",
        })
    }
}

/// Differences between the three states of a repository, keyed by path.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Status {
    /// Index compared with the `HEAD` tree.
    pub staged: BTreeMap<String, Change>,

    /// Working tree compared with the index. Never `Added`; new files are
    /// listed in `untracked`.
    pub unstaged: BTreeMap<String, Change>,

    pub untracked: Vec<String>,
}

impl Status {
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.unstaged.is_empty() && self.untracked.is_empty()
    }
}

impl OnDisk {
    /// Analogous to [`git status`](https://git-scm.com/docs/git-status).
    ///
    /// A working file whose size, `mtime`, and `ctime` all match its index
    /// row is assumed unchanged. Otherwise it is hashed again and reported
    /// only if its blob ID or mode differs from the index.
    pub fn status(&self) -> Result<Status> {
        let mut status = Status::default();

        let head: HashMap<String, (FileMode, Id)> = match current_tree(self)? {
            Some(tree) => flatten_tree(self, &tree.id())?
                .into_iter()
                .map(|f| (f.path, (f.mode, f.id)))
                .collect(),
            None => HashMap::new(),
        };

        let index = self.read_index()?;

        for entry in index.entries() {
            match head.get(&entry.path) {
                None => {
                    status.staged.insert(entry.path.clone(), Change::Added);
                }
                Some(&(mode, id)) if mode != entry.mode || id != entry.id => {
                    status.staged.insert(entry.path.clone(), Change::Modified);
                }
                Some(_) => (),
            }
        }
        for path in head.keys() {
            if index.get(path).is_none() {
                status.staged.insert(path.clone(), Change::Deleted);
            }
        }

        let work_dir = self.work_dir();
        let mut rehashed = 0;
        for entry in index.entries() {
            // Tracked files stay tracked even when ignore rules match them.
            let path = work_dir.join(&entry.path);
            // A parent replaced by a file fails with ENOTDIR, not NotFound.
            let metadata = match fs::symlink_metadata(&path) {
                Ok(metadata) if !metadata.is_dir() => metadata,
                Err(e) if path.exists() => return Err(e.into()),
                _ => {
                    status.unstaged.insert(entry.path.clone(), Change::Deleted);
                    continue;
                }
            };

            if stat_matches(entry, &metadata) {
                continue;
            }

            rehashed += 1;
            let content = read_work_file(&path, &metadata)?;
            let id = Id::for_object(Kind::Blob, &content);
            let mode = index_entry(String::new(), &metadata, id).mode;

            if id != entry.id || mode != entry.mode {
                status.unstaged.insert(entry.path.clone(), Change::Modified);
            }
        }

        status.untracked = WorkTree::new(work_dir)?
            .walk()?
            .into_iter()
            .map(|f| f.path)
            .filter(|path| index.get(path).is_none())
            .collect();

        debug!(
            "status: {} staged, {} unstaged, {} untracked ({} files rehashed)",
            status.staged.len(),
            status.unstaged.len(),
            status.untracked.len(),
            rehashed
        );

        Ok(status)
    }
}
