use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;

use oxgit_core::commit_graph::{flatten_tree, TreeFile};
use oxgit_core::index::{Index, IndexEntry};
use oxgit_core::object::{Id, Kind, Object};
use oxgit_core::repo::{Error, Repo, Result};

use super::{replace_file, OnDisk};
use crate::worktree::{index_entry, normalize, read_work_file, to_slash, WorkTree};

impl OnDisk {
    /// Read the staging area. A repository without an index file has an
    /// empty one.
    pub fn read_index(&self) -> Result<Index> {
        match fs::read(self.index_path()) {
            Ok(data) => Index::parse(&data),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Index::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn write_index(&self, index: &Index) -> Result<()> {
        replace_file(&self.index_path(), &index.serialize())?;
        debug!("wrote index with {} entries", index.len());
        Ok(())
    }

    /// Convert `path` (absolute, or relative to the work dir) to the
    /// `/`-separated form stored in the index.
    ///
    /// Fails with [`Error::PathOutsideWorkDir`] for paths that leave the
    /// work dir or point into `.git`.
    pub fn repo_path(&self, path: &Path) -> Result<String> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        };

        let outside = || Error::PathOutsideWorkDir(path.to_path_buf());

        let normalized = normalize(&absolute);
        let relative = normalized
            .strip_prefix(normalize(&self.work_dir))
            .map_err(|_| outside())?;

        if relative.to_str().is_none() {
            return Err(Error::NonUtf8Path(path.to_path_buf()));
        }

        let name = to_slash(relative);
        if name.is_empty() || name == ".git" || name.starts_with(".git/") {
            return Err(outside());
        }
        Ok(name)
    }

    /// Stage one file. See [`OnDisk::stage_files`].
    pub fn stage_file(&self, path: &Path) -> Result<Vec<IndexEntry>> {
        self.stage_files(&[path.to_path_buf()])
    }

    /// Store the current content of each path as a blob and record it in the
    /// index, with stat data taken from the file.
    ///
    /// A directory (the work dir itself included) stages every non-ignored
    /// file below it and drops rows below it whose files are gone. A path
    /// that no longer exists but is staged is removed from the index.
    /// Returns the rows that were added or updated.
    pub fn stage_files(&self, paths: &[PathBuf]) -> Result<Vec<IndexEntry>> {
        let mut index = self.read_index()?;
        let mut staged = Vec::new();
        let mut work_tree: Option<WorkTree> = None;

        for path in paths {
            let name = if self.is_work_dir(path) {
                String::new()
            } else {
                self.repo_path(path)?
            };
            let full = self.work_dir.join(&name);

            let metadata = match fs::symlink_metadata(&full) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    let prefix = format!("{}/", name);
                    let before = index.len();
                    index.retain(|row| row.path != name && !row.path.starts_with(&prefix));
                    if index.len() == before {
                        return Err(e.into());
                    }
                    debug!("unstaged deleted {}", name);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if metadata.is_dir() {
                if work_tree.is_none() {
                    work_tree = Some(WorkTree::new(&self.work_dir)?);
                }
                let prefix = dir_prefix(&name);
                if let Some(tree) = &work_tree {
                    for file in tree.walk()? {
                        if file.path.starts_with(&prefix) {
                            let entry = self.stage_one(file.path, &file.metadata)?;
                            staged.push(entry);
                        }
                    }
                }

                // Tracked files are restaged even when ignore rules match them.
                let tracked: Vec<String> = index
                    .entries()
                    .map(|row| row.path.clone())
                    .filter(|p| p.starts_with(&prefix) && !staged.iter().any(|e| e.path == *p))
                    .collect();
                for path in tracked {
                    match fs::symlink_metadata(self.work_dir.join(&path)) {
                        Ok(metadata) if !metadata.is_dir() => {
                            staged.push(self.stage_one(path, &metadata)?);
                        }
                        _ => (),
                    }
                }

                // Rows below the directory whose files are gone.
                let work_dir = &self.work_dir;
                index.retain(|row| {
                    !row.path.starts_with(&prefix)
                        || fs::symlink_metadata(work_dir.join(&row.path)).is_ok()
                });
                continue;
            }

            staged.push(self.stage_one(name, &metadata)?);
        }

        for entry in &staged {
            index.upsert(entry.clone());
        }
        self.write_index(&index)?;

        Ok(staged)
    }

    fn is_work_dir(&self, path: &Path) -> bool {
        normalize(&self.work_dir.join(path)) == normalize(&self.work_dir)
    }

    fn stage_one(&self, name: String, metadata: &fs::Metadata) -> Result<IndexEntry> {
        let content = read_work_file(&self.work_dir.join(&name), metadata)?;
        let blob = Object::blob(content);
        self.put_object(&blob)?;

        debug!("staged {} as {}", name, blob.id());
        Ok(index_entry(name, metadata, blob.id()))
    }

    /// Drop `path` from the index, leaving the working file alone. Returns
    /// false if it wasn't staged.
    pub fn unstage(&self, path: &Path) -> Result<bool> {
        let name = self.repo_path(path)?;
        let mut index = self.read_index()?;

        if index.remove(&name).is_none() {
            return Ok(false);
        }
        self.write_index(&index)?;
        Ok(true)
    }

    /// Make index rows match the files of `tree` (`None` for the empty tree).
    ///
    /// With `paths`, only rows at or below those repo paths change and the
    /// rest of the index is kept; otherwise the whole index is replaced.
    /// Stat data is copied from the working file when its content already
    /// matches the tree; other rows get zero timestamps, so the next status
    /// check hashes them.
    pub fn reset_index_to_tree(&self, tree: Option<&Id>, paths: Option<&[String]>) -> Result<Index> {
        let files = match tree {
            Some(tree) => flatten_tree(self, tree)?,
            None => Vec::new(),
        };

        let selected = |path: &str| match paths {
            None => true,
            Some(paths) => paths.iter().any(|p| {
                path == p
                    || (path.starts_with(p.as_str()) && path[p.len()..].starts_with('/'))
            }),
        };

        let mut index = match paths {
            None => Index::new(),
            Some(_) => self.read_index()?,
        };
        index.retain(|e| !selected(e.path.as_str()));

        for file in files.into_iter().filter(|f| selected(f.path.as_str())) {
            index.upsert(self.row_for_tree_file(file)?);
        }

        self.write_index(&index)?;
        Ok(index)
    }

    fn row_for_tree_file(&self, file: TreeFile) -> Result<IndexEntry> {
        let full = self.work_dir.join(&file.path);

        if let Ok(metadata) = fs::symlink_metadata(&full) {
            if !metadata.is_dir() {
                let content = read_work_file(&full, &metadata)?;
                if Id::for_object(Kind::Blob, &content) == file.id {
                    let mut entry = index_entry(file.path, &metadata, file.id);
                    entry.mode = file.mode;
                    return Ok(entry);
                }
            }
        }

        Ok(IndexEntry::new(file.path, file.mode, file.id))
    }
}

fn dir_prefix(name: &str) -> String {
    if name.is_empty() {
        String::new()
    } else {
        format!("{}/", name)
    }
}
