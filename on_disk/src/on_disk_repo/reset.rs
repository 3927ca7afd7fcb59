use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::debug;

use oxgit_core::commit_graph::{flatten_tree, resolve_head, TreeFile};
use oxgit_core::path::FileMode;
use oxgit_core::repo::{Error, RefStore, Repo, Result, BRANCH_PREFIX};

use super::OnDisk;

impl OnDisk {
    /// Make the index and the tracked files of the working tree match the
    /// commit `HEAD` points to.
    ///
    /// Files that were staged but aren't part of that commit are deleted.
    /// Untracked files are left alone. On an unborn branch this empties the
    /// index.
    pub fn reset_hard(&self) -> Result<()> {
        let tree = resolve_head(self)?.map(|c| c.tree);
        let files = match &tree {
            Some(tree) => flatten_tree(self, tree)?,
            None => Vec::new(),
        };

        let keep: HashSet<&str> = files.iter().map(|f| f.path.as_str()).collect();
        for entry in self.read_index()?.entries() {
            if !keep.contains(entry.path.as_str()) {
                self.remove_work_file(&entry.path)?;
            }
        }

        for file in &files {
            self.checkout_file(file)?;
        }

        self.reset_index_to_tree(tree.as_ref(), None)?;
        debug!("reset --hard to {:?}", tree);
        Ok(())
    }

    /// Point `HEAD` at an existing branch, then [`reset_hard`](OnDisk::reset_hard)
    /// to it. `branch` may be a short name or a full ref name.
    pub fn checkout(&self, branch: &str) -> Result<()> {
        let name = if branch.starts_with("refs/") {
            branch.to_string()
        } else {
            format!("{}{}", BRANCH_PREFIX, branch)
        };

        if self.read_ref(&name)?.is_none() {
            return Err(Error::RefNotFound(name));
        }

        self.update_current_ref(&name)?;
        self.reset_hard()
    }

    fn checkout_file(&self, file: &TreeFile) -> Result<()> {
        let path = self.work_dir.join(&file.path);

        if let Ok(metadata) = fs::symlink_metadata(&path) {
            if metadata.is_dir() && file.mode != FileMode::Submodule {
                fs::remove_dir_all(&path)?;
            } else if metadata.file_type().is_symlink() || file.mode == FileMode::SymbolicLink {
                fs::remove_file(&path)?;
            }
        }

        // A file or symlink standing where a parent directory belongs is replaced.
        if let Some(parent) = Path::new(&file.path).parent() {
            let mut dir = self.work_dir.clone();
            for component in parent.components() {
                dir.push(component);
                match fs::symlink_metadata(&dir) {
                    Ok(metadata) if !metadata.is_dir() => fs::remove_file(&dir)?,
                    Ok(_) => (),
                    Err(e) if e.kind() == ErrorKind::NotFound => break,
                    Err(e) => return Err(e.into()),
                }
            }
        }

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        match file.mode {
            FileMode::Submodule => fs::create_dir_all(&path)?,
            FileMode::SymbolicLink => {
                let blob = self.get_object(&file.id)?;
                make_symlink(blob.payload(), &path)?;
            }
            mode => {
                let blob = self.get_object(&file.id)?;
                fs::write(&path, blob.payload())?;
                set_executable(&path, mode == FileMode::Executable)?;
            }
        }

        Ok(())
    }

    // Also removes directories the file leaves empty.
    fn remove_work_file(&self, name: &str) -> Result<()> {
        let path = self.work_dir.join(name);
        match fs::remove_file(&path) {
            Ok(()) => debug!("removed {}", name),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        }

        let mut dir = path.parent();
        while let Some(d) = dir {
            if d == self.work_dir || fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }
        Ok(())
    }
}

#[cfg(unix)]
fn make_symlink(target: &[u8], path: &Path) -> Result<()> {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    std::os::unix::fs::symlink(OsStr::from_bytes(target), path).map_err(|e| e.into())
}

// Without symbolic links, git writes the target as a plain file.
#[cfg(not(unix))]
fn make_symlink(target: &[u8], path: &Path) -> Result<()> {
    fs::write(path, target).map_err(|e| e.into())
}

#[cfg(unix)]
fn set_executable(path: &Path, executable: bool) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = if executable { 0o755 } else { 0o644 };
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| e.into())
}

#[cfg(not(unix))]
fn set_executable(_path: &Path, _executable: bool) -> Result<()> {
    Ok(())
}
