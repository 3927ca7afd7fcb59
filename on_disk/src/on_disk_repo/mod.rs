use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tempfile::NamedTempFile;

use oxgit_core::object::{Id, Object};
use oxgit_core::repo::{Error, Repo, Result};

mod commit;
mod loose;
mod packs;
pub use packs::load_pack;
mod refs;
mod reset;
mod staging;

/// Implementation of `oxgit_core::repo::Repo` that stores content on the local
/// file system.
///
/// _IMPORTANT NOTE:_ This is intended as a reference implementation largely
/// for testing purposes and may not necessarily handle all of the edge cases that
/// the traditional `git` command-line interface will handle.
///
/// That said, it does intentionally use the same `.git` folder format as command-line
/// `git` so that results may be compared for similar operations.
#[derive(Debug)]
pub struct OnDisk {
    work_dir: PathBuf,
    git_dir: PathBuf,
    packs: Mutex<packs::PackCache>,
}

impl OnDisk {
    /// Open an on-disk git repository.
    ///
    /// `work_dir` should be the top-level working directory. A `.git` directory should
    /// exist at this path. Use [`OnDisk::discover`] to search parent directories, or
    /// [`OnDisk::init`] to create an empty repository.
    pub fn new(work_dir: &Path) -> Result<Self> {
        let work_dir = absolute(work_dir)?;
        if !work_dir.exists() {
            return Err(Error::WorkDirDoesntExist(work_dir));
        }

        let git_dir = work_dir.join(".git");
        if !git_dir.is_dir() {
            return Err(Error::GitDirDoesntExist(git_dir));
        }

        Ok(OnDisk::at(work_dir, git_dir))
    }

    /// Open the repository containing `dir`: the nearest of `dir` and its
    /// ancestors that has a `.git` directory.
    pub fn discover(dir: &Path) -> Result<Self> {
        if !dir.exists() {
            return Err(Error::WorkDirDoesntExist(dir.to_path_buf()));
        }

        match dir.ancestors().find(|d| d.join(".git").is_dir()) {
            Some(work_dir) => OnDisk::new(work_dir),
            None => Err(Error::GitDirDoesntExist(dir.join(".git"))),
        }
    }

    /// Creates a new, empty git repository on the local file system.
    ///
    /// Analogous to [`git init`](https://git-scm.com/docs/git-init).
    pub fn init(work_dir: &Path) -> Result<Self> {
        let work_dir = absolute(work_dir)?;
        let git_dir = work_dir.join(".git");
        if git_dir.exists() {
            return Err(Error::GitDirShouldntExist(git_dir));
        }

        fs::create_dir_all(&git_dir)?;

        create_config(&git_dir)?;
        create_description(&git_dir)?;
        create_head(&git_dir)?;
        create_hooks_dir(&git_dir)?;
        create_info_dir(&git_dir)?;
        create_objects_dir(&git_dir)?;
        create_refs_dir(&git_dir)?;

        Ok(OnDisk::at(work_dir, git_dir))
    }

    fn at(work_dir: PathBuf, git_dir: PathBuf) -> OnDisk {
        OnDisk {
            work_dir,
            git_dir,
            packs: Mutex::new(packs::PackCache::default()),
        }
    }

    /// Return the working directory for this repo.
    pub fn work_dir(&self) -> &Path {
        self.work_dir.as_path()
    }

    /// Return the path to the `.git` directory.
    pub fn git_dir(&self) -> &Path {
        self.git_dir.as_path()
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.git_dir.join("objects")
    }

    /// Path of the staging area file, `.git/index`.
    pub fn index_path(&self) -> PathBuf {
        self.git_dir.join("index")
    }
}

impl Repo for OnDisk {
    fn put_object(&self, object: &Object) -> Result<()> {
        self.put_loose_object(object)
    }

    fn get_object(&self, id: &Id) -> Result<Object> {
        if let Some(object) = self.read_loose_object(id)? {
            return Ok(object);
        }

        match self.read_packed_object(id)? {
            Some(object) => Ok(object),
            None => Err(Error::ObjectNotFound(*id)),
        }
    }

    fn has_object(&self, id: &Id) -> Result<bool> {
        Ok(self.has_loose_object(id) || self.has_packed_object(id)?)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

// Poisoning is ignored: a panicking reader leaves the cache in a usable state.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Replace the content of `path` in one rename, creating parent directories
/// as needed. Readers see either the old or the new content.
fn replace_file(path: &Path, content: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) => dir,
        None => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(content)?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn create_config(git_dir: &Path) -> Result<()> {
    let config_path = git_dir.join("config");
    let config_txt = "[core]\n\trepositoryformatversion = 0\n\tfilemode = true\n\tbare = false\n\tlogallrefupdates = true\n";

    fs::write(config_path, config_txt).map_err(|e| e.into())
}

fn create_description(git_dir: &Path) -> Result<()> {
    let desc_path = git_dir.join("description");
    let desc_txt = "Unnamed repository; edit this file 'description' to name the repository.\n";

    fs::write(desc_path, desc_txt).map_err(|e| e.into())
}

fn create_head(git_dir: &Path) -> Result<()> {
    let head_path = git_dir.join("HEAD");
    let head_txt = "ref: refs/heads/master\n";

    fs::write(head_path, head_txt).map_err(|e| e.into())
}

fn create_hooks_dir(git_dir: &Path) -> Result<()> {
    let hooks_dir = git_dir.join("hooks");
    fs::create_dir_all(&hooks_dir).map_err(|e| e.into())

    // NOTE: Intentionally not including the sample files.
}

fn create_info_dir(git_dir: &Path) -> Result<()> {
    let info_dir = git_dir.join("info");
    fs::create_dir_all(&info_dir)?;

    let exclude_path = info_dir.join("exclude");
    let exclude_txt = "# git ls-files --others --exclude-from=.git/info/exclude\n# Lines that start with '#' are comments.\n# For a project mostly in C, the following would be a good set of\n# exclude patterns (uncomment them if you want to use them):\n# *.[oa]\n# *~\n.DS_Store\n";

    fs::write(exclude_path, exclude_txt).map_err(|e| e.into())
}

fn create_objects_dir(git_dir: &Path) -> Result<()> {
    let info_dir = git_dir.join("objects/info");
    fs::create_dir_all(&info_dir)?;

    let pack_dir = git_dir.join("objects/pack");
    fs::create_dir_all(&pack_dir).map_err(|e| e.into())
}

fn create_refs_dir(git_dir: &Path) -> Result<()> {
    let heads_dir = git_dir.join("refs/heads");
    fs::create_dir_all(&heads_dir)?;

    let tags_dir = git_dir.join("refs/tags");
    fs::create_dir_all(&tags_dir).map_err(|e| e.into())
}

#[cfg(test)]
mod tests;
