use std::{env, path::Path};

use oxgit_core::repo::Result;
use oxgit_on_disk::OnDisk;

// Find the repository containing `path`: the nearest of `path` and its
// ancestors with a `.git` directory.
pub fn from_path<P: AsRef<Path>>(path: P) -> Result<OnDisk> {
    OnDisk::discover(path.as_ref())
}

// Find the repository containing the current working directory.
#[cfg(not(tarpaulin_include))]
pub fn from_current_dir() -> Result<OnDisk> {
    let path = env::current_dir()?;
    from_path(path)
}
