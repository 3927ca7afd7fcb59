use std::collections::BTreeMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::PathBuf;

use log::{debug, warn};
use walkdir::WalkDir;

use oxgit_core::object::Id;
use oxgit_core::repo::{check_ref_name, Error, RefStore, Result, BRANCH_PREFIX};

use super::{replace_file, OnDisk};
use crate::worktree::to_slash;

const REMOTES_PREFIX: &str = "refs/remotes/";

impl OnDisk {
    fn ref_path(&self, name: &str) -> PathBuf {
        self.git_dir.join(name)
    }

    /// Refs listed in `.git/packed-refs`. Peeled tag lines are skipped.
    pub fn packed_refs(&self) -> Result<BTreeMap<String, Id>> {
        let text = match fs::read_to_string(self.git_dir.join("packed-refs")) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        let mut refs = BTreeMap::new();
        for line in text.lines() {
            if line.is_empty() || line.starts_with('#') || line.starts_with('^') {
                continue;
            }

            match line.split_once(' ') {
                Some((id, name)) => {
                    refs.insert(name.to_string(), Id::from_hex(id)?);
                }
                None => warn!("ignoring malformed packed-refs line {:?}", line),
            }
        }

        Ok(refs)
    }

    // Returns true if `name` was listed.
    fn remove_packed_ref(&self, name: &str) -> Result<bool> {
        let path = self.git_dir.join("packed-refs");
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let mut kept = String::with_capacity(text.len());
        let mut removed = false;
        let mut skipping_peeled = false;

        for line in text.lines() {
            if line.starts_with('^') && skipping_peeled {
                continue;
            }
            skipping_peeled = false;

            if line.split_once(' ').map(|(_, n)| n) == Some(name) {
                removed = true;
                skipping_peeled = true;
                continue;
            }

            kept.push_str(line);
            kept.push('\n');
        }

        if removed {
            replace_file(&path, kept.as_bytes())?;
        }
        Ok(removed)
    }
}

impl RefStore for OnDisk {
    fn current_ref(&self) -> Result<String> {
        let head = fs::read_to_string(self.git_dir.join("HEAD"))?;
        let head = head.trim_end();

        match head.strip_prefix("ref: ") {
            Some(name) => Ok(name.to_string()),
            None => Err(Error::InvalidRefName(format!("detached HEAD {}", head))),
        }
    }

    fn read_ref(&self, name: &str) -> Result<Option<Id>> {
        check_ref_name(name)?;

        match fs::read_to_string(self.ref_path(name)) {
            Ok(text) => Ok(Some(Id::from_hex(text.trim_end())?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(self.packed_refs()?.remove(name)),
            Err(e) => Err(e.into()),
        }
    }

    fn update_ref(&self, name: &str, id: &Id) -> Result<()> {
        check_ref_name(name)?;
        replace_file(&self.ref_path(name), format!("{}\n", id).as_bytes())?;
        debug!("{} -> {}", name, id);
        Ok(())
    }

    fn update_current_ref(&self, name: &str) -> Result<()> {
        check_ref_name(name)?;
        replace_file(
            &self.git_dir.join("HEAD"),
            format!("ref: {}\n", name).as_bytes(),
        )
    }

    fn delete_ref(&self, name: &str) -> Result<()> {
        check_ref_name(name)?;

        let loose = match fs::remove_file(self.ref_path(name)) {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };
        let packed = self.remove_packed_ref(name)?;

        if loose || packed {
            debug!("deleted {}", name);
            Ok(())
        } else {
            Err(Error::RefNotFound(name.to_string()))
        }
    }

    fn branch_refs(&self, include_remote: bool) -> Result<BTreeMap<String, Id>> {
        let wanted = |name: &str| {
            name.starts_with(BRANCH_PREFIX) || (include_remote && name.starts_with(REMOTES_PREFIX))
        };

        let mut refs = self.packed_refs()?;
        refs.retain(|name, _| wanted(name.as_str()));

        for root in [BRANCH_PREFIX, REMOTES_PREFIX].iter().copied() {
            let dir = self.ref_path(root);
            if !wanted(root) || !dir.is_dir() {
                continue;
            }

            for entry in WalkDir::new(&dir) {
                let entry = entry.map_err(io::Error::from)?;
                if !entry.file_type().is_file() {
                    continue;
                }

                let name = match entry.path().strip_prefix(&self.git_dir) {
                    Ok(rel) => to_slash(rel),
                    Err(_) => continue,
                };
                if check_ref_name(&name).is_err() {
                    debug!("skipping {}", name);
                    continue;
                }

                let text = fs::read_to_string(entry.path())?;
                refs.insert(name, Id::from_hex(text.trim_end())?);
            }
        }

        Ok(refs)
    }
}
