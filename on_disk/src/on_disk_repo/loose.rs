use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use log::debug;
use tempfile::NamedTempFile;

use oxgit_core::codec;
use oxgit_core::object::{Id, Object};
use oxgit_core::repo::{Error, Result};

use super::OnDisk;

impl OnDisk {
    /// Path of the loose file for `id`: `objects/xx/yyyy...`.
    pub fn loose_object_path(&self, id: &Id) -> PathBuf {
        let (dir, name) = self.loose_parts(id);
        dir.join(name)
    }

    fn loose_parts(&self, id: &Id) -> (PathBuf, String) {
        let hex = id.to_string();
        (self.objects_dir().join(&hex[..2]), hex[2..].to_string())
    }

    /// Write a loose object the same way command-line git does.
    ///
    /// The compressed bytes go to a temporary file in the fan-out directory,
    /// which is then renamed into place without replacing an existing file.
    /// If the object is already there (maybe written by a concurrent caller),
    /// nothing changes and the write still succeeds.
    pub fn put_loose_object(&self, object: &Object) -> Result<()> {
        let id = object.id();
        let (dir, name) = self.loose_parts(&id);
        let path = dir.join(name);

        if path.exists() {
            debug!("object {} already stored", id);
            return Ok(());
        }

        fs::create_dir_all(&dir)?;

        let compressed = codec::compress(&object.encode())?;
        let mut temp = NamedTempFile::new_in(&dir)?;
        temp.write_all(&compressed)?;
        set_read_only(&temp)?;

        match temp.persist_noclobber(&path) {
            Ok(_) => {
                debug!("wrote {} {} ({} bytes)", object.kind(), id, compressed.len());
                Ok(())
            }
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                debug!("object {} written concurrently", id);
                Ok(())
            }
            Err(e) => Err(e.error.into()),
        }
    }

    /// Read and verify a loose object. Returns `None` if there is no loose
    /// file for `id`.
    pub(crate) fn read_loose_object(&self, id: &Id) -> Result<Option<Object>> {
        let raw = match fs::read(self.loose_object_path(id)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let data = codec::decompress(&raw)?;
        let actual = Id::hash_of(&data);
        if actual != *id {
            return Err(Error::Integrity {
                expected: *id,
                actual,
            });
        }

        Ok(Some(Object::decode(&data)?))
    }

    pub(crate) fn has_loose_object(&self, id: &Id) -> bool {
        self.loose_object_path(id).is_file()
    }
}

#[cfg(unix)]
fn set_read_only(temp: &NamedTempFile) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o444)).map_err(|e| e.into())
}

#[cfg(not(unix))]
fn set_read_only(temp: &NamedTempFile) -> Result<()> {
    let mut permissions = temp.as_file().metadata()?.permissions();
    permissions.set_readonly(true);
    fs::set_permissions(temp.path(), permissions).map_err(|e| e.into())
}
