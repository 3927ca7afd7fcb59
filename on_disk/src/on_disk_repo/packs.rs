use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::debug;

use oxgit_core::object::{Id, Object};
use oxgit_core::pack::{Pack, PackIndex};
use oxgit_core::repo::Result;

use super::{lock, OnDisk};

/// Pack indexes are loaded on first use; pack data only when an object in
/// that pack is requested.
#[derive(Debug, Default)]
pub(super) struct PackCache {
    scanned: bool,
    paths: Vec<PathBuf>,
    files: Vec<Arc<PackFile>>,
}

#[derive(Debug)]
struct PackFile {
    path: PathBuf,
    index: PackIndex,
    pack: Mutex<Option<Arc<Pack>>>,
}

impl PackFile {
    fn pack(&self) -> Result<Arc<Pack>> {
        let mut slot = lock(&self.pack);
        if let Some(pack) = slot.as_ref() {
            return Ok(pack.clone());
        }

        debug!("reading pack {}", self.path.display());
        let pack = Arc::new(Pack::parse(&fs::read(&self.path)?, &self.index)?);
        *slot = Some(pack.clone());
        Ok(pack)
    }
}

/// Read a pack together with its index. `path` may name either the `.pack`
/// or the `.idx` file; the other one is expected next to it.
pub fn load_pack(path: &Path) -> Result<(PackIndex, Pack)> {
    let index = PackIndex::parse(&fs::read(path.with_extension("idx"))?)?;
    let pack = Pack::parse(&fs::read(path.with_extension("pack"))?, &index)?;
    Ok((index, pack))
}

impl OnDisk {
    /// Every `objects/pack/*.pack` file that has an index next to it.
    pub fn pack_paths(&self) -> Result<Vec<PathBuf>> {
        let pack_dir = self.objects_dir().join("pack");
        let pattern = format!(
            "{}/*.idx",
            glob::Pattern::escape(&pack_dir.to_string_lossy())
        );

        let entries = glob::glob(&pattern)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

        let mut paths = Vec::new();
        for entry in entries {
            #[allow(deprecated)]
            let pack = entry.map_err(glob::GlobError::into_error)?.with_extension("pack");
            if pack.is_file() {
                paths.push(pack);
            }
        }

        paths.sort();
        Ok(paths)
    }

    fn pack_files(&self, rescan: bool) -> Result<Vec<Arc<PackFile>>> {
        let mut cache = lock(&self.packs);
        if cache.scanned && !rescan {
            return Ok(cache.files.clone());
        }

        let paths = self.pack_paths()?;
        if !cache.scanned || paths != cache.paths {
            let mut files = Vec::with_capacity(paths.len());
            for path in &paths {
                if let Some(known) = cache.files.iter().find(|f| &f.path == path) {
                    files.push(known.clone());
                    continue;
                }

                let index = PackIndex::parse(&fs::read(path.with_extension("idx"))?)?;
                debug!("loaded {} ({} objects)", path.display(), index.len());
                files.push(Arc::new(PackFile {
                    path: path.clone(),
                    index,
                    pack: Mutex::new(None),
                }));
            }

            cache.paths = paths;
            cache.files = files;
            cache.scanned = true;
        }

        Ok(cache.files.clone())
    }

    // A miss against the cached pack list rescans the directory once, in
    // case another process repacked.
    fn find_pack(&self, id: &Id) -> Result<Option<Arc<PackFile>>> {
        for &rescan in &[false, true] {
            if let Some(file) = self
                .pack_files(rescan)?
                .into_iter()
                .find(|f| f.index.find(id).is_some())
            {
                return Ok(Some(file));
            }
        }
        Ok(None)
    }

    pub(crate) fn read_packed_object(&self, id: &Id) -> Result<Option<Object>> {
        match self.find_pack(id)? {
            Some(file) => file.pack()?.object(id),
            None => Ok(None),
        }
    }

    pub(crate) fn has_packed_object(&self, id: &Id) -> Result<bool> {
        Ok(self.find_pack(id)?.is_some())
    }
}
