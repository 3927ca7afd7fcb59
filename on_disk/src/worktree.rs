//! Files in the working directory, minus ignored ones.

use std::fs::{self, Metadata};
use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use log::{debug, warn};
use walkdir::WalkDir;

use oxgit_core::index::{IndexEntry, Timestamp};
use oxgit_core::object::Id;
use oxgit_core::path::FileMode;
use oxgit_core::repo::Result;

/// A file found by [`WorkTree::walk`].
#[derive(Clone, Debug)]
pub struct WorkFile {
    /// Relative to the work dir, with `/` separators.
    pub path: String,

    /// Not following symbolic links.
    pub metadata: Metadata,
}

#[derive(Clone, Debug)]
struct IgnoreRule {
    pattern: Pattern,
    anchored: bool,
    dir_only: bool,
}

/// The working directory together with its ignore rules, read from the
/// top-level `.gitignore` and `.git/info/exclude`.
///
/// One glob per line; blank lines and `#` comments are skipped. A pattern
/// without `/` matches any path component, one containing `/` matches from
/// the top of the working directory, and a trailing `/` only matches
/// directories. Negated (`!`) patterns are not supported.
#[derive(Clone, Debug)]
pub struct WorkTree {
    root: PathBuf,
    rules: Vec<IgnoreRule>,
}

impl WorkTree {
    pub fn new(work_dir: &Path) -> Result<WorkTree> {
        let mut rules = Vec::new();
        for file in &[work_dir.join(".gitignore"), work_dir.join(".git/info/exclude")] {
            match fs::read_to_string(file) {
                Ok(text) => rules.extend(parse_rules(&text)),
                Err(e) if e.kind() == ErrorKind::NotFound => (),
                Err(e) => return Err(e.into()),
            }
        }

        debug!("{} ignore rules for {}", rules.len(), work_dir.display());

        Ok(WorkTree {
            root: work_dir.to_path_buf(),
            rules,
        })
    }

    /// Returns true if `path` (relative, `/`-separated) or one of its parent
    /// directories is ignored.
    pub fn is_ignored(&self, path: &str, is_dir: bool) -> bool {
        let parts: Vec<&str> = path.split('/').collect();
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        self.rules.iter().any(|rule| {
            (0..parts.len()).any(|i| {
                let part_is_dir = i + 1 < parts.len() || is_dir;
                if rule.dir_only && !part_is_dir {
                    return false;
                }

                if rule.anchored {
                    rule.pattern.matches_with(&parts[..=i].join("/"), options)
                } else {
                    rule.pattern.matches_with(parts[i], options)
                }
            })
        })
    }

    /// Every file below the work dir except `.git` and ignored paths,
    /// sorted by path.
    pub fn walk(&self) -> Result<Vec<WorkFile>> {
        let root = self.root.as_path();
        let walker = WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 1 && e.file_name() == ".git" {
                    return false;
                }
                if e.file_name().to_str().is_none() {
                    warn!("skipping {:?}: name is not valid UTF-8", e.path());
                    return false;
                }
                match e.path().strip_prefix(root) {
                    Ok(rel) => !self.is_ignored(&to_slash(rel), e.file_type().is_dir()),
                    Err(_) => true,
                }
            });

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_dir() {
                continue;
            }

            if let Ok(rel) = entry.path().strip_prefix(root) {
                files.push(WorkFile {
                    path: to_slash(rel),
                    metadata: entry.metadata().map_err(io::Error::from)?,
                });
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }
}

fn parse_rules(text: &str) -> Vec<IgnoreRule> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            if line.starts_with('!') {
                warn!("negated ignore pattern {:?} not supported", line);
                return None;
            }

            let dir_only = line.ends_with('/');
            let line = line.trim_end_matches('/');
            let anchored = line.contains('/');
            let line = line.trim_start_matches('/');

            match Pattern::new(line) {
                Ok(pattern) => Some(IgnoreRule {
                    pattern,
                    anchored,
                    dir_only,
                }),
                Err(e) => {
                    warn!("bad ignore pattern {:?}: {}", line, e);
                    None
                }
            }
        })
        .collect()
}

/// Join the components of a relative path with `/`.
pub(crate) fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve `.` and `..` without touching the file system.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => (),
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// The bytes git stores for a working file: its content, or for a symbolic
/// link the link target.
pub(crate) fn read_work_file(path: &Path, metadata: &Metadata) -> io::Result<Vec<u8>> {
    if metadata.file_type().is_symlink() {
        let target = fs::read_link(path)?;
        Ok(link_target_bytes(&target))
    } else {
        fs::read(path)
    }
}

#[cfg(unix)]
fn link_target_bytes(target: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    target.as_os_str().as_bytes().to_vec()
}

#[cfg(not(unix))]
fn link_target_bytes(target: &Path) -> Vec<u8> {
    to_slash(target).into_bytes()
}

/// Build an index row from file system metadata.
#[cfg(unix)]
pub(crate) fn index_entry(path: String, metadata: &Metadata, id: Id) -> IndexEntry {
    use std::os::unix::fs::MetadataExt;

    IndexEntry {
        metadata_changed_at: Timestamp::new(metadata.ctime(), metadata.ctime_nsec()),
        data_changed_at: Timestamp::new(metadata.mtime(), metadata.mtime_nsec()),
        dev: metadata.dev() as u32,
        ino: metadata.ino() as u32,
        mode: FileMode::from_unix_mode(metadata.mode()),
        uid: metadata.uid(),
        gid: metadata.gid(),
        size: metadata.len() as u32,
        id,
        flags: 0,
        path,
    }
}

#[cfg(not(unix))]
pub(crate) fn index_entry(path: String, metadata: &Metadata, id: Id) -> IndexEntry {
    use std::time::UNIX_EPOCH;

    let modified = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| Timestamp::new(d.as_secs() as i64, d.subsec_nanos() as i64))
        .unwrap_or_default();

    let mode = if metadata.file_type().is_symlink() {
        FileMode::SymbolicLink
    } else {
        FileMode::Normal
    };

    let mut entry = IndexEntry::new(path, mode, id);
    entry.metadata_changed_at = modified;
    entry.data_changed_at = modified;
    entry.size = metadata.len() as u32;
    entry
}

/// Returns true if the stat data recorded in `entry` still describes the
/// file, so its content need not be hashed again. Rows without timestamps
/// never match.
pub(crate) fn stat_matches(entry: &IndexEntry, metadata: &Metadata) -> bool {
    let now = index_entry(String::new(), metadata, entry.id);

    !entry.data_changed_at.is_zero()
        && entry.data_changed_at == now.data_changed_at
        && entry.metadata_changed_at == now.metadata_changed_at
        && entry.size == now.size
        && entry.mode == now.mode
}
