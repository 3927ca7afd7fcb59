use std::cmp::{self, Ordering};

use super::FileMode;

/// Represents the tuple of a single tree entry name (an uninterpreted
/// sequence of bytes, not necessarily UTF-8) and its git file mode.
///
/// Git orders the entries of a tree by name, except that a subtree is
/// compared as though its name ended in `/`. This type carries that rule
/// so that trees we write hash identically to the ones command-line git
/// writes.
#[derive(Debug, Eq, PartialEq)]
pub struct PathMode<'a> {
    pub path: &'a [u8],
    pub mode: FileMode,
}

impl<'a> PathMode<'a> {
    pub fn new(path: &'a [u8], mode: FileMode) -> PathMode<'a> {
        PathMode { path, mode }
    }
}

impl<'a> Ord for PathMode<'a> {
    fn cmp(&self, other: &PathMode) -> Ordering {
        match core_compare(&self, &other) {
            Ordering::Equal => mode_compare(self.mode, other.mode),
            x => x,
        }
    }
}

impl<'a> PartialOrd for PathMode<'a> {
    fn partial_cmp(&self, other: &PathMode) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn core_compare(left: &PathMode, right: &PathMode) -> Ordering {
    if left.path == right.path {
        Ordering::Equal
    } else {
        let l = cmp::min(left.path.len(), right.path.len());

        match left.path[..l].cmp(&right.path[..l]) {
            Ordering::Equal => (),
            non_eq => return non_eq,
        }

        let lsuffix = suffix_or_slash(&left.path[l..], left.mode);
        let rsuffix = suffix_or_slash(&right.path[l..], right.mode);

        lsuffix.cmp(rsuffix)
    }
}

const EMPTY: [u8; 0] = [];
const SLASH: [u8; 1] = [b'/'];

fn suffix_or_slash(suffix: &[u8], mode: FileMode) -> &[u8] {
    if !suffix.is_empty() || mode != FileMode::Tree {
        suffix
    } else {
        &SLASH
    }
}

fn mode_compare(m1: FileMode, m2: FileMode) -> Ordering {
    if m1 == FileMode::Submodule || m2 == FileMode::Submodule {
        Ordering::Equal
    } else {
        let lsuffix = suffix_or_slash(&EMPTY, m1);
        let rsuffix = suffix_or_slash(&EMPTY, m2);
        lsuffix.cmp(rsuffix)
    }
}
