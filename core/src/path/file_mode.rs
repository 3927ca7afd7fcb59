use std::fmt::{self, Display, Formatter};

use crate::object::Kind;

/// Describes the file type as represented on disk.
///
/// Git uses a variation on the Unix file permissions flags to denote a file's
/// intended type on disk. The following values are recognized:
///
/// * `0o100644` - normal file
/// * `0o100755` - executable file
/// * `0o120000` - symbolic link
/// * `0o040000` - tree (subdirectory)
/// * `0o160000` - submodule (aka gitlink)
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum FileMode {
    Normal,
    Executable,
    SymbolicLink,
    Tree,
    Submodule,
}

impl FileMode {
    /// Convert from git file-mode integer to `FileMode` enum.
    ///
    /// Returns `None` if the value is not one of the recognized constants.
    pub fn from_value(value: u32) -> Option<FileMode> {
        match value {
            0o100644 => Some(FileMode::Normal),
            0o100755 => Some(FileMode::Executable),
            0o120000 => Some(FileMode::SymbolicLink),
            0o040000 => Some(FileMode::Tree),
            0o160000 => Some(FileMode::Submodule),
            _ => None,
        }
    }

    /// Convert from `FileMode` enum to git file-mode integer.
    pub fn to_value(self) -> u32 {
        match self {
            FileMode::Normal => 0o100644,
            FileMode::Executable => 0o100755,
            FileMode::SymbolicLink => 0o120000,
            FileMode::Tree => 0o040000,
            FileMode::Submodule => 0o160000,
        }
    }

    /// Parse the octal mode string found in a tree entry.
    ///
    /// Git itself writes trees as `40000`, but some tools emit the
    /// zero-padded `040000`. Both are accepted.
    pub fn from_octal_slice(s: &[u8]) -> Option<FileMode> {
        if s.is_empty() || s.len() > 7 {
            return None;
        }

        let mut value = 0u32;
        for c in s {
            match c {
                b'0'..=b'7' => value = (value << 3) | u32::from(c - b'0'),
                _ => return None,
            }
        }

        FileMode::from_value(value)
    }

    /// Returns the octal string git writes for this mode inside a tree object.
    pub fn tree_octal(self) -> &'static [u8] {
        match self {
            FileMode::Normal => b"100644",
            FileMode::Executable => b"100755",
            FileMode::SymbolicLink => b"120000",
            FileMode::Tree => b"40000",
            FileMode::Submodule => b"160000",
        }
    }

    /// Derive the git file mode from a Unix `st_mode` value.
    ///
    /// Regular files collapse to `Normal` or `Executable` depending on the
    /// owner-execute bit; git does not record any other permission bits.
    pub fn from_unix_mode(st_mode: u32) -> FileMode {
        match st_mode & 0o170000 {
            0o120000 => FileMode::SymbolicLink,
            0o040000 => FileMode::Tree,
            0o160000 => FileMode::Submodule,
            _ if st_mode & 0o100 != 0 => FileMode::Executable,
            _ => FileMode::Normal,
        }
    }

    /// Returns the kind of object an entry with this mode points to.
    pub fn kind(self) -> Kind {
        match self {
            FileMode::Tree => Kind::Tree,
            FileMode::Submodule => Kind::Commit,
            _ => Kind::Blob,
        }
    }
}

impl Display for FileMode {
    /// Formats as the six-digit zero-padded octal used by `cat-file -p`.
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:06o}", self.to_value())
    }
}
