use crate::object::Id;
use crate::path::FileMode;

/// Seconds and nanoseconds since the Unix epoch, truncated to 32 bits each
/// as the index format stores them.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Timestamp {
    pub seconds: u32,
    pub nanoseconds: u32,
}

impl Timestamp {
    pub fn new(seconds: i64, nanoseconds: i64) -> Timestamp {
        Timestamp {
            seconds: seconds as u32,
            nanoseconds: nanoseconds as u32,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.seconds == 0 && self.nanoseconds == 0
    }
}

/// One staged file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexEntry {
    /// `ctime`: when the file's inode last changed.
    pub metadata_changed_at: Timestamp,

    /// `mtime`: when the file's content last changed.
    pub data_changed_at: Timestamp,

    pub dev: u32,
    pub ino: u32,
    pub mode: FileMode,
    pub uid: u32,
    pub gid: u32,

    /// File size, truncated to 32 bits.
    pub size: u32,

    pub id: Id,

    /// Only the bits above the 12-bit name length are kept here; the
    /// length is recomputed from `path` when writing.
    pub flags: u16,

    /// Relative to the work dir, with `/` separators.
    pub path: String,
}

impl IndexEntry {
    /// Creates an entry with no file system metadata. Such an entry always
    /// looks stale, so the file will be rehashed by the next status check.
    pub fn new<S: Into<String>>(path: S, mode: FileMode, id: Id) -> IndexEntry {
        IndexEntry {
            metadata_changed_at: Timestamp::default(),
            data_changed_at: Timestamp::default(),
            dev: 0,
            ino: 0,
            mode,
            uid: 0,
            gid: 0,
            size: 0,
            id,
            flags: 0,
            path: path.into(),
        }
    }

    /// Name length as stored in the low 12 bits of the flags field.
    pub(crate) fn name_length(&self) -> u16 {
        self.path.len().min(0xfff) as u16
    }

    /// Encoded length including NUL padding to a multiple of 8.
    pub(crate) fn encoded_len(&self) -> usize {
        (62 + self.path.len() + 8) / 8 * 8
    }
}
