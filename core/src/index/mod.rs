//! The staging area ("index") file, version 2.
//!
//! The layout is a 12-byte header (`DIRC`, version, entry count), the
//! entries sorted by path, optional extensions, and a trailing SHA-1 over
//! everything before it. Extensions are skipped when reading and never
//! written.

use std::collections::BTreeMap;

use log::debug;

use crate::object::Id;
use crate::path::FileMode;
use crate::repo::{Error, Result};

mod entry;
pub use entry::{IndexEntry, Timestamp};

const SIGNATURE: &[u8] = b"DIRC";
const VERSION: u32 = 2;
const ENTRY_FIXED_LEN: usize = 62;

/// In-memory staging area: one row per path.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Index {
    entries: BTreeMap<String, IndexEntry>,
}

impl Index {
    pub fn new() -> Index {
        Index::default()
    }

    /// Parse the contents of an index file.
    ///
    /// The checksum is verified before anything else is looked at, so any
    /// corruption is reported as [`Error::IndexChecksum`].
    pub fn parse(data: &[u8]) -> Result<Index> {
        if data.len() < 12 + 20 {
            return Err(invalid("file too short"));
        }

        let trailer = data.len() - 20;
        let expected = Id::new(&data[trailer..])?;
        let actual = Id::hash_of(&data[..trailer]);
        if expected != actual {
            return Err(Error::IndexChecksum { expected, actual });
        }

        if &data[0..4] != SIGNATURE {
            return Err(invalid("missing DIRC signature"));
        }

        let version = be_u32(&data[4..8]);
        if version != VERSION {
            return Err(Error::UnsupportedVersion {
                what: "index",
                version,
            });
        }

        let count = be_u32(&data[8..12]) as usize;
        let body = &data[..trailer];
        let mut pos = 12;
        let mut entries = BTreeMap::new();

        for _ in 0..count {
            let (entry, len) = parse_entry(&body[pos..])?;
            pos += len;

            if entries.insert(entry.path.clone(), entry).is_some() {
                return Err(invalid("duplicate path"));
            }
        }

        if pos < trailer {
            debug!("ignoring {} bytes of index extensions", trailer - pos);
        }

        Ok(Index { entries })
    }

    /// Serialize to the on-disk format, including the trailing checksum.
    pub fn serialize(&self) -> Vec<u8> {
        let len = 12 + self.entries.values().map(IndexEntry::encoded_len).sum::<usize>() + 20;
        let mut out = Vec::with_capacity(len);

        out.extend_from_slice(SIGNATURE);
        out.extend_from_slice(&VERSION.to_be_bytes());
        out.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());

        for e in self.entries.values() {
            let start = out.len();

            for field in &[
                e.metadata_changed_at.seconds,
                e.metadata_changed_at.nanoseconds,
                e.data_changed_at.seconds,
                e.data_changed_at.nanoseconds,
                e.dev,
                e.ino,
                e.mode.to_value(),
                e.uid,
                e.gid,
                e.size,
            ] {
                out.extend_from_slice(&field.to_be_bytes());
            }

            out.extend_from_slice(e.id.as_bytes());

            let flags = (e.flags & 0xf000) | e.name_length();
            out.extend_from_slice(&flags.to_be_bytes());
            out.extend_from_slice(e.path.as_bytes());

            out.resize(start + e.encoded_len(), 0);
        }

        let checksum = Id::hash_of(&out);
        out.extend_from_slice(checksum.as_bytes());
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    /// Rows in path order.
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    /// Add a row, replacing any existing row for the same path.
    pub fn upsert(&mut self, entry: IndexEntry) {
        self.entries.insert(entry.path.clone(), entry);
    }

    /// Remove the row for `path`, returning it if it was present.
    pub fn remove(&mut self, path: &str) -> Option<IndexEntry> {
        self.entries.remove(path)
    }

    /// Keep only the rows for which `keep` returns true.
    pub fn retain<F: FnMut(&IndexEntry) -> bool>(&mut self, mut keep: F) {
        self.entries = std::mem::take(&mut self.entries)
            .into_iter()
            .filter(|(_, e)| keep(e))
            .collect();
    }
}

fn parse_entry(data: &[u8]) -> Result<(IndexEntry, usize)> {
    if data.len() < ENTRY_FIXED_LEN + 1 {
        return Err(invalid("truncated entry"));
    }

    let field = |i: usize| be_u32(&data[i * 4..i * 4 + 4]);

    let mode = FileMode::from_value(field(6))
        .filter(|m| *m != FileMode::Tree)
        .ok_or_else(|| invalid(&format!("unsupported mode {:o}", field(6))))?;

    let id = Id::new(&data[40..60])?;
    let flags = u16::from_be_bytes([data[60], data[61]]);

    let name_end = data[ENTRY_FIXED_LEN..]
        .iter()
        .position(|b| *b == 0)
        .ok_or_else(|| invalid("path is not NUL-terminated"))?
        + ENTRY_FIXED_LEN;

    let path = std::str::from_utf8(&data[ENTRY_FIXED_LEN..name_end])
        .map_err(|_| invalid("path is not valid UTF-8"))?
        .to_string();
    if path.is_empty() {
        return Err(invalid("empty path"));
    }

    let entry = IndexEntry {
        metadata_changed_at: Timestamp {
            seconds: field(0),
            nanoseconds: field(1),
        },
        data_changed_at: Timestamp {
            seconds: field(2),
            nanoseconds: field(3),
        },
        dev: field(4),
        ino: field(5),
        mode,
        uid: field(7),
        gid: field(8),
        size: field(9),
        id,
        flags: flags & 0xf000,
        path,
    };

    let len = entry.encoded_len();
    if len > data.len() {
        return Err(invalid("truncated entry padding"));
    }

    Ok((entry, len))
}

fn be_u32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

fn invalid(detail: &str) -> Error {
    Error::InvalidHeader {
        what: "index",
        detail: detail.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, n: u32) -> IndexEntry {
        IndexEntry {
            metadata_changed_at: Timestamp {
                seconds: 1_600_000_000 + n,
                nanoseconds: n * 7,
            },
            data_changed_at: Timestamp {
                seconds: 1_500_000_000 + n,
                nanoseconds: n * 11,
            },
            dev: 2049,
            ino: 1000 + n,
            mode: if n % 2 == 0 {
                FileMode::Normal
            } else {
                FileMode::Executable
            },
            uid: 501,
            gid: 20,
            size: n * 100,
            id: Id::for_object(crate::object::Kind::Blob, path.as_bytes()),
            flags: 0,
            path: path.to_string(),
        }
    }

    fn sample() -> Index {
        let mut index = Index::new();
        index.upsert(entry("src/main.rs", 3));
        index.upsert(entry("a.txt", 0));
        index.upsert(entry("dir/b.txt", 1));
        index.upsert(entry("ab", 2));
        index
    }

    #[test]
    fn round_trip() {
        let index = sample();
        let parsed = Index::parse(&index.serialize()).unwrap();
        assert_eq!(parsed, index);

        let paths: Vec<&str> = parsed.entries().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["a.txt", "ab", "dir/b.txt", "src/main.rs"]);
    }

    #[test]
    fn layout() {
        let mut index = Index::new();
        index.upsert(entry("a.txt", 0));
        let data = index.serialize();

        assert_eq!(&data[0..12], b"DIRC\0\0\0\x02\0\0\0\x01");
        assert_eq!(data.len(), 12 + 72 + 20);

        // mode field
        assert_eq!(&data[12 + 24..12 + 28], &0o100644u32.to_be_bytes());
        // flags hold the name length
        assert_eq!(&data[12 + 60..12 + 62], &[0, 5]);
        assert_eq!(&data[12 + 62..12 + 67], b"a.txt");
        assert!(data[12 + 67..12 + 72].iter().all(|b| *b == 0));

        assert_eq!(
            &data[data.len() - 20..],
            Id::hash_of(&data[..data.len() - 20]).as_bytes()
        );
    }

    #[test]
    fn empty_index() {
        let data = Index::new().serialize();
        assert_eq!(data.len(), 32);
        assert!(Index::parse(&data).unwrap().is_empty());
    }

    #[test]
    fn any_flipped_byte_fails_checksum() {
        let data = sample().serialize();

        for i in 0..data.len() - 20 {
            let mut bad = data.clone();
            bad[i] ^= 0x01;

            match Index::parse(&bad) {
                Err(Error::IndexChecksum { .. }) => (),
                other => panic!("byte {}: expected IndexChecksum, got {:?}", i, other),
            }
        }
    }

    fn with_checksum(mut data: Vec<u8>) -> Vec<u8> {
        let len = data.len() - 20;
        data.truncate(len);
        let checksum = Id::hash_of(&data);
        data.extend_from_slice(checksum.as_bytes());
        data
    }

    #[test]
    fn bad_signature() {
        let mut data = sample().serialize();
        data[0] = b'X';

        match Index::parse(&with_checksum(data)) {
            Err(Error::InvalidHeader { what, .. }) => assert_eq!(what, "index"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bad_version() {
        let mut data = sample().serialize();
        data[7] = 3;

        match Index::parse(&with_checksum(data)) {
            Err(Error::UnsupportedVersion { version: 3, .. }) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn too_short() {
        match Index::parse(b"DIRC") {
            Err(Error::InvalidHeader { .. }) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn non_utf8_path() {
        let mut index = Index::new();
        index.upsert(entry("a.txt", 0));
        let mut data = index.serialize();
        data[12 + 62] = 0xe9;

        match Index::parse(&with_checksum(data)) {
            Err(Error::InvalidHeader { what, detail }) => {
                assert_eq!(what, "index");
                assert!(detail.contains("UTF-8"), "{}", detail);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn extensions_are_skipped() {
        let mut data = sample().serialize();
        let len = data.len() - 20;
        data.truncate(len);
        data.extend_from_slice(b"TREE\0\0\0\x04abcd");

        let parsed = Index::parse(&with_checksum_appended(data)).unwrap();
        assert_eq!(parsed, sample());
    }

    fn with_checksum_appended(mut data: Vec<u8>) -> Vec<u8> {
        let checksum = Id::hash_of(&data);
        data.extend_from_slice(checksum.as_bytes());
        data
    }

    #[test]
    fn upsert_replaces_and_remove_drops() {
        let mut index = sample();
        let mut replacement = entry("a.txt", 9);
        replacement.size = 12345;
        index.upsert(replacement.clone());

        assert_eq!(index.len(), 4);
        assert_eq!(index.get("a.txt"), Some(&replacement));

        assert!(index.remove("a.txt").is_some());
        assert!(index.remove("a.txt").is_none());
        assert_eq!(index.len(), 3);

        index.retain(|e| !e.path.starts_with("dir/"));
        assert_eq!(index.len(), 2);
        assert!(index.get("dir/b.txt").is_none());
    }

    #[test]
    fn long_path_round_trip() {
        let mut index = Index::new();
        index.upsert(entry(&"d/".repeat(2100), 0));

        let data = index.serialize();
        assert_eq!(&data[12 + 60..12 + 62], &[0x0f, 0xff]);
        assert_eq!(Index::parse(&data).unwrap(), index);
    }
}
