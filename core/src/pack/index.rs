use log::debug;

use super::cursor::Cursor;
use crate::object::Id;
use crate::repo::{Error, Result};

const MAGIC: &[u8] = b"\xfftOc";
const FANOUT_LEN: usize = 256 * 4;

/// One row of a pack index.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PackIndexEntry {
    pub id: Id,

    /// CRC32 of the entry's compressed bytes in the pack. Recorded but not
    /// verified.
    pub crc32: u32,

    pub offset: u64,
}

/// Parsed version 2 pack index (`.idx`).
#[derive(Clone, Debug)]
pub struct PackIndex {
    fanout: [u32; 256],

    /// Sorted by ID.
    entries: Vec<PackIndexEntry>,

    pack_checksum: Id,
    checksum: Id,
    actual_checksum: Id,
}

impl PackIndex {
    pub fn parse(data: &[u8]) -> Result<PackIndex> {
        let mut c = Cursor::new(data);

        let magic = c.take(4).map_err(|_| invalid("file too short"))?;
        if magic != MAGIC {
            return Err(invalid("missing \\377tOc signature"));
        }

        let version = c.read_u32_be().map_err(|_| invalid("file too short"))?;
        if version != 2 {
            return Err(Error::UnsupportedVersion {
                what: "pack index",
                version,
            });
        }

        let mut fanout = [0u32; 256];
        let mut prev = 0;
        for slot in fanout.iter_mut() {
            *slot = c.read_u32_be().map_err(|_| invalid("truncated fan-out table"))?;
            if *slot < prev {
                return Err(invalid("fan-out table is not monotonic"));
            }
            prev = *slot;
        }

        let n = fanout[255] as usize;
        let table_len = n * (20 + 4 + 4);
        if data.len() < 8 + FANOUT_LEN + table_len + 40 {
            return Err(invalid(&format!("too short for {} objects", n)));
        }

        let ids = c.take(n * 20)?;
        let crcs = c.take(n * 4)?;
        let offsets = c.take(n * 4)?;

        let mut entries = Vec::with_capacity(n);
        for i in 0..n {
            let id = Id::new(&ids[i * 20..i * 20 + 20])?;
            let crc32 = be_u32(&crcs[i * 4..]);
            let offset = be_u32(&offsets[i * 4..]);

            if offset & 0x8000_0000 != 0 {
                return Err(Error::UnsupportedPackSize);
            }

            if entries.last().map_or(false, |last: &PackIndexEntry| last.id >= id) {
                return Err(invalid("object IDs are not sorted"));
            }

            let (lo, hi) = bucket(&fanout, id.as_bytes()[0]);
            if i < lo || i >= hi {
                return Err(invalid("fan-out table does not match object IDs"));
            }

            entries.push(PackIndexEntry {
                id,
                crc32,
                offset: u64::from(offset),
            });
        }

        // No large offsets were referenced, so only the trailer may follow.
        if c.remaining().len() != 40 {
            return Err(invalid("unexpected data before trailer"));
        }

        let pack_checksum = Id::new(c.take(20)?)?;
        let checksum = Id::new(c.take(20)?)?;
        let actual_checksum = Id::hash_of(&data[..data.len() - 20]);

        debug!("parsed pack index with {} objects", n);

        Ok(PackIndex {
            fanout,
            entries,
            pack_checksum,
            checksum,
            actual_checksum,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows in ID order.
    pub fn entries(&self) -> &[PackIndexEntry] {
        &self.entries
    }

    /// Checksum of the pack this index describes.
    pub fn pack_checksum(&self) -> Id {
        self.pack_checksum
    }

    /// Find a row by ID, narrowing the search with the fan-out table.
    pub fn find(&self, id: &Id) -> Option<&PackIndexEntry> {
        let (lo, hi) = bucket(&self.fanout, id.as_bytes()[0]);
        let rows = &self.entries[lo..hi];
        rows.binary_search_by(|e| e.id.cmp(id))
            .ok()
            .map(|i| &rows[i])
    }

    pub fn offset_of(&self, id: &Id) -> Option<u64> {
        self.find(id).map(|e| e.offset)
    }

    /// Check the trailing digest over the rest of the index file.
    pub fn verify_checksum(&self) -> Result<()> {
        if self.checksum == self.actual_checksum {
            Ok(())
        } else {
            Err(Error::PackChecksum {
                what: "pack index",
                expected: self.checksum,
                actual: self.actual_checksum,
            })
        }
    }
}

fn be_u32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

/// Range of rows whose IDs start with `first`.
fn bucket(fanout: &[u32; 256], first: u8) -> (usize, usize) {
    let hi = fanout[first as usize] as usize;
    let lo = match first {
        0 => 0,
        _ => fanout[first as usize - 1] as usize,
    };
    (lo, hi)
}

fn invalid(detail: &str) -> Error {
    Error::InvalidHeader {
        what: "pack index",
        detail: detail.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::build_index;

    fn id(s: &str) -> Id {
        Id::from_hex(s).unwrap()
    }

    fn sample() -> Vec<u8> {
        build_index(
            &[
                (id("b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0"), 12, 0x1234),
                (id("04fea06420ca60892f73becee3614f6d023a4b7f"), 40, 0x5678),
                (id("04ff000000000000000000000000000000000001"), 77, 0),
            ],
            Id::hash_of(b"pack"),
        )
    }

    #[test]
    fn parse_and_lookup() {
        let idx = PackIndex::parse(&sample()).unwrap();
        assert_eq!(idx.len(), 3);
        assert!(!idx.is_empty());
        idx.verify_checksum().unwrap();
        assert_eq!(idx.pack_checksum(), Id::hash_of(b"pack"));

        let ids: Vec<String> = idx.entries().iter().map(|e| e.id.to_string()).collect();
        assert_eq!(
            ids,
            vec![
                "04fea06420ca60892f73becee3614f6d023a4b7f",
                "04ff000000000000000000000000000000000001",
                "b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0",
            ]
        );

        assert_eq!(
            idx.offset_of(&id("b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0")),
            Some(12)
        );
        assert_eq!(
            idx.offset_of(&id("04ff000000000000000000000000000000000001")),
            Some(77)
        );

        let e = idx
            .find(&id("04fea06420ca60892f73becee3614f6d023a4b7f"))
            .unwrap();
        assert_eq!(e.crc32, 0x5678);
        assert_eq!(e.offset, 40);

        assert_eq!(
            idx.offset_of(&id("04fea06420ca60892f73becee3614f6d023a4b7e")),
            None
        );
        assert_eq!(
            idx.offset_of(&id("ff00000000000000000000000000000000000000")),
            None
        );
    }

    #[test]
    fn empty_index() {
        let idx = PackIndex::parse(&build_index(&[], Id::hash_of(b""))).unwrap();
        assert!(idx.is_empty());
        assert_eq!(
            idx.offset_of(&id("b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0")),
            None
        );
    }

    fn assert_invalid_header(data: &[u8]) {
        match PackIndex::parse(data) {
            Err(Error::InvalidHeader { .. }) => (),
            other => panic!("expected InvalidHeader, got {:?}", other),
        }
    }

    #[test]
    fn bad_magic() {
        let mut data = sample();
        data[1] = b'T';
        assert_invalid_header(&data);
        assert_invalid_header(b"\xfftO");
    }

    #[test]
    fn bad_version() {
        let mut data = sample();
        data[7] = 1;
        match PackIndex::parse(&data) {
            Err(Error::UnsupportedVersion { version: 1, .. }) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn truncated() {
        let data = sample();
        assert_invalid_header(&data[..data.len() - 1]);
        assert_invalid_header(&data[..500]);
    }

    #[test]
    fn large_offset_rejected() {
        let mut data = sample();
        // First offset of three, after magic, fan-out, IDs, and CRCs.
        let pos = 8 + 1024 + 3 * 20 + 3 * 4;
        data[pos] |= 0x80;
        match PackIndex::parse(&data) {
            Err(Error::UnsupportedPackSize) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unsorted_ids_rejected() {
        let mut data = sample();
        // 04fea0... becomes 04ffa0..., which sorts after 04ff00...
        let first = 8 + 1024;
        data[first + 1] = 0xff;
        assert_invalid_header(&data);
    }

    #[test]
    fn checksum_mismatch() {
        let mut data = sample();
        let pos = 8 + 1024 + 3 * 20;
        data[pos] ^= 0xff;

        let idx = PackIndex::parse(&data).unwrap();
        match idx.verify_checksum() {
            Err(Error::PackChecksum { what, .. }) => assert_eq!(what, "pack index"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
