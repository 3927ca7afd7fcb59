// Items in this module are only used in test code.

use flate2::Crc;

use crate::codec;
use crate::object::{Id, Kind};

/// Route `log` output through the test harness. Safe to call repeatedly.
pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Assembles a version 2 pack and its index in memory.
pub(crate) struct PackBuilder {
    data: Vec<u8>,
    rows: Vec<(Id, u64, u32)>,
}

impl PackBuilder {
    pub(crate) fn new() -> PackBuilder {
        let mut data = b"PACK".to_vec();
        data.extend_from_slice(&2u32.to_be_bytes());
        data.extend_from_slice(&0u32.to_be_bytes());
        PackBuilder {
            data,
            rows: Vec::new(),
        }
    }

    /// Adds a whole object and returns its offset.
    pub(crate) fn add_object(&mut self, kind: Kind, payload: &[u8]) -> u64 {
        self.add_object_with_id(kind, payload, Id::for_object(kind, payload))
    }

    /// Like `add_object`, but lists `id` in the index whatever the content.
    pub(crate) fn add_object_with_id(&mut self, kind: Kind, payload: &[u8], id: Id) -> u64 {
        let type_bits = match kind {
            Kind::Commit => 1,
            Kind::Tree => 2,
            Kind::Blob => 3,
            Kind::Tag => 4,
        };

        let mut entry = entry_header(type_bits, payload.len());
        entry.extend_from_slice(&codec::compress(payload).unwrap());
        self.push(entry, id)
    }

    /// Adds an offset delta against the entry at `base_offset`; `target`
    /// is only used to compute the ID listed in the index.
    pub(crate) fn add_ofs_delta(
        &mut self,
        base_offset: u64,
        kind: Kind,
        delta: &[u8],
        target: &[u8],
    ) -> u64 {
        let offset = self.data.len() as u64;

        let mut entry = entry_header(6, delta.len());
        entry.extend_from_slice(&ofs_distance(offset - base_offset));
        entry.extend_from_slice(&codec::compress(delta).unwrap());
        self.push(entry, Id::for_object(kind, target))
    }

    pub(crate) fn add_ref_delta(&mut self, base: Id, delta: &[u8], target: &[u8]) -> u64 {
        let mut entry = entry_header(7, delta.len());
        entry.extend_from_slice(base.as_bytes());
        entry.extend_from_slice(&codec::compress(delta).unwrap());
        self.push(entry, Id::for_object(Kind::Blob, target))
    }

    fn push(&mut self, entry: Vec<u8>, id: Id) -> u64 {
        let offset = self.data.len() as u64;

        let mut crc = Crc::new();
        crc.update(&entry);

        self.rows.push((id, offset, crc.sum()));
        self.data.extend_from_slice(&entry);
        offset
    }

    /// Returns `(pack, index)` file contents.
    pub(crate) fn finish(mut self) -> (Vec<u8>, Vec<u8>) {
        let count = (self.rows.len() as u32).to_be_bytes();
        self.data[8..12].copy_from_slice(&count);

        let checksum = Id::hash_of(&self.data);
        self.data.extend_from_slice(checksum.as_bytes());

        let index = build_index(&self.rows, checksum);
        (self.data, index)
    }
}

/// Serializes a version 2 pack index from `(id, offset, crc32)` rows in any order.
pub(crate) fn build_index(rows: &[(Id, u64, u32)], pack_checksum: Id) -> Vec<u8> {
    let mut rows = rows.to_vec();
    rows.sort();

    let mut out = b"\xfftOc".to_vec();
    out.extend_from_slice(&2u32.to_be_bytes());

    for first in 0..=255u8 {
        let count = rows
            .iter()
            .filter(|(id, _, _)| id.as_bytes()[0] <= first)
            .count() as u32;
        out.extend_from_slice(&count.to_be_bytes());
    }

    for (id, _, _) in &rows {
        out.extend_from_slice(id.as_bytes());
    }
    for (_, _, crc) in &rows {
        out.extend_from_slice(&crc.to_be_bytes());
    }
    for (_, offset, _) in &rows {
        out.extend_from_slice(&(*offset as u32).to_be_bytes());
    }

    out.extend_from_slice(pack_checksum.as_bytes());
    let checksum = Id::hash_of(&out);
    out.extend_from_slice(checksum.as_bytes());
    out
}

fn entry_header(type_bits: u8, mut size: usize) -> Vec<u8> {
    let mut out = vec![(type_bits << 4) | (size & 0x0f) as u8];
    size >>= 4;

    while size > 0 {
        if let Some(last) = out.last_mut() {
            *last |= 0x80;
        }
        out.push((size & 0x7f) as u8);
        size >>= 7;
    }

    out
}

fn ofs_distance(mut distance: u64) -> Vec<u8> {
    let mut out = vec![(distance & 0x7f) as u8];
    distance >>= 7;

    while distance > 0 {
        distance -= 1;
        out.push(0x80 | (distance & 0x7f) as u8);
        distance >>= 7;
    }

    out.reverse();
    out
}
