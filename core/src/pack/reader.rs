use std::collections::{BTreeMap, HashMap};

use log::{debug, trace};

use super::cursor::Cursor;
use super::delta::apply_delta;
use super::index::PackIndex;
use crate::codec;
use crate::object::{Id, Kind, Object};
use crate::repo::{Error, Result};

const OBJ_COMMIT: u8 = 1;
const OBJ_TREE: u8 = 2;
const OBJ_BLOB: u8 = 3;
const OBJ_TAG: u8 = 4;
const OBJ_OFS_DELTA: u8 = 6;
const OBJ_REF_DELTA: u8 = 7;

/// An entry stored whole in the pack.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NormalEntry {
    pub kind: Kind,
    pub id: Id,
    pub data: Vec<u8>,
    pub offset: u64,
    pub size_in_pack: u64,
}

/// An entry stored as an offset delta against an earlier entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeltaEntry {
    /// Kind of the object at the root of the delta chain.
    pub kind: Kind,
    pub id: Id,

    /// Fully materialized content.
    pub data: Vec<u8>,

    pub offset: u64,
    pub size_in_pack: u64,

    /// Position of the base in [`Pack::entries`].
    pub base: usize,
    pub base_offset: u64,
    pub base_id: Id,

    /// Number of deltas between this entry and a whole object (at least 1).
    pub depth: usize,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PackEntry {
    Normal(NormalEntry),
    Delta(DeltaEntry),
}

impl PackEntry {
    pub fn id(&self) -> Id {
        match self {
            PackEntry::Normal(e) => e.id,
            PackEntry::Delta(e) => e.id,
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            PackEntry::Normal(e) => e.kind,
            PackEntry::Delta(e) => e.kind,
        }
    }

    pub fn data(&self) -> &[u8] {
        match self {
            PackEntry::Normal(e) => &e.data,
            PackEntry::Delta(e) => &e.data,
        }
    }

    /// Uncompressed size of the object.
    pub fn size(&self) -> usize {
        self.data().len()
    }

    pub fn offset(&self) -> u64 {
        match self {
            PackEntry::Normal(e) => e.offset,
            PackEntry::Delta(e) => e.offset,
        }
    }

    pub fn size_in_pack(&self) -> u64 {
        match self {
            PackEntry::Normal(e) => e.size_in_pack,
            PackEntry::Delta(e) => e.size_in_pack,
        }
    }

    /// 0 for whole objects.
    pub fn depth(&self) -> usize {
        match self {
            PackEntry::Normal(_) => 0,
            PackEntry::Delta(e) => e.depth,
        }
    }

    pub fn base_id(&self) -> Option<Id> {
        match self {
            PackEntry::Normal(_) => None,
            PackEntry::Delta(e) => Some(e.base_id),
        }
    }

    /// Convert to a standalone object.
    pub fn to_object(&self) -> Result<Object> {
        Object::new(self.kind(), self.data().to_vec())
    }
}

/// Every object in one pack file, materialized.
#[derive(Clone, Debug)]
pub struct Pack {
    /// In ascending offset order.
    entries: Vec<PackEntry>,
    by_id: HashMap<Id, usize>,

    checksum: Id,
    actual_checksum: Id,
}

impl Pack {
    /// Parse a version 2 pack using the offsets listed in its index.
    ///
    /// Entries are processed in ascending offset order so that every offset
    /// delta finds its base already materialized.
    pub fn parse(data: &[u8], index: &PackIndex) -> Result<Pack> {
        if data.len() < 12 + 20 {
            return Err(invalid("file too short"));
        }

        let mut c = Cursor::new(data);
        if c.take(4)? != b"PACK" {
            return Err(invalid("missing PACK signature"));
        }

        let version = c.read_u32_be()?;
        if version != 2 {
            return Err(Error::UnsupportedVersion {
                what: "pack",
                version,
            });
        }

        let count = c.read_u32_be()? as usize;
        if count != index.len() {
            return Err(invalid(&format!(
                "pack holds {} objects but its index lists {}",
                count,
                index.len()
            )));
        }

        let trailer = data.len() - 20;
        let checksum = Id::new(&data[trailer..])?;
        let actual_checksum = Id::hash_of(&data[..trailer]);

        let mut rows: Vec<(u64, Id)> = index.entries().iter().map(|e| (e.offset, e.id)).collect();
        rows.sort();

        let mut entries: Vec<PackEntry> = Vec::with_capacity(count);
        let mut by_offset: HashMap<u64, usize> = HashMap::with_capacity(count);
        let mut by_id: HashMap<Id, usize> = HashMap::with_capacity(count);

        for (i, (offset, expected_id)) in rows.iter().enumerate() {
            let start = *offset as usize;
            let end = match rows.get(i + 1) {
                Some((next, _)) => *next as usize,
                None => trailer,
            };

            if start < 12 || start >= end || end > trailer {
                return Err(invalid(&format!("entry offset {} is out of range", offset)));
            }

            let entry = parse_entry(&data[start..end], *offset, *expected_id, &entries, &by_offset)?;

            trace!(
                "pack entry {} {} at {} (size {}, depth {})",
                entry.id(),
                entry.kind(),
                offset,
                entry.size(),
                entry.depth()
            );

            by_offset.insert(*offset, entries.len());
            by_id.insert(entry.id(), entries.len());
            entries.push(entry);
        }

        debug!("parsed pack with {} objects", entries.len());

        Ok(Pack {
            entries,
            by_id,
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

    /// All entries in ascending offset order.
    pub fn entries(&self) -> &[PackEntry] {
        &self.entries
    }

    pub fn find(&self, id: &Id) -> Option<&PackEntry> {
        self.by_id.get(id).map(|i| &self.entries[*i])
    }

    /// Returns the base entry of a delta.
    pub fn base_of(&self, entry: &PackEntry) -> Option<&PackEntry> {
        match entry {
            PackEntry::Normal(_) => None,
            PackEntry::Delta(d) => self.entries.get(d.base),
        }
    }

    /// Look up an object by ID and materialize it.
    pub fn object(&self, id: &Id) -> Result<Option<Object>> {
        self.find(id).map(PackEntry::to_object).transpose()
    }

    pub fn non_delta_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, PackEntry::Normal(_)))
            .count()
    }

    /// Number of delta entries at each chain depth.
    pub fn chain_length_histogram(&self) -> BTreeMap<usize, usize> {
        let mut histogram = BTreeMap::new();
        for entry in &self.entries {
            if let PackEntry::Delta(d) = entry {
                *histogram.entry(d.depth).or_insert(0) += 1;
            }
        }
        histogram
    }

    pub fn checksum(&self) -> Id {
        self.checksum
    }

    /// Check the trailing digest over the rest of the pack file.
    pub fn verify_checksum(&self) -> Result<()> {
        if self.checksum == self.actual_checksum {
            Ok(())
        } else {
            Err(Error::PackChecksum {
                what: "pack",
                expected: self.checksum,
                actual: self.actual_checksum,
            })
        }
    }
}

fn parse_entry(
    raw: &[u8],
    offset: u64,
    expected_id: Id,
    entries: &[PackEntry],
    by_offset: &HashMap<u64, usize>,
) -> Result<PackEntry> {
    let mut c = Cursor::new(raw);
    let (type_bits, size) = c.read_entry_header()?;
    let size = size as usize;
    let size_in_pack = raw.len() as u64;

    let kind = match type_bits {
        OBJ_COMMIT => Some(Kind::Commit),
        OBJ_TREE => Some(Kind::Tree),
        OBJ_BLOB => Some(Kind::Blob),
        OBJ_TAG => Some(Kind::Tag),
        OBJ_OFS_DELTA => None,
        OBJ_REF_DELTA => return Err(Error::UnsupportedDeltaKind("ref-delta")),
        n => {
            return Err(Error::MalformedObject(format!(
                "pack entry at {} has invalid type {}",
                offset, n
            )))
        }
    };

    let entry = match kind {
        Some(kind) => {
            let data = inflate(c.remaining(), size)?;
            let id = Id::for_object(kind, &data);
            PackEntry::Normal(NormalEntry {
                kind,
                id,
                data,
                offset,
                size_in_pack,
            })
        }

        None => {
            let distance = c.read_ofs_distance()?;
            let base_offset = offset.checked_sub(distance).filter(|_| distance > 0);

            let base = base_offset
                .and_then(|b| by_offset.get(&b))
                .map(|i| (*i, &entries[*i]))
                .ok_or_else(|| Error::DeltaBaseNotFound {
                    offset,
                    base_offset: base_offset.unwrap_or(0),
                })?;

            let delta = inflate(c.remaining(), size)?;
            let data = apply_delta(base.1.data(), &delta)?;
            let kind = base.1.kind();
            let id = Id::for_object(kind, &data);

            PackEntry::Delta(DeltaEntry {
                kind,
                id,
                data,
                offset,
                size_in_pack,
                base: base.0,
                base_offset: base.1.offset(),
                base_id: base.1.id(),
                depth: base.1.depth() + 1,
            })
        }
    };

    if entry.id() != expected_id {
        return Err(Error::Integrity {
            expected: expected_id,
            actual: entry.id(),
        });
    }

    Ok(entry)
}

fn inflate(compressed: &[u8], declared: usize) -> Result<Vec<u8>> {
    let data = codec::decompress(compressed)?;
    if data.len() != declared {
        return Err(Error::SizeMismatch {
            declared,
            actual: data.len(),
        });
    }
    Ok(data)
}

fn invalid(detail: &str) -> Error {
    Error::InvalidHeader {
        what: "pack",
        detail: detail.to_string(),
    }
}
