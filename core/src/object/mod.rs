//! Represents the git concept of an "object" which is a tuple of
//! object type and binary data identified by the hash of the binary data.

use crate::repo::{Error, Result};

mod attribution;
pub use attribution::Attribution;

mod commit;
pub use commit::{build_commit, Commit};

mod id;
pub use id::{Id, ParseIdError};

mod kind;
pub use kind::Kind;

pub(crate) mod parse_utils;

mod tag;
pub use tag::tag_is_valid;

pub mod tree;
pub use tree::TreeEntry;

/// Kind-specific content of an [`Object`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Body {
    Blob(Vec<u8>),
    Commit(Vec<u8>),
    Tag(Vec<u8>),

    /// `entries` are in stored order; `raw` is the encoded payload they
    /// were decoded from (or encoded to).
    Tree { entries: Vec<TreeEntry>, raw: Vec<u8> },
}

/// Describes a single object stored (or about to be stored) in a git repository.
///
/// The ID is always the digest of the object's canonical encoding; it is
/// computed on construction and cannot be changed afterwards.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Object {
    id: Id,
    body: Body,
}

impl Object {
    /// Create an object of the given kind from its uncompressed payload.
    ///
    /// Tree payloads are decoded (and thereby validated) immediately.
    pub fn new(kind: Kind, payload: Vec<u8>) -> Result<Object> {
        let id = Id::for_object(kind, &payload);

        let body = match kind {
            Kind::Blob => Body::Blob(payload),
            Kind::Commit => Body::Commit(payload),
            Kind::Tag => Body::Tag(payload),
            Kind::Tree => Body::Tree {
                entries: tree::decode_entries(&payload)?,
                raw: payload,
            },
        };

        Ok(Object { id, body })
    }

    /// Create a blob object.
    pub fn blob(data: Vec<u8>) -> Object {
        Object {
            id: Id::for_object(Kind::Blob, &data),
            body: Body::Blob(data),
        }
    }

    /// Create a commit object from an already-serialized payload.
    ///
    /// See [`build_commit`] to serialize one.
    pub fn commit(payload: Vec<u8>) -> Object {
        Object {
            id: Id::for_object(Kind::Commit, &payload),
            body: Body::Commit(payload),
        }
    }

    /// Create a tree object. Entries may be given in any order.
    pub fn tree(mut entries: Vec<TreeEntry>) -> Object {
        tree::sort_entries(&mut entries);
        let raw = tree::encode_entries(&entries);

        Object {
            id: Id::for_object(Kind::Tree, &raw),
            body: Body::Tree { entries, raw },
        }
    }

    /// Decode an object from its uncompressed on-disk form
    /// (`"<kind> <size>\0"` followed by the payload).
    pub fn decode(raw: &[u8]) -> Result<Object> {
        let nul = raw
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| Error::MalformedObject("header has no NUL terminator".to_string()))?;

        let (kind, size) = parse_utils::split_once(&raw[..nul], &b' ');

        let kind = Kind::from_bytes(kind).ok_or_else(|| {
            Error::MalformedObject(format!(
                "unknown object kind `{}`",
                String::from_utf8_lossy(kind)
            ))
        })?;

        // Sizes are canonical decimal: "05" names a different object than "5".
        let canonical = size.len() == 1 || size.first() != Some(&b'0');
        let declared = parse_utils::parse_decimal(size).filter(|_| canonical).ok_or_else(|| {
            Error::MalformedObject(format!(
                "invalid object size `{}`",
                String::from_utf8_lossy(size)
            ))
        })? as usize;

        let payload = &raw[nul + 1..];
        if payload.len() != declared {
            return Err(Error::SizeMismatch {
                declared,
                actual: payload.len(),
            });
        }

        Object::new(kind, payload.to_vec())
    }

    /// Return the canonical uncompressed encoding of this object.
    pub fn encode(&self) -> Vec<u8> {
        let payload = self.payload();
        let header = format!("{} {}\0", self.kind(), payload.len());

        let mut out = Vec::with_capacity(header.len() + payload.len());
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(payload);
        out
    }

    /// Return the ID of the object.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Return the kind of the object.
    pub fn kind(&self) -> Kind {
        match self.body {
            Body::Blob(_) => Kind::Blob,
            Body::Commit(_) => Kind::Commit,
            Body::Tag(_) => Kind::Tag,
            Body::Tree { .. } => Kind::Tree,
        }
    }

    /// Return the size (in bytes) of the object's payload.
    pub fn size(&self) -> usize {
        self.payload().len()
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Return the uncompressed payload (everything after the header).
    pub fn payload(&self) -> &[u8] {
        match &self.body {
            Body::Blob(data) | Body::Commit(data) | Body::Tag(data) => data,
            Body::Tree { raw, .. } => raw,
        }
    }

    /// Return the entries if this is a tree.
    pub fn tree_entries(&self) -> Option<&[TreeEntry]> {
        match &self.body {
            Body::Tree { entries, .. } => Some(entries),
            _ => None,
        }
    }

    /// Consume the object and return its payload.
    pub fn into_payload(self) -> Vec<u8> {
        match self.body {
            Body::Blob(data) | Body::Commit(data) | Body::Tag(data) => data,
            Body::Tree { raw, .. } => raw,
        }
    }

    /// Render the payload the way `cat-file -p` does: trees as one
    /// `<mode> <kind> <id>\t<name>` line per entry, everything else verbatim.
    pub fn pretty(&self) -> Vec<u8> {
        match &self.body {
            Body::Tree { entries, .. } => entries
                .iter()
                .map(|e| format!("{} {} {}\t{}\n", e.mode, e.kind(), e.id, e.name))
                .collect::<String>()
                .into_bytes(),
            _ => self.payload().to_vec(),
        }
    }
}
