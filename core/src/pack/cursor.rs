use crate::repo::{Error, Result};

/// Forward-only reader over a borrowed byte slice.
///
/// Every read is bounds-checked; running off the end is reported as
/// a malformed object rather than a panic.
pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Cursor<'a> {
        Cursor { data, pos: 0 }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Returns everything not yet consumed without advancing.
    pub(crate) fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        let b = *self.data.get(self.pos).ok_or_else(truncated)?;
        self.pos += 1;
        Ok(b)
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or_else(truncated)?;
        let s = self.data.get(self.pos..end).ok_or_else(truncated)?;
        self.pos = end;
        Ok(s)
    }

    pub(crate) fn read_u32_be(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reads a pack entry header: the type from bits 4-6 of the first byte,
    /// the size from its low nibble followed by 7-bit little-endian groups.
    pub(crate) fn read_entry_header(&mut self) -> Result<(u8, u64)> {
        let first = self.read_u8()?;
        let type_bits = (first >> 4) & 0x07;

        let mut size = u64::from(first & 0x0f);
        let mut shift = 4;
        let mut byte = first;

        while byte & 0x80 != 0 {
            byte = self.read_u8()?;
            if shift > 57 {
                return Err(overflow());
            }
            size |= u64::from(byte & 0x7f) << shift;
            shift += 7;
        }

        Ok((type_bits, size))
    }

    /// Reads the backward distance of an offset delta. This is big-endian
    /// and biased: each continuation adds one before shifting.
    pub(crate) fn read_ofs_distance(&mut self) -> Result<u64> {
        let mut byte = self.read_u8()?;
        let mut value = u64::from(byte & 0x7f);

        while byte & 0x80 != 0 {
            byte = self.read_u8()?;
            if value >= 1 << 56 {
                return Err(overflow());
            }
            value = ((value + 1) << 7) | u64::from(byte & 0x7f);
        }

        Ok(value)
    }

    /// Reads a little-endian base-128 size, as found at the start of a
    /// delta instruction stream.
    pub(crate) fn read_varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        let mut shift = 0;

        loop {
            let byte = self.read_u8()?;
            if shift > 63 {
                return Err(overflow());
            }
            value |= u64::from(byte & 0x7f) << shift;
            shift += 7;

            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
    }
}

fn truncated() -> Error {
    Error::MalformedObject("unexpected end of data".to_string())
}

fn overflow() -> Error {
    Error::MalformedObject("variable-length integer overflows 64 bits".to_string())
}
