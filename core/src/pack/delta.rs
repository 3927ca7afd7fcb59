use super::cursor::Cursor;
use crate::repo::{Error, Result};

/// Apply a git delta instruction stream to `base`, returning the target.
///
/// The stream starts with the source and target sizes (base-128,
/// little-endian) followed by copy and insert instructions.
pub fn apply_delta(base: &[u8], delta: &[u8]) -> Result<Vec<u8>> {
    let mut c = Cursor::new(delta);

    let source_size = c.read_varint()? as usize;
    if source_size != base.len() {
        return Err(malformed(format!(
            "delta expects a {}-byte base but base has {} bytes",
            source_size,
            base.len()
        )));
    }

    let target_size = c.read_varint()? as usize;
    let mut result = Vec::with_capacity(target_size);

    while !c.is_empty() {
        let op = c.read_u8()?;

        if op & 0x80 != 0 {
            let mut offset = 0usize;
            for i in 0..4 {
                if op & (1 << i) != 0 {
                    offset |= usize::from(c.read_u8()?) << (8 * i);
                }
            }

            let mut size = 0usize;
            for i in 0..3 {
                if op & (0x10 << i) != 0 {
                    size |= usize::from(c.read_u8()?) << (8 * i);
                }
            }
            if size == 0 {
                size = 0x10000;
            }

            let end = offset
                .checked_add(size)
                .filter(|end| *end <= base.len())
                .ok_or_else(|| {
                    malformed(format!(
                        "delta copies {} bytes at {} from a {}-byte base",
                        size,
                        offset,
                        base.len()
                    ))
                })?;
            result.extend_from_slice(&base[offset..end]);
        } else if op != 0 {
            result.extend_from_slice(c.take(usize::from(op))?);
        } else {
            return Err(malformed("delta contains reserved opcode 0".to_string()));
        }
    }

    if result.len() != target_size {
        return Err(malformed(format!(
            "delta produced {} bytes but declares {}",
            result.len(),
            target_size
        )));
    }

    Ok(result)
}

fn malformed(detail: String) -> Error {
    Error::MalformedObject(detail)
}
