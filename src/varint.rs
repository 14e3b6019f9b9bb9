//! Variable-length integer codec and fixed-width read helpers
//!
//! Layout: one prefix byte; values below 0xfd are the byte itself,
//! 0xfd/0xfe/0xff announce a 2/4/8 byte little-endian value.

use std::io::{ErrorKind, Read};

use crate::error::{Result, WireError};
use crate::types::{ByteString, Hash};

/// ReadVarInt: 𝕊 → ℕ × 𝔹*
///
/// Returns the decoded value and the exact bytes consumed. Only the
/// narrowest form is accepted, so the raw bytes always equal `write_varint(value)`.
pub fn read_varint<R: Read>(reader: &mut R) -> Result<(u64, ByteString)> {
    let prefix = read_u8(reader, "varint prefix")?;
    let width = match prefix {
        0xfd => 2,
        0xfe => 4,
        0xff => 8,
        _ => return Ok((prefix as u64, vec![prefix])),
    };

    let body = read_bytes(reader, width, "varint body")?;
    let mut le = [0u8; 8];
    le[..width].copy_from_slice(&body);
    let value = u64::from_le_bytes(le);

    if varint_len(value) != 1 + width {
        return Err(WireError::InvalidLength {
            field: "varint",
            expected: varint_len(value),
            actual: 1 + width,
        });
    }

    let mut raw = Vec::with_capacity(1 + width);
    raw.push(prefix);
    raw.extend_from_slice(&body);
    Ok((value, raw))
}

/// WriteVarInt: ℕ → 𝔹*
///
/// Always picks the narrowest form.
pub fn write_varint(value: u64) -> ByteString {
    let mut out = Vec::with_capacity(varint_len(value));
    encode_varint_into(value, &mut out);
    out
}

/// Append the canonical encoding of `value` to `out`
pub fn encode_varint_into(value: u64, out: &mut Vec<u8>) {
    if value < 0xfd {
        out.push(value as u8);
    } else if value <= 0xffff {
        out.push(0xfd);
        out.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= 0xffff_ffff {
        out.push(0xfe);
        out.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        out.push(0xff);
        out.extend_from_slice(&value.to_le_bytes());
    }
}

/// Encoded size of `value` in bytes
pub fn varint_len(value: u64) -> usize {
    match value {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

// ============================================================================
// FIXED-WIDTH READ HELPERS
// ============================================================================

pub(crate) fn read_array<const N: usize, R: Read>(reader: &mut R, field: &'static str) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf).map_err(|e| eof_to_truncated(e, N, field))?;
    Ok(buf)
}

pub(crate) fn read_bytes<R: Read>(reader: &mut R, len: usize, field: &'static str) -> Result<ByteString> {
    // Grow incrementally so a bogus length cannot force a huge allocation.
    let mut buf = Vec::new();
    let read = reader
        .by_ref()
        .take(len as u64)
        .read_to_end(&mut buf)
        .map_err(|e| eof_to_truncated(e, len, field))?;
    if read < len {
        return Err(WireError::TruncatedInput { needed: len, field });
    }
    Ok(buf)
}

pub(crate) fn read_u8<R: Read>(reader: &mut R, field: &'static str) -> Result<u8> {
    Ok(read_array::<1, _>(reader, field)?[0])
}

pub(crate) fn read_u32<R: Read>(reader: &mut R, field: &'static str) -> Result<u32> {
    Ok(u32::from_le_bytes(read_array(reader, field)?))
}

pub(crate) fn read_u64<R: Read>(reader: &mut R, field: &'static str) -> Result<u64> {
    Ok(u64::from_le_bytes(read_array(reader, field)?))
}

pub(crate) fn read_hash<R: Read>(reader: &mut R, field: &'static str) -> Result<Hash> {
    read_array(reader, field)
}

/// Read a VarInt length followed by that many bytes
pub(crate) fn read_var_bytes<R: Read>(reader: &mut R, field: &'static str) -> Result<ByteString> {
    let (len, _) = read_varint(reader)?;
    let len = usize::try_from(len).map_err(|_| WireError::TruncatedInput { needed: usize::MAX, field })?;
    read_bytes(reader, len, field)
}

/// Append a VarInt length followed by `data`
pub(crate) fn write_var_bytes(data: &[u8], out: &mut Vec<u8>) {
    encode_varint_into(data.len() as u64, out);
    out.extend_from_slice(data);
}

fn eof_to_truncated(err: std::io::Error, needed: usize, field: &'static str) -> WireError {
    match err.kind() {
        ErrorKind::UnexpectedEof => WireError::TruncatedInput { needed, field },
        _ => WireError::Io(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_write_varint_boundaries() {
        assert_eq!(write_varint(0), vec![0x00]);
        assert_eq!(write_varint(0xfc), vec![0xfc]);
        assert_eq!(write_varint(0xfd), vec![0xfd, 0xfd, 0x00]);
        assert_eq!(write_varint(0xffff), vec![0xfd, 0xff, 0xff]);
        assert_eq!(write_varint(0x10000), vec![0xfe, 0x00, 0x00, 0x01, 0x00]);
        assert_eq!(write_varint(0x1_0000_0000), vec![0xff, 0, 0, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_read_varint_returns_raw_bytes() {
        let mut cursor = Cursor::new(vec![0xfe, 0x01, 0x02, 0x03, 0x04, 0xaa]);
        let (value, raw) = read_varint(&mut cursor).unwrap();
        assert_eq!(value, 0x04030201);
        assert_eq!(raw, vec![0xfe, 0x01, 0x02, 0x03, 0x04]);
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn test_read_varint_rejects_wide_forms() {
        for raw in [
            vec![0xfd, 0x05, 0x00],
            vec![0xfe, 0xff, 0xff, 0x00, 0x00],
            vec![0xff, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        ] {
            let result = read_varint(&mut Cursor::new(raw));
            assert!(matches!(result, Err(WireError::InvalidLength { field: "varint", .. })));
        }
    }

    #[test]
    fn test_read_varint_truncated() {
        let mut cursor = Cursor::new(vec![0xff, 0x01, 0x02]);
        let result = read_varint(&mut cursor);
        assert!(matches!(result, Err(WireError::TruncatedInput { needed: 8, .. })));
    }

    #[test]
    fn test_read_varint_empty_stream() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        assert!(matches!(read_varint(&mut cursor), Err(WireError::TruncatedInput { .. })));
    }

    #[test]
    fn test_varint_len_matches_encoding() {
        for v in [0u64, 0xfc, 0xfd, 0xffff, 0x10000, 0xffff_ffff, u64::MAX] {
            assert_eq!(varint_len(v), write_varint(v).len());
        }
    }

    #[test]
    fn test_read_bytes_short() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3]);
        let result = read_bytes(&mut cursor, 4, "payload");
        assert!(matches!(result, Err(WireError::TruncatedInput { needed: 4, field: "payload" })));
    }
}
