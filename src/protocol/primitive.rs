use zerocopy::byteorder::little_endian::U16 as U16LE;
use zerocopy::FromBytes;

use crate::constant::{LCS_NULL, LCS_U16, LCS_U24, LCS_U64};
use crate::error::{Error, Result};

/// Read 1-byte integer
pub fn read_int_1(data: &[u8]) -> Result<(u8, &[u8])> {
    if data.is_empty() {
        return Err(Error::InvalidPacket);
    }
    Ok((data[0], &data[1..]))
}

/// Read 2-byte little-endian integer
pub fn read_int_2(data: &[u8]) -> Result<(u16, &[u8])> {
    if data.len() < 2 {
        return Err(Error::InvalidPacket);
    }
    let value = U16LE::ref_from_bytes(&data[..2])
        .map_err(|_| Error::InvalidPacket)?
        .get();
    Ok((value, &data[2..]))
}

/// Read fixed-length string
pub fn read_string_fix(data: &[u8], len: usize) -> Result<(&[u8], &[u8])> {
    if data.len() < len {
        return Err(Error::InvalidPacket);
    }
    Ok((&data[..len], &data[len..]))
}

/// Read the length-encoded integer prefix of a row cell.
///
/// Permissive by design: 0xFB and any truncated 0xFC/0xFD/0xFE prefix
/// decode as NULL rather than an error. Returns `(value, is_null, rest)`.
pub fn read_lenenc_int(data: &[u8]) -> (u64, bool, &[u8]) {
    let Some((&c, rest)) = data.split_first() else {
        return (0, true, data);
    };

    match c {
        LCS_NULL => (0, true, rest),
        c if c < LCS_NULL => (c as u64, false, rest),
        LCS_U16 => {
            if rest.len() < 2 {
                return (0, true, rest);
            }
            let value = u16::from_le_bytes([rest[0], rest[1]]) as u64;
            (value, false, &rest[2..])
        }
        LCS_U24 => {
            if rest.len() < 3 {
                return (0, true, rest);
            }
            let value = u32::from_le_bytes([rest[0], rest[1], rest[2], 0]) as u64;
            (value, false, &rest[3..])
        }
        LCS_U64 => {
            if rest.len() < 8 {
                return (0, true, rest);
            }
            let value = u64::from_le_bytes(rest[..8].try_into().unwrap());
            (value, false, &rest[8..])
        }
        _ => (0, true, rest),
    }
}

/// Read one length-coded string cell.
///
/// A declared length past the end of the payload is clamped to the
/// remaining bytes rather than treated as an error. Returns
/// `(cell, is_null, rest)`.
pub fn read_lenenc_str(data: &[u8]) -> (&[u8], bool, &[u8]) {
    let (length, is_null, rest) = read_lenenc_int(data);
    if is_null {
        return (&[], true, rest);
    }

    let length = (length as usize).min(rest.len());
    (&rest[..length], false, &rest[length..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenenc_int_short_form() {
        let (value, is_null, rest) = read_lenenc_int(&[0x05, 0xAA]);
        assert_eq!((value, is_null), (5, false));
        assert_eq!(rest, &[0xAA]);

        let (value, is_null, _) = read_lenenc_int(&[0xFA]);
        assert_eq!((value, is_null), (250, false));
    }

    #[test]
    fn lenenc_int_null_marker() {
        let (value, is_null, rest) = read_lenenc_int(&[0xFB, 0x01]);
        assert_eq!((value, is_null), (0, true));
        assert_eq!(rest, &[0x01]);
    }

    #[test]
    fn lenenc_int_wide_forms() {
        let (value, is_null, _) = read_lenenc_int(&[0xFC, 0xFF, 0xFF]);
        assert_eq!((value, is_null), (0xFFFF, false));

        let (value, is_null, _) = read_lenenc_int(&[0xFD, 0x00, 0x00, 0x01]);
        assert_eq!((value, is_null), (0x10000, false));

        let (value, is_null, _) =
            read_lenenc_int(&[0xFE, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!((value, is_null), (0x1000000, false));
    }

    #[test]
    fn lenenc_int_truncated_prefix_is_null() {
        for data in [&[0xFC, 0x01][..], &[0xFD, 0x01, 0x02][..], &[0xFE][..]] {
            let (value, is_null, _) = read_lenenc_int(data);
            assert_eq!((value, is_null), (0, true), "{data:?}");
        }
        let (_, is_null, _) = read_lenenc_int(&[]);
        assert!(is_null);
    }

    #[test]
    fn lenenc_str_clamps_overlong_length() {
        // Declares 16 bytes but only 3 remain
        let data = [0x10, b'a', b'b', b'c'];
        let (cell, is_null, rest) = read_lenenc_str(&data);
        assert!(!is_null);
        assert_eq!(cell, b"abc");
        assert!(rest.is_empty());
    }

    #[test]
    fn lenenc_str_boundary_lengths() {
        for len in [0usize, 1, 250] {
            let mut data = vec![len as u8];
            data.extend(std::iter::repeat(b'x').take(len));
            let (cell, is_null, rest) = read_lenenc_str(&data);
            assert!(!is_null);
            assert_eq!(cell.len(), len);
            assert!(rest.is_empty());
        }

        // 251 cannot be encoded in the short form
        let mut data = vec![0xFC, 251, 0];
        data.extend(std::iter::repeat(b'x').take(251));
        let (cell, is_null, _) = read_lenenc_str(&data);
        assert!(!is_null);
        assert_eq!(cell.len(), 251);
    }
}
