/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Checked big-endian field readers and writers.
//!
//! All multi-byte integers are big-endian on the wire. Alpha fields are
//! left-justified and right-padded with ASCII spaces; they decode trimmed.

use arrayvec::ArrayString;
use bytes::{Buf, BufMut, BytesMut};
use ironouch_core::error::{DecodeError, EncodeError};

/// Validates a value into a fixed-width alpha field.
///
/// # Errors
/// Returns `EncodeError::FieldTooLong` when the value exceeds the width.
pub(crate) fn alpha<const N: usize>(
    value: &str,
    field: &'static str,
) -> Result<ArrayString<N>, EncodeError> {
    ArrayString::from(value).map_err(|_| EncodeError::FieldTooLong {
        field,
        length: value.len(),
        max_length: N,
    })
}

/// Writes an alpha field right-padded with spaces to its full width.
pub(crate) fn put_alpha<const N: usize>(dst: &mut BytesMut, value: &ArrayString<N>) {
    dst.put_slice(value.as_bytes());
    for _ in value.len()..N {
        dst.put_u8(b' ');
    }
}

/// Reads an alpha field of width `N`, trimming trailing spaces.
pub(crate) fn get_alpha<const N: usize>(src: &mut &[u8]) -> Result<ArrayString<N>, DecodeError> {
    if src.len() < N {
        return Err(DecodeError::Incomplete);
    }
    let raw = &src[..N];
    if !raw.is_ascii() {
        return Err(DecodeError::InvalidAlpha);
    }
    let trimmed = std::str::from_utf8(raw)
        .map_err(|_| DecodeError::InvalidAlpha)?
        .trim_end_matches(' ');
    src.advance(N);
    Ok(ArrayString::from(trimmed).expect("trimmed alpha fits its declared width"))
}

pub(crate) fn get_u8(src: &mut &[u8]) -> Result<u8, DecodeError> {
    if src.is_empty() {
        return Err(DecodeError::Incomplete);
    }
    Ok(src.get_u8())
}

pub(crate) fn get_u32(src: &mut &[u8]) -> Result<u32, DecodeError> {
    if src.len() < 4 {
        return Err(DecodeError::Incomplete);
    }
    Ok(src.get_u32())
}

pub(crate) fn get_u64(src: &mut &[u8]) -> Result<u64, DecodeError> {
    if src.len() < 8 {
        return Err(DecodeError::Incomplete);
    }
    Ok(src.get_u64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_pads_and_trims() {
        let id: ArrayString<8> = alpha("MSFT", "Symbol").unwrap();
        let mut dst = BytesMut::new();
        put_alpha(&mut dst, &id);
        assert_eq!(&dst[..], b"MSFT    ");

        let mut src: &[u8] = &dst[..];
        let back: ArrayString<8> = get_alpha(&mut src).unwrap();
        assert_eq!(back.as_str(), "MSFT");
        assert!(src.is_empty());
    }

    #[test]
    fn test_alpha_too_long() {
        let err = alpha::<4>("TOOLONG", "Firm").unwrap_err();
        assert!(matches!(err, EncodeError::FieldTooLong { field: "Firm", .. }));
    }

    #[test]
    fn test_get_alpha_rejects_non_ascii() {
        let mut src: &[u8] = &[0xff, b'a', b'b', b'c'];
        assert_eq!(
            get_alpha::<4>(&mut src).unwrap_err(),
            DecodeError::InvalidAlpha
        );
    }

    #[test]
    fn test_short_reads_are_incomplete() {
        let mut src: &[u8] = &[1, 2];
        assert_eq!(get_u32(&mut src).unwrap_err(), DecodeError::Incomplete);
        let mut src: &[u8] = &[1, 2, 3, 4];
        assert_eq!(get_u64(&mut src).unwrap_err(), DecodeError::Incomplete);
        let mut src: &[u8] = &[];
        assert_eq!(get_u8(&mut src).unwrap_err(), DecodeError::Incomplete);
    }

    #[test]
    fn test_big_endian_integers() {
        let mut src: &[u8] = &[0x00, 0x01, 0xe2, 0x40];
        assert_eq!(get_u32(&mut src).unwrap(), 123_456);
    }
}
