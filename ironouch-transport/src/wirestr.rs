/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Space-padded ASCII fields for the logon packet bodies.

use arrayvec::ArrayString;
use bytes::{Buf, BufMut, BytesMut};
use ironouch_core::error::DecodeError;

/// Writes a field right-padded with spaces to its full width.
pub(crate) fn put_padded<const N: usize>(dst: &mut BytesMut, value: &ArrayString<N>) {
    dst.put_slice(value.as_bytes());
    for _ in value.len()..N {
        dst.put_u8(b' ');
    }
}

/// Reads a field of width `N`, trimming trailing spaces.
pub(crate) fn get_padded<const N: usize>(src: &mut &[u8]) -> Result<ArrayString<N>, DecodeError> {
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
    Ok(ArrayString::from(trimmed).expect("trimmed field fits its declared width"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_round_trip() {
        let value: ArrayString<10> = ArrayString::from("xxx").unwrap();
        let mut dst = BytesMut::new();
        put_padded(&mut dst, &value);
        assert_eq!(&dst[..], b"xxx       ");

        let mut src: &[u8] = &dst[..];
        let back: ArrayString<10> = get_padded(&mut src).unwrap();
        assert_eq!(back.as_str(), "xxx");
    }
}
