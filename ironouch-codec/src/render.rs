/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Helpers for the FIX-style `TAG=VALUE` log rendering.
//!
//! Tokens are separated by ASCII `0x01`. Optional fields are emitted only
//! when present, matching the log surface of the wire messages.

use ironouch_core::types::{Price, Side};
use std::fmt::Display;
use std::fmt::Write as _;

/// The field separator.
pub(crate) const SOH: char = '\u{1}';

/// Appends one `TAG=VALUE` token followed by the separator.
pub(crate) fn put_tag(out: &mut String, tag: &str, value: impl Display) {
    let _ = write!(out, "{tag}={value}{SOH}");
}

/// Appends the side as its FIX digit: `54=1` for buy, `54=2` for sell,
/// `54=5` for sell short, `54=6` for sell short exempt.
pub(crate) fn put_side(out: &mut String, side: Side) {
    put_tag(out, "54", side.fix_digit());
}

/// Appends a price token when the price is non-zero.
pub(crate) fn put_price(out: &mut String, tag: &str, price: Price) {
    if !price.is_zero() {
        put_tag(out, tag, price);
    }
}

/// Appends a single-character token when the byte is not blank.
pub(crate) fn put_char(out: &mut String, tag: &str, byte: u8) {
    if byte != b' ' {
        put_tag(out, tag, byte as char);
    }
}
