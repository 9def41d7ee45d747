/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Outbound OUCH 4.2 messages (participant to market).
//!
//! Layouts are fixed and exact; every multi-byte integer is big-endian on
//! the wire. Constructors fill the defaults the venue expects: market-hours
//! time in force, agency capacity, no sweep, no cross.

use crate::render::{put_char, put_price, put_side, put_tag};
use crate::wire::{alpha, get_alpha, get_u8, get_u32, put_alpha};
use arrayvec::ArrayString;
use bytes::{BufMut, BytesMut};
use ironouch_core::error::{DecodeError, EncodeError};
use ironouch_core::types::{Price, Side, TIF_MARKET_HOURS};

/// Enter-order message, tag `'O'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderMsg {
    /// Client order identifier, up to 14 ASCII bytes.
    pub id: ArrayString<14>,
    /// Order side.
    pub side: Side,
    /// Share quantity.
    pub shares: u32,
    /// Symbol, up to 8 ASCII bytes.
    pub symbol: ArrayString<8>,
    /// Limit price, four implicit decimals.
    pub price: Price,
    /// Time in force in seconds; 99998 until market close, 99999 end of day.
    pub tif: u32,
    /// Firm identifier, up to 4 ASCII bytes, blank when unset.
    pub firm: ArrayString<4>,
    /// Display instruction.
    pub display: u8,
    /// Capacity.
    pub capacity: u8,
    /// Intermarket sweep eligibility, `'Y'` or `'N'`.
    pub sweep: u8,
    /// Minimum acceptable quantity.
    pub min_qty: u32,
    /// Cross type.
    pub cross: u8,
}

impl OrderMsg {
    /// Wire type tag.
    pub const TAG: u8 = b'O';
    /// Exact framed size including the tag byte.
    pub const WIRE_SIZE: usize = 1 + 14 + 1 + 4 + 8 + 4 + 4 + 4 + 1 + 1 + 1 + 4 + 1;

    /// Creates an order with venue defaults for the optional fields.
    ///
    /// # Errors
    /// Returns `EncodeError::FieldTooLong` when `id` or `symbol` exceed
    /// their wire widths.
    pub fn new(
        id: &str,
        side: Side,
        shares: u32,
        symbol: &str,
        price: Price,
    ) -> Result<Self, EncodeError> {
        Ok(Self {
            id: alpha(id, "ClOrdId")?,
            side,
            shares,
            symbol: alpha(symbol, "Symbol")?,
            price,
            tif: TIF_MARKET_HOURS,
            firm: ArrayString::new(),
            display: b' ',
            capacity: b'A',
            sweep: b'N',
            min_qty: 0,
            cross: b'N',
        })
    }

    pub(crate) fn encode_body(&self, dst: &mut BytesMut) {
        put_alpha(dst, &self.id);
        dst.put_u8(self.side.as_wire());
        dst.put_u32(self.shares);
        put_alpha(dst, &self.symbol);
        dst.put_u32(self.price.raw());
        dst.put_u32(self.tif);
        put_alpha(dst, &self.firm);
        dst.put_u8(self.display);
        dst.put_u8(self.capacity);
        dst.put_u8(self.sweep);
        dst.put_u32(self.min_qty);
        dst.put_u8(self.cross);
    }

    pub(crate) fn decode_body(mut body: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            id: get_alpha(&mut body)?,
            side: Side::from_wire(get_u8(&mut body)?)?,
            shares: get_u32(&mut body)?,
            symbol: get_alpha(&mut body)?,
            price: Price::from_raw(get_u32(&mut body)?),
            tif: get_u32(&mut body)?,
            firm: get_alpha(&mut body)?,
            display: get_u8(&mut body)?,
            capacity: get_u8(&mut body)?,
            sweep: get_u8(&mut body)?,
            min_qty: get_u32(&mut body)?,
            cross: get_u8(&mut body)?,
        })
    }

    pub(crate) fn render(&self, out: &mut String) {
        put_tag(out, "35", 'D');
        put_tag(out, "11", &self.id);
        put_side(out, self.side);
        put_tag(out, "38", self.shares);
        put_tag(out, "55", &self.symbol);
        put_price(out, "44", self.price);
        put_tag(out, "59", self.tif);
        if !self.firm.is_empty() {
            put_tag(out, "49", &self.firm);
        }
        put_char(out, "9140", self.display);
        put_char(out, "47", self.capacity);
        if self.sweep == b'Y' {
            put_tag(out, "18", 'f');
        }
        if self.min_qty > 0 {
            put_tag(out, "110", self.min_qty);
        }
        put_char(out, "9355", self.cross);
    }
}

const _: () = assert!(OrderMsg::WIRE_SIZE == 48);

/// Replace-order message, tag `'U'`.
///
/// Shares the tag byte with the inbound [`crate::inbound::ReplacedMsg`]; the
/// two are told apart by body length (47 against 80).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceMsg {
    /// Client order identifier being replaced.
    pub old_id: ArrayString<14>,
    /// New client order identifier.
    pub new_id: ArrayString<14>,
    /// New share quantity.
    pub shares: u32,
    /// New limit price.
    pub price: Price,
    /// Time in force in seconds.
    pub tif: u32,
    /// Display instruction.
    pub display: u8,
    /// Intermarket sweep eligibility.
    pub sweep: u8,
    /// Minimum acceptable quantity.
    pub min_qty: u32,
}

impl ReplaceMsg {
    /// Wire type tag.
    pub const TAG: u8 = b'U';
    /// Exact framed size including the tag byte.
    pub const WIRE_SIZE: usize = 1 + 14 + 14 + 4 + 4 + 4 + 1 + 1 + 4;

    /// Creates a replace request with venue defaults for the optional fields.
    ///
    /// # Errors
    /// Returns `EncodeError::FieldTooLong` when an identifier exceeds its
    /// wire width.
    pub fn new(old_id: &str, new_id: &str, shares: u32, price: Price) -> Result<Self, EncodeError> {
        Ok(Self {
            old_id: alpha(old_id, "OrigClOrdId")?,
            new_id: alpha(new_id, "ClOrdId")?,
            shares,
            price,
            tif: TIF_MARKET_HOURS,
            display: b' ',
            sweep: b'N',
            min_qty: 0,
        })
    }

    pub(crate) fn encode_body(&self, dst: &mut BytesMut) {
        put_alpha(dst, &self.old_id);
        put_alpha(dst, &self.new_id);
        dst.put_u32(self.shares);
        dst.put_u32(self.price.raw());
        dst.put_u32(self.tif);
        dst.put_u8(self.display);
        dst.put_u8(self.sweep);
        dst.put_u32(self.min_qty);
    }

    pub(crate) fn decode_body(mut body: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            old_id: get_alpha(&mut body)?,
            new_id: get_alpha(&mut body)?,
            shares: get_u32(&mut body)?,
            price: Price::from_raw(get_u32(&mut body)?),
            tif: get_u32(&mut body)?,
            display: get_u8(&mut body)?,
            sweep: get_u8(&mut body)?,
            min_qty: get_u32(&mut body)?,
        })
    }

    pub(crate) fn render(&self, out: &mut String) {
        put_tag(out, "35", 'G');
        put_tag(out, "41", &self.old_id);
        put_tag(out, "11", &self.new_id);
        put_tag(out, "38", self.shares);
        put_price(out, "44", self.price);
        put_tag(out, "59", self.tif);
        put_char(out, "9140", self.display);
        if self.sweep == b'Y' {
            put_tag(out, "18", 'f');
        }
        if self.min_qty > 0 {
            put_tag(out, "110", self.min_qty);
        }
    }
}

const _: () = assert!(ReplaceMsg::WIRE_SIZE == 47);

/// Cancel-order message, tag `'X'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelMsg {
    /// Client order identifier to cancel.
    pub id: ArrayString<14>,
    /// Shares to cancel down to; zero cancels the whole order.
    pub shares: u32,
}

impl CancelMsg {
    /// Wire type tag.
    pub const TAG: u8 = b'X';
    /// Exact framed size including the tag byte.
    pub const WIRE_SIZE: usize = 1 + 14 + 4;

    /// Creates a full cancel for the given order.
    ///
    /// # Errors
    /// Returns `EncodeError::FieldTooLong` when `id` exceeds 14 bytes.
    pub fn new(id: &str) -> Result<Self, EncodeError> {
        Ok(Self {
            id: alpha(id, "ClOrdId")?,
            shares: 0,
        })
    }

    pub(crate) fn encode_body(&self, dst: &mut BytesMut) {
        put_alpha(dst, &self.id);
        dst.put_u32(self.shares);
    }

    pub(crate) fn decode_body(mut body: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            id: get_alpha(&mut body)?,
            shares: get_u32(&mut body)?,
        })
    }

    pub(crate) fn render(&self, out: &mut String) {
        put_tag(out, "35", 'F');
        put_tag(out, "11", &self.id);
        if self.shares != 0 {
            put_tag(out, "38", self.shares);
        }
    }
}

const _: () = assert!(CancelMsg::WIRE_SIZE == 19);

/// Modify-order message, tag `'M'`.
///
/// Shares the tag byte with the inbound [`crate::inbound::ModifiedMsg`]; the
/// two are told apart by body length (20 against 28).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyMsg {
    /// Client order identifier to modify.
    pub id: ArrayString<14>,
    /// New side; only transitions among the sell sides are allowed.
    pub side: Side,
    /// New share quantity; zero cancels the whole order.
    pub shares: u32,
}

impl ModifyMsg {
    /// Wire type tag.
    pub const TAG: u8 = b'M';
    /// Exact framed size including the tag byte.
    pub const WIRE_SIZE: usize = 1 + 14 + 1 + 4;

    /// Creates a modify request.
    ///
    /// # Errors
    /// Returns `EncodeError::FieldTooLong` when `id` exceeds 14 bytes.
    pub fn new(id: &str, side: Side, shares: u32) -> Result<Self, EncodeError> {
        Ok(Self {
            id: alpha(id, "ClOrdId")?,
            side,
            shares,
        })
    }

    pub(crate) fn encode_body(&self, dst: &mut BytesMut) {
        put_alpha(dst, &self.id);
        dst.put_u8(self.side.as_wire());
        dst.put_u32(self.shares);
    }

    pub(crate) fn decode_body(mut body: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            id: get_alpha(&mut body)?,
            side: Side::from_wire(get_u8(&mut body)?)?,
            shares: get_u32(&mut body)?,
        })
    }

    pub(crate) fn render(&self, out: &mut String) {
        put_tag(out, "35", 'G');
        put_tag(out, "11", &self.id);
        put_side(out, self.side);
        put_tag(out, "38", self.shares);
    }
}

const _: () = assert!(ModifyMsg::WIRE_SIZE == 20);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_defaults() {
        let order = OrderMsg::new("12345", Side::Buy, 100, "MSFT", Price::from_raw(123_400))
            .unwrap();
        assert_eq!(order.tif, TIF_MARKET_HOURS);
        assert_eq!(order.capacity, b'A');
        assert_eq!(order.sweep, b'N');
        assert_eq!(order.cross, b'N');
        assert_eq!(order.min_qty, 0);
        assert!(order.firm.is_empty());
    }

    #[test]
    fn test_order_render() {
        let order = OrderMsg::new("12345", Side::Buy, 100, "MSFT", Price::from_raw(123_400))
            .unwrap();
        let mut out = String::new();
        order.render(&mut out);
        assert_eq!(
            out,
            "35=D\u{1}11=12345\u{1}54=1\u{1}38=100\u{1}55=MSFT\u{1}44=12.3400\u{1}\
             59=99998\u{1}47=A\u{1}9355=N\u{1}"
        );
    }

    #[test]
    fn test_order_render_optional_fields() {
        let mut order =
            OrderMsg::new("1", Side::Sell, 1, "A", Price::from_raw(0)).unwrap();
        order.firm = alpha("ABCD", "Firm").unwrap();
        order.display = b'Y';
        order.sweep = b'Y';
        order.min_qty = 50;
        let mut out = String::new();
        order.render(&mut out);
        assert!(!out.contains("44="));
        assert!(out.contains("49=ABCD\u{1}"));
        assert!(out.contains("9140=Y\u{1}"));
        assert!(out.contains("18=f\u{1}"));
        assert!(out.contains("110=50\u{1}"));
    }

    #[test]
    fn test_cancel_render_omits_zero_shares() {
        let cancel = CancelMsg::new("12345").unwrap();
        let mut out = String::new();
        cancel.render(&mut out);
        assert_eq!(out, "35=F\u{1}11=12345\u{1}");
    }

    #[test]
    fn test_id_too_long() {
        assert!(OrderMsg::new(
            "THISIDISWAYTOOLONG",
            Side::Buy,
            1,
            "X",
            Price::from_raw(1)
        )
        .is_err());
    }
}
