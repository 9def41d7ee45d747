/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Inbound OUCH 4.2 messages (market to participant).
//!
//! Every message leads with a one-byte type tag and an 8-byte timestamp.
//! Layouts are fixed and exact; integers are big-endian on the wire.

use crate::outbound::{CancelMsg, OrderMsg};
use crate::render::{put_char, put_price, put_side, put_tag};
use crate::wire::{get_alpha, get_u8, get_u32, get_u64, put_alpha};
use arrayvec::ArrayString;
use bytes::{BufMut, BytesMut};
use ironouch_core::error::DecodeError;
use ironouch_core::types::{Price, Side};

/// Order-accepted message, tag `'A'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedMsg {
    /// Venue timestamp, nanoseconds since midnight.
    pub tm: u64,
    /// Client order identifier.
    pub id: ArrayString<14>,
    /// Order side.
    pub side: Side,
    /// Accepted share quantity.
    pub shares: u32,
    /// Symbol.
    pub symbol: ArrayString<8>,
    /// Limit price.
    pub price: Price,
    /// Time in force in seconds.
    pub tif: u32,
    /// Firm identifier.
    pub firm: ArrayString<4>,
    /// Display instruction.
    pub display: u8,
    /// Venue order reference number.
    pub order_ref: u64,
    /// Capacity.
    pub capacity: u8,
    /// Intermarket sweep eligibility.
    pub sweep: u8,
    /// Minimum acceptable quantity.
    pub min_qty: u32,
    /// Cross type.
    pub cross: u8,
    /// Order state: `'L'` live, `'D'` dead (accepted but auto-canceled).
    pub state: u8,
    /// BBO weight indicator.
    pub bbo: u8,
}

impl AcceptedMsg {
    /// Wire type tag.
    pub const TAG: u8 = b'A';
    /// Exact framed size including the tag byte.
    pub const WIRE_SIZE: usize = 1 + 8 + 14 + 1 + 4 + 8 + 4 + 4 + 4 + 1 + 8 + 1 + 1 + 4 + 1 + 1 + 1;

    /// Builds the acknowledgement for an order, echoing its fields.
    #[must_use]
    pub fn from_order(order: &OrderMsg) -> Self {
        Self {
            tm: 0,
            id: order.id,
            side: order.side,
            shares: order.shares,
            symbol: order.symbol,
            price: order.price,
            tif: order.tif,
            firm: order.firm,
            display: order.display,
            order_ref: 0,
            capacity: order.capacity,
            sweep: order.sweep,
            min_qty: order.min_qty,
            cross: order.cross,
            state: b'L',
            bbo: b' ',
        }
    }

    /// Returns true when the order was accepted dead.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.state == b'D'
    }

    pub(crate) fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_u64(self.tm);
        put_alpha(dst, &self.id);
        dst.put_u8(self.side.as_wire());
        dst.put_u32(self.shares);
        put_alpha(dst, &self.symbol);
        dst.put_u32(self.price.raw());
        dst.put_u32(self.tif);
        put_alpha(dst, &self.firm);
        dst.put_u8(self.display);
        dst.put_u64(self.order_ref);
        dst.put_u8(self.capacity);
        dst.put_u8(self.sweep);
        dst.put_u32(self.min_qty);
        dst.put_u8(self.cross);
        dst.put_u8(self.state);
        dst.put_u8(self.bbo);
    }

    pub(crate) fn decode_body(mut body: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            tm: get_u64(&mut body)?,
            id: get_alpha(&mut body)?,
            side: Side::from_wire(get_u8(&mut body)?)?,
            shares: get_u32(&mut body)?,
            symbol: get_alpha(&mut body)?,
            price: Price::from_raw(get_u32(&mut body)?),
            tif: get_u32(&mut body)?,
            firm: get_alpha(&mut body)?,
            display: get_u8(&mut body)?,
            order_ref: get_u64(&mut body)?,
            capacity: get_u8(&mut body)?,
            sweep: get_u8(&mut body)?,
            min_qty: get_u32(&mut body)?,
            cross: get_u8(&mut body)?,
            state: get_u8(&mut body)?,
            bbo: get_u8(&mut body)?,
        })
    }

    pub(crate) fn render(&self, out: &mut String) {
        put_tag(out, "35", '8');
        put_tag(out, "60", self.tm);
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
        put_tag(out, "37", self.order_ref);
        put_char(out, "47", self.capacity);
        if self.sweep == b'Y' {
            put_tag(out, "18", 'f');
        }
        if self.min_qty > 0 {
            put_tag(out, "110", self.min_qty);
        }
        put_char(out, "9355", self.cross);
        put_tag(out, "150", if self.is_dead() { '4' } else { '0' });
        put_char(out, "9883", self.bbo);
    }
}

const _: () = assert!(AcceptedMsg::WIRE_SIZE == 66);

/// Order-replaced message, tag `'U'`.
///
/// Shares the tag byte with the outbound [`crate::outbound::ReplaceMsg`];
/// body length (80 against 47) selects the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacedMsg {
    /// Venue timestamp.
    pub tm: u64,
    /// New client order identifier.
    pub new_id: ArrayString<14>,
    /// Order side.
    pub side: Side,
    /// Share quantity after the replace.
    pub shares: u32,
    /// Symbol.
    pub symbol: ArrayString<8>,
    /// Limit price.
    pub price: Price,
    /// Time in force in seconds.
    pub tif: u32,
    /// Firm identifier.
    pub firm: ArrayString<4>,
    /// Display instruction.
    pub display: u8,
    /// Venue order reference number.
    pub order_ref: u64,
    /// Capacity.
    pub capacity: u8,
    /// Intermarket sweep eligibility.
    pub sweep: u8,
    /// Minimum acceptable quantity.
    pub min_qty: u32,
    /// Cross type.
    pub cross: u8,
    /// Order state: `'L'` live, `'D'` dead.
    pub state: u8,
    /// Replaced client order identifier.
    pub old_id: ArrayString<14>,
    /// BBO weight indicator.
    pub bbo: u8,
}

impl ReplacedMsg {
    /// Wire type tag.
    pub const TAG: u8 = b'U';
    /// Exact framed size including the tag byte.
    pub const WIRE_SIZE: usize =
        1 + 8 + 14 + 1 + 4 + 8 + 4 + 4 + 4 + 1 + 8 + 1 + 1 + 4 + 1 + 1 + 14 + 1;

    /// Returns true when the replacement order is dead.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.state == b'D'
    }

    pub(crate) fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_u64(self.tm);
        put_alpha(dst, &self.new_id);
        dst.put_u8(self.side.as_wire());
        dst.put_u32(self.shares);
        put_alpha(dst, &self.symbol);
        dst.put_u32(self.price.raw());
        dst.put_u32(self.tif);
        put_alpha(dst, &self.firm);
        dst.put_u8(self.display);
        dst.put_u64(self.order_ref);
        dst.put_u8(self.capacity);
        dst.put_u8(self.sweep);
        dst.put_u32(self.min_qty);
        dst.put_u8(self.cross);
        dst.put_u8(self.state);
        put_alpha(dst, &self.old_id);
        dst.put_u8(self.bbo);
    }

    pub(crate) fn decode_body(mut body: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            tm: get_u64(&mut body)?,
            new_id: get_alpha(&mut body)?,
            side: Side::from_wire(get_u8(&mut body)?)?,
            shares: get_u32(&mut body)?,
            symbol: get_alpha(&mut body)?,
            price: Price::from_raw(get_u32(&mut body)?),
            tif: get_u32(&mut body)?,
            firm: get_alpha(&mut body)?,
            display: get_u8(&mut body)?,
            order_ref: get_u64(&mut body)?,
            capacity: get_u8(&mut body)?,
            sweep: get_u8(&mut body)?,
            min_qty: get_u32(&mut body)?,
            cross: get_u8(&mut body)?,
            state: get_u8(&mut body)?,
            old_id: get_alpha(&mut body)?,
            bbo: get_u8(&mut body)?,
        })
    }

    pub(crate) fn render(&self, out: &mut String) {
        put_tag(out, "35", '8');
        put_tag(out, "60", self.tm);
        put_tag(out, "11", &self.new_id);
        put_side(out, self.side);
        put_tag(out, "38", self.shares);
        put_tag(out, "55", &self.symbol);
        put_price(out, "44", self.price);
        put_tag(out, "59", self.tif);
        if !self.firm.is_empty() {
            put_tag(out, "49", &self.firm);
        }
        put_char(out, "9140", self.display);
        put_tag(out, "37", self.order_ref);
        put_char(out, "47", self.capacity);
        if self.sweep == b'Y' {
            put_tag(out, "18", 'f');
        }
        if self.min_qty > 0 {
            put_tag(out, "110", self.min_qty);
        }
        put_char(out, "9355", self.cross);
        put_tag(out, "150", if self.is_dead() { '4' } else { '5' });
        put_tag(out, "41", &self.old_id);
        put_char(out, "9883", self.bbo);
    }
}

const _: () = assert!(ReplacedMsg::WIRE_SIZE == 80);

/// Order-canceled message, tag `'C'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanceledMsg {
    /// Venue timestamp.
    pub tm: u64,
    /// Client order identifier.
    pub id: ArrayString<14>,
    /// Number of shares taken off the book.
    pub canceled_shares: u32,
    /// Cancel reason byte.
    pub reason: u8,
}

impl CanceledMsg {
    /// Wire type tag.
    pub const TAG: u8 = b'C';
    /// Exact framed size including the tag byte.
    pub const WIRE_SIZE: usize = 1 + 8 + 14 + 4 + 1;

    /// Builds the acknowledgement for a cancel request.
    #[must_use]
    pub fn from_cancel(cancel: &CancelMsg) -> Self {
        Self {
            tm: 0,
            id: cancel.id,
            canceled_shares: cancel.shares,
            reason: b' ',
        }
    }

    pub(crate) fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_u64(self.tm);
        put_alpha(dst, &self.id);
        dst.put_u32(self.canceled_shares);
        dst.put_u8(self.reason);
    }

    pub(crate) fn decode_body(mut body: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            tm: get_u64(&mut body)?,
            id: get_alpha(&mut body)?,
            canceled_shares: get_u32(&mut body)?,
            reason: get_u8(&mut body)?,
        })
    }

    pub(crate) fn render(&self, out: &mut String) {
        put_tag(out, "35", '8');
        put_tag(out, "60", self.tm);
        put_tag(out, "11", &self.id);
        if self.canceled_shares != 0 {
            put_tag(out, "38", self.canceled_shares);
        }
        put_tag(out, "150", '4');
        put_char(out, "58", self.reason);
    }
}

const _: () = assert!(CanceledMsg::WIRE_SIZE == 28);

/// AIQ-canceled message, tag `'D'`: canceled by anti-internalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiqCanceledMsg {
    /// Venue timestamp.
    pub tm: u64,
    /// Client order identifier.
    pub id: ArrayString<14>,
    /// Number of shares canceled.
    pub canceled_shares: u32,
    /// Cancel reason byte.
    pub reason: u8,
    /// Shares executed before the cancel.
    pub exec_shares: u32,
    /// Execution price.
    pub exec_price: Price,
    /// Liquidity flag.
    pub liquidity: u8,
}

impl AiqCanceledMsg {
    /// Wire type tag.
    pub const TAG: u8 = b'D';
    /// Exact framed size including the tag byte.
    pub const WIRE_SIZE: usize = 1 + 8 + 14 + 4 + 1 + 4 + 4 + 1;

    pub(crate) fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_u64(self.tm);
        put_alpha(dst, &self.id);
        dst.put_u32(self.canceled_shares);
        dst.put_u8(self.reason);
        dst.put_u32(self.exec_shares);
        dst.put_u32(self.exec_price.raw());
        dst.put_u8(self.liquidity);
    }

    pub(crate) fn decode_body(mut body: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            tm: get_u64(&mut body)?,
            id: get_alpha(&mut body)?,
            canceled_shares: get_u32(&mut body)?,
            reason: get_u8(&mut body)?,
            exec_shares: get_u32(&mut body)?,
            exec_price: Price::from_raw(get_u32(&mut body)?),
            liquidity: get_u8(&mut body)?,
        })
    }

    pub(crate) fn render(&self, out: &mut String) {
        put_tag(out, "35", '8');
        put_tag(out, "60", self.tm);
        put_tag(out, "11", &self.id);
        if self.canceled_shares != 0 {
            put_tag(out, "38", self.canceled_shares);
        }
        put_char(out, "58", self.reason);
        if self.exec_shares != 0 {
            put_tag(out, "32", self.exec_shares);
        }
        put_price(out, "31", self.exec_price);
        put_tag(out, "150", '4');
        put_char(out, "9882", self.liquidity);
    }
}

const _: () = assert!(AiqCanceledMsg::WIRE_SIZE == 37);

/// Order-executed message, tag `'E'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedMsg {
    /// Venue timestamp.
    pub tm: u64,
    /// Client order identifier.
    pub id: ArrayString<14>,
    /// Shares executed.
    pub exec_shares: u32,
    /// Execution price.
    pub exec_price: Price,
    /// Liquidity flag.
    pub liquidity: u8,
    /// Match number; the buy and sell legs share one.
    pub match_num: u64,
}

impl ExecutedMsg {
    /// Wire type tag.
    pub const TAG: u8 = b'E';
    /// Exact framed size including the tag byte.
    pub const WIRE_SIZE: usize = 1 + 8 + 14 + 4 + 4 + 1 + 8;

    pub(crate) fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_u64(self.tm);
        put_alpha(dst, &self.id);
        dst.put_u32(self.exec_shares);
        dst.put_u32(self.exec_price.raw());
        dst.put_u8(self.liquidity);
        dst.put_u64(self.match_num);
    }

    pub(crate) fn decode_body(mut body: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            tm: get_u64(&mut body)?,
            id: get_alpha(&mut body)?,
            exec_shares: get_u32(&mut body)?,
            exec_price: Price::from_raw(get_u32(&mut body)?),
            liquidity: get_u8(&mut body)?,
            match_num: get_u64(&mut body)?,
        })
    }

    pub(crate) fn render(&self, out: &mut String) {
        put_tag(out, "35", '8');
        put_tag(out, "60", self.tm);
        put_tag(out, "11", &self.id);
        if self.exec_shares != 0 {
            put_tag(out, "32", self.exec_shares);
        }
        put_price(out, "31", self.exec_price);
        put_tag(out, "150", '1');
        put_char(out, "9882", self.liquidity);
        put_tag(out, "17", self.match_num);
        put_tag(out, "20", '0');
    }
}

const _: () = assert!(ExecutedMsg::WIRE_SIZE == 40);

/// Broken-trade message, tag `'B'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenTradeMsg {
    /// Venue timestamp.
    pub tm: u64,
    /// Client order identifier.
    pub id: ArrayString<14>,
    /// Match number of the broken execution.
    pub match_num: u64,
    /// Break reason byte.
    pub reason: u8,
}

impl BrokenTradeMsg {
    /// Wire type tag.
    pub const TAG: u8 = b'B';
    /// Exact framed size including the tag byte.
    pub const WIRE_SIZE: usize = 1 + 8 + 14 + 8 + 1;

    pub(crate) fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_u64(self.tm);
        put_alpha(dst, &self.id);
        dst.put_u64(self.match_num);
        dst.put_u8(self.reason);
    }

    pub(crate) fn decode_body(mut body: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            tm: get_u64(&mut body)?,
            id: get_alpha(&mut body)?,
            match_num: get_u64(&mut body)?,
            reason: get_u8(&mut body)?,
        })
    }

    pub(crate) fn render(&self, out: &mut String) {
        put_tag(out, "35", '8');
        put_tag(out, "60", self.tm);
        put_tag(out, "11", &self.id);
        put_tag(out, "150", '1');
        put_tag(out, "17", self.match_num);
        put_char(out, "58", self.reason);
        put_tag(out, "20", '1');
    }
}

const _: () = assert!(BrokenTradeMsg::WIRE_SIZE == 32);

/// Order-rejected message, tag `'J'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedMsg {
    /// Venue timestamp.
    pub tm: u64,
    /// Client order identifier.
    pub id: ArrayString<14>,
    /// Reject reason byte; `'T'` marks a test-mode rejection.
    pub reason: u8,
}

impl RejectedMsg {
    /// Wire type tag.
    pub const TAG: u8 = b'J';
    /// Exact framed size including the tag byte.
    pub const WIRE_SIZE: usize = 1 + 8 + 14 + 1;

    /// Returns true for test-mode rejections, which do not advance the
    /// target sequence counter.
    #[must_use]
    pub const fn is_test_mode(&self) -> bool {
        self.reason == b'T'
    }

    pub(crate) fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_u64(self.tm);
        put_alpha(dst, &self.id);
        dst.put_u8(self.reason);
    }

    pub(crate) fn decode_body(mut body: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            tm: get_u64(&mut body)?,
            id: get_alpha(&mut body)?,
            reason: get_u8(&mut body)?,
        })
    }

    pub(crate) fn render(&self, out: &mut String) {
        put_tag(out, "35", '8');
        put_tag(out, "60", self.tm);
        put_tag(out, "11", &self.id);
        put_char(out, "58", self.reason);
        put_tag(out, "150", '8');
    }
}

const _: () = assert!(RejectedMsg::WIRE_SIZE == 24);

/// Cancel-pending message, tag `'P'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelPendingMsg {
    /// Venue timestamp.
    pub tm: u64,
    /// Client order identifier.
    pub id: ArrayString<14>,
}

impl CancelPendingMsg {
    /// Wire type tag.
    pub const TAG: u8 = b'P';
    /// Exact framed size including the tag byte.
    pub const WIRE_SIZE: usize = 1 + 8 + 14;

    pub(crate) fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_u64(self.tm);
        put_alpha(dst, &self.id);
    }

    pub(crate) fn decode_body(mut body: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            tm: get_u64(&mut body)?,
            id: get_alpha(&mut body)?,
        })
    }

    pub(crate) fn render(&self, out: &mut String) {
        put_tag(out, "35", '8');
        put_tag(out, "60", self.tm);
        put_tag(out, "11", &self.id);
        put_tag(out, "150", '6');
    }
}

const _: () = assert!(CancelPendingMsg::WIRE_SIZE == 23);

/// Cancel-reject message, tag `'I'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelRejectMsg {
    /// Venue timestamp.
    pub tm: u64,
    /// Client order identifier.
    pub id: ArrayString<14>,
}

impl CancelRejectMsg {
    /// Wire type tag.
    pub const TAG: u8 = b'I';
    /// Exact framed size including the tag byte.
    pub const WIRE_SIZE: usize = 1 + 8 + 14;

    pub(crate) fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_u64(self.tm);
        put_alpha(dst, &self.id);
    }

    pub(crate) fn decode_body(mut body: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            tm: get_u64(&mut body)?,
            id: get_alpha(&mut body)?,
        })
    }

    pub(crate) fn render(&self, out: &mut String) {
        put_tag(out, "35", '9');
        put_tag(out, "60", self.tm);
        put_tag(out, "11", &self.id);
        put_tag(out, "434", '1');
    }
}

const _: () = assert!(CancelRejectMsg::WIRE_SIZE == 23);

/// Priority-update message, tag `'T'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityMsg {
    /// Venue timestamp.
    pub tm: u64,
    /// Client order identifier.
    pub id: ArrayString<14>,
    /// New price.
    pub price: Price,
    /// New display instruction.
    pub display: u8,
    /// Venue order reference number.
    pub order_ref: u64,
}

impl PriorityMsg {
    /// Wire type tag.
    pub const TAG: u8 = b'T';
    /// Exact framed size including the tag byte.
    pub const WIRE_SIZE: usize = 1 + 8 + 14 + 4 + 1 + 8;

    pub(crate) fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_u64(self.tm);
        put_alpha(dst, &self.id);
        dst.put_u32(self.price.raw());
        dst.put_u8(self.display);
        dst.put_u64(self.order_ref);
    }

    pub(crate) fn decode_body(mut body: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            tm: get_u64(&mut body)?,
            id: get_alpha(&mut body)?,
            price: Price::from_raw(get_u32(&mut body)?),
            display: get_u8(&mut body)?,
            order_ref: get_u64(&mut body)?,
        })
    }

    pub(crate) fn render(&self, out: &mut String) {
        put_tag(out, "35", 'T');
        put_tag(out, "60", self.tm);
        put_tag(out, "11", &self.id);
        put_price(out, "44", self.price);
        put_char(out, "9140", self.display);
        put_tag(out, "37", self.order_ref);
    }
}

const _: () = assert!(PriorityMsg::WIRE_SIZE == 36);

/// Order-modified message, tag `'M'`.
///
/// Shares the tag byte with the outbound [`crate::outbound::ModifyMsg`];
/// body length (28 against 20) selects the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifiedMsg {
    /// Venue timestamp.
    pub tm: u64,
    /// Client order identifier.
    pub id: ArrayString<14>,
    /// Side after the modify.
    pub side: Side,
    /// Shares remaining.
    pub shares: u32,
}

impl ModifiedMsg {
    /// Wire type tag.
    pub const TAG: u8 = b'M';
    /// Exact framed size including the tag byte.
    pub const WIRE_SIZE: usize = 1 + 8 + 14 + 1 + 4;

    pub(crate) fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_u64(self.tm);
        put_alpha(dst, &self.id);
        dst.put_u8(self.side.as_wire());
        dst.put_u32(self.shares);
    }

    pub(crate) fn decode_body(mut body: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            tm: get_u64(&mut body)?,
            id: get_alpha(&mut body)?,
            side: Side::from_wire(get_u8(&mut body)?)?,
            shares: get_u32(&mut body)?,
        })
    }

    pub(crate) fn render(&self, out: &mut String) {
        put_tag(out, "35", '8');
        put_tag(out, "60", self.tm);
        put_tag(out, "11", &self.id);
        put_tag(out, "150", '5');
        put_side(out, self.side);
        put_tag(out, "38", self.shares);
    }
}

const _: () = assert!(ModifiedMsg::WIRE_SIZE == 28);

/// System-event message, tag `'S'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemMsg {
    /// Venue timestamp.
    pub tm: u64,
    /// Event code byte.
    pub event: u8,
}

impl SystemMsg {
    /// Wire type tag.
    pub const TAG: u8 = b'S';
    /// Exact framed size including the tag byte.
    pub const WIRE_SIZE: usize = 1 + 8 + 1;

    pub(crate) fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_u64(self.tm);
        dst.put_u8(self.event);
    }

    pub(crate) fn decode_body(mut body: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            tm: get_u64(&mut body)?,
            event: get_u8(&mut body)?,
        })
    }

    pub(crate) fn render(&self, out: &mut String) {
        put_tag(out, "35", 'S');
        put_tag(out, "60", self.tm);
        put_tag(out, "58", self.event as char);
    }
}

const _: () = assert!(SystemMsg::WIRE_SIZE == 10);

#[cfg(test)]
mod tests {
    use super::*;
    use ironouch_core::types::TIF_MARKET_HOURS;

    #[test]
    fn test_accepted_echoes_order() {
        let order = OrderMsg::new("12345", Side::Buy, 100, "MSFT", Price::from_raw(123_400))
            .unwrap();
        let ack = AcceptedMsg::from_order(&order);
        assert_eq!(ack.id.as_str(), "12345");
        assert_eq!(ack.shares, 100);
        assert_eq!(ack.symbol.as_str(), "MSFT");
        assert_eq!(ack.price, Price::from_raw(123_400));
        assert_eq!(ack.tif, TIF_MARKET_HOURS);
        assert_eq!(ack.state, b'L');
        assert!(!ack.is_dead());
    }

    #[test]
    fn test_accepted_render_exec_type() {
        let order = OrderMsg::new("1", Side::Sell, 5, "A", Price::from_raw(10_000)).unwrap();
        let mut ack = AcceptedMsg::from_order(&order);
        let mut out = String::new();
        ack.render(&mut out);
        assert!(out.contains("150=0\u{1}"));

        ack.state = b'D';
        out.clear();
        ack.render(&mut out);
        assert!(out.contains("150=4\u{1}"));
    }

    #[test]
    fn test_canceled_from_cancel() {
        let cancel = CancelMsg::new("ABC").unwrap();
        let canceled = CanceledMsg::from_cancel(&cancel);
        assert_eq!(canceled.id.as_str(), "ABC");
        assert_eq!(canceled.reason, b' ');
    }

    #[test]
    fn test_rejected_test_mode() {
        let rejected = RejectedMsg {
            tm: 0,
            id: ArrayString::from("X").unwrap(),
            reason: b'T',
        };
        assert!(rejected.is_test_mode());
        let rejected = RejectedMsg { reason: b'V', ..rejected };
        assert!(!rejected.is_test_mode());
    }

    #[test]
    fn test_modified_renders_only_modified() {
        let modified = ModifiedMsg {
            tm: 7,
            id: ArrayString::from("42").unwrap(),
            side: Side::Sell,
            shares: 10,
        };
        let mut out = String::new();
        modified.render(&mut out);
        assert_eq!(
            out,
            "35=8\u{1}60=7\u{1}11=42\u{1}150=5\u{1}54=2\u{1}38=10\u{1}"
        );
    }

    #[test]
    fn test_system_render() {
        let sys = SystemMsg { tm: 9, event: b'S' };
        let mut out = String::new();
        sys.render(&mut out);
        assert_eq!(out, "35=S\u{1}60=9\u{1}58=S\u{1}");
    }
}
