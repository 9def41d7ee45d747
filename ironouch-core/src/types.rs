/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Core types for OUCH protocol operations.
//!
//! This module provides fundamental types used throughout the IronOuch engine:
//! - [`SeqNum`]: SoupBin sequence number
//! - [`Timestamp`]: UTC wall-clock timestamp with OUCH formatting
//! - [`CompId`]: Component identifier (SenderCompId, TargetCompId)
//! - [`SessionId`]: Sender/target pair identifying one session
//! - [`Side`]: OUCH order side
//! - [`Price`]: Fixed-point price with four implicit decimals

use crate::error::DecodeError;
use arrayvec::ArrayString;
use chrono::{DateTime, NaiveDateTime, Utc};
use num_derive::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length for CompId strings in bytes.
pub const COMP_ID_MAX_LEN: usize = 32;

/// Time-in-force value for immediate-or-cancel orders.
pub const TIF_IOC: u32 = 0;

/// Time-in-force magic value: live until market close.
pub const TIF_MARKET_HOURS: u32 = 99_998;

/// Time-in-force magic value: live until end of day.
pub const TIF_END_OF_DAY: u32 = 99_999;

/// SoupBin message sequence number.
///
/// Sequence numbers are unsigned 64-bit integers starting at 1. The sender
/// counter advances on every stored outbound message, the target counter on
/// every counted inbound sequenced message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct SeqNum(u64);

impl SeqNum {
    /// Creates a new sequence number.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw sequence number value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the next sequence number.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Default for SeqNum {
    fn default() -> Self {
        Self(1)
    }
}

impl From<u64> for SeqNum {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<SeqNum> for u64 {
    fn from(seq: SeqNum) -> Self {
        seq.0
    }
}

impl fmt::Display for SeqNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// UTC wall-clock timestamp.
///
/// Formats as `YYYYMMDD-HH:MM:SS` for the store session file and as
/// `YYYYMMDD-HH:MM:SS.mmm` for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC timestamp.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Formats the timestamp as `YYYYMMDD-HH:MM:SS`.
    #[must_use]
    pub fn format_seconds(self) -> ArrayString<17> {
        let mut buf = ArrayString::new();
        let _ = std::fmt::write(
            &mut buf,
            format_args!("{}", self.0.format("%Y%m%d-%H:%M:%S")),
        );
        buf
    }

    /// Formats the timestamp with millisecond precision as
    /// `YYYYMMDD-HH:MM:SS.mmm`.
    #[must_use]
    pub fn format_millis(self) -> ArrayString<21> {
        let mut buf = ArrayString::new();
        let _ = std::fmt::write(
            &mut buf,
            format_args!("{}", self.0.format("%Y%m%d-%H:%M:%S%.3f")),
        );
        buf
    }

    /// Parses a `YYYYMMDD-HH:MM:SS` string, as stored in the session file.
    ///
    /// # Errors
    /// Returns `DecodeError::InvalidAlpha` if the string does not match.
    pub fn parse_seconds(s: &str) -> Result<Self, DecodeError> {
        NaiveDateTime::parse_from_str(s.trim(), "%Y%m%d-%H:%M:%S")
            .map(|naive| Self(naive.and_utc()))
            .map_err(|_| DecodeError::InvalidAlpha)
    }

    /// Converts to a chrono `DateTime<Utc>`.
    #[must_use]
    pub const fn to_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_millis())
    }
}

/// Component identifier for sessions.
///
/// Used for SenderCompId and TargetCompId. Maximum length is 32 bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct CompId(ArrayString<COMP_ID_MAX_LEN>);

impl CompId {
    /// Creates a new CompId from a string slice.
    ///
    /// # Returns
    /// `Some(CompId)` if the string fits within the maximum length, `None`
    /// otherwise.
    #[must_use]
    pub fn new(s: &str) -> Option<Self> {
        ArrayString::from(s).ok().map(Self)
    }

    /// Returns the CompId as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns true if the CompId is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for CompId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CompId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CompId {
    type Err = arrayvec::CapacityError<()>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArrayString::try_from(s)
            .map(Self)
            .map_err(|_| arrayvec::CapacityError::new(()))
    }
}

/// Identity of one session: the `{sender, target}` CompId pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId {
    /// Sender CompId.
    pub sender_comp_id: CompId,
    /// Target CompId.
    pub target_comp_id: CompId,
}

impl SessionId {
    /// Creates a new session identity.
    #[must_use]
    pub const fn new(sender_comp_id: CompId, target_comp_id: CompId) -> Self {
        Self {
            sender_comp_id,
            target_comp_id,
        }
    }

    /// Returns the file-name prefix `SENDER-TARGET` used by the store and
    /// the file log.
    #[must_use]
    pub fn file_prefix(&self) -> String {
        format!("{}-{}", self.sender_comp_id, self.target_comp_id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.sender_comp_id, self.target_comp_id)
    }
}

/// OUCH order side.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromPrimitive, ToPrimitive,
)]
#[repr(u8)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order.
    Buy = b'B',
    /// Sell order.
    Sell = b'S',
    /// Sell short.
    SellShort = b'T',
    /// Sell short exempt.
    SellShortExempt = b'E',
}

impl Side {
    /// Creates a Side from its OUCH wire byte.
    ///
    /// # Errors
    /// Returns `DecodeError::InvalidSide` for bytes outside `{B, S, T, E}`.
    pub const fn from_wire(byte: u8) -> Result<Self, DecodeError> {
        match byte {
            b'B' => Ok(Self::Buy),
            b'S' => Ok(Self::Sell),
            b'T' => Ok(Self::SellShort),
            b'E' => Ok(Self::SellShortExempt),
            other => Err(DecodeError::InvalidSide(other as char)),
        }
    }

    /// Returns the OUCH wire byte of this side.
    #[inline]
    #[must_use]
    pub const fn as_wire(self) -> u8 {
        self as u8
    }

    /// Returns the FIX tag-54 digit used by the log renderer:
    /// `B→1`, `S→2`, `T→5`, `E→6`.
    #[must_use]
    pub const fn fix_digit(self) -> char {
        match self {
            Self::Buy => '1',
            Self::Sell => '2',
            Self::SellShort => '5',
            Self::SellShortExempt => '6',
        }
    }

    /// Returns true if this is the buy side.
    #[must_use]
    pub const fn is_buy(self) -> bool {
        matches!(self, Self::Buy)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_wire() as char)
    }
}

/// Fixed-point OUCH price: an unsigned integer in units of 1/10 000.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Price(u32);

impl Price {
    /// Creates a price from its raw fixed-point value.
    #[inline]
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw fixed-point value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns true if the price is zero (absent in the log rendering).
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Price {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Price {
    /// Renders the price as `{integer}.{fraction:04}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:04}", self.0 / 10_000, self.0 % 10_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_num_operations() {
        let seq = SeqNum::new(5);
        assert_eq!(seq.value(), 5);
        assert_eq!(seq.next().value(), 6);
        assert_eq!(SeqNum::default().value(), 1);
    }

    #[test]
    fn test_timestamp_seconds_round_trip() {
        let ts = Timestamp::now();
        let formatted = ts.format_seconds();
        let parsed = Timestamp::parse_seconds(&formatted).unwrap();
        assert_eq!(parsed.format_seconds(), formatted);
    }

    #[test]
    fn test_timestamp_millis_format() {
        let formatted = Timestamp::now().format_millis();
        assert_eq!(formatted.len(), 21);
        assert_eq!(&formatted[8..9], "-");
        assert_eq!(&formatted[17..18], ".");
    }

    #[test]
    fn test_comp_id() {
        let id = CompId::new("OUCH").unwrap();
        assert_eq!(id.as_str(), "OUCH");
        assert!(CompId::new(&"A".repeat(COMP_ID_MAX_LEN + 1)).is_none());
    }

    #[test]
    fn test_session_id_display() {
        let id = SessionId::new(CompId::new("zhb").unwrap(), CompId::new("OUCH").unwrap());
        assert_eq!(id.to_string(), "zhb->OUCH");
        assert_eq!(id.file_prefix(), "zhb-OUCH");
    }

    #[test]
    fn test_side_wire_round_trip() {
        for byte in [b'B', b'S', b'T', b'E'] {
            let side = Side::from_wire(byte).unwrap();
            assert_eq!(side.as_wire(), byte);
        }
        assert!(Side::from_wire(b'X').is_err());
    }

    #[test]
    fn test_side_fix_digits() {
        assert_eq!(Side::Buy.fix_digit(), '1');
        assert_eq!(Side::Sell.fix_digit(), '2');
        assert_eq!(Side::SellShort.fix_digit(), '5');
        assert_eq!(Side::SellShortExempt.fix_digit(), '6');
    }

    #[test]
    fn test_price_rendering() {
        assert_eq!(Price::from_raw(1_234_000).to_string(), "123.4000");
        assert_eq!(Price::from_raw(123_400).to_string(), "12.3400");
        assert_eq!(Price::from_raw(7).to_string(), "0.0007");
        assert_eq!(Price::from_raw(0).to_string(), "0.0000");
        assert!(Price::from_raw(0).is_zero());
    }
}
