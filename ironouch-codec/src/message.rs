/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! The tagged OUCH message variant set.
//!
//! [`OuchMessage`] unifies both directions so that the session layer and the
//! log sinks dispatch on one type. Decoding selects the variant from the
//! one-byte tag; for the colliding tags `'U'` and `'M'` the body length is
//! the discriminator.

use crate::inbound::{
    AcceptedMsg, AiqCanceledMsg, BrokenTradeMsg, CancelPendingMsg, CancelRejectMsg, CanceledMsg,
    ExecutedMsg, ModifiedMsg, PriorityMsg, RejectedMsg, ReplacedMsg, SystemMsg,
};
use crate::outbound::{CancelMsg, ModifyMsg, OrderMsg, ReplaceMsg};
use bytes::BytesMut;
use ironouch_core::error::DecodeError;

/// One OUCH 4.2 message of either direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OuchMessage {
    /// Enter order (outbound).
    Order(OrderMsg),
    /// Replace order (outbound).
    Replace(ReplaceMsg),
    /// Cancel order (outbound).
    Cancel(CancelMsg),
    /// Modify order (outbound).
    Modify(ModifyMsg),
    /// Order accepted (inbound).
    Accepted(AcceptedMsg),
    /// Order replaced (inbound).
    Replaced(ReplacedMsg),
    /// Order canceled (inbound).
    Canceled(CanceledMsg),
    /// Order canceled by anti-internalization (inbound).
    AiqCanceled(AiqCanceledMsg),
    /// Order executed (inbound).
    Executed(ExecutedMsg),
    /// Trade broken (inbound).
    BrokenTrade(BrokenTradeMsg),
    /// Order rejected (inbound).
    Rejected(RejectedMsg),
    /// Cancel pending (inbound).
    CancelPending(CancelPendingMsg),
    /// Cancel rejected (inbound).
    CancelReject(CancelRejectMsg),
    /// Priority update (inbound).
    Priority(PriorityMsg),
    /// Order modified (inbound).
    Modified(ModifiedMsg),
    /// System event (inbound).
    System(SystemMsg),
}

fn expect_len(tag: u8, actual: usize, expected: usize) -> Result<(), DecodeError> {
    if actual == expected {
        Ok(())
    } else {
        Err(DecodeError::WrongBodyLength {
            tag: tag as char,
            expected,
            actual,
        })
    }
}

impl OuchMessage {
    /// Decodes one message from a complete SoupBin payload.
    ///
    /// The first byte is the type tag; the remaining bytes are converted
    /// from network order into the matching variant. The `'U'` and `'M'`
    /// collisions are resolved by the payload length.
    ///
    /// # Errors
    /// - `DecodeError::UnknownMessageType` for a tag outside the variant set
    /// - `DecodeError::WrongBodyLength` when the payload length does not
    ///   match the variant's exact wire size
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let tag = *payload.first().ok_or(DecodeError::Incomplete)?;
        let len = payload.len();
        let body = &payload[1..];
        match tag {
            OrderMsg::TAG => {
                expect_len(tag, len, OrderMsg::WIRE_SIZE)?;
                Ok(Self::Order(OrderMsg::decode_body(body)?))
            }
            ReplaceMsg::TAG if len == ReplaceMsg::WIRE_SIZE => {
                Ok(Self::Replace(ReplaceMsg::decode_body(body)?))
            }
            ReplacedMsg::TAG if len == ReplacedMsg::WIRE_SIZE => {
                Ok(Self::Replaced(ReplacedMsg::decode_body(body)?))
            }
            ReplacedMsg::TAG => Err(DecodeError::WrongBodyLength {
                tag: tag as char,
                expected: ReplacedMsg::WIRE_SIZE,
                actual: len,
            }),
            CancelMsg::TAG => {
                expect_len(tag, len, CancelMsg::WIRE_SIZE)?;
                Ok(Self::Cancel(CancelMsg::decode_body(body)?))
            }
            ModifyMsg::TAG if len == ModifyMsg::WIRE_SIZE => {
                Ok(Self::Modify(ModifyMsg::decode_body(body)?))
            }
            ModifiedMsg::TAG if len == ModifiedMsg::WIRE_SIZE => {
                Ok(Self::Modified(ModifiedMsg::decode_body(body)?))
            }
            ModifiedMsg::TAG => Err(DecodeError::WrongBodyLength {
                tag: tag as char,
                expected: ModifiedMsg::WIRE_SIZE,
                actual: len,
            }),
            AcceptedMsg::TAG => {
                expect_len(tag, len, AcceptedMsg::WIRE_SIZE)?;
                Ok(Self::Accepted(AcceptedMsg::decode_body(body)?))
            }
            CanceledMsg::TAG => {
                expect_len(tag, len, CanceledMsg::WIRE_SIZE)?;
                Ok(Self::Canceled(CanceledMsg::decode_body(body)?))
            }
            AiqCanceledMsg::TAG => {
                expect_len(tag, len, AiqCanceledMsg::WIRE_SIZE)?;
                Ok(Self::AiqCanceled(AiqCanceledMsg::decode_body(body)?))
            }
            ExecutedMsg::TAG => {
                expect_len(tag, len, ExecutedMsg::WIRE_SIZE)?;
                Ok(Self::Executed(ExecutedMsg::decode_body(body)?))
            }
            BrokenTradeMsg::TAG => {
                expect_len(tag, len, BrokenTradeMsg::WIRE_SIZE)?;
                Ok(Self::BrokenTrade(BrokenTradeMsg::decode_body(body)?))
            }
            RejectedMsg::TAG => {
                expect_len(tag, len, RejectedMsg::WIRE_SIZE)?;
                Ok(Self::Rejected(RejectedMsg::decode_body(body)?))
            }
            CancelPendingMsg::TAG => {
                expect_len(tag, len, CancelPendingMsg::WIRE_SIZE)?;
                Ok(Self::CancelPending(CancelPendingMsg::decode_body(body)?))
            }
            CancelRejectMsg::TAG => {
                expect_len(tag, len, CancelRejectMsg::WIRE_SIZE)?;
                Ok(Self::CancelReject(CancelRejectMsg::decode_body(body)?))
            }
            PriorityMsg::TAG => {
                expect_len(tag, len, PriorityMsg::WIRE_SIZE)?;
                Ok(Self::Priority(PriorityMsg::decode_body(body)?))
            }
            SystemMsg::TAG => {
                expect_len(tag, len, SystemMsg::WIRE_SIZE)?;
                Ok(Self::System(SystemMsg::decode_body(body)?))
            }
            other => Err(DecodeError::UnknownMessageType(other as char)),
        }
    }

    /// Encodes the message into wire order: the type tag followed by the
    /// big-endian body.
    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(self.wire_size());
        dst.extend_from_slice(&[self.type_tag()]);
        match self {
            Self::Order(m) => m.encode_body(dst),
            Self::Replace(m) => m.encode_body(dst),
            Self::Cancel(m) => m.encode_body(dst),
            Self::Modify(m) => m.encode_body(dst),
            Self::Accepted(m) => m.encode_body(dst),
            Self::Replaced(m) => m.encode_body(dst),
            Self::Canceled(m) => m.encode_body(dst),
            Self::AiqCanceled(m) => m.encode_body(dst),
            Self::Executed(m) => m.encode_body(dst),
            Self::BrokenTrade(m) => m.encode_body(dst),
            Self::Rejected(m) => m.encode_body(dst),
            Self::CancelPending(m) => m.encode_body(dst),
            Self::CancelReject(m) => m.encode_body(dst),
            Self::Priority(m) => m.encode_body(dst),
            Self::Modified(m) => m.encode_body(dst),
            Self::System(m) => m.encode_body(dst),
        }
    }

    /// Encodes into a fresh buffer of exactly the wire size.
    #[must_use]
    pub fn to_bytes(&self) -> BytesMut {
        let mut dst = BytesMut::with_capacity(self.wire_size());
        self.encode(&mut dst);
        dst
    }

    /// Returns the one-byte type tag.
    #[must_use]
    pub const fn type_tag(&self) -> u8 {
        match self {
            Self::Order(_) => OrderMsg::TAG,
            Self::Replace(_) => ReplaceMsg::TAG,
            Self::Cancel(_) => CancelMsg::TAG,
            Self::Modify(_) => ModifyMsg::TAG,
            Self::Accepted(_) => AcceptedMsg::TAG,
            Self::Replaced(_) => ReplacedMsg::TAG,
            Self::Canceled(_) => CanceledMsg::TAG,
            Self::AiqCanceled(_) => AiqCanceledMsg::TAG,
            Self::Executed(_) => ExecutedMsg::TAG,
            Self::BrokenTrade(_) => BrokenTradeMsg::TAG,
            Self::Rejected(_) => RejectedMsg::TAG,
            Self::CancelPending(_) => CancelPendingMsg::TAG,
            Self::CancelReject(_) => CancelRejectMsg::TAG,
            Self::Priority(_) => PriorityMsg::TAG,
            Self::Modified(_) => ModifiedMsg::TAG,
            Self::System(_) => SystemMsg::TAG,
        }
    }

    /// Returns the exact framed size of this variant, tag byte included.
    #[must_use]
    pub const fn wire_size(&self) -> usize {
        match self {
            Self::Order(_) => OrderMsg::WIRE_SIZE,
            Self::Replace(_) => ReplaceMsg::WIRE_SIZE,
            Self::Cancel(_) => CancelMsg::WIRE_SIZE,
            Self::Modify(_) => ModifyMsg::WIRE_SIZE,
            Self::Accepted(_) => AcceptedMsg::WIRE_SIZE,
            Self::Replaced(_) => ReplacedMsg::WIRE_SIZE,
            Self::Canceled(_) => CanceledMsg::WIRE_SIZE,
            Self::AiqCanceled(_) => AiqCanceledMsg::WIRE_SIZE,
            Self::Executed(_) => ExecutedMsg::WIRE_SIZE,
            Self::BrokenTrade(_) => BrokenTradeMsg::WIRE_SIZE,
            Self::Rejected(_) => RejectedMsg::WIRE_SIZE,
            Self::CancelPending(_) => CancelPendingMsg::WIRE_SIZE,
            Self::CancelReject(_) => CancelRejectMsg::WIRE_SIZE,
            Self::Priority(_) => PriorityMsg::WIRE_SIZE,
            Self::Modified(_) => ModifiedMsg::WIRE_SIZE,
            Self::System(_) => SystemMsg::WIRE_SIZE,
        }
    }

    /// Returns true for participant-to-market variants.
    #[must_use]
    pub const fn is_outbound(&self) -> bool {
        matches!(
            self,
            Self::Order(_) | Self::Replace(_) | Self::Cancel(_) | Self::Modify(_)
        )
    }

    /// Returns true for market-to-participant variants.
    #[must_use]
    pub const fn is_inbound(&self) -> bool {
        !self.is_outbound()
    }

    /// Returns false only for the sequenced messages that are explicitly
    /// flagged non-counting: test-mode rejections.
    #[must_use]
    pub const fn advances_target_seq(&self) -> bool {
        match self {
            Self::Rejected(m) => !m.is_test_mode(),
            _ => true,
        }
    }

    /// Renders the message as FIX-style `TAG=VALUE` pairs separated by
    /// `0x01` for the message log.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(96);
        match self {
            Self::Order(m) => m.render(&mut out),
            Self::Replace(m) => m.render(&mut out),
            Self::Cancel(m) => m.render(&mut out),
            Self::Modify(m) => m.render(&mut out),
            Self::Accepted(m) => m.render(&mut out),
            Self::Replaced(m) => m.render(&mut out),
            Self::Canceled(m) => m.render(&mut out),
            Self::AiqCanceled(m) => m.render(&mut out),
            Self::Executed(m) => m.render(&mut out),
            Self::BrokenTrade(m) => m.render(&mut out),
            Self::Rejected(m) => m.render(&mut out),
            Self::CancelPending(m) => m.render(&mut out),
            Self::CancelReject(m) => m.render(&mut out),
            Self::Priority(m) => m.render(&mut out),
            Self::Modified(m) => m.render(&mut out),
            Self::System(m) => m.render(&mut out),
        }
        out
    }
}

macro_rules! impl_from {
    ($($variant:ident => $msg:ty),* $(,)?) => {
        $(impl From<$msg> for OuchMessage {
            fn from(msg: $msg) -> Self {
                Self::$variant(msg)
            }
        })*
    };
}

impl_from! {
    Order => OrderMsg,
    Replace => ReplaceMsg,
    Cancel => CancelMsg,
    Modify => ModifyMsg,
    Accepted => AcceptedMsg,
    Replaced => ReplacedMsg,
    Canceled => CanceledMsg,
    AiqCanceled => AiqCanceledMsg,
    Executed => ExecutedMsg,
    BrokenTrade => BrokenTradeMsg,
    Rejected => RejectedMsg,
    CancelPending => CancelPendingMsg,
    CancelReject => CancelRejectMsg,
    Priority => PriorityMsg,
    Modified => ModifiedMsg,
    System => SystemMsg,
}
