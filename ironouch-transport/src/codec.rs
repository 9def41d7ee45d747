/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Tokio codec for SoupBin packet framing.
//!
//! The decoder extracts successive packets while a complete one is
//! available, leaves partial tails in the buffer, and enforces the
//! single-packet ceiling. The encoder prepends the length/type header.

use crate::packet::{SoupPacket, HEADER_SIZE, MAX_PACKET_SIZE};
use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

/// Errors that can occur during SoupBin framing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FramingError {
    /// A packet declared a framed size over the ceiling.
    #[error("packet too large: {size} bytes exceeds maximum {max_size}")]
    PacketTooLarge {
        /// Declared framed size.
        size: usize,
        /// The ceiling.
        max_size: usize,
    },

    /// An outgoing body would not fit under the ceiling.
    #[error("body too large to frame: {size} bytes")]
    BodyTooLarge {
        /// Body size.
        size: usize,
    },

    /// I/O error from the underlying stream.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for FramingError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Tokio codec for SoupBin packet framing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoupCodec;

impl SoupCodec {
    /// Creates a new codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Decoder for SoupCodec {
    type Item = SoupPacket;
    type Error = FramingError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if src.len() < 2 {
                return Ok(None);
            }
            let declared = usize::from(u16::from_be_bytes([src[0], src[1]]));
            let total = declared + 2;
            if total > MAX_PACKET_SIZE {
                return Err(FramingError::PacketTooLarge {
                    size: total,
                    max_size: MAX_PACKET_SIZE,
                });
            }
            if src.len() < total {
                src.reserve(total - src.len());
                return Ok(None);
            }
            if declared == 0 {
                // tolerate an empty frame the way the wire scanner does
                src.advance(2);
                continue;
            }
            let mut frame = src.split_to(total);
            frame.advance(2);
            let kind = frame[0];
            frame.advance(1);
            return Ok(Some(SoupPacket {
                kind,
                payload: frame.freeze(),
            }));
        }
    }
}

impl Encoder<SoupPacket> for SoupCodec {
    type Error = FramingError;

    fn encode(&mut self, item: SoupPacket, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.framed_size() > MAX_PACKET_SIZE {
            return Err(FramingError::BodyTooLarge {
                size: item.payload.len(),
            });
        }
        dst.reserve(HEADER_SIZE + item.payload.len());
        dst.put_u16(item.payload.len() as u16 + 1);
        dst.put_u8(item.kind);
        dst.put_slice(&item.payload);
        Ok(())
    }
}
