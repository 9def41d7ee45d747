/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! SoupBinTCP v3 packet kinds and logon body layouts.
//!
//! Header: a 16-bit big-endian length followed by a one-byte type; the
//! length covers the type byte plus the body. Sequence-number fields in the
//! logon bodies are 20-byte ASCII, left-padded with spaces.

use crate::wirestr::{get_padded, put_padded};
use arrayvec::ArrayString;
use bytes::{BufMut, Bytes, BytesMut};
use ironouch_core::error::{DecodeError, EncodeError};

/// Size of the packet header: length word plus type byte.
pub const HEADER_SIZE: usize = 3;

/// Hard ceiling on one framed packet (header included). This is the
/// receive-buffer slack: a session treats anything larger as a protocol
/// error.
pub const MAX_PACKET_SIZE: usize = 1024;

/// SoupBin session-level packet kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketKind {
    /// Client to server: login request.
    LoginRequest = b'L',
    /// Client to server: unsequenced data.
    UnsequencedData = b'U',
    /// Client to server: heartbeat.
    ClientHeartbeat = b'R',
    /// Client to server: logout request.
    LogoutRequest = b'O',
    /// Server to client: login accepted.
    LoginAccepted = b'A',
    /// Server to client: login rejected.
    LoginRejected = b'J',
    /// Server to client: sequenced data.
    SequencedData = b'S',
    /// Server to client: heartbeat.
    ServerHeartbeat = b'H',
    /// Server to client: end of session.
    EndOfSession = b'Z',
}

impl PacketKind {
    /// Maps a wire byte onto a packet kind. Unknown bytes map to `None`;
    /// the session skips such packets.
    #[must_use]
    pub const fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            b'L' => Some(Self::LoginRequest),
            b'U' => Some(Self::UnsequencedData),
            b'R' => Some(Self::ClientHeartbeat),
            b'O' => Some(Self::LogoutRequest),
            b'A' => Some(Self::LoginAccepted),
            b'J' => Some(Self::LoginRejected),
            b'S' => Some(Self::SequencedData),
            b'H' => Some(Self::ServerHeartbeat),
            b'Z' => Some(Self::EndOfSession),
            _ => None,
        }
    }

    /// Returns the wire byte of this kind.
    #[inline]
    #[must_use]
    pub const fn as_wire(self) -> u8 {
        self as u8
    }
}

/// One framed SoupBin packet.
///
/// The kind is kept as the raw wire byte so unknown kinds survive framing
/// and can be skipped by the session rather than dropped by the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoupPacket {
    /// Raw packet-type byte.
    pub kind: u8,
    /// Body bytes after the type byte.
    pub payload: Bytes,
}

impl SoupPacket {
    /// Creates a packet of a known kind.
    #[must_use]
    pub fn new(kind: PacketKind, payload: Bytes) -> Self {
        Self {
            kind: kind.as_wire(),
            payload,
        }
    }

    /// Creates an empty-bodied packet (heartbeats, logout, end of session).
    #[must_use]
    pub fn empty(kind: PacketKind) -> Self {
        Self::new(kind, Bytes::new())
    }

    /// Returns the recognized kind, or `None` for an unknown type byte.
    #[must_use]
    pub const fn packet_kind(&self) -> Option<PacketKind> {
        PacketKind::from_wire(self.kind)
    }

    /// Returns the framed size of this packet, header included.
    #[must_use]
    pub fn framed_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Frames a body under a SoupBin header into `dst`.
pub fn frame_packet(kind: PacketKind, body: &[u8], dst: &mut BytesMut) {
    debug_assert!(HEADER_SIZE + body.len() <= MAX_PACKET_SIZE);
    dst.reserve(HEADER_SIZE + body.len());
    dst.put_u16(body.len() as u16 + 1);
    dst.put_u8(kind.as_wire());
    dst.put_slice(body);
}

/// Parses a 20-byte left-space-padded ASCII sequence number.
///
/// # Errors
/// Returns `DecodeError::InvalidSequenceDigits` when a non-space, non-digit
/// byte is present.
pub fn parse_seq_field(field: &[u8]) -> Result<u64, DecodeError> {
    let mut value: u64 = 0;
    for &byte in field {
        match byte {
            b' ' => continue,
            b'0'..=b'9' => value = value * 10 + u64::from(byte - b'0'),
            _ => return Err(DecodeError::InvalidSequenceDigits),
        }
    }
    Ok(value)
}

/// Writes a sequence number as 20-byte left-space-padded ASCII.
pub fn put_seq_field(dst: &mut BytesMut, value: u64) {
    let digits = value.to_string();
    for _ in digits.len()..20 {
        dst.put_u8(b' ');
    }
    dst.put_slice(digits.as_bytes());
}

/// Login request body: 6-byte username, 10-byte password, 10-byte requested
/// session, 20-byte requested sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    /// Username, space-padded on the wire.
    pub username: ArrayString<6>,
    /// Password, space-padded on the wire.
    pub password: ArrayString<10>,
    /// Requested session; blank asks for the current session.
    pub requested_session: ArrayString<10>,
    /// Requested next sequence number.
    pub requested_seq: u64,
}

impl LoginRequest {
    /// Body size on the wire.
    pub const BODY_SIZE: usize = 6 + 10 + 10 + 20;

    /// Creates a login request for the current session.
    ///
    /// # Errors
    /// Returns `EncodeError::FieldTooLong` when the credentials exceed
    /// their wire widths.
    pub fn new(username: &str, password: &str, requested_seq: u64) -> Result<Self, EncodeError> {
        Ok(Self {
            username: ArrayString::from(username).map_err(|_| EncodeError::FieldTooLong {
                field: "Username",
                length: username.len(),
                max_length: 6,
            })?,
            password: ArrayString::from(password).map_err(|_| EncodeError::FieldTooLong {
                field: "Password",
                length: password.len(),
                max_length: 10,
            })?,
            requested_session: ArrayString::new(),
            requested_seq,
        })
    }

    /// Encodes the body.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(Self::BODY_SIZE);
        put_padded(&mut dst, &self.username);
        put_padded(&mut dst, &self.password);
        put_padded(&mut dst, &self.requested_session);
        put_seq_field(&mut dst, self.requested_seq);
        dst.freeze()
    }

    /// Decodes a login request body.
    ///
    /// # Errors
    /// Returns a `DecodeError` for a short or malformed body.
    pub fn decode(mut body: &[u8]) -> Result<Self, DecodeError> {
        if body.len() < Self::BODY_SIZE {
            return Err(DecodeError::Incomplete);
        }
        let username = get_padded::<6>(&mut body)?;
        let password = get_padded::<10>(&mut body)?;
        let requested_session = get_padded::<10>(&mut body)?;
        let requested_seq = parse_seq_field(&body[..20])?;
        Ok(Self {
            username,
            password,
            requested_session,
            requested_seq,
        })
    }
}

/// Login accepted body: 10-byte session, 20-byte next sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginAccepted {
    /// Session assigned by the server; blank here.
    pub session: ArrayString<10>,
    /// The sequence number of the next sequenced message the server will
    /// send.
    pub next_seq: u64,
}

impl LoginAccepted {
    /// Body size on the wire.
    pub const BODY_SIZE: usize = 10 + 20;

    /// Creates a login acceptance carrying the expected sender sequence.
    #[must_use]
    pub fn new(next_seq: u64) -> Self {
        Self {
            session: ArrayString::new(),
            next_seq,
        }
    }

    /// Encodes the body.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(Self::BODY_SIZE);
        put_padded(&mut dst, &self.session);
        put_seq_field(&mut dst, self.next_seq);
        dst.freeze()
    }

    /// Decodes a login accepted body.
    ///
    /// # Errors
    /// Returns a `DecodeError` for a short or malformed body.
    pub fn decode(mut body: &[u8]) -> Result<Self, DecodeError> {
        if body.len() < Self::BODY_SIZE {
            return Err(DecodeError::Incomplete);
        }
        let session = get_padded::<10>(&mut body)?;
        let next_seq = parse_seq_field(&body[..20])?;
        Ok(Self { session, next_seq })
    }
}

/// Login rejected body: a one-byte reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginRejected {
    /// Rejection reason byte: `'A'` not authorized, `'S'` session not
    /// available.
    pub reason: u8,
}

impl LoginRejected {
    /// Body size on the wire.
    pub const BODY_SIZE: usize = 1;

    /// Encodes the body.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        Bytes::copy_from_slice(&[self.reason])
    }

    /// Decodes a login rejected body.
    ///
    /// # Errors
    /// Returns `DecodeError::Incomplete` for an empty body.
    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        match body.first() {
            Some(&reason) => Ok(Self { reason }),
            None => Err(DecodeError::Incomplete),
        }
    }
}
