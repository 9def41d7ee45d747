/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronOuch Transport
//!
//! SoupBinTCP v3 framing for the IronOuch engine.
//!
//! This crate provides:
//! - **Packet types**: The session-level packet kinds with their fixed
//!   logon body layouts
//! - **Codec**: A Tokio codec for SoupBin framing over TCP
//! - **Byte pipe**: The chunked queue backing each session's outbound buffer

pub mod codec;
pub mod packet;
pub mod pipe;
mod wirestr;

pub use codec::{FramingError, SoupCodec};
pub use packet::{
    LoginAccepted, LoginRejected, LoginRequest, PacketKind, SoupPacket, HEADER_SIZE,
    MAX_PACKET_SIZE,
};
pub use pipe::BytePipe;
