/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronOuch Codec
//!
//! OUCH 4.2 binary message codec for the IronOuch engine.
//!
//! This crate provides:
//! - **Outbound variants**: Order, Replace, Cancel, Modify (to market)
//! - **Inbound variants**: Accepted, Replaced, Canceled and the rest of the
//!   execution-report set (from market)
//! - **Wire conversion**: Explicit big-endian serializers over byte slices;
//!   fixed layouts are constant-asserted against the published wire sizes
//! - **Log rendering**: Each variant renders itself as FIX-style `TAG=VALUE`
//!   pairs separated by `0x01` for the session message log
//!
//! The `'U'` (Replace vs Replaced) and `'M'` (Modify vs Modified) tag
//! collisions are resolved at decode time by body length; the variants are
//! distinct types, so the direction is explicit everywhere downstream.

pub mod inbound;
pub mod message;
pub mod outbound;
mod render;
mod wire;

pub use inbound::{
    AcceptedMsg, AiqCanceledMsg, BrokenTradeMsg, CancelPendingMsg, CancelRejectMsg, CanceledMsg,
    ExecutedMsg, ModifiedMsg, PriorityMsg, RejectedMsg, ReplacedMsg, SystemMsg,
};
pub use message::OuchMessage;
pub use outbound::{CancelMsg, ModifyMsg, OrderMsg, ReplaceMsg};
