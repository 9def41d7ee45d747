/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronOuch Core
//!
//! Core types and errors for the IronOuch OUCH 4.2 engine.
//!
//! This crate provides:
//! - **Value types**: Sequence numbers, session identifiers, order sides,
//!   fixed-point prices, and UTC timestamps
//! - **Error hierarchy**: Typed, domain-specific errors using `thiserror`

pub mod error;
pub mod types;

pub use error::{
    DecodeError, EncodeError, LogError, OuchError, Result, SessionError, SettingsError, StoreError,
};
pub use types::{CompId, Price, SeqNum, SessionId, Side, Timestamp};
