/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronOuch Engine
//!
//! High-level endpoint facade for the IronOuch OUCH 4.2 engine.
//!
//! This crate provides:
//! - **Application trait**: Callback interface for session events and
//!   application messages
//! - **Session**: The per-session protocol engine (framing, dispatch,
//!   heartbeat, sequencing, store/log wiring)
//! - **Initiator**: Dial loop with logon and reconnect
//! - **Acceptor**: One listener per port handing sockets to unbound sessions
//! - **Engine/Builder**: Endpoint lifecycle from a settings file to
//!   shutdown

mod acceptor;
pub mod application;
pub mod builder;
mod driver;
pub mod engine;
mod initiator;
pub mod session;

pub use application::{Application, NoOpApplication};
pub use builder::EngineBuilder;
pub use engine::Engine;
pub use session::Session;
