/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronOuch Session
//!
//! Session layer building blocks for the IronOuch engine.
//!
//! This crate provides:
//! - **Settings**: INI-style section reader with `[DEFAULT]` merging
//! - **Configuration**: Per-session keys, defaults and validation
//! - **State machine**: The connection states and their transitions
//! - **Heartbeat clock**: Send/receive timestamps and timeout arithmetic

pub mod config;
pub mod heartbeat;
pub mod settings;
pub mod state;

pub use config::{ConnectionType, SessionConfig};
pub use heartbeat::{HeartbeatClock, HEARTBEAT_SEND_INTERVAL};
pub use settings::{expand_path, read_settings, read_settings_file, Section};
pub use state::SessionState;
