/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronOuch
//!
//! A SoupBinTCP v3 / OUCH 4.2 order-entry session engine for Rust.
//!
//! One code base serves both ends of a session: the initiating client and
//! the accepting server. Each session is authenticated, ordered and
//! heartbeat-monitored; outgoing application messages persist durably and
//! all traffic is logged.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ironouch::prelude::*;
//!
//! let engine = EngineBuilder::new()
//!     .with_application(MyApplication)
//!     .load_settings_file("sessions.cfg")?
//!     .build()?;
//! engine.connect().await?;
//! engine.wait().await;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Fundamental types and error definitions
//! - [`codec`]: OUCH 4.2 message layouts, wire conversion and log rendering
//! - [`transport`]: SoupBin packet framing and the outbound byte pipe
//! - [`session`]: Settings, configuration, state machine, heartbeat clock
//! - [`store`]: Message persistence (memory, file, async file)
//! - [`log`]: Session message/event log sinks
//! - [`engine`]: Session driver, initiator/acceptor, endpoint manager

pub mod core {
    //! Fundamental types and error definitions.
    pub use ironouch_core::*;
}

pub mod codec {
    //! OUCH 4.2 message layouts, wire conversion and log rendering.
    pub use ironouch_codec::*;
}

pub mod transport {
    //! SoupBin packet framing and the outbound byte pipe.
    pub use ironouch_transport::*;
}

pub mod session {
    //! Settings, configuration, state machine, heartbeat clock.
    pub use ironouch_session::*;
}

pub mod store {
    //! Message persistence: memory, file, async file.
    pub use ironouch_store::*;
}

pub mod log {
    //! Session message/event log sinks.
    pub use ironouch_log::*;
}

pub mod engine {
    //! Session driver, initiator/acceptor, endpoint manager.
    pub use ironouch_engine::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use ironouch_core::{
        CompId, DecodeError, EncodeError, OuchError, Price, Result, SeqNum, SessionError,
        SessionId, SettingsError, Side, StoreError, Timestamp,
    };

    // OUCH messages
    pub use ironouch_codec::{
        AcceptedMsg, AiqCanceledMsg, BrokenTradeMsg, CancelMsg, CancelPendingMsg, CancelRejectMsg,
        CanceledMsg, ExecutedMsg, ModifiedMsg, ModifyMsg, OrderMsg, OuchMessage, PriorityMsg,
        RejectedMsg, ReplaceMsg, ReplacedMsg, SystemMsg,
    };

    // Transport
    pub use ironouch_transport::{BytePipe, PacketKind, SoupCodec, SoupPacket};

    // Session
    pub use ironouch_session::{
        ConnectionType, HeartbeatClock, SessionConfig, SessionState,
    };

    // Store
    pub use ironouch_store::{
        AsyncFileStoreFactory, FileStore, FileStoreFactory, MemoryStore, MemoryStoreFactory,
        MessageStore, StoreFactory,
    };

    // Log
    pub use ironouch_log::{
        AsyncFileLogFactory, FileLogFactory, Log, LogFactory, NullLog, NullLogFactory, ScreenLog,
        ScreenLogFactory,
    };

    // Engine
    pub use ironouch_engine::{Application, Engine, EngineBuilder, NoOpApplication, Session};
}
