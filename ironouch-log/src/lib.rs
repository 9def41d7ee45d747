/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronOuch Log
//!
//! Session log sinks for the IronOuch engine.
//!
//! Every session owns one sink receiving its incoming and outgoing
//! messages plus free-text events. Three real variants exist: screen,
//! file and async file; [`NullLog`] swallows everything. These are a
//! protocol feature (the session's durable traffic record), distinct from
//! the engine's `tracing` diagnostics.

pub mod async_file;
pub mod file;

use ironouch_codec::OuchMessage;
use ironouch_core::error::LogError;
use ironouch_core::types::Timestamp;
use ironouch_session::config::SessionConfig;
use std::sync::Arc;

pub use async_file::{AsyncFileLog, AsyncFileLogFactory};
pub use file::{FileLog, FileLogFactory};

/// One session's log sink.
pub trait Log: Send + Sync {
    /// Records a message received from the peer.
    fn on_incoming(&self, message: &OuchMessage);

    /// Records a message sent to the peer.
    fn on_outgoing(&self, message: &OuchMessage);

    /// Records a free-text session event.
    fn on_event(&self, text: &str);

    /// Quiesces the sink. With `wait`, buffered records drain first.
    fn stop(&self, _wait: bool) {}
}

/// Creates one log per session at engine build time.
pub trait LogFactory: Send + Sync {
    /// Builds a sink for the given session configuration.
    ///
    /// # Errors
    /// Returns `LogError` when the backing files cannot be opened.
    fn create(&self, config: &SessionConfig) -> Result<Arc<dyn Log>, LogError>;

    /// Builds the endpoint-wide sink used for events that precede any
    /// session binding (acceptor diagnostics). Defaults to a null sink.
    ///
    /// # Errors
    /// Returns `LogError` when the backing files cannot be opened.
    fn create_global(&self, _config: &SessionConfig) -> Result<Arc<dyn Log>, LogError> {
        Ok(Arc::new(NullLog))
    }
}

/// Sink that discards everything.
#[derive(Debug, Default)]
pub struct NullLog;

impl Log for NullLog {
    fn on_incoming(&self, _message: &OuchMessage) {}

    fn on_outgoing(&self, _message: &OuchMessage) {}

    fn on_event(&self, _text: &str) {}
}

/// Factory for [`NullLog`].
#[derive(Debug, Default)]
pub struct NullLogFactory;

impl LogFactory for NullLogFactory {
    fn create(&self, _config: &SessionConfig) -> Result<Arc<dyn Log>, LogError> {
        Ok(Arc::new(NullLog))
    }
}

/// Sink printing every record to stdout.
#[derive(Debug, Default)]
pub struct ScreenLog;

impl Log for ScreenLog {
    fn on_incoming(&self, message: &OuchMessage) {
        println!("{} in <{}>", Timestamp::now(), message.render());
    }

    fn on_outgoing(&self, message: &OuchMessage) {
        println!("{} out <{}>", Timestamp::now(), message.render());
    }

    fn on_event(&self, text: &str) {
        println!("{} evt {}", Timestamp::now(), text);
    }
}

/// Factory for [`ScreenLog`].
#[derive(Debug, Default)]
pub struct ScreenLogFactory;

impl LogFactory for ScreenLogFactory {
    fn create(&self, _config: &SessionConfig) -> Result<Arc<dyn Log>, LogError> {
        Ok(Arc::new(ScreenLog))
    }

    fn create_global(&self, _config: &SessionConfig) -> Result<Arc<dyn Log>, LogError> {
        Ok(Arc::new(ScreenLog))
    }
}
