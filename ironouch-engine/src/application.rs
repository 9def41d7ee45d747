/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Application callback interface.
//!
//! Implement this trait to receive session lifecycle events and inbound
//! application messages. Callbacks run on the session's driver task, in
//! strict arrival order for any one session.

use crate::session::Session;
use async_trait::async_trait;
use ironouch_codec::OuchMessage;
use std::sync::Arc;

/// Callback interface for session events and application messages.
#[async_trait]
pub trait Application: Send + Sync {
    /// Called once when a session is taken into service.
    async fn on_create(&self, _session: &Arc<Session>) {}

    /// Called when a logon completes.
    async fn on_logon(&self, _session: &Arc<Session>) {}

    /// Called when the session disconnects, for any reason.
    async fn on_logout(&self, _session: &Arc<Session>) {}

    /// Called for every delivered application message, sequenced or not.
    async fn from_app(&self, _message: &OuchMessage, _session: &Arc<Session>) {}
}

/// Default no-op application implementation.
#[derive(Debug, Default)]
pub struct NoOpApplication;

#[async_trait]
impl Application for NoOpApplication {}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_application_compiles_as_trait_object() {
        let app: Arc<dyn Application> = Arc::new(NoOpApplication);
        // no session available here; the default methods are exercised by
        // the engine tests
        let _ = app;
    }
}
