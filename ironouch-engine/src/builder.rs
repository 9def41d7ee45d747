/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Engine builder.
//!
//! Sessions come from a settings source or are added programmatically;
//! store and log variants are chosen through factories, defaulting to the
//! async file pair. Duplicate session identities are rejected here, so a
//! bad deployment fails before any socket opens.

use crate::application::{Application, NoOpApplication};
use crate::engine::Engine;
use ironouch_core::error::{OuchError, Result, SettingsError};
use ironouch_log::{AsyncFileLogFactory, Log, LogFactory};
use ironouch_session::config::SessionConfig;
use ironouch_session::settings::{read_settings, read_settings_file};
use ironouch_store::{AsyncFileStoreFactory, StoreFactory};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Builder for an [`Engine`].
pub struct EngineBuilder {
    application: Arc<dyn Application>,
    store_factory: Arc<dyn StoreFactory>,
    log_factory: Arc<dyn LogFactory>,
    configs: Vec<SessionConfig>,
}

impl EngineBuilder {
    /// Creates a builder with the default stack: no-op application, async
    /// file store, async file log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            application: Arc::new(NoOpApplication),
            store_factory: Arc::new(AsyncFileStoreFactory),
            log_factory: Arc::new(AsyncFileLogFactory),
            configs: Vec::new(),
        }
    }

    /// Sets the application callback handler.
    #[must_use]
    pub fn with_application(mut self, application: impl Application + 'static) -> Self {
        self.application = Arc::new(application);
        self
    }

    /// Sets the store factory.
    #[must_use]
    pub fn with_store_factory(mut self, factory: impl StoreFactory + 'static) -> Self {
        self.store_factory = Arc::new(factory);
        self
    }

    /// Sets the log factory.
    #[must_use]
    pub fn with_log_factory(mut self, factory: impl LogFactory + 'static) -> Self {
        self.log_factory = Arc::new(factory);
        self
    }

    /// Adds one session configuration.
    #[must_use]
    pub fn add_session(mut self, config: SessionConfig) -> Self {
        self.configs.push(config);
        self
    }

    /// Loads sessions from a settings file.
    ///
    /// # Errors
    /// Returns `OuchError::Settings` for a missing file or an invalid
    /// section.
    pub fn load_settings_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let sections = read_settings_file(path)?;
        for (index, section) in sections.iter().enumerate() {
            self.configs
                .push(SessionConfig::from_section(section, index + 1)?);
        }
        Ok(self)
    }

    /// Loads sessions from settings text.
    ///
    /// # Errors
    /// Returns `OuchError::Settings` for an invalid section.
    pub fn load_settings_str(mut self, text: &str) -> Result<Self> {
        let sections = read_settings(std::io::Cursor::new(text))?;
        for (index, section) in sections.iter().enumerate() {
            self.configs
                .push(SessionConfig::from_section(section, index + 1)?);
        }
        Ok(self)
    }

    /// Builds the engine: one session per configuration, each wired to its
    /// own store and log.
    ///
    /// # Errors
    /// Returns `OuchError::Settings` for duplicate session identities and
    /// `OuchError::Store`/`OuchError::Log` when backing files cannot be
    /// opened.
    pub fn build(self) -> Result<Engine> {
        let mut seen = HashSet::new();
        for config in &self.configs {
            if !seen.insert(config.session_id()) {
                return Err(OuchError::Settings(SettingsError::DuplicateSession {
                    id: config.session_id().to_string(),
                }));
            }
        }

        // the endpoint-wide log serves acceptor events that precede any
        // session binding
        let endpoint_log: Arc<dyn Log> = match self.configs.iter().find(|c| !c.is_initiator()) {
            Some(config) => self.log_factory.create_global(config)?,
            None => Arc::new(ironouch_log::NullLog),
        };

        let mut sessions = Vec::with_capacity(self.configs.len());
        for config in self.configs {
            let store = self.store_factory.create(&config)?;
            let log = self.log_factory.create(&config)?;
            sessions.push(crate::session::Session::new(config, store, log));
        }

        Ok(Engine::new(sessions, self.application, endpoint_log))
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironouch_log::NullLogFactory;
    use ironouch_store::MemoryStoreFactory;

    const SETTINGS: &str = "\
[DEFAULT]
SocketConnectHost=localhost
SocketConnectPort=9123
SocketAcceptPort=9123
[SESSION]
Username=zhb
Password=xxx
ConnectionType=acceptor
[SESSION]
Username=zhb2
Password=xxx
ConnectionType=acceptor
";

    fn builder() -> EngineBuilder {
        EngineBuilder::new()
            .with_store_factory(MemoryStoreFactory)
            .with_log_factory(NullLogFactory)
    }

    #[test]
    fn test_build_from_settings() {
        let engine = builder().load_settings_str(SETTINGS).unwrap().build().unwrap();
        assert_eq!(engine.sessions().len(), 2);
        assert_eq!(engine.sessions()[0].id().to_string(), "OUCH->zhb");
        assert_eq!(engine.sessions()[1].id().to_string(), "OUCH->zhb2");
    }

    #[test]
    fn test_duplicate_session_rejected() {
        let duplicated = SETTINGS.replace("zhb2", "zhb");
        let err = builder()
            .load_settings_str(&duplicated)
            .unwrap()
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "settings error: duplicate session OUCH->zhb");
    }

    #[test]
    fn test_invalid_section_fails_fast() {
        let broken = SETTINGS.replacen("ConnectionType=acceptor", "ConnectionType=peer", 1);
        assert!(builder().load_settings_str(&broken).is_err());
    }
}
