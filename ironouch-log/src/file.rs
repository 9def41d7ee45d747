/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! File based log sink.
//!
//! Two append streams per session under the expanded `FileLogPath`:
//! `SENDER-TARGET.messages.current.log` and
//! `SENDER-TARGET.events.current.log`. Each line leads with a
//! millisecond-precision UTC timestamp.

use crate::{Log, LogFactory};
use ironouch_codec::OuchMessage;
use ironouch_core::error::LogError;
use ironouch_core::types::Timestamp;
use ironouch_session::config::SessionConfig;
use ironouch_session::settings::expand_path;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::error;

fn open_append(name: &'static str, path: &Path) -> Result<File, LogError> {
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|_| LogError::Open {
            name,
            path: path.display().to_string(),
        })
}

/// File based log sink.
pub struct FileLog {
    messages: Mutex<File>,
    events: Mutex<File>,
}

impl FileLog {
    /// Opens (or creates) the two log streams for a session, expanding the
    /// `FileLogPath` date tokens.
    ///
    /// # Errors
    /// Returns `LogError::Open` when a stream cannot be opened; this is
    /// fatal at startup.
    pub fn open(config: &SessionConfig) -> Result<Self, LogError> {
        Self::open_at(&Self::resolve_dir(config), &config.session_id().file_prefix())
    }

    /// Opens the two log streams under an explicit directory with an
    /// explicit file prefix (sessions use `SENDER-TARGET`, the endpoint
    /// log uses `GLOBAL`).
    ///
    /// # Errors
    /// Returns `LogError::Open` when a stream cannot be opened.
    pub fn open_at(dir: &Path, prefix: &str) -> Result<Self, LogError> {
        std::fs::create_dir_all(dir).map_err(|_| LogError::Open {
            name: "directory",
            path: dir.display().to_string(),
        })?;
        let messages = open_append(
            "messages",
            &dir.join(format!("{prefix}.messages.current.log")),
        )?;
        let events = open_append("events", &dir.join(format!("{prefix}.events.current.log")))?;
        Ok(Self {
            messages: Mutex::new(messages),
            events: Mutex::new(events),
        })
    }

    pub(crate) fn resolve_dir(config: &SessionConfig) -> PathBuf {
        PathBuf::from(expand_path(config.file_log_path.as_deref().unwrap_or(".")))
    }

    pub(crate) fn write_message_line(&self, rendered: &str) {
        let mut file = self.messages.lock();
        if let Err(err) = writeln!(file, "{} : {}", Timestamp::now(), rendered) {
            error!(%err, "failed to write messages log");
        }
    }

    pub(crate) fn write_event_line(&self, text: &str) {
        let mut file = self.events.lock();
        if let Err(err) = writeln!(file, "{} : {}", Timestamp::now(), text) {
            error!(%err, "failed to write events log");
        }
    }
}

impl Log for FileLog {
    fn on_incoming(&self, message: &OuchMessage) {
        self.write_message_line(&message.render());
    }

    fn on_outgoing(&self, message: &OuchMessage) {
        self.write_message_line(&message.render());
    }

    fn on_event(&self, text: &str) {
        self.write_event_line(text);
    }
}

/// Factory producing one [`FileLog`] per session.
#[derive(Debug, Default)]
pub struct FileLogFactory;

impl LogFactory for FileLogFactory {
    fn create(&self, config: &SessionConfig) -> Result<Arc<dyn Log>, LogError> {
        Ok(Arc::new(FileLog::open(config)?))
    }

    fn create_global(&self, config: &SessionConfig) -> Result<Arc<dyn Log>, LogError> {
        Ok(Arc::new(FileLog::open_at(
            &FileLog::resolve_dir(config),
            "GLOBAL",
        )?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironouch_codec::OrderMsg;
    use ironouch_core::types::{Price, Side};
    use tempfile::tempdir;

    #[test]
    fn test_lines_carry_millisecond_timestamps() {
        let dir = tempdir().unwrap();
        let log = FileLog::open_at(dir.path(), "zhb-OUCH").unwrap();
        let msg: OuchMessage = OrderMsg::new("1", Side::Buy, 1, "A", Price::from_raw(1))
            .unwrap()
            .into();
        log.on_incoming(&msg);
        log.on_outgoing(&msg);
        log.on_event("Created session");

        let messages =
            std::fs::read_to_string(dir.path().join("zhb-OUCH.messages.current.log")).unwrap();
        let events =
            std::fs::read_to_string(dir.path().join("zhb-OUCH.events.current.log")).unwrap();
        assert_eq!(messages.lines().count(), 2);
        for line in messages.lines() {
            // YYYYMMDD-HH:MM:SS.mmm : 35=...
            assert_eq!(&line[17..18], ".");
            assert_eq!(&line[21..24], " : ");
            assert!(line[24..].starts_with("35="));
        }
        assert!(events.lines().next().unwrap().ends_with("Created session"));
    }

    #[test]
    fn test_reopen_appends() {
        let dir = tempdir().unwrap();
        {
            let log = FileLog::open_at(dir.path(), "x").unwrap();
            log.on_event("first");
        }
        {
            let log = FileLog::open_at(dir.path(), "x").unwrap();
            log.on_event("second");
        }
        let events = std::fs::read_to_string(dir.path().join("x.events.current.log")).unwrap();
        assert_eq!(events.lines().count(), 2);
    }
}
