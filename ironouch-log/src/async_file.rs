/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Asynchronous variant of the file log.
//!
//! Records are enqueued and drained by one dedicated worker thread with
//! the same queue discipline as the async store: rendering and blocking
//! file I/O happen on the worker, timestamps are stamped at write time.

use crate::file::FileLog;
use crate::{Log, LogFactory};
use crossbeam_channel::{unbounded, Sender};
use ironouch_codec::OuchMessage;
use ironouch_core::error::LogError;
use ironouch_session::config::SessionConfig;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

enum LogRecord {
    Message(OuchMessage),
    Event(String),
    Stop,
}

/// File log behind a dedicated writer thread.
pub struct AsyncFileLog {
    tx: Sender<LogRecord>,
    worker: Mutex<Option<JoinHandle<()>>>,
    discard: Arc<AtomicBool>,
}

impl AsyncFileLog {
    /// Opens the backing file log and spawns the writer thread.
    ///
    /// # Errors
    /// Returns `LogError` when the streams cannot be opened or the thread
    /// cannot start.
    pub fn open(config: &SessionConfig) -> Result<Self, LogError> {
        Self::wrap(FileLog::open(config)?, &config.session_id().to_string())
    }

    /// Wraps an already-open file log; used by tests and the global sink.
    ///
    /// # Errors
    /// Returns `LogError::Io` when the worker thread cannot start.
    pub fn wrap(log: FileLog, label: &str) -> Result<Self, LogError> {
        let (tx, rx) = unbounded::<LogRecord>();
        let discard = Arc::new(AtomicBool::new(false));

        let worker_discard = Arc::clone(&discard);
        let worker = std::thread::Builder::new()
            .name(format!("log-{label}"))
            .spawn(move || {
                while let Ok(record) = rx.recv() {
                    if worker_discard.load(Ordering::Acquire) {
                        if matches!(record, LogRecord::Stop) {
                            break;
                        }
                        continue;
                    }
                    match record {
                        LogRecord::Message(message) => log.write_message_line(&message.render()),
                        LogRecord::Event(text) => log.write_event_line(&text),
                        LogRecord::Stop => break,
                    }
                }
            })
            .map_err(|e| LogError::Io(e.to_string()))?;

        Ok(Self {
            tx,
            worker: Mutex::new(Some(worker)),
            discard,
        })
    }
}

impl Log for AsyncFileLog {
    fn on_incoming(&self, message: &OuchMessage) {
        let _ = self.tx.send(LogRecord::Message(message.clone()));
    }

    fn on_outgoing(&self, message: &OuchMessage) {
        let _ = self.tx.send(LogRecord::Message(message.clone()));
    }

    fn on_event(&self, text: &str) {
        let _ = self.tx.send(LogRecord::Event(text.to_string()));
    }

    fn stop(&self, wait: bool) {
        if !wait {
            self.discard.store(true, Ordering::Release);
        }
        let _ = self.tx.send(LogRecord::Stop);
        if let Some(worker) = self.worker.lock().take() {
            let _ = worker.join();
        }
    }
}

impl Drop for AsyncFileLog {
    fn drop(&mut self) {
        let _ = self.tx.send(LogRecord::Stop);
        if let Some(worker) = self.worker.lock().take() {
            let _ = worker.join();
        }
    }
}

/// Factory producing one [`AsyncFileLog`] per session. This is the
/// default log of the engine.
#[derive(Debug, Default)]
pub struct AsyncFileLogFactory;

impl LogFactory for AsyncFileLogFactory {
    fn create(&self, config: &SessionConfig) -> Result<Arc<dyn Log>, LogError> {
        Ok(Arc::new(AsyncFileLog::open(config)?))
    }

    fn create_global(&self, config: &SessionConfig) -> Result<Arc<dyn Log>, LogError> {
        Ok(Arc::new(AsyncFileLog::wrap(
            FileLog::open_at(&FileLog::resolve_dir(config), "GLOBAL")?,
            "GLOBAL",
        )?))
    }
}
