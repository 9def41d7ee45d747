/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Asynchronous variant of the file store.
//!
//! Writes are serialized onto a queue drained by one dedicated worker
//! thread so blocking file I/O stays off the session path. `set` captures
//! the sequence number at enqueue time and returns immediately; ordering
//! and eventual durability follow from the FIFO queue. Reads share the
//! file store's internal lock with the worker.

use crate::file::FileStore;
use crate::traits::{MessageStore, StoreFactory};
use async_trait::async_trait;
use bytes::Bytes;
use crossbeam_channel::{unbounded, Sender};
use ironouch_core::error::StoreError;
use ironouch_core::types::Timestamp;
use ironouch_session::config::SessionConfig;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::error;

enum StoreOp {
    Set { seq: u64, message: Bytes },
    SyncSeqNums,
    Stop,
}

/// File store behind a dedicated writer thread.
pub struct AsyncFileStore {
    store: Arc<FileStore>,
    tx: Sender<StoreOp>,
    worker: Mutex<Option<JoinHandle<()>>>,
    discard: Arc<AtomicBool>,
}

impl AsyncFileStore {
    /// Opens the backing file store and spawns the writer thread.
    ///
    /// # Errors
    /// Returns `StoreError` when the backing files cannot be opened or the
    /// thread cannot start.
    pub fn open(config: &SessionConfig) -> Result<Self, StoreError> {
        Self::wrap(FileStore::open(config)?, &config.session_id().to_string())
    }

    /// Wraps an already-open file store; used by tests to control paths.
    ///
    /// # Errors
    /// Returns `StoreError::Io` when the worker thread cannot start.
    pub fn wrap(store: FileStore, label: &str) -> Result<Self, StoreError> {
        let store = Arc::new(store);
        let (tx, rx) = unbounded::<StoreOp>();
        let discard = Arc::new(AtomicBool::new(false));

        let worker_store = Arc::clone(&store);
        let worker_discard = Arc::clone(&discard);
        let worker = std::thread::Builder::new()
            .name(format!("store-{label}"))
            .spawn(move || {
                while let Ok(op) = rx.recv() {
                    match op {
                        StoreOp::Set { seq, message } => {
                            if worker_discard.load(Ordering::Acquire) {
                                continue;
                            }
                            if let Err(err) = worker_store.write_message(seq, &message) {
                                error!(seq, %err, "store worker terminating");
                                return;
                            }
                        }
                        StoreOp::SyncSeqNums => {
                            if worker_discard.load(Ordering::Acquire) {
                                continue;
                            }
                            if let Err(err) = worker_store.write_seqnums() {
                                error!(%err, "store worker terminating");
                                return;
                            }
                        }
                        StoreOp::Stop => break,
                    }
                }
            })
            .map_err(|e| StoreError::Io(e.to_string()))?;

        Ok(Self {
            store,
            tx,
            worker: Mutex::new(Some(worker)),
            discard,
        })
    }

    fn enqueue(&self, op: StoreOp) {
        // a closed channel means the worker already died with a diagnostic
        let _ = self.tx.send(op);
    }
}

#[async_trait]
impl MessageStore for AsyncFileStore {
    async fn set(&self, message: &[u8]) -> Result<(), StoreError> {
        let seq = self.store.next_sender_seq();
        self.enqueue(StoreOp::Set {
            seq,
            message: Bytes::copy_from_slice(message),
        });
        Ok(())
    }

    async fn get_range(&self, begin: u64, end: u64) -> Result<Vec<Bytes>, StoreError> {
        self.store.get_range(begin, end).await
    }

    fn next_sender_seq(&self) -> u64 {
        self.store.next_sender_seq()
    }

    fn next_target_seq(&self) -> u64 {
        self.store.next_target_seq()
    }

    fn set_next_sender_seq(&self, seq: u64) -> Result<(), StoreError> {
        self.store.cache_set_sender(seq);
        self.enqueue(StoreOp::SyncSeqNums);
        Ok(())
    }

    fn set_next_target_seq(&self, seq: u64) -> Result<(), StoreError> {
        self.store.cache_set_target(seq);
        self.enqueue(StoreOp::SyncSeqNums);
        Ok(())
    }

    fn incr_next_sender_seq(&self) -> Result<(), StoreError> {
        self.store.cache_incr_sender();
        self.enqueue(StoreOp::SyncSeqNums);
        Ok(())
    }

    fn incr_next_target_seq(&self) -> Result<(), StoreError> {
        self.store.cache_incr_target();
        self.enqueue(StoreOp::SyncSeqNums);
        Ok(())
    }

    fn creation_time(&self) -> Timestamp {
        self.store.creation_time()
    }

    async fn reset(&self) -> Result<(), StoreError> {
        self.store.reset().await
    }

    async fn refresh(&self) -> Result<(), StoreError> {
        self.store.refresh().await
    }

    fn stop(&self, wait: bool) {
        if !wait {
            self.discard.store(true, Ordering::Release);
        }
        self.enqueue(StoreOp::Stop);
        if let Some(worker) = self.worker.lock().take() {
            let _ = worker.join();
        }
    }
}

impl Drop for AsyncFileStore {
    fn drop(&mut self) {
        // idempotent: stop() may already have taken the handle
        let _ = self.tx.send(StoreOp::Stop);
        if let Some(worker) = self.worker.lock().take() {
            let _ = worker.join();
        }
    }
}

/// Factory producing one [`AsyncFileStore`] per session. This is the
/// default store of the engine.
#[derive(Debug, Default)]
pub struct AsyncFileStoreFactory;

impl StoreFactory for AsyncFileStoreFactory {
    fn create(&self, config: &SessionConfig) -> Result<Arc<dyn MessageStore>, StoreError> {
        Ok(Arc::new(AsyncFileStore::open(config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironouch_core::types::{CompId, SessionId};
    use tempfile::tempdir;

    fn session_id() -> SessionId {
        SessionId::new(CompId::new("zhb").unwrap(), CompId::new("OUCH").unwrap())
    }

    fn open(dir: &std::path::Path) -> AsyncFileStore {
        AsyncFileStore::wrap(FileStore::open_at(dir, &session_id()).unwrap(), "test").unwrap()
    }

    #[tokio::test]
    async fn test_stop_with_wait_drains_every_set() {
        let dir = tempdir().unwrap();
        {
            let store = open(dir.path());
            for i in 0..200u32 {
                store.set(format!("message-{i}").as_bytes()).await.unwrap();
                store.incr_next_sender_seq().unwrap();
            }
            store.stop(true);
        }

        let store = FileStore::open_at(dir.path(), &session_id()).unwrap();
        assert_eq!(store.next_sender_seq(), 201);
        let messages = store.get_range(1, 200).await.unwrap();
        assert_eq!(messages.len(), 200);
        assert_eq!(&messages[0][..], b"message-0");
        assert_eq!(&messages[199][..], b"message-199");
    }

    #[tokio::test]
    async fn test_set_preserves_enqueue_order() {
        let dir = tempdir().unwrap();
        let store = open(dir.path());
        for payload in [&b"a"[..], b"bb", b"ccc"] {
            store.set(payload).await.unwrap();
            store.incr_next_sender_seq().unwrap();
        }
        store.stop(true);

        let messages = store.get_range(1, 3).await.unwrap();
        assert_eq!(&messages[0][..], b"a");
        assert_eq!(&messages[1][..], b"bb");
        assert_eq!(&messages[2][..], b"ccc");
    }

    #[tokio::test]
    async fn test_counters_visible_before_drain() {
        let dir = tempdir().unwrap();
        let store = open(dir.path());
        store.incr_next_sender_seq().unwrap();
        store.incr_next_target_seq().unwrap();
        assert_eq!(store.next_sender_seq(), 2);
        assert_eq!(store.next_target_seq(), 2);
        store.stop(true);
    }

    #[tokio::test]
    async fn test_stop_without_wait_discards_pending() {
        let dir = tempdir().unwrap();
        let store = open(dir.path());
        for _ in 0..50 {
            store.set(b"maybe-dropped").await.unwrap();
            store.incr_next_sender_seq().unwrap();
        }
        // no drain requested; some writes may be skipped, but stop returns
        store.stop(false);
    }
}
