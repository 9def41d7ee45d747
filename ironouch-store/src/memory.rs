/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! In-memory message store implementation.
//!
//! All data is lost when the process exits; suitable for tests and
//! latency-sensitive setups that accept that.

use crate::traits::{MessageStore, StoreFactory};
use async_trait::async_trait;
use bytes::Bytes;
use ironouch_core::error::StoreError;
use ironouch_core::types::Timestamp;
use ironouch_session::config::SessionConfig;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// In-memory message store over a `BTreeMap` for range queries.
#[derive(Debug)]
pub struct MemoryStore {
    messages: RwLock<BTreeMap<u64, Bytes>>,
    next_sender_seq: AtomicU64,
    next_target_seq: AtomicU64,
    creation_time: RwLock<Timestamp>,
}

impl MemoryStore {
    /// Creates a new empty memory store with counters at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(BTreeMap::new()),
            next_sender_seq: AtomicU64::new(1),
            next_target_seq: AtomicU64::new(1),
            creation_time: RwLock::new(Timestamp::now()),
        }
    }

    /// Returns the number of stored messages.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.read().len()
    }

    /// Checks if a message with the given sequence number exists.
    #[must_use]
    pub fn contains(&self, seq: u64) -> bool {
        self.messages.read().contains_key(&seq)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn set(&self, message: &[u8]) -> Result<(), StoreError> {
        let seq = self.next_sender_seq.load(Ordering::SeqCst);
        self.messages
            .write()
            .insert(seq, Bytes::copy_from_slice(message));
        Ok(())
    }

    async fn get_range(&self, begin: u64, end: u64) -> Result<Vec<Bytes>, StoreError> {
        let messages = self.messages.read();
        Ok(messages
            .range(begin..=end)
            .map(|(_, bytes)| bytes.clone())
            .collect())
    }

    fn next_sender_seq(&self) -> u64 {
        self.next_sender_seq.load(Ordering::SeqCst)
    }

    fn next_target_seq(&self) -> u64 {
        self.next_target_seq.load(Ordering::SeqCst)
    }

    fn set_next_sender_seq(&self, seq: u64) -> Result<(), StoreError> {
        self.next_sender_seq.store(seq, Ordering::SeqCst);
        Ok(())
    }

    fn set_next_target_seq(&self, seq: u64) -> Result<(), StoreError> {
        self.next_target_seq.store(seq, Ordering::SeqCst);
        Ok(())
    }

    fn incr_next_sender_seq(&self) -> Result<(), StoreError> {
        self.next_sender_seq.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn incr_next_target_seq(&self) -> Result<(), StoreError> {
        self.next_target_seq.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn creation_time(&self) -> Timestamp {
        *self.creation_time.read()
    }

    async fn reset(&self) -> Result<(), StoreError> {
        self.messages.write().clear();
        self.next_sender_seq.store(1, Ordering::SeqCst);
        self.next_target_seq.store(1, Ordering::SeqCst);
        *self.creation_time.write() = Timestamp::now();
        Ok(())
    }
}

/// Factory producing one [`MemoryStore`] per session.
#[derive(Debug, Default)]
pub struct MemoryStoreFactory;

impl StoreFactory for MemoryStoreFactory {
    fn create(&self, _config: &SessionConfig) -> Result<Arc<dyn MessageStore>, StoreError> {
        Ok(Arc::new(MemoryStore::new()))
    }
}
