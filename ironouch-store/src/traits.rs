/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Message store trait definition.
//!
//! Implementations persist outgoing application messages and the two
//! session sequence counters. Counters on disk never trail what has been
//! handed to a peer.

use async_trait::async_trait;
use bytes::Bytes;
use ironouch_core::error::StoreError;
use ironouch_core::types::Timestamp;
use ironouch_session::config::SessionConfig;
use std::sync::Arc;

/// Abstract interface for outgoing-message storage.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persists one outbound message at the current sender sequence
    /// position. The sync variants return only after durability; the async
    /// variant returns after enqueue but guarantees eventual durability in
    /// order.
    ///
    /// # Errors
    /// Returns `StoreError` if the message cannot be stored.
    async fn set(&self, message: &[u8]) -> Result<(), StoreError>;

    /// Returns stored messages with sequence in `[begin, end]` inclusive,
    /// ascending. Sequences with nothing stored are skipped.
    ///
    /// # Errors
    /// Returns `StoreError` if the store cannot be read.
    async fn get_range(&self, begin: u64, end: u64) -> Result<Vec<Bytes>, StoreError>;

    /// Returns the next sender sequence number.
    fn next_sender_seq(&self) -> u64;

    /// Returns the next expected target sequence number.
    fn next_target_seq(&self) -> u64;

    /// Sets the next sender sequence number.
    ///
    /// # Errors
    /// Returns `StoreError` when the counter cannot be persisted.
    fn set_next_sender_seq(&self, seq: u64) -> Result<(), StoreError>;

    /// Sets the next expected target sequence number.
    ///
    /// # Errors
    /// Returns `StoreError` when the counter cannot be persisted.
    fn set_next_target_seq(&self, seq: u64) -> Result<(), StoreError>;

    /// Increments the next sender sequence number.
    ///
    /// # Errors
    /// Returns `StoreError` when the counter cannot be persisted.
    fn incr_next_sender_seq(&self) -> Result<(), StoreError>;

    /// Increments the next expected target sequence number.
    ///
    /// # Errors
    /// Returns `StoreError` when the counter cannot be persisted.
    fn incr_next_target_seq(&self) -> Result<(), StoreError>;

    /// Returns the UTC time the store was first created.
    fn creation_time(&self) -> Timestamp;

    /// Clears everything and restamps the creation time.
    ///
    /// # Errors
    /// Returns `StoreError` if the reset fails.
    async fn reset(&self) -> Result<(), StoreError>;

    /// Reloads counters and index from disk without discarding data.
    ///
    /// # Errors
    /// Returns `StoreError` if the refresh fails.
    async fn refresh(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Quiesces the store. With `wait`, outstanding writes drain first.
    fn stop(&self, _wait: bool) {}
}

/// Creates one store per session at engine build time.
pub trait StoreFactory: Send + Sync {
    /// Builds a store for the given session configuration.
    ///
    /// # Errors
    /// Returns `StoreError` when the backing files cannot be opened.
    fn create(&self, config: &SessionConfig) -> Result<Arc<dyn MessageStore>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockStore;

    #[async_trait]
    impl MessageStore for MockStore {
        async fn set(&self, _message: &[u8]) -> Result<(), StoreError> {
            Ok(())
        }

        async fn get_range(&self, _begin: u64, _end: u64) -> Result<Vec<Bytes>, StoreError> {
            Ok(vec![])
        }

        fn next_sender_seq(&self) -> u64 {
            1
        }

        fn next_target_seq(&self) -> u64 {
            1
        }

        fn set_next_sender_seq(&self, _seq: u64) -> Result<(), StoreError> {
            Ok(())
        }

        fn set_next_target_seq(&self, _seq: u64) -> Result<(), StoreError> {
            Ok(())
        }

        fn incr_next_sender_seq(&self) -> Result<(), StoreError> {
            Ok(())
        }

        fn incr_next_target_seq(&self) -> Result<(), StoreError> {
            Ok(())
        }

        fn creation_time(&self) -> Timestamp {
            Timestamp::now()
        }

        async fn reset(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_mock_store() {
        let store = MockStore;
        assert_eq!(store.next_sender_seq(), 1);
        assert!(store.set(b"test").await.is_ok());
        assert!(store.reset().await.is_ok());
    }
}
