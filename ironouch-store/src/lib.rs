/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronOuch Store
//!
//! Durable outgoing-message stores for the IronOuch engine.
//!
//! This crate provides:
//! - **Trait**: The [`MessageStore`] contract shared by all variants
//! - **Memory**: A `BTreeMap`-backed store for tests
//! - **File**: The four-file durable set `.body`/`.header`/`.seqnums`/`.session`
//! - **Async file**: The file store behind a dedicated writer thread

pub mod async_file;
pub mod file;
pub mod memory;
pub mod traits;

pub use async_file::{AsyncFileStore, AsyncFileStoreFactory};
pub use file::{FileStore, FileStoreFactory};
pub use memory::{MemoryStore, MemoryStoreFactory};
pub use traits::{MessageStore, StoreFactory};
