/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! File based implementation of `MessageStore`.
//!
//! Four files are kept per session under the expanded `FileStorePath`:
//!
//! - `SENDER-TARGET.body`: append-only stream of outbound message bytes
//! - `SENDER-TARGET.header`: one `seq,offset,length ` entry per message
//! - `SENDER-TARGET.seqnums`: the counters, rewritten in place as
//!   fixed-width `%010d : %010d` so rewrites never need truncation
//! - `SENDER-TARGET.session`: creation UTC timestamp `YYYYMMDD-HH:MM:SS`
//!
//! On open the header replays into an in-memory `seq -> (offset, length)`
//! map, the counters load from `.seqnums`, and the creation time from
//! `.session`. Body and header flush after every set; the counter file
//! rewinds and rewrites after every counter change.

use crate::traits::{MessageStore, StoreFactory};
use async_trait::async_trait;
use bytes::Bytes;
use ironouch_core::error::StoreError;
use ironouch_core::types::{SessionId, Timestamp};
use ironouch_session::config::SessionConfig;
use ironouch_session::settings::expand_path;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct StorePaths {
    body: PathBuf,
    header: PathBuf,
    seqnums: PathBuf,
    session: PathBuf,
}

#[derive(Debug)]
struct StoreFiles {
    body: File,
    header: File,
    seqnums: File,
    session: File,
    offsets: BTreeMap<u64, (u64, u64)>,
}

/// File based message store.
#[derive(Debug)]
pub struct FileStore {
    paths: StorePaths,
    files: Mutex<StoreFiles>,
    next_sender_seq: AtomicU64,
    next_target_seq: AtomicU64,
    creation_time: RwLock<Timestamp>,
}

fn open_rw(name: &'static str, path: &Path) -> Result<File, StoreError> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|_| StoreError::Open {
            name,
            path: path.display().to_string(),
        })
}

fn write_failure(path: &Path, err: &std::io::Error) -> StoreError {
    StoreError::Write {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

impl FileStore {
    /// Opens (or creates) the store for a session configuration, expanding
    /// the `FileStorePath` date tokens.
    ///
    /// # Errors
    /// Returns `StoreError::Open` when any of the four files cannot be
    /// opened; this is fatal at startup.
    pub fn open(config: &SessionConfig) -> Result<Self, StoreError> {
        let pattern = config.file_store_path.as_deref().unwrap_or(".");
        let dir = PathBuf::from(expand_path(pattern));
        Self::open_at(&dir, &config.session_id())
    }

    /// Opens (or creates) the store under an explicit directory.
    ///
    /// # Errors
    /// Returns `StoreError::Open` when any of the four files cannot be
    /// opened.
    pub fn open_at(dir: &Path, session_id: &SessionId) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir).map_err(|_| StoreError::Open {
            name: "directory",
            path: dir.display().to_string(),
        })?;
        let prefix = dir.join(session_id.file_prefix());
        let paths = StorePaths {
            body: prefix.with_extension("body"),
            header: prefix.with_extension("header"),
            seqnums: prefix.with_extension("seqnums"),
            session: prefix.with_extension("session"),
        };

        let store = Self {
            files: Mutex::new(StoreFiles {
                body: open_rw("body", &paths.body)?,
                header: open_rw("header", &paths.header)?,
                seqnums: open_rw("seqnums", &paths.seqnums)?,
                session: open_rw("session", &paths.session)?,
                offsets: BTreeMap::new(),
            }),
            paths,
            next_sender_seq: AtomicU64::new(1),
            next_target_seq: AtomicU64::new(1),
            creation_time: RwLock::new(Timestamp::now()),
        };
        store.populate()?;
        store.write_seqnums()?;
        Ok(store)
    }

    /// Replays the header, counter and session files into memory. A missing
    /// or blank session file stamps a fresh creation time.
    fn populate(&self) -> Result<(), StoreError> {
        let mut files = self.files.lock();

        files.offsets.clear();
        let mut header_text = String::new();
        files
            .header
            .seek(SeekFrom::Start(0))
            .map_err(|e| write_failure(&self.paths.header, &e))?;
        files
            .header
            .read_to_string(&mut header_text)
            .map_err(|e| write_failure(&self.paths.header, &e))?;
        for entry in header_text.split_whitespace() {
            let mut parts = entry.split(',');
            let (seq, offset, len) = match (parts.next(), parts.next(), parts.next()) {
                (Some(a), Some(b), Some(c)) => (
                    a.parse::<u64>(),
                    b.parse::<u64>(),
                    c.parse::<u64>(),
                ),
                _ => {
                    return Err(StoreError::Corrupted {
                        reason: format!("bad header entry '{entry}'"),
                    })
                }
            };
            match (seq, offset, len) {
                (Ok(seq), Ok(offset), Ok(len)) => {
                    files.offsets.insert(seq, (offset, len));
                }
                _ => {
                    return Err(StoreError::Corrupted {
                        reason: format!("bad header entry '{entry}'"),
                    })
                }
            }
        }

        let mut seq_text = String::new();
        files
            .seqnums
            .seek(SeekFrom::Start(0))
            .map_err(|e| write_failure(&self.paths.seqnums, &e))?;
        files
            .seqnums
            .read_to_string(&mut seq_text)
            .map_err(|e| write_failure(&self.paths.seqnums, &e))?;
        let mut halves = seq_text.split(':');
        if let (Some(sender), Some(target)) = (halves.next(), halves.next()) {
            if let (Ok(sender), Ok(target)) =
                (sender.trim().parse::<u64>(), target.trim().parse::<u64>())
            {
                self.next_sender_seq.store(sender, Ordering::SeqCst);
                self.next_target_seq.store(target, Ordering::SeqCst);
            }
        }

        let mut session_text = String::new();
        files
            .session
            .seek(SeekFrom::Start(0))
            .map_err(|e| write_failure(&self.paths.session, &e))?;
        files
            .session
            .read_to_string(&mut session_text)
            .map_err(|e| write_failure(&self.paths.session, &e))?;
        drop(files);
        match Timestamp::parse_seconds(&session_text) {
            Ok(stamp) => {
                *self.creation_time.write() = stamp;
            }
            Err(_) => {
                *self.creation_time.write() = Timestamp::now();
                self.write_session()?;
            }
        }
        Ok(())
    }

    /// Appends one message at an explicit sequence number and flushes body
    /// and header. The async worker calls this with the sequence captured
    /// at enqueue time.
    pub(crate) fn write_message(&self, seq: u64, message: &[u8]) -> Result<(), StoreError> {
        let mut files = self.files.lock();
        let offset = files
            .body
            .seek(SeekFrom::End(0))
            .map_err(|e| write_failure(&self.paths.body, &e))?;
        files
            .header
            .seek(SeekFrom::End(0))
            .map_err(|e| write_failure(&self.paths.header, &e))?;
        write!(files.header, "{},{},{} ", seq, offset, message.len())
            .map_err(|e| write_failure(&self.paths.header, &e))?;
        files
            .body
            .write_all(message)
            .map_err(|e| write_failure(&self.paths.body, &e))?;
        files
            .body
            .flush()
            .map_err(|e| write_failure(&self.paths.body, &e))?;
        files
            .header
            .flush()
            .map_err(|e| write_failure(&self.paths.header, &e))?;
        files.offsets.insert(seq, (offset, message.len() as u64));
        Ok(())
    }

    /// Rewinds and rewrites the counter file in its fixed-width form.
    pub(crate) fn write_seqnums(&self) -> Result<(), StoreError> {
        let mut files = self.files.lock();
        files
            .seqnums
            .seek(SeekFrom::Start(0))
            .map_err(|e| write_failure(&self.paths.seqnums, &e))?;
        write!(
            files.seqnums,
            "{:010} : {:010}",
            self.next_sender_seq.load(Ordering::SeqCst),
            self.next_target_seq.load(Ordering::SeqCst)
        )
        .map_err(|e| write_failure(&self.paths.seqnums, &e))?;
        files
            .seqnums
            .flush()
            .map_err(|e| write_failure(&self.paths.seqnums, &e))
    }

    fn write_session(&self) -> Result<(), StoreError> {
        let stamp = *self.creation_time.read();
        let mut files = self.files.lock();
        files
            .session
            .seek(SeekFrom::Start(0))
            .map_err(|e| write_failure(&self.paths.session, &e))?;
        files
            .session
            .write_all(stamp.format_seconds().as_bytes())
            .map_err(|e| write_failure(&self.paths.session, &e))?;
        files
            .session
            .flush()
            .map_err(|e| write_failure(&self.paths.session, &e))
    }

    /// Cache-only counter mutators used by the async variant, which
    /// offloads the counter-file rewrite to its worker.
    pub(crate) fn cache_set_sender(&self, seq: u64) {
        self.next_sender_seq.store(seq, Ordering::SeqCst);
    }

    pub(crate) fn cache_set_target(&self, seq: u64) {
        self.next_target_seq.store(seq, Ordering::SeqCst);
    }

    pub(crate) fn cache_incr_sender(&self) {
        self.next_sender_seq.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn cache_incr_target(&self) {
        self.next_target_seq.fetch_add(1, Ordering::SeqCst);
    }

    fn read_message(&self, seq: u64) -> Result<Option<Bytes>, StoreError> {
        let mut files = self.files.lock();
        let Some(&(offset, len)) = files.offsets.get(&seq) else {
            return Ok(None);
        };
        files
            .body
            .seek(SeekFrom::Start(offset))
            .map_err(|e| write_failure(&self.paths.body, &e))?;
        let mut buffer = vec![0u8; len as usize];
        files
            .body
            .read_exact(&mut buffer)
            .map_err(|e| write_failure(&self.paths.body, &e))?;
        Ok(Some(Bytes::from(buffer)))
    }
}

#[async_trait]
impl MessageStore for FileStore {
    async fn set(&self, message: &[u8]) -> Result<(), StoreError> {
        self.write_message(self.next_sender_seq.load(Ordering::SeqCst), message)
    }

    async fn get_range(&self, begin: u64, end: u64) -> Result<Vec<Bytes>, StoreError> {
        let mut result = Vec::new();
        for seq in begin..=end {
            if let Some(message) = self.read_message(seq)? {
                result.push(message);
            }
        }
        Ok(result)
    }

    fn next_sender_seq(&self) -> u64 {
        self.next_sender_seq.load(Ordering::SeqCst)
    }

    fn next_target_seq(&self) -> u64 {
        self.next_target_seq.load(Ordering::SeqCst)
    }

    fn set_next_sender_seq(&self, seq: u64) -> Result<(), StoreError> {
        self.next_sender_seq.store(seq, Ordering::SeqCst);
        self.write_seqnums()
    }

    fn set_next_target_seq(&self, seq: u64) -> Result<(), StoreError> {
        self.next_target_seq.store(seq, Ordering::SeqCst);
        self.write_seqnums()
    }

    fn incr_next_sender_seq(&self) -> Result<(), StoreError> {
        self.next_sender_seq.fetch_add(1, Ordering::SeqCst);
        self.write_seqnums()
    }

    fn incr_next_target_seq(&self) -> Result<(), StoreError> {
        self.next_target_seq.fetch_add(1, Ordering::SeqCst);
        self.write_seqnums()
    }

    fn creation_time(&self) -> Timestamp {
        *self.creation_time.read()
    }

    async fn reset(&self) -> Result<(), StoreError> {
        {
            let mut files = self.files.lock();
            files.offsets.clear();
            for (name, path) in [
                ("body", &self.paths.body),
                ("header", &self.paths.header),
                ("seqnums", &self.paths.seqnums),
                ("session", &self.paths.session),
            ] {
                let file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path)
                    .map_err(|_| StoreError::Open {
                        name,
                        path: path.display().to_string(),
                    })?;
                match name {
                    "body" => files.body = file,
                    "header" => files.header = file,
                    "seqnums" => files.seqnums = file,
                    _ => files.session = file,
                }
            }
        }
        self.next_sender_seq.store(1, Ordering::SeqCst);
        self.next_target_seq.store(1, Ordering::SeqCst);
        *self.creation_time.write() = Timestamp::now();
        self.write_session()?;
        self.write_seqnums()
    }

    async fn refresh(&self) -> Result<(), StoreError> {
        self.next_sender_seq.store(1, Ordering::SeqCst);
        self.next_target_seq.store(1, Ordering::SeqCst);
        self.populate()
    }
}

/// Factory producing one [`FileStore`] per session.
#[derive(Debug, Default)]
pub struct FileStoreFactory;

impl StoreFactory for FileStoreFactory {
    fn create(&self, config: &SessionConfig) -> Result<Arc<dyn MessageStore>, StoreError> {
        Ok(Arc::new(FileStore::open(config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironouch_core::types::CompId;
    use tempfile::tempdir;

    fn session_id() -> SessionId {
        SessionId::new(CompId::new("zhb").unwrap(), CompId::new("OUCH").unwrap())
    }

    #[tokio::test]
    async fn test_open_creates_four_files() {
        let dir = tempdir().unwrap();
        let _store = FileStore::open_at(dir.path(), &session_id()).unwrap();
        for ext in ["body", "header", "seqnums", "session"] {
            assert!(dir.path().join(format!("zhb-OUCH.{ext}")).exists());
        }
    }

    #[tokio::test]
    async fn test_seqnums_fixed_width() {
        let dir = tempdir().unwrap();
        let store = FileStore::open_at(dir.path(), &session_id()).unwrap();
        store.set_next_sender_seq(4).unwrap();
        store.set_next_target_seq(7).unwrap();
        let text = std::fs::read_to_string(dir.path().join("zhb-OUCH.seqnums")).unwrap();
        assert_eq!(text, "0000000004 : 0000000007");

        // rewinding to a smaller number must not leave stale digits behind
        store.set_next_sender_seq(1).unwrap();
        let text = std::fs::read_to_string(dir.path().join("zhb-OUCH.seqnums")).unwrap();
        assert_eq!(text, "0000000001 : 0000000007");
    }

    #[tokio::test]
    async fn test_durable_restart_recovers_messages_and_counters() {
        let dir = tempdir().unwrap();
        let creation;
        {
            let store = FileStore::open_at(dir.path(), &session_id()).unwrap();
            creation = store.creation_time().format_seconds();
            for payload in [&b"order-one"[..], b"order-two", b"order-three"] {
                store.set(payload).await.unwrap();
                store.incr_next_sender_seq().unwrap();
            }
            assert_eq!(store.next_sender_seq(), 4);
            // dropped without any shutdown step: the crash
        }

        let store = FileStore::open_at(dir.path(), &session_id()).unwrap();
        assert_eq!(store.next_sender_seq(), 4);
        assert_eq!(store.next_target_seq(), 1);
        assert_eq!(store.creation_time().format_seconds(), creation);

        let messages = store.get_range(1, 3).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(&messages[0][..], b"order-one");
        assert_eq!(&messages[1][..], b"order-two");
        assert_eq!(&messages[2][..], b"order-three");
    }

    #[tokio::test]
    async fn test_get_range_skips_missing() {
        let dir = tempdir().unwrap();
        let store = FileStore::open_at(dir.path(), &session_id()).unwrap();
        store.set(b"first").await.unwrap();
        store.incr_next_sender_seq().unwrap();
        let messages = store.get_range(1, 5).await.unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[tokio::test]
    async fn test_reset_clears_and_restamps() {
        let dir = tempdir().unwrap();
        let store = FileStore::open_at(dir.path(), &session_id()).unwrap();
        store.set(b"payload").await.unwrap();
        store.incr_next_sender_seq().unwrap();
        store.incr_next_target_seq().unwrap();

        store.reset().await.unwrap();
        assert_eq!(store.next_sender_seq(), 1);
        assert_eq!(store.next_target_seq(), 1);
        assert!(store.get_range(1, 10).await.unwrap().is_empty());
        let body = std::fs::read(dir.path().join("zhb-OUCH.body")).unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_reloads_from_disk() {
        let dir = tempdir().unwrap();
        let store = FileStore::open_at(dir.path(), &session_id()).unwrap();
        store.set(b"payload").await.unwrap();
        store.incr_next_sender_seq().unwrap();

        store.refresh().await.unwrap();
        assert_eq!(store.next_sender_seq(), 2);
        assert_eq!(store.get_range(1, 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_counters_never_parse_backwards() {
        let dir = tempdir().unwrap();
        {
            let store = FileStore::open_at(dir.path(), &session_id()).unwrap();
            store.set_next_sender_seq(1_000_000).unwrap();
        }
        let store = FileStore::open_at(dir.path(), &session_id()).unwrap();
        assert_eq!(store.next_sender_seq(), 1_000_000);
    }
}
