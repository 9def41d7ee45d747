/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Chunked byte queue backing a session's outbound buffer.
//!
//! Producers push complete framed packets; the drain side reads the
//! contiguous span at the head and pops what it managed to write. A chunk
//! that fills up links a successor sized `max(default, 2 * needed)`; the
//! most recently drained chunk is parked in a single spare slot for reuse.
//! There is no item framing here, only bytes.

use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Default chunk capacity.
pub const CHUNK_SIZE: usize = 1 << 20;

#[derive(Debug)]
struct Chunk {
    data: Vec<u8>,
    head: usize,
}

impl Chunk {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            head: 0,
        }
    }

    fn room(&self) -> usize {
        self.data.capacity() - self.data.len()
    }

    fn readable(&self) -> &[u8] {
        &self.data[self.head..]
    }

    fn rewind(&mut self) {
        self.data.clear();
        self.head = 0;
    }
}

#[derive(Debug)]
struct Inner {
    chunks: VecDeque<Chunk>,
    spare: Option<Chunk>,
    chunk_size: usize,
}

/// Chunked byte pipe.
#[derive(Debug)]
pub struct BytePipe {
    inner: Mutex<Inner>,
}

impl BytePipe {
    /// Creates a pipe with the default chunk capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_chunk_size(CHUNK_SIZE)
    }

    /// Creates a pipe with a custom chunk capacity.
    #[must_use]
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        let mut chunks = VecDeque::with_capacity(2);
        chunks.push_back(Chunk::with_capacity(chunk_size));
        Self {
            inner: Mutex::new(Inner {
                chunks,
                spare: None,
                chunk_size,
            }),
        }
    }

    /// Appends bytes, linking a new chunk when the current one runs out.
    pub fn push(&self, mut bytes: &[u8]) {
        let mut inner = self.inner.lock();
        loop {
            let tail = inner
                .chunks
                .back_mut()
                .expect("pipe always holds at least one chunk");
            let room = tail.room();
            if room >= bytes.len() {
                tail.data.extend_from_slice(bytes);
                return;
            }
            tail.data.extend_from_slice(&bytes[..room]);
            bytes = &bytes[room..];

            let needed = bytes.len();
            let fresh = match inner.spare.take() {
                Some(mut chunk) if chunk.data.capacity() > needed => {
                    chunk.rewind();
                    chunk
                }
                _ => Chunk::with_capacity(inner.chunk_size.max(needed * 2)),
            };
            inner.chunks.push_back(fresh);
        }
    }

    /// Returns the contiguous readable span at the head, or `None` when the
    /// pipe is empty. A fully drained head chunk is parked in the spare
    /// slot on the way through.
    #[must_use]
    pub fn data(&self) -> Option<Bytes> {
        let mut inner = self.inner.lock();
        loop {
            {
                let head = inner.chunks.front()?;
                let readable = head.readable();
                if !readable.is_empty() {
                    return Some(Bytes::copy_from_slice(readable));
                }
                if inner.chunks.len() == 1 {
                    return None;
                }
            }
            let mut drained = inner.chunks.pop_front().expect("checked above");
            drained.rewind();
            if inner.spare.is_none() {
                inner.spare = Some(drained);
            }
        }
    }

    /// Advances past `n` consumed bytes of the head span.
    pub fn pop(&self, n: usize) {
        let mut inner = self.inner.lock();
        let single = inner.chunks.len() == 1;
        let head = inner
            .chunks
            .front_mut()
            .expect("pipe always holds at least one chunk");
        head.head = (head.head + n).min(head.data.len());
        if single && head.head == head.data.len() {
            head.rewind();
        }
    }

    /// Total readable bytes across all chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        let inner = self.inner.lock();
        inner.chunks.iter().map(|c| c.readable().len()).sum()
    }

    /// Returns true when no bytes are readable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discards everything, returning to a single fresh chunk.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        let chunk_size = inner.chunk_size;
        inner.chunks.clear();
        inner.chunks.push_back(Chunk::with_capacity(chunk_size));
        inner.spare = None;
    }
}

impl Default for BytePipe {
    fn default() -> Self {
        Self::new()
    }
}
