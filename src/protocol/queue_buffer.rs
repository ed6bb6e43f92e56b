//! Per-flow byte queue absorbing TCP fragmentation.
//!
//! Uses `bytes::BytesMut` for buffer management. Payload fragments arrive in
//! arbitrary chunk sizes; `peek` exposes a contiguous view for trial header
//! inspection and `pop` consumes whole frames once they have fully arrived.

use bytes::{Bytes, BytesMut};
use thiserror::Error;

/// Maximum bytes a single flow may buffer (1 MiB).
///
/// A flow that reaches this bound is stuck mid-frame with no way to recover;
/// callers drop the buffered bytes and report it.
pub const BUFFER_SIZE: usize = 1 << 20;

/// Error returned by [`QueueBuffer::push`] when a chunk would exceed the
/// configured capacity bound.
#[derive(Debug, Clone, Error)]
#[error("queue buffer full: {buffered} buffered + {pushed} pushed exceeds {capacity}")]
pub struct BufferFull {
    /// Bytes already buffered.
    pub buffered: usize,
    /// Size of the rejected chunk.
    pub pushed: usize,
    /// Capacity bound.
    pub capacity: usize,
}

/// FIFO over bytes with `push`/`peek`/`pop` contracts.
///
/// Bytes are contiguous when observed through `peek`/`pop` regardless of how
/// `push` sliced them. Backing capacity grows to the next power of two on
/// demand, bounded by the configured maximum; consumed capacity is reclaimed
/// by `BytesMut` as bytes are popped.
pub struct QueueBuffer {
    buf: BytesMut,
    max_capacity: usize,
}

impl QueueBuffer {
    /// Create a queue buffer bounded at [`BUFFER_SIZE`].
    pub fn new() -> Self {
        Self::with_max_capacity(BUFFER_SIZE)
    }

    /// Create a queue buffer with a custom capacity bound.
    pub fn with_max_capacity(max_capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(8 * 1024),
            max_capacity,
        }
    }

    /// Append a chunk.
    ///
    /// Accepts any chunk size up to the remaining capacity; rejects chunks
    /// that would push the buffered total past the bound.
    pub fn push(&mut self, data: &[u8]) -> Result<(), BufferFull> {
        let needed = self.buf.len() + data.len();
        if needed > self.max_capacity {
            return Err(BufferFull {
                buffered: self.buf.len(),
                pushed: data.len(),
                capacity: self.max_capacity,
            });
        }
        if needed > self.buf.capacity() {
            let target = needed.next_power_of_two().min(self.max_capacity);
            self.buf.reserve(target - self.buf.len());
        }
        self.buf.extend_from_slice(data);
        Ok(())
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// A contiguous view of the next `n` bytes without consuming them.
    ///
    /// Returns `None` if fewer than `n` bytes are buffered. The view is
    /// valid until the next mutation.
    pub fn peek(&self, n: usize) -> Option<&[u8]> {
        if self.buf.len() < n {
            return None;
        }
        Some(&self.buf[..n])
    }

    /// Consume and return the next `n` bytes.
    ///
    /// Returns `None` if fewer than `n` bytes are buffered.
    pub fn pop(&mut self, n: usize) -> Option<Bytes> {
        if self.buf.len() < n {
            return None;
        }
        Some(self.buf.split_to(n).freeze())
    }

    /// Drop all buffered bytes.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl Default for QueueBuffer {
    fn default() -> Self {
        Self::new()
    }
}
