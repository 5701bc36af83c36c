//! # Buffer Pool
//!
//! Recycles byte buffers between image-framing passes so that encoding a
//! tall document does not hammer the allocator once per strip.
//!
//! Buffers are bucketed by capacity rounded up to the next power of two.
//! Each bucket keeps at most [`MAX_BUCKET_DEPTH`] buffers; releases beyond
//! that are dropped on the floor, as are buffers larger than
//! [`MAX_POOLED_BYTES`]. Released buffers are zero-filled so a recycled
//! strip never leaks pixels from a previous image.
//!
//! The pool is owned by a single encoder and is not thread-shared.

use std::collections::HashMap;

/// Buffers above this size are never pooled (4 MiB).
pub const MAX_POOLED_BYTES: usize = 4 * 1024 * 1024;

/// Maximum number of buffers retained per size bucket.
pub const MAX_BUCKET_DEPTH: usize = 10;

/// A pool of reusable byte buffers, bucketed by power-of-two capacity.
#[derive(Debug, Default)]
pub struct BufferPool {
    buckets: HashMap<usize, Vec<Vec<u8>>>,
}

impl BufferPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a zeroed buffer of length `n`.
    ///
    /// Reuses a pooled buffer when one of sufficient capacity exists,
    /// otherwise allocates fresh with power-of-two capacity so the buffer
    /// can re-enter the pool cleanly later.
    pub fn acquire(&mut self, n: usize) -> Vec<u8> {
        let key = bucket_for(n);

        if let Some(bucket) = self.buckets.get_mut(&key)
            && let Some(mut buf) = bucket.pop()
        {
            // Pooled buffers are stored zero-filled at bucket size, so
            // shrinking to n needs no rewrite.
            buf.resize(n, 0);
            return buf;
        }

        let mut buf = Vec::with_capacity(key);
        buf.resize(n, 0);
        buf
    }

    /// Hand a buffer back to the pool.
    ///
    /// Oversized buffers and overflow beyond the bucket depth are dropped.
    pub fn release(&mut self, mut buf: Vec<u8>) {
        let capacity = buf.capacity();
        if capacity == 0 || capacity > MAX_POOLED_BYTES {
            return;
        }

        // Store at the largest power-of-two length the capacity can hold,
        // so a later acquire for that bucket never reallocates.
        let key = prev_power_of_two(capacity);
        let bucket = self.buckets.entry(key).or_default();
        if bucket.len() >= MAX_BUCKET_DEPTH {
            return;
        }

        buf.clear();
        buf.resize(key, 0);
        bucket.push(buf);
    }

    /// Drop every pooled buffer.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Number of buffers currently pooled across all buckets.
    pub fn pooled_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

fn bucket_for(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

fn prev_power_of_two(n: usize) -> usize {
    debug_assert!(n > 0);
    let next = n.next_power_of_two();
    if next == n { n } else { next / 2 }
}
