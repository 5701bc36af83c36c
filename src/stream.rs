//! # Chunked Transmission
//!
//! Printers have small input buffers; shoving a whole document at a
//! Bluetooth or serial link overruns them. [`ChunkStream`] slices an
//! encoded document into bounded chunks and, between chunks, awaits an
//! optional [`ChunkSink`] so the transport can apply backpressure (wait
//! for an ACK, poll a socket, sleep a pacing interval).
//!
//! Chunk order is the byte order; concatenating every chunk reproduces
//! `encode()` exactly.

use crate::error::{Error, Result};
use async_trait::async_trait;

/// Default chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// Progress metadata accompanying each chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based chunk index.
    pub index: usize,
    /// Total number of chunks.
    pub total: usize,
    /// The payload slice for this chunk (≤ chunk size).
    pub bytes: Vec<u8>,
    /// Cumulative bytes produced including this chunk.
    pub bytes_sent: usize,
    /// Total bytes in the document.
    pub total_bytes: usize,
    /// Whether this is the final chunk.
    pub is_last: bool,
}

/// Backpressure hook awaited after a chunk has been handed to the
/// consumer and before the next one is produced.
#[async_trait]
pub trait ChunkSink: Send {
    async fn on_chunk_sent(&mut self, chunk: &Chunk);
}

/// Options for [`crate::Encoder::encode_chunks`].
pub struct ChunkOptions {
    pub chunk_size: usize,
    pub sink: Option<Box<dyn ChunkSink>>,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE, sink: None }
    }
}

impl std::fmt::Debug for ChunkOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkOptions")
            .field("chunk_size", &self.chunk_size)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

/// A lazy, finite sequence of document slices.
pub struct ChunkStream {
    data: Vec<u8>,
    chunk_size: usize,
    position: usize,
    index: usize,
    sink: Option<Box<dyn ChunkSink>>,
    /// Metadata of the chunk most recently yielded, not yet reported to
    /// the sink.
    pending: Option<Chunk>,
}

impl ChunkStream {
    pub(crate) fn new(data: Vec<u8>, options: ChunkOptions) -> Result<Self> {
        if options.chunk_size == 0 {
            return Err(Error::Configuration("chunk size must be at least 1".into()));
        }
        Ok(Self {
            data,
            chunk_size: options.chunk_size,
            position: 0,
            index: 0,
            sink: options.sink,
            pending: None,
        })
    }

    /// Total number of chunks this stream will yield.
    pub fn total_chunks(&self) -> usize {
        self.data.len().div_ceil(self.chunk_size)
    }

    /// Total bytes across all chunks.
    pub fn total_bytes(&self) -> usize {
        self.data.len()
    }

    /// Produce the next chunk, or `None` when the document is exhausted.
    ///
    /// When a sink is attached, the previous chunk is reported (and
    /// awaited) before the next one is produced; stopping iteration stops
    /// both chunk production and sink callbacks.
    pub async fn next(&mut self) -> Option<Chunk> {
        if let Some(sink) = &mut self.sink
            && let Some(pending) = self.pending.take()
        {
            sink.on_chunk_sent(&pending).await;
        }

        if self.position >= self.data.len() {
            return None;
        }

        let end = (self.position + self.chunk_size).min(self.data.len());
        let bytes = self.data[self.position..end].to_vec();
        let chunk = Chunk {
            index: self.index,
            total: self.total_chunks(),
            bytes,
            bytes_sent: end,
            total_bytes: self.data.len(),
            is_last: end == self.data.len(),
        };
        self.position = end;
        self.index += 1;

        if self.sink.is_some() {
            self.pending = Some(strip_payload(&chunk));
        }
        Some(chunk)
    }

    /// Drain the stream, returning the concatenation of every chunk.
    pub async fn collect(mut self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len());
        while let Some(chunk) = self.next().await {
            out.extend_from_slice(&chunk.bytes);
        }
        out
    }
}

/// Sink callbacks get the metadata without a second copy of the payload.
fn strip_payload(chunk: &Chunk) -> Chunk {
    Chunk {
        index: chunk.index,
        total: chunk.total,
        bytes: Vec::new(),
        bytes_sent: chunk.bytes_sent,
        total_bytes: chunk.total_bytes,
        is_last: chunk.is_last,
    }
}
