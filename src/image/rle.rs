//! # Run-Length Encoding
//!
//! The control-byte scheme accepted by ESC/POS `GS v 0` mode 1: a control
//! byte ≥ 0x80 introduces a run (the next byte repeated `ctrl - 0x80 + 2`
//! times, i.e. 2–129), a control byte < 0x80 introduces a literal block of
//! `ctrl + 1` bytes (1–128).
//!
//! The encoder measures runs uncapped and emits them as maximum-length
//! pairs; a leftover single byte becomes a literal-of-one pair. The
//! literal scanner's lookahead is exactly one position: the format on the
//! wire is what printers were validated against, so the occasional missed
//! one-byte win stays missed.

use crate::pool::BufferPool;

/// Outcome of a compression attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Compression {
    /// Compressed stream, or a copy of the input when compression did not
    /// pay for itself.
    pub data: Vec<u8>,
    pub compressed: bool,
    pub original_size: usize,
    pub compressed_size: usize,
    /// `compressed_size / original_size`; 1.0 when not compressed.
    pub ratio: f32,
}

/// Compress `data`, falling back to an uncompressed copy when the encoded
/// form would be as large or larger.
///
/// Scratch space comes from the pool and is returned to it before this
/// function exits.
pub fn compress(data: &[u8], pool: &mut BufferPool) -> Compression {
    let mut scratch = pool.acquire(data.len());
    let attempt = compress_into(data, &mut scratch);

    let result = match attempt {
        Some(len) if len < data.len() => Compression {
            data: scratch[..len].to_vec(),
            compressed: true,
            original_size: data.len(),
            compressed_size: len,
            ratio: len as f32 / data.len() as f32,
        },
        _ => Compression {
            data: data.to_vec(),
            compressed: false,
            original_size: data.len(),
            compressed_size: data.len(),
            ratio: 1.0,
        },
    };

    pool.release(scratch);
    result
}

/// Encode into `out`, returning the encoded length, or `None` as soon as
/// the output would reach the input size (no point finishing).
fn compress_into(data: &[u8], out: &mut [u8]) -> Option<usize> {
    let mut written = 0usize;
    let mut emit = |bytes: &[u8], written: &mut usize| -> bool {
        if *written + bytes.len() > out.len() {
            return false;
        }
        out[*written..*written + bytes.len()].copy_from_slice(bytes);
        *written += bytes.len();
        true
    };

    let mut i = 0;
    while i < data.len() {
        let byte = data[i];
        let mut run = 1;
        while i + run < data.len() && data[i + run] == byte {
            run += 1;
        }

        if run >= 2 {
            let mut remaining = run;
            while remaining > 0 {
                if remaining >= 2 {
                    let take = remaining.min(129);
                    if !emit(&[0x80 + (take - 2) as u8, byte], &mut written) {
                        return None;
                    }
                    remaining -= take;
                } else {
                    // A single byte left over from a maximal run becomes a
                    // literal-of-one pair.
                    if !emit(&[0x00, byte], &mut written) {
                        return None;
                    }
                    remaining = 0;
                }
            }
            i += run;
        } else {
            let start = i;
            i += 1;
            while i < data.len()
                && i - start < 128
                && !(i + 1 < data.len() && data[i] == data[i + 1])
            {
                i += 1;
            }
            if !emit(&[(i - start - 1) as u8], &mut written) {
                return None;
            }
            if !emit(&data[start..i], &mut written) {
                return None;
            }
        }
    }

    Some(written)
}

/// Inverse of [`compress`]; exposed so tests can round-trip wire payloads.
pub fn decompress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < data.len() {
        let ctrl = data[i];
        i += 1;
        if ctrl >= 0x80 {
            if i < data.len() {
                let count = (ctrl - 0x80) as usize + 2;
                out.extend(std::iter::repeat_n(data[i], count));
                i += 1;
            }
        } else {
            let count = ctrl as usize + 1;
            let end = (i + count).min(data.len());
            out.extend_from_slice(&data[i..end]);
            i = end;
        }
    }
    out
}
