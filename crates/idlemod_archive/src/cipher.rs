//! Repeating-key XOR used to obfuscate payloads.
//!
//! This is a format quirk, not encryption: the keys are constants and anyone can undo it.
//! Applying the same key twice restores the original bytes.

use std::io::{self, Write};

/// XOR `data` in place with `key`, repeating the key from the first byte of `data`.
///
/// An empty key leaves the data untouched.
pub fn apply_in_place(data: &mut [u8], key: &[u8]) {
    if key.is_empty() {
        return;
    }

    for (byte, k) in data.iter_mut().zip(key.iter().cycle()) {
        *byte ^= k;
    }
}

/// XOR `data` with `key` into a new buffer
pub fn apply(data: &[u8], key: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    apply_in_place(&mut out, key);
    out
}

/// A writer that XORs everything passing through it with a repeating key.
///
/// The key position is counted from the first byte written through this writer.
pub struct XorWriter<'k, W> {
    inner: W,
    key: &'k [u8],
    position: usize,
    buffer: Vec<u8>,
}

impl<'k, W: Write> XorWriter<'k, W> {
    /// Wrap `inner`, obfuscating with `key`
    pub fn new(inner: W, key: &'k [u8]) -> Self {
        Self {
            inner,
            key,
            position: 0,
            buffer: Vec::new(),
        }
    }

    /// Unwrap and return the inner writer
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for XorWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.key.is_empty() {
            return self.inner.write(buf);
        }

        self.buffer.clear();
        self.buffer.extend(
            buf.iter()
                .zip(self.key.iter().cycle().skip(self.position % self.key.len()))
                .map(|(byte, k)| byte ^ k),
        );

        let written = self.inner.write(&self.buffer)?;
        self.position = (self.position + written) % self.key.len();
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: std::fmt::Debug> std::fmt::Debug for XorWriter<'_, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XorWriter")
            .field("inner", &self.inner)
            .field("position", &self.position)
            .finish()
    }
}
