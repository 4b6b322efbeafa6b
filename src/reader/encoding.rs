//! Text encodings of delimited registry files.

use std::io::{self, Read};

/// Character encoding of a delimited file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    /// ISO-8859-1, transcoded to UTF-8 while reading
    Latin1,
}

const CHUNK: usize = 64 * 1024;

/// Streaming ISO-8859-1 to UTF-8 transcoder
///
/// Every Latin-1 byte maps to the Unicode code point of the same value, so
/// bytes below 0x80 pass through and the rest expand to two bytes.
pub struct Latin1ToUtf8<R> {
    inner: R,
    raw: Vec<u8>,
    pending: Vec<u8>,
    pos: usize,
}

impl<R: Read> Latin1ToUtf8<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            raw: vec![0; CHUNK],
            pending: Vec::with_capacity(CHUNK * 2),
            pos: 0,
        }
    }

    fn refill(&mut self) -> io::Result<usize> {
        self.pending.clear();
        self.pos = 0;
        let read = self.inner.read(&mut self.raw)?;
        for &byte in &self.raw[..read] {
            if byte < 0x80 {
                self.pending.push(byte);
            } else {
                self.pending.push(0xC0 | (byte >> 6));
                self.pending.push(0x80 | (byte & 0x3F));
            }
        }
        Ok(read)
    }
}

impl<R: Read> Read for Latin1ToUtf8<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.pending.len() && self.refill()? == 0 {
            return Ok(0);
        }
        let available = &self.pending[self.pos..];
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }
}
