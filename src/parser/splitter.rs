//! Line Splitter
//!
//! Turns a stream of arbitrarily-cut byte chunks into text lines.
//!
//! Terminators are `\n`, `\r` and `\r\n`. Splitting happens on raw bytes
//! before decoding: neither terminator byte can occur inside a multi-byte
//! UTF-8 sequence, so a character cut in half by a chunk boundary simply
//! waits in the buffer with the rest of its line. Each completed line is then
//! decoded lossily, invalid sequences becoming U+FFFD.

use serde::Serialize;

/// One logical line with its terminator stripped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawLine {
    pub text: String,
    /// Stream bytes consumed up to and including the byte that completed
    /// this line (the first terminator byte, or the last byte at end of
    /// stream)
    pub bytes_consumed: u64,
}

/// Lines completed by one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBatch {
    /// Total bytes fed to the splitter when the batch was produced
    pub bytes_consumed: u64,
    pub lines: Vec<RawLine>,
}

/// Incremental splitter holding the unterminated tail between chunks
#[derive(Debug, Default)]
pub struct LineSplitter {
    buffer: Vec<u8>,
    bytes_consumed: u64,
    /// The last terminator seen was a bare `\r`; a `\n` right after it
    /// completes the same terminator
    pending_cr: bool,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total bytes fed so far
    pub fn bytes_consumed(&self) -> u64 {
        self.bytes_consumed
    }

    /// Feed one chunk. Returns a batch if the chunk completed at least one
    /// line.
    pub fn push(&mut self, chunk: &[u8]) -> Option<LineBatch> {
        let mut lines = Vec::new();

        for &byte in chunk {
            self.bytes_consumed += 1;

            if std::mem::take(&mut self.pending_cr) && byte == b'\n' {
                continue;
            }

            match byte {
                b'\n' => lines.push(self.take_line()),
                b'\r' => {
                    lines.push(self.take_line());
                    self.pending_cr = true;
                }
                _ => self.buffer.push(byte),
            }
        }

        if lines.is_empty() {
            None
        } else {
            Some(LineBatch {
                bytes_consumed: self.bytes_consumed,
                lines,
            })
        }
    }

    /// Signal end of stream. A buffered fragment that is not blank after
    /// trimming trailing whitespace is emitted as a final line.
    pub fn finish(&mut self) -> Option<LineBatch> {
        self.pending_cr = false;
        let tail = std::mem::take(&mut self.buffer);
        let text = String::from_utf8_lossy(&tail);
        let text = text.trim_end();

        if text.is_empty() {
            return None;
        }

        Some(LineBatch {
            bytes_consumed: self.bytes_consumed,
            lines: vec![RawLine {
                text: text.to_string(),
                bytes_consumed: self.bytes_consumed,
            }],
        })
    }

    /// Split a complete, in-memory input in one go
    pub fn split_all(bytes: &[u8]) -> Vec<RawLine> {
        let mut splitter = Self::new();
        let mut lines = Vec::new();
        if let Some(batch) = splitter.push(bytes) {
            lines.extend(batch.lines);
        }
        if let Some(batch) = splitter.finish() {
            lines.extend(batch.lines);
        }
        lines
    }

    fn take_line(&mut self) -> RawLine {
        let bytes = std::mem::take(&mut self.buffer);
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };
        RawLine {
            text,
            bytes_consumed: self.bytes_consumed,
        }
    }
}
