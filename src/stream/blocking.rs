//! Blocking variant of the pipeline for `std::io::Read` sources

use std::io::Read;

use crate::error::{Error, Result};
use crate::geometry::Interpreter;
use crate::parser::{LineBatch, LineSplitter, tokenize_batch};
use crate::stream::sink::{GeometrySink, Progress};
use crate::stream::{DEFAULT_CHUNK_SIZE, LoadSummary};

/// Iterator over line batches read from a blocking reader
pub struct LineBatches<R: Read> {
    reader: R,
    splitter: LineSplitter,
    buf: Vec<u8>,
    done: bool,
}

impl<R: Read> LineBatches<R> {
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            splitter: LineSplitter::new(),
            buf: vec![0u8; chunk_size.max(1)],
            done: false,
        }
    }

    pub fn bytes_consumed(&self) -> u64 {
        self.splitter.bytes_consumed()
    }
}

impl<R: Read> Iterator for LineBatches<R> {
    type Item = Result<LineBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let n = match self.reader.read(&mut self.buf) {
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(Error::Io(e)));
                }
            };

            if n == 0 {
                self.done = true;
                return self.splitter.finish().map(Ok);
            }

            if let Some(batch) = self.splitter.push(&self.buf[..n]) {
                return Some(Ok(batch));
            }
        }
        None
    }
}

/// Run a blocking reader through the whole pipeline.
///
/// Setting directives are not applied here; this path mirrors a re-run with
/// the interpreter's current options. On a read error the interpreter is
/// reset and the error returned.
pub fn interpret_reader<R: Read, S: GeometrySink>(
    reader: R,
    interpreter: &mut Interpreter,
    sink: &mut S,
) -> Result<LoadSummary> {
    interpreter.reset();
    let mut batches = LineBatches::new(reader);
    let mut summary = LoadSummary::default();

    for batch in batches.by_ref() {
        let batch = match batch {
            Ok(batch) => batch,
            Err(e) => {
                interpreter.reset();
                return Err(e);
            }
        };

        let records = tokenize_batch(&batch.lines);
        let primitives = interpreter.process_batch(&records);
        summary.lines += records.len() as u64;
        summary.primitives += primitives.len() as u64;

        sink.on_batch(
            Progress {
                bytes_consumed: batch.bytes_consumed,
                total_bytes: None,
            },
            &primitives,
        );
    }

    summary.bytes_consumed = batches.bytes_consumed();
    sink.on_complete(interpreter.cursor_trace());
    Ok(summary)
}
