//! Stream Orchestrator
//!
//! Pulls byte chunks from a reader, splits them into lines, tokenizes each
//! line and feeds the records, in order, to a single [`Interpreter`]. Each
//! batch of completed lines is reported to a [`GeometrySink`] together with
//! the byte progress.
//!
//! The only suspension point is the read itself. Cancellation and read
//! failures both leave the interpreter reset to a fresh state.

pub mod blocking;
pub mod cancel;
pub mod sink;

use std::path::Path;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{Error, Result};
use crate::geometry::{Interpreter, apply_setting_directives};
use crate::parser::{LineBatch, LineSplitter, tokenize_batch};

pub use blocking::{LineBatches, interpret_reader};
pub use cancel::{CancelHandle, CancelToken, cancel_pair};
pub use sink::{CollectingSink, GeometrySink, Progress};

/// Default read size, in bytes
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Whether in-band setting directives are honoured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// First load of a file: directives in comments update the settings
    #[default]
    Initial,
    /// Re-run with caller-chosen settings: directives are ignored
    Rerun,
}

/// Counters for a completed load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub lines: u64,
    pub primitives: u64,
    pub bytes_consumed: u64,
}

/// Drives one stream at a time through the parse/interpret pipeline
#[derive(Debug)]
pub struct StreamOrchestrator {
    interpreter: Interpreter,
    chunk_size: usize,
    mode: LoadMode,
}

impl StreamOrchestrator {
    pub fn new(interpreter: Interpreter) -> Self {
        Self {
            interpreter,
            chunk_size: DEFAULT_CHUNK_SIZE,
            mode: LoadMode::Initial,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_mode(mut self, mode: LoadMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn set_mode(&mut self, mode: LoadMode) {
        self.mode = mode;
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    pub fn into_interpreter(self) -> Interpreter {
        self.interpreter
    }

    /// Open a file and run it through the pipeline, reporting progress
    /// against the file's size
    pub async fn run_file<S: GeometrySink>(
        &mut self,
        path: impl AsRef<Path>,
        sink: &mut S,
        cancel: CancelToken,
    ) -> Result<LoadSummary> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path).await?;
        let total_bytes = file.metadata().await.ok().map(|m| m.len());
        log::info!("loading {} ({:?} bytes)", path.display(), total_bytes);

        self.run(file, total_bytes, sink, cancel).await
    }

    /// Run a whole stream. The interpreter is reset first, so every run
    /// starts from the configured options. A cancelled or failed run
    /// restores the options it started with, dropping any directives it
    /// applied.
    pub async fn run<R, S>(
        &mut self,
        mut reader: R,
        total_bytes: Option<u64>,
        sink: &mut S,
        mut cancel: CancelToken,
    ) -> Result<LoadSummary>
    where
        R: AsyncRead + Unpin,
        S: GeometrySink,
    {
        self.interpreter.reset();
        let initial_options = self.interpreter.options().clone();
        let mut splitter = LineSplitter::new();
        let mut summary = LoadSummary::default();
        let mut buf = vec![0u8; self.chunk_size];

        loop {
            let read = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    log::info!("load cancelled after {} bytes", splitter.bytes_consumed());
                    self.interpreter.reset_with(initial_options);
                    return Err(Error::Cancelled);
                }
                read = reader.read(&mut buf) => read,
            };

            let n = match read {
                Ok(n) => n,
                Err(e) => {
                    log::warn!("read failed after {} bytes: {}", splitter.bytes_consumed(), e);
                    self.interpreter.reset_with(initial_options);
                    return Err(Error::Io(e));
                }
            };
            if n == 0 {
                break;
            }

            if let Some(batch) = splitter.push(&buf[..n]) {
                self.process_batch(batch, total_bytes, sink, &mut summary);
            }
        }

        if let Some(batch) = splitter.finish() {
            self.process_batch(batch, total_bytes, sink, &mut summary);
        }
        summary.bytes_consumed = splitter.bytes_consumed();

        sink.on_complete(self.interpreter.cursor_trace());
        log::info!(
            "load finished: {} lines, {} primitives, {} bytes",
            summary.lines,
            summary.primitives,
            summary.bytes_consumed
        );

        Ok(summary)
    }

    fn process_batch<S: GeometrySink>(
        &mut self,
        batch: LineBatch,
        total_bytes: Option<u64>,
        sink: &mut S,
        summary: &mut LoadSummary,
    ) {
        let records = tokenize_batch(&batch.lines);
        let mut primitives = Vec::new();

        for record in &records {
            if self.mode == LoadMode::Initial {
                apply_setting_directives(record, &mut self.interpreter);
            }
            if let Some(primitive) = self.interpreter.process(record) {
                primitives.push(primitive);
            }
        }

        summary.lines += records.len() as u64;
        summary.primitives += primitives.len() as u64;
        log::debug!(
            "batch: {} lines, {} primitives, {} bytes consumed",
            records.len(),
            primitives.len(),
            batch.bytes_consumed
        );

        let progress = Progress {
            bytes_consumed: batch.bytes_consumed,
            total_bytes,
        };
        sink.on_batch(progress, &primitives);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{AxisLetter, InterpreterOptions, Position};
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Yields `data` on the first read, then fails
    struct FailAfter {
        data: Option<&'static [u8]>,
    }

    impl AsyncRead for FailAfter {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut tokio::io::ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            match self.data.take() {
                Some(data) => {
                    buf.put_slice(data);
                    Poll::Ready(Ok(()))
                }
                None => Poll::Ready(Err(io::Error::other("device unplugged"))),
            }
        }
    }

    #[tokio::test]
    async fn test_run_small_program() {
        let input: &[u8] = b"G90\r\nG1 X10\r\nG91\r\nG1 X5\r\n";
        let mut orchestrator = StreamOrchestrator::new(Interpreter::default()).with_chunk_size(3);
        let mut sink = CollectingSink::new();

        let summary = orchestrator
            .run(input, Some(input.len() as u64), &mut sink, CancelToken::never())
            .await
            .unwrap();

        assert_eq!(summary.lines, 4);
        assert_eq!(summary.primitives, 2);
        assert_eq!(summary.bytes_consumed, input.len() as u64);
        assert!(sink.completed);
        assert_eq!(sink.primitives[1].end(), Position::new(15.0, 0.0, 0.0));
        assert_eq!(sink.cursor_trace.len(), 4);
        // The trailing \n arrives in a chunk that completes no line
        assert_eq!(sink.progress.last().unwrap().bytes_consumed, 24);
    }

    #[tokio::test]
    async fn test_progress_is_monotonic() {
        let input = "G1 X1\nG1 X2\n;comment\nG1 X3\n".repeat(50);
        let mut orchestrator = StreamOrchestrator::new(Interpreter::default()).with_chunk_size(7);
        let mut sink = CollectingSink::new();

        orchestrator
            .run(input.as_bytes(), None, &mut sink, CancelToken::never())
            .await
            .unwrap();

        let counts: Vec<u64> = sink.progress.iter().map(|p| p.bytes_consumed).collect();
        assert!(counts.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*counts.last().unwrap(), input.len() as u64);
        assert_eq!(sink.primitives.len(), 150);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (handle, token) = cancel_pair();
        handle.cancel();

        let mut orchestrator = StreamOrchestrator::new(Interpreter::default());
        let mut sink = CollectingSink::new();
        let result = orchestrator.run(&b"G1 X1\n"[..], None, &mut sink, token).await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(!sink.completed);
        assert!(orchestrator.interpreter().cursor_trace().is_empty());
    }

    #[tokio::test]
    async fn test_directives_only_on_initial_load() {
        let input: &[u8] = b";z_axis:e\nG1 E3\n";

        let mut orchestrator = StreamOrchestrator::new(Interpreter::default());
        let mut sink = CollectingSink::new();
        orchestrator
            .run(input, None, &mut sink, CancelToken::never())
            .await
            .unwrap();
        assert_eq!(sink.primitives[0].end().z, 3.0);

        let mut rerun = StreamOrchestrator::new(Interpreter::new(InterpreterOptions::default()))
            .with_mode(LoadMode::Rerun);
        let mut sink = CollectingSink::new();
        rerun
            .run(input, None, &mut sink, CancelToken::never())
            .await
            .unwrap();
        assert_eq!(sink.primitives[0].end().z, 0.0);
    }

    #[tokio::test]
    async fn test_read_error_mid_stream() {
        let reader = FailAfter {
            data: Some(b";z_axis:e, hide_layers:false, layer_height:0.5\nG1 E3\n"),
        };
        let mut orchestrator = StreamOrchestrator::new(Interpreter::default());
        let mut sink = CollectingSink::new();

        let result = orchestrator.run(reader, None, &mut sink, CancelToken::never()).await;

        assert!(matches!(result, Err(Error::Io(_))));
        assert!(!sink.completed);
        // The first chunk was interpreted before the failure
        assert_eq!(sink.primitives.len(), 1);
        let interpreter = orchestrator.interpreter();
        assert!(interpreter.cursor_trace().is_empty());
        assert_eq!(interpreter.options(), &InterpreterOptions::default());
        assert_eq!(interpreter.state().axis_map.z, AxisLetter::Z);
        assert_eq!(interpreter.position(), Position::ORIGIN);
    }

    #[tokio::test]
    async fn test_cancel_discards_directives() {
        let (mut writer, reader) = tokio::io::duplex(256);
        let (handle, token) = cancel_pair();
        let mut orchestrator =
            StreamOrchestrator::new(Interpreter::default()).with_chunk_size(256);
        let mut sink = CollectingSink::new();

        let feed = async {
            use tokio::io::AsyncWriteExt;
            writer
                .write_all(b";z_axis:e, hide_layers:false, layer_height:0.5\nG1 E3\n")
                .await
                .unwrap();
            // Let the orchestrator pick up the chunk before cancelling
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
            handle.cancel();
        };
        let (result, ()) = tokio::join!(orchestrator.run(reader, None, &mut sink, token), feed);

        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(!sink.completed);
        let interpreter = orchestrator.interpreter();
        assert_eq!(interpreter.options(), &InterpreterOptions::default());
        assert_eq!(interpreter.state().axis_map.z, AxisLetter::Z);
        assert!(!interpreter.state().enable_layer_view);
        assert!(interpreter.cursor_trace().is_empty());
    }

    #[tokio::test]
    async fn test_failed_run_keeps_earlier_directives() {
        let mut orchestrator = StreamOrchestrator::new(Interpreter::default());
        let mut sink = CollectingSink::new();
        orchestrator
            .run(&b";x_axis:u\n"[..], None, &mut sink, CancelToken::never())
            .await
            .unwrap();

        let reader = FailAfter {
            data: Some(b";y_axis:v\n"),
        };
        let result = orchestrator.run(reader, None, &mut sink, CancelToken::never()).await;

        assert!(result.is_err());
        assert_eq!(orchestrator.interpreter().options().x_axis, AxisLetter::U);
        assert_eq!(orchestrator.interpreter().options().y_axis, AxisLetter::Y);
    }
}
