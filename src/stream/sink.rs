//! Consumers of the geometry stream

use crate::geometry::{GeometryPrimitive, Position};

/// Byte progress through the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub bytes_consumed: u64,
    /// Size of the input when known up front
    pub total_bytes: Option<u64>,
}

impl Progress {
    /// Percentage in `0.0..=100.0`, if the total size is known
    pub fn percent(&self) -> Option<f64> {
        match self.total_bytes {
            Some(0) => Some(100.0),
            Some(total) => Some((self.bytes_consumed as f64 / total as f64 * 100.0).min(100.0)),
            None => None,
        }
    }
}

/// Receives geometry as batches are interpreted
///
/// Renderers, exporters and progress displays implement this; the pipeline
/// never holds on to primitives once they are handed over.
pub trait GeometrySink {
    /// Called once per batch of completed lines, in stream order.
    /// `primitives` is empty when the batch only changed modal state.
    fn on_batch(&mut self, progress: Progress, primitives: &[GeometryPrimitive]);

    /// Called once when the stream is exhausted, with the position after
    /// every processed line
    fn on_complete(&mut self, _cursor_trace: &[Position]) {}
}

/// Sink that keeps everything, mostly useful for tests and small files
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    pub primitives: Vec<GeometryPrimitive>,
    pub progress: Vec<Progress>,
    pub cursor_trace: Vec<Position>,
    pub completed: bool,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GeometrySink for CollectingSink {
    fn on_batch(&mut self, progress: Progress, primitives: &[GeometryPrimitive]) {
        self.progress.push(progress);
        self.primitives.extend_from_slice(primitives);
    }

    fn on_complete(&mut self, cursor_trace: &[Position]) {
        self.cursor_trace = cursor_trace.to_vec();
        self.completed = true;
    }
}
