//! GCode Geometry
//!
//! A streaming interpreter turning G-code text into line and arc
//! primitives plus a running cursor trace.
//!
//! This library provides:
//! - Chunk-tolerant line splitting and tokenizing
//! - A modal geometry interpreter (G0-G3, G90/G91, comment tags)
//! - An async, cancellable stream orchestrator
//! - Configuration management

pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod parser;
pub mod stream;

// Re-exports for clean public API
pub use config::Config;
pub use error::{Error, Result};
pub use geometry::{GeometryPrimitive, Interpreter, InterpreterOptions, Position};
pub use parser::{CommandRecord, LineSplitter, parse_line, tokenize_line};
pub use stream::{CancelToken, GeometrySink, StreamOrchestrator};
