//! Error types
//!
//! Only genuinely fatal conditions live here. Malformed G-code is never an
//! error: unknown commands, missing arguments and odd tag values all fall
//! back to "no effect".

use thiserror::Error;

/// Errors surfaced by the streaming pipeline and its configuration layer
#[derive(Error, Debug)]
pub enum Error {
    /// A line handed to the tokenizer was not text
    #[error("line {line} is not valid UTF-8 text (invalid byte at offset {offset})")]
    NonTextInput {
        /// 1-based line number within the stream, 0 when unknown
        line: u64,
        /// Offset of the first invalid byte within the line
        offset: usize,
    },

    /// Reading from the byte source failed
    #[error("I/O error while reading G-code: {0}")]
    Io(#[from] std::io::Error),

    /// The load was abandoned through its cancel handle
    #[error("G-code load cancelled")]
    Cancelled,

    /// An axis remap named a letter outside the recognized set
    #[error("unknown axis letter '{0}' (expected one of x y z a b c u v w e i j)")]
    UnknownAxisLetter(String),

    /// A configuration file could not be read or parsed
    #[error("invalid configuration in {path}: {message}")]
    Config { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
