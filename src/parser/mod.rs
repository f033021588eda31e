//! GCode Parser
//!
//! Byte chunks to lines, lines to [`CommandRecord`]s. Everything here is
//! stateless apart from the splitter's carry-over buffer, so tokenizing can
//! run ahead of (or in parallel with) interpretation.

pub mod ast;
pub mod lexer;
pub mod splitter;
pub mod tags;

pub use ast::{ArgValue, CommandRecord, Mnemonic, TagValue};
pub use lexer::{tokenize_bytes, tokenize_line};
pub use splitter::{LineBatch, LineSplitter, RawLine};
pub use tags::parse_comment_tags;

/// Parse a single line of GCode into a record.
///
/// Alias of [`tokenize_line`], kept as the crate's main entry point for
/// one-off parsing.
pub fn parse_line(line: &str) -> CommandRecord {
    lexer::tokenize_line(line)
}

/// Tokenize every line of a batch, preserving order
pub fn tokenize_batch(lines: &[RawLine]) -> Vec<CommandRecord> {
    lines.iter().map(|line| tokenize_line(&line.text)).collect()
}
