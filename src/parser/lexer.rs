//! GCode Tokenizer
//!
//! Turns one line of text into a [`CommandRecord`]. There is no grammar:
//! the command code is the first `G`/`M` word, and every letter `a`..`z` is
//! scanned for independently, so letters never consume each other's text.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::parser::ast::{ArgValue, CommandRecord, Mnemonic};
use crate::parser::tags::parse_comment_tags;

static COMMAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[GM][0-9]+").expect("command pattern is valid"));

static COMMAND_STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[gm][0-9]+").expect("command strip pattern is valid"));

/// One pattern per letter: the letter, optional whitespace, then a signed
/// decimal number.
static LETTER_PATTERNS: LazyLock<Vec<(char, Regex)>> = LazyLock::new(|| {
    ('a'..='z')
        .map(|letter| {
            let pattern = format!(r"{letter}\s*([+-]?(?:[0-9]*\.)?[0-9]+)");
            let re = Regex::new(&pattern).expect("argument pattern is valid");
            (letter, re)
        })
        .collect()
});

/// Tokenize a single line of G-code.
///
/// Never fails: unknown codes, stray characters and missing numbers all
/// produce some record.
pub fn tokenize_line(line: &str) -> CommandRecord {
    let mut record = CommandRecord::default();

    let (instruction, comment) = split_comment(line);
    if let Some(comment) = comment {
        record.tag = parse_comment_tags(&comment);
        record.comment = Some(comment);
    }

    record.command = COMMAND_RE
        .find(&instruction.to_uppercase())
        .map(|m| Mnemonic::from_code(m.as_str()));

    let lowered = instruction.to_lowercase();
    let arg_text = COMMAND_STRIP_RE.replacen(&lowered, 1, "");

    for (letter, re) in LETTER_PATTERNS.iter() {
        let value = re
            .captures(&arg_text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok());

        match value {
            Some(number) => {
                record.args.insert(*letter, ArgValue::Number(number));
            }
            None if arg_text.contains(*letter) => {
                record.args.insert(*letter, ArgValue::Flag);
            }
            None => {}
        }
    }

    record
}

/// Tokenize a line given as raw bytes.
///
/// Bytes that are not UTF-8 text are rejected with [`Error::NonTextInput`];
/// `line_number` is only used to label that error.
pub fn tokenize_bytes(bytes: &[u8], line_number: u64) -> Result<CommandRecord> {
    let text = std::str::from_utf8(bytes).map_err(|e| Error::NonTextInput {
        line: line_number,
        offset: e.valid_up_to(),
    })?;
    Ok(tokenize_line(text))
}

/// Split at the first `;`. Later semicolons belong to the comment.
fn split_comment(line: &str) -> (&str, Option<String>) {
    match line.split_once(';') {
        Some((instruction, comment)) => (instruction, Some(comment.trim().to_string())),
        None => (line, None),
    }
}
