//! Tokenized G-code records
//!
//! Plain data produced by the tokenizer and consumed by the interpreter.
//! No parsing or motion logic lives here.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

/// The command code of a line
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    /// Rapid linear move
    G0,
    /// Linear move
    G1,
    /// Clockwise arc
    G2,
    /// Counter-clockwise arc
    G3,
    /// Absolute positioning
    G90,
    /// Relative positioning
    G91,
    /// Any other G or M code, kept verbatim (uppercase) but never acted upon
    Other(String),
}

impl Mnemonic {
    /// Map an uppercase code such as "G1" or "M104" to a mnemonic.
    ///
    /// Matching is literal: "G01" is not "G1".
    pub fn from_code(code: &str) -> Self {
        match code {
            "G0" => Mnemonic::G0,
            "G1" => Mnemonic::G1,
            "G2" => Mnemonic::G2,
            "G3" => Mnemonic::G3,
            "G90" => Mnemonic::G90,
            "G91" => Mnemonic::G91,
            other => Mnemonic::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Mnemonic::G0 => "G0",
            Mnemonic::G1 => "G1",
            Mnemonic::G2 => "G2",
            Mnemonic::G3 => "G3",
            Mnemonic::G90 => "G90",
            Mnemonic::G91 => "G91",
            Mnemonic::Other(code) => code,
        }
    }

    /// True for the codes the interpreter dispatches on
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Mnemonic::Other(_))
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Mnemonic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Value attached to an argument letter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArgValue {
    /// Letter followed by a number, e.g. `X10.5`
    Number(f64),
    /// Letter present without a trailing number, e.g. the `X` in `G28 X`
    Flag,
}

impl ArgValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ArgValue::Number(value) => Some(*value),
            ArgValue::Flag => None,
        }
    }
}

impl Serialize for ArgValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ArgValue::Number(value) => serializer.serialize_f64(*value),
            ArgValue::Flag => serializer.serialize_bool(true),
        }
    }
}

/// Value of a `key:value` comment tag
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagValue {
    Number(f64),
    Text(String),
}

impl TagValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            TagValue::Number(value) => Some(*value),
            TagValue::Text(_) => None,
        }
    }

    /// Truthiness used by boolean-ish tags: non-zero numbers and the text
    /// "true" count as set.
    pub fn is_truthy(&self) -> bool {
        match self {
            TagValue::Number(value) => *value != 0.0 && !value.is_nan(),
            TagValue::Text(text) => text == "true",
        }
    }
}

/// One tokenized line of G-code
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommandRecord {
    /// First G/M code of the line, if any
    pub command: Option<Mnemonic>,
    /// Arguments keyed by lowercase letter
    pub args: BTreeMap<char, ArgValue>,
    /// Trailing `;` comment, trimmed
    pub comment: Option<String>,
    /// Structured `key:value` pairs found in the comment
    pub tag: BTreeMap<String, TagValue>,
}

impl CommandRecord {
    /// Numeric value of an argument letter; flags and absent letters yield `None`
    pub fn number(&self, letter: char) -> Option<f64> {
        self.args.get(&letter).and_then(ArgValue::as_number)
    }

    /// True when the line carried no command, arguments or comment
    pub fn is_empty(&self) -> bool {
        self.command.is_none() && self.args.is_empty() && self.comment.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mnemonic_from_code() {
        assert_eq!(Mnemonic::from_code("G1"), Mnemonic::G1);
        assert_eq!(Mnemonic::from_code("G91"), Mnemonic::G91);
        assert_eq!(
            Mnemonic::from_code("M104"),
            Mnemonic::Other("M104".to_string())
        );
        assert!(!Mnemonic::from_code("G01").is_recognized());
    }

    #[test]
    fn test_number_ignores_flags() {
        let mut record = CommandRecord::default();
        record.args.insert('x', ArgValue::Number(2.5));
        record.args.insert('y', ArgValue::Flag);

        assert_eq!(record.number('x'), Some(2.5));
        assert_eq!(record.number('y'), None);
        assert_eq!(record.number('z'), None);
    }

    #[test]
    fn test_tag_truthiness() {
        assert!(TagValue::Number(1.0).is_truthy());
        assert!(!TagValue::Number(0.0).is_truthy());
        assert!(TagValue::Text("true".to_string()).is_truthy());
        assert!(!TagValue::Text("false".to_string()).is_truthy());
    }

    #[test]
    fn test_record_serializes_flags_as_true() {
        let mut record = CommandRecord {
            command: Some(Mnemonic::Other("G28".to_string())),
            ..Default::default()
        };
        record.args.insert('x', ArgValue::Flag);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["command"], "G28");
        assert_eq!(json["args"]["x"], true);
    }
}
