//! Interpreter configuration
//!
//! Settings a caller fixes before a run: layer handling, axis remapping and
//! the starting feedrate. Deserializable so it can sit in a TOML file.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::geometry::types::LogicalAxis;

/// Input letters a logical axis may read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AxisLetter {
    X,
    Y,
    Z,
    A,
    B,
    C,
    U,
    V,
    W,
    E,
    I,
    J,
}

impl AxisLetter {
    pub const ALL: [AxisLetter; 12] = [
        AxisLetter::X,
        AxisLetter::Y,
        AxisLetter::Z,
        AxisLetter::A,
        AxisLetter::B,
        AxisLetter::C,
        AxisLetter::U,
        AxisLetter::V,
        AxisLetter::W,
        AxisLetter::E,
        AxisLetter::I,
        AxisLetter::J,
    ];

    /// Lowercase argument letter as stored in a `CommandRecord`
    pub fn as_char(self) -> char {
        match self {
            AxisLetter::X => 'x',
            AxisLetter::Y => 'y',
            AxisLetter::Z => 'z',
            AxisLetter::A => 'a',
            AxisLetter::B => 'b',
            AxisLetter::C => 'c',
            AxisLetter::U => 'u',
            AxisLetter::V => 'v',
            AxisLetter::W => 'w',
            AxisLetter::E => 'e',
            AxisLetter::I => 'i',
            AxisLetter::J => 'j',
        }
    }
}

impl fmt::Display for AxisLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for AxisLetter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let letter = match (chars.next(), chars.next()) {
            (Some(c), None) => c.to_ascii_lowercase(),
            _ => return Err(Error::UnknownAxisLetter(s.to_string())),
        };

        AxisLetter::ALL
            .into_iter()
            .find(|candidate| candidate.as_char() == letter)
            .ok_or_else(|| Error::UnknownAxisLetter(s.to_string()))
    }
}

impl TryFrom<String> for AxisLetter {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AxisLetter> for String {
    fn from(letter: AxisLetter) -> Self {
        letter.as_char().to_string()
    }
}

/// Which input letter feeds each logical axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisMap {
    pub x: AxisLetter,
    pub y: AxisLetter,
    pub z: AxisLetter,
}

impl Default for AxisMap {
    fn default() -> Self {
        Self {
            x: AxisLetter::X,
            y: AxisLetter::Y,
            z: AxisLetter::Z,
        }
    }
}

impl AxisMap {
    pub fn source(&self, axis: LogicalAxis) -> AxisLetter {
        match axis {
            LogicalAxis::X => self.x,
            LogicalAxis::Y => self.y,
            LogicalAxis::Z => self.z,
        }
    }

    pub fn set_source(&mut self, axis: LogicalAxis, letter: AxisLetter) {
        match axis {
            LogicalAxis::X => self.x = letter,
            LogicalAxis::Y => self.y = letter,
            LogicalAxis::Z => self.z = letter,
        }
    }
}

/// Caller-supplied settings applied at construction and on every reset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterOptions {
    /// Height of one layer, used by `layer:` comment tags
    pub layer_height: f64,
    /// Whether `layer:` tags move the cursor's Z
    pub enable_layer_view: bool,
    pub x_axis: AxisLetter,
    pub y_axis: AxisLetter,
    pub z_axis: AxisLetter,
    /// Feedrate for moves without an `F` word
    pub feedrate: f64,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            layer_height: 0.1,
            enable_layer_view: false,
            x_axis: AxisLetter::X,
            y_axis: AxisLetter::Y,
            z_axis: AxisLetter::Z,
            feedrate: 100.0,
        }
    }
}

impl InterpreterOptions {
    pub fn axis_map(&self) -> AxisMap {
        AxisMap {
            x: self.x_axis,
            y: self.y_axis,
            z: self.z_axis,
        }
    }

    pub fn set_axis_source(&mut self, axis: LogicalAxis, letter: AxisLetter) {
        match axis {
            LogicalAxis::X => self.x_axis = letter,
            LogicalAxis::Y => self.y_axis = letter,
            LogicalAxis::Z => self.z_axis = letter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_axis_letter() {
        assert_eq!("e".parse::<AxisLetter>().unwrap(), AxisLetter::E);
        assert_eq!(" J ".parse::<AxisLetter>().unwrap(), AxisLetter::J);
        assert!("q".parse::<AxisLetter>().is_err());
        assert!("xy".parse::<AxisLetter>().is_err());
        assert!("".parse::<AxisLetter>().is_err());
    }

    #[test]
    fn test_options_from_toml() {
        let options: InterpreterOptions = toml::from_str(
            r#"
            layer_height = 0.2
            z_axis = "E"
            "#,
        )
        .unwrap();

        assert_eq!(options.layer_height, 0.2);
        assert_eq!(options.z_axis, AxisLetter::E);
        assert_eq!(options.x_axis, AxisLetter::X);
        assert_eq!(options.feedrate, 100.0);
    }

    #[test]
    fn test_options_reject_unknown_letter() {
        let result = toml::from_str::<InterpreterOptions>(r#"x_axis = "q""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_axis_map_from_options() {
        let mut options = InterpreterOptions::default();
        options.set_axis_source(LogicalAxis::Z, AxisLetter::E);

        let map = options.axis_map();
        assert_eq!(map.source(LogicalAxis::X), AxisLetter::X);
        assert_eq!(map.source(LogicalAxis::Z), AxisLetter::E);
    }
}
