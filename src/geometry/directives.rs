//! In-band viewer settings
//!
//! Files can carry their own viewing setup in comments, e.g.
//! `; z_axis:e, hide_layers:false, layer_height:0.3`. These are honoured on
//! the initial load of a file only; a re-run keeps whatever the caller
//! configured. Unlike modal tags they also update the interpreter's options,
//! so they survive a reset.

use crate::geometry::interpreter::Interpreter;
use crate::geometry::options::AxisLetter;
use crate::geometry::types::LogicalAxis;
use crate::parser::ast::{CommandRecord, TagValue};

const AXIS_KEYS: [(&str, LogicalAxis); 3] = [
    ("x_axis", LogicalAxis::X),
    ("y_axis", LogicalAxis::Y),
    ("z_axis", LogicalAxis::Z),
];

/// Apply the setting directives found in one record's tags.
///
/// Returns true if any setting changed.
pub fn apply_setting_directives(record: &CommandRecord, interpreter: &mut Interpreter) -> bool {
    if record.tag.is_empty() {
        return false;
    }

    let mut changed = false;

    for (key, axis) in AXIS_KEYS {
        let Some(value) = record.tag.get(key) else {
            continue;
        };
        match axis_letter(value) {
            Some(letter) => {
                log::debug!("directive {key}: logical {axis:?} now reads '{letter}'");
                interpreter.set_axis_source(axis, letter);
                changed = true;
            }
            None => log::warn!("ignoring {key} directive with unusable value {value:?}"),
        }
    }

    // Only the literal text "true" hides layers; numbers do not
    if let Some(hide) = record.tag.get("hide_layers") {
        let hidden = matches!(hide, TagValue::Text(text) if text == "true");
        interpreter.set_layer_view(!hidden);
        changed = true;
    }

    if let Some(height) = record.tag.get("layer_height").and_then(TagValue::as_number) {
        interpreter.set_layer_height(height);
        changed = true;
    }

    changed
}

fn axis_letter(value: &TagValue) -> Option<AxisLetter> {
    match value {
        TagValue::Text(text) => text.parse().ok(),
        TagValue::Number(_) => None,
    }
}
