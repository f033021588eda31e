//! Geometry Interpreter
//!
//! A modal state machine fed one [`CommandRecord`] at a time, in stream
//! order. Each record may update modal settings (positioning mode, feedrate,
//! layer metadata), may emit one [`GeometryPrimitive`], and always appends
//! the resulting cursor position to the trace.

use crate::geometry::options::{AxisLetter, AxisMap, InterpreterOptions};
use crate::geometry::types::{ArcDirection, GeometryPrimitive, LogicalAxis, Position};
use crate::parser::ast::{CommandRecord, Mnemonic, TagValue};

/// How axis words are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionMode {
    #[default]
    Absolute,
    Relative,
}

/// Everything that persists from one record to the next
#[derive(Debug, Clone, PartialEq)]
pub struct ModalState {
    pub position_mode: PositionMode,
    pub feedrate: f64,
    pub layer_height: f64,
    pub enable_layer_view: bool,
    pub total_layers: u32,
    pub axis_map: AxisMap,
    pub position: Position,
    /// Records processed so far
    pub line_count: u64,
}

impl ModalState {
    pub fn from_options(options: &InterpreterOptions) -> Self {
        Self {
            position_mode: PositionMode::Absolute,
            feedrate: options.feedrate,
            layer_height: options.layer_height,
            enable_layer_view: options.enable_layer_view,
            total_layers: 0,
            axis_map: options.axis_map(),
            position: Position::ORIGIN,
            line_count: 0,
        }
    }
}

/// Streaming G-code to geometry interpreter
#[derive(Debug, Clone)]
pub struct Interpreter {
    options: InterpreterOptions,
    state: ModalState,
    cursor_trace: Vec<Position>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(InterpreterOptions::default())
    }
}

impl Interpreter {
    pub fn new(options: InterpreterOptions) -> Self {
        let state = ModalState::from_options(&options);
        Self {
            options,
            state,
            cursor_trace: Vec::new(),
        }
    }

    /// Discard all motion state and start over from the current options
    pub fn reset(&mut self) {
        self.state = ModalState::from_options(&self.options);
        self.cursor_trace.clear();
    }

    /// Replace the options and reset
    pub fn reset_with(&mut self, options: InterpreterOptions) {
        self.options = options;
        self.reset();
    }

    pub fn options(&self) -> &InterpreterOptions {
        &self.options
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn position(&self) -> Position {
        self.state.position
    }

    /// Position after every record processed so far
    pub fn cursor_trace(&self) -> &[Position] {
        &self.cursor_trace
    }

    pub fn take_cursor_trace(&mut self) -> Vec<Position> {
        std::mem::take(&mut self.cursor_trace)
    }

    /// Redirect a logical axis to another input letter, both for the rest
    /// of this run and for later resets
    pub fn set_axis_source(&mut self, axis: LogicalAxis, letter: AxisLetter) {
        self.options.set_axis_source(axis, letter);
        self.state.axis_map.set_source(axis, letter);
    }

    pub fn set_layer_height(&mut self, layer_height: f64) {
        self.options.layer_height = layer_height;
        self.state.layer_height = layer_height;
    }

    pub fn set_layer_view(&mut self, enabled: bool) {
        self.options.enable_layer_view = enabled;
        self.state.enable_layer_view = enabled;
    }

    /// Process a batch of records in order
    pub fn process_batch(&mut self, records: &[CommandRecord]) -> Vec<GeometryPrimitive> {
        records
            .iter()
            .filter_map(|record| self.process(record))
            .collect()
    }

    /// Process one record, returning the primitive it produced, if any
    pub fn process(&mut self, record: &CommandRecord) -> Option<GeometryPrimitive> {
        self.state.line_count += 1;

        if !record.tag.is_empty() {
            self.apply_tags(record);
        }

        let primitive = match &record.command {
            Some(Mnemonic::G0) | Some(Mnemonic::G1) => Some(self.linear_move(record)),
            Some(Mnemonic::G2) => Some(self.arc_move(record, ArcDirection::Cw)),
            Some(Mnemonic::G3) => Some(self.arc_move(record, ArcDirection::Ccw)),
            Some(Mnemonic::G90) => {
                self.state.position_mode = PositionMode::Absolute;
                None
            }
            Some(Mnemonic::G91) => {
                self.state.position_mode = PositionMode::Relative;
                None
            }
            Some(Mnemonic::Other(_)) | None => None,
        };

        self.cursor_trace.push(self.state.position);
        primitive
    }

    fn linear_move(&mut self, record: &CommandRecord) -> GeometryPrimitive {
        let start = self.state.position;
        let end = self.resolve_target(record);
        self.state.position = end;

        GeometryPrimitive::Line {
            start,
            end,
            feedrate: self.move_feedrate(record),
            source_line: self.state.line_count,
        }
    }

    fn arc_move(&mut self, record: &CommandRecord, direction: ArcDirection) -> GeometryPrimitive {
        let start = self.state.position;
        let end = self.resolve_target(record);
        self.state.position = end;

        // I/J are offsets from the arc start in either positioning mode
        let center = [
            start.x + record.number('i').unwrap_or(0.0),
            start.y + record.number('j').unwrap_or(0.0),
        ];

        GeometryPrimitive::Arc {
            start,
            end,
            center,
            direction,
            feedrate: self.move_feedrate(record),
            source_line: self.state.line_count,
        }
    }

    fn move_feedrate(&self, record: &CommandRecord) -> f64 {
        record.number('f').unwrap_or(self.state.feedrate)
    }

    fn resolve_target(&self, record: &CommandRecord) -> Position {
        let mut resolved = [0.0; 3];
        for (slot, axis) in resolved.iter_mut().zip(LogicalAxis::ALL) {
            *slot = self.resolve_axis(record, axis);
        }
        Position::new(resolved[0], resolved[1], resolved[2])
    }

    fn resolve_axis(&self, record: &CommandRecord, axis: LogicalAxis) -> f64 {
        let current = self.state.position.get(axis);
        let source = self.state.axis_map.source(axis);
        let value = record.number(source.as_char());

        match self.state.position_mode {
            PositionMode::Absolute => value.unwrap_or(current),
            PositionMode::Relative => current + value.unwrap_or(0.0),
        }
    }

    /// Apply modal updates carried by comment tags.
    ///
    /// Keys are handled in a fixed order so that a comment carrying both
    /// `layer_height` and `layer` uses the new height.
    fn apply_tags(&mut self, record: &CommandRecord) {
        let tags = &record.tag;

        if let Some(feedrate) = tags.get("cts").and_then(TagValue::as_number) {
            self.state.feedrate = feedrate;
        }

        if let Some(height) = tags.get("layer_height").and_then(TagValue::as_number) {
            self.state.layer_height = height;
        }

        let total = ["total_layers", "total_layer", "totallayers", "totallayer"]
            .iter()
            .find_map(|key| tags.get(*key))
            .and_then(TagValue::as_number);
        if let Some(total) = total.filter(|t| *t >= 0.0) {
            self.state.total_layers = total as u32;
        }

        if let Some(flag) = tags.get("enable_layer_view") {
            self.state.enable_layer_view = flag.is_truthy();
        }

        if let Some(layer) = tags.get("layer") {
            if self.state.enable_layer_view {
                match layer_index(layer) {
                    Some(index) => {
                        self.state.position.z = index as f64 * self.state.layer_height;
                    }
                    None => log::trace!("ignoring non-integer layer tag {:?}", layer),
                }
            }
        }
    }
}

/// Integer part of a layer tag, the way a lenient integer parse reads it:
/// numbers are truncated, text contributes its leading signed digits.
fn layer_index(value: &TagValue) -> Option<i64> {
    match value {
        TagValue::Number(number) if number.is_finite() => Some(number.trunc() as i64),
        TagValue::Number(_) => None,
        TagValue::Text(text) => {
            let text = text.trim_start();
            let digits_start = usize::from(text.starts_with(['+', '-']));
            let digits_len = text[digits_start..]
                .bytes()
                .take_while(u8::is_ascii_digit)
                .count();
            if digits_len == 0 {
                return None;
            }
            text[..digits_start + digits_len].parse().ok()
        }
    }
}
