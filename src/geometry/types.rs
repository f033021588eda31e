//! Geometry output types

use serde::Serialize;

/// Cursor position in machine units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const ORIGIN: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn get(&self, axis: LogicalAxis) -> f64 {
        match axis {
            LogicalAxis::X => self.x,
            LogicalAxis::Y => self.y,
            LogicalAxis::Z => self.z,
        }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// The three output axes, always resolved in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalAxis {
    X,
    Y,
    Z,
}

impl LogicalAxis {
    pub const ALL: [LogicalAxis; 3] = [LogicalAxis::X, LogicalAxis::Y, LogicalAxis::Z];
}

/// Arc winding as seen from +Z
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcDirection {
    Cw,
    Ccw,
}

/// One emitted motion segment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GeometryPrimitive {
    Line {
        start: Position,
        end: Position,
        feedrate: f64,
        source_line: u64,
    },
    Arc {
        start: Position,
        end: Position,
        /// XY center; arcs are always in the XY plane
        center: [f64; 2],
        direction: ArcDirection,
        feedrate: f64,
        source_line: u64,
    },
}

impl GeometryPrimitive {
    pub fn start(&self) -> Position {
        match self {
            GeometryPrimitive::Line { start, .. } | GeometryPrimitive::Arc { start, .. } => *start,
        }
    }

    pub fn end(&self) -> Position {
        match self {
            GeometryPrimitive::Line { end, .. } | GeometryPrimitive::Arc { end, .. } => *end,
        }
    }

    pub fn feedrate(&self) -> f64 {
        match self {
            GeometryPrimitive::Line { feedrate, .. } | GeometryPrimitive::Arc { feedrate, .. } => {
                *feedrate
            }
        }
    }

    /// 1-based index of the record that produced this primitive
    pub fn source_line(&self) -> u64 {
        match self {
            GeometryPrimitive::Line { source_line, .. }
            | GeometryPrimitive::Arc { source_line, .. } => *source_line,
        }
    }

    pub fn is_arc(&self) -> bool {
        matches!(self, GeometryPrimitive::Arc { .. })
    }
}
