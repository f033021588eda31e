//! Geometry interpretation
//!
//! Modal state machine turning tokenized records into line and arc
//! primitives, plus the options and in-band directives that configure it.

pub mod directives;
pub mod interpreter;
pub mod options;
pub mod types;

pub use directives::apply_setting_directives;
pub use interpreter::{Interpreter, ModalState, PositionMode};
pub use options::{AxisLetter, AxisMap, InterpreterOptions};
pub use types::{ArcDirection, GeometryPrimitive, LogicalAxis, Position};
