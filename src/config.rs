//! Configuration management for the G-code geometry tool.
//!
//! Handles:
//! - Command-line argument parsing
//! - Optional TOML configuration file
//! - Merging both over the built-in defaults (CLI wins)

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::geometry::{AxisLetter, InterpreterOptions};
use crate::stream::DEFAULT_CHUNK_SIZE;

/// What the command-line tool writes to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum EmitMode {
    /// Counts and bounding box
    #[default]
    Summary,
    /// One JSON object per line or arc
    Primitives,
    /// One JSON object per tokenized line, without interpretation
    Records,
    /// One JSON position per processed line
    Trace,
}

/// Command-line arguments for the G-code geometry tool
#[derive(Debug, Parser)]
#[command(name = "gcode-geom")]
#[command(about = "Stream G-code into line and arc geometry")]
#[command(version)]
pub struct Args {
    /// G-code file to read
    pub input: PathBuf,

    /// Configuration file (defaults to <config dir>/gcode-geometry/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Height of one layer for `layer:` comment tags
    #[arg(long)]
    pub layer_height: Option<f64>,

    /// Let `layer:` comment tags move the cursor's Z
    #[arg(long)]
    pub layer_view: bool,

    /// Input letter feeding the X axis
    #[arg(long)]
    pub x_axis: Option<AxisLetter>,

    /// Input letter feeding the Y axis
    #[arg(long)]
    pub y_axis: Option<AxisLetter>,

    /// Input letter feeding the Z axis
    #[arg(long)]
    pub z_axis: Option<AxisLetter>,

    /// Feedrate for moves without an F word
    #[arg(long)]
    pub feedrate: Option<f64>,

    /// Read size in bytes
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = EmitMode::Summary)]
    pub emit: EmitMode,

    /// Ignore setting directives (x_axis:, hide_layers:, ...) in comments
    #[arg(long)]
    pub no_directives: bool,

    /// Log level
    #[arg(long, help = "Log level (trace, debug, info, warn, error)")]
    pub log_level: Option<String>,
}

/// On-disk configuration file
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    pub chunk_size: Option<usize>,
    pub log_level: Option<String>,
    pub interpreter: InterpreterOptions,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&text, path)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub interpreter: InterpreterOptions,
    pub chunk_size: usize,
    pub emit: EmitMode,
    pub directives: bool,
    pub log_level: String,
    /// Configuration file that was applied, if any
    pub config_file: Option<PathBuf>,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        // An explicit --config must exist; the default location is optional
        let (file, config_file) = match &args.config {
            Some(path) => (FileConfig::load(path)?, Some(path.clone())),
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(path) => (FileConfig::load(&path)?, Some(path)),
                None => (FileConfig::default(), None),
            },
        };

        Ok(Self::merge(args, file, config_file))
    }

    fn merge(args: Args, file: FileConfig, config_file: Option<PathBuf>) -> Self {
        let mut interpreter = file.interpreter;
        if let Some(layer_height) = args.layer_height {
            interpreter.layer_height = layer_height;
        }
        if args.layer_view {
            interpreter.enable_layer_view = true;
        }
        if let Some(letter) = args.x_axis {
            interpreter.x_axis = letter;
        }
        if let Some(letter) = args.y_axis {
            interpreter.y_axis = letter;
        }
        if let Some(letter) = args.z_axis {
            interpreter.z_axis = letter;
        }
        if let Some(feedrate) = args.feedrate {
            interpreter.feedrate = feedrate;
        }

        Config {
            input: args.input,
            interpreter,
            chunk_size: args
                .chunk_size
                .or(file.chunk_size)
                .unwrap_or(DEFAULT_CHUNK_SIZE)
                .max(1),
            emit: args.emit,
            directives: !args.no_directives,
            log_level: args
                .log_level
                .or(file.log_level)
                .unwrap_or_else(|| "info".to_string()),
            config_file,
        }
    }
}

/// `<config dir>/gcode-geometry/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gcode-geometry").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["gcode-geom", "part.gcode"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_cli_defaults() {
        let config = Config::merge(args(&[]), FileConfig::default(), None);

        assert_eq!(config.input, PathBuf::from("part.gcode"));
        assert_eq!(config.interpreter, InterpreterOptions::default());
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.emit, EmitMode::Summary);
        assert!(config.directives);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig::parse(
            r#"
            chunk_size = 1024
            log_level = "debug"

            [interpreter]
            layer_height = 0.3
            z_axis = "e"
            feedrate = 900.0
            "#,
            Path::new("config.toml"),
        )
        .unwrap();

        let config = Config::merge(
            args(&["--feedrate", "1500", "--x-axis", "A", "--emit", "primitives"]),
            file,
            None,
        );

        assert_eq!(config.chunk_size, 1024);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.interpreter.layer_height, 0.3);
        assert_eq!(config.interpreter.z_axis, AxisLetter::E);
        assert_eq!(config.interpreter.x_axis, AxisLetter::A);
        assert_eq!(config.interpreter.feedrate, 1500.0);
        assert_eq!(config.emit, EmitMode::Primitives);
    }

    #[test]
    fn test_bad_axis_letter_rejected_by_cli() {
        let result = Args::try_parse_from(["gcode-geom", "a.gcode", "--z-axis", "q"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_file_reports_path() {
        let err = FileConfig::parse("chunk_size = \"big\"", Path::new("/tmp/x.toml")).unwrap_err();
        assert!(err.to_string().contains("/tmp/x.toml"));
    }
}
