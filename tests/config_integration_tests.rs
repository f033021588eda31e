//! Tests for configuration loading from files and command-line arguments
use std::io::Write;

use clap::Parser;
use gcode_geometry::config::{Args, Config, EmitMode};
use gcode_geometry::geometry::AxisLetter;

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn test_explicit_config_file_is_applied() {
    let file = config_file(
        r#"
        chunk_size = 512

        [interpreter]
        layer_height = 0.25
        enable_layer_view = true
        z_axis = "e"
        "#,
    );
    let path = file.path().to_str().unwrap();

    let args = Args::parse_from(["gcode-geom", "part.gcode", "--config", path]);
    let config = Config::from_args(args).expect("create config");

    assert_eq!(config.chunk_size, 512);
    assert_eq!(config.interpreter.layer_height, 0.25);
    assert!(config.interpreter.enable_layer_view);
    assert_eq!(config.interpreter.z_axis, AxisLetter::E);
    assert_eq!(config.config_file.as_deref(), Some(file.path()));
}

#[test]
fn test_cli_flags_override_config_file() {
    let file = config_file("[interpreter]\nx_axis = \"u\"\nfeedrate = 50.0\n");
    let path = file.path().to_str().unwrap();

    let args = Args::parse_from([
        "gcode-geom",
        "part.gcode",
        "--config",
        path,
        "--x-axis",
        "x",
        "--emit",
        "trace",
        "--no-directives",
    ]);
    let config = Config::from_args(args).expect("create config");

    assert_eq!(config.interpreter.x_axis, AxisLetter::X);
    assert_eq!(config.interpreter.feedrate, 50.0);
    assert_eq!(config.emit, EmitMode::Trace);
    assert!(!config.directives);
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let args = Args::parse_from([
        "gcode-geom",
        "part.gcode",
        "--config",
        "/nonexistent/gcode-geometry.toml",
    ]);
    let err = Config::from_args(args).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/gcode-geometry.toml"));
}

#[test]
fn test_invalid_axis_in_config_file() {
    let file = config_file("[interpreter]\ny_axis = \"k\"\n");
    let path = file.path().to_str().unwrap();

    let args = Args::parse_from(["gcode-geom", "part.gcode", "--config", path]);
    assert!(Config::from_args(args).is_err());
}
