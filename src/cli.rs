//! Command-line front end
//!
//! Streams a file through the orchestrator and writes JSON lines or a
//! summary to stdout. Logging goes to stderr.

use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::AsyncReadExt;

use crate::config::{Config, EmitMode};
use crate::geometry::{GeometryPrimitive, Interpreter, Position};
use crate::parser::{LineSplitter, tokenize_batch};
use crate::stream::{
    CancelToken, GeometrySink, LoadMode, LoadSummary, Progress, StreamOrchestrator,
};

/// Entry point used by the `gcode-geom` binary
pub async fn run() -> Result<()> {
    let config = Config::from_args_and_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();
    if let Some(path) = &config.config_file {
        log::debug!("using configuration file {}", path.display());
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match config.emit {
        EmitMode::Records => emit_records(&config, &mut out).await?,
        EmitMode::Primitives | EmitMode::Trace => {
            let mut sink = JsonLinesSink::new(&mut out, config.emit);
            interpret(&config, &mut sink).await?;
            sink.finish()?;
        }
        EmitMode::Summary => {
            let mut sink = SummarySink::default();
            let summary = interpret(&config, &mut sink).await?;
            let report = SummaryReport {
                lines: summary.lines,
                bytes: summary.bytes_consumed,
                primitives: summary.primitives,
                lines_out: sink.lines,
                arcs: sink.arcs,
                bounds: sink.bounds,
            };
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        }
    }

    out.flush().context("failed to flush output")?;
    Ok(())
}

async fn interpret<S: GeometrySink>(config: &Config, sink: &mut S) -> Result<LoadSummary> {
    let mode = if config.directives {
        LoadMode::Initial
    } else {
        LoadMode::Rerun
    };

    let mut orchestrator = StreamOrchestrator::new(Interpreter::new(config.interpreter.clone()))
        .with_chunk_size(config.chunk_size)
        .with_mode(mode);

    orchestrator
        .run_file(&config.input, sink, CancelToken::never())
        .await
        .with_context(|| format!("failed to interpret {}", config.input.display()))
}

async fn emit_records<W: Write>(config: &Config, out: &mut W) -> Result<()> {
    let mut file = tokio::fs::File::open(&config.input)
        .await
        .with_context(|| format!("failed to open {}", config.input.display()))?;
    let mut splitter = LineSplitter::new();
    let mut buf = vec![0u8; config.chunk_size];

    loop {
        let n = file.read(&mut buf).await?;
        let batch = if n == 0 {
            splitter.finish()
        } else {
            splitter.push(&buf[..n])
        };

        if let Some(batch) = batch {
            for record in tokenize_batch(&batch.lines) {
                serde_json::to_writer(&mut *out, &record)?;
                writeln!(out)?;
            }
        }

        if n == 0 {
            return Ok(());
        }
    }
}

/// Writes primitives or trace positions as JSON lines
struct JsonLinesSink<'a, W: Write> {
    out: &'a mut W,
    mode: EmitMode,
    error: Option<io::Error>,
}

impl<'a, W: Write> JsonLinesSink<'a, W> {
    fn new(out: &'a mut W, mode: EmitMode) -> Self {
        Self {
            out,
            mode,
            error: None,
        }
    }

    fn write_json<T: Serialize>(&mut self, value: &T) {
        if self.error.is_some() {
            return;
        }
        let result = serde_json::to_writer(&mut *self.out, value)
            .map_err(io::Error::from)
            .and_then(|()| writeln!(self.out));
        if let Err(e) = result {
            self.error = Some(e);
        }
    }

    fn finish(self) -> Result<()> {
        match self.error {
            Some(e) => Err(e).context("failed to write output"),
            None => Ok(()),
        }
    }
}

impl<W: Write> GeometrySink for JsonLinesSink<'_, W> {
    fn on_batch(&mut self, progress: Progress, primitives: &[GeometryPrimitive]) {
        if let Some(percent) = progress.percent() {
            log::trace!("{percent:.1}% read");
        }
        if self.mode == EmitMode::Primitives {
            for primitive in primitives {
                self.write_json(primitive);
            }
        }
    }

    fn on_complete(&mut self, cursor_trace: &[Position]) {
        if self.mode == EmitMode::Trace {
            for position in cursor_trace {
                self.write_json(&position.to_array());
            }
        }
    }
}

/// Axis-aligned box around every primitive endpoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct Bounds {
    min: [f64; 3],
    max: [f64; 3],
}

impl Bounds {
    fn around(point: Position) -> Self {
        let p = point.to_array();
        Self { min: p, max: p }
    }

    fn include(&mut self, point: Position) {
        for (i, value) in point.to_array().into_iter().enumerate() {
            self.min[i] = self.min[i].min(value);
            self.max[i] = self.max[i].max(value);
        }
    }
}

#[derive(Debug, Default)]
struct SummarySink {
    lines: u64,
    arcs: u64,
    bounds: Option<Bounds>,
}

impl GeometrySink for SummarySink {
    fn on_batch(&mut self, _progress: Progress, primitives: &[GeometryPrimitive]) {
        for primitive in primitives {
            if primitive.is_arc() {
                self.arcs += 1;
            } else {
                self.lines += 1;
            }
            for point in [primitive.start(), primitive.end()] {
                self.bounds
                    .get_or_insert_with(|| Bounds::around(point))
                    .include(point);
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct SummaryReport {
    lines: u64,
    bytes: u64,
    primitives: u64,
    lines_out: u64,
    arcs: u64,
    bounds: Option<Bounds>,
}
