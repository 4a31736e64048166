//! DuoCanvas CLI - run the layout engine and replay event scripts without a
//! rendering surface.
//!
//! Output is JSON on stdout; logging goes to stderr (`RUST_LOG=debug`).

use clap::{Parser, Subcommand};
use duocanvas_core::{
    CanvasConfig, CanvasEvent, CanvasStateMachine, ConfigError, Instant, LayoutDirection, LayoutGraph,
    SerializableColor, ViewportPush, compute_graph_layout,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use thiserror::Error;

#[derive(Parser)]
#[command(name = "duocanvas")]
#[command(about = "Layout and state machine harness for DuoCanvas diagrams")]
struct Cli {
    /// Canvas config JSON (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out a graph file ({"nodes": [...], "edges": [...]}) and print positions
    Layout {
        graph: PathBuf,

        /// TB, BT, LR or RL (overrides the config)
        #[arg(short, long, value_parser = parse_direction)]
        direction: Option<LayoutDirection>,
    },

    /// Replay a JSON event script through the state machine and print the final context
    Replay {
        script: PathBuf,

        /// Print the derived state after every step
        #[arg(long)]
        trace: bool,

        /// How long to wait for background layouts before printing
        #[arg(long, default_value_t = 5000)]
        timeout_ms: u64,

        /// Initial stroke color as a CSS color ("#ff8000", "teal")
        #[arg(long, value_parser = parse_stroke_color)]
        stroke_color: Option<SerializableColor>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to write output: {0}")]
    Output(#[from] serde_json::Error),
}

/// One step of a replay script.
#[derive(Debug, Deserialize)]
struct ScriptStep {
    /// Milliseconds since the start of the replay.
    #[serde(default)]
    at_ms: u64,
    event: CanvasEvent,
}

#[derive(Serialize)]
struct TraceLine<'a> {
    step: usize,
    event: &'static str,
    state: duocanvas_core::CanvasState,
    viewport_pushes: &'a [ViewportPush],
}

fn parse_direction(s: &str) -> Result<LayoutDirection, String> {
    LayoutDirection::parse(s).ok_or_else(|| format!("unknown direction {s:?}, expected TB, BT, LR or RL"))
}

fn parse_stroke_color(s: &str) -> Result<SerializableColor, String> {
    SerializableColor::parse(s).ok_or_else(|| format!("unknown color {s:?}"))
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Layout { graph, direction } => run_layout(&config, &graph, direction),
        Commands::Replay {
            script,
            trace,
            timeout_ms,
            stroke_color,
        } => {
            let config = CanvasConfig {
                stroke_color: stroke_color.unwrap_or(config.stroke_color),
                ..config
            };
            run_replay(config, &script, trace, Duration::from_millis(timeout_ms))
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<CanvasConfig, CliError> {
    match path {
        Some(path) => Ok(CanvasConfig::load(path)?),
        None => Ok(CanvasConfig::default()),
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn run_layout(
    config: &CanvasConfig,
    path: &Path,
    direction: Option<LayoutDirection>,
) -> Result<(), CliError> {
    let graph: LayoutGraph = read_json(path)?;
    let direction = direction.unwrap_or(config.layout_direction);
    log::info!(
        "Laying out {} nodes, {} edges ({:?})",
        graph.nodes.len(),
        graph.edges.len(),
        direction
    );

    let positions = compute_graph_layout(&graph, direction, &config.layout);
    println!("{}", serde_json::to_string_pretty(&positions)?);
    Ok(())
}

fn run_replay(
    config: CanvasConfig,
    path: &Path,
    trace: bool,
    timeout: Duration,
) -> Result<(), CliError> {
    let steps: Vec<ScriptStep> = read_json(path)?;
    log::info!("Replaying {} events from {}", steps.len(), path.display());

    let mut machine = CanvasStateMachine::new(config);
    let start = Instant::now();

    for (step, ScriptStep { at_ms, event }) in steps.into_iter().enumerate() {
        let name = event.name();
        machine.send_at(event, start + Duration::from_millis(at_ms));
        machine.poll_layout();

        let pushes = machine.take_viewport_pushes();
        if trace {
            let line = TraceLine {
                step,
                event: name,
                state: machine.state(),
                viewport_pushes: &pushes,
            };
            println!("{}", serde_json::to_string(&line)?);
        }
    }

    if !machine.wait_for_layout(timeout) {
        log::warn!("Timed out waiting for layout {}", machine.layout_sequence());
    }
    println!("{}", machine.context().to_json()?);
    Ok(())
}
