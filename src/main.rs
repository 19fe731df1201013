// SPDX-License-Identifier: MIT
//
// shade: an animated fractal-noise field drawn with the shade-term renderer.
//
//   cli    → options (clap)
//   noise  → seeded fractal value noise, sampled once at startup
//   scene  → noise + tick → palette index per cell, color bars, status line
//
// Everything else (terminal session, signals, frame timing, diffing) is
// shade-term's FrameLoop. After the loop ends and the terminal is restored,
// the terminal size and frame size statistics are printed to stdout.

mod cli;
mod noise;
mod scene;

use std::fs::File;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, ensure};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shade_term::context::{BufferStats, RendererContext};
use shade_term::frame_loop::FrameLoop;
use shade_term::terminal::{Size, Terminal};

use crate::cli::Cli;
use crate::noise::FractalNoise;
use crate::scene::{NoiseScene, Overlays};

/// What the run leaves behind for the exit report.
struct Summary {
    terminal: Size,
    stats: BufferStats,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("shade: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<Summary> {
    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let max = cli.max_size();
    ensure!(max.area() > 0, "canvas maximum must be non-empty, got {max}");

    let seed = cli.seed.unwrap_or_else(clock_seed);
    info!(seed, octaves = cli.octaves, persistence = cli.persistence, %max, "starting");

    let noise = FractalNoise::new(seed)
        .with_octaves(cli.octaves)
        .with_persistence(cli.persistence);
    let mut scene = NoiseScene::new(
        &noise,
        max,
        Overlays {
            color_bars: !cli.no_color_bars,
            status: cli.status,
        },
    );

    let ctx = RendererContext::new(max).with_skip_threshold(cli.skip_threshold);
    let terminal = Terminal::open().context("cannot open the controlling terminal")?;
    let mut frames = FrameLoop::new(terminal, ctx, cli.loop_config());

    frames.run(&mut scene).context("render loop failed")?;

    Ok(Summary {
        terminal: frames.terminal_size(),
        stats: *frames.context().stats(),
    })
}

/// Log to `path`. The terminal is the display, so logs never go to stderr.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs() ^ u64::from(d.subsec_nanos()))
}

fn print_summary(summary: &Summary) {
    let stats = &summary.stats;
    println!("terminal: {}", summary.terminal);
    println!("frames: {}", stats.frames());
    println!("largest frame: {} bytes", stats.largest());
    match stats.smallest() {
        Some(bytes) => println!("smallest frame: {bytes} bytes"),
        None => println!("smallest frame: -"),
    }
}
