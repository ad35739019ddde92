mod config;
mod error;
mod exit;
mod export;
mod scenario;
mod stats;

use anyhow::Result;
use clap::Parser;
use compass::{Config, StripStyle, render::render_strip};
use log::{debug, info, warn};
use std::{path::PathBuf, thread, time::Duration};

/// Trace rows are written every this many frames
const TRACE_EVERY: u64 = 10;

/// Drive the compass over a scripted scene and export what it did
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML configuration (built-in defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 600)]
    frames: u64,

    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Sleep between frames to run at `fps`
    #[arg(long)]
    realtime: bool,
}

fn main() -> Result<()> {
    // Initialize logger - defaults to RUST_LOG if set, otherwise INFO
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let args = Args::parse();
    if !(args.fps.is_finite() && args.fps > 0.0) {
        return Err(error::SimError::InvalidConfiguration(format!(
            "fps must be positive, got {}",
            args.fps
        ))
        .into());
    }

    let sim_config = config::SimConfig::from_env()?;
    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    let unmapped = config.unmapped_kinds();
    if !unmapped.is_empty() {
        warn!("Kinds without a row mapping will not be shown: {unmapped}");
    }

    info!("Compass simulator starting...");
    info!("Output directory: {}", sim_config.output_dir.display());
    let exit_flag = exit::ExitFlag::new();
    exit_flag.install()?;

    let files = export::OutputFiles::create(&sim_config.output_dir)?;
    let mut trace = export::TraceWriter::create(&files.trace())?;
    let mut statistics = stats::SimStatistics::new();
    let mut scene = scenario::Scene::new(&config, args.fps, args.frames / 2)?;
    let frame_time = Duration::from_secs_f32(1.0 / args.fps);
    debug!("{} will be unregistered at frame {}", scene.vanishing(), args.frames / 2);

    let mut ran = 0;
    for frame in 0..args.frames {
        if exit_flag.is_set() {
            info!("Received exit signal, stopping at frame {frame}");
            break;
        }
        let report = scene.step(frame);
        statistics.record(&report);
        if frame % TRACE_EVERY == 0 {
            trace.write_frame(frame, scene.driver().pool())?;
        }
        if args.realtime {
            thread::sleep(frame_time);
        }
        ran += 1;
    }
    info!("Ran {ran} frames");

    let trace_rows = trace.rows();
    trace.finish()?;
    debug!("Trace rows written: {trace_rows}");
    info!("Trace saved to: {}", files.trace().display());

    export::export_stats_to_csv(&statistics, &files.stats())?;
    info!("Statistics saved to: {}", files.stats().display());

    let driver = scene.driver();
    driver.snapshot().write_json(files.snapshot())?;
    info!("Snapshot saved to: {}", files.snapshot().display());

    let style = StripStyle {
        width: config.display.band_width.round() as u32,
        ..StripStyle::default()
    };
    render_strip(
        files.strip(),
        style,
        driver.tracker().heading(),
        config.display.uv_width_fraction,
        driver.pool(),
    )?;
    info!("Strip saved to: {}", files.strip().display());

    if statistics.is_empty() {
        info!("No frames ran.");
        return Ok(());
    }
    info!("Top events:");
    for (i, (event, count)) in statistics.sorted().iter().take(10).enumerate() {
        info!("{}. {}: {}", i + 1, event, count);
    }
    Ok(())
}
