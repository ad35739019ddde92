use anyhow::Result;
use clap::Parser;
use compass::{
    CompassDriver, Config, FrameInput, MemoryBand, MemorySurface, PoiKind, PoiKinds,
    PoiRegistry, StripStyle, Vec3, render::render_strip,
};
use log::info;
use std::{fs, path::PathBuf};

/// Render a demo compass strip to PNG
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML configuration (built-in defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "figs/compass_strip.png")]
    output: PathBuf,

    /// Viewer heading in degrees, clockwise from north
    #[arg(long, default_value_t = 0.0)]
    heading: f32,
}

fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    let mut driver = CompassDriver::from_config(
        &config,
        demo_registry(),
        MemoryBand::new(),
        |_, _| MemorySurface::from_settings(&config.pool),
    )?;

    let r = args.heading.to_radians();
    let input = FrameInput {
        reference_forward: Vec3::new(r.sin(), 0.0, r.cos()),
        tracked_position: Vec3::ZERO,
    };
    let report = driver.tick(&input);
    info!(
        "bound {} icons, {} displaced, {} skipped",
        report.bound,
        report.displaced,
        report.skipped_total()
    );

    if let Some(dir) = args.output.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)?;
    }
    let style = StripStyle {
        width: config.display.band_width.round() as u32,
        ..StripStyle::default()
    };
    render_strip(
        &args.output,
        style,
        driver.tracker().heading(),
        config.display.uv_width_fraction,
        driver.pool(),
    )?;
    info!("wrote {}", args.output.display());
    Ok(())
}

fn demo_registry() -> PoiRegistry {
    let mut registry = PoiRegistry::new();
    let place = |deg: f32, distance: f32, y: f32| {
        let r = deg.to_radians();
        Vec3::new(r.sin() * distance, y, r.cos() * distance)
    };
    let entries: [(f32, f32, f32, PoiKinds); 6] = [
        (0.0, 40.0, 0.0, PoiKind::Landmark.into()),
        (20.0, 25.0, 6.0, PoiKind::QuestGiver.into()),
        (-30.0, 60.0, 0.0, PoiKind::Vendor.into()),
        (-29.0, 35.0, -5.0, PoiKind::Resource.into()),
        (
            60.0,
            15.0,
            0.0,
            [PoiKind::QuestGiver, PoiKind::Vendor, PoiKind::Landmark]
                .into_iter()
                .collect(),
        ),
        (170.0, 80.0, 0.0, PoiKind::Player.into()),
    ];
    for (deg, distance, y, kinds) in entries {
        let p = place(deg, distance, y);
        registry.register(p, place(deg, distance, y), kinds);
    }
    registry
}
