use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use flowergen::FlowerScene;
use flowergen::camera::CameraMode;
use flowergen::color::{ColorScheme, Hsb};
use flowergen::config::{FlowerConfig, ParamStore};
use flowergen::petal::Resolution;
use flowergen::render::MAX_SIDE;

#[derive(Parser)]
#[command(name = "flowergen")]
#[command(about = "Render a parametric flower to PNG")]
#[command(version)]
struct Cli {
    /// Start from a named preset (rose, tulip, carnation)
    #[arg(short, long)]
    preset: Option<String>,

    /// JSON config file; its fields override the preset, missing ones are kept
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Petal color mode (rainbow, funky, custom, pink)
    #[arg(long)]
    color: Option<String>,

    /// Custom color as h,s,b (selects custom mode)
    #[arg(long, value_parser = parse_hsb)]
    hsb: Option<Hsb>,

    #[arg(long)]
    leaves: Option<usize>,

    #[arg(long)]
    leaf_height: Option<f32>,

    #[arg(long)]
    leaf_width: Option<f32>,

    #[arg(
        long,
        default_value_t = 1024,
        value_parser = clap::value_parser!(u32).range(1..=MAX_SIDE as i64)
    )]
    width: u32,

    #[arg(
        long,
        default_value_t = 1024,
        value_parser = clap::value_parser!(u32).range(1..=MAX_SIDE as i64)
    )]
    height: u32,

    /// Camera pitch in degrees
    #[arg(long, default_value_t = -30.0, allow_hyphen_values = true)]
    pitch: f32,

    /// Camera yaw in degrees
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    yaw: f32,

    /// Number of auto-rotating frames to write (turntable)
    #[arg(long, default_value_t = 1)]
    frames: usize,

    /// Leaf layout seed
    #[arg(long, default_value_t = flowergen::stem::LAYOUT_SEED)]
    seed: u64,

    /// Output directory
    #[arg(short, long, default_value = "artifacts")]
    out: PathBuf,

    /// Also write the effective config as JSON
    #[arg(long)]
    dump_config: bool,
}

fn parse_hsb(s: &str) -> Result<Hsb, String> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("{p:?}: {e}")))
        .collect::<Result<_, _>>()?;
    match parts[..] {
        [h, s, b] => Ok(Hsb::new(h, s, b)),
        _ => Err(format!("expected h,s,b but got {} values", parts.len())),
    }
}

fn build_config(cli: &Cli) -> Result<FlowerConfig> {
    let mut store = ParamStore::default();
    if let Some(name) = &cli.preset {
        store.apply_preset(name)?;
    }
    if let Some(path) = &cli.config {
        store
            .apply_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?;
    }
    if let Some(mode) = &cli.color {
        store.set_color_mode(mode);
    }
    if let Some(hsb) = cli.hsb {
        store.set_custom_color(hsb);
    }
    let leaves = store.leaves_mut();
    if let Some(n) = cli.leaves {
        leaves.leaf_count = n;
    }
    if let Some(h) = cli.leaf_height {
        leaves.leaf_height = h;
    }
    if let Some(w) = cli.leaf_width {
        leaves.leaf_width = w;
    }
    Ok(store.snapshot().clamped())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    if matches!(config.color, ColorScheme::Unknown) {
        tracing::warn!("unknown color mode, using rainbow");
    }

    std::fs::create_dir_all(&cli.out)
        .with_context(|| format!("creating {}", cli.out.display()))?;

    if cli.dump_config {
        let path = cli.out.join("config.json");
        std::fs::write(&path, config.to_json_pretty()?)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "saved config");
    }

    let mut scene = FlowerScene::new(Resolution::default(), cli.seed);
    scene.camera.set_angles(cli.pitch, cli.yaw);
    let frames = cli.frames.max(1);
    if frames > 1 {
        scene.camera.set_mode(CameraMode::AutoRotate);
    }

    tracing::info!(
        width = cli.width,
        height = cli.height,
        frames,
        color = config.color.mode_name(),
        leaves = config.leaves.leaf_count,
        "rendering flower"
    );

    for frame in 0..frames {
        let (rgba, stats, timings) =
            scene.render_image(&config, cli.width as usize, cli.height as usize);

        let name = if frames > 1 {
            format!("flower_{frame:04}.png")
        } else {
            "flower.png".to_string()
        };
        let path = cli.out.join(name);
        image::save_buffer(
            &path,
            &rgba,
            cli.width,
            cli.height,
            image::ColorType::Rgba8,
        )
        .with_context(|| format!("saving {}", path.display()))?;

        if frame == 0 {
            for t in &timings {
                tracing::info!("  {:20} {:8.1} ms", t.name, t.ms);
            }
        }
        tracing::info!(
            path = %path.display(),
            quads = stats.quads,
            leaves = stats.leaves.len(),
            "saved frame"
        );
    }

    Ok(())
}
