//! Umbra shadow demo
//!
//! Runs the animated shadow scene headless through the CPU rasteriser,
//! logging per-frame shadow statistics and optionally writing the last
//! frame as a PNG.
//!
//! Run with: cargo run -p umbra_demo -- --frames 120 --output shadows.png

mod config;

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Parser;
use umbra_render::SoftwareBackend;
use umbra_scene::{FrameStats, Scene};

use crate::config::DemoConfig;

#[derive(Debug, Parser)]
#[command(name = "umbra-demo", version, about = "Stencil shadow volume demo")]
struct Args {
    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to run
    #[arg(long)]
    frames: Option<u32>,

    /// Write the final frame to this PNG file
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long)]
    width: Option<usize>,

    #[arg(long)]
    height: Option<usize>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut config = DemoConfig::load(args.config.as_deref())?;
    config.apply_overrides(args.frames, args.output, args.width, args.height);
    config.print_summary();

    let mut scene = Scene::from_config(&config.scene, &config.shadow)?;
    let mut backend = SoftwareBackend::new(config.width, config.height, scene.camera());

    let mut totals = FrameStats::default();
    for frame in 0..config.frames {
        scene.update(config.frame_ms);
        backend.set_camera(scene.camera());
        backend.clear(config.background, f32::INFINITY, scene.stencil_clear_value());

        let stats = scene.render(&mut backend)?;
        log::debug!(
            "Frame {}: {} casters, {} skipped, {} volume triangles",
            frame,
            stats.casters,
            stats.skipped_casters,
            stats.volume_triangles
        );
        totals.casters += stats.casters;
        totals.skipped_casters += stats.skipped_casters;
        totals.volume_triangles += stats.volume_triangles;
        totals.silhouette_edges += stats.silhouette_edges;
    }

    log::info!(
        "Rendered {} frames: {} caster volumes ({} skipped), {} volume triangles, {} rasterised triangles",
        config.frames,
        totals.casters,
        totals.skipped_casters,
        totals.volume_triangles,
        backend.triangles_drawn()
    );

    if let Some(path) = &config.output {
        write_png(&backend, path)?;
        log::info!("Wrote {}", path.display());
    }

    scene.release_buffers(&mut backend);
    Ok(())
}

fn write_png(backend: &SoftwareBackend, path: &Path) -> Result<(), Box<dyn Error>> {
    let width = u32::try_from(backend.width())?;
    let height = u32::try_from(backend.height())?;
    let image = image::RgbaImage::from_raw(width, height, backend.to_rgba8())
        .ok_or("colour buffer does not match the viewport size")?;
    image.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}
