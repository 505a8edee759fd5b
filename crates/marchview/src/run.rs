use anyhow::Result;
use renderer::{FractalParams, Renderer, RendererConfig};
use tracing::info;

use crate::cli::Cli;
use crate::paths;

pub fn run(cli: Cli) -> Result<()> {
    initialise_tracing();

    let shader_dir = paths::discover(cli.shaders.as_deref())?;
    info!(dir = %shader_dir.display(), "using shader directory");

    let mut params = FractalParams {
        fractal: cli.fractal,
        ..FractalParams::default()
    };
    if let Some(distance) = cli.camera_distance {
        params.camera_distance = distance;
    }
    if let Some(power) = cli.power {
        params.power = power;
    }
    if let Some(speed) = cli.rotation_speed {
        params.rotation_speed = speed;
    }
    params.clamp();

    let config = RendererConfig {
        surface_size: cli.size,
        shader_dir,
        target_fps: cli.fps,
        antialiasing: cli.antialias,
        params,
    };
    Renderer::new(config).run()
}

fn initialise_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
