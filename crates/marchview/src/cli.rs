use std::path::PathBuf;

use clap::Parser;
use renderer::{Antialiasing, FractalKind};

#[derive(Debug, Parser)]
#[command(name = "marchview", version, about = "Interactive ray-marched fractal viewer")]
pub struct Cli {
    /// Window size in physical pixels, as WIDTHxHEIGHT.
    #[arg(long, default_value = "800x800", value_parser = parse_surface_size)]
    pub size: (u32, u32),

    /// Directory holding the vertex and fragment shader sources.
    /// Defaults to `./shaders`, then a `shaders` directory next to the binary.
    #[arg(long)]
    pub shaders: Option<PathBuf>,

    /// Fractal shown at startup: mandelbulb or julia.
    #[arg(long, default_value = "mandelbulb", value_parser = parse_fractal_kind)]
    pub fractal: FractalKind,

    /// Cap the render rate in frames per second; unset renders every vsync.
    #[arg(long)]
    pub fps: Option<f32>,

    /// Anti-aliasing: auto, off, or an MSAA sample count (2 or 4).
    #[arg(long, default_value = "auto", value_parser = parse_antialias)]
    pub antialias: Antialiasing,

    /// Initial camera distance override.
    #[arg(long)]
    pub camera_distance: Option<f32>,

    /// Initial Mandelbulb power override.
    #[arg(long)]
    pub power: Option<f32>,

    /// Initial rotation speed override, in degrees per second.
    #[arg(long)]
    pub rotation_speed: Option<f32>,
}

fn parse_surface_size(raw: &str) -> Result<(u32, u32), String> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{raw}'"))?;
    let width: u32 = w.trim().parse().map_err(|_| format!("bad width '{w}'"))?;
    let height: u32 = h.trim().parse().map_err(|_| format!("bad height '{h}'"))?;
    if width == 0 || height == 0 {
        return Err("window size must be non-zero".into());
    }
    Ok((width, height))
}

fn parse_fractal_kind(raw: &str) -> Result<FractalKind, String> {
    match raw.to_ascii_lowercase().as_str() {
        "mandelbulb" => Ok(FractalKind::Mandelbulb),
        "julia" | "julia-set" => Ok(FractalKind::JuliaSet),
        other => Err(format!("unknown fractal '{other}' (try mandelbulb or julia)")),
    }
}

fn parse_antialias(raw: &str) -> Result<Antialiasing, String> {
    match raw.to_ascii_lowercase().as_str() {
        "auto" => Ok(Antialiasing::Auto),
        "off" | "none" | "1" => Ok(Antialiasing::Off),
        other => {
            let samples: u32 = other
                .parse()
                .map_err(|_| format!("expected auto, off, or a sample count, got '{raw}'"))?;
            if matches!(samples, 2 | 4) {
                Ok(Antialiasing::Samples(samples))
            } else {
                Err(format!("unsupported sample count {samples} (try 2 or 4)"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_an_800_square_window() {
        let cli = Cli::parse_from(["marchview"]);
        assert_eq!(cli.size, (800, 800));
        assert_eq!(cli.fractal, FractalKind::Mandelbulb);
        assert_eq!(cli.antialias, Antialiasing::Auto);
        assert!(cli.shaders.is_none());
        assert!(cli.fps.is_none());
    }

    #[test]
    fn size_parses_both_separators() {
        assert_eq!(parse_surface_size("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_surface_size("1280X720").unwrap(), (1280, 720));
        assert!(parse_surface_size("1280").is_err());
        assert!(parse_surface_size("0x600").is_err());
    }

    #[test]
    fn fractal_names_are_case_insensitive() {
        assert_eq!(parse_fractal_kind("Mandelbulb").unwrap(), FractalKind::Mandelbulb);
        assert_eq!(parse_fractal_kind("julia").unwrap(), FractalKind::JuliaSet);
        assert_eq!(parse_fractal_kind("julia-set").unwrap(), FractalKind::JuliaSet);
        assert!(parse_fractal_kind("menger").is_err());
    }

    #[test]
    fn antialias_accepts_modes_and_counts() {
        assert_eq!(parse_antialias("auto").unwrap(), Antialiasing::Auto);
        assert_eq!(parse_antialias("off").unwrap(), Antialiasing::Off);
        assert_eq!(parse_antialias("1").unwrap(), Antialiasing::Off);
        assert_eq!(parse_antialias("4").unwrap(), Antialiasing::Samples(4));
        assert!(parse_antialias("3").is_err());
        assert!(parse_antialias("16").is_err());
    }

    #[test]
    fn overrides_flow_through() {
        let cli = Cli::parse_from([
            "marchview",
            "--fractal",
            "julia",
            "--camera-distance",
            "5.5",
            "--fps",
            "30",
        ]);
        assert_eq!(cli.fractal, FractalKind::JuliaSet);
        assert_eq!(cli.camera_distance, Some(5.5));
        assert_eq!(cli.fps, Some(30.0));
    }
}
