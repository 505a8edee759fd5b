use std::path::PathBuf;

use crate::params::FractalParams;

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

impl Default for Antialiasing {
    fn default() -> Self {
        Self::Auto
    }
}

/// Immutable configuration passed to the renderer at start-up.
///
/// Mirrors the CLI flags: window size, where the two shader source files
/// live, and how the frame loop should behave.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Directory containing the vertex and fragment shader sources.
    pub shader_dir: PathBuf,
    /// Optional FPS cap; None = render every redraw.
    pub target_fps: Option<f32>,
    /// Anti-aliasing mode requested by the caller.
    pub antialiasing: Antialiasing,
    /// Initial fractal parameters shown in the panel.
    pub params: FractalParams,
}

impl Default for RendererConfig {
    /// An 800x800 window with shaders resolved from `./shaders`.
    fn default() -> Self {
        Self {
            surface_size: (800, 800),
            shader_dir: PathBuf::from("shaders"),
            target_fps: None,
            antialiasing: Antialiasing::default(),
            params: FractalParams::default(),
        }
    }
}
