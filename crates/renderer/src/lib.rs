//! Real-time ray-marched fractal viewer.
//!
//! The host side is deliberately thin: it opens a window, loads the two WGSL
//! sources from disk, uploads one uniform block per frame, and draws a
//! full-screen triangle. Everything visual happens in the fragment shader;
//! the egui panel on the left edits the uniform values live.

mod compile;
mod gpu;
mod params;
mod timing;
mod types;
mod ui;
mod uniforms;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use winit::dpi::PhysicalSize;
use winit::event::{Event, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

pub use compile::{load_shader_pair, ShaderPair, FRAGMENT_SHADER_FILE, VERTEX_SHADER_FILE};
pub use params::{FractalKind, FractalParams};
pub use types::{Antialiasing, RendererConfig};

use gpu::{GpuState, ViewportRect};
use timing::{FrameClock, FramePacer};
use ui::{FrameStats, UiLayer};
use uniforms::FractalUniforms;

pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Runs the window event loop until the user closes the window.
    ///
    /// Shader sources are read before any GPU work so a missing or broken
    /// file fails fast with the path in the error chain.
    pub fn run(self) -> Result<()> {
        let shaders = load_shader_pair(&self.config.shader_dir)?;
        info!(dir = %self.config.shader_dir.display(), "loaded shader sources");

        let event_loop = EventLoop::new().context("failed to create event loop")?;
        event_loop.set_control_flow(ControlFlow::Poll);
        let (width, height) = self.config.surface_size;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title("Ray Marcher")
                .with_inner_size(PhysicalSize::new(width, height))
                .build(&event_loop)
                .context("failed to create window")?,
        );

        let mut gpu = GpuState::new(window.clone(), &self.config, &shaders)?;
        let mut ui = UiLayer::new(&window);
        let mut params = self.config.params.clone();
        let mut clock = FrameClock::new();
        let mut pacer = FramePacer::new(self.config.target_fps);
        let mut capture_status: Option<String> = None;
        let mut fatal: Option<anyhow::Error> = None;

        event_loop
            .run(|event, elwt| match event {
                Event::WindowEvent { window_id, event } if window_id == window.id() => {
                    let consumed = ui.on_window_event(&window, &event);
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::KeyboardInput { event, .. }
                            if event.state.is_pressed()
                                && event.logical_key == Key::Named(NamedKey::Escape) =>
                        {
                            elwt.exit()
                        }
                        WindowEvent::Resized(size) => gpu.resize(size.width, size.height),
                        WindowEvent::MouseWheel { delta, .. } if !consumed => {
                            params.zoom(scroll_lines(delta));
                        }
                        WindowEvent::RedrawRequested => {
                            if !pacer.should_render(Instant::now()) {
                                return;
                            }
                            let tick = clock.tick();
                            params.advance(tick.delta);

                            let ui_out = ui.run(
                                &window,
                                &mut params,
                                FrameStats {
                                    fps: clock.fps(),
                                    frame: tick.frame,
                                },
                                capture_status.as_deref(),
                            );
                            params.clamp();

                            if ui_out.actions.capture {
                                capture_status =
                                    Some(capture_frame(&gpu, &params, &tick_path(tick.frame), tick));
                            }

                            let uniforms = FractalUniforms::pack(
                                &params,
                                gpu.viewport(),
                                tick.elapsed,
                                tick.delta,
                                tick.frame,
                            );
                            match gpu.render_frame(uniforms, Some(ui_out.paint)) {
                                Ok(()) => {}
                                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                    let size = window.inner_size();
                                    gpu.resize(size.width, size.height);
                                }
                                Err(wgpu::SurfaceError::Timeout) => {
                                    warn!("surface frame timed out, skipping");
                                }
                                Err(wgpu::SurfaceError::OutOfMemory) => {
                                    error!("surface is out of memory");
                                    fatal = Some(anyhow::anyhow!("GPU surface out of memory"));
                                    elwt.exit();
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Event::AboutToWait => window.request_redraw(),
                _ => {}
            })
            .context("event loop terminated abnormally")?;

        match fatal {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn scroll_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, lines) => lines,
        // Touchpads report pixels; one text line is a reasonable equivalence.
        MouseScrollDelta::PixelDelta(pos) => (pos.y / 50.0) as f32,
    }
}

fn tick_path(frame: u32) -> PathBuf {
    PathBuf::from(format!("marchview-{frame:05}.png"))
}

/// Captures the fractal view to `path` and returns a status line for the
/// panel. A failed capture is reported but never kills the session.
fn capture_frame(
    gpu: &GpuState,
    params: &FractalParams,
    path: &std::path::Path,
    tick: timing::FrameTick,
) -> String {
    let side = gpu.viewport().side;
    let uniforms = FractalUniforms::pack(
        params,
        ViewportRect { x: 0, y: 0, side },
        tick.elapsed,
        tick.delta,
        tick.frame,
    );
    match gpu.capture(uniforms, side, path) {
        Ok(()) => format!("saved {}", path.display()),
        Err(err) => {
            warn!(error = %format!("{err:#}"), "frame capture failed");
            format!("capture failed: {err}")
        }
    }
}
