use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info, warn};
use winit::window::Window;

use crate::compile::{self, ShaderPair};
use crate::types::{Antialiasing, RendererConfig};
use crate::ui::UiPaint;
use crate::uniforms::FractalUniforms;

/// Square region of the framebuffer the fractal is drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ViewportRect {
    pub x: u32,
    pub y: u32,
    pub side: u32,
}

/// Largest square that fits the framebuffer, anchored to the right edge so
/// the left strip stays free for the control panel.
pub(crate) fn square_viewport(width: u32, height: u32) -> ViewportRect {
    let side = width.min(height);
    ViewportRect {
        x: width.saturating_sub(side),
        y: 0,
        side,
    }
}

pub(crate) struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    sample_count: u32,
    msaa_view: Option<wgpu::TextureView>,
    egui_renderer: egui_wgpu::Renderer,
    max_dimension: u32,
}

impl GpuState {
    pub(crate) fn new(
        window: Arc<Window>,
        cfg: &RendererConfig,
        shaders: &ShaderPair,
    ) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create rendering surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no compatible GPU adapter found"))?;
        info!(adapter = %adapter.get_info().name, backend = ?adapter.get_info().backend, "selected adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("fractal device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
            },
            None,
        ))
        .context("failed to acquire GPU device")?;
        let max_dimension = device.limits().max_texture_dimension_2d;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(caps.formats[0]);

        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1).min(max_dimension),
            height: size.height.max(1).min(max_dimension),
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 1,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let sample_count = negotiate_sample_count(&adapter, format, cfg.antialiasing);
        debug!(sample_count, format = ?format, "surface configured");

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("fractal uniforms"),
            size: std::mem::size_of::<FractalUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("fractal bind group layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("fractal bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline = build_pipeline(&device, shaders, &bind_group_layout, format, sample_count);
        let msaa_view = create_msaa_view(&device, &config, sample_count);
        let egui_renderer = egui_wgpu::Renderer::new(&device, format, None, sample_count);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            uniform_buffer,
            bind_group,
            sample_count,
            msaa_view,
            egui_renderer,
            max_dimension,
        })
    }

    pub(crate) fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub(crate) fn viewport(&self) -> ViewportRect {
        square_viewport(self.config.width, self.config.height)
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width.min(self.max_dimension);
        self.config.height = height.min(self.max_dimension);
        self.surface.configure(&self.device, &self.config);
        self.msaa_view = create_msaa_view(&self.device, &self.config, self.sample_count);
    }

    /// Draws one frame: the fractal into the right-anchored square viewport,
    /// then the control panel over the full surface.
    pub(crate) fn render_frame(
        &mut self,
        uniforms: FractalUniforms,
        ui: Option<UiPaint>,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let frame_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: ui.as_ref().map(|u| u.pixels_per_point).unwrap_or(1.0),
        };
        let mut ui_command_buffers = Vec::new();
        if let Some(paint) = &ui {
            for (id, delta) in &paint.textures_delta.set {
                self.egui_renderer
                    .update_texture(&self.device, &self.queue, *id, delta);
            }
            ui_command_buffers = self.egui_renderer.update_buffers(
                &self.device,
                &self.queue,
                &mut encoder,
                &paint.primitives,
                &screen,
            );
        }

        {
            let (view, resolve_target) = match &self.msaa_view {
                Some(msaa) => (msaa, Some(&frame_view)),
                None => (&frame_view, None),
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let vp = self.viewport();
            pass.set_viewport(
                vp.x as f32,
                vp.y as f32,
                vp.side as f32,
                vp.side as f32,
                0.0,
                1.0,
            );
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.draw(0..3, 0..1);

            if let Some(paint) = &ui {
                pass.set_viewport(
                    0.0,
                    0.0,
                    self.config.width as f32,
                    self.config.height as f32,
                    0.0,
                    1.0,
                );
                self.egui_renderer.render(&mut pass, &paint.primitives, &screen);
            }
        }

        self.queue
            .submit(ui_command_buffers.into_iter().chain(Some(encoder.finish())));
        frame.present();

        if let Some(paint) = ui {
            for id in paint.textures_delta.free {
                self.egui_renderer.free_texture(&id);
            }
        }
        Ok(())
    }

    /// Renders the fractal alone into an offscreen texture and writes it to
    /// `path` as a PNG. The caller packs `uniforms` for a zero-offset square
    /// viewport of `side` pixels.
    pub(crate) fn capture(
        &self,
        uniforms: FractalUniforms,
        side: u32,
        path: &Path,
    ) -> Result<()> {
        let extent = wgpu::Extent3d {
            width: side,
            height: side,
            depth_or_array_layers: 1,
        };
        let target = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("capture target"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let msaa_view = (self.sample_count > 1).then(|| {
            self.device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some("capture msaa"),
                    size: extent,
                    mip_level_count: 1,
                    sample_count: self.sample_count,
                    dimension: wgpu::TextureDimension::D2,
                    format: self.config.format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        });

        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let bytes_per_pixel = 4u32;
        let unpadded = side * bytes_per_pixel;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded = unpadded.div_ceil(align) * align;
        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("capture readback"),
            size: (padded * side) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("capture encoder"),
            });
        {
            let (view, resolve_target) = match &msaa_view {
                Some(msaa) => (msaa, Some(&target_view)),
                None => (&target_view, None),
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("capture pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &readback,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(side),
                },
            },
            extent,
        );
        self.queue.submit(Some(encoder.finish()));

        let slice = readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .context("capture readback channel closed")?
            .context("failed to map capture readback buffer")?;

        let mut pixels = Vec::with_capacity((unpadded * side) as usize);
        {
            let data = slice.get_mapped_range();
            for row in data.chunks(padded as usize) {
                pixels.extend_from_slice(&row[..unpadded as usize]);
            }
        }
        readback.unmap();

        if is_bgra(self.config.format) {
            for px in pixels.chunks_exact_mut(4) {
                px.swap(0, 2);
            }
        }

        let image = image::RgbaImage::from_raw(side, side, pixels)
            .ok_or_else(|| anyhow!("capture produced a short pixel buffer"))?;
        image
            .save(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), side, "saved frame capture");
        Ok(())
    }
}

fn is_bgra(format: wgpu::TextureFormat) -> bool {
    matches!(
        format,
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
    )
}

fn build_pipeline(
    device: &wgpu::Device,
    shaders: &ShaderPair,
    bind_group_layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
    sample_count: u32,
) -> wgpu::RenderPipeline {
    let modules = compile::create_modules(device, shaders);
    let (vs_entry, fs_entry) = compile::entry_points();
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("fractal pipeline layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("fractal pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &modules.vertex,
            entry_point: vs_entry,
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: &modules.fragment,
            entry_point: fs_entry,
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

fn create_msaa_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> Option<wgpu::TextureView> {
    (sample_count > 1).then(|| {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("msaa color target"),
                size: wgpu::Extent3d {
                    width: config.width,
                    height: config.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count,
                dimension: wgpu::TextureDimension::D2,
                format: config.format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    })
}

/// Picks the MSAA sample count to use for `format`.
///
/// Without `TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES` the flags only speak
/// for counts up to 4, so anything higher is clamped.
fn negotiate_sample_count(
    adapter: &wgpu::Adapter,
    format: wgpu::TextureFormat,
    requested: Antialiasing,
) -> u32 {
    let flags = adapter.get_texture_format_features(format).flags;
    if !flags.contains(wgpu::TextureFormatFeatureFlags::MULTISAMPLE_RESOLVE) {
        if requested != Antialiasing::Off {
            warn!(?format, "surface format cannot resolve MSAA, rendering aliased");
        }
        return 1;
    }
    let ceiling = match requested {
        Antialiasing::Off => return 1,
        Antialiasing::Auto => 4,
        Antialiasing::Samples(n) => n.min(4),
    };
    let chosen = [4u32, 2]
        .into_iter()
        .find(|&n| n <= ceiling && flags.sample_count_supported(n))
        .unwrap_or(1);
    if let Antialiasing::Samples(n) = requested {
        if chosen != n {
            warn!(requested = n, chosen, "unsupported MSAA sample count, clamped");
        }
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_window_uses_full_surface() {
        assert_eq!(
            square_viewport(800, 800),
            ViewportRect { x: 0, y: 0, side: 800 }
        );
    }

    #[test]
    fn wide_window_anchors_right() {
        assert_eq!(
            square_viewport(1200, 800),
            ViewportRect { x: 400, y: 0, side: 800 }
        );
    }

    #[test]
    fn tall_window_anchors_bottom_left() {
        assert_eq!(
            square_viewport(800, 1200),
            ViewportRect { x: 0, y: 0, side: 800 }
        );
    }

    #[test]
    fn degenerate_window_collapses_to_zero() {
        assert_eq!(square_viewport(0, 600).side, 0);
    }
}
