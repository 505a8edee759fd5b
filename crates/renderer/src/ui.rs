use winit::event::WindowEvent;
use winit::window::Window;

use crate::params::{
    FractalKind, FractalParams, ANGLE_RANGE, CAMERA_DISTANCE_RANGE, ITERATION_RANGE,
    JULIA_COMPONENT_RANGE, MAX_STEPS_RANGE, POWER_RANGE, ROTATION_SPEED_RANGE,
};

/// Read-only numbers shown in the status strip.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameStats {
    pub fps: f32,
    pub frame: u32,
}

/// One-shot requests raised by panel buttons.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct PanelActions {
    pub capture: bool,
}

/// Tessellated panel geometry, handed to the GPU pass.
pub(crate) struct UiPaint {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

pub(crate) struct UiOutput {
    pub paint: UiPaint,
    pub actions: PanelActions,
}

/// Owns the egui context and its winit bridge.
pub(crate) struct UiLayer {
    ctx: egui::Context,
    state: egui_winit::State,
}

impl UiLayer {
    pub(crate) fn new(window: &Window) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
        );
        Self { ctx, state }
    }

    /// Feeds a window event to egui; true means the panel consumed it and the
    /// fractal view should not react.
    pub(crate) fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    pub(crate) fn run(
        &mut self,
        window: &Window,
        params: &mut FractalParams,
        stats: FrameStats,
        capture_status: Option<&str>,
    ) -> UiOutput {
        let mut actions = PanelActions::default();
        let raw_input = self.state.take_egui_input(window);
        let output = self.ctx.run(raw_input, |ctx| {
            draw_panel(ctx, params, stats, capture_status, &mut actions);
        });
        self.state
            .handle_platform_output(window, output.platform_output);
        let primitives = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        UiOutput {
            paint: UiPaint {
                primitives,
                textures_delta: output.textures_delta,
                pixels_per_point: output.pixels_per_point,
            },
            actions,
        }
    }
}

fn draw_panel(
    ctx: &egui::Context,
    params: &mut FractalParams,
    stats: FrameStats,
    capture_status: Option<&str>,
    actions: &mut PanelActions,
) {
    egui::TopBottomPanel::top("status").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label("Ray Marcher");
            ui.separator();
            ui.label(format!("{:>5.1} FPS", stats.fps));
            ui.separator();
            ui.label(format!("frame {}", stats.frame));
            if let Some(status) = capture_status {
                ui.separator();
                ui.label(status);
            }
        });
    });

    egui::SidePanel::left("controls")
        .resizable(false)
        .default_width(240.0)
        .show(ctx, |ui| {
            egui::CollapsingHeader::new("Camera")
                .default_open(true)
                .show(ui, |ui| {
                    ui.add(
                        egui::Slider::new(&mut params.camera_distance, CAMERA_DISTANCE_RANGE)
                            .text("Distance"),
                    );
                    ui.add(egui::Slider::new(&mut params.angle_deg, ANGLE_RANGE).text("Angle"));
                    ui.add(
                        egui::Slider::new(&mut params.rotation_speed, ROTATION_SPEED_RANGE)
                            .text("Rotation Speed"),
                    );
                    if ui.button("Stop").clicked() {
                        params.rotation_speed = 0.0;
                    }
                });

            egui::CollapsingHeader::new("Rendering")
                .default_open(true)
                .show(ui, |ui| {
                    egui::ComboBox::from_label("Fractal")
                        .selected_text(params.fractal.label())
                        .show_ui(ui, |ui| {
                            for kind in FractalKind::ALL {
                                ui.selectable_value(&mut params.fractal, kind, kind.label());
                            }
                        });
                    ui.add(
                        egui::Slider::new(&mut params.iteration_count, ITERATION_RANGE)
                            .text("Iteration Count"),
                    );
                    ui.add(
                        egui::Slider::new(&mut params.max_steps, MAX_STEPS_RANGE)
                            .text("Max Steps"),
                    );
                });

            egui::CollapsingHeader::new("Mandelbulb")
                .default_open(params.fractal == FractalKind::Mandelbulb)
                .show(ui, |ui| {
                    ui.add(egui::Slider::new(&mut params.power, POWER_RANGE).text("Power"));
                });

            egui::CollapsingHeader::new("Julia Set")
                .default_open(params.fractal == FractalKind::JuliaSet)
                .show(ui, |ui| {
                    for (component, label) in params.julia_c.iter_mut().zip(["X", "Y", "Z", "W"]) {
                        ui.add(
                            egui::Slider::new(component, JULIA_COMPONENT_RANGE.clone())
                                .text(label),
                        );
                    }
                    ui.add(
                        egui::Slider::new(&mut params.julia_imaginary, JULIA_COMPONENT_RANGE)
                            .text("Imaginary Part"),
                    );
                });

            ui.separator();
            if ui.button("Save frame as PNG").clicked() {
                actions.capture = true;
            }
        });
}
