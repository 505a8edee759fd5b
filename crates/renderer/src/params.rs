use std::ops::RangeInclusive;

/// Which distance estimator the fragment shader evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FractalKind {
    #[default]
    Mandelbulb,
    JuliaSet,
}

impl FractalKind {
    pub const ALL: [FractalKind; 2] = [FractalKind::Mandelbulb, FractalKind::JuliaSet];

    pub fn label(&self) -> &'static str {
        match self {
            FractalKind::Mandelbulb => "Mandelbulb",
            FractalKind::JuliaSet => "Julia Set",
        }
    }

    /// Integer selector the shader switches on.
    pub(crate) fn selector(&self) -> u32 {
        match self {
            FractalKind::Mandelbulb => 0,
            FractalKind::JuliaSet => 1,
        }
    }
}

pub const CAMERA_DISTANCE_RANGE: RangeInclusive<f32> = 0.0..=10.0;
pub const ANGLE_RANGE: RangeInclusive<f32> = 0.0..=360.0;
pub const ROTATION_SPEED_RANGE: RangeInclusive<f32> = -10.0..=10.0;
pub const POWER_RANGE: RangeInclusive<f32> = 1.0..=16.0;
pub const JULIA_COMPONENT_RANGE: RangeInclusive<f32> = -1.0..=1.0;
pub const ITERATION_RANGE: RangeInclusive<u32> = 0..=32;
pub const MAX_STEPS_RANGE: RangeInclusive<u32> = 0..=512;

/// Scroll-wheel zoom step per line, in camera distance units.
const ZOOM_STEP: f32 = 0.25;

/// Everything the control panel can edit, applied to the next frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FractalParams {
    pub fractal: FractalKind,
    /// Distance from the camera to the origin.
    pub camera_distance: f32,
    /// Orbit angle around the vertical axis, in degrees.
    pub angle_deg: f32,
    /// Degrees per second added to the angle each frame.
    pub rotation_speed: f32,
    /// Mandelbulb exponent.
    pub power: f32,
    /// Quaternion Julia constant.
    pub julia_c: [f32; 4],
    /// Extra imaginary component mixed into the Julia iteration.
    pub julia_imaginary: f32,
    /// Distance estimator iterations.
    pub iteration_count: u32,
    /// Sphere tracing step limit.
    pub max_steps: u32,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            fractal: FractalKind::Mandelbulb,
            camera_distance: 3.0,
            angle_deg: 0.0,
            rotation_speed: 0.0,
            power: 8.0,
            julia_c: [0.0; 4],
            julia_imaginary: 0.0,
            iteration_count: 16,
            max_steps: 256,
        }
    }
}

impl FractalParams {
    /// Advances the orbit by `dt` seconds, wrapping the angle into [0, 360).
    pub fn advance(&mut self, dt: f32) {
        self.angle_deg = (self.angle_deg + self.rotation_speed * dt).rem_euclid(360.0);
    }

    /// Applies `lines` of scroll wheel movement to the camera distance.
    /// Scrolling up moves the camera closer.
    pub fn zoom(&mut self, lines: f32) {
        self.camera_distance = (self.camera_distance - lines * ZOOM_STEP)
            .clamp(*CAMERA_DISTANCE_RANGE.start(), *CAMERA_DISTANCE_RANGE.end());
    }

    /// Clamps every field back into its slider range. Values can escape the
    /// ranges through CLI overrides or keyboard entry in the panel.
    pub fn clamp(&mut self) {
        self.camera_distance = self
            .camera_distance
            .clamp(*CAMERA_DISTANCE_RANGE.start(), *CAMERA_DISTANCE_RANGE.end());
        self.angle_deg = self.angle_deg.rem_euclid(360.0);
        self.rotation_speed = self
            .rotation_speed
            .clamp(*ROTATION_SPEED_RANGE.start(), *ROTATION_SPEED_RANGE.end());
        self.power = self.power.clamp(*POWER_RANGE.start(), *POWER_RANGE.end());
        for c in &mut self.julia_c {
            *c = c.clamp(*JULIA_COMPONENT_RANGE.start(), *JULIA_COMPONENT_RANGE.end());
        }
        self.julia_imaginary = self
            .julia_imaginary
            .clamp(*JULIA_COMPONENT_RANGE.start(), *JULIA_COMPONENT_RANGE.end());
        self.iteration_count = self
            .iteration_count
            .clamp(*ITERATION_RANGE.start(), *ITERATION_RANGE.end());
        self.max_steps = self
            .max_steps
            .clamp(*MAX_STEPS_RANGE.start(), *MAX_STEPS_RANGE.end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_panel_initial_state() {
        let params = FractalParams::default();
        assert_eq!(params.fractal, FractalKind::Mandelbulb);
        assert_eq!(params.camera_distance, 3.0);
        assert_eq!(params.power, 8.0);
        assert_eq!(params.iteration_count, 16);
        assert_eq!(params.max_steps, 256);
        assert_eq!(params.rotation_speed, 0.0);
    }

    #[test]
    fn advance_is_inert_with_zero_speed() {
        let mut params = FractalParams::default();
        params.angle_deg = 42.0;
        params.advance(1.0);
        assert_eq!(params.angle_deg, 42.0);
    }

    #[test]
    fn advance_wraps_past_a_full_turn() {
        let mut params = FractalParams {
            angle_deg: 350.0,
            rotation_speed: 20.0,
            ..Default::default()
        };
        params.advance(1.0);
        assert!((params.angle_deg - 10.0).abs() < 1e-3);
    }

    #[test]
    fn advance_wraps_negative_rotation() {
        let mut params = FractalParams {
            angle_deg: 5.0,
            rotation_speed: -10.0,
            ..Default::default()
        };
        params.advance(1.0);
        assert!((params.angle_deg - 355.0).abs() < 1e-3);
    }

    #[test]
    fn zoom_moves_closer_and_saturates() {
        let mut params = FractalParams::default();
        params.zoom(1.0);
        assert_eq!(params.camera_distance, 2.75);
        params.zoom(-100.0);
        assert_eq!(params.camera_distance, 10.0);
        params.zoom(100.0);
        assert_eq!(params.camera_distance, 0.0);
    }

    #[test]
    fn clamp_pulls_escaped_values_back() {
        let mut params = FractalParams {
            camera_distance: 99.0,
            angle_deg: 725.0,
            rotation_speed: -50.0,
            power: 0.1,
            julia_c: [2.0, -2.0, 0.5, 1.5],
            julia_imaginary: -3.0,
            iteration_count: 1000,
            max_steps: 9999,
            ..Default::default()
        };
        params.clamp();
        assert_eq!(params.camera_distance, 10.0);
        assert!((params.angle_deg - 5.0).abs() < 1e-3);
        assert_eq!(params.rotation_speed, -10.0);
        assert_eq!(params.power, 1.0);
        assert_eq!(params.julia_c, [1.0, -1.0, 0.5, 1.0]);
        assert_eq!(params.julia_imaginary, -1.0);
        assert_eq!(params.iteration_count, 32);
        assert_eq!(params.max_steps, 512);
    }

    #[test]
    fn selector_distinguishes_kinds() {
        assert_eq!(FractalKind::Mandelbulb.selector(), 0);
        assert_eq!(FractalKind::JuliaSet.selector(), 1);
        assert_eq!(FractalKind::ALL.len(), 2);
    }
}
