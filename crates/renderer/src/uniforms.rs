use bytemuck::{Pod, Zeroable};

use crate::gpu::ViewportRect;
use crate::params::FractalParams;

/// CPU-side mirror of the shader's uniform block.
///
/// Packed into vec4 lanes so the layout is identical under std140 rules and
/// the WGSL struct in `shaders/fractal.wgsl`; any field added here needs a
/// matching lane there.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct FractalUniforms {
    /// Viewport side lengths (x, y) and framebuffer offset (z, w).
    resolution: [f32; 4],
    /// Quaternion Julia constant.
    julia_c: [f32; 4],
    /// Camera distance, orbit angle in radians, power, julia imaginary part.
    camera: [f32; 4],
    /// Elapsed seconds, frame delta seconds; two spare lanes.
    timing: [f32; 4],
    /// Max march steps, DE iterations, fractal selector, frame index.
    counts: [u32; 4],
}

impl FractalUniforms {
    pub(crate) fn pack(
        params: &FractalParams,
        viewport: ViewportRect,
        elapsed: f32,
        delta: f32,
        frame: u32,
    ) -> Self {
        Self {
            resolution: [
                viewport.side as f32,
                viewport.side as f32,
                viewport.x as f32,
                viewport.y as f32,
            ],
            julia_c: params.julia_c,
            camera: [
                params.camera_distance,
                params.angle_deg.to_radians(),
                params.power,
                params.julia_imaginary,
            ],
            timing: [elapsed, delta, 0.0, 0.0],
            counts: [
                params.max_steps,
                params.iteration_count,
                params.fractal.selector(),
                frame,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::FractalKind;

    fn viewport() -> ViewportRect {
        ViewportRect {
            x: 400,
            y: 0,
            side: 800,
        }
    }

    #[test]
    fn block_is_five_vec4_lanes() {
        assert_eq!(std::mem::size_of::<FractalUniforms>(), 80);
        assert_eq!(std::mem::align_of::<FractalUniforms>(), 4);
    }

    #[test]
    fn pack_carries_every_parameter() {
        let params = FractalParams {
            fractal: FractalKind::JuliaSet,
            camera_distance: 4.5,
            angle_deg: 180.0,
            rotation_speed: 2.0,
            power: 9.0,
            julia_c: [0.1, -0.2, 0.3, -0.4],
            julia_imaginary: 0.25,
            iteration_count: 12,
            max_steps: 300,
        };
        let uniforms = FractalUniforms::pack(&params, viewport(), 1.5, 0.016, 42);

        assert_eq!(uniforms.resolution, [800.0, 800.0, 400.0, 0.0]);
        assert_eq!(uniforms.julia_c, params.julia_c);
        assert_eq!(uniforms.camera[0], 4.5);
        assert!((uniforms.camera[1] - std::f32::consts::PI).abs() < 1e-6);
        assert_eq!(uniforms.camera[2], 9.0);
        assert_eq!(uniforms.camera[3], 0.25);
        assert_eq!(uniforms.timing[0], 1.5);
        assert_eq!(uniforms.counts, [300, 12, 1, 42]);
    }

    #[test]
    fn pod_view_matches_struct_size() {
        let uniforms =
            FractalUniforms::pack(&FractalParams::default(), viewport(), 0.0, 0.0, 0);
        assert_eq!(bytemuck::bytes_of(&uniforms).len(), 80);
    }
}
