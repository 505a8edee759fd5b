//! Checks that the shader sources shipped in the repository stay loadable
//! and keep the interface the host uploads against.

use std::path::PathBuf;

use renderer::load_shader_pair;

fn repo_shader_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../shaders")
}

#[test]
fn bundled_shaders_load_and_validate() {
    let pair = load_shader_pair(&repo_shader_dir()).expect("bundled shaders must load");
    assert!(pair.vertex.contains("vs_main"));
    assert!(pair.fragment.contains("fs_main"));
}

#[test]
fn fragment_shader_declares_the_uniform_block() {
    let pair = load_shader_pair(&repo_shader_dir()).unwrap();
    for lane in ["resolution", "julia_c", "camera", "timing", "counts"] {
        assert!(
            pair.fragment.contains(lane),
            "fragment shader lost uniform lane '{lane}'"
        );
    }
    assert!(pair.fragment.contains("@group(0) @binding(0)"));
}

#[test]
fn fragment_shader_handles_both_fractals() {
    let pair = load_shader_pair(&repo_shader_dir()).unwrap();
    assert!(pair.fragment.contains("mandelbulb"));
    assert!(pair.fragment.contains("julia"));
}
